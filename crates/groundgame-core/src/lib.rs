// Shared building blocks for the draft client: wire types for the remote
// draft service, the service client boundary, the error taxonomy, and
// configuration loading.

pub mod config;
pub mod draft;
pub mod error;
pub mod service;
