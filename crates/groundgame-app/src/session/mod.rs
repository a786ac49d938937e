// Draft session state machine.
//
// A `DraftSession` never performs I/O. Each operation either returns the
// `Effect`s the caller must execute or a `DispatchRejection`; results come
// back in as `SessionEvent`s.

pub mod cache;
pub mod controller;
pub mod gate;
pub mod params;

pub use cache::{DraftStateCache, ErrorOrigin, FetchOutcome, FetchTicket, SessionError};
pub use controller::{DraftSession, Effect, SessionEvent};
pub use gate::{DispatchRejection, LegalActions, MutationKind, TurnPhase};
pub use params::{reconcile, QueryReconciler};
