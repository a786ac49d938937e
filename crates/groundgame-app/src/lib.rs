// Client-side draft session controller and the event loop that drives it.
//
// `session` holds the sans-IO state machine (cache, reconciler, turn gate,
// dispatcher). `app` owns a session, executes its effects against a
// `DraftService`, and pushes `UiUpdate`s to the presentation layer.

pub mod app;
pub mod protocol;
pub mod session;
