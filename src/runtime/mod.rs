//! # Runtime
//!
//! Process-level wiring around the AlertManagerDefinition reconciler:
//! start-up, the kube-runtime watch loop and retry decisions.

pub mod error_policy;
pub mod initialization;
pub mod watch_loop;

pub use error_policy::{classify_watch_error, error_policy, handle_watch_stream_error, WatchErrorKind};
pub use initialization::{init_tracing, initialize, InitializationResult};
pub use watch_loop::run_watch_loop;
