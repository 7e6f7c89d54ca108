//! Check scheduling and probe execution.
//!
//! One engine instance per process: on a fixed interval it lists every
//! registered check, validates the stored record, probes the target within
//! the check's timeout, and persists the observed state. Alert-worthy
//! transitions are handed to the notifier.

pub mod evaluator;
pub mod probe;
pub mod scheduler;
pub mod types;
pub mod validation;

pub use scheduler::Engine;
pub use types::{Check, CheckState, HttpMethod, Protocol};
