//! Single-slot session admission and the per-open status message.

mod manager;

pub use manager::{SessionManager, SessionState, StatusMessage};
