// File: services/meetbook_backend/src/lib.rs
pub mod app_state;
pub mod router;

pub use app_state::{build_state, AppState, StartupError};
pub use router::build_router;
