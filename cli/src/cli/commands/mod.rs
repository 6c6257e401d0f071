//! Command implementations.

pub mod apply;
pub mod auth;
pub mod bulk;
pub mod doctor;

pub use apply::handle_apply;
pub use auth::{handle_clear, handle_set_token, handle_status};
pub use bulk::handle_bulk;
pub use doctor::{handle_completions, handle_doctor};
