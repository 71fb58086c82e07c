//! Session module - authentication/admin status and login credentials.

mod credential;
mod state;

pub use credential::Credential;
pub use state::SessionState;
