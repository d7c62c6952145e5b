//! User accounts and authentication.
//!
//! Accounts carry a role; administrators manage other accounts and courses.
//! Logins open a server-side session so logout and blocking take effect
//! before an access token expires.

mod error;
mod notifier;
mod password;
mod service;
mod types;

pub use error::UserError;
pub use notifier::{LogResetNotifier, ResetNotifier};
pub use password::{PasswordError, hash_password, verify_password};
pub use service::{UserRepository, UserService};
pub use types::{LoginSession, NewUser, User, UserRecord, UserRole, UserUpdate};
