//! Value Object Module

pub mod provider;
pub mod user_name;
pub mod user_password;

pub use kernel::id::UserId;
pub use provider::{Provider, UnknownProvider};
pub use user_name::{IdentifierError, Subject, Username};
pub use user_password::{RawPassword, UserPassword};
