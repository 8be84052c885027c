//! Cookie authentication for voters and the administrator.

mod token;
mod user;

pub use token::{AuthFailure, AuthToken, AUTH_TOKEN_COOKIE};
pub use user::{Admin, Rights, User};
