use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::model::voter::{Voter, VoterId};

/// A user of our application, having defined rights.
pub trait User {
    /// The rights of this user type.
    const RIGHTS: Rights;
    /// Get the user's ID.
    fn id(&self) -> VoterId;
}

/// Different privilege levels.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Rights {
    Voter = 0,
    Admin = 1,
}

/// The single administrator, authenticated by the configured password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admin;

impl Admin {
    pub const ID: &'static str = "admin";
}

impl User for Voter {
    const RIGHTS: Rights = Rights::Voter;

    fn id(&self) -> VoterId {
        self.id.clone()
    }
}

impl User for Admin {
    const RIGHTS: Rights = Rights::Admin;

    fn id(&self) -> VoterId {
        Self::ID.to_string()
    }
}
