use serde::{Deserialize, Serialize};

/// Raw admin credentials, received from a user.
#[derive(Clone, Deserialize, Serialize)]
pub struct AdminCredentials {
    pub password: String,
}
