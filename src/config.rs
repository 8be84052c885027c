use std::path::PathBuf;

use chrono::Duration;
use log::{error, info};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{auth::Rights, store::Store};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    voter_auth_ttl: u32,
    admin_auth_ttl: u32,
    // secrets
    admin_password: String,
    jwt_secret: String,
}

impl Config {
    /// Valid lifetime of auth token cookies for the given rights.
    pub fn auth_ttl(&self, rights: Rights) -> Duration {
        let seconds = match rights {
            Rights::Voter => self.voter_auth_ttl,
            Rights::Admin => self.admin_auth_ttl,
        };
        Duration::seconds(seconds.into())
    }

    /// Secret key used to sign JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Does the attempt match the configured admin password?
    pub fn admin_password_matches(&self, attempt: &str) -> bool {
        !self.admin_password.is_empty() && self.admin_password == attempt
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the election data file.
#[derive(Deserialize)]
struct StoreConfig {
    data_path: PathBuf,
}

/// A fairing that opens the election data file named by `data_path` and
/// places the resulting [`Store`] into managed state.
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Election store",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<StoreConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load election store config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Using election data at {}", config.data_path.display());

        let store = Store::open(config.data_path);
        store.log_summary();

        // Manage the state.
        rocket = rocket.manage(store);
        Ok(rocket)
    }
}

#[cfg(test)]
pub(crate) mod examples {
    use super::*;

    use crate::TEST_ADMIN_PASSWORD;

    impl Config {
        pub fn example() -> Self {
            Self::example_with_secret("test jwt secret")
        }

        pub fn example_with_secret(jwt_secret: &str) -> Self {
            Self {
                voter_auth_ttl: 3600,
                admin_auth_ttl: 600,
                admin_password: TEST_ADMIN_PASSWORD.to_string(),
                jwt_secret: jwt_secret.to_string(),
            }
        }
    }
}
