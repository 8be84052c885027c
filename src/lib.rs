#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{figment::Figment, Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

pub use config::Config;

use config::{ConfigFairing, StoreFairing};
use logging::LoggerFairing;
use model::store::Store;

/// Build the server from `Rocket.toml` and the environment, opening the
/// election data file named by `data_path`.
pub fn build() -> Rocket<Build> {
    assemble(rocket::build()).attach(StoreFairing)
}

/// Build the server from the given configuration, over an already open store.
pub fn rocket_for_store(figment: Figment, store: Store) -> Rocket<Build> {
    assemble(rocket::custom(figment)).manage(store)
}

fn assemble(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", api::routes())
        .register("/", api::catchers())
        .attach(ConfigFairing)
        .attach(LoggerFairing)
}

#[cfg(test)]
pub(crate) const TEST_ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Configuration used by the route tests.
#[cfg(test)]
pub(crate) fn test_figment() -> Figment {
    rocket::Config::figment()
        .merge(("voter_auth_ttl", 3600))
        .merge(("admin_auth_ttl", 600))
        .merge(("admin_password", TEST_ADMIN_PASSWORD))
        .merge(("jwt_secret", "route test jwt secret"))
        .merge(("log_level", "off"))
}
