use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::model::{api::ActionResult, auth::AuthFailure};

mod admin;
pub(crate) mod auth;
mod public;
mod voter;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(admin::routes());
    routes.extend(auth::routes());
    routes.extend(public::routes());
    routes.extend(voter::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

/// Give requests that never reach a handler, e.g. those failing an
/// authentication guard, the same JSON body as handler errors.
#[catch(default)]
fn default_catcher(status: Status, req: &Request<'_>) -> Json<ActionResult> {
    let message = match status.code {
        400 | 422 => "The request was malformed.",
        401 => req
            .local_cache(AuthFailure::default)
            .message()
            .unwrap_or("Please log in first."),
        404 => "Not found.",
        _ => status.reason().unwrap_or("The request failed."),
    };
    Json(ActionResult::failure(message))
}

/// Helpers for logging in route test clients.
#[cfg(test)]
pub(crate) mod testing {
    use chrono::{Duration, Utc};
    use rocket::local::asynchronous::Client;

    use crate::model::{
        api::{admin::AdminCredentials, voter::StudentCredentials},
        election::ElectionSchedule,
        store::Store,
        voter::Voter,
    };

    pub const TEST_VOTER_NAME: &str = "Test Voter";

    /// An election window from an hour ago to an hour from now.
    pub fn open_schedule() -> ElectionSchedule {
        let now = Utc::now();
        ElectionSchedule {
            start: Some(now - Duration::hours(1)),
            end: Some(now + Duration::hours(1)),
        }
    }

    pub async fn login_admin(client: &Client) {
        client
            .post(uri!(crate::api::auth::admin_login))
            .json(&AdminCredentials::example())
            .dispatch()
            .await;
    }

    /// Open the election, register [`TEST_VOTER_NAME`], and log in as them.
    pub async fn login_voter(client: &Client, store: &Store) -> Voter {
        store.set_election_schedule(open_schedule()).unwrap();
        let voter = store
            .add_voter(TEST_VOTER_NAME)
            .unwrap()
            .pop()
            .unwrap();
        client
            .post(uri!(crate::api::auth::student_login))
            .json(&StudentCredentials::for_voter(&voter))
            .dispatch()
            .await;
        voter
    }
}
