use log::{info, warn};
use rocket::{
    http::{Cookie, CookieJar},
    serde::json::Json,
    Route, State,
};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            admin::AdminCredentials,
            voter::{StudentCredentials, VoterDesc},
            ActionResult,
        },
        auth::{Admin, AuthToken, AUTH_TOKEN_COOKIE},
        code::VotingCode,
        election::ElectionStatus,
        store::Store,
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![student_login, admin_login, logout]
}

/// Log a student in with their name and voting code.
///
/// Refused until the election has opened. Logging in after it has ended is
/// allowed, so students can still view their own status.
#[post("/auth/student", data = "<credentials>", format = "json")]
pub fn student_login(
    cookies: &CookieJar<'_>,
    credentials: Json<StudentCredentials>,
    store: &State<Store>,
    config: &State<Config>,
) -> Result<Json<VoterDesc>> {
    let status = store.election_status().status;
    if matches!(status, ElectionStatus::NotSet | ElectionStatus::Upcoming) {
        return Err(Error::StateConflict(format!(
            "Voting has not opened yet: the election is {status}."
        )));
    }

    let invalid = || Error::Unauthorized("Invalid name or voting code.".to_string());
    let code: VotingCode = credentials.code.parse().map_err(|_| invalid())?;
    let voter = store
        .voter_by_credentials(&credentials.name, &code)
        .ok_or_else(invalid)?;

    cookies.add(AuthToken::new(&voter).into_cookie(config)?);
    info!("Voter {} logged in", voter.id);
    Ok(Json(voter.into()))
}

#[post("/auth/admin", data = "<credentials>", format = "json")]
pub fn admin_login(
    cookies: &CookieJar<'_>,
    credentials: Json<AdminCredentials>,
    config: &State<Config>,
) -> Result<Json<ActionResult>> {
    if !config.admin_password_matches(&credentials.password) {
        warn!("Rejected admin login");
        return Err(Error::Unauthorized("Incorrect admin password.".to_string()));
    }

    cookies.add(AuthToken::new(&Admin).into_cookie(config)?);
    info!("Admin logged in");
    Ok(Json(ActionResult::success("Logged in as admin.")))
}

#[delete("/auth")]
pub fn logout(cookies: &CookieJar<'_>) -> Json<ActionResult> {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Json(ActionResult::success("Logged out."))
}
