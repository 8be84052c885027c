use rocket::{serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            voter::{VoteRequest, VoterDesc},
            ActionResult,
        },
        auth::AuthToken,
        store::Store,
        voter::Voter,
    },
};

pub fn routes() -> Vec<Route> {
    routes![me, vote]
}

/// The logged-in voter's own details.
#[get("/voter/me")]
fn me(token: AuthToken<Voter>, store: &State<Store>) -> Result<Json<VoterDesc>> {
    let voter = store
        .voter(token.id())
        .ok_or_else(|| Error::not_found(format!("Voter {}", token.id())))?;
    Ok(Json(voter.into()))
}

#[post("/voter/vote", data = "<request>", format = "json")]
fn vote(
    token: AuthToken<Voter>,
    request: Json<VoteRequest>,
    store: &State<Store>,
) -> Result<Json<ActionResult>> {
    store.cast_vote(token.id(), request.candidate_id)?;
    Ok(Json(ActionResult::success("Your vote has been cast.")))
}
