use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        api::{voter::NewVoterRequest, ActionResult},
        auth::{Admin, AuthToken},
        candidate::{Candidate, CandidateId, CandidateSpec},
        election::ElectionSchedule,
        results::PastWinner,
        store::Store,
        voter::{BulkAddResult, Voter},
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        get_voters,
        add_voter,
        add_voters,
        delete_voter,
        add_candidate,
        delete_candidate,
        set_schedule,
        end_election,
        reset_election,
        get_history,
        clear_history,
    ]
}

/// All voters, including their voting codes.
#[get("/admin/voters")]
fn get_voters(_token: AuthToken<Admin>, store: &State<Store>) -> Json<Vec<Voter>> {
    Json(store.users())
}

#[post("/admin/voters", data = "<request>", format = "json")]
fn add_voter(
    _token: AuthToken<Admin>,
    request: Json<NewVoterRequest>,
    store: &State<Store>,
) -> Result<Json<Vec<Voter>>> {
    Ok(Json(store.add_voter(&request.name)?))
}

/// Register many voters at once. Blank and already registered names are
/// skipped rather than failing the whole import.
#[post("/admin/voters/bulk", data = "<requests>", format = "json")]
fn add_voters(
    _token: AuthToken<Admin>,
    requests: Json<Vec<NewVoterRequest>>,
    store: &State<Store>,
) -> Result<Json<BulkAddResult>> {
    let names = requests.0.into_iter().map(|request| request.name);
    Ok(Json(store.add_voters(names)?))
}

#[delete("/admin/voters/<id>")]
fn delete_voter(
    _token: AuthToken<Admin>,
    id: &str,
    store: &State<Store>,
) -> Result<Json<ActionResult>> {
    store.delete_voter(id)?;
    Ok(Json(ActionResult::success("Voter deleted.")))
}

#[post("/admin/candidates", data = "<spec>", format = "json")]
fn add_candidate(
    _token: AuthToken<Admin>,
    spec: Json<CandidateSpec>,
    store: &State<Store>,
) -> Result<Json<Vec<Candidate>>> {
    Ok(Json(store.add_candidate(spec.0)?))
}

#[delete("/admin/candidates/<id>")]
fn delete_candidate(
    _token: AuthToken<Admin>,
    id: CandidateId,
    store: &State<Store>,
) -> Result<Json<ActionResult>> {
    store.delete_candidate(id)?;
    Ok(Json(ActionResult::success("Candidate deleted.")))
}

/// Set or clear the voting window.
#[put("/admin/election/schedule", data = "<schedule>", format = "json")]
fn set_schedule(
    _token: AuthToken<Admin>,
    schedule: Json<ElectionSchedule>,
    store: &State<Store>,
) -> Result<Json<ActionResult>> {
    let cleared = schedule.start.is_none() && schedule.end.is_none();
    store.set_election_schedule(schedule.0)?;
    Ok(Json(ActionResult::success(if cleared {
        "Election schedule cleared."
    } else {
        "Election schedule updated."
    })))
}

/// End the election now. Returns the archived result, or null if no votes
/// were cast.
#[post("/admin/election/end")]
fn end_election(
    _token: AuthToken<Admin>,
    store: &State<Store>,
) -> Result<Json<Option<PastWinner>>> {
    Ok(Json(store.end_election_now()?))
}

/// Discard all votes and unschedule the election.
#[post("/admin/election/reset")]
fn reset_election(_token: AuthToken<Admin>, store: &State<Store>) -> Result<Json<ActionResult>> {
    store.reset_votes()?;
    Ok(Json(ActionResult::success("Election reset.")))
}

#[get("/admin/history")]
fn get_history(_token: AuthToken<Admin>, store: &State<Store>) -> Json<Vec<PastWinner>> {
    Json(store.past_winners())
}

#[delete("/admin/history")]
fn clear_history(_token: AuthToken<Admin>, store: &State<Store>) -> Result<Json<ActionResult>> {
    store.clear_history()?;
    Ok(Json(ActionResult::success("Election history cleared.")))
}
