use rocket::{serde::json::Json, Route, State};

use crate::model::{
    election::ElectionStatusDesc,
    results::{CandidateTally, Results},
    store::Store,
};

pub fn routes() -> Vec<Route> {
    routes![election, candidates, results]
}

#[get("/election")]
fn election(store: &State<Store>) -> Json<ElectionStatusDesc> {
    Json(store.election_status())
}

/// Every candidate with their current vote count.
#[get("/candidates")]
fn candidates(store: &State<Store>) -> Json<Vec<CandidateTally>> {
    Json(store.candidates_with_counts())
}

#[get("/results")]
fn results(store: &State<Store>) -> Json<Results> {
    Json(store.results())
}

#[cfg(test)]
mod tests {
    use rocket::{http::Status, local::asynchronous::Client};

    use crate::api::testing::open_schedule;
    use crate::model::{candidate::CandidateSpec, election::ElectionStatus};

    use super::*;

    #[backend_test]
    async fn empty_store(client: Client) {
        let response = client.get(uri!(election)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let desc: ElectionStatusDesc = response.into_json().await.unwrap();
        assert_eq!(desc.status, ElectionStatus::NotSet);
        assert_eq!(desc.start, None);

        let response = client.get(uri!(candidates)).dispatch().await;
        let tallies: Vec<CandidateTally> = response.into_json().await.unwrap();
        assert!(tallies.is_empty());

        let response = client.get(uri!(results)).dispatch().await;
        let summary: Results = response.into_json().await.unwrap();
        assert_eq!(summary.total_votes, 0);
        assert_eq!(summary.turnout, 0.0);
        assert!(summary.winners.is_empty());
    }

    #[backend_test]
    async fn tallies_and_results(client: Client, store: Store) {
        store.set_election_schedule(open_schedule()).unwrap();
        store.add_candidate(CandidateSpec::example("Alice")).unwrap();
        store.add_candidate(CandidateSpec::example("Bob")).unwrap();
        let voters = store.add_voters(["Ada", "Grace", "Edsger", "Barbara"]).unwrap().voters;
        for (voter, candidate) in voters.iter().zip([2, 2, 1]) {
            store.cast_vote(&voter.id, candidate).unwrap();
        }

        let response = client.get(uri!(candidates)).dispatch().await;
        let tallies: Vec<CandidateTally> = response.into_json().await.unwrap();
        let counts: Vec<_> = tallies
            .iter()
            .map(|t| (t.candidate.name.as_str(), t.vote_count))
            .collect();
        assert_eq!(counts, vec![("Alice", 1), ("Bob", 2)]);

        let response = client.get(uri!(results)).dispatch().await;
        let summary: Results = response.into_json().await.unwrap();
        assert_eq!(summary.status, ElectionStatus::Active);
        assert_eq!(summary.total_votes, 3);
        assert_eq!(summary.total_voters, 4);
        assert_eq!(summary.turnout, 0.75);
        assert!(summary.winners.is_empty());

        store.end_election_now().unwrap();
        let response = client.get(uri!(results)).dispatch().await;
        let summary: Results = response.into_json().await.unwrap();
        assert_eq!(summary.status, ElectionStatus::Ended);
        assert_eq!(summary.winners.len(), 1);
        assert_eq!(summary.winners[0].name, "Bob");
    }
}
