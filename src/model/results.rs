use chrono::{DateTime, Duration, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    candidate::{Candidate, CandidateId},
    election::ElectionStatus,
    store::{Document, Store},
};

/// A candidate together with the number of votes cast for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTally {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub vote_count: usize,
}

/// A leading candidate as recorded in the election history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    pub id: CandidateId,
    pub name: String,
    pub vote_count: usize,
}

impl From<&CandidateTally> for Winner {
    fn from(tally: &CandidateTally) -> Self {
        Self {
            id: tally.candidate.id,
            name: tally.candidate.name.clone(),
            vote_count: tally.vote_count,
        }
    }
}

/// Archived outcome of one ended election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastWinner {
    pub date: DateTime<Utc>,
    pub winners: Vec<Winner>,
    pub total_votes: usize,
}

/// Live results, as shown on the results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Results {
    pub status: ElectionStatus,
    pub candidates: Vec<CandidateTally>,
    pub total_votes: usize,
    pub total_voters: usize,
    /// Fraction of registered voters who have voted, between 0 and 1.
    pub turnout: f64,
    /// Leading candidates. Only reported once the election has ended.
    pub winners: Vec<Winner>,
}

/// Every candidate whose tally equals the highest tally.
///
/// There are no winners when there are no candidates or no votes at all.
pub fn compute_winners(tallies: &[CandidateTally]) -> Vec<Winner> {
    let total_votes: usize = tallies.iter().map(|t| t.vote_count).sum();
    if total_votes == 0 {
        return Vec::new();
    }
    // Unwrap safe since a non-zero total means there is at least one tally.
    let max = tallies.iter().map(|t| t.vote_count).max().unwrap();
    tallies
        .iter()
        .filter(|t| t.vote_count == max)
        .map(Winner::from)
        .collect()
}

/// Fraction of voters who voted. Zero when nobody is registered.
pub fn turnout(total_votes: usize, total_voters: usize) -> f64 {
    if total_voters == 0 {
        0.0
    } else {
        total_votes as f64 / total_voters as f64
    }
}

impl Document {
    /// Tally the vote log per candidate, ordered by candidate ID.
    pub fn tallies(&self) -> Vec<CandidateTally> {
        let mut tallies: Vec<_> = self
            .candidates
            .iter()
            .map(|candidate| CandidateTally {
                candidate: candidate.clone(),
                vote_count: self
                    .votes
                    .iter()
                    .filter(|vote| vote.candidate_id == candidate.id)
                    .count(),
            })
            .collect();
        tallies.sort_by_key(|t| t.candidate.id);
        tallies
    }

    /// Close voting at `now` and archive the result.
    ///
    /// If the election had not started by `now`, its start is moved to just
    /// before `now` so that the status reads as ended. A history record is only
    /// created when at least one vote was cast.
    pub fn end_election(&mut self, now: DateTime<Utc>) -> Option<PastWinner> {
        self.election_end = Some(now);
        if self.election_start.map_or(true, |start| start > now) {
            self.election_start = Some(now - Duration::seconds(1));
        }

        let tallies = self.tallies();
        let total_votes: usize = tallies.iter().map(|t| t.vote_count).sum();
        if total_votes == 0 {
            return None;
        }
        let record = PastWinner {
            date: now,
            winners: compute_winners(&tallies),
            total_votes,
        };
        self.past_winners.push(record.clone());
        Some(record)
    }

    /// Discard every vote and unschedule the election.
    /// Candidates, voters, and history are kept.
    pub fn reset_votes(&mut self) {
        self.votes.clear();
        for voter in &mut self.users {
            voter.has_voted = false;
        }
        self.election_start = None;
        self.election_end = None;
    }

    pub fn clear_history(&mut self) {
        self.past_winners.clear();
    }

    pub fn results_at(&self, now: DateTime<Utc>) -> Results {
        let status = self.status_at(now);
        let candidates = self.tallies();
        let total_votes = self.votes.len();
        let total_voters = self.users.len();
        let winners = if status == ElectionStatus::Ended {
            compute_winners(&candidates)
        } else {
            Vec::new()
        };
        Results {
            status,
            candidates,
            total_votes,
            total_voters,
            turnout: turnout(total_votes, total_voters),
            winners,
        }
    }
}

impl Store {
    /// Every candidate with their current vote count.
    pub fn candidates_with_counts(&self) -> Vec<CandidateTally> {
        self.read(Document::tallies)
    }

    pub fn results(&self) -> Results {
        self.read(|document| document.results_at(Utc::now()))
    }

    /// End the election immediately, returning the archived record if any
    /// votes were cast.
    pub fn end_election_now(&self) -> Result<Option<PastWinner>> {
        self.update(|document| {
            let record = document.end_election(Utc::now());
            match &record {
                Some(record) => {
                    let names = record
                        .winners
                        .iter()
                        .map(|w| w.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    info!(
                        "Election ended with {} votes, won by {names}",
                        record.total_votes
                    );
                }
                None => info!("Election ended with no votes cast"),
            }
            Ok(record)
        })
    }

    pub fn reset_votes(&self) -> Result<()> {
        self.update(|document| {
            let discarded = document.votes.len();
            document.reset_votes();
            info!("Reset election, discarding {discarded} votes");
            Ok(())
        })
    }

    pub fn clear_history(&self) -> Result<()> {
        self.update(|document| {
            document.clear_history();
            info!("Cleared election history");
            Ok(())
        })
    }

    pub fn past_winners(&self) -> Vec<PastWinner> {
        self.read(|document| document.past_winners.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{
        candidate::CandidateSpec, election::ElectionSchedule, store::testing::TempStore,
    };

    fn tally(id: CandidateId, name: &str, vote_count: usize) -> CandidateTally {
        let mut candidate = Candidate::example();
        candidate.id = id;
        candidate.name = name.to_string();
        CandidateTally {
            candidate,
            vote_count,
        }
    }

    fn winner_ids(winners: &[Winner]) -> Vec<CandidateId> {
        winners.iter().map(|w| w.id).collect()
    }

    /// Three candidates and enough voters to give each the requested number
    /// of votes, with voting open around `now`.
    fn document_with_votes(now: DateTime<Utc>, counts: [usize; 3]) -> Document {
        let mut document = Document::default();
        for name in ["Alice", "Bob", "Carol"] {
            document.add_candidate(CandidateSpec::example(name)).unwrap();
        }
        document
            .set_schedule(ElectionSchedule {
                start: Some(now - Duration::hours(1)),
                end: Some(now + Duration::hours(1)),
            })
            .unwrap();
        let mut voter = 0;
        for (candidate, count) in (1..).zip(counts) {
            for _ in 0..count {
                let id = document.add_voter(&format!("Voter {voter}")).unwrap().id.clone();
                document.cast_vote(&id, candidate, now).unwrap();
                voter += 1;
            }
        }
        document
    }

    #[test]
    fn no_winners_without_votes() {
        assert!(compute_winners(&[]).is_empty());
        let tallies = [tally(1, "Alice", 0), tally(2, "Bob", 0)];
        assert!(compute_winners(&tallies).is_empty());
    }

    #[test]
    fn tie_gives_multiple_winners() {
        let tallies = [tally(1, "A", 5), tally(2, "B", 5), tally(3, "C", 3)];
        assert_eq!(winner_ids(&compute_winners(&tallies)), vec![1, 2]);
    }

    #[test]
    fn single_leader() {
        let tallies = [tally(1, "A", 8), tally(2, "B", 5), tally(3, "C", 2)];
        let winners = compute_winners(&tallies);
        assert_eq!(
            winners,
            vec![Winner {
                id: 1,
                name: "A".to_string(),
                vote_count: 8
            }]
        );
    }

    #[test]
    fn turnout_fraction() {
        assert_eq!(turnout(15, 20), 0.75);
        assert_eq!(turnout(0, 0), 0.0);
        assert_eq!(turnout(0, 10), 0.0);
    }

    #[test]
    fn tallies_count_vote_log() {
        let now = Utc::now();
        let document = document_with_votes(now, [8, 5, 2]);
        let counts: Vec<_> = document.tallies().iter().map(|t| t.vote_count).collect();
        assert_eq!(counts, vec![8, 5, 2]);

        let results = document.results_at(now);
        assert_eq!(results.status, ElectionStatus::Active);
        assert_eq!(results.total_votes, 15);
        assert_eq!(results.total_voters, 15);
        assert_eq!(results.turnout, 1.0);
        // Winners are withheld while voting is open.
        assert!(results.winners.is_empty());

        let later = document.results_at(now + Duration::hours(2));
        assert_eq!(winner_ids(&later.winners), vec![1]);
    }

    #[test]
    fn deleted_candidate_leaves_tallies() {
        let now = Utc::now();
        let mut document = document_with_votes(now, [2, 3, 1]);
        document.delete_candidate(2).unwrap();
        let tallies = document.tallies();
        assert_eq!(winner_ids(&compute_winners(&tallies)), vec![1]);
        assert!(tallies.iter().all(|t| t.candidate.id != 2));
        assert_eq!(document.votes.len(), 3);
    }

    #[test]
    fn end_election_archives_tallies() {
        let now = Utc::now();
        let mut document = document_with_votes(now, [5, 5, 3]);

        let record = document.end_election(now).unwrap();
        assert_eq!(record.date, now);
        assert_eq!(record.total_votes, 13);
        assert_eq!(winner_ids(&record.winners), vec![1, 2]);
        assert!(record.winners.iter().all(|w| w.vote_count == 5));
        assert_eq!(document.past_winners, vec![record]);
        assert_eq!(document.status_at(now), ElectionStatus::Ended);
    }

    #[test]
    fn end_election_without_votes_archives_nothing() {
        let now = Utc::now();
        let mut document = document_with_votes(now, [0, 0, 0]);
        assert_eq!(document.end_election(now), None);
        assert!(document.past_winners.is_empty());
        assert_eq!(document.status_at(now), ElectionStatus::Ended);
    }

    #[test]
    fn end_election_before_start() {
        let now = Utc::now();
        let mut document = Document::default();
        assert_eq!(document.end_election(now), None);
        assert_eq!(document.status_at(now), ElectionStatus::Ended);

        document
            .set_schedule(ElectionSchedule {
                start: Some(now + Duration::days(1)),
                end: Some(now + Duration::days(2)),
            })
            .unwrap();
        document.end_election(now);
        assert!(document.election_start.unwrap() < now);
        assert_eq!(document.election_end, Some(now));
        assert_eq!(document.status_at(now), ElectionStatus::Ended);
    }

    #[test]
    fn reset_keeps_people_and_history() {
        let now = Utc::now();
        let mut document = document_with_votes(now, [2, 1, 0]);
        document.end_election(now);
        let users = document.users.len();
        let candidates = document.candidates.clone();
        let history = document.past_winners.clone();

        document.reset_votes();
        assert!(document.votes.is_empty());
        assert!(document.users.iter().all(|v| !v.has_voted));
        assert_eq!(document.users.len(), users);
        assert_eq!(document.candidates, candidates);
        assert_eq!(document.past_winners, history);
        assert_eq!(document.status_at(now), ElectionStatus::NotSet);
    }

    #[test]
    fn clear_history_only_touches_history() {
        let now = Utc::now();
        let mut document = document_with_votes(now, [1, 0, 0]);
        document.past_winners.push(PastWinner {
            date: now,
            winners: vec![],
            total_votes: 0,
        });
        document.clear_history();
        assert!(document.past_winners.is_empty());
        assert_eq!(document.votes.len(), 1);
    }

    #[test]
    fn store_end_and_reset() {
        let store = TempStore::new();
        store.save(&document_with_votes(Utc::now(), [1, 2, 0])).unwrap();

        let record = store.end_election_now().unwrap().unwrap();
        assert_eq!(winner_ids(&record.winners), vec![2]);
        assert_eq!(store.past_winners(), vec![record]);
        assert_eq!(store.election_status().status, ElectionStatus::Ended);
        assert_eq!(store.results().winners.len(), 1);

        store.reset_votes().unwrap();
        assert_eq!(store.total_votes(), 0);
        assert_eq!(store.election_status().status, ElectionStatus::NotSet);
        assert_eq!(store.past_winners().len(), 1);
        assert!(store
            .candidates_with_counts()
            .iter()
            .all(|t| t.vote_count == 0));

        store.clear_history().unwrap();
        assert!(store.past_winners().is_empty());
        assert_eq!(store.total_voters(), 3);
    }

    #[test]
    fn tally_serializes_flat() {
        let value = serde_json::to_value(tally(3, "Carol", 4)).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["name"], "Carol");
        assert_eq!(value["voteCount"], 4);
        assert_eq!(value["imageUrl"], "https://example.com/alice.png");
    }

    #[test]
    fn past_winner_layout() {
        let record = PastWinner {
            date: "2026-05-01T18:00:00Z".parse().unwrap(),
            winners: vec![Winner {
                id: 1,
                name: "Alice".to_string(),
                vote_count: 3,
            }],
            total_votes: 4,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["date"], "2026-05-01T18:00:00Z");
        assert_eq!(value["totalVotes"], 4);
        assert_eq!(value["winners"][0]["voteCount"], 3);
    }
}
