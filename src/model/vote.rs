use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;
use crate::model::{
    candidate::CandidateId,
    election::ElectionStatus,
    store::{Document, Store},
    voter::VoterId,
};

pub type VoteId = u64;

/// A single cast vote. Votes are never modified once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: VoteId,
    pub voter_id: VoterId,
    pub candidate_id: CandidateId,
    pub timestamp: DateTime<Utc>,
}

/// Reasons a vote can be refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoteError {
    #[error("Voting is closed: the election is {0}.")]
    ElectionNotActive(ElectionStatus),
    #[error("Voter not found. Please log in again.")]
    UnknownVoter,
    #[error("You have already cast your vote.")]
    AlreadyVoted,
    #[error("Candidate {0} does not exist.")]
    UnknownCandidate(CandidateId),
}

impl Document {
    /// The next vote ID: one more than the current maximum.
    pub fn next_vote_id(&self) -> VoteId {
        self.votes.iter().map(|v| v.id).max().unwrap_or(0) + 1
    }

    /// Record `voter_id`'s vote for `candidate_id` at time `now`.
    ///
    /// The checks run in a fixed order: election status, voter, previous
    /// vote, candidate. The document is untouched if any of them fails.
    pub fn cast_vote(
        &mut self,
        voter_id: &str,
        candidate_id: CandidateId,
        now: DateTime<Utc>,
    ) -> std::result::Result<Vote, VoteError> {
        let status = self.status_at(now);
        if status != ElectionStatus::Active {
            return Err(VoteError::ElectionNotActive(status));
        }
        let voter = self.voter(voter_id).ok_or(VoteError::UnknownVoter)?;
        if voter.has_voted {
            return Err(VoteError::AlreadyVoted);
        }
        if self.candidate(candidate_id).is_none() {
            return Err(VoteError::UnknownCandidate(candidate_id));
        }

        let vote = Vote {
            id: self.next_vote_id(),
            voter_id: voter_id.to_string(),
            candidate_id,
            timestamp: now,
        };
        // Unwrap safe since the voter was found above.
        self.voter_mut(voter_id).unwrap().has_voted = true;
        self.votes.push(vote.clone());
        Ok(vote)
    }
}

impl Store {
    /// Cast a vote as of right now and persist it.
    pub fn cast_vote(&self, voter_id: &str, candidate_id: CandidateId) -> Result<Vote> {
        self.update(|document| {
            let vote = document.cast_vote(voter_id, candidate_id, Utc::now())?;
            info!("Recorded vote {} for candidate {}", vote.id, vote.candidate_id);
            Ok(vote)
        })
    }

    pub fn total_votes(&self) -> usize {
        self.read(|document| document.votes.len())
    }
}
