use serde::{Deserialize, Serialize};

use crate::model::{
    candidate::CandidateId,
    voter::{Voter, VoterId},
};

/// A student's login attempt. The code is parsed leniently, so any case and
/// surrounding whitespace is accepted.
#[derive(Clone, Deserialize, Serialize)]
pub struct StudentCredentials {
    pub name: String,
    pub code: String,
}

/// A voter to register.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewVoterRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub candidate_id: CandidateId,
}

/// What a logged-in voter may see about themselves. Never includes the code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterDesc {
    pub id: VoterId,
    pub name: String,
    pub has_voted: bool,
}

impl From<Voter> for VoterDesc {
    fn from(voter: Voter) -> Self {
        Self {
            id: voter.id,
            name: voter.name,
            has_voted: voter.has_voted,
        }
    }
}
