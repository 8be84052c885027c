use log::info;
use rocket::http::uri::Absolute;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::store::{Document, Store};

pub type CandidateId = u32;

pub const MIN_NAME_LENGTH: usize = 3;
pub const MIN_BIO_LENGTH: usize = 10;

/// A candidate standing in the election. Vote counts are never stored here;
/// see [`crate::model::results::CandidateTally`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub bio: String,
    pub image_url: String,
    /// Short description of the portrait, used as a hint by the frontend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_ai_hint: Option<String>,
}

/// A candidate as submitted by an admin, before it has an ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSpec {
    pub name: String,
    pub bio: String,
    pub image_url: String,
    #[serde(default)]
    pub data_ai_hint: Option<String>,
}

impl CandidateSpec {
    /// Check the submission against the candidate form rules, collecting
    /// every problem into one message.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.name.trim().chars().count() < MIN_NAME_LENGTH {
            problems.push(format!(
                "Name must be at least {MIN_NAME_LENGTH} characters long."
            ));
        }
        if self.bio.trim().chars().count() < MIN_BIO_LENGTH {
            problems.push(format!(
                "Bio must be at least {MIN_BIO_LENGTH} characters long."
            ));
        }
        if !is_web_url(self.image_url.trim()) {
            problems.push("Please enter a valid image URL.".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(problems.join(" ")))
        }
    }
}

/// Is `url` an absolute http(s) URL with a host?
fn is_web_url(url: &str) -> bool {
    match Absolute::parse(url) {
        Ok(uri) => {
            let scheme = uri.scheme();
            (scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"))
                && uri.authority().map_or(false, |a| !a.host().is_empty())
        }
        Err(_) => false,
    }
}

impl Document {
    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|candidate| candidate.id == id)
    }

    /// The next candidate ID: one more than the current maximum.
    pub fn next_candidate_id(&self) -> CandidateId {
        self.candidates.iter().map(|c| c.id).max().unwrap_or(0) + 1
    }

    pub fn add_candidate(&mut self, spec: CandidateSpec) -> Result<&Candidate> {
        spec.validate()?;
        let candidate = Candidate {
            id: self.next_candidate_id(),
            name: spec.name.trim().to_string(),
            bio: spec.bio.trim().to_string(),
            image_url: spec.image_url.trim().to_string(),
            data_ai_hint: spec
                .data_ai_hint
                .map(|hint| hint.trim().to_string())
                .filter(|hint| !hint.is_empty()),
        };
        self.candidates.push(candidate);
        // Unwrap safe since we just pushed.
        Ok(self.candidates.last().unwrap())
    }

    /// Remove a candidate and every vote cast for them.
    ///
    /// Voters whose vote is removed get their `has_voted` flag cleared, so
    /// they may vote again.
    pub fn delete_candidate(&mut self, id: CandidateId) -> Result<Candidate> {
        let index = self
            .candidates
            .iter()
            .position(|candidate| candidate.id == id)
            .ok_or_else(|| Error::not_found(format!("Candidate {id}")))?;
        let candidate = self.candidates.remove(index);

        let (removed, kept) = std::mem::take(&mut self.votes)
            .into_iter()
            .partition::<Vec<_>, _>(|vote| vote.candidate_id == id);
        self.votes = kept;
        for vote in removed {
            if let Some(voter) = self.voter_mut(&vote.voter_id) {
                voter.has_voted = false;
            }
        }
        Ok(candidate)
    }
}

impl Store {
    /// Add a candidate, returning the full candidate list.
    pub fn add_candidate(&self, spec: CandidateSpec) -> Result<Vec<Candidate>> {
        self.update(|document| {
            let candidate = document.add_candidate(spec)?;
            info!("Added candidate {} ({})", candidate.name, candidate.id);
            Ok(document.candidates.clone())
        })
    }

    pub fn delete_candidate(&self, id: CandidateId) -> Result<()> {
        self.update(|document| {
            let candidate = document.delete_candidate(id)?;
            info!("Deleted candidate {} ({})", candidate.name, candidate.id);
            Ok(())
        })
    }

    /// All candidates, ordered by ID.
    pub fn candidates(&self) -> Vec<Candidate> {
        let mut candidates = self.read(|document| document.candidates.clone());
        candidates.sort_by_key(|c| c.id);
        candidates
    }
}
