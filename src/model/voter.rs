use std::collections::HashSet;

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    code::VotingCode,
    store::{Document, Store},
};

/// Opaque voter identifier.
pub type VoterId = String;

/// A registered student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voter {
    pub id: VoterId,
    pub name: String,
    /// Secret code the voter logs in with, alongside their name.
    pub code: VotingCode,
    pub has_voted: bool,
}

/// Outcome of a bulk voter import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAddResult {
    /// All voters after the import.
    pub voters: Vec<Voter>,
    pub added_count: usize,
    pub skipped_count: usize,
}

/// Generate a random voter ID that is not already in `taken`.
pub fn new_voter_id<R: Rng + ?Sized>(rng: &mut R, taken: &HashSet<&str>) -> VoterId {
    loop {
        let id = format!("{:016x}", rng.gen::<u64>());
        if !taken.contains(id.as_str()) {
            return id;
        }
    }
}

/// Voter names are unique ignoring case and surrounding whitespace.
fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

impl Document {
    pub fn voter(&self, id: &str) -> Option<&Voter> {
        self.users.iter().find(|voter| voter.id == id)
    }

    pub fn voter_mut(&mut self, id: &str) -> Option<&mut Voter> {
        self.users.iter_mut().find(|voter| voter.id == id)
    }

    pub fn voter_by_name(&self, name: &str) -> Option<&Voter> {
        self.users.iter().find(|voter| same_name(&voter.name, name))
    }

    /// Find the voter matching a login attempt.
    pub fn voter_by_credentials(&self, name: &str, code: &VotingCode) -> Option<&Voter> {
        self.voter_by_name(name).filter(|voter| voter.code == *code)
    }

    /// Register a new voter with a fresh ID and voting code.
    pub fn add_voter(&mut self, name: &str) -> Result<&Voter> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Voter name is required.".to_string()));
        }
        if self.voter_by_name(name).is_some() {
            return Err(Error::Validation(format!(
                "A voter named '{name}' already exists."
            )));
        }

        let mut rng = rand::thread_rng();
        let id = {
            let taken = self.users.iter().map(|v| v.id.as_str()).collect();
            new_voter_id(&mut rng, &taken)
        };
        let code = {
            let taken = self.users.iter().map(|v| v.code).collect();
            VotingCode::unique(&mut rng, &taken)
        };
        self.users.push(Voter {
            id,
            name: name.to_string(),
            code,
            has_voted: false,
        });
        // Unwrap safe since we just pushed.
        Ok(self.users.last().unwrap())
    }

    /// Register every name that is non-blank and not already taken.
    /// Returns the number of added and skipped names.
    pub fn add_voters<I, S>(&mut self, names: I) -> (usize, usize)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        let mut skipped = 0;
        for name in names {
            match self.add_voter(name.as_ref()) {
                Ok(_) => added += 1,
                Err(_) => skipped += 1,
            }
        }
        (added, skipped)
    }

    /// Remove a voter along with any vote they cast.
    pub fn delete_voter(&mut self, id: &str) -> Result<Voter> {
        let index = self
            .users
            .iter()
            .position(|voter| voter.id == id)
            .ok_or_else(|| Error::not_found(format!("Voter {id}")))?;
        let voter = self.users.remove(index);
        self.votes.retain(|vote| vote.voter_id != voter.id);
        Ok(voter)
    }
}

impl Store {
    /// Register a voter, returning the full voter list.
    pub fn add_voter(&self, name: &str) -> Result<Vec<Voter>> {
        self.update(|document| {
            let voter = document.add_voter(name)?;
            info!("Added voter {} ({})", voter.name, voter.id);
            Ok(document.users.clone())
        })
    }

    /// Register many voters at once, skipping blanks and duplicates.
    pub fn add_voters<I, S>(&self, names: I) -> Result<BulkAddResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.update(|document| {
            let (added_count, skipped_count) = document.add_voters(names);
            info!("Imported voters: {added_count} added, {skipped_count} skipped");
            Ok(BulkAddResult {
                voters: document.users.clone(),
                added_count,
                skipped_count,
            })
        })
    }

    pub fn delete_voter(&self, id: &str) -> Result<()> {
        self.update(|document| {
            let voter = document.delete_voter(id)?;
            info!("Deleted voter {} ({})", voter.name, voter.id);
            Ok(())
        })
    }

    pub fn voter(&self, id: &str) -> Option<Voter> {
        self.read(|document| document.voter(id).cloned())
    }

    pub fn voter_by_credentials(&self, name: &str, code: &VotingCode) -> Option<Voter> {
        self.read(|document| document.voter_by_credentials(name, code).cloned())
    }

    pub fn users(&self) -> Vec<Voter> {
        self.read(|document| document.users.clone())
    }

    pub fn total_voters(&self) -> usize {
        self.read(|document| document.users.len())
    }
}

/// Example data for tests.
#[cfg(test)]
pub(crate) mod examples {
    use super::*;

    impl Voter {
        pub fn example() -> Self {
            Self {
                id: "0123456789abcdef".to_string(),
                name: "Ada Lovelace".to_string(),
                code: "ADA12345".parse().unwrap(),
                has_voted: false,
            }
        }
    }
}
