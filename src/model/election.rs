use std::fmt::Display;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;
use crate::model::store::{Document, Store};

/// Phases of the election, derived from the schedule and the current time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectionStatus {
    /// No complete schedule has been set.
    NotSet,
    /// Voting has not opened yet.
    Upcoming,
    /// Voting is open.
    Active,
    /// Voting has closed.
    Ended,
}

impl ElectionStatus {
    /// Derive the status at time `now`. The voting window includes its
    /// start instant but not its end instant.
    pub fn at(now: DateTime<Utc>, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        match (start, end) {
            (Some(start), Some(end)) => {
                if now < start {
                    Self::Upcoming
                } else if now < end {
                    Self::Active
                } else {
                    Self::Ended
                }
            }
            _ => Self::NotSet,
        }
    }
}

impl Display for ElectionStatus {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::NotSet => "not scheduled",
                Self::Upcoming => "upcoming",
                Self::Active => "active",
                Self::Ended => "ended",
            }
        )
    }
}

/// The election's current status along with its schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionStatusDesc {
    pub status: ElectionStatus,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// A requested voting window. Both ends absent clears the schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSchedule {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("The election must start before it ends.")]
    InvalidSchedule,
    #[error("Both a start and an end time are required.")]
    IncompleteSchedule,
}

impl Document {
    pub fn status_at(&self, now: DateTime<Utc>) -> ElectionStatus {
        ElectionStatus::at(now, self.election_start, self.election_end)
    }

    pub fn status_desc_at(&self, now: DateTime<Utc>) -> ElectionStatusDesc {
        ElectionStatusDesc {
            status: self.status_at(now),
            start: self.election_start,
            end: self.election_end,
        }
    }

    pub fn set_schedule(
        &mut self,
        schedule: ElectionSchedule,
    ) -> std::result::Result<(), ScheduleError> {
        match (schedule.start, schedule.end) {
            (Some(start), Some(end)) if start >= end => Err(ScheduleError::InvalidSchedule),
            (Some(_), None) | (None, Some(_)) => Err(ScheduleError::IncompleteSchedule),
            (start, end) => {
                self.election_start = start;
                self.election_end = end;
                Ok(())
            }
        }
    }
}

impl Store {
    /// The election status as of right now.
    pub fn election_status(&self) -> ElectionStatusDesc {
        self.read(|document| document.status_desc_at(Utc::now()))
    }

    pub fn set_election_schedule(&self, schedule: ElectionSchedule) -> Result<()> {
        self.update(|document| {
            document.set_schedule(schedule)?;
            match (document.election_start, document.election_end) {
                (Some(start), Some(end)) => info!("Election scheduled from {start} to {end}"),
                _ => info!("Election schedule cleared"),
            }
            Ok(())
        })
    }
}
