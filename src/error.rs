use jsonwebtoken::errors::Error as JwtError;
use log::error;
use rocket::{http::Status, response::Responder, serde::json::Json, Request, Response};
use thiserror::Error;

use crate::model::{api::ActionResult, election::ScheduleError, vote::VoteError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input, e.g. a duplicate voter name.
    #[error("{0}")]
    Validation(String),
    /// An entity referenced by ID does not exist.
    #[error("{0} not found")]
    NotFound(String),
    /// The request is valid but not allowed in the current state.
    #[error("{0}")]
    StateConflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error(transparent)]
    Vote(#[from] VoteError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("Failed to access election data: {0}")]
    Persistence(#[from] std::io::Error),
    #[error("Failed to encode election data: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Jwt(#[from] JwtError),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// The HTTP status this error maps to.
    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) | Self::Schedule(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::StateConflict(_) => Status::Conflict,
            Self::Unauthorized(_) => Status::Unauthorized,
            Self::Vote(err) => match err {
                VoteError::UnknownVoter | VoteError::UnknownCandidate(_) => Status::NotFound,
                VoteError::ElectionNotActive(_) | VoteError::AlreadyVoted => Status::Conflict,
            },
            Self::Persistence(_) | Self::Serialization(_) | Self::Jwt(_) => {
                Status::InternalServerError
            }
        }
    }

    /// A message that is safe to show to the client.
    /// Internal failures are reported generically.
    pub fn public_message(&self) -> String {
        match self {
            Self::Persistence(_) | Self::Serialization(_) | Self::Jwt(_) => {
                "An internal error occurred. Please try again.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        if status == Status::InternalServerError {
            error!("{self}");
        }
        let body = Json(ActionResult::failure(self.public_message())).respond_to(req)?;
        Response::build_from(body).status(status).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::election::ElectionStatus;

    #[test]
    fn statuses() {
        assert_eq!(
            Error::Validation("bad".into()).status(),
            Status::BadRequest
        );
        assert_eq!(Error::not_found("Voter x").status(), Status::NotFound);
        assert_eq!(
            Error::from(VoteError::AlreadyVoted).status(),
            Status::Conflict
        );
        assert_eq!(
            Error::from(VoteError::ElectionNotActive(ElectionStatus::Ended)).status(),
            Status::Conflict
        );
        assert_eq!(
            Error::from(VoteError::UnknownCandidate(4)).status(),
            Status::NotFound
        );
        assert_eq!(
            Error::from(ScheduleError::InvalidSchedule).status(),
            Status::BadRequest
        );
    }

    #[test]
    fn internal_errors_are_not_leaked() {
        let err = Error::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/secret/path",
        ));
        assert_eq!(err.status(), Status::InternalServerError);
        assert!(!err.public_message().contains("/secret/path"));
        assert_eq!(
            Error::not_found("Candidate 3").public_message(),
            "Candidate 3 not found"
        );
    }
}
