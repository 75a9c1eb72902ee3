use std::{path::PathBuf, time::Duration};

use sparkit_model::JobHandle;
use thiserror::Error;

/// An artifact could not be made reachable by the cluster.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("artifact not found: {}", .0.display())]
    MissingArtifact(PathBuf),
    #[error("artifact path has no file name: {}", .0.display())]
    InvalidPath(PathBuf),
    #[error("object store rejected {}: {reason}", .path.display())]
    Rejected { path: PathBuf, reason: String },
}

/// A job could not be submitted.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("application url is empty")]
    EmptyApplicationUrl,
    #[error("service name is empty")]
    EmptyServiceName,
    #[error("submission transport failed: {0}")]
    Transport(String),
    #[error("unexpected submission response: {0}")]
    MalformedResponse(String),
}

/// An expected condition did not hold: the scenario failed, nothing broke.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AssertionFailure {
    pub message: String,
}

impl AssertionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure reported by an external collaborator (service manager, secret
/// store, object store, cluster query).
#[derive(Debug, Error)]
#[error("{collaborator}: {reason}")]
pub struct CollaboratorError {
    pub collaborator: &'static str,
    pub reason: String,
}

impl CollaboratorError {
    pub fn new(collaborator: &'static str, reason: impl Into<String>) -> Self {
        Self {
            collaborator,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("no output retrievable for job {0}")]
    OutputNotFound(JobHandle),

    #[error("{what} not reached within {after:?}")]
    Timeout { what: String, after: Duration },

    #[error("assertion failed: {0}")]
    Assertion(#[from] AssertionFailure),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

impl CoreError {
    /// `true` for the ordinary "test failed" signal, `false` for system errors.
    #[inline]
    pub fn is_assertion(&self) -> bool {
        matches!(self, CoreError::Assertion(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_assertions_classify_as_failures() {
        assert!(CoreError::from(AssertionFailure::new("nope")).is_assertion());
        assert!(!CoreError::OutputNotFound(JobHandle::from("driver-1")).is_assertion());
        assert!(!CoreError::from(SubmissionError::EmptyApplicationUrl).is_assertion());
        assert!(!CoreError::from(CollaboratorError::new("secrets", "denied")).is_assertion());
    }

    #[test]
    fn messages_name_the_source() {
        let err = CoreError::from(CollaboratorError::new("secret store", "403"));
        assert_eq!(err.to_string(), "secret store: 403");

        let err = CoreError::from(UploadError::MissingArtifact(PathBuf::from("/tmp/x.jar")));
        assert_eq!(err.to_string(), "artifact not found: /tmp/x.jar");
    }
}
