use sparkit_core::CollaboratorError;
use sparkit_exec::ExecError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DcosError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("failed to parse cli output: {0}")]
    InvalidResponse(String),

    #[error("command rejected: {0}")]
    Rejected(String),

    #[error("could not write options file: {0}")]
    OptionsFile(#[from] std::io::Error),

    #[error("service {0} did not become ready in time")]
    NotReady(String),
}

impl DcosError {
    /// Attribute this error to the collaborator that hit it.
    pub fn by(self, collaborator: &'static str) -> CollaboratorError {
        CollaboratorError::new(collaborator, self.to_string())
    }
}
