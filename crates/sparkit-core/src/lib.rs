//! Job-submission and verification protocol.
//!
//! A scenario builds a [`JobSpec`](sparkit_model::JobSpec), hands it to the
//! [`Submitter`], waits with the [`Waiter`] and checks side effects with the
//! verifiers. [`Harness`] bundles those pieces over one set of cluster
//! collaborators (see [`api`]).

pub mod api;
pub mod config;
pub mod error;
pub mod harness;
pub mod invocation;
pub mod scope;
pub mod submit;
pub mod upload;
pub mod verify;
pub mod wait;

pub use api::{
    ClusterQuery, Collaborators, LogStream, ObjectStore, SecretStore, SecretValue,
    ServiceManager, ServiceOptions, SubmitTransport,
};
pub use config::{SubmitDefaults, WaitConfig};
pub use error::{AssertionFailure, CollaboratorError, CoreError, SubmissionError, UploadError};
pub use harness::Harness;
pub use invocation::Invocation;
pub use scope::{SecretSpec, ServiceScope, with_secrets};
pub use submit::Submitter;
pub use upload::Uploader;
pub use verify::{OutputVerifier, check_network, check_network_info};
pub use wait::{Waiter, poll_until};
