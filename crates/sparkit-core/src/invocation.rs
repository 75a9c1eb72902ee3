//! Serialization of a [`JobSpec`] into the single argument string the
//! framework's dispatcher parses.
//!
//! Order is fixed: flags, then the application URL, then the application's
//! own arguments. Flag tokens are split on whitespace, so incidental padding
//! (`"--conf "`, `" --class  "`) and empty tokens vanish instead of producing
//! empty or glued words.

use sparkit_model::JobSpec;

use crate::{config::SubmitDefaults, error::SubmissionError};

/// An assembled submission, ready to be dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    service_name: String,
    parts: Vec<String>,
}

impl Invocation {
    /// Assemble `spec` followed by `defaults`.
    pub fn assemble(spec: &JobSpec, defaults: &SubmitDefaults) -> Result<Self, SubmissionError> {
        let app_url = spec.app_url().trim();
        if app_url.is_empty() {
            return Err(SubmissionError::EmptyApplicationUrl);
        }
        let service_name = spec.service_name().trim();
        if service_name.is_empty() {
            return Err(SubmissionError::EmptyServiceName);
        }

        let default_flags = defaults.flags();
        let mut parts: Vec<String> = spec
            .flags()
            .iter()
            .chain(default_flags.iter())
            .flat_map(|token| token.split_whitespace())
            .map(str::to_string)
            .collect();

        parts.push(app_url.to_string());

        let app_args = spec.app_args().trim();
        if !app_args.is_empty() {
            parts.push(app_args.to_string());
        }

        Ok(Self {
            service_name: service_name.to_string(),
            parts,
        })
    }

    #[inline]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Words of the invocation in order; the application arguments are one entry.
    #[inline]
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// The `--submit-args` value.
    pub fn submit_args(&self) -> String {
        self.parts.join(" ")
    }
}
