use std::sync::Arc;

use sparkit_model::{JobHandle, JobSpec};
use tracing::{info, instrument, trace};

use crate::{
    api::SubmitTransport, config::SubmitDefaults, error::SubmissionError, invocation::Invocation,
};

/// Fire-and-forget submission of [`JobSpec`]s.
///
/// `submit` returns as soon as the dispatcher accepted the job; waiting is a
/// separate step (see [`crate::Waiter`]).
#[derive(Clone)]
pub struct Submitter {
    transport: Arc<dyn SubmitTransport>,
    defaults: SubmitDefaults,
}

impl Submitter {
    pub fn new(transport: Arc<dyn SubmitTransport>, defaults: SubmitDefaults) -> Self {
        Self {
            transport,
            defaults,
        }
    }

    #[inline]
    pub fn defaults(&self) -> &SubmitDefaults {
        &self.defaults
    }

    /// Assemble and dispatch `spec`.
    #[instrument(level = "debug", skip(self, spec), fields(service = %spec.service_name(), app = %spec.app_url()))]
    pub async fn submit(&self, spec: &JobSpec) -> Result<JobHandle, SubmissionError> {
        let invocation = Invocation::assemble(spec, &self.defaults)?;
        let submit_args = invocation.submit_args();
        trace!(target: "sparkit.core.submit", %submit_args, "assembled invocation");

        let handle = self
            .transport
            .dispatch(invocation.service_name(), &submit_args)
            .await?;

        info!(target: "sparkit.core.submit", job = %handle, "job submitted");
        Ok(handle)
    }
}
