//! Scoped acquisition of shared cluster resources.
//!
//! [`ServiceScope`] brackets a whole suite run with one install and one
//! uninstall. [`with_secrets`] brackets a single scenario body with secret
//! creation and deletion; deletion runs whether the body succeeds, fails or
//! panics.

use std::{future::Future, panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use tracing::{error, info, warn};

use crate::{
    api::{SecretStore, SecretValue, ServiceManager, ServiceOptions},
    error::{CollaboratorError, CoreError},
};

/// An installed framework service. Pass it to whatever needs the service name
/// and call [`teardown`](Self::teardown) once at the end.
pub struct ServiceScope {
    manager: Arc<dyn ServiceManager>,
    options: ServiceOptions,
    torn_down: bool,
}

impl ServiceScope {
    /// Install the service and wait until it answers.
    ///
    /// A service that installs but never becomes ready is uninstalled again
    /// before the readiness error is returned.
    pub async fn setup(
        manager: Arc<dyn ServiceManager>,
        options: ServiceOptions,
    ) -> Result<Self, CollaboratorError> {
        info!(target: "sparkit.core.scope", service = %options.service_name, "installing service");
        manager.install(&options).await?;
        if let Err(e) = manager.wait_ready(&options.service_name).await {
            error!(target: "sparkit.core.scope", service = %options.service_name, "service not ready: {e}");
            if let Err(down) = manager.uninstall(&options.service_name).await {
                error!(target: "sparkit.core.scope", service = %options.service_name, "uninstall after failed readiness: {down}");
            }
            return Err(e);
        }
        info!(target: "sparkit.core.scope", service = %options.service_name, "service ready");

        Ok(Self {
            manager,
            options,
            torn_down: false,
        })
    }

    #[inline]
    pub fn service_name(&self) -> &str {
        &self.options.service_name
    }

    #[inline]
    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Uninstall the service.
    pub async fn teardown(mut self) -> Result<(), CollaboratorError> {
        self.torn_down = true;
        info!(target: "sparkit.core.scope", service = %self.options.service_name, "uninstalling service");
        self.manager.uninstall(&self.options.service_name).await
    }
}

impl Drop for ServiceScope {
    fn drop(&mut self) {
        if !self.torn_down {
            warn!(
                target: "sparkit.core.scope",
                service = %self.options.service_name,
                "service scope dropped without teardown; service left installed"
            );
        }
    }
}

/// A secret a scenario needs for its duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretSpec {
    pub path: String,
    pub value: SecretValue,
}

impl SecretSpec {
    pub fn literal(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: SecretValue::Literal(value.into()),
        }
    }

    pub fn file(path: impl Into<String>, file: impl Into<std::path::PathBuf>) -> Self {
        Self {
            path: path.into(),
            value: SecretValue::File(file.into()),
        }
    }
}

/// Create `secrets`, run `body`, then delete every secret that was created.
///
/// If creation fails part-way, the secrets created so far are deleted and the
/// creation error is returned without running `body`. A body error takes
/// precedence over deletion errors (which are logged); a panic in `body` is
/// resumed after deletion.
pub async fn with_secrets<T, F, Fut>(
    store: &dyn SecretStore,
    secrets: &[SecretSpec],
    body: F,
) -> Result<T, CoreError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    let mut created: Vec<&str> = Vec::with_capacity(secrets.len());
    for secret in secrets {
        if let Err(e) = store.create(&secret.path, &secret.value).await {
            error!(target: "sparkit.core.scope", path = %secret.path, "secret creation failed: {e}");
            release(store, &created).await;
            return Err(e.into());
        }
        info!(target: "sparkit.core.scope", path = %secret.path, "secret created");
        created.push(&secret.path);
    }

    let outcome = AssertUnwindSafe(body()).catch_unwind().await;
    let cleanup = release(store, &created).await;

    match outcome {
        Ok(Ok(value)) => match cleanup {
            Some(e) => Err(e.into()),
            None => Ok(value),
        },
        Ok(Err(e)) => Err(e),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// Delete in reverse creation order; returns the first failure.
async fn release(store: &dyn SecretStore, paths: &[&str]) -> Option<CollaboratorError> {
    let mut first = None;
    for path in paths.iter().rev() {
        match store.delete(path).await {
            Ok(()) => info!(target: "sparkit.core.scope", %path, "secret deleted"),
            Err(e) => {
                error!(target: "sparkit.core.scope", %path, "secret deletion failed: {e}");
                first.get_or_insert(e);
            }
        }
    }
    first
}
