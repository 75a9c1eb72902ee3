//! DC/OS adapters for the collaborator traits of `sparkit-core`.
//!
//! Everything goes through the `dcos` and `aws` command line tools, run by a
//! [`CommandRunner`]; only the service readiness probe talks HTTP directly.

use std::sync::Arc;

use sparkit_core::{Collaborators, WaitConfig};
use sparkit_exec::CommandRunner;

mod cli;
pub use cli::DcosCli;

mod config;
pub use config::DcosConfig;

mod errors;
pub use errors::DcosError;

mod query;
pub use query::DcosClusterQuery;

mod s3;
pub use s3::S3ObjectStore;

mod secrets;
pub use secrets::DcosSecretStore;

mod service;
pub use service::DcosServiceManager;

mod transport;
pub use transport::DcosSparkTransport;

/// Wire every collaborator to one cluster.
pub fn collaborators(
    runner: Arc<dyn CommandRunner>,
    cfg: DcosConfig,
    wait: WaitConfig,
) -> Collaborators {
    let cli = DcosCli::new(runner, cfg);
    Collaborators {
        services: Arc::new(DcosServiceManager::new(cli.clone(), wait)),
        store: Arc::new(S3ObjectStore::new(cli.clone())),
        query: Arc::new(DcosClusterQuery::new(cli.clone())),
        secrets: Arc::new(DcosSecretStore::new(cli.clone())),
        transport: Arc::new(DcosSparkTransport::new(cli)),
    }
}
