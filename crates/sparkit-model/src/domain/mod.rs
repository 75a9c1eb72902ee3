mod kv;
pub use kv::KeyValue;

mod job_spec;
pub use job_spec::{DEFAULT_SERVICE_NAME, JobSpec};

mod job_handle;
pub use job_handle::JobHandle;

mod task_info;
pub use task_info::{ContainerInfo, Labels, NetworkInfo, TaskInfo, TaskState};

mod terminal_state;
pub use terminal_state::TerminalState;

mod expected;
pub use expected::{ExpectedOutcome, NetworkExpectation};

mod cluster_version;
pub use cluster_version::{ClusterVersion, ClusterVersionError};

mod url_scheme;
pub use url_scheme::UrlScheme;

/// Name under which a framework registers with the cluster (e.g. `"Spark Pi"`).
pub type FrameworkName = String;

/// Key of an object inside the object store, relative to the configured prefix.
pub type ObjectKey = String;
