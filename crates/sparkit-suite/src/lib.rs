//! Spark on DC/OS integration suite: the scenario catalogue and its runner.

mod config;
pub use config::{ConfigError, SPARK_EXAMPLES, SuiteConfig};

mod report;
pub use report::{Outcome, Report, ScenarioReport};

mod runner;
pub use runner::{Selection, SuiteError, SuiteRunner};

mod scenario;
pub use scenario::{
    ClusterEnv, Marker, Requirement, Scenario, ScenarioError, ScenarioFn, SuiteContext,
    UnknownMarker,
};

pub mod scenarios;
pub use scenarios::CATALOGUE;
