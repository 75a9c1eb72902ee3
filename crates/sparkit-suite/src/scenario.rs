use std::{fmt, str::FromStr};

use futures::future::LocalBoxFuture;
use sparkit_core::{
    AssertionFailure, CollaboratorError, CoreError, Harness, SubmissionError, UploadError,
};
use sparkit_model::ClusterVersion;
use thiserror::Error;

use crate::config::{ConfigError, SuiteConfig};

/// Tag used to select scenarios from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Sanity,
    Secrets,
}

impl Marker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Marker::Sanity => "sanity",
            Marker::Secrets => "secrets",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown marker {0:?} (expected sanity or secrets)")]
pub struct UnknownMarker(String);

impl FromStr for Marker {
    type Err = UnknownMarker;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sanity" => Ok(Marker::Sanity),
            "secrets" => Ok(Marker::Secrets),
            _ => Err(UnknownMarker(s.to_string())),
        }
    }
}

/// What a scenario needs from the cluster to be meaningful.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requirement {
    pub min_version: Option<ClusterVersion>,
    pub enterprise_only: bool,
}

impl Requirement {
    pub const NONE: Requirement = Requirement {
        min_version: None,
        enterprise_only: false,
    };

    pub const fn min_version(major: u32, minor: u32) -> Self {
        Self {
            min_version: Some(ClusterVersion::new(major, minor)),
            enterprise_only: false,
        }
    }

    pub const fn enterprise(mut self) -> Self {
        self.enterprise_only = true;
        self
    }

    /// Why the scenario cannot run on `cluster`, if it cannot.
    pub fn unmet(&self, cluster: &ClusterEnv) -> Option<String> {
        if let Some(min) = self.min_version.filter(|&min| !cluster.version.at_least(min)) {
            return Some(format!("requires DC/OS >= {min}, cluster is {}", cluster.version));
        }
        if self.enterprise_only && !cluster.enterprise {
            return Some("requires DC/OS Enterprise".to_string());
        }
        None
    }
}

/// Facts about the target cluster gathered once at suite setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterEnv {
    pub version: ClusterVersion,
    pub enterprise: bool,
}

/// Error ending a scenario body.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ScenarioError {
    #[inline]
    pub fn is_assertion(&self) -> bool {
        matches!(self, ScenarioError::Core(e) if e.is_assertion())
    }
}

impl From<UploadError> for ScenarioError {
    fn from(e: UploadError) -> Self {
        ScenarioError::Core(e.into())
    }
}

impl From<SubmissionError> for ScenarioError {
    fn from(e: SubmissionError) -> Self {
        ScenarioError::Core(e.into())
    }
}

impl From<CollaboratorError> for ScenarioError {
    fn from(e: CollaboratorError) -> Self {
        ScenarioError::Core(e.into())
    }
}

impl From<AssertionFailure> for ScenarioError {
    fn from(e: AssertionFailure) -> Self {
        ScenarioError::Core(e.into())
    }
}

/// What every scenario body gets.
pub struct SuiteContext {
    pub harness: Harness,
    pub config: SuiteConfig,
    pub cluster: ClusterEnv,
    /// `http` URL of the uploaded scala test jar.
    pub scala_jar_url: String,
}

pub type ScenarioFn = for<'a> fn(&'a SuiteContext) -> LocalBoxFuture<'a, Result<(), ScenarioError>>;

/// One entry of the catalogue.
#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub markers: &'static [Marker],
    pub requirement: Requirement,
    pub body: ScenarioFn,
}

impl Scenario {
    #[inline]
    pub fn has_marker(&self, marker: Marker) -> bool {
        self.markers.contains(&marker)
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("markers", &self.markers)
            .field("requirement", &self.requirement)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn cluster(major: u32, minor: u32, enterprise: bool) -> ClusterEnv {
        ClusterEnv {
            version: ClusterVersion::new(major, minor),
            enterprise,
        }
    }

    #[test_case(" Sanity" => Ok(Marker::Sanity))]
    #[test_case("secrets" => Ok(Marker::Secrets))]
    #[test_case("smoke" => Err(UnknownMarker("smoke".into())))]
    fn marker_parsing(s: &str) -> Result<Marker, UnknownMarker> {
        s.parse()
    }

    #[test]
    fn version_gate() {
        let req = Requirement::min_version(1, 10);
        assert!(req.unmet(&cluster(1, 10, false)).is_none());
        assert!(req.unmet(&cluster(1, 11, false)).is_none());
        let reason = req.unmet(&cluster(1, 9, true)).unwrap();
        assert_eq!(reason, "requires DC/OS >= 1.10, cluster is 1.9");
    }

    #[test]
    fn enterprise_gate() {
        let req = Requirement::min_version(1, 10).enterprise();
        assert!(req.unmet(&cluster(1, 10, true)).is_none());
        assert!(req.unmet(&cluster(1, 10, false)).is_some());
        assert!(Requirement::NONE.unmet(&cluster(1, 8, false)).is_none());
    }

    #[test]
    fn only_core_assertions_are_failures() {
        assert!(ScenarioError::from(AssertionFailure::new("x")).is_assertion());
        assert!(!ScenarioError::from(ConfigError::Missing("TEST_JAR_PATH")).is_assertion());
        assert!(!ScenarioError::from(SubmissionError::EmptyApplicationUrl).is_assertion());
    }
}
