//! The scenario catalogue.
//!
//! Every entry is independent: it builds its own [`JobSpec`]s, uploads what
//! it needs and cleans up what it creates. The shared service install lives
//! in the runner.
//!
//! [`JobSpec`]: sparkit_model::JobSpec

use crate::scenario::{Marker, Requirement, Scenario};

mod jobs;
mod network;
mod secrets;
mod storage;

pub(crate) const SPARK_PI_CLASS: &str = "org.apache.spark.examples.SparkPi";
pub(crate) const PI_OUTPUT: &str = "Pi is roughly 3";

const SANITY: &[Marker] = &[Marker::Sanity];
const SANITY_SECRETS: &[Marker] = &[Marker::Sanity, Marker::Secrets];

/// All scenarios, in execution order.
pub static CATALOGUE: &[Scenario] = &[
    Scenario {
        name: "jar",
        markers: SANITY,
        requirement: Requirement::NONE,
        body: jobs::jar,
    },
    Scenario {
        name: "spark_pi",
        markers: SANITY,
        requirement: Requirement::NONE,
        body: jobs::spark_pi,
    },
    Scenario {
        name: "python",
        markers: SANITY,
        requirement: Requirement::NONE,
        body: jobs::python,
    },
    Scenario {
        name: "r",
        markers: SANITY,
        requirement: Requirement::NONE,
        body: jobs::r,
    },
    Scenario {
        name: "cni",
        markers: SANITY,
        requirement: Requirement::NONE,
        body: network::cni,
    },
    Scenario {
        name: "cni_labels",
        markers: SANITY,
        requirement: Requirement::NONE,
        body: network::cni_labels,
    },
    Scenario {
        name: "s3",
        markers: SANITY,
        requirement: Requirement::NONE,
        body: storage::s3,
    },
    // Admin router has no service-group support before 1.10.
    Scenario {
        name: "marathon_group",
        markers: SANITY,
        requirement: Requirement::min_version(1, 10),
        body: jobs::marathon_group,
    },
    Scenario {
        name: "secrets",
        markers: SANITY_SECRETS,
        requirement: Requirement::NONE,
        body: secrets::secrets,
    },
    Scenario {
        name: "cli_multiple_spaces",
        markers: SANITY,
        requirement: Requirement::NONE,
        body: jobs::cli_multiple_spaces,
    },
    // File-based secrets arrived in 1.10.
    Scenario {
        name: "driver_executor_tls",
        markers: SANITY,
        requirement: Requirement::min_version(1, 10).enterprise(),
        body: secrets::driver_executor_tls,
    },
];

/// Catalogue entry by name.
pub fn find(name: &str) -> Option<&'static Scenario> {
    CATALOGUE.iter().find(|s| s.name == name)
}
