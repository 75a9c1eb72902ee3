use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid cluster version: {0:?}")]
pub struct ClusterVersionError(pub String);

/// `major.minor` version of the cluster, used to gate scenarios on features
/// older releases lack. Patch and pre-release suffixes are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClusterVersion {
    pub major: u32,
    pub minor: u32,
}

impl ClusterVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    #[inline]
    pub fn at_least(&self, other: ClusterVersion) -> bool {
        *self >= other
    }
}

impl fmt::Display for ClusterVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ClusterVersion {
    type Err = ClusterVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ClusterVersionError(s.to_string());
        let core = s.trim().split(['-', '+']).next().ok_or_else(err)?;
        let mut parts = core.split('.');

        let major = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
        let minor = match parts.next() {
            Some(p) => p.parse().map_err(|_| err())?,
            None => 0,
        };
        Ok(Self { major, minor })
    }
}
