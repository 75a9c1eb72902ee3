use std::{fmt, str::FromStr};

/// Addressing scheme for objects in the object store.
///
/// Drivers fetch application artifacts over `http`; jobs read and write data
/// through the Hadoop connectors (`s3n`, `s3a`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlScheme {
    Http,
    S3n,
    S3a,
}

impl UrlScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlScheme::Http => "http",
            UrlScheme::S3n => "s3n",
            UrlScheme::S3a => "s3a",
        }
    }
}

impl fmt::Display for UrlScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrlScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(UrlScheme::Http),
            "s3n" => Ok(UrlScheme::S3n),
            "s3a" => Ok(UrlScheme::S3a),
            other => Err(format!("unknown url scheme: {other}")),
        }
    }
}
