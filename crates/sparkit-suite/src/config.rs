use std::path::PathBuf;

use thiserror::Error;

/// Examples jar shipped with the framework distribution.
pub const SPARK_EXAMPLES: &str =
    "http://downloads.mesosphere.com/spark/assets/spark-examples_2.11-2.0.1.jar";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {var} has unsupported value {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Everything the suite reads from its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    /// `TEST_JAR_PATH`: integration-test jar for the `jar` scenarios.
    pub test_jar: Option<PathBuf>,
    /// `SCALA_TEST_JAR_PATH`: jar with `S3Job` and `SecretsJob`.
    pub scala_test_jar: PathBuf,
    pub s3_bucket: String,
    pub s3_prefix: String,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    /// `SECURITY=strict`.
    pub strict: bool,
    /// `DCOS_VARIANT=ee`.
    pub enterprise: bool,
    /// Job scripts and data files; `SPARKIT_RESOURCES_DIR` or the crate's `resources/`.
    pub resources_dir: PathBuf,
    /// `SPARK_EXAMPLES_URL` or [`SPARK_EXAMPLES`].
    pub spark_examples_url: String,
}

impl SuiteConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from `lookup`, which maps a variable name to its value. Empty
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let enterprise = match get("DCOS_VARIANT").as_deref().map(str::to_ascii_lowercase) {
            None => false,
            Some(v) if v == "ee" || v == "enterprise" => true,
            Some(v) if v == "open" || v == "oss" => false,
            Some(value) => {
                return Err(ConfigError::Invalid {
                    var: "DCOS_VARIANT",
                    value,
                });
            }
        };

        Ok(Self {
            test_jar: get("TEST_JAR_PATH").map(PathBuf::from),
            scala_test_jar: require("SCALA_TEST_JAR_PATH")?.into(),
            s3_bucket: require("S3_BUCKET")?,
            s3_prefix: get("S3_PREFIX").unwrap_or_default(),
            aws_access_key_id: get("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: get("AWS_SECRET_ACCESS_KEY"),
            strict: get("SECURITY").is_some_and(|v| v.eq_ignore_ascii_case("strict")),
            enterprise,
            resources_dir: get("SPARKIT_RESOURCES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources")),
            spark_examples_url: get("SPARK_EXAMPLES_URL")
                .unwrap_or_else(|| SPARK_EXAMPLES.to_string()),
        })
    }

    pub fn resource(&self, relative: &str) -> PathBuf {
        self.resources_dir.join(relative)
    }

    pub fn test_jar(&self) -> Result<&PathBuf, ConfigError> {
        self.test_jar.as_ref().ok_or(ConfigError::Missing("TEST_JAR_PATH"))
    }

    /// `(access key id, secret access key)`.
    pub fn aws_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let id = self
            .aws_access_key_id
            .as_deref()
            .ok_or(ConfigError::Missing("AWS_ACCESS_KEY_ID"))?;
        let secret = self
            .aws_secret_access_key
            .as_deref()
            .ok_or(ConfigError::Missing("AWS_SECRET_ACCESS_KEY"))?;
        Ok((id, secret))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use test_case::test_case;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const BASE: [(&str, &str); 2] = [
        ("SCALA_TEST_JAR_PATH", "/jars/dcos-spark-scala-tests.jar"),
        ("S3_BUCKET", "infinity-artifacts"),
    ];

    #[test]
    fn minimal_environment() {
        let cfg = SuiteConfig::from_lookup(lookup(&BASE)).unwrap();
        assert_eq!(cfg.scala_test_jar, PathBuf::from("/jars/dcos-spark-scala-tests.jar"));
        assert_eq!(cfg.s3_prefix, "");
        assert!(!cfg.strict && !cfg.enterprise);
        assert!(cfg.resources_dir.ends_with("resources"));
        assert_eq!(cfg.spark_examples_url, SPARK_EXAMPLES);
        assert_eq!(cfg.test_jar(), Err(ConfigError::Missing("TEST_JAR_PATH")));
        assert_eq!(
            cfg.aws_credentials(),
            Err(ConfigError::Missing("AWS_ACCESS_KEY_ID"))
        );
    }

    #[test]
    fn missing_bucket_is_reported() {
        let err = SuiteConfig::from_lookup(lookup(&BASE[..1])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("S3_BUCKET"));
    }

    #[test]
    fn empty_value_counts_as_unset() {
        let mut vars = BASE.to_vec();
        vars.push(("TEST_JAR_PATH", "  "));
        let cfg = SuiteConfig::from_lookup(lookup(&vars)).unwrap();
        assert!(cfg.test_jar.is_none());
    }

    #[test_case("strict" => true)]
    #[test_case("STRICT" => true)]
    #[test_case("permissive" => false)]
    fn security_mode(value: &str) -> bool {
        let mut vars = BASE.to_vec();
        vars.push(("SECURITY", value));
        SuiteConfig::from_lookup(lookup(&vars)).unwrap().strict
    }

    #[test_case("ee" => Ok(true))]
    #[test_case("Enterprise" => Ok(true))]
    #[test_case("open" => Ok(false))]
    #[test_case("pro" => Err(ConfigError::Invalid { var: "DCOS_VARIANT", value: "pro".into() }))]
    fn variant(value: &str) -> Result<bool, ConfigError> {
        let mut vars = BASE.to_vec();
        vars.push(("DCOS_VARIANT", value));
        SuiteConfig::from_lookup(lookup(&vars)).map(|c| c.enterprise)
    }
}
