use std::time::Duration;

/// Polling cadence and time budgets of the completion waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Delay between two probes of cluster state.
    pub poll_interval: Duration,
    /// Budget for executors of a framework to reach `TASK_RUNNING`.
    pub executor_timeout: Duration,
    /// Budget for a submitted job to reach a terminal state.
    pub completion_timeout: Duration,
    /// Budget for an installed service to answer.
    pub service_timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            executor_timeout: Duration::from_secs(600),
            completion_timeout: Duration::from_secs(1200),
            service_timeout: Duration::from_secs(600),
        }
    }
}

impl WaitConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_executor_timeout(mut self, timeout: Duration) -> Self {
        self.executor_timeout = timeout;
        self
    }

    pub fn with_completion_timeout(mut self, timeout: Duration) -> Self {
        self.completion_timeout = timeout;
        self
    }

    pub fn with_service_timeout(mut self, timeout: Duration) -> Self {
        self.service_timeout = timeout;
        self
    }
}

const MESOS_MODULES: &str =
    "file:///opt/mesosphere/etc/mesos-scheduler-modules/dcos_authenticatee_module.json";
const MESOS_AUTHENTICATEE: &str = "com_mesosphere_dcos_ClassicRPCAuthenticatee";

/// Flags appended to every submission after the scenario's own flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitDefaults {
    /// `spark.driver.memory`; `None` leaves the framework default.
    pub driver_memory: Option<String>,
    /// Cluster runs in strict security mode: the driver must authenticate.
    pub strict: bool,
    /// Principal the driver authenticates as in strict mode.
    pub principal: String,
}

impl Default for SubmitDefaults {
    fn default() -> Self {
        Self {
            driver_memory: Some("2g".to_string()),
            strict: false,
            principal: "service-acct".to_string(),
        }
    }
}

impl SubmitDefaults {
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Flag tokens in submission order.
    pub fn flags(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut conf = |pair: String| {
            out.push("--conf".to_string());
            out.push(pair);
        };
        if self.strict {
            conf(format!("spark.mesos.driverEnv.MESOS_MODULES={MESOS_MODULES}"));
            conf(format!(
                "spark.mesos.driverEnv.MESOS_AUTHENTICATEE={MESOS_AUTHENTICATEE}"
            ));
            conf(format!("spark.mesos.principal={}", self.principal));
        }
        if let Some(mem) = &self.driver_memory {
            conf(format!("spark.driver.memory={mem}"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_only_sets_driver_memory() {
        assert_eq!(
            SubmitDefaults::default().flags(),
            ["--conf", "spark.driver.memory=2g"]
        );
    }

    #[test]
    fn strict_adds_authentication_before_memory() {
        let flags = SubmitDefaults::default().strict(true).flags();
        assert_eq!(flags.len(), 8);
        assert_eq!(flags[1], format!("spark.mesos.driverEnv.MESOS_MODULES={MESOS_MODULES}"));
        assert_eq!(flags[5], "spark.mesos.principal=service-acct");
        assert_eq!(flags[7], "spark.driver.memory=2g");
    }

    #[test]
    fn no_defaults_when_memory_unset() {
        let defaults = SubmitDefaults {
            driver_memory: None,
            ..Default::default()
        };
        assert!(defaults.flags().is_empty());
    }
}
