use std::{future::Future, sync::Arc, time::Duration};

use sparkit_model::{JobHandle, TaskState, TerminalState};
use tokio::time::{Instant, sleep};
use tracing::{debug, info, instrument, warn};

use crate::{api::ClusterQuery, config::WaitConfig, error::CollaboratorError};

/// Probe `probe` every `interval` until it yields `Some`, or `timeout` elapses.
///
/// Returns `Ok(None)` on timeout. The probe runs once more at the deadline,
/// so a condition that becomes true exactly at the end still counts. Probe
/// errors abort the loop.
pub async fn poll_until<T, E, F, Fut>(
    interval: Duration,
    timeout: Duration,
    mut probe: F,
) -> Result<Option<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = probe().await? {
            return Ok(Some(value));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        sleep(interval.min(deadline - now)).await;
    }
}

/// Polls cluster state for conditions on submitted jobs.
///
/// Running out of time is reported as a value (`false`, [`TerminalState::Timeout`]);
/// only failures to query the cluster are errors.
#[derive(Clone)]
pub struct Waiter {
    query: Arc<dyn ClusterQuery>,
    cfg: WaitConfig,
}

impl Waiter {
    pub fn new(query: Arc<dyn ClusterQuery>, cfg: WaitConfig) -> Self {
        Self { query, cfg }
    }

    #[inline]
    pub fn config(&self) -> &WaitConfig {
        &self.cfg
    }

    /// `true` once at least `expected` tasks of `framework` are running.
    #[instrument(level = "debug", skip(self))]
    pub async fn wait_for_executors(
        &self,
        framework: &str,
        expected: usize,
        timeout: Duration,
    ) -> Result<bool, CollaboratorError> {
        info!(target: "sparkit.core.wait", framework, expected, "waiting for executors to be running");

        let reached = poll_until(self.cfg.poll_interval, timeout, || async move {
            let tasks = self.query.service_tasks(framework).await?;
            let running = tasks.iter().filter(|t| t.state.is_running()).count();
            debug!(target: "sparkit.core.wait", framework, running, expected, "executor probe");
            Ok::<_, CollaboratorError>((running >= expected).then_some(()))
        })
        .await?;

        if reached.is_none() {
            warn!(target: "sparkit.core.wait", framework, expected, ?timeout, "executors not running in time");
        }
        Ok(reached.is_some())
    }

    /// Wait until the job's driver task finished, failed, or `timeout` elapsed.
    #[instrument(level = "debug", skip(self), fields(job = %handle))]
    pub async fn wait_for_terminal(
        &self,
        handle: &JobHandle,
        timeout: Duration,
    ) -> Result<TerminalState, CollaboratorError> {
        info!(target: "sparkit.core.wait", job = %handle, "waiting for job to complete");

        let outcome = poll_until(self.cfg.poll_interval, timeout, || async move {
            let state = self
                .query
                .get_task(handle.as_str(), true)
                .await?
                .map(|t| t.state)
                .unwrap_or(TaskState::Unknown);
            debug!(target: "sparkit.core.wait", job = %handle, ?state, "completion probe");
            Ok::<_, CollaboratorError>(state.terminal())
        })
        .await?;

        let state = outcome.unwrap_or(TerminalState::Timeout);
        info!(target: "sparkit.core.wait", job = %handle, %state, "wait finished");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use async_trait::async_trait;
    use sparkit_model::{ClusterVersion, TaskInfo};

    use super::*;
    use crate::api::LogStream;

    /// Replays scripted task snapshots, repeating the last one forever.
    #[derive(Default)]
    struct ScriptedQuery {
        executors: Mutex<VecDeque<Vec<TaskState>>>,
        driver: Mutex<VecDeque<Option<TaskState>>>,
        probes: AtomicUsize,
        broken: bool,
    }

    fn next<T: Clone>(q: &Mutex<VecDeque<T>>) -> Option<T> {
        let mut q = q.lock().unwrap();
        if q.len() > 1 { q.pop_front() } else { q.front().cloned() }
    }

    fn task(id: &str, state: TaskState) -> TaskInfo {
        TaskInfo {
            id: id.to_string(),
            name: id.to_string(),
            framework_id: None,
            state,
            container: None,
        }
    }

    #[async_trait]
    impl ClusterQuery for ScriptedQuery {
        async fn get_task(
            &self,
            task_id: &str,
            _include_completed: bool,
        ) -> Result<Option<TaskInfo>, CollaboratorError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                return Err(CollaboratorError::new("cluster query", "unreachable"));
            }
            Ok(next(&self.driver).flatten().map(|s| task(task_id, s)))
        }

        async fn service_tasks(&self, _service: &str) -> Result<Vec<TaskInfo>, CollaboratorError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                return Err(CollaboratorError::new("cluster query", "unreachable"));
            }
            let states = next(&self.executors).unwrap_or_default();
            Ok(states
                .into_iter()
                .enumerate()
                .map(|(i, s)| task(&format!("exec-{i}"), s))
                .collect())
        }

        async fn task_log(&self, _: &str, _: LogStream) -> Result<Option<String>, CollaboratorError> {
            Ok(None)
        }

        async fn run_command(&self, _: &[String]) -> Result<String, CollaboratorError> {
            Ok(String::new())
        }

        async fn auth_token(&self) -> Result<String, CollaboratorError> {
            Ok("token".into())
        }

        async fn cluster_version(&self) -> Result<ClusterVersion, CollaboratorError> {
            Ok(ClusterVersion::new(1, 10))
        }
    }

    fn waiter(query: Arc<ScriptedQuery>) -> Waiter {
        Waiter::new(
            query,
            WaitConfig::default().with_poll_interval(Duration::from_secs(1)),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn executors_reached_within_budget() {
        let query = Arc::new(ScriptedQuery {
            executors: Mutex::new(VecDeque::from([
                vec![],
                vec![TaskState::Staging],
                vec![TaskState::Running],
            ])),
            ..Default::default()
        });

        let ok = waiter(query.clone())
            .wait_for_executors("Spark Pi", 1, Duration::from_secs(10))
            .await
            .unwrap();
        assert!(ok);
        assert_eq!(query.probes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn executors_timeout_is_false_not_error() {
        let query = Arc::new(ScriptedQuery {
            executors: Mutex::new(VecDeque::from([vec![TaskState::Running]])),
            ..Default::default()
        });

        let started = Instant::now();
        let ok = waiter(query.clone())
            .wait_for_executors("Spark Pi", 2, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(!ok);
        assert_eq!(started.elapsed(), Duration::from_secs(5));
        // one probe per second plus the final one at the deadline
        assert_eq!(query.probes.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn more_executors_than_expected_counts() {
        let query = Arc::new(ScriptedQuery {
            executors: Mutex::new(VecDeque::from([vec![
                TaskState::Running,
                TaskState::Running,
                TaskState::Finished,
            ]])),
            ..Default::default()
        });

        let ok = waiter(query)
            .wait_for_executors("Spark Pi", 2, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(ok);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_state_after_task_appears() {
        let query = Arc::new(ScriptedQuery {
            driver: Mutex::new(VecDeque::from([
                None,
                Some(TaskState::Staging),
                Some(TaskState::Running),
                Some(TaskState::Finished),
            ])),
            ..Default::default()
        });

        let state = waiter(query)
            .wait_for_terminal(&JobHandle::from("driver-1"), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(state, TerminalState::Succeeded);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_driver_is_terminal() {
        let query = Arc::new(ScriptedQuery {
            driver: Mutex::new(VecDeque::from([Some(TaskState::Failed)])),
            ..Default::default()
        });

        let state = waiter(query)
            .wait_for_terminal(&JobHandle::from("driver-1"), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(state, TerminalState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn never_terminal_is_timeout() {
        let query = Arc::new(ScriptedQuery {
            driver: Mutex::new(VecDeque::from([Some(TaskState::Running)])),
            ..Default::default()
        });

        let state = waiter(query)
            .wait_for_terminal(&JobHandle::from("driver-1"), Duration::from_secs(3))
            .await
            .unwrap();
        assert_eq!(state, TerminalState::Timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn query_errors_propagate() {
        let query = Arc::new(ScriptedQuery {
            broken: true,
            ..Default::default()
        });

        let err = waiter(query.clone())
            .wait_for_terminal(&JobHandle::from("driver-1"), Duration::from_secs(3))
            .await
            .unwrap_err();
        assert_eq!(err.collaborator, "cluster query");
        assert_eq!(query.probes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_interval_is_clamped_to_deadline() {
        let started = Instant::now();
        let res: Result<Option<()>, CollaboratorError> =
            poll_until(Duration::from_secs(60), Duration::from_secs(2), || async { Ok(None) })
                .await;
        assert!(res.unwrap().is_none());
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }
}
