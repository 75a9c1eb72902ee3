//! In-memory cluster behind every collaborator trait.
//!
//! Submitted jobs are "run" by looking at their submit args: the fake knows
//! what SparkPi, S3Job, SecretsJob and friends print, which secrets they need
//! and what they write.

#![allow(dead_code)]

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use sparkit_core::{
    ClusterQuery, CollaboratorError, Collaborators, Harness, LogStream, ObjectStore,
    SecretStore, SecretValue, ServiceManager, ServiceOptions, SubmissionError, SubmitDefaults,
    SubmitTransport, WaitConfig,
};
use sparkit_model::{
    ClusterVersion, ContainerInfo, JobHandle, KeyValue, Labels, NetworkInfo, ObjectKey, TaskInfo,
    TaskState, UrlScheme,
};
use sparkit_observe::{LoggerConfig, logger_init_once};
use sparkit_suite::SuiteConfig;

pub const BUCKET: &str = "infinity-artifacts";
pub const PREFIX: &str = "autodelete7d";
pub const SPARK_PI_FRAMEWORK: &str = "Spark Pi";

#[derive(Default)]
struct State {
    installed: BTreeSet<String>,
    secrets: BTreeMap<String, SecretValue>,
    objects: BTreeSet<String>,
    drivers: HashMap<String, TaskInfo>,
    logs: HashMap<String, String>,
    frameworks: HashMap<String, Vec<TaskInfo>>,
    submissions: Vec<(String, String)>,
    commands: Vec<Vec<String>>,
    events: Vec<String>,
}

pub struct FakeCluster {
    state: Mutex<State>,
    pub version: ClusterVersion,
    /// Jobs whose submit args contain this print garbage instead.
    pub break_output_for: Option<&'static str>,
    /// Report network labels in reverse order.
    pub reverse_labels: bool,
    /// This service installs but never answers its readiness check.
    pub never_ready: Option<&'static str>,
}

impl FakeCluster {
    pub fn new(version: ClusterVersion) -> Self {
        Self {
            state: Mutex::new(State::default()),
            version,
            break_output_for: None,
            reverse_labels: false,
            never_ready: None,
        }
    }

    pub fn installed(&self) -> Vec<String> {
        self.state.lock().unwrap().installed.iter().cloned().collect()
    }

    pub fn secrets(&self) -> Vec<String> {
        self.state.lock().unwrap().secrets.keys().cloned().collect()
    }

    pub fn objects(&self) -> Vec<String> {
        self.state.lock().unwrap().objects.iter().cloned().collect()
    }

    pub fn submissions(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn commands(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn collaborators(self: &Arc<Self>) -> Collaborators {
        Collaborators {
            services: self.clone(),
            store: self.clone(),
            query: self.clone(),
            secrets: self.clone(),
            transport: self.clone(),
        }
    }

    pub fn harness(self: &Arc<Self>) -> Harness {
        Harness::new(
            self.collaborators(),
            WaitConfig::default()
                .with_poll_interval(Duration::from_millis(5))
                .with_executor_timeout(Duration::from_secs(2))
                .with_completion_timeout(Duration::from_secs(2)),
            SubmitDefaults::default(),
        )
    }

    fn network_of(&self, args: &str) -> Option<NetworkInfo> {
        let conf = |key: &str| {
            args.split_whitespace()
                .find_map(|t| t.strip_prefix(key)?.strip_prefix('='))
                .map(str::to_string)
        };
        let name = conf("spark.mesos.network.name")?;
        let mut labels: Vec<KeyValue> = conf("spark.mesos.network.labels")
            .map(|l| {
                l.split(',')
                    .filter_map(|kv| kv.split_once(':'))
                    .map(|(k, v)| KeyValue::new(k, v))
                    .collect()
            })
            .unwrap_or_default();
        if self.reverse_labels {
            labels.reverse();
        }
        Some(NetworkInfo {
            name: Some(name),
            labels: Some(Labels { labels }),
        })
    }
}

/// What the job described by `args` prints, given the cluster's `state`.
fn job_output(state: &mut State, args: &str) -> String {
    if args.contains("SparkJobRunner") {
        return "Running 12 tests\nAll tests passed".into();
    }
    if args.contains("SparkPi") {
        return "Pi is roughly 3.1413".into();
    }
    if args.contains("S3Job") {
        if !state.objects.contains("linecount.txt") {
            return "java.io.FileNotFoundException: linecount.txt".into();
        }
        if args.contains("--writeUrl") {
            state.objects.insert("linecount-out/_SUCCESS".into());
            state.objects.insert("linecount-out/part-00000".into());
        }
        return "Read 3 lines".into();
    }
    if args.contains("SecretsJob") {
        return match state.secrets.get("/secret") {
            Some(SecretValue::Literal(v)) => format!("Contents of file secret_file: {v}"),
            _ => "secret_file: No such file or directory".into(),
        };
    }
    if args.contains("pi_with_secret.py") {
        let ready = ["/__dcos_base64__keystore", "/__dcos_base64__truststore", "/mysecret"]
            .iter()
            .all(|s| state.secrets.contains_key(*s));
        return if ready {
            "Pi is roughly 3.14".into()
        } else {
            "Unexpected contents in secret env var mysecret".into()
        };
    }
    if args.contains("pi_with_include.py") && args.contains("--py-files") {
        return "Pi is roughly 3.141".into();
    }
    if args.contains("dataframe.R") {
        return "   name\n1 Smith\n2 Justin".into();
    }
    "nothing recognised".into()
}

fn abs(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

#[async_trait]
impl ServiceManager for FakeCluster {
    async fn install(&self, options: &ServiceOptions) -> Result<(), CollaboratorError> {
        let mut s = self.state.lock().unwrap();
        if !s.installed.insert(options.service_name.clone()) {
            return Err(CollaboratorError::new("service manager", "already installed"));
        }
        s.events.push(format!("install {}", options.service_name));
        Ok(())
    }

    async fn wait_ready(&self, service_name: &str) -> Result<(), CollaboratorError> {
        let s = self.state.lock().unwrap();
        if self.never_ready == Some(service_name) {
            return Err(CollaboratorError::new("service manager", "service unavailable"));
        }
        if s.installed.contains(service_name) {
            Ok(())
        } else {
            Err(CollaboratorError::new("service manager", "not installed"))
        }
    }

    async fn uninstall(&self, service_name: &str) -> Result<(), CollaboratorError> {
        let mut s = self.state.lock().unwrap();
        s.installed.remove(service_name);
        s.events.push(format!("uninstall {service_name}"));
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FakeCluster {
    async fn upload(&self, path: &Path) -> Result<ObjectKey, CollaboratorError> {
        let key = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| CollaboratorError::new("object store", "no file name"))?;
        self.state.lock().unwrap().objects.insert(key.clone());
        Ok(key)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectKey>, CollaboratorError> {
        let s = self.state.lock().unwrap();
        Ok(s.objects.iter().filter(|k| k.starts_with(prefix)).cloned().collect())
    }

    fn url_for(&self, key: &str, scheme: UrlScheme) -> String {
        match scheme {
            UrlScheme::Http => format!("http://{BUCKET}.s3.amazonaws.com/{PREFIX}/{key}"),
            other => format!("{other}://{BUCKET}/{PREFIX}/{key}"),
        }
    }
}

#[async_trait]
impl SecretStore for FakeCluster {
    async fn create(&self, path: &str, value: &SecretValue) -> Result<(), CollaboratorError> {
        let mut s = self.state.lock().unwrap();
        let path = abs(path);
        if s.secrets.contains_key(&path) {
            return Err(CollaboratorError::new("secret store", "already exists"));
        }
        s.secrets.insert(path.clone(), value.clone());
        s.events.push(format!("create secret {path}"));
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), CollaboratorError> {
        let mut s = self.state.lock().unwrap();
        let path = abs(path);
        if s.secrets.remove(&path).is_none() {
            return Err(CollaboratorError::new("secret store", "not found"));
        }
        s.events.push(format!("delete secret {path}"));
        Ok(())
    }
}

#[async_trait]
impl SubmitTransport for FakeCluster {
    async fn dispatch(
        &self,
        service_name: &str,
        submit_args: &str,
    ) -> Result<JobHandle, SubmissionError> {
        let network = self.network_of(submit_args);
        let mut s = self.state.lock().unwrap();
        if !s.installed.contains(service_name) {
            return Err(SubmissionError::Transport(format!("{service_name} is not installed")));
        }
        s.submissions
            .push((service_name.to_string(), submit_args.to_string()));
        let id = format!("driver-{:04}", s.submissions.len());

        let mut stdout = job_output(&mut s, submit_args);
        if self.break_output_for.is_some_and(|n| submit_args.contains(n)) {
            stdout = "Exception in thread \"main\" java.lang.RuntimeException".into();
        }
        s.logs.insert(id.clone(), stdout);

        let container = network.map(|n| ContainerInfo {
            kind: Some("MESOS".into()),
            network_infos: vec![n],
        });
        if container.is_some() {
            s.frameworks.insert(
                SPARK_PI_FRAMEWORK.to_string(),
                vec![TaskInfo {
                    id: "0".into(),
                    name: "Task 0".into(),
                    framework_id: Some("fw-pi".into()),
                    state: TaskState::Running,
                    container: container.clone(),
                }],
            );
        }
        s.drivers.insert(
            id.clone(),
            TaskInfo {
                id: id.clone(),
                name: "Driver for SparkPi".into(),
                framework_id: Some("fw-dispatcher".into()),
                state: TaskState::Running,
                container,
            },
        );
        Ok(JobHandle::from(id))
    }
}

#[async_trait]
impl ClusterQuery for FakeCluster {
    async fn get_task(
        &self,
        task_id: &str,
        include_completed: bool,
    ) -> Result<Option<TaskInfo>, CollaboratorError> {
        let mut s = self.state.lock().unwrap();
        let Some(task) = s.drivers.get_mut(task_id) else {
            return Ok(None);
        };
        if include_completed {
            // Drivers finish as soon as somebody waits for them.
            task.state = TaskState::Finished;
            return Ok(Some(task.clone()));
        }
        Ok(task.state.terminal().is_none().then(|| task.clone()))
    }

    async fn service_tasks(&self, service: &str) -> Result<Vec<TaskInfo>, CollaboratorError> {
        let s = self.state.lock().unwrap();
        Ok(s.frameworks.get(service).cloned().unwrap_or_default())
    }

    async fn task_log(
        &self,
        task_id: &str,
        stream: LogStream,
    ) -> Result<Option<String>, CollaboratorError> {
        let s = self.state.lock().unwrap();
        Ok(match stream {
            LogStream::Stdout => s.logs.get(task_id).cloned(),
            LogStream::Stderr => s.logs.get(task_id).map(|_| "INFO SparkContext".to_string()),
        })
    }

    async fn run_command(&self, args: &[String]) -> Result<String, CollaboratorError> {
        self.state.lock().unwrap().commands.push(args.to_vec());
        Ok(String::new())
    }

    async fn auth_token(&self) -> Result<String, CollaboratorError> {
        Ok("fake-acs-token".into())
    }

    async fn cluster_version(&self) -> Result<ClusterVersion, CollaboratorError> {
        Ok(self.version)
    }
}

/// Jars on disk plus a suite config pointing at them.
pub struct Workspace {
    _dir: tempfile::TempDir,
    pub config: SuiteConfig,
}

pub fn workspace(extra: &[(&str, &str)]) -> Workspace {
    let _ = logger_init_once(&LoggerConfig::for_tests());

    let dir = tempfile::tempdir().unwrap();
    let scala = dir.path().join("dcos-spark-scala-tests.jar");
    let jar = dir.path().join("mesos-spark-integration-tests.jar");
    std::fs::write(&scala, b"PK").unwrap();
    std::fs::write(&jar, b"PK").unwrap();

    let mut vars: HashMap<String, String> = [
        ("SCALA_TEST_JAR_PATH", path(&scala)),
        ("TEST_JAR_PATH", path(&jar)),
        ("S3_BUCKET", BUCKET.to_string()),
        ("S3_PREFIX", PREFIX.to_string()),
        ("AWS_ACCESS_KEY_ID", "AKIAEXAMPLE".to_string()),
        ("AWS_SECRET_ACCESS_KEY", "wJalrXUtnFEMI".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    for &(k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }

    let config = SuiteConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
    Workspace { _dir: dir, config }
}

fn path(p: &Path) -> String {
    p.display().to_string()
}
