use std::{
    path::PathBuf,
    process::Stdio,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tracing::{debug, trace, warn};

use crate::{
    error::{ExecError, ExecResult},
    util::{cmd_program, kill_graceful},
};

const REDACTED: &str = "******";

/// One invocation of an external program.
#[derive(Clone, Debug)]
pub struct ProcConfig {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    /// Kill the child and fail with [`ExecError::TimedOut`] past this budget.
    pub timeout: Option<Duration>,
    /// Return an error if the exit code != 0.
    pub fail_on_non_zero: bool,
    /// Values masked whenever the command line is logged.
    pub redact: Vec<String>,
}

impl Default for ProcConfig {
    fn default() -> Self {
        Self {
            program: String::new(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
            timeout: None,
            fail_on_non_zero: true,
            redact: Vec::new(),
        }
    }
}

impl ProcConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn allow_non_zero(mut self) -> Self {
        self.fail_on_non_zero = false;
        self
    }

    /// Mask `value` in every logged rendering of this command.
    pub fn redacting(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.redact.push(value);
        }
        self
    }

    /// Command line for logs, with redacted values masked.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&self.mask(arg));
        }
        line
    }

    fn mask(&self, s: &str) -> String {
        self.redact
            .iter()
            .fold(s.to_string(), |acc, secret| acc.replace(secret.as_str(), REDACTED))
    }
}

/// Captured result of a finished program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl ProcOutput {
    #[inline]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes [`ProcConfig`]s.
///
/// Collaborators depend on this trait rather than on [`ProcRunner`] so that
/// the exact command lines they produce can be asserted without spawning anything.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, cfg: &ProcConfig) -> ExecResult<ProcOutput>;
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct ProcRunner {
    /// Environment applied to every command before its own `env`.
    base_env: Vec<(String, String)>,
}

impl ProcRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base_env.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
impl CommandRunner for ProcRunner {
    async fn run(&self, cfg: &ProcConfig) -> ExecResult<ProcOutput> {
        if cfg.program.trim().is_empty() {
            return Err(ExecError::MissingProgram);
        }

        let mut cmd = cmd_program(cfg);
        for (k, v) in &self.base_env {
            if !cfg.env.iter().any(|(key, _)| key == k) {
                cmd.env(k, v);
            }
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        debug!(target: "sparkit.exec.proc", command = %cfg.display(), "spawn");
        let started = Instant::now();

        let mut child = cmd.spawn().map_err(|e| ExecError::Spawn {
            program: cfg.program.clone(),
            reason: e.to_string(),
        })?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExecError::Io("stdout was not captured".into()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExecError::Io("stderr was not captured".into()))?;

        let run = async {
            let mut out = String::new();
            let mut err = String::new();
            let (r_out, r_err) = tokio::join!(
                stdout.read_to_string(&mut out),
                stderr.read_to_string(&mut err)
            );
            r_out?;
            r_err?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, out, err))
        };

        let finished = match cfg.timeout {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(res) => res,
                Err(_) => {
                    warn!(target: "sparkit.exec.proc", command = %cfg.display(), ?limit, "timed out; killing child");
                    let _ = kill_graceful(&mut child).await;
                    return Err(ExecError::TimedOut {
                        program: cfg.program.clone(),
                        after: limit,
                    });
                }
            },
            None => run.await,
        };
        let (status, stdout, stderr) = finished?;

        let output = ProcOutput {
            code: status.code(),
            stdout,
            stderr,
            elapsed: started.elapsed(),
        };
        trace!(
            target: "sparkit.exec.proc",
            code = ?output.code,
            stdout = %cfg.mask(&output.stdout),
            stderr = %cfg.mask(&output.stderr),
            "exited"
        );

        if !cfg.fail_on_non_zero {
            return Ok(output);
        }
        match output.code {
            Some(0) => {
                debug!(target: "sparkit.exec.proc", elapsed = ?output.elapsed, "exit success");
                Ok(output)
            }
            Some(code) => Err(ExecError::NonZeroExit {
                program: cfg.program.clone(),
                code,
                stderr: cfg.mask(output.stderr.trim()),
            }),
            None => Err(ExecError::KilledBySignal {
                program: cfg.program.clone(),
            }),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_stderr() {
        let cfg = ProcConfig::new("sh").args(["-c", "echo out; echo err 1>&2"]);
        let out = ProcRunner::new().run(&cfg).await.unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "out");
        assert_eq!(out.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error_by_default() {
        let cfg = ProcConfig::new("sh").args(["-c", "echo boom 1>&2; exit 3"]);
        let err = ProcRunner::new().run(&cfg).await.unwrap_err();
        match err {
            ExecError::NonZeroExit { code, stderr, .. } => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_zero_exit_can_be_allowed() {
        let cfg = ProcConfig::new("sh").args(["-c", "exit 7"]).allow_non_zero();
        let out = ProcRunner::new().run(&cfg).await.unwrap();
        assert_eq!(out.code, Some(7));
        assert!(!out.success());
    }

    #[tokio::test]
    async fn timeout_kills_the_child() {
        let cfg = ProcConfig::new("sh")
            .args(["-c", "sleep 30"])
            .timeout(Duration::from_millis(100));
        let err = ProcRunner::new().run(&cfg).await.unwrap_err();
        assert!(matches!(err, ExecError::TimedOut { .. }));
    }

    /// `ps`-style state of a pid, `None` once it is gone.
    #[cfg(target_os = "linux")]
    fn proc_state(pid: &str) -> Option<char> {
        let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
        stat.rsplit(") ").next()?.chars().next()
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn timeout_kills_background_children_too() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("sleeper.pid");
        let cfg = ProcConfig::new("sh")
            .args(["-c", "sleep 30 & echo $! > \"$1\"; wait", "sh"])
            .arg(pid_file.display().to_string())
            .timeout(Duration::from_millis(500));
        let err = ProcRunner::new().run(&cfg).await.unwrap_err();
        assert!(matches!(err, ExecError::TimedOut { .. }));

        let pid = std::fs::read_to_string(&pid_file).unwrap();
        let pid = pid.trim();
        let mut state = proc_state(pid);
        for _ in 0..40 {
            if matches!(state, None | Some('Z')) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            state = proc_state(pid);
        }
        assert!(matches!(state, None | Some('Z')), "sleeper {pid} still {state:?}");
    }

    #[tokio::test]
    async fn missing_program_is_rejected() {
        let err = ProcRunner::new().run(&ProcConfig::default()).await.unwrap_err();
        assert!(matches!(err, ExecError::MissingProgram));
    }

    #[tokio::test]
    async fn base_env_is_visible_unless_overridden() {
        let runner = ProcRunner::new()
            .with_env("SPARKIT_A", "base")
            .with_env("SPARKIT_B", "base");
        let cfg = ProcConfig::new("sh")
            .args(["-c", "echo $SPARKIT_A-$SPARKIT_B"])
            .env("SPARKIT_B", "own");
        let out = runner.run(&cfg).await.unwrap();
        assert_eq!(out.stdout.trim(), "base-own");
    }

    #[test]
    fn display_masks_redacted_values() {
        let cfg = ProcConfig::new("dcos")
            .args(["security", "secrets", "create", "/secret", "--value", "mgummelt"])
            .redacting("mgummelt");
        assert_eq!(
            cfg.display(),
            "dcos security secrets create /secret --value ******"
        );
    }
}
