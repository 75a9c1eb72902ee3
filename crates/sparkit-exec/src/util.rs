use std::time::Duration;

use tokio::process::{Child, Command};

use crate::proc::ProcConfig;

/// Time a child gets between SIGTERM and SIGKILL.
const KILL_GRACE: Duration = Duration::from_secs(2);

pub fn cmd_program(cfg: &ProcConfig) -> Command {
    let mut cmd = Command::new(&cfg.program);
    cmd.args(cfg.args.iter().map(|s| s.as_str()));
    if let Some(cwd) = &cfg.cwd {
        cmd.current_dir(cwd);
    }
    for (k, v) in &cfg.env {
        cmd.env(k, v);
    }
    // The child leads its own group so a timeout reaches whatever it spawned.
    #[cfg(unix)]
    cmd.process_group(0);
    cmd
}

/// SIGTERM the child's process group, then SIGKILL it after [`KILL_GRACE`].
#[cfg(unix)]
pub async fn kill_graceful(child: &mut Child) -> std::io::Result<()> {
    let Some(id) = child.id() else {
        return child.kill().await;
    };
    let group = -(id as libc::pid_t);

    // SAFETY: the group is led by a pid we spawned and have not yet reaped.
    unsafe {
        libc::kill(group, libc::SIGTERM);
    }
    if tokio::time::timeout(KILL_GRACE, child.wait()).await.is_ok() {
        return Ok(());
    }
    // SAFETY: as above; the leader is still unreaped.
    unsafe {
        libc::kill(group, libc::SIGKILL);
    }
    child.kill().await
}

#[cfg(not(unix))]
pub async fn kill_graceful(child: &mut Child) -> std::io::Result<()> {
    child.kill().await
}
