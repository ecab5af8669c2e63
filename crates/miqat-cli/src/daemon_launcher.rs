use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;

const DAEMON_STARTUP_TIMEOUT: Duration = Duration::from_secs(5);
const DAEMON_POLL_INTERVAL: Duration = Duration::from_millis(100);
const DAEMON_PATH_VARIABLE: &str = "MIQAT_DAEMON_PATH";

pub async fn ensure_daemon_running() -> Result<()> {
    eprintln!("Starting the miqat daemon...");

    spawn_daemon()?;
    wait_for_socket().await?;

    Ok(())
}

fn spawn_daemon() -> Result<()> {
    let daemon_path = find_daemon_binary()?;

    Command::new(&daemon_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to launch {}", daemon_path.display()))?;

    Ok(())
}

fn find_daemon_binary() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(DAEMON_PATH_VARIABLE) {
        return Ok(PathBuf::from(path));
    }

    let current_exe = std::env::current_exe().context("cannot locate the current executable")?;
    let exe_dir = current_exe
        .parent()
        .context("cannot locate the executable directory")?;

    let daemon_name = daemon_binary_name();

    let sibling_path = exe_dir.join(daemon_name);
    if sibling_path.exists() {
        return Ok(sibling_path);
    }

    if let Ok(path) = which::which(daemon_name) {
        return Ok(path);
    }

    bail!(
        "miqat-daemon not found. Install it next to miqat or set {}",
        DAEMON_PATH_VARIABLE
    );
}

fn daemon_binary_name() -> &'static str {
    if cfg!(windows) {
        "miqat-daemon.exe"
    } else {
        "miqat-daemon"
    }
}

async fn wait_for_socket() -> Result<()> {
    let socket_path = miqat_protocol::default_socket_path();
    let start = std::time::Instant::now();

    while start.elapsed() < DAEMON_STARTUP_TIMEOUT {
        if socket_path.exists() {
            return Ok(());
        }
        sleep(DAEMON_POLL_INTERVAL).await;
    }

    bail!(
        "the daemon did not come up within {} seconds",
        DAEMON_STARTUP_TIMEOUT.as_secs()
    );
}
