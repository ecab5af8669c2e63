mod achievements;
mod init;
mod micro;
mod review;
mod session;
mod settings;
mod stats;
mod status;
mod tasks;

pub use achievements::execute as achievements;
pub use init::execute as init;
pub use micro::{cancel as micro_cancel, start as micro_start};
pub use review::{add as review_add, list as review_list};
pub use session::{pause, reset, start, switch_mode};
pub use settings::{set as settings_set, show as settings_show};
pub use stats::execute as stats;
pub use status::execute as status;
pub use tasks::{add as task_add, list as task_list, remove as task_remove, toggle as task_toggle};

use anyhow::{anyhow, bail, Result};
use miqat_protocol::{Achievement, Request, Response};

use crate::client::{ClientError, DaemonClient};
use crate::daemon_launcher::ensure_daemon_running;

/// Sends one request, launching the daemon first if nothing listens yet.
/// Error responses become errors.
pub(crate) async fn send(request: Request) -> Result<Response> {
    send_with(&DaemonClient::new(), request).await
}

pub(crate) async fn send_with(client: &DaemonClient, request: Request) -> Result<Response> {
    let response = match client.send(&request).await {
        Err(ClientError::DaemonNotRunning) => {
            ensure_daemon_running().await?;
            client.send(&request).await
        }
        other => other,
    };

    match response {
        Ok(Response::Error { message }) => bail!("{}", message),
        Ok(response) => Ok(response),
        Err(ClientError::DaemonNotRunning) => {
            bail!("the daemon is not running. Start it with: miqat-daemon")
        }
        Err(error) => Err(error.into()),
    }
}

pub(crate) fn unexpected(response: Response) -> anyhow::Error {
    anyhow!("unexpected response from the daemon: {:?}", response)
}

pub(crate) fn expect_ok(response: Response) -> Result<()> {
    match response {
        Response::Ok => Ok(()),
        other => Err(unexpected(other)),
    }
}

pub(crate) fn print_unlocked(response: Response) -> Result<()> {
    let Response::Unlocked { achievements } = response else {
        return Err(unexpected(response));
    };
    for achievement in achievements {
        println!("🏆 Achievement unlocked: {}", describe(achievement));
    }
    Ok(())
}

fn describe(achievement: Achievement) -> String {
    let descriptor = achievement.descriptor();
    format!("{} - {}", descriptor.title, descriptor.description)
}

pub(crate) fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(25 * 60), "25:00");
        assert_eq!(format_clock(100 * 60), "100:00");
    }

    #[test]
    fn unlocked_response_is_required() {
        assert!(print_unlocked(Response::Ok).is_err());
        assert!(print_unlocked(Response::Unlocked {
            achievements: vec![Achievement::Personalizer]
        })
        .is_ok());
    }
}
