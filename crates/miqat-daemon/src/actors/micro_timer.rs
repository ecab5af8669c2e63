use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use miqat_core::domain::MicroTimer;
use miqat_protocol::MicroTimerStatus;

use super::NotifierHandle;

pub enum MicroTimerMessage {
    Start { reply: oneshot::Sender<bool> },
    Cancel,
    GetStatus { reply: oneshot::Sender<MicroTimerStatus> },
}

#[derive(Clone)]
pub struct MicroTimerHandle {
    sender: mpsc::Sender<MicroTimerMessage>,
}

impl MicroTimerHandle {
    /// `Some(false)` when a countdown was already running.
    pub async fn start(&self) -> Option<bool> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(MicroTimerMessage::Start { reply })
            .await
            .ok()?;
        receiver.await.ok()
    }

    pub async fn cancel(&self) -> Result<(), mpsc::error::SendError<MicroTimerMessage>> {
        self.sender.send(MicroTimerMessage::Cancel).await
    }

    pub async fn get_status(&self) -> Option<MicroTimerStatus> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(MicroTimerMessage::GetStatus { reply })
            .await
            .ok()?;
        receiver.await.ok()
    }
}

pub struct MicroTimerActor {
    receiver: mpsc::Receiver<MicroTimerMessage>,
    timer: MicroTimer,
    notifier: Option<NotifierHandle>,
}

impl MicroTimerActor {
    pub fn new(notifier: Option<NotifierHandle>) -> (Self, MicroTimerHandle) {
        let (sender, receiver) = mpsc::channel(32);

        let actor = Self {
            receiver,
            timer: MicroTimer::default(),
            notifier,
        };

        (actor, MicroTimerHandle { sender })
    }

    pub async fn run(mut self) {
        let mut tick_interval = tokio::time::interval(Duration::from_secs(1));

        loop {
            tokio::select! {
                Some(message) = self.receiver.recv() => {
                    match message {
                        MicroTimerMessage::Start { reply } => {
                            let started = self.timer.start();
                            if started {
                                info!("micro timer started");
                                tick_interval.reset();
                            }
                            let _ = reply.send(started);
                        }
                        MicroTimerMessage::Cancel => {
                            if self.timer.is_running() {
                                info!("micro timer cancelled");
                            }
                            self.timer.cancel();
                        }
                        MicroTimerMessage::GetStatus { reply } => {
                            let _ = reply.send(self.status());
                        }
                    }
                }
                _ = tick_interval.tick() => {
                    if self.timer.tick().completed {
                        info!("micro timer completed");
                        if let Some(ref notifier) = self.notifier {
                            notifier.send_micro_timer_done();
                        }
                    }
                }
                else => break,
            }
        }

        debug!("micro timer actor stopped");
    }

    fn status(&self) -> MicroTimerStatus {
        MicroTimerStatus {
            remaining_seconds: self.timer.remaining_seconds(),
            running: self.timer.is_running(),
        }
    }
}
