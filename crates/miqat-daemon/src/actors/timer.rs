use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use miqat_core::domain::{SessionCommandError, SessionCompletion, SessionEffect, SessionSnapshot};
use miqat_core::ports::SettingsRepository;
use miqat_core::{
    GateOutcome, LogEntry, PrayerName, SessionConfig, SessionMachine, SessionMode, StoreChange,
};
use miqat_protocol::{PendingOffer, StartDecision};

use super::NotifierHandle;
use crate::services::{EndMessageService, PrayerGate, SessionHistory};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error(transparent)]
    Command(#[from] SessionCommandError),

    #[error("no shortened session is waiting for confirmation")]
    NoPendingOffer,

    #[error("timer is not available")]
    Unavailable,
}

type Reply<T> = oneshot::Sender<Result<T, TimerError>>;

pub enum TimerMessage {
    Start {
        mode: Option<SessionMode>,
        reply: Reply<StartDecision>,
    },
    ConfirmShortened {
        reply: Reply<StartDecision>,
    },
    DeclineShortened {
        reply: Reply<()>,
    },
    Pause {
        reply: Reply<()>,
    },
    Reset {
        reply: Reply<()>,
    },
    SwitchMode {
        mode: SessionMode,
        reply: Reply<()>,
    },
    GetStatus {
        reply: oneshot::Sender<TimerStatus>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerStatus {
    pub session: SessionSnapshot,
    pub pending_offer: Option<PendingOffer>,
}

/// What the timer needs besides the countdown itself.
pub struct TimerServices {
    pub gate: PrayerGate,
    pub end_messages: EndMessageService,
    pub history: SessionHistory,
    pub settings: Arc<dyn SettingsRepository>,
}

#[derive(Debug, Clone, Copy)]
struct Offer {
    mode: SessionMode,
    minutes: u32,
    prayer: PrayerName,
}

#[derive(Clone)]
pub struct TimerHandle {
    sender: mpsc::Sender<TimerMessage>,
}

impl TimerHandle {
    pub async fn start(&self, mode: Option<SessionMode>) -> Result<StartDecision, TimerError> {
        self.request(|reply| TimerMessage::Start { mode, reply }).await
    }

    pub async fn confirm_shortened(&self) -> Result<StartDecision, TimerError> {
        self.request(|reply| TimerMessage::ConfirmShortened { reply })
            .await
    }

    pub async fn decline_shortened(&self) -> Result<(), TimerError> {
        self.request(|reply| TimerMessage::DeclineShortened { reply })
            .await
    }

    pub async fn pause(&self) -> Result<(), TimerError> {
        self.request(|reply| TimerMessage::Pause { reply }).await
    }

    pub async fn reset(&self) -> Result<(), TimerError> {
        self.request(|reply| TimerMessage::Reset { reply }).await
    }

    pub async fn switch_mode(&self, mode: SessionMode) -> Result<(), TimerError> {
        self.request(|reply| TimerMessage::SwitchMode { mode, reply })
            .await
    }

    pub async fn get_status(&self) -> Option<TimerStatus> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(TimerMessage::GetStatus { reply })
            .await
            .ok()?;
        receiver.await.ok()
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(Reply<T>) -> TimerMessage,
    ) -> Result<T, TimerError> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(message(reply))
            .await
            .map_err(|_| TimerError::Unavailable)?;
        receiver.await.map_err(|_| TimerError::Unavailable)?
    }
}

pub struct TimerActor {
    receiver: mpsc::Receiver<TimerMessage>,
    machine: SessionMachine,
    config: SessionConfig,
    services: TimerServices,
    notifier: Option<NotifierHandle>,
    changes: Option<broadcast::Receiver<StoreChange>>,
    pending_offer: Option<Offer>,
    clock: fn() -> DateTime<Local>,
}

impl TimerActor {
    pub fn new(
        config: SessionConfig,
        services: TimerServices,
        notifier: Option<NotifierHandle>,
        changes: Option<broadcast::Receiver<StoreChange>>,
    ) -> (Self, TimerHandle) {
        let (sender, receiver) = mpsc::channel(32);

        let actor = Self {
            receiver,
            machine: SessionMachine::new(&config),
            config,
            services,
            notifier,
            changes,
            pending_offer: None,
            clock: Local::now,
        };

        (actor, TimerHandle { sender })
    }

    #[cfg(test)]
    fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn run(mut self) {
        let mut tick_interval = tokio::time::interval(Duration::from_secs(1));

        loop {
            tokio::select! {
                Some(message) = self.receiver.recv() => {
                    let was_running = self.machine.is_running();
                    self.handle_message(message).await;
                    if !was_running && self.machine.is_running() {
                        // Full first second for a fresh countdown.
                        tick_interval.reset();
                    }
                }
                _ = tick_interval.tick() => {
                    self.on_tick().await;
                }
                change = next_change(&mut self.changes) => {
                    self.on_store_change(change);
                }
                else => break,
            }
        }

        debug!("timer actor stopped");
    }

    async fn handle_message(&mut self, message: TimerMessage) {
        match message {
            TimerMessage::Start { mode, reply } => {
                let _ = reply.send(self.handle_start(mode).await);
            }
            TimerMessage::ConfirmShortened { reply } => {
                let result = match self.pending_offer.take() {
                    Some(offer) => self.confirm(offer).await,
                    None => Err(TimerError::NoPendingOffer),
                };
                let _ = reply.send(result);
            }
            TimerMessage::DeclineShortened { reply } => {
                let result = match self.pending_offer.take() {
                    Some(offer) => {
                        info!(prayer = %offer.prayer, "shortened session declined");
                        Ok(())
                    }
                    None => Err(TimerError::NoPendingOffer),
                };
                let _ = reply.send(result);
            }
            TimerMessage::Pause { reply } => {
                self.pending_offer = None;
                let result = self.machine.pause().map_err(TimerError::from);
                if result.is_ok() {
                    let remaining_seconds = self.machine.remaining_seconds();
                    info!(remaining_seconds, "session paused");
                }
                let _ = reply.send(result);
            }
            TimerMessage::Reset { reply } => {
                self.pending_offer = None;
                self.machine.reset(&self.config);
                info!(mode = %self.machine.mode(), "session reset");
                let _ = reply.send(Ok(()));
            }
            TimerMessage::SwitchMode { mode, reply } => {
                self.pending_offer = None;
                let result = self
                    .machine
                    .switch_mode(&self.config, mode)
                    .map_err(TimerError::from);
                if result.is_ok() {
                    info!(%mode, "mode switched");
                }
                let _ = reply.send(result);
            }
            TimerMessage::GetStatus { reply } => {
                let _ = reply.send(self.current_status());
            }
        }
    }

    async fn handle_start(
        &mut self,
        requested: Option<SessionMode>,
    ) -> Result<StartDecision, TimerError> {
        if self.machine.is_running() {
            return Err(SessionCommandError::AlreadyRunning.into());
        }

        let mode = requested.unwrap_or(self.machine.mode());
        self.pending_offer = None;

        let outcome = self.check_gate(mode).await;
        self.decide(mode, outcome)
    }

    /// Asks the gate again, the prayer has come closer while the offer waited.
    /// A same-prayer approval can only shrink the offered length.
    async fn confirm(&mut self, offer: Offer) -> Result<StartDecision, TimerError> {
        match self.check_gate(offer.mode).await {
            GateOutcome::ApprovePartial { minutes, prayer } if prayer == offer.prayer => {
                self.begin(offer.mode, Some(minutes.min(offer.minutes)))
            }
            outcome => self.decide(offer.mode, outcome),
        }
    }

    async fn check_gate(&self, mode: SessionMode) -> GateOutcome {
        let now = (self.clock)().naive_local();
        self.services.gate.check(&self.config, mode, now).await
    }

    fn decide(
        &mut self,
        mode: SessionMode,
        outcome: GateOutcome,
    ) -> Result<StartDecision, TimerError> {
        match outcome {
            GateOutcome::ApproveFull { .. } => self.begin(mode, None),
            GateOutcome::ApprovePartial { minutes, prayer } => {
                let remaining = if mode == self.machine.mode() {
                    self.machine.remaining_seconds()
                } else {
                    self.config.duration_seconds(mode)
                };

                if u64::from(minutes) * 60 >= remaining {
                    return self.begin(mode, None);
                }

                info!(minutes, %prayer, "offering shortened session");
                self.pending_offer = Some(Offer {
                    mode,
                    minutes,
                    prayer,
                });
                Ok(StartDecision::ShortenedOffer { minutes, prayer })
            }
            GateOutcome::Deny {
                prayer,
                minutes_until,
            } => {
                info!(%prayer, minutes_until, "start denied, prayer is close");
                Ok(StartDecision::Denied {
                    prayer,
                    minutes_until,
                })
            }
        }
    }

    fn begin(
        &mut self,
        mode: SessionMode,
        shortened_minutes: Option<u32>,
    ) -> Result<StartDecision, TimerError> {
        self.machine.start(&self.config, mode, shortened_minutes)?;

        let remaining_seconds = self.machine.remaining_seconds();
        info!(%mode, remaining_seconds, "session started");

        Ok(StartDecision::Started {
            mode,
            remaining_seconds,
        })
    }

    async fn on_tick(&mut self) {
        let finished = self.machine.mode();
        let outcome = self.machine.tick(&self.config, (self.clock)());

        for effect in outcome.effects {
            self.execute(effect, finished).await;
        }
    }

    async fn execute(&mut self, effect: SessionEffect, finished: SessionMode) {
        match effect {
            SessionEffect::PlayCue => {
                info!(mode = %finished, "session completed");
                if let Some(ref notifier) = self.notifier {
                    notifier.send_session_completed(finished, self.machine.mode());
                }
            }
            SessionEffect::AppendLog(entry) => self.record(&entry),
            SessionEffect::EvaluateAchievements(completion) => self.grant(&completion),
            SessionEffect::ShowEndSessionMessage => {
                let message = self.services.end_messages.produce(&self.config).await;
                if !message.is_available() {
                    debug!("no end-of-session message to show");
                    return;
                }
                if let Some(ref notifier) = self.notifier {
                    notifier.send_end_message(message.to_string());
                }
            }
            SessionEffect::ModeSwitched {
                next,
                remaining_seconds,
            } => {
                debug!(%next, remaining_seconds, "next session loaded");
            }
        }
    }

    fn record(&self, entry: &LogEntry) {
        if let Err(error) = self.services.history.record(entry) {
            error!(%error, "failed to log completed session");
            if let Some(ref notifier) = self.notifier {
                notifier.send_alert(
                    "Miqat - Storage error".to_string(),
                    "The finished session could not be saved.".to_string(),
                );
            }
        }
    }

    fn grant(&self, completion: &SessionCompletion) {
        match self.services.history.grant_for(completion) {
            Ok(unlocked) => {
                if unlocked.is_empty() {
                    return;
                }
                info!(count = unlocked.len(), "achievements unlocked");
                if let Some(ref notifier) = self.notifier {
                    notifier.send_achievements(
                        unlocked
                            .iter()
                            .map(|achievement| achievement.title().to_string())
                            .collect(),
                    );
                }
            }
            Err(error) => error!(%error, "failed to evaluate achievements"),
        }
    }

    fn on_store_change(&mut self, change: Result<StoreChange, RecvError>) {
        match change {
            Ok(StoreChange::Settings) => self.reload_settings(),
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "store change feed lagged, reloading settings");
                self.reload_settings();
            }
            Err(RecvError::Closed) => {
                debug!("store change feed closed");
                self.changes = None;
            }
        }
    }

    fn reload_settings(&mut self) {
        match self.services.settings.load_settings() {
            Ok(Some(config)) => {
                self.config = config;
                self.machine.apply_settings(&self.config);
                debug!("settings reloaded");
            }
            Ok(None) => {}
            Err(error) => {
                warn!(%error, "failed to reload settings, keeping previous values");
            }
        }
    }

    fn current_status(&self) -> TimerStatus {
        TimerStatus {
            session: self.machine.snapshot(),
            pending_offer: self.pending_offer.map(|offer| PendingOffer {
                minutes: offer.minutes,
                prayer: offer.prayer,
            }),
        }
    }
}

async fn next_change(
    changes: &mut Option<broadcast::Receiver<StoreChange>>,
) -> Result<StoreChange, RecvError> {
    match changes {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}
