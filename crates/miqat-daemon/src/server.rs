use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use interprocess::local_socket::{
    tokio::{prelude::*, Stream},
    GenericFilePath, ListenerOptions,
};
use tracing::{debug, error, info, instrument, warn};

use miqat_core::AchievementSet;
use miqat_protocol::{read_frame, write_frame, Request, Response, StatusReport};

use crate::actors::{MicroTimerHandle, TimerHandle};
use crate::services::{BoardError, BoardService};

pub struct Server {
    socket_path: PathBuf,
    dispatcher: Dispatcher,
}

impl Server {
    pub fn new(socket_path: PathBuf, dispatcher: Dispatcher) -> Self {
        Self {
            socket_path,
            dispatcher,
        }
    }

    fn cleanup_stale_socket(&self) -> Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path).context("failed to remove stale socket")?;
            debug!("removed stale socket file");
        }
        Ok(())
    }

    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: tokio::sync::broadcast::Receiver<()>) -> Result<()> {
        self.cleanup_stale_socket()?;

        let listener = ListenerOptions::new()
            .name(self.socket_path.as_os_str().to_fs_name::<GenericFilePath>()?)
            .create_tokio()?;

        info!(path = %self.socket_path.display(), "server listening");

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok(stream) => {
                            let dispatcher = self.dispatcher.clone();
                            tokio::spawn(async move {
                                if let Err(error) = handle_connection(stream, dispatcher).await {
                                    error!(%error, "connection handler failed");
                                }
                            });
                        }
                        Err(error) => {
                            error!(%error, "failed to accept connection");
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }

        self.cleanup_socket();
        Ok(())
    }

    fn cleanup_socket(&self) {
        if let Err(error) = std::fs::remove_file(&self.socket_path) {
            debug!(%error, "socket file already removed");
        } else {
            debug!("socket file cleaned up");
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.cleanup_socket();
    }
}

async fn handle_connection(mut stream: Stream, dispatcher: Dispatcher) -> Result<()> {
    debug!("new connection accepted");

    let request: Request = read_frame(&mut stream)
        .await
        .context("failed to read request")?;

    debug!("request decoded");

    let response = dispatcher.handle(request).await;

    write_frame(&mut stream, &response)
        .await
        .context("failed to write response")?;

    Ok(())
}

/// Routes requests to the actors and the board service.
#[derive(Clone)]
pub struct Dispatcher {
    timer: TimerHandle,
    micro_timer: MicroTimerHandle,
    board: Arc<BoardService>,
}

impl Dispatcher {
    pub fn new(
        timer: TimerHandle,
        micro_timer: MicroTimerHandle,
        board: Arc<BoardService>,
    ) -> Self {
        Self {
            timer,
            micro_timer,
            board,
        }
    }

    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Ping => Response::Pong,

            Request::GetStatus => self.status().await,

            Request::StartSession { mode } => match self.timer.start(mode).await {
                Ok(decision) => Response::StartDecision(decision),
                Err(error) => Response::error(error),
            },

            Request::ConfirmShortenedSession => match self.timer.confirm_shortened().await {
                Ok(decision) => Response::StartDecision(decision),
                Err(error) => Response::error(error),
            },

            Request::DeclineShortenedSession => ok_or_error(self.timer.decline_shortened().await),

            Request::PauseSession => ok_or_error(self.timer.pause().await),

            Request::ResetSession => ok_or_error(self.timer.reset().await),

            Request::SwitchMode { mode } => ok_or_error(self.timer.switch_mode(mode).await),

            Request::StartMicroTimer => match self.micro_timer.start().await {
                Some(true) => Response::Ok,
                Some(false) => Response::error("micro timer is already running"),
                None => Response::error("micro timer is not available"),
            },

            Request::CancelMicroTimer => match self.micro_timer.cancel().await {
                Ok(()) => Response::Ok,
                Err(_) => Response::error("micro timer is not available"),
            },

            Request::GetSettings => match self.on_board(|board| board.settings()).await {
                Ok(mut settings) => {
                    let journal_locked = settings.is_journal_locked();
                    settings.journal_password_hash = None;
                    Response::Settings {
                        settings,
                        journal_locked,
                    }
                }
                Err(error) => Response::error(error),
            },

            Request::UpdateSetting { key, value } => unlocked(
                self.on_board(move |board| board.update_setting(key, &value))
                    .await,
            ),

            Request::AddTask {
                text,
                quadrant,
                intention,
            } => unlocked(
                self.on_board(move |board| board.add_task(&text, quadrant, intention))
                    .await,
            ),

            Request::ToggleTask { id } => {
                unlocked(self.on_board(move |board| board.toggle_task(id)).await)
            }

            Request::RemoveTask { id } => {
                ok_or_error(self.on_board(move |board| board.remove_task(id)).await)
            }

            Request::ListTasks => match self.on_board(|board| board.board()).await {
                Ok(board) => Response::Tasks(board),
                Err(error) => Response::error(error),
            },

            Request::ListAchievements => match self.on_board(|board| board.achievements()).await {
                Ok(unlocked) => Response::Achievements {
                    unlocked: unlocked.iter().collect(),
                },
                Err(error) => Response::error(error),
            },

            Request::GetStats => match self.on_board(|board| board.stats(Local::now())).await {
                Ok(stats) => Response::Stats(stats),
                Err(error) => Response::error(error),
            },

            Request::AddDailyReview {
                highlights,
                improvements,
                intention_for_tomorrow,
            } => ok_or_error(
                self.on_board(move |board| {
                    board.add_daily_review(&highlights, &improvements, intention_for_tomorrow)
                })
                .await,
            ),

            Request::ListDailyReviews { password } => match self
                .on_board(move |board| board.daily_reviews(password.as_deref()))
                .await
            {
                Ok(reviews) => Response::DailyReviews(reviews),
                Err(error) => Response::error(error),
            },
        }
    }

    async fn status(&self) -> Response {
        let (Some(timer), Some(micro_timer)) =
            (self.timer.get_status().await, self.micro_timer.get_status().await)
        else {
            return Response::error("failed to read timer status");
        };

        let urgent_important = match self.on_board(|board| board.board()).await {
            Ok(board) => board
                .urgent_important()
                .into_iter()
                .map(|task| task.text.clone())
                .collect(),
            Err(error) => {
                warn!(%error, "failed to load task board for status");
                Vec::new()
            }
        };

        Response::SessionStatus(StatusReport {
            session: timer.session,
            micro_timer,
            pending_offer: timer.pending_offer,
            urgent_important,
        })
    }

    /// Board operations touch SQLite and may hash passwords.
    async fn on_board<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&BoardService) -> Result<T, BoardError> + Send + 'static,
        T: Send + 'static,
    {
        let board = self.board.clone();
        Ok(tokio::task::spawn_blocking(move || work(&board)).await??)
    }
}

fn ok_or_error<E: std::fmt::Display>(result: Result<(), E>) -> Response {
    match result {
        Ok(()) => Response::Ok,
        Err(error) => Response::error(error),
    }
}

fn unlocked(result: Result<AchievementSet>) -> Response {
    match result {
        Ok(achievements) => Response::Unlocked {
            achievements: achievements.iter().collect(),
        },
        Err(error) => Response::error(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::{MicroTimerActor, TimerActor, TimerServices};
    use crate::services::{EndMessageService, PrayerGate, SessionHistory};
    use miqat_adapters::{SqliteDocumentStore, StubPrayerTimesGateway, StubQuoteGateway};
    use miqat_core::{Achievement, AchievementLedger, Quadrant, SessionConfig, SettingKey};
    use miqat_protocol::{SessionMode, StartDecision};
    use uuid::Uuid;

    fn dispatcher() -> Dispatcher {
        let store = Arc::new(SqliteDocumentStore::in_memory(Uuid::new_v4()).unwrap());
        let ledger = Arc::new(AchievementLedger::new(store.clone()));

        let services = TimerServices {
            gate: PrayerGate::new(Arc::new(StubPrayerTimesGateway::default())),
            end_messages: EndMessageService::new(
                Arc::new(StubQuoteGateway::default()),
                store.clone(),
            ),
            history: SessionHistory::new(store.clone(), ledger.clone()),
            settings: store.clone(),
        };
        let (timer, timer_handle) =
            TimerActor::new(SessionConfig::default(), services, None, Some(store.subscribe()));
        tokio::spawn(timer.run());

        let (micro_timer, micro_timer_handle) = MicroTimerActor::new(None);
        tokio::spawn(micro_timer.run());

        let board = BoardService::new(store.clone(), store.clone(), store.clone(), store, ledger);
        Dispatcher::new(timer_handle, micro_timer_handle, Arc::new(board))
    }

    #[tokio::test]
    async fn ping_answers_pong() {
        assert_eq!(dispatcher().handle(Request::Ping).await, Response::Pong);
    }

    #[tokio::test]
    async fn start_then_status_reports_running_session() {
        let dispatcher = dispatcher();

        let started = dispatcher
            .handle(Request::StartSession { mode: None })
            .await;
        let status = dispatcher.handle(Request::GetStatus).await;

        assert_eq!(
            started,
            Response::StartDecision(StartDecision::Started {
                mode: SessionMode::Work,
                remaining_seconds: 25 * 60
            })
        );
        let Response::SessionStatus(report) = status else {
            panic!("expected status");
        };
        assert!(report.session.running);
        assert!(!report.micro_timer.running);
        assert_eq!(report.pending_offer, None);
    }

    #[tokio::test]
    async fn status_lists_open_urgent_important_tasks() {
        let dispatcher = dispatcher();
        dispatcher
            .handle(Request::AddTask {
                text: "call the bank".to_string(),
                quadrant: Quadrant::Q1,
                intention: None,
            })
            .await;
        dispatcher
            .handle(Request::AddTask {
                text: "plan the week".to_string(),
                quadrant: Quadrant::Q2,
                intention: None,
            })
            .await;

        let Response::SessionStatus(report) = dispatcher.handle(Request::GetStatus).await else {
            panic!("expected status");
        };

        assert_eq!(report.urgent_important, vec!["call the bank".to_string()]);
    }

    #[tokio::test]
    async fn settings_never_expose_password_hash() {
        let dispatcher = dispatcher();

        let unlocked = dispatcher
            .handle(Request::UpdateSetting {
                key: SettingKey::JournalPassword,
                value: "sesame".to_string(),
            })
            .await;
        let settings = dispatcher.handle(Request::GetSettings).await;

        assert_eq!(
            unlocked,
            Response::Unlocked {
                achievements: vec![Achievement::Personalizer]
            }
        );
        let Response::Settings {
            settings,
            journal_locked,
        } = settings
        else {
            panic!("expected settings");
        };
        assert!(journal_locked);
        assert_eq!(settings.journal_password_hash, None);
    }

    #[tokio::test]
    async fn failures_become_error_responses() {
        let dispatcher = dispatcher();

        let pause = dispatcher.handle(Request::PauseSession).await;
        let toggle = dispatcher
            .handle(Request::ToggleTask { id: Uuid::new_v4() })
            .await;
        let invalid = dispatcher
            .handle(Request::UpdateSetting {
                key: SettingKey::WorkMinutes,
                value: "lots".to_string(),
            })
            .await;

        assert!(matches!(pause, Response::Error { .. }));
        assert!(matches!(
            toggle,
            Response::Error { message } if message.starts_with("no task with id")
        ));
        assert!(matches!(invalid, Response::Error { .. }));
    }

    #[tokio::test]
    async fn micro_timer_refuses_double_start() {
        let dispatcher = dispatcher();

        assert_eq!(dispatcher.handle(Request::StartMicroTimer).await, Response::Ok);
        assert!(matches!(
            dispatcher.handle(Request::StartMicroTimer).await,
            Response::Error { .. }
        ));
        assert_eq!(dispatcher.handle(Request::CancelMicroTimer).await, Response::Ok);
    }
}
