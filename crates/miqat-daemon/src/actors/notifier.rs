use miqat_core::{NotificationUrgency, SessionMode};
use notify_rust::{Notification, Urgency};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

const APP_NAME: &str = "Miqat";
const CUE_SOUND: &str = "message-new-instant";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierMessage {
    SessionCompleted { mode: SessionMode, next: SessionMode },
    EndMessage { text: String },
    AchievementsUnlocked { titles: Vec<String> },
    MicroTimerDone,
    Alert { title: String, body: String },
}

#[derive(Clone)]
pub struct NotifierHandle {
    sender: mpsc::Sender<NotifierMessage>,
}

impl NotifierHandle {
    pub fn send_session_completed(&self, mode: SessionMode, next: SessionMode) {
        self.dispatch(NotifierMessage::SessionCompleted { mode, next });
    }

    pub fn send_end_message(&self, text: String) {
        self.dispatch(NotifierMessage::EndMessage { text });
    }

    pub fn send_achievements(&self, titles: Vec<String>) {
        if titles.is_empty() {
            return;
        }
        self.dispatch(NotifierMessage::AchievementsUnlocked { titles });
    }

    pub fn send_micro_timer_done(&self) {
        self.dispatch(NotifierMessage::MicroTimerDone);
    }

    pub fn send_alert(&self, title: String, body: String) {
        self.dispatch(NotifierMessage::Alert { title, body });
    }

    fn dispatch(&self, message: NotifierMessage) {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            if let Err(error) = sender.send(message).await {
                error!(%error, "failed to send notification message");
            }
        });
    }

    /// Handle whose messages land in the returned receiver instead of the desktop.
    #[cfg(test)]
    pub(crate) fn detached() -> (Self, mpsc::Receiver<NotifierMessage>) {
        let (sender, receiver) = mpsc::channel(32);
        (Self { sender }, receiver)
    }
}

pub struct NotifierActor {
    receiver: mpsc::Receiver<NotifierMessage>,
    urgency: Urgency,
    sound_enabled: bool,
}

impl NotifierActor {
    pub fn new(urgency: NotificationUrgency, sound_enabled: bool) -> (Self, NotifierHandle) {
        let (sender, receiver) = mpsc::channel(32);

        let urgency = match urgency {
            NotificationUrgency::Low => Urgency::Low,
            NotificationUrgency::Normal => Urgency::Normal,
            NotificationUrgency::Critical => Urgency::Critical,
        };

        let actor = Self {
            receiver,
            urgency,
            sound_enabled,
        };

        (actor, NotifierHandle { sender })
    }

    pub async fn run(mut self) {
        info!("notifier actor started");

        while let Some(message) = self.receiver.recv().await {
            let (summary, body, cue) = describe(&message);
            match self.build_notification(&summary, &body, cue).show() {
                Ok(_) => debug!(summary, "notification shown"),
                Err(error) => warn!(%error, summary, "failed to show notification"),
            }
        }

        debug!("notifier actor stopped");
    }

    fn build_notification(&self, summary: &str, body: &str, cue: bool) -> Notification {
        let mut notification = Notification::new();
        notification
            .summary(summary)
            .body(body)
            .urgency(self.urgency)
            .appname(APP_NAME);

        if cue && self.sound_enabled {
            notification.sound_name(CUE_SOUND);
        }

        notification
    }
}

/// Summary, body, and whether the audible cue goes with it.
fn describe(message: &NotifierMessage) -> (String, String, bool) {
    match message {
        NotifierMessage::SessionCompleted { mode, next } => {
            let summary = match mode {
                SessionMode::Work => "Miqat - Focus session complete",
                SessionMode::ShortBreak | SessionMode::LongBreak => "Miqat - Break over",
            };
            let body = match next {
                SessionMode::Work => "Ready for the next focus session.".to_string(),
                SessionMode::ShortBreak => "Time for a short break.".to_string(),
                SessionMode::LongBreak => "You earned a long break.".to_string(),
            };
            (summary.to_string(), body, true)
        }
        NotifierMessage::EndMessage { text } => ("Miqat".to_string(), text.clone(), false),
        NotifierMessage::AchievementsUnlocked { titles } => {
            let summary = if titles.len() == 1 {
                "Miqat - Achievement unlocked".to_string()
            } else {
                format!("Miqat - {} achievements unlocked", titles.len())
            };
            (summary, titles.join(", "), false)
        }
        NotifierMessage::MicroTimerDone => (
            "Miqat - Two minutes are up".to_string(),
            "The micro timer finished.".to_string(),
            true,
        ),
        NotifierMessage::Alert { title, body } => (title.clone(), body.clone(), false),
    }
}
