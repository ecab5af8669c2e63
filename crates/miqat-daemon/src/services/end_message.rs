use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::timeout;
use tracing::{debug, error, warn};

use miqat_core::domain::{pick_end_message, MessagePick};
use miqat_core::ports::{QuoteGateway, SettingsRepository};
use miqat_core::{EndMessage, SessionConfig};

const FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Produces the end-of-session message. Never fails: every problem ends up
/// as [`EndMessage::Unavailable`].
pub struct EndMessageService {
    quotes: Arc<dyn QuoteGateway>,
    settings: Arc<dyn SettingsRepository>,
    rng: Mutex<StdRng>,
}

impl EndMessageService {
    pub fn new(quotes: Arc<dyn QuoteGateway>, settings: Arc<dyn SettingsRepository>) -> Self {
        Self {
            quotes,
            settings,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    #[cfg(test)]
    fn seeded(
        quotes: Arc<dyn QuoteGateway>,
        settings: Arc<dyn SettingsRepository>,
        seed: u64,
    ) -> Self {
        Self {
            quotes,
            settings,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub async fn produce(&self, config: &SessionConfig) -> EndMessage {
        let pick = {
            let mut rng = self.rng.lock().unwrap();
            pick_end_message(config, &mut *rng)
        };

        match pick {
            MessagePick::Custom { text, next_cursor } => {
                if let Some(cursor) = next_cursor {
                    if let Err(error) = self.settings.save_message_cursor(cursor) {
                        error!(%error, cursor, "failed to persist message cursor");
                    }
                }
                EndMessage::Text(text)
            }
            MessagePick::Verse { index } => self.fetch_verse(index).await,
            MessagePick::Unavailable => {
                debug!("custom message list is empty");
                EndMessage::Unavailable
            }
        }
    }

    async fn fetch_verse(&self, index: u16) -> EndMessage {
        let service = self.quotes.service_name();
        match timeout(FETCH_TIMEOUT, self.quotes.fetch_verse(index)).await {
            Ok(Ok(verse)) => EndMessage::Verse(verse),
            Ok(Err(error)) => {
                warn!(%error, index, service, "verse lookup failed");
                EndMessage::Unavailable
            }
            Err(_) => {
                warn!(index, service, "verse lookup timed out");
                EndMessage::Unavailable
            }
        }
    }
}
