use rand::Rng;
use serde::{Deserialize, Serialize};

use super::settings::{MessageOrder, MessageSource};
use super::SessionConfig;

pub const FIRST_VERSE: u16 = 1;
pub const LAST_VERSE: u16 = 6236;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub text: String,
    pub surah_name: String,
    pub surah_number: u16,
    pub ayah_number: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndMessage {
    Text(String),
    Verse(Verse),
    Unavailable,
}

impl EndMessage {
    pub fn is_available(&self) -> bool {
        !matches!(self, EndMessage::Unavailable)
    }
}

impl std::fmt::Display for EndMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndMessage::Text(text) => write!(f, "{}", text),
            EndMessage::Verse(verse) => write!(
                f,
                "{} ({} {}:{})",
                verse.text, verse.surah_name, verse.surah_number, verse.ayah_number
            ),
            EndMessage::Unavailable => write!(f, "no message available"),
        }
    }
}

/// What the rotation policy decided, before any fetch happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePick {
    Custom {
        text: String,
        /// Cursor to persist; only set for sequential order.
        next_cursor: Option<usize>,
    },
    Verse {
        index: u16,
    },
    Unavailable,
}

pub fn pick<R: Rng + ?Sized>(config: &SessionConfig, rng: &mut R) -> MessagePick {
    match config.message_source {
        MessageSource::Verse => MessagePick::Verse {
            index: rng.gen_range(FIRST_VERSE..=LAST_VERSE),
        },
        MessageSource::Custom => pick_custom(config, rng),
    }
}

fn pick_custom<R: Rng + ?Sized>(config: &SessionConfig, rng: &mut R) -> MessagePick {
    let messages = &config.custom_messages;
    if messages.is_empty() {
        return MessagePick::Unavailable;
    }

    match config.message_order {
        MessageOrder::Random => MessagePick::Custom {
            text: messages[rng.gen_range(0..messages.len())].clone(),
            next_cursor: None,
        },
        MessageOrder::Sequential => {
            // A stale cursor (list shrank since it was saved) wraps like any other.
            let cursor = config.message_cursor % messages.len();
            MessagePick::Custom {
                text: messages[cursor].clone(),
                next_cursor: Some((cursor + 1) % messages.len()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn custom(order: MessageOrder, messages: &[&str], cursor: usize) -> SessionConfig {
        SessionConfig {
            message_source: MessageSource::Custom,
            message_order: order,
            custom_messages: messages.iter().map(|m| m.to_string()).collect(),
            message_cursor: cursor,
            ..Default::default()
        }
    }

    #[test]
    fn verse_index_stays_in_canonical_range() {
        let config = SessionConfig::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1000 {
            match pick(&config, &mut rng) {
                MessagePick::Verse { index } => {
                    assert!((FIRST_VERSE..=LAST_VERSE).contains(&index))
                }
                other => panic!("expected verse pick, got {:?}", other),
            }
        }
    }

    #[test]
    fn sequential_rotation_visits_each_message_once_and_wraps() {
        let mut config = custom(MessageOrder::Sequential, &["a", "b", "c"], 0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = Vec::new();

        for _ in 0..3 {
            match pick(&config, &mut rng) {
                MessagePick::Custom {
                    text,
                    next_cursor: Some(next),
                } => {
                    seen.push(text);
                    config.message_cursor = next;
                }
                other => panic!("expected sequential pick, got {:?}", other),
            }
        }

        assert_eq!(seen, vec!["a", "b", "c"]);
        assert_eq!(config.message_cursor, 0);
    }

    #[test]
    fn stale_cursor_wraps_into_range() {
        let config = custom(MessageOrder::Sequential, &["a", "b"], 5);

        let picked = pick(&config, &mut StdRng::seed_from_u64(1));

        assert_eq!(
            picked,
            MessagePick::Custom {
                text: "b".to_string(),
                next_cursor: Some(0)
            }
        );
    }

    #[test]
    fn random_order_picks_from_list_without_cursor() {
        let config = custom(MessageOrder::Random, &["x", "y", "z"], 0);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            match pick(&config, &mut rng) {
                MessagePick::Custom { text, next_cursor } => {
                    assert!(config.custom_messages.contains(&text));
                    assert!(next_cursor.is_none());
                }
                other => panic!("expected random pick, got {:?}", other),
            }
        }
    }

    #[test]
    fn empty_custom_list_is_unavailable() {
        let config = custom(MessageOrder::Sequential, &[], 0);

        assert_eq!(
            pick(&config, &mut StdRng::seed_from_u64(3)),
            MessagePick::Unavailable
        );
    }

    #[test]
    fn verse_display_includes_reference() {
        let message = EndMessage::Verse(Verse {
            text: "Indeed, with hardship comes ease.".to_string(),
            surah_name: "Ash-Sharh".to_string(),
            surah_number: 94,
            ayah_number: 6,
        });

        assert_eq!(
            message.to_string(),
            "Indeed, with hardship comes ease. (Ash-Sharh 94:6)"
        );
        assert!(!EndMessage::Unavailable.is_available());
    }
}
