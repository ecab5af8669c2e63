mod board;
mod end_message;
mod gate;
mod history;

pub use board::{BoardError, BoardService};
pub use end_message::EndMessageService;
pub use gate::PrayerGate;
pub use history::SessionHistory;
