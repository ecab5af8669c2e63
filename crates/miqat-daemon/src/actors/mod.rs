mod micro_timer;
mod notifier;
mod timer;

pub use micro_timer::{MicroTimerActor, MicroTimerHandle};
pub use notifier::{NotifierActor, NotifierHandle, NotifierMessage};
pub use timer::{TimerActor, TimerError, TimerHandle, TimerServices};
