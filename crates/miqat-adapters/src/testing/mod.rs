mod failing_gateway;
mod hanging_gateway;
mod stub_gateway;

pub use failing_gateway::{FailingPrayerTimesGateway, FailingQuoteGateway};
pub use hanging_gateway::{HangingPrayerTimesGateway, HangingQuoteGateway};
pub use stub_gateway::{StubPrayerTimesGateway, StubQuoteGateway};
