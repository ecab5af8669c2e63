use async_trait::async_trait;

use miqat_core::domain::{PrayerLocation, PrayerTimetable};
use miqat_core::ports::{PrayerTimesGateway, QuoteGateway};
use miqat_core::{GatewayError, Verse};

/// Never answers. Callers are expected to give up on their own.
#[derive(Debug, Default)]
pub struct HangingPrayerTimesGateway;

#[async_trait]
impl PrayerTimesGateway for HangingPrayerTimesGateway {
    async fn fetch_today(
        &self,
        _location: &PrayerLocation,
    ) -> Result<PrayerTimetable, GatewayError> {
        std::future::pending().await
    }

    fn service_name(&self) -> &'static str {
        "Hanging"
    }
}

/// Never answers. Callers are expected to give up on their own.
#[derive(Debug, Default)]
pub struct HangingQuoteGateway;

#[async_trait]
impl QuoteGateway for HangingQuoteGateway {
    async fn fetch_verse(&self, _index: u16) -> Result<Verse, GatewayError> {
        std::future::pending().await
    }

    fn service_name(&self) -> &'static str {
        "Hanging"
    }
}
