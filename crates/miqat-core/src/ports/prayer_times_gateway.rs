use async_trait::async_trait;

use crate::domain::{PrayerLocation, PrayerTimetable};

use super::GatewayError;

#[async_trait]
pub trait PrayerTimesGateway: Send + Sync {
    /// Today's timetable for `location`, in the location's local time.
    async fn fetch_today(&self, location: &PrayerLocation) -> Result<PrayerTimetable, GatewayError>;

    fn service_name(&self) -> &'static str;
}
