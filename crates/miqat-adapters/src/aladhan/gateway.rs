use async_trait::async_trait;

use miqat_core::domain::{PrayerLocation, PrayerTimetable};
use miqat_core::ports::PrayerTimesGateway;
use miqat_core::GatewayError;

use super::dto::TimingsResponse;
use crate::http::handle_error;

#[derive(Clone)]
pub struct AladhanPrayerTimesGateway {
    base_url: String,
}

impl AladhanPrayerTimesGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn fetch_timetable(&self, location: &PrayerLocation) -> Result<PrayerTimetable, GatewayError> {
        let url = format!("{}/v1/timingsByCity", self.base_url);

        let response = ureq::get(&url)
            .query("city", &location.city)
            .query("country", &location.country)
            .query("method", &location.method.code())
            .call()
            .map_err(handle_error)?;

        response
            .into_json::<TimingsResponse>()
            .map_err(|error| GatewayError::Parse {
                message: error.to_string(),
            })?
            .into_timetable()
    }
}

#[async_trait]
impl PrayerTimesGateway for AladhanPrayerTimesGateway {
    async fn fetch_today(
        &self,
        location: &PrayerLocation,
    ) -> Result<PrayerTimetable, GatewayError> {
        let gateway = self.clone();
        let owned_location = location.clone();

        let fetch = move || gateway.fetch_timetable(&owned_location);
        let timetable = tokio::task::spawn_blocking(fetch)
            .await
            .map_err(|error| GatewayError::Network {
                message: format!("task join error: {}", error),
            })??;

        tracing::debug!(
            city = %location.city,
            country = %location.country,
            prayers = timetable.times().len(),
            "fetched prayer timetable"
        );

        Ok(timetable)
    }

    fn service_name(&self) -> &'static str {
        "Aladhan"
    }
}
