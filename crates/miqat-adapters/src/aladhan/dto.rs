use std::collections::HashMap;

use serde::Deserialize;

use miqat_core::domain::PrayerTimetable;
use miqat_core::GatewayError;

#[derive(Deserialize, Debug)]
pub struct TimingsResponse {
    pub code: u16,
    pub data: TimingsData,
}

#[derive(Deserialize, Debug)]
pub struct TimingsData {
    /// Keyed by prayer name; values look like `"05:12"` or `"05:12 (EET)"`.
    pub timings: HashMap<String, String>,
}

impl TimingsResponse {
    pub fn into_timetable(self) -> Result<PrayerTimetable, GatewayError> {
        if self.code != 200 {
            return Err(GatewayError::Status { status: self.code });
        }

        PrayerTimetable::from_clock_strings(&self.data.timings).map_err(|error| {
            GatewayError::Parse {
                message: error.to_string(),
            }
        })
    }
}
