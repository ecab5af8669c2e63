use async_trait::async_trait;
use std::sync::Mutex;

use miqat_core::domain::{PrayerLocation, PrayerTimetable};
use miqat_core::ports::{PrayerTimesGateway, QuoteGateway};
use miqat_core::{GatewayError, Verse};

pub struct StubPrayerTimesGateway {
    timetable: Mutex<PrayerTimetable>,
    requests: Mutex<Vec<PrayerLocation>>,
}

impl StubPrayerTimesGateway {
    pub fn with_timetable(timetable: PrayerTimetable) -> Self {
        Self {
            timetable: Mutex::new(timetable),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn given_timetable(&self, timetable: PrayerTimetable) {
        *self.timetable.lock().unwrap() = timetable;
    }

    pub fn requests(&self) -> Vec<PrayerLocation> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for StubPrayerTimesGateway {
    fn default() -> Self {
        Self::with_timetable(PrayerTimetable::default())
    }
}

#[async_trait]
impl PrayerTimesGateway for StubPrayerTimesGateway {
    async fn fetch_today(
        &self,
        location: &PrayerLocation,
    ) -> Result<PrayerTimetable, GatewayError> {
        self.requests.lock().unwrap().push(location.clone());
        Ok(self.timetable.lock().unwrap().clone())
    }

    fn service_name(&self) -> &'static str {
        "Stub"
    }
}

pub struct StubQuoteGateway {
    verse: Verse,
    requested: Mutex<Vec<u16>>,
}

impl StubQuoteGateway {
    pub fn with_verse(verse: Verse) -> Self {
        Self {
            verse,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested_indices(&self) -> Vec<u16> {
        self.requested.lock().unwrap().clone()
    }
}

impl Default for StubQuoteGateway {
    fn default() -> Self {
        Self::with_verse(Verse {
            text: "So remember Me; I will remember you.".to_string(),
            surah_name: "Al-Baqara".to_string(),
            surah_number: 2,
            ayah_number: 152,
        })
    }
}

#[async_trait]
impl QuoteGateway for StubQuoteGateway {
    async fn fetch_verse(&self, index: u16) -> Result<Verse, GatewayError> {
        self.requested.lock().unwrap().push(index);
        Ok(self.verse.clone())
    }

    fn service_name(&self) -> &'static str {
        "Stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miqat_core::domain::CalculationMethod;

    #[tokio::test]
    async fn prayer_stub_records_requested_location() {
        let gateway = StubPrayerTimesGateway::default();
        let location = PrayerLocation {
            city: "Istanbul".to_string(),
            country: "Turkey".to_string(),
            method: CalculationMethod::default(),
        };

        let timetable = gateway.fetch_today(&location).await.unwrap();

        assert!(timetable.times().is_empty());
        assert_eq!(gateway.requests(), vec![location]);
    }

    #[tokio::test]
    async fn quote_stub_returns_configured_verse() {
        let gateway = StubQuoteGateway::default();

        let verse = gateway.fetch_verse(159).await.unwrap();

        assert_eq!(verse.surah_number, 2);
        assert_eq!(gateway.requested_indices(), vec![159]);
    }
}
