use async_trait::async_trait;

use miqat_core::domain::{PrayerLocation, PrayerTimetable};
use miqat_core::ports::{PrayerTimesGateway, QuoteGateway};
use miqat_core::{GatewayError, Verse};

fn connection_refused() -> GatewayError {
    GatewayError::Network {
        message: "connection refused".to_string(),
    }
}

pub struct FailingPrayerTimesGateway {
    error: GatewayError,
}

impl FailingPrayerTimesGateway {
    pub fn network_error() -> Self {
        Self {
            error: connection_refused(),
        }
    }

    pub fn with_error(error: GatewayError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl PrayerTimesGateway for FailingPrayerTimesGateway {
    async fn fetch_today(
        &self,
        _location: &PrayerLocation,
    ) -> Result<PrayerTimetable, GatewayError> {
        Err(self.error.clone())
    }

    fn service_name(&self) -> &'static str {
        "Failing"
    }
}

pub struct FailingQuoteGateway {
    error: GatewayError,
}

impl FailingQuoteGateway {
    pub fn network_error() -> Self {
        Self {
            error: connection_refused(),
        }
    }

    pub fn with_error(error: GatewayError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl QuoteGateway for FailingQuoteGateway {
    async fn fetch_verse(&self, _index: u16) -> Result<Verse, GatewayError> {
        Err(self.error.clone())
    }

    fn service_name(&self) -> &'static str {
        "Failing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn quote_gateway_returns_configured_error() {
        let gateway = FailingQuoteGateway::with_error(GatewayError::Status { status: 503 });

        let result = gateway.fetch_verse(1).await;

        assert_eq!(result, Err(GatewayError::Status { status: 503 }));
    }

    #[tokio::test]
    async fn prayer_gateway_returns_network_error() {
        let gateway = FailingPrayerTimesGateway::network_error();
        let location = PrayerLocation {
            city: "Paris".to_string(),
            country: "France".to_string(),
            method: Default::default(),
        };

        let result = gateway.fetch_today(&location).await;

        assert!(matches!(result, Err(GatewayError::Network { .. })));
    }
}
