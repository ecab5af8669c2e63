use async_trait::async_trait;

use miqat_core::domain::{FIRST_VERSE, LAST_VERSE};
use miqat_core::ports::QuoteGateway;
use miqat_core::{GatewayError, Verse};

use super::dto::AyahResponse;
use crate::http::handle_error;

#[derive(Clone)]
pub struct AlquranQuoteGateway {
    base_url: String,
    edition: String,
}

impl AlquranQuoteGateway {
    pub fn new(base_url: impl Into<String>, edition: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            edition: edition.into(),
        }
    }

    fn fetch_ayah(&self, index: u16) -> Result<Verse, GatewayError> {
        if !(FIRST_VERSE..=LAST_VERSE).contains(&index) {
            return Err(GatewayError::InvalidRequest {
                message: format!("verse index {} outside {}..={}", index, FIRST_VERSE, LAST_VERSE),
            });
        }

        let url = format!("{}/v1/ayah/{}/{}", self.base_url, index, self.edition);

        ureq::get(&url)
            .call()
            .map_err(handle_error)?
            .into_json::<AyahResponse>()
            .map_err(|error| GatewayError::Parse {
                message: error.to_string(),
            })?
            .into_verse()
    }
}

#[async_trait]
impl QuoteGateway for AlquranQuoteGateway {
    async fn fetch_verse(&self, index: u16) -> Result<Verse, GatewayError> {
        let gateway = self.clone();

        let verse = tokio::task::spawn_blocking(move || gateway.fetch_ayah(index))
            .await
            .map_err(|error| GatewayError::Network {
                message: format!("task join error: {}", error),
            })??;

        tracing::debug!(
            index,
            surah = verse.surah_number,
            ayah = verse.ayah_number,
            "fetched verse"
        );

        Ok(verse)
    }

    fn service_name(&self) -> &'static str {
        "Alquran"
    }
}
