use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Verse;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("network error: {message}")]
    Network { message: String },

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("parse error: {message}")]
    Parse { message: String },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

#[async_trait]
pub trait QuoteGateway: Send + Sync {
    async fn fetch_verse(&self, index: u16) -> Result<Verse, GatewayError>;

    fn service_name(&self) -> &'static str;
}
