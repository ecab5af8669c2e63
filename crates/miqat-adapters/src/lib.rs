//! Miqat adapters - Infrastructure implementations
//!
//! Concrete implementations of the ports defined in miqat-core: the SQLite
//! document store and the prayer-times and verse HTTP services.

pub mod aladhan;
pub mod alquran;
mod http;
pub mod sqlite;
pub mod testing;

pub use aladhan::AladhanPrayerTimesGateway;
pub use alquran::AlquranQuoteGateway;
pub use sqlite::SqliteDocumentStore;
pub use testing::{
    FailingPrayerTimesGateway, FailingQuoteGateway, HangingPrayerTimesGateway,
    HangingQuoteGateway, StubPrayerTimesGateway, StubQuoteGateway,
};
