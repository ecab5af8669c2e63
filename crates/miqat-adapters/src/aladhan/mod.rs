mod dto;
mod gateway;

pub use gateway::AladhanPrayerTimesGateway;
