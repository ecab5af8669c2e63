mod dto;
mod gateway;

pub use gateway::AlquranQuoteGateway;
