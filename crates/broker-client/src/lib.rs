//! Client library for the model-coupling data-exchange broker: a thin HTTP
//! wrapper plus bounded-retry polling helpers.

pub mod client;
pub mod error;
pub mod retry;

pub use client::BrokerClient;
pub use error::ClientError;
