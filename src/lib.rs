//! Disaster Monitor - multi-agent disaster and economic impact monitoring
//!
//! Each cycle gathers real-time disaster and economic data, runs an ordered
//! chain of LLM analyst roles over it, stores the resulting scenario and
//! alerts an operator over Telegram.

pub mod agents;
pub mod bus;
pub mod cli;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod events;
pub mod llm;
pub mod services;
pub mod text;

// Re-export commonly used types
pub use bus::EventBus;
pub use config::AppConfig;
pub use error::MonitorError;
pub use events::{CycleOutcome, CycleReport, Event};

#[cfg(test)]
mod events_tests;
