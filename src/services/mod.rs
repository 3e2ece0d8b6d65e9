pub mod aggregator;
pub mod monitor;
pub mod notifier;
pub mod supervisor;

#[cfg(test)]
mod monitor_tests;
