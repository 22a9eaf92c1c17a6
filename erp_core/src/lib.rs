pub mod config;
pub mod erp;
pub mod error;
pub mod notifier;
pub mod report;
pub mod schedule;
