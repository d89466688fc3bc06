pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod migrator;
pub mod services;
pub mod telemetry;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use sea_orm;
