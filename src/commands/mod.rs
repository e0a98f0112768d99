pub mod config;
pub mod week;
