pub mod app;
pub mod config;
pub mod imds;
pub mod output;
pub mod utils;
