pub mod authconfig;
pub mod cli;
pub mod config;
pub mod marketplace;
pub mod prism;
pub mod publish;
pub mod spec_file;
pub mod telemetry;
pub mod util;
