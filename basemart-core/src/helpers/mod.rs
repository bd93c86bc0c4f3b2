pub mod abi;
pub mod app_config;
pub mod units;
pub mod validation;
