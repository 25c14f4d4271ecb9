mod config;
mod driver;
mod error;

pub use config::Config;
pub use driver::{Driver, Outcome};
pub use error::DriverError;
