//! Command implementations.

pub mod capabilities;
pub mod config;
pub mod extract;

pub use self::capabilities::execute_capabilities;
pub use self::config::execute_config;
pub use self::extract::execute_extract;
