//! Command implementations.

pub mod clear;
pub mod extract;
pub mod status;

pub use self::clear::execute_clear;
pub use self::extract::execute_extract;
pub use self::status::execute_status;
