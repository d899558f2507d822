pub mod error;
pub mod value;

pub use error::{Result, UuidError};
pub use value::{Record, Value};
