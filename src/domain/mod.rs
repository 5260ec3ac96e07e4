pub mod errors;
pub mod models;
pub mod value_objects;

pub use errors::{BackendError, BackendResult, ErrorKind, Operation, ValidationError};
pub use models::*;
pub use value_objects::*;
