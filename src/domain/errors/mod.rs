mod backend_errors;
mod validation_errors;

pub use backend_errors::*;
pub use validation_errors::*;
