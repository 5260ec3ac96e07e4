pub mod bucket;
pub mod grant;
pub mod object;

pub use bucket::*;
pub use grant::*;
pub use object::*;
