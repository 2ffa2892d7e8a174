pub mod errors;
pub mod pem;

pub use errors::*;
