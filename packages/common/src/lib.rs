pub mod error;
pub mod filesystem;
pub mod package;
pub mod result;

pub use error::*;
pub use filesystem::*;
pub use package::*;
pub use result::*;
