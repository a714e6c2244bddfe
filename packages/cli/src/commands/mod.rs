pub mod check;
pub mod fix;
pub mod install;
pub mod new;
pub mod validate;

pub use check::{check, CheckArgs};
pub use fix::{fix, FixArgs};
pub use install::{install, InstallArgs};
pub use new::{new, NewArgs};
pub use validate::{validate, ValidateArgs};
