pub mod billing_period;
pub mod home;
pub mod types;

pub use billing_period::*;
pub use home::*;
pub use types::*;
