mod balance;
mod expense;
mod money;
mod period;

pub use balance::*;
pub use expense::*;
pub use money::*;
pub use period::*;
