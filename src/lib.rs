pub mod application;
pub mod cli;
pub mod domain;
pub mod io;
pub mod storage;

pub use application::BalanceService;
pub use domain::*;
pub use storage::{BalanceStore, MemoryStore, SqliteStore};
