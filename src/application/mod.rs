// Application layer - use cases on top of a BalanceStore.
// The CLI and the io module only talk to BalanceService; the calculator,
// aggregator and entry manager are exposed for callers that bring their own store.

mod calculator;
mod entries;
pub mod error;
pub mod reporting;
mod service;
mod summary;

pub use calculator::*;
pub use entries::*;
pub use error::*;
pub use reporting::*;
pub use service::*;
pub use summary::*;
