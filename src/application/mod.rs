// Application layer - use cases on top of the repository.
// The summary engine lives in the service: it fetches a period's rows and
// reduces them in memory with the domain folds.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
