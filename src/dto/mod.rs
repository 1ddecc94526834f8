pub mod bookmaker;
pub mod common;
pub mod ledger;
pub mod operation;

// Re-export commonly used types for convenience
pub use bookmaker::*;
pub use common::*;
pub use ledger::*;
pub use operation::*;
