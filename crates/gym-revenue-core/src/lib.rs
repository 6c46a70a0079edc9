pub mod error;
pub mod types;

#[cfg(feature = "pricing")]
pub mod pricing;

#[cfg(feature = "commission")]
pub mod commission;

#[cfg(feature = "ledger")]
pub mod ledger;

#[cfg(feature = "conversion")]
pub mod conversion;

pub use error::RevenueError;
pub use types::*;

/// Standard result type for all revenue-engine operations
pub type RevenueResult<T> = Result<T, RevenueError>;
