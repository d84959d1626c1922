pub mod dates;
pub mod error;
pub mod types;

#[cfg(feature = "payment_time")]
pub mod payment_time;

#[cfg(feature = "metrics")]
pub mod metrics;

#[cfg(feature = "report")]
pub mod report;

#[cfg(feature = "sample_data")]
pub mod sample;

pub use error::PtrsError;
pub use types::*;

/// Standard result type for all PTRS operations
pub type PtrsResult<T> = Result<T, PtrsError>;
