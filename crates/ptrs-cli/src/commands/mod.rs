pub mod annotate;
pub mod metrics;
pub mod payment_time;
pub mod policy;
pub mod report;
pub mod sample;
