//! Admin API plumbing: transport construction, typed endpoint calls, and throttling retries.

pub mod client;
pub mod retry;
pub mod transport;
