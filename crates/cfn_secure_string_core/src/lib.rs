//! Shared CloudFormation SecureString custom-resource primitives.
//!
//! This crate owns the custom-resource wire contract (inbound lifecycle event,
//! outbound callback body), strict event validation, and the outcome messages
//! reported back to CloudFormation. It intentionally excludes AWS SDK and
//! Lambda runtime concerns.

pub mod contract;
pub mod outcome;
pub mod redaction;
