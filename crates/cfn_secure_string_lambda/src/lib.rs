//! AWS-oriented adapters and handlers for the SecureString custom resource.
//!
//! This crate owns runtime integration details (the Lambda handler, the
//! parameter store and callback seams, environment configuration). The
//! contract and outcome primitives live in `cfn_secure_string_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
