#![forbid(unsafe_code)]

pub mod access;
pub mod common;
pub mod ledger;
pub mod master;
pub mod s156;

pub use common::{ContractViolation, SchemaVersion, Validate};
