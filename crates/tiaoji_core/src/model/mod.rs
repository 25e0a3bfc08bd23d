//! Domain model for admissions-transfer school records.
//!
//! # Responsibility
//! - Define canonical record shapes shared by store, service and query code.
//! - Keep the persisted JSON field names stable.
//!
//! # Invariants
//! - Every record is identified by a stable `SchoolId`, never reused while a
//!   collection is alive.
//! - Every record carries all four score years.

pub mod collection;
pub mod school;
