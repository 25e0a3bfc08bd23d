//! Core use-case services.
//!
//! # Responsibility
//! - Validate caller input and turn it into canonical records.
//! - Delegate persistence to a `RecordStore`.
//!
//! # Invariants
//! - Validation runs before any mutation; a rejected call changes nothing.
//! - The caller's collection is replaced only after the store accepted the
//!   new state.

pub mod school_service;
