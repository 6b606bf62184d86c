//! Shared contracts for the occupational health platform.
//!
//! Pure domain types only: aggregates, DTOs and the dynamic-fields core
//! (schema model, validation engine, inheritance resolver, formatter and
//! the field-set administration operations). No I/O and no async — the
//! backend crate owns persistence and transport.

pub mod domain;
pub mod fields;
