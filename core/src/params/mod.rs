//! Query parameter validation and normalization.
//!
//! Caller options (`RawValue`) are checked against a static per-resource
//! `Schema`; every accepted field is run through its `FieldKind` coercer and
//! collected into `WireParams`.

pub mod codes;
mod coerce;
mod raw;
mod schema;
mod validate;

pub use coerce::{format_number, DatePrecision, FieldError, FieldKind};
pub(crate) use coerce::parse_number;
pub use raw::{RawOptions, RawValue};
pub use schema::{Field, Schema};
pub use validate::{validate, Validated, ValidationWarning, WireParams};
