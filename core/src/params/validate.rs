//! Options validation: walks caller options against a resource schema and
//! produces wire-ready query parameters.
//!
//! # Design
//! Validation is all-or-nothing. The first malformed parameter aborts the
//! whole call, so a request is never sent with a partial parameter set.
//! Advisory warnings are logged through `tracing` and also returned in
//! `Validated` so callers can surface them.

use std::fmt;

use tracing::warn;

use super::raw::RawValue;
use super::schema::Schema;
use crate::error::ValidationError;
use crate::resource::Resource;

/// Validated query parameters in caller order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireParams {
    pairs: Vec<(String, String)>,
}

impl WireParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}

/// Non-fatal findings; the request still proceeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    UnknownParameter { resource: Resource, parameter: String },
    UndefinedParameter { parameter: String },
    SingularCombination,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::UnknownParameter { resource, parameter } => write!(
                f,
                "\"{parameter}\" is not a valid query parameter for resource \"{resource}\" and will be ignored."
            ),
            ValidationWarning::UndefinedParameter { parameter } => {
                write!(f, "Query parameter \"{parameter}\" is undefined and will be ignored.")
            }
            ValidationWarning::SingularCombination => f.write_str(
                "Using 'id', 'slug', or 'cospar_id' as query parameters generally returns a single result. \
                 Combining it with other parameters may not be achieving the result you expect.",
            ),
        }
    }
}

/// Successful validation output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validated {
    pub params: WireParams,
    pub warnings: Vec<ValidationWarning>,
}

/// Validate `options` against the schema of `resource`.
///
/// `Undefined` options mean "no options". Any other non-object shape fails
/// with `ValidationError::InvalidOptions` before any parameter is examined.
pub fn validate(resource: Resource, options: &RawValue) -> Result<Validated, ValidationError> {
    let options = match options {
        RawValue::Undefined => return Ok(Validated::default()),
        RawValue::Object(options) => options,
        other => {
            warn!(resource = %resource, kind = other.kind(), "rejected non-object query options");
            return Err(ValidationError::InvalidOptions);
        }
    };

    let schema = Schema::for_resource(resource);
    let mut validated = Validated::default();
    let mut singular = 0usize;

    for (name, value) in options.iter() {
        let Some(field) = schema.field(name) else {
            validated.warn(
                resource,
                ValidationWarning::UnknownParameter {
                    resource,
                    parameter: name.to_string(),
                },
            );
            continue;
        };
        if matches!(value, RawValue::Undefined) {
            validated.warn(
                resource,
                ValidationWarning::UndefinedParameter {
                    parameter: name.to_string(),
                },
            );
            continue;
        }

        let wire = field
            .kind
            .coerce(value)
            .map_err(|reason| ValidationError::MalformedParameter {
                resource,
                parameter: name.to_string(),
                reason,
            })?;
        if field.singular {
            singular += 1;
        }
        validated.params.insert(name, wire);
    }

    if singular > 0 && validated.params.len() > 1 {
        validated.warn(resource, ValidationWarning::SingularCombination);
    }
    Ok(validated)
}

impl Validated {
    /// Log a warning as soon as it is found, then keep it for the caller.
    fn warn(&mut self, resource: Resource, warning: ValidationWarning) {
        warn!(resource = %resource, "{warning}");
        self.warnings.push(warning);
    }
}
