//! Static per-resource parameter tables.

use super::coerce::{DatePrecision, FieldKind};
use crate::resource::Resource;

/// One accepted query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Parameters that normally narrow the result to a single record.
    pub singular: bool,
}

const fn field(name: &'static str, kind: FieldKind) -> Field {
    Field {
        name,
        kind,
        singular: false,
    }
}

const fn singular(name: &'static str, kind: FieldKind) -> Field {
    Field {
        name,
        kind,
        singular: true,
    }
}

use FieldKind::{Boolean, CountryCode, Cospar, Number, StateCode, String};

const ID: Field = singular("id", Number);
const PAGE: Field = field("page", Number);

static COMPANIES: &[Field] = &[
    ID,
    PAGE,
    field("name", String),
    field("country_code", CountryCode),
    field("inactive", Boolean),
];

static LAUNCHES: &[Field] = &[
    ID,
    PAGE,
    singular("cospar_id", Cospar),
    field("after_date", FieldKind::Date(DatePrecision::Day)),
    field("before_date", FieldKind::Date(DatePrecision::Day)),
    field("modified_since", FieldKind::Date(DatePrecision::Full)),
    field("location_id", Number),
    field("pad_id", Number),
    field("provider_id", Number),
    field("tag_id", Number),
    field("vehicle_id", Number),
    field("state_abbr", StateCode),
    field("country_code", CountryCode),
    field("search", String),
    singular("slug", String),
];

static LOCATIONS: &[Field] = &[
    ID,
    PAGE,
    field("name", String),
    field("state_abbr", StateCode),
    field("country_code", CountryCode),
];

static MISSIONS: &[Field] = &[ID, PAGE, field("name", String)];

static PADS: &[Field] = &[
    ID,
    PAGE,
    field("name", String),
    field("state_abbr", StateCode),
    field("country_code", CountryCode),
];

static TAGS: &[Field] = &[ID, PAGE, field("text", String)];

static VEHICLES: &[Field] = &[ID, PAGE, field("name", String)];

/// The accepted parameters of one resource.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub resource: Resource,
    fields: &'static [Field],
}

impl Schema {
    pub fn for_resource(resource: Resource) -> Self {
        let fields = match resource {
            Resource::Companies => COMPANIES,
            Resource::Launches => LAUNCHES,
            Resource::Locations => LOCATIONS,
            Resource::Missions => MISSIONS,
            Resource::Pads => PADS,
            Resource::Tags => TAGS,
            Resource::Vehicles => VEHICLES,
        };
        Self { resource, fields }
    }

    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &'static [Field] {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_resource_accepts_id_and_page() {
        for resource in Resource::ALL {
            let schema = Schema::for_resource(resource);
            assert_eq!(schema.field("id").map(|f| f.kind), Some(Number));
            assert_eq!(schema.field("page").map(|f| f.kind), Some(Number));
        }
    }

    #[test]
    fn launches_has_fifteen_parameters() {
        let schema = Schema::for_resource(Resource::Launches);
        assert_eq!(schema.fields().len(), 15);
        let singular: Vec<&str> = schema.fields().iter().filter(|f| f.singular).map(|f| f.name).collect();
        assert_eq!(singular, vec!["id", "cospar_id", "slug"]);
    }

    #[test]
    fn unknown_parameters_are_absent() {
        assert!(Schema::for_resource(Resource::Tags).field("name").is_none());
    }
}
