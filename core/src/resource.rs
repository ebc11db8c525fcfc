//! The REST resources exposed by the launch API.

use std::fmt;

/// One endpoint of the upstream API, served at `/json/<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Companies,
    Launches,
    Locations,
    Missions,
    Pads,
    Tags,
    Vehicles,
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Companies,
        Resource::Launches,
        Resource::Locations,
        Resource::Missions,
        Resource::Pads,
        Resource::Tags,
        Resource::Vehicles,
    ];

    /// Wire name of the resource, as used in the URL path.
    pub const fn as_str(self) -> &'static str {
        match self {
            Resource::Companies => "companies",
            Resource::Launches => "launches",
            Resource::Locations => "locations",
            Resource::Missions => "missions",
            Resource::Pads => "pads",
            Resource::Tags => "tags",
            Resource::Vehicles => "vehicles",
        }
    }

    /// Path relative to the API host, e.g. `/json/launches`.
    pub fn path(self) -> String {
        format!("/json/{}", self.as_str())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_uses_json_prefix() {
        assert_eq!(Resource::Launches.path(), "/json/launches");
        assert_eq!(Resource::Pads.to_string(), "pads");
    }
}
