//! Field constraint tables for every form on the site.

use rust_decimal::Decimal;

use cafe_and_wifi_core::{CoffeePrice, Location, LocationFilter, SeatRange};

/// Longest accepted single-line value.
pub const SHORT_MAX: usize = 250;
/// Longest accepted comment or reply.
pub const TEXT_MAX: usize = 250;
/// Longest accepted café description.
pub const DESCRIPTION_MAX: usize = 1000;
/// Longest accepted opening-times string.
pub const OPENING_TIME_MAX: usize = 60;

/// A single validation rule.
#[derive(Debug, Clone, Copy)]
pub enum Constraint {
    /// Non-blank after trimming.
    Required,
    /// Structurally valid email address.
    Email,
    /// Decimal number within an inclusive range.
    NumberRange { min: Decimal, max: Decimal },
    /// `http(s)://` values must be well-formed URLs; other text is an address.
    MapReference,
    /// One of a fixed set of labels.
    OneOf(fn() -> Vec<&'static str>),
    /// At most this many characters.
    MaxLength(usize),
}

/// A named form field and its rules, checked in order.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub constraints: &'static [Constraint],
}

pub const LOCATION_SEARCH: &[FieldSpec] = &[FieldSpec {
    name: "location",
    label: "Location",
    constraints: &[Constraint::Required, Constraint::OneOf(LocationFilter::labels)],
}];

pub const ADD_CAFE: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        label: "Cafe Name",
        constraints: &[Constraint::Required, Constraint::MaxLength(SHORT_MAX)],
    },
    FieldSpec {
        name: "map_url",
        label: "Map Url",
        constraints: &[
            Constraint::Required,
            Constraint::MaxLength(SHORT_MAX),
            Constraint::MapReference,
        ],
    },
    FieldSpec {
        name: "img_url",
        label: "Image",
        constraints: &[Constraint::Required],
    },
    FieldSpec {
        name: "location",
        label: "Location",
        constraints: &[Constraint::Required, Constraint::OneOf(Location::labels)],
    },
    FieldSpec {
        name: "has_sockets",
        label: "Does it have sockets?",
        constraints: &[],
    },
    FieldSpec {
        name: "has_toilet",
        label: "Does it have Toilets?",
        constraints: &[],
    },
    FieldSpec {
        name: "has_wifi",
        label: "Does it have Wifi?",
        constraints: &[],
    },
    FieldSpec {
        name: "can_take_calls",
        label: "Can you take calls there?",
        constraints: &[],
    },
    FieldSpec {
        name: "seats",
        label: "Approximate number of seating",
        constraints: &[Constraint::Required, Constraint::OneOf(SeatRange::labels)],
    },
    FieldSpec {
        name: "coffee_price",
        label: "Approximate price of a coffee in HKD",
        constraints: &[
            Constraint::Required,
            Constraint::NumberRange {
                min: CoffeePrice::MIN,
                max: CoffeePrice::MAX,
            },
        ],
    },
    FieldSpec {
        name: "opening_time",
        label: "Opening Times",
        constraints: &[Constraint::MaxLength(OPENING_TIME_MAX)],
    },
    FieldSpec {
        name: "description",
        label: "Description",
        constraints: &[Constraint::MaxLength(DESCRIPTION_MAX)],
    },
];

pub const REGISTER: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        label: "Full Name",
        constraints: &[Constraint::Required, Constraint::MaxLength(SHORT_MAX)],
    },
    FieldSpec {
        name: "email",
        label: "Email Address",
        constraints: &[Constraint::Required, Constraint::Email],
    },
    FieldSpec {
        name: "password",
        label: "Password",
        constraints: &[Constraint::Required],
    },
];

pub const LOGIN: &[FieldSpec] = &[
    FieldSpec {
        name: "email",
        label: "Email Address",
        constraints: &[Constraint::Required, Constraint::Email],
    },
    FieldSpec {
        name: "password",
        label: "Password",
        constraints: &[Constraint::Required],
    },
];

pub const COMMENT: &[FieldSpec] = &[FieldSpec {
    name: "text",
    label: "Comment",
    constraints: &[Constraint::Required, Constraint::MaxLength(TEXT_MAX)],
}];

pub const REPLY: &[FieldSpec] = &[FieldSpec {
    name: "reply_text",
    label: "Reply",
    constraints: &[Constraint::Required, Constraint::MaxLength(TEXT_MAX)],
}];

/// Look up a field's label. Templates render every label through this.
#[must_use]
pub fn label(table: &[FieldSpec], name: &str) -> &'static str {
    table
        .iter()
        .find(|f| f.name == name)
        .map_or("", |f| f.label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_have_unique_field_names() {
        for table in [LOCATION_SEARCH, ADD_CAFE, REGISTER, LOGIN, COMMENT, REPLY] {
            let mut names: Vec<&str> = table.iter().map(|f| f.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), table.len());
        }
    }

    #[test]
    fn test_label_lookup() {
        assert_eq!(label(ADD_CAFE, "coffee_price"), "Approximate price of a coffee in HKD");
        assert_eq!(label(LOGIN, "missing"), "");
    }
}
