//! Form definitions and validation.
//!
//! Every form is a `const` table of [`FieldSpec`]s in [`fields`]. Raw form
//! structs keep exactly what the browser sent so a failed submission can be
//! re-rendered with the user's input intact; `validate()` runs the table and
//! then converts the values into typed domain inputs.

pub mod fields;

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Deserialize;

use cafe_and_wifi_core::{CoffeePrice, Email, Location, LocationFilter, SeatRange, UnknownChoice};

use fields::{Constraint, FieldSpec};

// =============================================================================
// Errors
// =============================================================================

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, String>,
}

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field. The first message per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    /// Message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Single-field error, for failures discovered after validation
    /// (duplicate names, upload errors).
    #[must_use]
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

// =============================================================================
// Table-driven checks
// =============================================================================

/// Check one value against a field's constraints, returning the first failure.
fn check_field(field: &FieldSpec, value: &str) -> Option<String> {
    let trimmed = value.trim();

    for constraint in field.constraints {
        let failure = match *constraint {
            Constraint::Required => {
                trimmed.is_empty().then(|| "This field is required.".to_string())
            }
            // Optional fields skip format checks when blank.
            _ if trimmed.is_empty() => None,
            Constraint::Email => Email::parse(trimmed)
                .err()
                .map(|_| "Invalid email address.".to_string()),
            Constraint::NumberRange { min, max } => match trimmed.parse::<Decimal>() {
                Ok(n) if n >= min && n <= max => None,
                Ok(_) => Some(format!("Number must be between {min} and {max}.")),
                Err(_) => Some("Not a valid number.".to_string()),
            },
            Constraint::MapReference => check_map_reference(trimmed),
            Constraint::OneOf(choices) => (!choices().contains(&trimmed))
                .then(|| "Not a valid choice.".to_string()),
            Constraint::MaxLength(max) => (value.chars().count() > max)
                .then(|| format!("Field cannot be longer than {max} characters.")),
        };

        if failure.is_some() {
            return failure;
        }
    }

    None
}

/// Links must be well-formed URLs; anything else is taken as a street address.
fn check_map_reference(value: &str) -> Option<String> {
    let looks_like_link = value.starts_with("http://") || value.starts_with("https://");
    if !looks_like_link {
        return None;
    }
    match url::Url::parse(value) {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => None,
        _ => Some("Invalid URL.".to_string()),
    }
}

/// Run a whole table. `value_of` returns the submitted value for a field name.
fn check_table<'v>(table: &[FieldSpec], value_of: impl Fn(&str) -> &'v str) -> FormErrors {
    let mut errors = FormErrors::new();
    for field in table {
        if let Some(message) = check_field(field, value_of(field.name)) {
            errors.add(field.name, message);
        }
    }
    errors
}

// =============================================================================
// Location search
// =============================================================================

/// Home page location filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationSearchForm {
    #[serde(default)]
    pub location: String,
}

impl LocationSearchForm {
    /// # Errors
    ///
    /// Returns `FormErrors` if the location is not one of the filter choices.
    pub fn validate(&self) -> Result<LocationFilter, FormErrors> {
        check_table(fields::LOCATION_SEARCH, |_| self.location.as_str()).into_result()?;
        self.location
            .parse()
            .map_err(|e: UnknownChoice| FormErrors::single("location", e.to_string()))
    }
}

// =============================================================================
// Add café
// =============================================================================

/// Raw add-café submission (text parts of the multipart body).
///
/// Checkboxes are `true` when present in the submission.
#[derive(Debug, Clone, Default)]
pub struct AddCafeForm {
    pub name: String,
    pub map_url: String,
    /// Original filename of the uploaded image; empty if none was sent.
    pub image_filename: String,
    pub location: String,
    pub has_sockets: bool,
    pub has_toilet: bool,
    pub has_wifi: bool,
    pub can_take_calls: bool,
    pub seats: String,
    pub coffee_price: String,
    pub opening_time: String,
    pub description: String,
}

/// Validated add-café input, minus the hosted image URL and owner.
#[derive(Debug, Clone)]
pub struct NewCafeInput {
    pub name: String,
    pub map_url: String,
    pub location: Location,
    pub has_sockets: bool,
    pub has_toilet: bool,
    pub has_wifi: bool,
    pub can_take_calls: bool,
    pub seats: SeatRange,
    pub coffee_price: CoffeePrice,
    pub opening_time: Option<String>,
    pub description: String,
}

impl AddCafeForm {
    fn value_of(&self, field: &str) -> &str {
        match field {
            "name" => &self.name,
            "map_url" => &self.map_url,
            "img_url" => &self.image_filename,
            "location" => &self.location,
            "seats" => &self.seats,
            "coffee_price" => &self.coffee_price,
            "opening_time" => &self.opening_time,
            "description" => &self.description,
            _ => "",
        }
    }

    /// # Errors
    ///
    /// Returns `FormErrors` with a message for every failing field.
    pub fn validate(&self) -> Result<NewCafeInput, FormErrors> {
        check_table(fields::ADD_CAFE, |f| self.value_of(f)).into_result()?;

        let mut errors = FormErrors::new();
        let location = self
            .location
            .parse::<Location>()
            .map_err(|e| errors.add("location", e.to_string()))
            .ok();
        let seats = self
            .seats
            .parse::<SeatRange>()
            .map_err(|e| errors.add("seats", e.to_string()))
            .ok();
        let coffee_price = CoffeePrice::parse(&self.coffee_price)
            .map_err(|e| errors.add("coffee_price", e.to_string()))
            .ok();

        match (location, seats, coffee_price) {
            (Some(location), Some(seats), Some(coffee_price)) => {
                let opening_time = self.opening_time.trim();
                Ok(NewCafeInput {
                    name: self.name.trim().to_string(),
                    map_url: self.map_url.trim().to_string(),
                    location,
                    has_sockets: self.has_sockets,
                    has_toilet: self.has_toilet,
                    has_wifi: self.has_wifi,
                    can_take_calls: self.can_take_calls,
                    seats,
                    coffee_price,
                    opening_time: (!opening_time.is_empty()).then(|| opening_time.to_string()),
                    description: self.description.trim().to_string(),
                })
            }
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Register / login
// =============================================================================

/// Raw registration submission.
#[derive(Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Validated registration.
pub struct Registration {
    pub name: String,
    pub email: Email,
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns `FormErrors` with a message for every failing field.
    pub fn validate(&self) -> Result<Registration, FormErrors> {
        check_table(fields::REGISTER, |f| match f {
            "name" => self.name.as_str(),
            "email" => self.email.as_str(),
            "password" => self.password.as_str(),
            _ => "",
        })
        .into_result()?;

        let email = Email::parse(&self.email)
            .map_err(|_| FormErrors::single("email", "Invalid email address."))?;

        Ok(Registration {
            name: self.name.trim().to_string(),
            email,
            password: self.password.clone(),
        })
    }
}

/// Raw login submission.
#[derive(Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Validated login credentials.
pub struct Credentials {
    pub email: Email,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns `FormErrors` with a message for every failing field.
    pub fn validate(&self) -> Result<Credentials, FormErrors> {
        check_table(fields::LOGIN, |f| match f {
            "email" => self.email.as_str(),
            "password" => self.password.as_str(),
            _ => "",
        })
        .into_result()?;

        let email = Email::parse(&self.email)
            .map_err(|_| FormErrors::single("email", "Invalid email address."))?;

        Ok(Credentials {
            email,
            password: self.password.clone(),
        })
    }
}

// =============================================================================
// Comments / replies
// =============================================================================

/// A new comment on a café.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    /// # Errors
    ///
    /// Returns `FormErrors` if the text is blank or too long.
    pub fn validate(&self) -> Result<String, FormErrors> {
        check_table(fields::COMMENT, |_| self.text.as_str()).into_result()?;
        Ok(self.text.trim().to_string())
    }
}

/// A reply to a comment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyForm {
    #[serde(default)]
    pub reply_text: String,
}

impl ReplyForm {
    /// # Errors
    ///
    /// Returns `FormErrors` if the text is blank or too long.
    pub fn validate(&self) -> Result<String, FormErrors> {
        check_table(fields::REPLY, |_| self.reply_text.as_str()).into_result()?;
        Ok(self.reply_text.trim().to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_cafe() -> AddCafeForm {
        AddCafeForm {
            name: "Café X".to_string(),
            map_url: "12 Nathan Road, Kowloon".to_string(),
            image_filename: "cafe.jpg".to_string(),
            location: "Kowloon".to_string(),
            has_wifi: true,
            seats: "10-20".to_string(),
            coffee_price: "20".to_string(),
            ..AddCafeForm::default()
        }
    }

    #[test]
    fn test_location_search() {
        let form = LocationSearchForm {
            location: "All".to_string(),
        };
        assert_eq!(form.validate().unwrap(), LocationFilter::All);

        let form = LocationSearchForm {
            location: "Kowloon".to_string(),
        };
        assert_eq!(
            form.validate().unwrap(),
            LocationFilter::Only(Location::Kowloon)
        );

        let form = LocationSearchForm {
            location: "Macau".to_string(),
        };
        assert_eq!(
            form.validate().unwrap_err().get("location"),
            Some("Not a valid choice.")
        );
    }

    #[test]
    fn test_add_cafe_valid() {
        let input = valid_cafe().validate().unwrap();
        assert_eq!(input.name, "Café X");
        assert_eq!(input.location, Location::Kowloon);
        assert_eq!(input.seats, SeatRange::TenToTwenty);
        assert!(input.has_wifi);
        assert!(!input.has_sockets);
        assert_eq!(input.opening_time, None);
    }

    #[test]
    fn test_add_cafe_price_out_of_range() {
        let form = AddCafeForm {
            coffee_price: "501".to_string(),
            ..valid_cafe()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.get("coffee_price"),
            Some("Number must be between 0 and 500.")
        );
        assert!(errors.get("name").is_none());
    }

    #[test]
    fn test_add_cafe_collects_every_failing_field() {
        let form = AddCafeForm {
            name: "  ".to_string(),
            image_filename: String::new(),
            coffee_price: "cheap".to_string(),
            ..valid_cafe()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("This field is required."));
        assert_eq!(errors.get("img_url"), Some("This field is required."));
        assert_eq!(errors.get("coffee_price"), Some("Not a valid number."));
    }

    #[test]
    fn test_map_reference_rule() {
        assert_eq!(check_map_reference("Central, Hong Kong"), None);
        assert_eq!(check_map_reference("https://goo.gl/maps/abc"), None);
        assert_eq!(
            check_map_reference("https://"),
            Some("Invalid URL.".to_string())
        );
        assert_eq!(
            check_map_reference("http://exa mple.com"),
            Some("Invalid URL.".to_string())
        );
    }

    #[test]
    fn test_register_rejects_bad_email() {
        let form = RegisterForm {
            name: "A".to_string(),
            email: "not-an-email".to_string(),
            password: "pw".to_string(),
        };
        assert_eq!(
            form.validate().unwrap_err().get("email"),
            Some("Invalid email address.")
        );
    }

    #[test]
    fn test_register_requires_all_fields() {
        let errors = RegisterForm::default().validate().unwrap_err();
        assert!(errors.get("name").is_some());
        assert!(errors.get("email").is_some());
        assert!(errors.get("password").is_some());
    }

    #[test]
    fn test_login_valid() {
        let form = LoginForm {
            email: " a@x.com ".to_string(),
            password: "pw".to_string(),
        };
        let creds = form.validate().unwrap();
        assert_eq!(creds.email.as_str(), "a@x.com");
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let registration = RegisterForm {
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            password: "hunter2".to_string(),
        }
        .validate()
        .unwrap();
        let debug = format!("{registration:?}");
        assert!(debug.contains("a@x.com"));
        assert!(!debug.contains("hunter2"));

        let creds = LoginForm {
            email: "a@x.com".to_string(),
            password: "hunter2".to_string(),
        }
        .validate()
        .unwrap();
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[test]
    fn test_comment_and_reply_required() {
        assert!(CommentForm::default().validate().is_err());
        assert!(ReplyForm::default().validate().is_err());
        let reply = ReplyForm {
            reply_text: " thanks ".to_string(),
        };
        assert_eq!(reply.validate().unwrap(), "thanks");
    }

    #[test]
    fn test_comment_max_length() {
        let form = CommentForm {
            text: "x".repeat(fields::TEXT_MAX + 1),
        };
        assert!(
            form.validate()
                .unwrap_err()
                .get("text")
                .unwrap()
                .contains("longer than")
        );
    }
}
