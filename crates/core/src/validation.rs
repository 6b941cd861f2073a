//! Form validation.
//!
//! Every form the storefront accepts is checked here before any database
//! call. Failures are collected per field so the client can show them next to
//! the inputs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Email, Price};

/// Minimum password length for new accounts.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Upper bound on free-text fields stored on products and profiles.
pub const MAX_TEXT_LENGTH: usize = 2048;

/// Field-keyed validation messages.
///
/// Only the first message recorded for a field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single-field error.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for message in self.0.values() {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

fn trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

fn check_length(errors: &mut ValidationErrors, field: &str, label: &str, value: &str) {
    if value.chars().count() > MAX_TEXT_LENGTH {
        errors.add(
            field,
            format!("{label} must be at most {MAX_TEXT_LENGTH} characters"),
        );
    }
}

/// Sign-up form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// A registration that passed validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    pub password: String,
}

impl RegistrationInput {
    /// # Errors
    ///
    /// Returns field errors for a blank name, malformed email, short password
    /// or mismatched confirmation.
    pub fn validate(self) -> Result<Registration, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = trimmed(&self.name);
        if name.is_none() {
            errors.add("name", "Name is required");
        }
        check_length(&mut errors, "name", "Name", &self.name);

        let email = Email::parse(&self.email)
            .map_err(|e| errors.add("email", capitalize(&e.to_string())))
            .ok();

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }
        if self.password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match");
        }

        match (name, email) {
            (Some(name), Some(email)) if errors.is_empty() => Ok(Registration {
                name,
                email,
                password: self.password,
            }),
            _ => Err(errors),
        }
    }
}

/// Sign-in form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginInput {
    /// Only checks presence; wrong credentials are reported by the login itself.
    ///
    /// # Errors
    ///
    /// Returns field errors for a blank email or password.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        }
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected price as string or number, got {other}"
        ))),
    }
}

/// Admin product form, as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

const fn default_in_stock() -> bool {
    true
}

/// A product ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub image_url: Option<String>,
    pub in_stock: bool,
}

impl ProductInput {
    /// # Errors
    ///
    /// Returns field errors for blank required fields or a price that is not
    /// a positive number.
    pub fn validate(self) -> Result<ProductDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = trimmed(&self.name);
        if name.is_none() {
            errors.add("name", "Name is required");
        }
        let description = trimmed(&self.description);
        if description.is_none() {
            errors.add("description", "Description is required");
        }
        let category = trimmed(&self.category);
        if category.is_none() {
            errors.add("category", "Category is required");
        }

        let price = if self.price.trim().is_empty() {
            errors.add("price", "Price is required");
            None
        } else {
            Price::parse_positive(&self.price)
                .map_err(|e| match e {
                    crate::types::PriceError::TooLarge { .. } => {
                        errors.add("price", capitalize(&e.to_string()));
                    }
                    _ => errors.add("price", "Price must be a positive number"),
                })
                .ok()
        };

        let image_url = self.image_url.as_deref().and_then(trimmed);
        for (field, label, value) in [
            ("name", "Name", self.name.as_str()),
            ("description", "Description", self.description.as_str()),
            ("category", "Category", self.category.as_str()),
            ("image_url", "Image URL", image_url.as_deref().unwrap_or("")),
        ] {
            check_length(&mut errors, field, label, value);
        }

        match (name, description, category, price) {
            (Some(name), Some(description), Some(category), Some(price)) if errors.is_empty() => {
                Ok(ProductDraft {
                    name,
                    description,
                    price,
                    category,
                    image_url,
                    in_stock: self.in_stock,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Profile edit form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Profile fields to store. Blank inputs clear the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    /// # Errors
    ///
    /// Returns field errors for overlong values.
    pub fn validate(self) -> Result<ProfileChanges, ValidationErrors> {
        let full_name = self.full_name.as_deref().and_then(trimmed);
        let avatar_url = self.avatar_url.as_deref().and_then(trimmed);

        let mut errors = ValidationErrors::new();
        check_length(
            &mut errors,
            "full_name",
            "Full name",
            full_name.as_deref().unwrap_or(""),
        );
        check_length(
            &mut errors,
            "avatar_url",
            "Avatar URL",
            avatar_url.as_deref().unwrap_or(""),
        );
        errors.into_result()?;

        Ok(ProfileChanges {
            full_name,
            avatar_url,
        })
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;

    fn registration() -> RegistrationInput {
        RegistrationInput {
            name: "Ada Shopper".to_string(),
            email: "Ada@Example.com".to_string(),
            password: "hunter22".to_string(),
            confirm_password: "hunter22".to_string(),
        }
    }

    fn product_input() -> ProductInput {
        ProductInput {
            name: "Leather Wallet".to_string(),
            description: "Slim bifold wallet".to_string(),
            price: "49.99".to_string(),
            category: "Accessories".to_string(),
            image_url: Some("  ".to_string()),
            in_stock: true,
        }
    }

    #[test]
    fn test_registration_valid() {
        let reg = registration().validate().unwrap();
        assert_eq!(reg.name, "Ada Shopper");
        assert_eq!(reg.email.as_str(), "ada@example.com");
    }

    #[test]
    fn test_registration_collects_errors() {
        let input = RegistrationInput {
            name: "  ".to_string(),
            email: "nope".to_string(),
            password: "abc".to_string(),
            confirm_password: "abd".to_string(),
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert!(errors.get("email").is_some());
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(errors.get("confirm_password"), Some("Passwords do not match"));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_login_requires_fields() {
        let errors = LoginInput::default().validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
    }

    #[test]
    fn test_product_valid_blank_image_becomes_none() {
        let draft = product_input().validate().unwrap();
        assert_eq!(draft.price.amount, Decimal::from_str("49.99").unwrap());
        assert_eq!(draft.image_url, None);
    }

    #[test]
    fn test_product_price_rules() {
        for (price, message) in [
            ("", "Price is required"),
            ("free", "Price must be a positive number"),
            ("0", "Price must be a positive number"),
            ("-1", "Price must be a positive number"),
            ("0.004", "Price must be a positive number"),
        ] {
            let input = ProductInput {
                price: price.to_string(),
                ..product_input()
            };
            let errors = input.validate().unwrap_err();
            assert_eq!(errors.get("price"), Some(message), "price {price:?}");
        }
    }

    #[test]
    fn test_product_required_fields() {
        let input = ProductInput {
            name: String::new(),
            description: " ".to_string(),
            category: String::new(),
            ..product_input()
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("description"), Some("Description is required"));
        assert_eq!(errors.get("category"), Some("Category is required"));
    }

    #[test]
    fn test_product_input_accepts_numeric_price() {
        let input: ProductInput = serde_json::from_value(serde_json::json!({
            "name": "Desk Lamp",
            "description": "LED lamp",
            "price": 39.5,
            "category": "Home",
        }))
        .unwrap();
        assert!(input.in_stock);
        let draft = input.validate().unwrap();
        assert_eq!(draft.price.to_string(), "$39.50");
    }

    #[test]
    fn test_profile_update_blank_clears() {
        let changes = ProfileUpdate {
            full_name: Some(" Ada ".to_string()),
            avatar_url: Some(String::new()),
        }
        .validate()
        .unwrap();
        assert_eq!(changes.full_name.as_deref(), Some("Ada"));
        assert_eq!(changes.avatar_url, None);
    }

    #[test]
    fn test_errors_serialize_as_object() {
        let errors = ValidationErrors::single("zip", "ZIP code is required");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "zip": "ZIP code is required" }));
        assert_eq!(errors.to_string(), "ZIP code is required");
    }
}
