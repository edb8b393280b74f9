//! Self-validating value objects for the catalog.
//!
//! Construction is the only way to obtain an instance; every constructor
//! enforces the format or range of the wrapped scalar.

use uuid::Uuid;

use crate::error::ValidationError;

const CATEGORY_NAME_MAX: usize = 20;
const PRODUCT_NAME_MAX: usize = 100;
const PRICE_MIN: u32 = 1;
const PRICE_MAX: u32 = 1_000_000;

/// Parses a lowercase-hex UUID in the canonical 8-4-4-4-12 grouping.
///
/// `Uuid::parse_str` also accepts uppercase, braced, simple and URN forms,
/// so the shape is checked first.
fn parse_canonical_uuid(field: &'static str, value: &str) -> Result<Uuid, ValidationError> {
    let invalid = || ValidationError::InvalidId {
        field,
        value: value.to_string(),
    };

    if value.len() != 36 {
        return Err(invalid());
    }

    for (index, byte) in value.bytes().enumerate() {
        let ok = match index {
            8 | 13 | 18 | 23 => byte == b'-',
            _ => byte.is_ascii_digit() || (b'a'..=b'f').contains(&byte),
        };
        if !ok {
            return Err(invalid());
        }
    }

    Uuid::parse_str(value).map_err(|_| invalid())
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let length = value.chars().count();
    if length == 0 || length > max {
        return Err(ValidationError::InvalidLength {
            field,
            length,
            min: 1,
            max,
        });
    }
    Ok(())
}

/// Unique identifier for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryId(Uuid);

impl CategoryId {
    /// Creates a new random category ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an externally supplied category ID.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        parse_canonical_uuid("category id", value).map(Self)
    }

    /// Wraps a UUID read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the canonical string form.
    pub fn value(&self) -> String {
        self.0.hyphenated().to_string()
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl std::str::FromStr for CategoryId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Unique identifier for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Creates a new random product ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an externally supplied product ID.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        parse_canonical_uuid("product id", value).map(Self)
    }

    /// Wraps a UUID read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the canonical string form.
    pub fn value(&self) -> String {
        self.0.hyphenated().to_string()
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl std::str::FromStr for ProductId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Category display name, 1 to 20 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        check_length("category name", &value, CATEGORY_NAME_MAX)?;
        Ok(Self(value))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Product display name, 1 to 100 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductName(String);

impl ProductName {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        check_length("product name", &value, PRODUCT_NAME_MAX)?;
        Ok(Self(value))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Product price in minor currency units (no decimals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductPrice(u32);

impl ProductPrice {
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if !(PRICE_MIN..=PRICE_MAX).contains(&value) {
            return Err(ValidationError::OutOfRange {
                field: "product price",
                value: i64::from(value),
                min: i64::from(PRICE_MIN),
                max: i64::from(PRICE_MAX),
            });
        }
        Ok(Self(value))
    }

    /// Validates a signed price as stored by SQL backends.
    pub fn from_stored(value: i32) -> Result<Self, ValidationError> {
        let unsigned = u32::try_from(value).map_err(|_| ValidationError::OutOfRange {
            field: "product price",
            value: i64::from(value),
            min: i64::from(PRICE_MIN),
            max: i64::from(PRICE_MAX),
        })?;
        Self::new(unsigned)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ProductPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_ID: &str = "3f2a1d0c-8b7e-4c4e-9a57-9f1c2b9e5d4a";

    #[test]
    fn id_round_trips_canonical_input() {
        let id = CategoryId::parse(VALID_ID).unwrap();
        assert_eq!(id.value(), VALID_ID);

        let id = ProductId::parse(VALID_ID).unwrap();
        assert_eq!(id.value(), VALID_ID);
    }

    #[test]
    fn generated_ids_are_canonical_and_unique() {
        let a = CategoryId::generate();
        let b = CategoryId::generate();
        assert_ne!(a, b);
        assert_eq!(CategoryId::parse(&a.value()).unwrap(), a);
    }

    #[test]
    fn id_rejects_non_canonical_forms() {
        let rejected = [
            "",
            "not-a-uuid",
            "3F2A1D0C-8B7E-4C4E-9A57-9F1C2B9E5D4A",
            "3f2a1d0c8b7e4c4e9a579f1c2b9e5d4a",
            "{3f2a1d0c-8b7e-4c4e-9a57-9f1c2b9e5d4a}",
            "3f2a1d0c-8b7e-4c4e-9a57-9f1c2b9e5d4",
            "3f2a1d0c-8b7e-4c4e-9a57-9f1c2b9e5d4a0",
            "3f2a1d0c_8b7e-4c4e-9a57-9f1c2b9e5d4a",
            "3f2a1d0c-8b7e-4c4e-9a57-9f1c2b9e5d4g",
        ];
        for value in rejected {
            assert!(
                matches!(
                    ProductId::parse(value),
                    Err(ValidationError::InvalidId { .. })
                ),
                "accepted {value:?}"
            );
        }
    }

    #[test]
    fn category_name_bounds_count_code_points() {
        assert!(CategoryName::new("a").is_ok());
        assert!(CategoryName::new("a".repeat(20)).is_ok());
        assert!(CategoryName::new("文".repeat(20)).is_ok());
        assert!(CategoryName::new("").is_err());
        assert!(CategoryName::new("a".repeat(21)).is_err());
        assert!(CategoryName::new("文".repeat(21)).is_err());
    }

    #[test]
    fn product_name_bounds() {
        assert_eq!(ProductName::new("Pen").unwrap().value(), "Pen");
        assert!(ProductName::new("p".repeat(100)).is_ok());
        assert!(ProductName::new("p".repeat(101)).is_err());
        assert!(ProductName::new("").is_err());
    }

    #[test]
    fn price_bounds_are_inclusive() {
        assert_eq!(ProductPrice::new(1).unwrap().value(), 1);
        assert_eq!(ProductPrice::new(1_000_000).unwrap().value(), 1_000_000);
        assert!(ProductPrice::new(0).is_err());
        assert!(ProductPrice::new(1_000_001).is_err());
    }

    #[test]
    fn stored_price_rejects_negative_values() {
        assert_eq!(ProductPrice::from_stored(250).unwrap().value(), 250);
        assert!(matches!(
            ProductPrice::from_stored(-5),
            Err(ValidationError::OutOfRange { value: -5, .. })
        ));
    }

    #[test]
    fn validation_error_describes_field() {
        let err = CategoryName::new("").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid category name: length 0 is outside 1..=20 characters"
        );
    }
}
