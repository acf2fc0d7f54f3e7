pub mod customer;
pub mod genre;
pub mod movie;
pub mod rental;
pub mod user;

pub use customer::{Customer, CustomerInput};
pub use genre::{Genre, GenreInput};
pub use movie::{GenreSnapshot, Movie, MovieInput};
pub use rental::{CustomerSnapshot, MovieSnapshot, Rental, RentalInput};
pub use user::{LoginInput, User, UserInput};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use validator::ValidationError;

/// Reference fields must be well-formed ids before they reach a lookup.
pub fn validate_id(value: &str) -> Result<(), ValidationError> {
    match Uuid::parse_str(value) {
        Ok(_) => Ok(()),
        Err(_) => {
            let mut err = ValidationError::new("id");
            err.message = Some(format!("\"{}\" is not a valid id", value).into());
            Err(err)
        }
    }
}

/// Cents; matches the `NUMERIC(10, 2)` rate column.
pub const RATE_SCALE: u32 = 2;

/// Rates and fees are bounded to 0..=255 like stock counts, in whole cents.
pub fn validate_rate(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::from(255) {
        let mut err = ValidationError::new("range");
        err.message = Some("\"dailyRentalRate\" must be between 0 and 255".into());
        return Err(err);
    }
    if value.normalize().scale() > RATE_SCALE {
        let mut err = ValidationError::new("precision");
        err.message = Some("\"dailyRentalRate\" must have at most 2 decimal places".into());
        return Err(err);
    }
    Ok(())
}

/// Deserialize a string with surrounding whitespace removed, so length rules
/// see the stored value.
pub(crate) fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

/// Parse an id that already passed `validate_id`; anything else maps to the nil id.
pub(crate) fn parse_id(value: &str) -> Uuid {
    Uuid::parse_str(value).unwrap_or_default()
}
