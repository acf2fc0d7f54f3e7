use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Customer, Movie};

/// Customer fields frozen at checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
}

/// Movie fields frozen at checkout; the fee is always computed from this rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSnapshot {
    pub id: Uuid,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub daily_rental_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    pub id: Uuid,
    pub customer: CustomerSnapshot,
    pub movie: MovieSnapshot,
    pub date_out: DateTime<Utc>,
    pub date_returned: Option<DateTime<Utc>>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub rental_fee: Option<Decimal>,
}

impl Rental {
    /// New open rental with value copies of the customer and movie.
    pub fn checkout(customer: &Customer, movie: &Movie, date_out: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer: CustomerSnapshot {
                id: customer.id,
                name: customer.name.clone(),
                phone: customer.phone.clone(),
            },
            movie: MovieSnapshot {
                id: movie.id,
                title: movie.title.clone(),
                daily_rental_rate: movie.daily_rental_rate,
            },
            date_out,
            date_returned: None,
            rental_fee: None,
        }
    }

    pub fn is_returned(&self) -> bool {
        self.date_returned.is_some()
    }

    /// Fee owed if the movie comes back at `returned_at`.
    pub fn fee_at(&self, returned_at: DateTime<Utc>) -> Decimal {
        rental_fee(self.date_out, returned_at, self.movie.daily_rental_rate)
    }
}

/// Whole days held (rounded down, never negative) times the daily rate.
/// A same-day return costs nothing.
pub fn rental_fee(date_out: DateTime<Utc>, date_returned: DateTime<Utc>, daily_rate: Decimal) -> Decimal {
    let days = (date_returned - date_out).num_days().max(0);
    Decimal::from(days) * daily_rate
}

/// Body of `POST /api/rentals` and `POST /api/returns`
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RentalInput {
    #[validate(custom(function = "super::validate_id"))]
    pub customer_id: String,

    #[validate(custom(function = "super::validate_id"))]
    pub movie_id: String,
}

impl RentalInput {
    pub fn customer_id(&self) -> Uuid {
        super::parse_id(&self.customer_id)
    }

    pub fn movie_id(&self) -> Uuid {
        super::parse_id(&self.movie_id)
    }
}
