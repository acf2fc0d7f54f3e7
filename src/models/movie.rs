use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Genre;

/// Genre fields copied into the movie when it is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreSnapshot {
    pub id: Uuid,
    pub name: String,
}

impl From<&Genre> for GenreSnapshot {
    fn from(genre: &Genre) -> Self {
        Self {
            id: genre.id,
            name: genre.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub genre: GenreSnapshot,
    pub number_in_stock: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub daily_rental_rate: Decimal,
}

impl Movie {
    /// Upper bound on copies held, shared by input validation and the stores
    pub const MAX_STOCK: i32 = 255;

    pub fn in_stock(&self) -> bool {
        self.number_in_stock > 0
    }
}

/// Body of `POST /api/movies` and `PUT /api/movies/:id`
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MovieInput {
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(length(min = 5, max = 255, message = "\"title\" length must be between 5 and 255 characters"))]
    pub title: String,

    #[validate(custom(function = "super::validate_id"))]
    pub genre_id: String,

    #[validate(range(min = 0, max = 255, message = "\"numberInStock\" must be between 0 and 255"))]
    pub number_in_stock: i32,

    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "super::validate_rate"))]
    pub daily_rental_rate: Decimal,
}

impl MovieInput {
    pub fn genre_id(&self) -> Uuid {
        super::parse_id(&self.genre_id)
    }

    pub fn into_movie(self, id: Uuid, genre: &Genre) -> Movie {
        Movie {
            id,
            title: self.title,
            genre: GenreSnapshot::from(genre),
            number_in_stock: self.number_in_stock,
            daily_rental_rate: self.daily_rental_rate,
        }
    }
}
