use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

/// Body of `POST /api/genres` and `PUT /api/genres/:id`
#[derive(Debug, Deserialize, Validate)]
pub struct GenreInput {
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(length(min = 3, max = 50, message = "\"name\" length must be between 3 and 50 characters"))]
    pub name: String,
}

impl GenreInput {
    pub fn into_genre(self, id: Uuid) -> Genre {
        Genre { id, name: self.name }
    }
}
