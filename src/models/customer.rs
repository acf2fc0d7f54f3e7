use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub is_gold: bool,
}

/// Body of `POST /api/customers` and `PUT /api/customers/:id`
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[serde(deserialize_with = "super::trimmed")]
    #[validate(length(min = 5, max = 50, message = "\"name\" length must be between 5 and 50 characters"))]
    pub name: String,

    #[serde(deserialize_with = "super::trimmed")]
    #[validate(length(min = 5, max = 50, message = "\"phone\" length must be between 5 and 50 characters"))]
    pub phone: String,

    #[serde(default)]
    pub is_gold: bool,
}

impl CustomerInput {
    pub fn into_customer(self, id: Uuid) -> Customer {
        Customer {
            id,
            name: self.name,
            phone: self.phone,
            is_gold: self.is_gold,
        }
    }
}
