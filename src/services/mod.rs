pub mod rental_service;

pub use rental_service::{RentalError, RentalService};
