use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::{DatabaseError, Store};
use crate::models::Rental;

#[derive(Debug, Error)]
pub enum RentalError {
    #[error("Customer not found")]
    CustomerNotFound,

    #[error("Movie not found")]
    MovieNotFound,

    #[error("Movie is out of stock")]
    OutOfStock,

    #[error("No rental found for this customer and movie")]
    RentalNotFound,

    #[error("Return already processed")]
    AlreadyProcessed,

    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for RentalError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::OutOfStock => RentalError::OutOfStock,
            DatabaseError::AlreadyProcessed => RentalError::AlreadyProcessed,
            other => RentalError::Database(other),
        }
    }
}

/// Rental checkout and return workflow.
///
/// Lookups and business rules run here; the paired writes of each
/// operation are delegated to the store's atomic units of work.
#[derive(Clone)]
pub struct RentalService {
    store: Arc<dyn Store>,
}

impl RentalService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Rent `movie_id` to `customer_id`, taking one copy out of stock.
    pub async fn create(&self, customer_id: Uuid, movie_id: Uuid) -> Result<Rental, RentalError> {
        let customer = self
            .store
            .find_customer(customer_id)
            .await?
            .ok_or(RentalError::CustomerNotFound)?;

        let movie = self
            .store
            .find_movie(movie_id)
            .await?
            .ok_or(RentalError::MovieNotFound)?;

        if !movie.in_stock() {
            debug!("Movie {} is out of stock", movie.id);
            return Err(RentalError::OutOfStock);
        }

        let rental = Rental::checkout(&customer, &movie, Utc::now());
        match self.store.checkout(&rental).await {
            Ok(()) => {}
            // Deleted between the lookup and the write
            Err(DatabaseError::NotFound(_)) => return Err(RentalError::MovieNotFound),
            Err(e) => return Err(e.into()),
        }

        info!(
            rental = %rental.id,
            customer = %customer.id,
            movie = %movie.id,
            "Rental created"
        );
        Ok(rental)
    }

    /// Close the open rental for the pair, charging whole days held.
    pub async fn process_return(&self, customer_id: Uuid, movie_id: Uuid) -> Result<Rental, RentalError> {
        let rental = self
            .store
            .find_open_rental(customer_id, movie_id)
            .await?
            .ok_or(RentalError::RentalNotFound)?;

        if rental.is_returned() {
            debug!("Rental {} was already returned", rental.id);
            return Err(RentalError::AlreadyProcessed);
        }

        let returned_at = Utc::now();
        let fee = rental.fee_at(returned_at);

        let rental = match self.store.check_in(rental.id, returned_at, fee).await {
            Ok(rental) => rental,
            Err(DatabaseError::NotFound(_)) => return Err(RentalError::RentalNotFound),
            Err(e) => return Err(e.into()),
        };

        info!(
            rental = %rental.id,
            movie = %rental.movie.id,
            fee = %fee,
            "Rental returned"
        );
        Ok(rental)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::{Customer, GenreSnapshot, Movie};
    use chrono::Duration;
    use rust_decimal::Decimal;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: RentalService,
        customer: Customer,
        movie: Movie,
    }

    async fn fixture(stock: i32) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let customer = Customer {
            id: Uuid::new_v4(),
            name: "Jane Doe".to_string(),
            phone: "555-0100".to_string(),
            is_gold: false,
        };
        let movie = Movie {
            id: Uuid::new_v4(),
            title: "Blade Runner".to_string(),
            genre: GenreSnapshot { id: Uuid::new_v4(), name: "Sci-Fi".to_string() },
            number_in_stock: stock,
            daily_rental_rate: Decimal::from(2),
        };
        store.insert_customer(&customer).await.unwrap();
        store.insert_movie(&movie).await.unwrap();

        Fixture {
            service: RentalService::new(store.clone()),
            store,
            customer,
            movie,
        }
    }

    async fn stock(f: &Fixture) -> i32 {
        f.store.find_movie(f.movie.id).await.unwrap().unwrap().number_in_stock
    }

    #[tokio::test]
    async fn rent_and_return_restores_stock() {
        let f = fixture(10).await;

        let rental = f.service.create(f.customer.id, f.movie.id).await.unwrap();
        assert!(rental.date_returned.is_none());
        assert_eq!(stock(&f).await, 9);

        let returned = f.service.process_return(f.customer.id, f.movie.id).await.unwrap();
        assert_eq!(returned.id, rental.id);
        assert_eq!(returned.rental_fee, Some(Decimal::ZERO));
        assert_eq!(stock(&f).await, 10);
    }

    #[tokio::test]
    async fn rental_snapshots_customer_and_movie() {
        let f = fixture(1).await;
        let rental = f.service.create(f.customer.id, f.movie.id).await.unwrap();

        let mut renamed = f.customer.clone();
        renamed.name = "Janet Doe".to_string();
        f.store.update_customer(&renamed).await.unwrap();

        let stored = f.store.find_rental(rental.id).await.unwrap().unwrap();
        assert_eq!(stored.customer.name, "Jane Doe");
        assert_eq!(stored.movie.title, "Blade Runner");
        assert_eq!(stored.movie.daily_rental_rate, Decimal::from(2));
    }

    #[tokio::test]
    async fn unknown_customer_or_movie_is_not_found() {
        let f = fixture(1).await;
        let err = f.service.create(Uuid::new_v4(), f.movie.id).await.unwrap_err();
        assert!(matches!(err, RentalError::CustomerNotFound));

        let err = f.service.create(f.customer.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, RentalError::MovieNotFound));
        assert_eq!(stock(&f).await, 1);
    }

    #[tokio::test]
    async fn out_of_stock_creates_no_rental() {
        let f = fixture(0).await;
        let err = f.service.create(f.customer.id, f.movie.id).await.unwrap_err();
        assert!(matches!(err, RentalError::OutOfStock));
        assert!(f.store.list_rentals().await.unwrap().is_empty());
        assert_eq!(stock(&f).await, 0);
    }

    #[tokio::test]
    async fn week_long_rental_is_charged_per_day() {
        let f = fixture(10).await;
        let rental = Rental::checkout(&f.customer, &f.movie, Utc::now() - Duration::days(7));
        f.store.checkout(&rental).await.unwrap();

        let returned = f.service.process_return(f.customer.id, f.movie.id).await.unwrap();
        assert_eq!(returned.rental_fee, Some(Decimal::from(14)));
        assert!(returned.date_returned.is_some());
    }

    #[tokio::test]
    async fn second_return_is_rejected() {
        let f = fixture(5).await;
        f.service.create(f.customer.id, f.movie.id).await.unwrap();

        f.service.process_return(f.customer.id, f.movie.id).await.unwrap();
        let err = f.service.process_return(f.customer.id, f.movie.id).await.unwrap_err();

        assert!(matches!(err, RentalError::AlreadyProcessed));
        assert_eq!(stock(&f).await, 5);
    }

    #[tokio::test]
    async fn return_without_rental_is_not_found() {
        let f = fixture(5).await;
        let err = f.service.process_return(f.customer.id, f.movie.id).await.unwrap_err();
        assert!(matches!(err, RentalError::RentalNotFound));
    }
}
