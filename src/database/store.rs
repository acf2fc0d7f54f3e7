use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::database::DatabaseError;
use crate::models::{Customer, Genre, Movie, Rental, User};

/// Persistence seam shared by the Postgres and in-memory backends.
///
/// Plain CRUD methods return `Ok(None)` when an id does not resolve.
/// `checkout` and `check_in` are the two multi-record units of work: each
/// either applies both of its writes or neither.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    // Genres
    async fn list_genres(&self) -> Result<Vec<Genre>, DatabaseError>;
    async fn find_genre(&self, id: Uuid) -> Result<Option<Genre>, DatabaseError>;
    async fn insert_genre(&self, genre: &Genre) -> Result<(), DatabaseError>;
    async fn update_genre(&self, genre: &Genre) -> Result<Option<Genre>, DatabaseError>;
    async fn delete_genre(&self, id: Uuid) -> Result<Option<Genre>, DatabaseError>;

    // Movies
    async fn list_movies(&self) -> Result<Vec<Movie>, DatabaseError>;
    async fn find_movie(&self, id: Uuid) -> Result<Option<Movie>, DatabaseError>;
    async fn insert_movie(&self, movie: &Movie) -> Result<(), DatabaseError>;
    async fn update_movie(&self, movie: &Movie) -> Result<Option<Movie>, DatabaseError>;
    async fn delete_movie(&self, id: Uuid) -> Result<Option<Movie>, DatabaseError>;

    // Customers
    async fn list_customers(&self) -> Result<Vec<Customer>, DatabaseError>;
    async fn find_customer(&self, id: Uuid) -> Result<Option<Customer>, DatabaseError>;
    async fn insert_customer(&self, customer: &Customer) -> Result<(), DatabaseError>;
    async fn update_customer(&self, customer: &Customer) -> Result<Option<Customer>, DatabaseError>;
    async fn delete_customer(&self, id: Uuid) -> Result<Option<Customer>, DatabaseError>;

    // Users
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    /// Fails with `Duplicate` when the email is already registered.
    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError>;

    // Rentals
    /// Newest `date_out` first
    async fn list_rentals(&self) -> Result<Vec<Rental>, DatabaseError>;
    async fn find_rental(&self, id: Uuid) -> Result<Option<Rental>, DatabaseError>;
    /// The open rental for the pair if one exists, otherwise the most
    /// recently returned one.
    async fn find_open_rental(
        &self,
        customer_id: Uuid,
        movie_id: Uuid,
    ) -> Result<Option<Rental>, DatabaseError>;

    /// Decrement the movie's stock and persist the rental as one unit.
    ///
    /// `OutOfStock` when the stock is already zero, `NotFound` when the
    /// movie no longer exists. Nothing is written in either case.
    async fn checkout(&self, rental: &Rental) -> Result<(), DatabaseError>;

    /// Close an open rental and increment the movie's stock as one unit.
    ///
    /// `AlreadyProcessed` when the rental was returned before (including by
    /// a concurrent request), `NotFound` when the rental does not exist.
    /// Stock never exceeds `Movie::MAX_STOCK`: a movie already at the
    /// maximum (or deleted since checkout) is left untouched and the return
    /// still succeeds.
    async fn check_in(
        &self,
        rental_id: Uuid,
        returned_at: DateTime<Utc>,
        fee: Decimal,
    ) -> Result<Rental, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
