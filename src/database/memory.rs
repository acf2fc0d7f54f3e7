use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::{DatabaseError, Store};
use crate::models::{Customer, Genre, Movie, Rental, User};

#[derive(Default)]
struct Collections {
    genres: HashMap<Uuid, Genre>,
    movies: HashMap<Uuid, Movie>,
    customers: HashMap<Uuid, Customer>,
    users: HashMap<Uuid, User>,
    rentals: HashMap<Uuid, Rental>,
}

/// In-process store for development and tests.
///
/// Every unit of work holds the write lock from its first read to its last
/// write, so concurrent checkouts of the same movie are serialized.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by<T: Clone, K: Ord>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by_key(|item| key(item));
    items
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_genres(&self) -> Result<Vec<Genre>, DatabaseError> {
        let db = self.inner.read().await;
        Ok(sorted_by(db.genres.values().cloned(), |g| g.name.clone()))
    }

    async fn find_genre(&self, id: Uuid) -> Result<Option<Genre>, DatabaseError> {
        Ok(self.inner.read().await.genres.get(&id).cloned())
    }

    async fn insert_genre(&self, genre: &Genre) -> Result<(), DatabaseError> {
        self.inner.write().await.genres.insert(genre.id, genre.clone());
        Ok(())
    }

    async fn update_genre(&self, genre: &Genre) -> Result<Option<Genre>, DatabaseError> {
        let mut db = self.inner.write().await;
        Ok(db.genres.get_mut(&genre.id).map(|existing| {
            *existing = genre.clone();
            existing.clone()
        }))
    }

    async fn delete_genre(&self, id: Uuid) -> Result<Option<Genre>, DatabaseError> {
        Ok(self.inner.write().await.genres.remove(&id))
    }

    async fn list_movies(&self) -> Result<Vec<Movie>, DatabaseError> {
        let db = self.inner.read().await;
        Ok(sorted_by(db.movies.values().cloned(), |m| m.title.clone()))
    }

    async fn find_movie(&self, id: Uuid) -> Result<Option<Movie>, DatabaseError> {
        Ok(self.inner.read().await.movies.get(&id).cloned())
    }

    async fn insert_movie(&self, movie: &Movie) -> Result<(), DatabaseError> {
        self.inner.write().await.movies.insert(movie.id, movie.clone());
        Ok(())
    }

    async fn update_movie(&self, movie: &Movie) -> Result<Option<Movie>, DatabaseError> {
        let mut db = self.inner.write().await;
        Ok(db.movies.get_mut(&movie.id).map(|existing| {
            *existing = movie.clone();
            existing.clone()
        }))
    }

    async fn delete_movie(&self, id: Uuid) -> Result<Option<Movie>, DatabaseError> {
        Ok(self.inner.write().await.movies.remove(&id))
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, DatabaseError> {
        let db = self.inner.read().await;
        Ok(sorted_by(db.customers.values().cloned(), |c| c.name.clone()))
    }

    async fn find_customer(&self, id: Uuid) -> Result<Option<Customer>, DatabaseError> {
        Ok(self.inner.read().await.customers.get(&id).cloned())
    }

    async fn insert_customer(&self, customer: &Customer) -> Result<(), DatabaseError> {
        self.inner.write().await.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn update_customer(&self, customer: &Customer) -> Result<Option<Customer>, DatabaseError> {
        let mut db = self.inner.write().await;
        Ok(db.customers.get_mut(&customer.id).map(|existing| {
            *existing = customer.clone();
            existing.clone()
        }))
    }

    async fn delete_customer(&self, id: Uuid) -> Result<Option<Customer>, DatabaseError> {
        Ok(self.inner.write().await.customers.remove(&id))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let email = User::normalize_email(email);
        let db = self.inner.read().await;
        Ok(db.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        let mut db = self.inner.write().await;
        if db.users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::Duplicate("User already registered.".to_string()));
        }
        db.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn list_rentals(&self) -> Result<Vec<Rental>, DatabaseError> {
        let db = self.inner.read().await;
        let mut rentals: Vec<Rental> = db.rentals.values().cloned().collect();
        rentals.sort_by(|a, b| b.date_out.cmp(&a.date_out));
        Ok(rentals)
    }

    async fn find_rental(&self, id: Uuid) -> Result<Option<Rental>, DatabaseError> {
        Ok(self.inner.read().await.rentals.get(&id).cloned())
    }

    async fn find_open_rental(
        &self,
        customer_id: Uuid,
        movie_id: Uuid,
    ) -> Result<Option<Rental>, DatabaseError> {
        let db = self.inner.read().await;
        // Open rentals sort before returned ones, newest first within each
        Ok(db
            .rentals
            .values()
            .filter(|r| r.customer.id == customer_id && r.movie.id == movie_id)
            .min_by(|a, b| {
                a.is_returned()
                    .cmp(&b.is_returned())
                    .then_with(|| b.date_out.cmp(&a.date_out))
            })
            .cloned())
    }

    async fn checkout(&self, rental: &Rental) -> Result<(), DatabaseError> {
        let mut db = self.inner.write().await;
        let movie = db
            .movies
            .get_mut(&rental.movie.id)
            .ok_or_else(|| DatabaseError::NotFound("Invalid movie.".to_string()))?;
        if movie.number_in_stock <= 0 {
            return Err(DatabaseError::OutOfStock);
        }
        movie.number_in_stock -= 1;
        db.rentals.insert(rental.id, rental.clone());
        Ok(())
    }

    async fn check_in(
        &self,
        rental_id: Uuid,
        returned_at: DateTime<Utc>,
        fee: Decimal,
    ) -> Result<Rental, DatabaseError> {
        let mut db = self.inner.write().await;
        let rental = db
            .rentals
            .get_mut(&rental_id)
            .ok_or_else(|| DatabaseError::NotFound("Rental not found.".to_string()))?;
        if rental.is_returned() {
            return Err(DatabaseError::AlreadyProcessed);
        }
        rental.date_returned = Some(returned_at);
        rental.rental_fee = Some(fee);
        let rental = rental.clone();

        match db.movies.get_mut(&rental.movie.id) {
            Some(movie) if movie.number_in_stock >= Movie::MAX_STOCK => {
                tracing::warn!("Movie {} already at maximum stock; return not restocked", movie.id)
            }
            Some(movie) => movie.number_in_stock += 1,
            None => tracing::warn!("Returned movie {} no longer exists; stock not restored", rental.movie.id),
        }
        Ok(rental)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenreSnapshot;
    use std::sync::Arc;

    fn movie(stock: i32) -> Movie {
        Movie {
            id: Uuid::new_v4(),
            title: "The Thing".to_string(),
            genre: GenreSnapshot { id: Uuid::new_v4(), name: "Horror".to_string() },
            number_in_stock: stock,
            daily_rental_rate: Decimal::from(2),
        }
    }

    fn customer() -> Customer {
        Customer {
            id: Uuid::new_v4(),
            name: "Jane Doe".to_string(),
            phone: "555-0100".to_string(),
            is_gold: false,
        }
    }

    #[tokio::test]
    async fn checkout_without_stock_writes_nothing() {
        let store = MemoryStore::new();
        let movie = movie(0);
        store.insert_movie(&movie).await.unwrap();

        let rental = Rental::checkout(&customer(), &movie, Utc::now());
        let result = store.checkout(&rental).await;

        assert!(matches!(result, Err(DatabaseError::OutOfStock)));
        assert!(store.list_rentals().await.unwrap().is_empty());
        assert_eq!(store.find_movie(movie.id).await.unwrap().unwrap().number_in_stock, 0);
    }

    #[tokio::test]
    async fn concurrent_checkouts_never_oversell() {
        let store = Arc::new(MemoryStore::new());
        let movie = movie(3);
        store.insert_movie(&movie).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = store.clone();
            let rental = Rental::checkout(&customer(), &movie, Utc::now());
            handles.push(tokio::spawn(async move { store.checkout(&rental).await }));
        }

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 3);
        assert_eq!(store.list_rentals().await.unwrap().len(), 3);
        assert_eq!(store.find_movie(movie.id).await.unwrap().unwrap().number_in_stock, 0);
    }

    #[tokio::test]
    async fn check_in_is_applied_once() {
        let store = MemoryStore::new();
        let movie = movie(1);
        store.insert_movie(&movie).await.unwrap();
        let rental = Rental::checkout(&customer(), &movie, Utc::now());
        store.checkout(&rental).await.unwrap();

        let returned = store.check_in(rental.id, Utc::now(), Decimal::ZERO).await.unwrap();
        assert!(returned.is_returned());
        assert_eq!(store.find_movie(movie.id).await.unwrap().unwrap().number_in_stock, 1);

        let second = store.check_in(rental.id, Utc::now(), Decimal::ZERO).await;
        assert!(matches!(second, Err(DatabaseError::AlreadyProcessed)));
        assert_eq!(store.find_movie(movie.id).await.unwrap().unwrap().number_in_stock, 1);
    }

    #[tokio::test]
    async fn check_in_never_restocks_past_maximum() {
        let store = MemoryStore::new();
        let mut movie = movie(1);
        store.insert_movie(&movie).await.unwrap();
        let rental = Rental::checkout(&customer(), &movie, Utc::now());
        store.checkout(&rental).await.unwrap();

        movie.number_in_stock = Movie::MAX_STOCK;
        store.update_movie(&movie).await.unwrap();

        let returned = store.check_in(rental.id, Utc::now(), Decimal::ZERO).await.unwrap();
        assert!(returned.is_returned());
        assert_eq!(store.find_movie(movie.id).await.unwrap().unwrap().number_in_stock, Movie::MAX_STOCK);
    }

    #[tokio::test]
    async fn open_rental_is_preferred_over_returned_one() {
        let store = MemoryStore::new();
        let movie = movie(2);
        let customer = customer();
        store.insert_movie(&movie).await.unwrap();

        let first = Rental::checkout(&customer, &movie, Utc::now() - chrono::Duration::days(3));
        store.checkout(&first).await.unwrap();
        store.check_in(first.id, Utc::now(), Decimal::from(6)).await.unwrap();

        let second = Rental::checkout(&customer, &movie, Utc::now() - chrono::Duration::days(5));
        store.checkout(&second).await.unwrap();

        let found = store.find_open_rental(customer.id, movie.id).await.unwrap().unwrap();
        assert_eq!(found.id, second.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        let user = User {
            id: Uuid::new_v4(),
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: "hash".to_string(),
            is_admin: false,
        };
        store.insert_user(&user).await.unwrap();

        let again = User { id: Uuid::new_v4(), ..user.clone() };
        assert!(matches!(store.insert_user(&again).await, Err(DatabaseError::Duplicate(_))));
        assert!(store.find_user_by_email("JANE@example.com").await.unwrap().is_some());
    }
}
