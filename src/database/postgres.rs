use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::{DatabaseError, Store};
use crate::models::{Customer, CustomerSnapshot, Genre, GenreSnapshot, Movie, MovieSnapshot, Rental, User};

/// Postgres-backed store. Units of work run inside a single transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct MovieRow {
    id: Uuid,
    title: String,
    genre_id: Uuid,
    genre_name: String,
    number_in_stock: i32,
    daily_rental_rate: Decimal,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            genre: GenreSnapshot {
                id: row.genre_id,
                name: row.genre_name,
            },
            number_in_stock: row.number_in_stock,
            daily_rental_rate: row.daily_rental_rate,
        }
    }
}

#[derive(FromRow)]
struct RentalRow {
    id: Uuid,
    customer_id: Uuid,
    customer_name: String,
    customer_phone: String,
    movie_id: Uuid,
    movie_title: String,
    movie_daily_rental_rate: Decimal,
    date_out: DateTime<Utc>,
    date_returned: Option<DateTime<Utc>>,
    rental_fee: Option<Decimal>,
}

impl From<RentalRow> for Rental {
    fn from(row: RentalRow) -> Self {
        Rental {
            id: row.id,
            customer: CustomerSnapshot {
                id: row.customer_id,
                name: row.customer_name,
                phone: row.customer_phone,
            },
            movie: MovieSnapshot {
                id: row.movie_id,
                title: row.movie_title,
                daily_rental_rate: row.movie_daily_rental_rate,
            },
            date_out: row.date_out,
            date_returned: row.date_returned,
            rental_fee: row.rental_fee,
        }
    }
}

const MOVIE_COLUMNS: &str = "id, title, genre_id, genre_name, number_in_stock, daily_rental_rate";

const RENTAL_COLUMNS: &str = r#"
    id, customer_id, customer_name, customer_phone,
    movie_id, movie_title, movie_daily_rental_rate,
    date_out, date_returned, rental_fee
"#;

#[async_trait]
impl Store for PgStore {
    async fn list_genres(&self) -> Result<Vec<Genre>, DatabaseError> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    async fn find_genre(&self, id: Uuid) -> Result<Option<Genre>, DatabaseError> {
        let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(genre)
    }

    async fn insert_genre(&self, genre: &Genre) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO genres (id, name) VALUES ($1, $2)")
            .bind(genre.id)
            .bind(&genre.name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_genre(&self, genre: &Genre) -> Result<Option<Genre>, DatabaseError> {
        let updated = sqlx::query_as::<_, Genre>("UPDATE genres SET name = $2 WHERE id = $1 RETURNING id, name")
            .bind(genre.id)
            .bind(&genre.name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_genre(&self, id: Uuid) -> Result<Option<Genre>, DatabaseError> {
        let deleted = sqlx::query_as::<_, Genre>("DELETE FROM genres WHERE id = $1 RETURNING id, name")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(deleted)
    }

    async fn list_movies(&self) -> Result<Vec<Movie>, DatabaseError> {
        let sql = format!("SELECT {} FROM movies ORDER BY title", MOVIE_COLUMNS);
        let rows = sqlx::query_as::<_, MovieRow>(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn find_movie(&self, id: Uuid) -> Result<Option<Movie>, DatabaseError> {
        let sql = format!("SELECT {} FROM movies WHERE id = $1", MOVIE_COLUMNS);
        let row = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Movie::from))
    }

    async fn insert_movie(&self, movie: &Movie) -> Result<(), DatabaseError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO movies (id, title, genre_id, genre_name, number_in_stock, daily_rental_rate)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(movie.genre.id)
        .bind(&movie.genre.name)
        .bind(movie.number_in_stock)
        .bind(movie.daily_rental_rate)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_movie(&self, movie: &Movie) -> Result<Option<Movie>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE movies
            SET title = $2, genre_id = $3, genre_name = $4, number_in_stock = $5, daily_rental_rate = $6
            WHERE id = $1
            RETURNING {}
            "#,
            MOVIE_COLUMNS
        );
        let row = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(movie.id)
            .bind(&movie.title)
            .bind(movie.genre.id)
            .bind(&movie.genre.name)
            .bind(movie.number_in_stock)
            .bind(movie.daily_rental_rate)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Movie::from))
    }

    async fn delete_movie(&self, id: Uuid) -> Result<Option<Movie>, DatabaseError> {
        let sql = format!("DELETE FROM movies WHERE id = $1 RETURNING {}", MOVIE_COLUMNS);
        let row = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Movie::from))
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, DatabaseError> {
        let customers = sqlx::query_as::<_, Customer>("SELECT id, name, phone, is_gold FROM customers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(customers)
    }

    async fn find_customer(&self, id: Uuid) -> Result<Option<Customer>, DatabaseError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT id, name, phone, is_gold FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    async fn insert_customer(&self, customer: &Customer) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO customers (id, name, phone, is_gold) VALUES ($1, $2, $3, $4)")
            .bind(customer.id)
            .bind(&customer.name)
            .bind(&customer.phone)
            .bind(customer.is_gold)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_customer(&self, customer: &Customer) -> Result<Option<Customer>, DatabaseError> {
        let updated = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET name = $2, phone = $3, is_gold = $4
            WHERE id = $1
            RETURNING id, name, phone, is_gold
            "#,
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(customer.is_gold)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_customer(&self, id: Uuid) -> Result<Option<Customer>, DatabaseError> {
        let deleted = sqlx::query_as::<_, Customer>(
            "DELETE FROM customers WHERE id = $1 RETURNING id, name, phone, is_gold",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(deleted)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, is_admin FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, is_admin FROM users WHERE email = $1",
        )
        .bind(User::normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, is_admin)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::Duplicate("User already registered.".to_string()));
        }
        Ok(())
    }

    async fn list_rentals(&self) -> Result<Vec<Rental>, DatabaseError> {
        let sql = format!("SELECT {} FROM rentals ORDER BY date_out DESC", RENTAL_COLUMNS);
        let rows = sqlx::query_as::<_, RentalRow>(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Rental::from).collect())
    }

    async fn find_rental(&self, id: Uuid) -> Result<Option<Rental>, DatabaseError> {
        let sql = format!("SELECT {} FROM rentals WHERE id = $1", RENTAL_COLUMNS);
        let row = sqlx::query_as::<_, RentalRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Rental::from))
    }

    async fn find_open_rental(
        &self,
        customer_id: Uuid,
        movie_id: Uuid,
    ) -> Result<Option<Rental>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM rentals
            WHERE customer_id = $1 AND movie_id = $2
            ORDER BY (date_returned IS NOT NULL), date_out DESC
            LIMIT 1
            "#,
            RENTAL_COLUMNS
        );
        let row = sqlx::query_as::<_, RentalRow>(&sql)
            .bind(customer_id)
            .bind(movie_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Rental::from))
    }

    async fn checkout(&self, rental: &Rental) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // The row lock taken here serializes concurrent checkouts of one movie
        let decremented = sqlx::query(
            // language=postgresql
            r#"
            UPDATE movies
            SET number_in_stock = number_in_stock - 1
            WHERE id = $1 AND number_in_stock > 0
            "#,
        )
        .bind(rental.movie.id)
        .execute(&mut *tx)
        .await?;

        if decremented.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM movies WHERE id = $1")
                .bind(rental.movie.id)
                .fetch_optional(&mut *tx)
                .await?
                .is_some();
            tx.rollback().await?;
            return Err(if exists {
                DatabaseError::OutOfStock
            } else {
                DatabaseError::NotFound("Invalid movie.".to_string())
            });
        }

        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO rentals (
                id, customer_id, customer_name, customer_phone,
                movie_id, movie_title, movie_daily_rental_rate,
                date_out, date_returned, rental_fee
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NULL, NULL)
            "#,
        )
        .bind(rental.id)
        .bind(rental.customer.id)
        .bind(&rental.customer.name)
        .bind(&rental.customer.phone)
        .bind(rental.movie.id)
        .bind(&rental.movie.title)
        .bind(rental.movie.daily_rental_rate)
        .bind(rental.date_out)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn check_in(
        &self,
        rental_id: Uuid,
        returned_at: DateTime<Utc>,
        fee: Decimal,
    ) -> Result<Rental, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE rentals
            SET date_returned = $2, rental_fee = $3
            WHERE id = $1 AND date_returned IS NULL
            RETURNING {}
            "#,
            RENTAL_COLUMNS
        );
        let row = sqlx::query_as::<_, RentalRow>(&sql)
            .bind(rental_id)
            .bind(returned_at)
            .bind(fee)
            .fetch_optional(&mut *tx)
            .await?;

        let rental = match row {
            Some(row) => Rental::from(row),
            None => {
                let exists = sqlx::query("SELECT 1 FROM rentals WHERE id = $1")
                    .bind(rental_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .is_some();
                tx.rollback().await?;
                return Err(if exists {
                    DatabaseError::AlreadyProcessed
                } else {
                    DatabaseError::NotFound("Rental not found.".to_string())
                });
            }
        };

        let restocked = sqlx::query(
            // language=postgresql
            r#"
            UPDATE movies
            SET number_in_stock = number_in_stock + 1
            WHERE id = $1 AND number_in_stock < $2
            "#,
        )
        .bind(rental.movie.id)
        .bind(Movie::MAX_STOCK)
        .execute(&mut *tx)
        .await?;

        if restocked.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM movies WHERE id = $1")
                .bind(rental.movie.id)
                .fetch_optional(&mut *tx)
                .await?
                .is_some();
            if exists {
                tracing::warn!("Movie {} already at maximum stock; return not restocked", rental.movie.id);
            } else {
                tracing::warn!("Returned movie {} no longer exists; stock not restored", rental.movie.id);
            }
        }

        tx.commit().await?;
        Ok(rental)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
