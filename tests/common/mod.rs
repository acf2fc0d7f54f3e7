#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use uuid::Uuid;

use vidly_api::auth::{generate_jwt, Claims};
use vidly_api::config::{AppConfig, Environment};
use vidly_api::database::{MemoryStore, Store};
use vidly_api::models::{Customer, Genre, GenreSnapshot, Movie, Rental};
use vidly_api::{app, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";

/// In-process server on a free port backed by a fresh memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<dyn Store>,
    pub config: AppConfig,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::preset(Environment::Development);
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;
        config.server.enable_request_logging = false;
        config.security.jwt_secret = TEST_SECRET.to_string();

        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let state = AppState::new(config.clone(), store.clone());

        let listener = tokio::net::TcpListener::bind(config.bind_addr())
            .await
            .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            port,
            base_url,
            store,
            config,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Signed token for a random user id
    pub fn token(&self, is_admin: bool) -> String {
        let security = &self.config.security;
        generate_jwt(&Claims::new(Uuid::new_v4(), is_admin, security), security).expect("sign token")
    }

    pub async fn seed_genre(&self, name: &str) -> Genre {
        let genre = Genre {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.store.insert_genre(&genre).await.expect("insert genre");
        genre
    }

    pub async fn seed_movie(&self, title: &str, stock: i32, rate: i64) -> Movie {
        let genre = self.seed_genre("Action").await;
        let movie = Movie {
            id: Uuid::new_v4(),
            title: title.to_string(),
            genre: GenreSnapshot::from(&genre),
            number_in_stock: stock,
            daily_rental_rate: Decimal::from(rate),
        };
        self.store.insert_movie(&movie).await.expect("insert movie");
        movie
    }

    pub async fn seed_customer(&self, name: &str) -> Customer {
        let customer = Customer {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: "555-0100".to_string(),
            is_gold: false,
        };
        self.store.insert_customer(&customer).await.expect("insert customer");
        customer
    }

    /// Check a copy out as if it happened at `date_out`
    pub async fn seed_rental(&self, customer: &Customer, movie: &Movie, date_out: DateTime<Utc>) -> Rental {
        let rental = Rental::checkout(customer, movie, date_out);
        self.store.checkout(&rental).await.expect("checkout");
        rental
    }

    pub async fn stock_of(&self, movie_id: Uuid) -> i32 {
        self.store
            .find_movie(movie_id)
            .await
            .expect("find movie")
            .expect("movie exists")
            .number_in_stock
    }
}
