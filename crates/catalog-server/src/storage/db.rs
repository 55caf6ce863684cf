//! MySQL primary store

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};

use super::ProductStore;
use crate::error::StoreError;
use crate::types::{NewProduct, Product};
use crate::Config;

pub struct Database {
    pool: MySqlPool,
}

impl Database {
    /// Build the connection pool without touching the network; a down
    /// database must not prevent startup. Acquires queue when every
    /// connection is busy.
    pub fn connect_lazy(config: &Config) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.db_host)
            .username(&config.db_user)
            .password(&config.db_password)
            .database(&config.db_name);

        let pool = MySqlPoolOptions::new()
            .max_connections(config.pool_size)
            .connect_lazy_with(options);

        Self { pool }
    }

    /// Acquire and release one connection, purely for startup diagnostics.
    pub async fn health_check(&self) {
        match self.pool.acquire().await {
            Ok(_conn) => tracing::info!("MySQL connection pool established"),
            Err(e) => tracing::error!(
                "MySQL unreachable, requests will be served from the backup snapshot: {e}"
            ),
        }
    }

    /// Create the products table when it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS produtos_natal (
                id INT AUTO_INCREMENT PRIMARY KEY,
                nome VARCHAR(255) NOT NULL,
                categoria VARCHAR(100),
                preco DECIMAL(10, 2) NOT NULL,
                descricao TEXT,
                data_criacao TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ProductStore for Database {
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let products: Vec<Product> = sqlx::query_as(
            r#"
            SELECT id, nome, categoria, preco, descricao, data_criacao
            FROM produtos_natal
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn insert(&self, product: &NewProduct) -> Result<i64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO produtos_natal (nome, categoria, preco, descricao)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .bind(&product.description)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM produtos_natal WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
