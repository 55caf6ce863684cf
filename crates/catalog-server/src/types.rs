//! Core catalog types

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog product.
///
/// Wire keys keep the legacy Portuguese names the frontend expects, and the
/// backup snapshot stores the same shape. Prices serialize as exact decimal
/// strings so a snapshot rewrite never loses precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,

    #[serde(rename = "nome")]
    #[sqlx(rename = "nome")]
    pub name: String,

    #[serde(rename = "categoria")]
    #[sqlx(rename = "categoria")]
    pub category: Option<String>,

    #[serde(rename = "preco")]
    #[sqlx(rename = "preco")]
    pub price: Decimal,

    #[serde(rename = "descricao")]
    #[sqlx(rename = "descricao")]
    pub description: Option<String>,

    /// Assigned by the database; absent on records that only ever reached
    /// the backup snapshot.
    #[serde(rename = "data_criacao", default, skip_serializing_if = "Option::is_none")]
    #[sqlx(rename = "data_criacao")]
    pub created_at: Option<NaiveDateTime>,
}

/// Create-product payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "categoria")]
    pub category: Option<String>,

    #[serde(rename = "preco")]
    pub price: Decimal,

    #[serde(rename = "descricao")]
    pub description: Option<String>,
}

impl NewProduct {
    /// Materialize as a full record under a store-assigned identifier.
    pub fn into_product(self, id: i64) -> Product {
        Product {
            id,
            name: self.name,
            category: self.category,
            price: self.price,
            description: self.description,
            created_at: None,
        }
    }
}
