//! Product handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::storage::IdMatch;
use crate::types::{NewProduct, Product};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CreateResponse {
    message: &'static str,
    id: i64,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DeleteAckResponse {
    message: &'static str,
    #[serde(rename = "deletedId")]
    deleted_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    message: String,
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
}

/// Payload constraints enforced at the boundary; the service itself never
/// rejects a request.
fn validate(req: &NewProduct) -> Option<&'static str> {
    if req.name.trim().is_empty() {
        return Some("O campo 'nome' é obrigatório.");
    }
    if req.price.is_sign_negative() {
        return Some("O campo 'preco' não pode ser negativo.");
    }
    None
}

pub async fn list(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.catalog.list().await)
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<NewProduct>,
) -> Result<(StatusCode, Json<CreateResponse>), (StatusCode, Json<ErrorResponse>)> {
    if let Some(message) = validate(&req) {
        return Err(bad_request(message));
    }

    let outcome = state.catalog.create(req).await;
    let message = if outcome.degraded {
        "Item salvo (Modo Offline/Backup)!"
    } else {
        "Produto cadastrado com sucesso!"
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            message,
            id: outcome.id,
        }),
    ))
}

/// GET variant kept so deletions can be triggered from a browser; matches
/// ids loosely, the way that route always did.
pub async fn delete_browser(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<DeleteResponse> {
    state.catalog.delete(&id, IdMatch::Loose).await;
    Json(DeleteResponse {
        message: "Produto removido com sucesso!",
    })
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<DeleteAckResponse> {
    tracing::info!("Deleting product with id {id}");
    state.catalog.delete(&id, IdMatch::Strict).await;
    Json(DeleteAckResponse {
        message: "Produto removido com sucesso!",
        deleted_id: id,
    })
}
