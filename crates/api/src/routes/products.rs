//! Product endpoints, including keyword search and the NDJSON stream.

use std::sync::Arc;

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use common::{CategoryDto, ProductDto};
use domain::{Category, Product, ProductId, ProductName, ProductPrice};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use super::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct ProductBody {
    pub name: String,
    pub price: u32,
    pub category: CategoryDto,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub keyword: String,
}

fn products_to_dtos(products: &[Product]) -> Vec<ProductDto> {
    products.iter().map(ProductDto::from).collect()
}

/// GET /products
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ProductDto>>, ApiError> {
    let products = state.repository.product_list().await?;
    Ok(Json(products_to_dtos(&products)))
}

/// POST /products
#[tracing::instrument(skip(state, body), fields(name = %body.name, price = body.price))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ProductBody>,
) -> Result<(StatusCode, Json<ProductDto>), ApiError> {
    let category = Category::try_from(&body.category)?;
    let product = state
        .repository
        .create_product(&body.name, body.price, &category)
        .await?;
    Ok((StatusCode::CREATED, Json(ProductDto::from(&product))))
}

/// GET /products/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductDto>, ApiError> {
    let id = ProductId::parse(&id)?;
    let product = state.repository.product_by_id(&id).await?;
    Ok(Json(ProductDto::from(&product)))
}

/// PUT /products/{id}
#[tracing::instrument(skip(state, body))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ProductBody>,
) -> Result<Json<ProductDto>, ApiError> {
    let product = Product::build(
        ProductId::parse(&id)?,
        ProductName::new(body.name)?,
        ProductPrice::new(body.price)?,
        Category::try_from(&body.category)?,
    );
    let updated = state.repository.update_product(&product).await?;
    Ok(Json(ProductDto::from(&updated)))
}

/// DELETE /products/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductDto>, ApiError> {
    let id = ProductId::parse(&id)?;
    let deleted = state.repository.delete_product(&id).await?;
    Ok(Json(ProductDto::from(&deleted)))
}

/// GET /products/search?keyword=
#[tracing::instrument(skip(state))]
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ProductDto>>, ApiError> {
    let products = state.repository.product_by_keyword(&params.keyword).await?;
    Ok(Json(products_to_dtos(&products)))
}

/// GET /products/stream, one JSON product per line.
///
/// A stream error is written as a final `{"error": ...}` line. Dropping the
/// response body (client disconnect) cancels the underlying server stream.
#[tracing::instrument(skip(state))]
pub async fn stream(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let cancel = CancellationToken::new();
    let receiver = state.repository.stream_products(cancel.clone()).await?;
    metrics::counter!("http_product_streams_total").increment(1);

    let guard = cancel.drop_guard();
    let lines = ReceiverStream::new(receiver).map(move |item| {
        let _connected = &guard;
        ndjson_line(item)
    });

    Ok((
        [(CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(lines),
    )
        .into_response())
}

fn ndjson_line(item: client::Result<Product>) -> Result<Bytes, serde_json::Error> {
    let mut line = match item {
        Ok(product) => serde_json::to_vec(&ProductDto::from(&product))?,
        Err(err) => {
            tracing::warn!(error = %err, "product stream ended with an error");
            let message = match err.status() {
                Some(status) => status.message().to_string(),
                None => err.to_string(),
            };
            serde_json::to_vec(&serde_json::json!({ "error": message }))?
        }
    };
    line.push(b'\n');
    Ok(Bytes::from(line))
}
