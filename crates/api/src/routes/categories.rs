//! Category endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::CategoryDto;
use domain::{Category, CategoryId, CategoryName};
use serde::Deserialize;

use super::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CategoryBody {
    pub name: String,
}

/// GET /categories
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<CategoryDto>>, ApiError> {
    let categories = state.repository.category_list().await?;
    Ok(Json(categories.iter().map(CategoryDto::from).collect()))
}

/// POST /categories
#[tracing::instrument(skip(state, body), fields(name = %body.name))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CategoryBody>,
) -> Result<(StatusCode, Json<CategoryDto>), ApiError> {
    let category = state.repository.create_category(&body.name).await?;
    Ok((StatusCode::CREATED, Json(CategoryDto::from(&category))))
}

/// GET /categories/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CategoryDto>, ApiError> {
    let id = CategoryId::parse(&id)?;
    let category = state.repository.category_by_id(&id).await?;
    Ok(Json(CategoryDto::from(&category)))
}

/// PUT /categories/{id}
#[tracing::instrument(skip(state, body))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<CategoryBody>,
) -> Result<Json<CategoryDto>, ApiError> {
    let category = Category::build(CategoryId::parse(&id)?, CategoryName::new(body.name)?);
    let updated = state.repository.update_category(&category).await?;
    Ok(Json(CategoryDto::from(&updated)))
}

/// DELETE /categories/{id}
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CategoryDto>, ApiError> {
    let id = CategoryId::parse(&id)?;
    let deleted = state.repository.delete_category(&id).await?;
    Ok(Json(CategoryDto::from(&deleted)))
}
