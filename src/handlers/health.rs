use actix_web::{web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use super::run_blocking;
use crate::db::DbPool;
use crate::errors::AppError;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// GET /api/health
///
/// Answers 200 once the store accepts a query.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service and store are up", body = HealthResponse),
        (status = 500, description = "Store unreachable"),
    ),
    tag = "health"
)]
pub async fn health(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    run_blocking(move || {
        let mut conn = pool.get()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    })
    .await?;

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok".into(),
        timestamp: Utc::now().to_rfc3339(),
    }))
}
