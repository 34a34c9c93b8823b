//! Report Handlers

use axum::{
    Json,
    extract::Query,
    response::{IntoResponse, Response},
};
use http::header;
use shared::models::{BreakdownBucket, ReportBucket, ReportQuery, ReportSummary};

use crate::permissions::RequestContext;
use crate::services::{csv, reports};
use crate::utils::AppResult;

const SECTION: &str = "reports";

/// GET /api/reports/summary
pub async fn summary(ctx: RequestContext, Query(query): Query<ReportQuery>) -> AppResult<Json<ReportSummary>> {
    ctx.ensure_perm(SECTION).await?;
    Ok(Json(reports::load_summary(ctx.pool()?, &query).await?))
}

/// GET /api/reports/timeseries - one bucket per day/month, zero filled
pub async fn timeseries(
    ctx: RequestContext,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<ReportBucket>>> {
    ctx.ensure_perm(SECTION).await?;
    Ok(Json(reports::load_timeseries(ctx.pool()?, &query).await?))
}

/// GET /api/reports/timeseries-breakdown - `prefix:status` amounts per bucket
pub async fn timeseries_breakdown(
    ctx: RequestContext,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<BreakdownBucket>>> {
    ctx.ensure_perm(SECTION).await?;
    let (_, buckets) = reports::load_breakdown(ctx.pool()?, &query).await?;
    Ok(Json(buckets))
}

fn csv_response(body: String, stem: &str, query: &ReportQuery) -> Response {
    let disposition = csv::attachment(stem, &query.from.to_string(), &query.to.to_string());
    (
        [
            (header::CONTENT_TYPE, csv::CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

/// GET /api/reports/export.csv
pub async fn export_csv(ctx: RequestContext, Query(query): Query<ReportQuery>) -> AppResult<Response> {
    ctx.ensure_perm(SECTION).await?;
    let buckets = reports::load_timeseries(ctx.pool()?, &query).await?;
    tracing::info!(user_id = ctx.user.id, rows = buckets.len(), "Report CSV exported");
    Ok(csv_response(csv::timeseries_csv(&buckets), "report", &query))
}

/// GET /api/reports/export-breakdown.csv
pub async fn export_breakdown_csv(
    ctx: RequestContext,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    ctx.ensure_perm(SECTION).await?;
    let (statuses, buckets) = reports::load_breakdown(ctx.pool()?, &query).await?;
    tracing::info!(user_id = ctx.user.id, rows = buckets.len(), "Breakdown CSV exported");
    Ok(csv_response(
        csv::breakdown_csv(&statuses.keys(), &buckets),
        "report-breakdown",
        &query,
    ))
}
