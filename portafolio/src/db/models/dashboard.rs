//! Database models for dashboard charts and statistics.

use crate::api::models::enums::ChartType;
use crate::types::ChartId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChartDBResponse {
    pub id: ChartId,
    pub title: String,
    pub chart_type: ChartType,
    pub data_type: String,
    pub options: Option<String>,
    pub chart_order: i32,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One bucket of a `GROUP BY` count; `label` is NULL for ungrouped rows.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GroupCount {
    pub label: Option<String>,
    pub count: i64,
}
