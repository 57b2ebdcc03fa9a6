//! API models for dashboard statistics and chart configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::ChartType;
use super::fields::required_enum;
use crate::api::validation::{Validate, require_non_empty, require_non_negative};
use crate::db::models::dashboard::ChartDBResponse;
use crate::types::ChartId;

/// A statistic a chart can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DataType {
    pub id: &'static str,
    pub name: &'static str,
}

pub const PROJECTS_BY_CATEGORY: DataType = DataType {
    id: "projects-by-category",
    name: "Proyectos por Categoría",
};
pub const PROJECTS_BY_STATUS: DataType = DataType {
    id: "projects-by-status",
    name: "Proyectos por Estado",
};
pub const STAFF_BY_ROLE: DataType = DataType {
    id: "staff-by-role",
    name: "Staff por Rol",
};

pub const DATA_TYPES: [DataType; 3] = [PROJECTS_BY_CATEGORY, PROJECTS_BY_STATUS, STAFF_BY_ROLE];

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountsResponse {
    pub total_projects: i64,
    pub total_staff: i64,
    pub total_clients: i64,
    pub total_integrations: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RoleCount {
    pub role: String,
    pub count: i64,
}

/// Chart definition. Unknown keys are ignored.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartInput {
    pub title: String,
    #[serde(deserialize_with = "required_enum")]
    pub chart_type: ChartType,
    pub data_type: String,
    #[serde(default)]
    pub options: Option<String>,
    #[serde(default)]
    #[schema(minimum = 0)]
    pub order: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Charts inserted at startup, one per data type.
pub fn default_charts() -> Vec<ChartInput> {
    [
        (PROJECTS_BY_CATEGORY, ChartType::Pie, 1),
        (STAFF_BY_ROLE, ChartType::Bar, 2),
        (PROJECTS_BY_STATUS, ChartType::Doughnut, 3),
    ]
    .into_iter()
    .map(|(data_type, chart_type, order)| ChartInput {
        title: data_type.name.to_string(),
        chart_type,
        data_type: data_type.id.to_string(),
        options: None,
        order,
        enabled: true,
    })
    .collect()
}

impl Validate for ChartInput {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("title", &self.title)?;
        require_non_empty("dataType", &self.data_type)?;
        require_non_negative("order", Some(self.order))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartResponse {
    pub id: ChartId,
    pub title: String,
    pub chart_type: ChartType,
    pub data_type: String,
    pub options: Option<String>,
    pub order: i32,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ChartDBResponse> for ChartResponse {
    fn from(db: ChartDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            chart_type: db.chart_type,
            data_type: db.data_type,
            options: db.options,
            order: db.chart_order,
            enabled: db.enabled,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_defaults_and_unknown_keys() {
        let input: ChartInput = serde_json::from_str(
            r#"{"title": "Por rol", "chartType": "polarArea", "dataType": "staff-by-role", "color": "red"}"#,
        )
        .unwrap();
        assert_eq!(input.chart_type, ChartType::PolarArea);
        assert_eq!(input.order, 0);
        assert!(input.enabled);
        assert!(input.options.is_none());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_chart_rejects_bad_values() {
        assert!(
            serde_json::from_str::<ChartInput>(r#"{"title": "X", "chartType": "radar", "dataType": "staff-by-role"}"#)
                .is_err()
        );
        assert!(serde_json::from_str::<ChartInput>(r#"{"title": "X", "chartType": "bar"}"#).is_err());

        let input: ChartInput =
            serde_json::from_str(r#"{"title": "X", "chartType": "bar", "dataType": "", "order": 1}"#).unwrap();
        assert!(input.validate().is_err());

        let input: ChartInput =
            serde_json::from_str(r#"{"title": "X", "chartType": "bar", "dataType": "d", "order": -1}"#).unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_response_uses_camel_case() {
        let json = serde_json::to_value(ChartResponse {
            id: 1,
            title: "t".to_string(),
            chart_type: ChartType::Pie,
            data_type: "projects-by-category".to_string(),
            options: None,
            order: 1,
            enabled: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .unwrap();
        assert_eq!(json["chartType"], "pie");
        assert_eq!(json["dataType"], "projects-by-category");
    }
}
