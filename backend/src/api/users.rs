//! Dashboard and expiry report endpoints

use super::{ApiError, ApiResponse, ApiState};
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use chrono::Local;
use serde::Deserialize;

use crate::model::Package;
use crate::registry::dashboard::{
    export_file_name, report_csv, users_csv, Dashboard, ReportEntry, UserFilter,
};
use crate::registry::expiry::StatusClass;

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    /// Comma separated packages. Absent means all, empty means none.
    pub package: Option<String>,
    pub search: Option<String>,
}

impl UserQuery {
    pub fn to_filter(&self) -> Result<UserFilter, ApiError> {
        let packages = match self.package.as_deref() {
            None => Package::ALL.to_vec(),
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(|p| p.parse::<Package>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        };
        Ok(UserFilter {
            packages,
            search: self.search.clone(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub status: Option<String>,
}

impl ReportQuery {
    fn status(&self) -> Result<Option<StatusClass>, ApiError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s
                .parse::<StatusClass>()
                .map(Some)
                .map_err(|e| ApiError::BadRequest(e.to_string())),
        }
    }
}

pub async fn list_users(
    State(state): State<ApiState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ApiResponse<Dashboard>>, ApiError> {
    let filter = query.to_filter()?;
    let dashboard = state.service.dashboard(&filter).await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

pub async fn export_users(
    State(state): State<ApiState>,
    Query(query): Query<UserQuery>,
) -> Result<Response, ApiError> {
    let filter = query.to_filter()?;
    let dashboard = state.service.dashboard(&filter).await?;
    let csv = users_csv(dashboard.users.iter().map(|u| &u.row));
    Ok(csv_download(&state, csv))
}

pub async fn expiry_report(
    State(state): State<ApiState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<Vec<ReportEntry>>>, ApiError> {
    let report = state
        .service
        .expiry_report(Local::now().naive_local(), query.status()?)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

pub async fn export_expiry_report(
    State(state): State<ApiState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let report = state
        .service
        .expiry_report(Local::now().naive_local(), query.status()?)
        .await?;
    Ok(csv_download(&state, report_csv(&report)))
}

fn csv_download(state: &ApiState, csv: String) -> Response {
    let file_name =
        export_file_name(&state.config.export_file_prefix, Local::now().date_naive());
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        csv,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_list_parsing() {
        let query = UserQuery {
            package: Some("Monthly, lifetime".to_string()),
            search: None,
        };
        assert_eq!(
            query.to_filter().unwrap().packages,
            vec![Package::Monthly, Package::Lifetime]
        );

        let none_selected = UserQuery {
            package: Some(String::new()),
            search: None,
        };
        assert!(none_selected.to_filter().unwrap().packages.is_empty());

        assert_eq!(
            UserQuery::default().to_filter().unwrap(),
            UserFilter::default()
        );
    }

    #[test]
    fn test_status_query() {
        let query = ReportQuery {
            status: Some("expiring_soon".to_string()),
        };
        assert_eq!(query.status().unwrap(), Some(StatusClass::ExpiringSoon));
        assert_eq!(ReportQuery::default().status().unwrap(), None);

        let bad = ReportQuery {
            status: Some("stale".to_string()),
        };
        assert!(matches!(bad.status(), Err(ApiError::BadRequest(_))));
    }
}
