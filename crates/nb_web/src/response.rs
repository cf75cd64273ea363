use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nb_core::{Error, StoredArticle};
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub status: &'static str,
    pub articles: Vec<StoredArticle>,
    pub total_results: usize,
}

impl NewsResponse {
    pub fn ok(articles: Vec<StoredArticle>) -> Self {
        Self {
            status: "ok",
            total_results: articles.len(),
            articles,
        }
    }
}

/// A failed request. The wrapped error is logged in full; the caller only
/// sees a generic message (validation messages excepted).
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::RemoteProvider(_) => StatusCode::BAD_GATEWAY,
            Error::Configuration(_) | Error::Storage(_) | Error::Io(_) | Error::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn public_message(&self) -> String {
        match &self.0 {
            Error::Validation(message) => message.clone(),
            Error::RemoteProvider(_) => "Failed to fetch news. Please try again later.".to_string(),
            Error::Configuration(_) => "News service is not configured. Please try again later.".to_string(),
            Error::Storage(_) | Error::Io(_) | Error::Serialization(_) => {
                "Failed to load news. Please try again later.".to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_client_error() {
            warn!("Rejected news request: {}", self.0);
        } else {
            error!("News request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError(Error::Validation("x".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError(Error::RemoteProvider("x".into())).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError(Error::Configuration("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError(Error::Storage("x".into())).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let err = ApiError(Error::RemoteProvider("HTTP 401: apiKeyInvalid: key abc123 is invalid".into()));
        assert!(!err.public_message().contains("abc123"));

        let err = ApiError(Error::Storage("disk I/O error at /var/lib/db".into()));
        assert!(!err.public_message().contains("/var/lib"));
    }

    #[test]
    fn test_ok_body_shape() {
        let value = serde_json::to_value(NewsResponse::ok(vec![])).unwrap();
        assert_eq!(value, json!({ "status": "ok", "articles": [], "totalResults": 0 }));
    }
}
