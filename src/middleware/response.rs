use axum::{
    http::{header::HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Wrapper for API responses that adds the success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub headers: Vec<(HeaderName, HeaderValue)>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful 200 response
    pub fn success(data: T) -> Self {
        Self {
            data,
            headers: Vec::new(),
        }
    }

    /// Attach a response header (used to hand out auth tokens)
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": true,
                        "message": "Something failed.",
                        "code": "INTERNAL_SERVER_ERROR"
                    })),
                )
                    .into_response();
            }
        };

        let envelope = json!({
            "success": true,
            "data": data_value
        });

        let mut response = (StatusCode::OK, Json(envelope)).into_response();
        for (name, value) in self.headers {
            response.headers_mut().insert(name, value);
        }
        response
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_wraps_data_and_keeps_headers() {
        let response = ApiResponse::success(json!({"id": 1}))
            .with_header(HeaderName::from_static("x-auth-token"), HeaderValue::from_static("abc"))
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-auth-token"], "abc");
    }
}
