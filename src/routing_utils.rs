use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::{FromRequest, FromRequestParts};

use serde::Serialize;
use utoipa::openapi::{RefOr, Schema};
use utoipa::{ToSchema, openapi};

use validator::ValidationErrors;

use crate::domain::todo_item::driving_ports::TodoItemError;

/// Contains diagnostic information about an API failure
#[derive(Serialize, Debug, ToSchema)]
pub struct BasicErrorResponse {
    #[schema(example = "not_found")]
    pub error_code: String,
    #[schema(example = "The requested entity could not be found.")]
    pub error_description: String,
    pub extra_info: Option<ExtraInfo>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(untagged)]
pub enum ExtraInfo {
    ValidationIssues(ValidationErrorSchema),
    Message(String),
}

/// Stand-in OpenAPI schema for [ValidationErrors] which just provides an empty object
#[derive(Serialize, Debug)]
#[serde(transparent)]
pub struct ValidationErrorSchema(ValidationErrors);

impl<'schem> ToSchema<'schem> for ValidationErrorSchema {
    fn schema() -> (&'schem str, RefOr<Schema>) {
        (
            "ValidationErrorSchema",
            openapi::ObjectBuilder::new().into(),
        )
    }
}

/// Response type for requests referencing an entity which doesn't exist
pub struct NotFoundResponse;

impl IntoResponse for NotFoundResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::NOT_FOUND,
            Json(BasicErrorResponse {
                error_code: "not_found".into(),
                error_description: "The requested entity could not be found.".into(),
                extra_info: None,
            }),
        )
            .into_response()
    }
}

/// Response type for unexpected failures. The wrapped error never reaches the response body,
/// so log it before converting.
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(BasicErrorResponse {
                error_code: "internal_error".into(),
                error_description: "Could not access data to complete your request".into(),
                extra_info: None,
            }),
        )
            .into_response()
    }
}

/// Response type that wraps validation errors and turns them into [BasicErrorResponse]s
pub struct ValidationErrorResponse(ValidationErrors);

impl IntoResponse for ValidationErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(BasicErrorResponse {
                error_code: "invalid_input".into(),
                error_description: "Submitted data was invalid.".to_owned(),
                extra_info: Some(ExtraInfo::ValidationIssues(ValidationErrorSchema(self.0))),
            }),
        )
            .into_response()
    }
}

impl From<ValidationErrors> for ValidationErrorResponse {
    fn from(value: ValidationErrors) -> Self {
        Self(value)
    }
}

/// Response type for a request which is well-formed but inconsistent, carrying a
/// human-readable reason
pub struct InvalidRequestResponse(pub String);

impl IntoResponse for InvalidRequestResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(BasicErrorResponse {
                error_code: "invalid_input".into(),
                error_description: "Submitted data was invalid.".to_owned(),
                extra_info: Some(ExtraInfo::Message(self.0)),
            }),
        )
            .into_response()
    }
}

/// Translates todo item service failures into their HTTP representation
pub struct TodoItemErrorResponse(pub TodoItemError);

impl IntoResponse for TodoItemErrorResponse {
    fn into_response(self) -> Response {
        match self.0 {
            TodoItemError::Invalid(issues) => ValidationErrorResponse(issues).into_response(),
            TodoItemError::NotFound(_) => NotFoundResponse.into_response(),
            TodoItemError::PortError(cause) => GenericErrorResponse(cause).into_response(),
        }
    }
}

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing JSON parse errors
pub struct JsonErrorResponse {
    parse_problem: String,
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        JsonErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            axum::Json(BasicErrorResponse {
                error_code: "invalid_json".into(),
                error_description:
                    "The passed request body contained malformed or unreadable JSON.".into(),
                extra_info: Some(ExtraInfo::Message(self.parse_problem)),
            }),
        )
            .into_response()
    }
}

/// Wrapper for [axum::extract::Path] which reports unparseable path parameters
/// with our data structure for API errors
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(PathErrorResponse))]
pub struct Path<T>(pub T);

/// Response type for path parameters that don't match the route's expected types
pub struct PathErrorResponse {
    parse_problem: String,
}

impl From<PathRejection> for PathErrorResponse {
    fn from(value: PathRejection) -> Self {
        PathErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for PathErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            axum::Json(BasicErrorResponse {
                error_code: "invalid_path".into(),
                error_description: "A parameter in the request path was malformed.".into(),
                extra_info: Some(ExtraInfo::Message(self.parse_problem)),
            }),
        )
            .into_response()
    }
}
