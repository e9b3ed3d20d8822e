// POST /summary: one-line description of an analysis configuration.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};

use crate::pipeline::summary_text;
use crate::web::api_error;

/// Requires positive `numTopics` and `numWords` form fields.
pub async fn summary(Form(fields): Form<HashMap<String, String>>) -> Response {
    let parse = |name: &str| -> Result<usize, Response> {
        fields
            .get(name)
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                api_error(
                    StatusCode::BAD_REQUEST,
                    &format!("{name} must be a positive integer"),
                    "invalid_parameter",
                )
            })
    };

    let num_topics = match parse("numTopics") {
        Ok(n) => n,
        Err(response) => return response,
    };
    let num_words = match parse("numWords") {
        Ok(n) => n,
        Err(response) => return response,
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({ "results": summary_text(num_topics, num_words) })),
    )
        .into_response()
}
