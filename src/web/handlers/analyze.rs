// POST /analyze: run a topic analysis over an uploaded archive.
//
// Multipart fields: `file` (the zip archive) plus the optional option
// fields `numTopics`, `numWords`, `numTopPapers`, `skip_bibliography`,
// `stopwords` and `include_decade_analysis`.
//
// Returns 200 with the report, 400 for missing or invalid input, 500 when
// the corpus or model can't produce a result.

use std::collections::HashMap;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::pipeline::AnalysisOptions;
use crate::web::{analysis_error, api_error, AppState};

pub async fn analyze(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut archive: Option<Vec<u8>> = None;
    let mut fields: HashMap<String, String> = HashMap::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return api_error(StatusCode::BAD_REQUEST, &e.body_text(), "invalid_upload");
            }
        };
        let name = field.name().unwrap_or_default().to_string();

        let result = if name == "file" {
            field.bytes().await.map(|bytes| {
                archive = Some(bytes.to_vec());
            })
        } else {
            field.text().await.map(|text| {
                fields.insert(name.clone(), text);
            })
        };
        if let Err(e) = result {
            debug!(field = %name, error = %e, "Failed to read multipart field");
            return api_error(StatusCode::BAD_REQUEST, &e.body_text(), "invalid_upload");
        }
    }

    let Some(archive) = archive else {
        return analysis_error(&AnalysisError::NoInput);
    };

    let options = match AnalysisOptions::from_form(&fields) {
        Ok(options) => options,
        Err(e) => return analysis_error(&e),
    };

    info!(
        bytes = archive.len(),
        topics = options.num_topics,
        words = options.num_words,
        "Analysis requested"
    );

    match state.pipeline.analyze_bytes(archive, &options, None).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => analysis_error(&e),
    }
}
