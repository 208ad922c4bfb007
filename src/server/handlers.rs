use super::{
    page,
    types::{DeltaEvent, DoneEvent, ErrorResponse, GenerateResponse, PreferenceBody, TaskInfo},
};
use crate::{
    Error,
    analysis::{AnalysisTask, Analyzer, ImagePayload, SessionPreference},
    inference::{Accumulator, FragmentStream, Generation},
};
use axum::{
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{
        Html, IntoResponse, Json, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use bytes::Bytes;
use futures::{Stream, StreamExt, stream};
use serde_json::{Value, json};
use std::{convert::Infallible, sync::Arc};
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub preference: Arc<Mutex<SessionPreference>>,
}

impl AppState {
    pub fn new(analyzer: Analyzer, preference: SessionPreference) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            preference: Arc::new(Mutex::new(preference)),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(e: &Error) -> ApiError {
    let status = match e {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::Transport(_) | Error::Response { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.user_message(),
        }),
    )
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(page::render(state.analyzer.model()))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_tasks() -> Json<Vec<TaskInfo>> {
    Json(AnalysisTask::ALL.into_iter().map(TaskInfo::from).collect())
}

pub async fn get_preferences(State(state): State<AppState>) -> Json<PreferenceBody> {
    let preference = state.preference.lock().await;
    Json(PreferenceBody {
        stream: preference.stream,
    })
}

pub async fn put_preferences(
    State(state): State<AppState>,
    Json(body): Json<PreferenceBody>,
) -> Json<PreferenceBody> {
    let mut preference = state.preference.lock().await;
    preference.set_stream(body.stream);
    info!("Streaming preference set to {}", body.stream);
    Json(PreferenceBody {
        stream: preference.stream,
    })
}

/// Fields of the generate form as submitted, before validation.
#[derive(Debug, Default)]
struct GenerateForm {
    image: Option<Bytes>,
    task: Option<String>,
    stream: Option<bool>,
}

impl GenerateForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error("Invalid form data", e))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| multipart_error("Failed to read image", e))?;
                    // Browsers send an empty part when no file was picked
                    form.image = (!data.is_empty()).then_some(data);
                }
                "task" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| multipart_error("Invalid task field", e))?;
                    form.task = (!text.trim().is_empty()).then_some(text);
                }
                "stream" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| multipart_error("Invalid stream field", e))?;
                    form.stream = Some(parse_flag(&text).map_err(|e| error_response(&e))?);
                }
                other => warn!("Ignoring unexpected form field: {}", other),
            }
        }

        Ok(form)
    }
}

/// Keeps the status axum assigns to the failure, so an upload over the body
/// limit is a 413 rather than a 400.
fn multipart_error(context: &str, e: MultipartError) -> ApiError {
    let status = e.status();
    warn!("{} ({}): {}", context, status, e.body_text());
    let error = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "Uploaded image is too large.".to_string()
    } else {
        format!("{}: {}", context, e.body_text())
    };
    (status, Json(ErrorResponse { error }))
}

fn parse_flag(value: &str) -> Result<bool, Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" => Ok(false),
        other => Err(Error::validation(format!(
            "Invalid stream flag: '{}'",
            other
        ))),
    }
}

pub async fn generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();

    let form = GenerateForm::read(multipart).await?;

    let preference = {
        let mut preference = state.preference.lock().await;
        if let Some(stream) = form.stream {
            preference.set_stream(stream);
        }
        *preference
    };

    let task = match form.task.as_deref() {
        Some(selection) => Some(AnalysisTask::lookup(selection).ok_or_else(|| {
            error_response(&Error::validation(format!(
                "Unknown analysis task: '{}'",
                selection.trim()
            )))
        })?),
        None => None,
    };

    let image = form
        .image
        .map(ImagePayload::new)
        .transpose()
        .map_err(|e| error_response(&e))?;

    info!("Generate request {} received", request_id);

    match state
        .analyzer
        .generate(image.as_ref(), task, preference)
        .await
    {
        Ok(Generation::Complete(content)) => {
            info!("Generate request {} completed", request_id);
            Ok(Json(GenerateResponse {
                content,
                model: state.analyzer.model().to_string(),
            })
            .into_response())
        }
        Ok(Generation::Streaming(fragments)) => {
            info!("Generate request {} streaming", request_id);
            Ok(Sse::new(stream_events(fragments))
                .keep_alive(KeepAlive::default())
                .into_response())
        }
        Err(e) => {
            if e.is_validation() {
                warn!("Generate request {} rejected: {}", request_id, e);
            } else {
                error!("Generate request {} failed: {}", request_id, e);
            }
            Err(error_response(&e))
        }
    }
}

fn json_event(name: &str, payload: &impl serde::Serialize) -> Event {
    Event::default()
        .event(name)
        .json_data(payload)
        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
}

struct EventState {
    fragments: FragmentStream,
    accumulator: Accumulator,
    done: bool,
}

/// Re-emits decoded fragments as `delta` events, then one `done` or `error`.
/// Empty fragments produce no event.
fn stream_events(fragments: FragmentStream) -> impl Stream<Item = Result<Event, Infallible>> {
    let state = EventState {
        fragments,
        accumulator: Accumulator::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.done {
            return None;
        }
        loop {
            match state.fragments.next().await {
                Some(Ok(fragment)) if fragment.is_empty() => continue,
                Some(Ok(fragment)) => {
                    let text = state.accumulator.push(&fragment).to_string();
                    let event = json_event("delta", &DeltaEvent {
                        content: fragment,
                        text,
                    });
                    return Some((Ok(event), state));
                }
                Some(Err(e)) => {
                    error!("Response stream failed: {}", e);
                    state.done = true;
                    let event = json_event("error", &ErrorResponse {
                        error: e.user_message(),
                    });
                    return Some((Ok(event), state));
                }
                None => {
                    state.done = true;
                    let event = json_event("done", &DoneEvent {
                        text: state.accumulator.text().to_string(),
                    });
                    return Some((Ok(event), state));
                }
            }
        }
    })
}
