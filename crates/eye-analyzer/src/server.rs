use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{header, HeaderMap},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use eye_common::diagnosis::DiagnosticRecord;
use eye_common::openai::VisionClient;
use serde::Deserialize;
use tracing::{debug, info};

use crate::capture::ImageInput;
use crate::config::Config;
use crate::error::AppError;
use crate::normalize::load_as_jpeg;
use crate::render::{render_result, INDEX_HTML};
use crate::session::{new_session_id, session_cookie, session_from_headers, Analysis, SessionStore};
use crate::static_files::serve_image;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub vision: Arc<VisionClient>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let vision = VisionClient::new(config.vision.clone())?;
        let sessions = SessionStore::new(config.session_ttl);
        Ok(Self {
            config: Arc::new(config),
            vision: Arc::new(vision),
            sessions,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .route("/result", get(result))
        .route("/static/{filename}", get(serve_image))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// POST /analyze: run one analysis and redirect to `/result`, or redirect back to `/`
/// when the form carried no image.
async fn analyze(State(state): State<AppState>, request: Request) -> Result<Response, AppError> {
    let existing_session = session_from_headers(request.headers());
    let input = read_image_input(request)
        .await?
        .ok_or(AppError::NoImageProvided)?;

    let analysis = run_analysis(&state, &input).await?;

    let (session_id, set_cookie) = match existing_session {
        Some(id) => (id, None),
        None => {
            let id = new_session_id();
            let cookie = session_cookie(&id, state.sessions.ttl());
            (id, Some(cookie))
        }
    };
    state.sessions.put(&session_id, analysis).await;
    let active_sessions = state.sessions.active_sessions().await;
    debug!(active_sessions, "analysis stored");

    Ok((
        AppendHeaders(set_cookie.map(|c| (header::SET_COOKIE, c))),
        Redirect::to("/result"),
    )
        .into_response())
}

/// GET /result: the session's latest analysis, or an empty page.
async fn result(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let analysis = match session_from_headers(&headers) {
        Some(id) => state.sessions.get(&id).await,
        None => None,
    };
    Html(render_result(analysis.as_ref()))
}

/// Store the image, normalize it to JPEG, ask the vision model, and parse its reply.
pub async fn run_analysis(state: &AppState, input: &ImageInput) -> Result<Analysis, AppError> {
    let path = input.persist(&state.config.upload_dir).await?;
    let jpeg = load_as_jpeg(&path).await?;
    info!(
        source = ?input.source,
        filename = %input.filename,
        jpeg_bytes = jpeg.len(),
        model = %state.vision.config().model,
        "analyzing image"
    );

    let reply = state.vision.analyze(&jpeg).await?;
    let record = DiagnosticRecord::from_model_output(&reply).inspect_err(|e| {
        debug!(error = %e, reply = %reply, "model reply did not contain a diagnostic record");
    })?;
    info!(diagnosis = %record.diagnosis, "analysis complete");

    Ok(Analysis {
        record,
        image_url: format!("/static/{}", urlencoding::encode(&input.filename)),
    })
}

#[derive(Debug, Deserialize)]
struct CameraForm {
    camera_image: Option<String>,
}

/// Pull the image out of the request. An uploaded file with a name wins over a camera
/// capture; `Ok(None)` means neither was supplied.
async fn read_image_input(request: Request) -> Result<Option<ImageInput>, AppError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        read_multipart(multipart).await
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(form) = Form::<CameraForm>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        camera_input(form.camera_image)
    } else {
        Ok(None)
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<Option<ImageInput>, AppError> {
    let mut upload = None;
    let mut camera = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let filename = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                if upload.is_none() && !filename.is_empty() {
                    upload = Some(ImageInput::upload(&filename, bytes.to_vec())?);
                }
            }
            Some("camera_image") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                camera = Some(text);
            }
            _ => {}
        }
    }

    if upload.is_some() {
        return Ok(upload);
    }
    camera_input(camera)
}

fn camera_input(data_url: Option<String>) -> Result<Option<ImageInput>, AppError> {
    data_url
        .filter(|d| !d.trim().is_empty())
        .map(|d| ImageInput::camera(&d))
        .transpose()
}
