//! Route handlers for the showroom server

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ivm_core::{CatalogEntry, CategoryFilter, SortOrder};
use ivm_showroom::{Action, DraftPatch, ShowroomState, StoreError, Submission};
use ivm_vertex::VideoKind;
use serde::{Deserialize, Deserializer};
use serde_json::json;
use std::sync::Arc;
use tower_cookies::Cookies;

use crate::error::{ApiError, ApiResult};
use crate::session::visitor_id;
use crate::state::{AppState, VisitorSession};

fn status_code(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

// ============== Health ==============

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "ivm-web",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.uptime_secs(),
        "visitors": state.visitor_count(),
    }))
}

// ============== Video Workflow ==============

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollQuery {
    pub operation_id: Option<String>,
}

async fn video_status(state: &AppState, kind: VideoKind) -> ApiResult<Response> {
    let status = state.videos.status(kind).await?;
    Ok(Json(status).into_response())
}

async fn generate_video(state: &AppState, kind: VideoKind, request: Option<Json<GenerateRequest>>) -> Response {
    let prompt = request.and_then(|Json(r)| r.prompt);

    match state.videos.generate(kind, prompt).await {
        Ok(outcome) => (status_code(outcome.http_status()), Json(outcome)).into_response(),
        Err(e) => {
            tracing::error!(%kind, "Video generation error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "error": e.to_string(),
                    "message": format!(
                        "Failed to generate {}. Please check logs.",
                        kind.label().to_lowercase()
                    ),
                })),
            )
                .into_response()
        }
    }
}

async fn poll_video(state: &AppState, kind: VideoKind, query: PollQuery) -> Response {
    let Some(operation_id) = query.operation_id.filter(|id| !id.is_empty()) else {
        return ApiError::BadRequest("operationId is required".to_string()).into_response();
    };

    match state.videos.poll(kind, &operation_id).await {
        Ok(outcome) => (status_code(outcome.http_status()), Json(outcome)).into_response(),
        Err(e) => {
            tracing::error!(%kind, "Video poll error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

pub async fn showcase_status(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    video_status(&state, VideoKind::Showcase).await
}

pub async fn hero_status(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    video_status(&state, VideoKind::Hero).await
}

pub async fn generate_showcase(
    State(state): State<Arc<AppState>>,
    request: Option<Json<GenerateRequest>>,
) -> Response {
    generate_video(&state, VideoKind::Showcase, request).await
}

pub async fn generate_hero(
    State(state): State<Arc<AppState>>,
    request: Option<Json<GenerateRequest>>,
) -> Response {
    generate_video(&state, VideoKind::Hero, request).await
}

pub async fn poll_showcase(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PollQuery>,
) -> Response {
    poll_video(&state, VideoKind::Showcase, query).await
}

pub async fn poll_hero(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PollQuery>,
) -> Response {
    poll_video(&state, VideoKind::Hero, query).await
}

pub async fn direct_generate(
    State(state): State<Arc<AppState>>,
    request: Option<Json<GenerateRequest>>,
) -> Response {
    let prompt = request.and_then(|Json(r)| r.prompt);
    let outcome = state.direct.generate(prompt).await;
    (status_code(outcome.http_status()), Json(outcome)).into_response()
}

pub async fn direct_poll(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PollQuery>,
) -> ApiResult<Response> {
    let operation_id = query
        .operation_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("operationId is required".to_string()))?;

    let outcome = state.direct.poll(&operation_id).await?;
    Ok((status_code(outcome.http_status()), Json(outcome)).into_response())
}

// ============== Text Proxy ==============

#[derive(Debug, Default, Deserialize)]
pub struct TextRequestBody {
    pub prompt: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

pub async fn generate_text(
    State(state): State<Arc<AppState>>,
    body: Option<Json<TextRequestBody>>,
) -> Response {
    let Json(body) = body.unwrap_or_default();

    match state
        .text
        .generate(body.prompt.as_deref(), body.content_type.as_deref())
        .await
    {
        Ok(content) => Json(json!({ "content": content })).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Failed to generate content",
                "details": e.to_string(),
            })),
        )
            .into_response(),
    }
}

pub async fn test_api(State(state): State<Arc<AppState>>) -> Response {
    let outcome = state.text.probe().await;
    (status_code(outcome.http_status()), Json(outcome)).into_response()
}

// ============== Catalog ==============

#[derive(Debug, Default, Deserialize)]
pub struct ModelQuery {
    pub filter: Option<String>,
    pub sort: Option<String>,
}

pub async fn list_models(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModelQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let filter: CategoryFilter = query.filter.as_deref().unwrap_or_default().parse()?;
    let sort: SortOrder = query.sort.as_deref().unwrap_or_default().parse()?;
    let models = state.catalog.view(filter, sort);

    Ok(Json(json!({
        "filter": filter,
        "sort": sort,
        "count": models.len(),
        "models": models,
    })))
}

pub async fn get_model(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<&'static CatalogEntry>> {
    Ok(Json(state.catalog.require(&id)?))
}

// ============== Visitor State ==============

fn session(state: &AppState, cookies: &Cookies) -> ApiResult<Arc<VisitorSession>> {
    Ok(state.visitor(&visitor_id(cookies))?)
}

fn snapshot(session: &VisitorSession) -> ApiResult<Json<ShowroomState>> {
    let store = session.store.read().map_err(|_| StoreError::Poisoned)?;
    Ok(Json(store.state().clone()))
}

fn apply(session: &VisitorSession, actions: Vec<Action>) -> ApiResult<Json<ShowroomState>> {
    let mut store = session.store.write().map_err(|_| StoreError::Poisoned)?;
    for action in actions {
        store.dispatch(action)?;
    }
    Ok(Json(store.state().clone()))
}

fn known_model(state: &AppState, id: &str) -> ApiResult<()> {
    if state.catalog.contains(id) {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("Unknown model: {id}")))
    }
}

pub async fn showroom(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> ApiResult<Json<ShowroomState>> {
    let session = session(&state, &cookies)?;
    snapshot(&session)
}

pub async fn add_to_compare(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Path(id): Path<String>,
) -> ApiResult<Json<ShowroomState>> {
    known_model(&state, &id)?;
    let session = session(&state, &cookies)?;
    apply(&session, vec![Action::AddToCompare(id)])
}

pub async fn remove_from_compare(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Path(id): Path<String>,
) -> ApiResult<Json<ShowroomState>> {
    let session = session(&state, &cookies)?;
    apply(&session, vec![Action::RemoveFromCompare(id)])
}

pub async fn clear_compare(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> ApiResult<Json<ShowroomState>> {
    let session = session(&state, &cookies)?;
    apply(&session, vec![Action::ClearCompare])
}

pub async fn toggle_saved(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Path(id): Path<String>,
) -> ApiResult<Json<ShowroomState>> {
    known_model(&state, &id)?;
    let session = session(&state, &cookies)?;
    apply(&session, vec![Action::ToggleSaved(id)])
}

/// Absent fields are left alone; `"expandedCard": null` collapses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionUpdate {
    pub filter: Option<String>,
    pub sort: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub expanded_card: Option<Option<String>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

pub async fn update_selection(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(update): Json<SelectionUpdate>,
) -> ApiResult<Json<ShowroomState>> {
    let mut actions = Vec::new();
    if let Some(filter) = update.filter {
        actions.push(Action::SetFilter(filter.parse()?));
    }
    if let Some(sort) = update.sort {
        actions.push(Action::SetSort(sort.parse()?));
    }
    if let Some(card) = update.expanded_card {
        if let Some(id) = &card {
            known_model(&state, id)?;
        }
        actions.push(Action::SetExpanded(card));
    }
    let session = session(&state, &cookies)?;
    apply(&session, actions)
}

// ============== Contact Form ==============

pub async fn update_draft(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(patch): Json<DraftPatch>,
) -> ApiResult<Json<ShowroomState>> {
    let session = session(&state, &cookies)?;
    let response = {
        let mut store = session.store.write().map_err(|_| StoreError::Poisoned)?;
        let changes = store.dispatch(Action::UpdateDraft(patch))?;
        let response = Json(store.state().clone());
        if changes.draft {
            session.autosave.schedule(session.store.clone());
        }
        response
    };
    Ok(response)
}

pub async fn clear_draft(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> ApiResult<Json<ShowroomState>> {
    let session = session(&state, &cookies)?;
    session.autosave.cancel();
    apply(&session, vec![Action::ResetForm])
}

/// Optional body is merged into the draft before validation.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    patch: Option<Json<DraftPatch>>,
) -> ApiResult<Response> {
    let session = session(&state, &cookies)?;
    let submission = {
        let mut store = session.store.write().map_err(|_| StoreError::Poisoned)?;
        if let Some(Json(patch)) = patch {
            store.dispatch(Action::UpdateDraft(patch))?;
        }
        store.submit()?
    };

    Ok(match submission {
        Submission::Accepted(enquiry) => {
            session.autosave.cancel();
            Json(json!({
                "status": "accepted",
                "message": "Thank you! We'll be in touch shortly.",
                "enquiry": enquiry,
            }))
            .into_response()
        }
        Submission::Rejected(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "status": "invalid",
                "message": "Please correct the highlighted fields.",
                "errors": errors,
            })),
        )
            .into_response(),
    })
}
