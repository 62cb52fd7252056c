use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use poll_render::{PollPayload, RenderSession, Template, VoteOutcome, html};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    db,
    error::AppError,
    models::{BallotForm, VoteRequest, ViewParams},
};

// ===== App State =====

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/templates", get(list_templates))
        .route("/polls/:id", get(get_poll))
        .route("/polls/:id/view", get(view_poll))
        .route("/polls/:id/vote", post(submit_vote))
        .route("/polls/:id/ballot", post(submit_ballot))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ===== Handlers =====

async fn root() -> &'static str {
    "Poll Rendering Backend - Use /health to check status"
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    // Check DB connection
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => Json(serde_json::json!({
            "status": "ok",
            "database": "connected"
        })),
        Err(_) => Json(serde_json::json!({
            "status": "error",
            "database": "disconnected"
        })),
    }
}

async fn list_templates(State(state): State<AppState>) -> Result<Json<Vec<Template>>, AppError> {
    Ok(Json(db::fetch_templates(&state.db).await?))
}

async fn get_poll(
    State(state): State<AppState>,
    Path(poll_id): Path<String>,
) -> Result<Json<PollPayload>, AppError> {
    Ok(Json(load(&state.db, &poll_id).await?))
}

async fn view_poll(
    State(state): State<AppState>,
    Path(poll_id): Path<String>,
    Query(params): Query<ViewParams>,
) -> Result<Html<String>, AppError> {
    let payload = load(&state.db, &poll_id).await?;
    let previous = match &params.voter {
        Some(voter) => db::voter_choice(&state.db, &poll_id, voter).await?,
        None => None,
    };

    Ok(Html(page(payload, previous, params)))
}

async fn submit_vote(
    State(state): State<AppState>,
    Path(poll_id): Path<String>,
    Json(vote_req): Json<VoteRequest>,
) -> Result<Json<PollPayload>, AppError> {
    if vote_req.voter_id.trim().is_empty() {
        return Err(AppError::BadRequest("voter_id is required".into()));
    }

    let payload = record(&state.db, &poll_id, &vote_req.option_id, &vote_req.voter_id).await?;
    Ok(Json(payload))
}

async fn submit_ballot(
    State(state): State<AppState>,
    Path(poll_id): Path<String>,
    Form(ballot): Form<BallotForm>,
) -> Result<Html<String>, AppError> {
    let voter_id = ballot
        .voter_id
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("voter_id is required".into()))?;

    let payload = record(&state.db, &poll_id, &ballot.option_id, &voter_id).await?;
    let params = after_ballot(&payload, voter_id, &ballot.option_id);

    Ok(Html(page(payload, Some(ballot.option_id), params)))
}

// ===== Helpers =====

async fn load(db: &PgPool, poll_id: &str) -> Result<PollPayload, AppError> {
    db::fetch_payload(db, poll_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("poll {poll_id}")))
}

async fn record(
    db: &PgPool,
    poll_id: &str,
    option_id: &str,
    voter_id: &str,
) -> Result<PollPayload, AppError> {
    let payload = load(db, poll_id).await?;
    let previous = db::voter_choice(db, poll_id, voter_id).await?;
    check_vote(&payload, previous, option_id, Utc::now())?;

    if !db::record_vote(db, poll_id, option_id, voter_id).await? {
        return Err(AppError::AlreadyVoted);
    }
    info!("Vote recorded on poll {poll_id} for option {option_id}");

    load(db, poll_id).await
}

/// Runs a vote through the same guards a viewer's render session applies,
/// plus a hard expiry check for every layout.
fn check_vote(
    payload: &PollPayload,
    previous: Option<String>,
    option_id: &str,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if payload.poll.expires_at.is_some_and(|expires_at| expires_at <= now) {
        return Err(AppError::Expired);
    }

    let mut session = RenderSession::new(
        payload.poll.clone(),
        payload.template.clone(),
        |_: &str| {},
        now,
    )
    .with_vote(previous);

    match session.cast_vote(option_id) {
        VoteOutcome::Cast => Ok(()),
        VoteOutcome::AlreadyVoted => Err(AppError::AlreadyVoted),
        VoteOutcome::Expired => Err(AppError::Expired),
        VoteOutcome::UnknownOption => Err(AppError::NotFound(format!("option {option_id}"))),
    }
}

/// Re-render after a ballot on the slide that holds the chosen option.
fn after_ballot(payload: &PollPayload, voter_id: String, option_id: &str) -> ViewParams {
    ViewParams {
        voter: Some(voter_id),
        show_results: Some(true),
        slide: payload.poll.options.iter().position(|o| o.id == option_id),
    }
}

fn page(payload: PollPayload, previous: Option<String>, params: ViewParams) -> String {
    let poll_id = payload.poll.id.clone();
    let show_results = params.show_results.unwrap_or(previous.is_some());

    let mut session = RenderSession::new(payload.poll, payload.template, |_: &str| {}, Utc::now())
        .with_vote(previous)
        .with_results(show_results);
    if let Some(slide) = params.slide {
        session.go_to_slide(slide);
    }

    let form = html::VoteForm {
        action: format!("/polls/{poll_id}/ballot"),
        voter_id: params.voter,
        show_results: params.show_results,
    };
    html::render_page(&session.view(), &session.template().colors, Some(&form))
}
