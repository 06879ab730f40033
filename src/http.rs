use std::sync::Arc;

use axum::{
    Json,
    Router,
    extract::{Path, Query, Request, State},
    http::{
        HeaderValue,
        Method,
        StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
            ORIGIN,
            VARY,
            X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
            X_XSS_PROTECTION,
        },
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use crate::{
    error::{self, Error},
    index::RecommendationIndex,
    player::{PlayerSummary, Season},
    validate::{self, Checked},
};

#[derive(Clone)]
struct AppState {
    index: Arc<RecommendationIndex>,
    allowed_origins: Arc<[String]>,
}

impl AppState {
    fn allows(&self, origin: &str) -> bool {
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed == origin)
    }
}

/// Build the HTTP API over a loaded index.
///
/// `allowed_origins` lists the browser origins allowed to call the API
/// cross-origin; `*` allows any origin.
pub fn router(
    index: Arc<RecommendationIndex>,
    allowed_origins: Vec<String>,
) -> Router {
    let state = AppState {
        index,
        allowed_origins: allowed_origins.into(),
    };

    Router::new()
        .route("/api/similarplayer/players", get(search_players))
        .route("/api/similarplayer/career/{player_id}", get(career))
        .route("/api/similarplayer/season/{player_id}/{season}", get(season))
        .route("/api/similarplayer/seasons/{player_id}", get(seasons))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), cross_origin))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

pub fn run_http(
    index: RecommendationIndex,
    bind: &str,
    allowed_origins: Vec<String>,
) -> error::Result<()> {
    let app = router(Arc::new(index), allowed_origins);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            Error::Config(format!("failed to start tokio runtime: {e}"))
        })?;

    runtime.block_on(async move {
        let listener =
            tokio::net::TcpListener::bind(bind).await.map_err(|e| {
                Error::Config(format!("failed to bind {bind}: {e}"))
            })?;
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "serving similar-player API");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Config(format!("HTTP server error: {e}")))
    })
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Deserialize)]
struct LimitParams {
    limit: Option<usize>,
}

impl LimitParams {
    fn apply(&self, mut results: Vec<PlayerSummary>) -> Vec<PlayerSummary> {
        if let Some(limit) = self.limit {
            results.truncate(limit);
        }
        results
    }
}

async fn search_players(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<PlayerSummary>>, ApiError> {
    let query = validate::validate_query(&params.query)?;
    Ok(Json(state.index.search_players(query)))
}

async fn career(
    State(state): State<AppState>,
    Path(player_id): Path<i64>,
    Query(limit): Query<LimitParams>,
) -> Result<Json<Vec<PlayerSummary>>, ApiError> {
    let results = match validate::validate_player_id(player_id)? {
        Checked::Known(id) => state.index.career_recommendations(id),
        Checked::OutOfRange => Vec::new(),
    };
    Ok(Json(limit.apply(results)))
}

async fn season(
    State(state): State<AppState>,
    Path((player_id, season)): Path<(i64, i64)>,
    Query(limit): Query<LimitParams>,
) -> Result<Json<Vec<PlayerSummary>>, ApiError> {
    let results = match validate::validate_player_season(player_id, season)? {
        Checked::Known((id, season)) => {
            state.index.season_recommendations(id, season)
        }
        Checked::OutOfRange => Vec::new(),
    };
    Ok(Json(limit.apply(results)))
}

async fn seasons(
    State(state): State<AppState>,
    Path(player_id): Path<i64>,
) -> Result<Json<Vec<Season>>, ApiError> {
    let seasons = match validate::validate_player_id(player_id)? {
        Checked::Known(id) => state.index.seasons_for_player(id),
        Checked::OutOfRange => Vec::new(),
    };
    Ok(Json(seasons))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let index = &state.index;
    Json(json!({
        "status": "ok",
        "players": index.player_count(),
        "seasons": index.season_count(),
        "careerLists": index.career_list_count(),
        "seasonLists": index.season_list_count(),
    }))
}

async fn not_found() -> (StatusCode, &'static str) {
    (
        StatusCode::NOT_FOUND,
        "The page you requested could not be found\n",
    )
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers
        .insert(X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    response
}

async fn cross_origin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .filter(|value| value.to_str().is_ok_and(|o| state.allows(o)))
        .cloned();

    let Some(origin) = origin else {
        return next.run(request).await;
    };

    let mut response = if request.method() == Method::OPTIONS {
        let mut preflight = StatusCode::OK.into_response();
        let headers = preflight.headers_mut();
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, OPTIONS"),
        );
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
        preflight
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(VARY, HeaderValue::from_static("Origin"));
    response
}

struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            Error::InvalidRequest(message) => {
                debug!(reason = message, "rejected request");
                (StatusCode::BAD_REQUEST, message).into_response()
            }
            other => {
                error!(error = %other, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
                    .into_response()
            }
        }
    }
}
