//! Query server for areal-unit searches.
//!
//! Provides the HTTP API for postcode-radius and parent-boundary searches
//! against the geospatial indices, plus boundary uploads.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use locus::elasticsearch::EsClient;
use locus::error::SearchError;
use locus::models::{
    BoundaryDoc, Distance, GeoShape, Relation, SearchResults, DEFAULT_LIMIT, DEFAULT_OFFSET,
};

mod search;
use search::{normalize_postcode, SearchService};

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Areal-unit search server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:10000")]
    listen: String,

    /// Elasticsearch URL
    #[arg(long, default_value = "http://localhost:9200")]
    es_url: String,

    /// Index holding the searchable areal units
    #[arg(long, default_value = "areas")]
    areas_index: String,

    /// Index holding postcode pins
    #[arg(long, default_value = "postcodes")]
    postcodes_index: String,

    /// Index holding stored boundary documents
    #[arg(long, default_value = "boundaries")]
    boundaries_index: String,

    /// Deepest reachable result window (offset + limit)
    #[arg(long, default_value_t = 1000)]
    max_result_window: usize,
}

/// Application state shared across handlers
struct AppState {
    es_client: EsClient,
    service: SearchService,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Locus Query Server");
    info!("Connecting to Elasticsearch at {}", args.es_url);

    let es_client = EsClient::new(&args.es_url)?;

    if !es_client.health_check().await? {
        anyhow::bail!("Elasticsearch cluster is not healthy");
    }

    let doc_count = es_client.doc_count(&args.areas_index).await?;
    info!(
        "Connected to area index '{}' with {} documents",
        args.areas_index, doc_count
    );

    let service = SearchService::new(
        es_client.clone(),
        &args.areas_index,
        &args.postcodes_index,
        &args.boundaries_index,
        args.max_result_window,
    );

    let state = Arc::new(AppState { es_client, service });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/search/postcodes/{postcode}", get(postcode_search_handler))
        .route("/search/parent", post(store_boundary_handler))
        .route("/search/parent/{id}", get(parent_search_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let healthy = state.es_client.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        elasticsearch: healthy,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    elasticsearch: bool,
}

/// Area search around a postcode pin
async fn postcode_search_handler(
    State(state): State<Arc<AppState>>,
    Path(postcode): Path<String>,
    Query(params): Query<PostcodeQueryParams>,
) -> Result<Json<SearchResults>, ApiError> {
    let lc_postcode = normalize_postcode(&postcode);

    info!(
        postcode = %lc_postcode,
        postcode_raw = %postcode,
        distance = params.distance.as_deref().unwrap_or(""),
        requested_limit = params.limit.as_deref().unwrap_or(""),
        requested_offset = params.offset.as_deref().unwrap_or(""),
        requested_relation = params.relation.as_deref().unwrap_or(""),
        "postcode search: incoming request"
    );

    let limit = parse_window_param(params.limit.as_deref(), DEFAULT_LIMIT)?;
    let offset = parse_window_param(params.offset.as_deref(), DEFAULT_OFFSET)?;

    let relation = match params.relation.as_deref() {
        Some(raw) if !raw.is_empty() => Relation::parse(raw)?,
        _ => Relation::Within,
    };

    let distance = Distance::parse(params.distance.as_deref().unwrap_or(""))?;

    let results = state
        .service
        .postcode_search(&lc_postcode, &distance, relation, limit, offset)
        .await?;

    Ok(Json(results))
}

/// Area search inside a stored boundary document
async fn parent_search_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<WindowParams>,
) -> Result<Json<SearchResults>, ApiError> {
    info!(
        id = %id,
        requested_limit = params.limit.as_deref().unwrap_or(""),
        requested_offset = params.offset.as_deref().unwrap_or(""),
        "parent search: incoming request"
    );

    let limit = parse_window_param(params.limit.as_deref(), DEFAULT_LIMIT)?;
    let offset = parse_window_param(params.offset.as_deref(), DEFAULT_OFFSET)?;

    let results = state.service.parent_search(&id, limit, offset).await?;

    Ok(Json(results))
}

/// Validate and store an uploaded boundary shape
async fn store_boundary_handler(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<(StatusCode, Json<BoundaryDoc>), ApiError> {
    let payload: serde_json::Value =
        serde_json::from_str(&body).map_err(|_| ApiError(SearchError::UnparsableBody))?;

    let shape = GeoShape::from_parts(payload["type"].as_str(), payload.get("coordinates"))
        .map_err(ApiError)?;

    let name = payload["name"].as_str().map(String::from);

    let doc = state.service.store_boundary(name, shape).await?;

    info!(
        id = %doc.id,
        shape_type = doc.location.shape_type(),
        "stored boundary document"
    );

    Ok((StatusCode::CREATED, Json(doc)))
}

#[derive(Deserialize)]
struct PostcodeQueryParams {
    /// Search radius as "value,unit", e.g. "1,km"
    distance: Option<String>,
    /// Page size
    limit: Option<String>,
    /// Page start within the result window
    offset: Option<String>,
    /// Spatial relation: "within" (default) or "intersects"
    relation: Option<String>,
}

#[derive(Deserialize)]
struct WindowParams {
    limit: Option<String>,
    offset: Option<String>,
}

/// Parse an optional limit/offset parameter, falling back to its default.
fn parse_window_param(raw: Option<&str>, default: usize) -> Result<usize, ApiError> {
    match raw {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ApiError(SearchError::ParameterParse)),
    }
}

/// Maps pipeline errors onto HTTP statuses: malformed input and structural
/// shape violations are the caller's fault, missing postcodes/boundaries
/// are 404s, anything else is a 500 with the detail kept in the server log.
struct ApiError(SearchError);

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;

        if err.is_not_found() {
            warn!("{err}");
            return (StatusCode::NOT_FOUND, err.to_string()).into_response();
        }

        if err.is_bad_request() {
            warn!("{err}");
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }

        error!("request failed: {err}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal server error".to_string(),
        )
            .into_response()
    }
}
