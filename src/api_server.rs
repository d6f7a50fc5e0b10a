// Axum server module
//
// Purpose: serve the crop recommendation form and run predictions
// Pages render through Askama; every /predict outcome is HTTP 200 with the
// result sentence embedded in the page.

use axum::{
    extract::State,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

use std::path::{Path, PathBuf};

use crate::artifacts::ArtifactSet;
use crate::config::ServerConfig;
use crate::labels::LabelTable;
use crate::predictor::CropPredictor;
use crate::web::handlers::pages;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub predictor: CropPredictor,
    pub static_dir: PathBuf,
}

impl AppState {
    /// Load artifacts and build the shared predictor. Any error here must stop
    /// startup before the listener is bound.
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        Self::from_artifact_dir(&config.artifact_dir, &config.static_dir)
    }

    pub fn from_artifact_dir(artifact_dir: &Path, static_dir: &Path) -> anyhow::Result<Self> {
        tracing::info!("Loading model artifacts from {:?}...", artifact_dir);
        let artifacts = ArtifactSet::load(artifact_dir)?;

        tracing::info!("Building crop label table...");
        let labels = LabelTable::standard();
        tracing::info!("Loaded {} crop labels", labels.len());

        Ok(Self::with_predictor(
            CropPredictor::new(artifacts, labels),
            static_dir,
        ))
    }

    pub fn with_predictor(predictor: CropPredictor, static_dir: &Path) -> Self {
        Self {
            predictor,
            static_dir: static_dir.to_path_buf(),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        // HTML pages
        .route("/", get(pages::index_page))
        .route("/home", get(pages::home_page))
        .route("/predict", post(pages::predict_page))

        // Health check
        .route("/health", get(health_check))

        // Stylesheets and images referenced by the templates
        .nest_service("/static", static_files)

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "classifier": state.predictor.classifier_kind(),
    }))
}
