// Page handlers for HTML rendering with Askama

use axum::{
    extract::{rejection::FormRejection, State},
    response::{Html, IntoResponse},
    Form,
};
use askama::Template;
use std::collections::HashMap;

use crate::api_server::AppState;
use crate::features::{FEATURE_FIELDS, N_FEATURES};
use crate::presentation::Outcome;

const SITE_TITLE: &str = "Crop Recommendation";

/// Display labels, parallel to `FEATURE_FIELDS`
const FIELD_LABELS: [&str; N_FEATURES] = [
    "Nitrogen",
    "Phosphorus",
    "Potassium",
    "Temperature (°C)",
    "Humidity (%)",
    "pH",
    "Rainfall (mm)",
];

/// One input box on the form
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// Input boxes, pre-filled with whatever was submitted last
fn field_views(submitted: &HashMap<String, String>) -> Vec<FieldView> {
    FEATURE_FIELDS
        .into_iter()
        .zip(FIELD_LABELS)
        .map(|(name, label)| FieldView {
            name,
            label,
            value: submitted.get(name).cloned().unwrap_or_default(),
        })
        .collect()
}

/// Collapse submitted pairs into one value per field. A repeated field keeps
/// its first value.
fn first_values(pairs: Vec<(String, String)>) -> HashMap<String, String> {
    let mut fields = HashMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        fields.entry(name).or_insert(value);
    }
    fields
}

fn render<T: Template>(template: T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        format!("Template error: {}", e)
    }))
}

// ============================================================================
// Landing Page
// ============================================================================

#[derive(Template)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {
    pub title: String,
}

pub async fn index_page() -> impl IntoResponse {
    render(IndexTemplate {
        title: SITE_TITLE.to_string(),
    })
}

// ============================================================================
// Form Page
// ============================================================================

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub title: String,
    pub fields: Vec<FieldView>,
    pub result: Option<String>,
    pub is_error: bool,
}

impl HomeTemplate {
    fn blank() -> Self {
        Self {
            title: SITE_TITLE.to_string(),
            fields: field_views(&HashMap::new()),
            result: None,
            is_error: false,
        }
    }

    fn with_outcome(submitted: &HashMap<String, String>, outcome: &Outcome) -> Self {
        Self {
            title: SITE_TITLE.to_string(),
            fields: field_views(submitted),
            result: Some(outcome.to_string()),
            is_error: outcome.is_error(),
        }
    }
}

pub async fn home_page() -> impl IntoResponse {
    render(HomeTemplate::blank())
}

/// Always 200: success, unknown crop and failures all render the same page
/// with the result sentence filled in.
pub async fn predict_page(
    State(state): State<AppState>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> impl IntoResponse {
    let (submitted, outcome) = match form {
        Ok(Form(pairs)) => {
            let fields = first_values(pairs);
            let outcome = state.predictor.recommend(&fields);
            (fields, outcome)
        }
        Err(rejection) => {
            tracing::warn!("Prediction error: {}", rejection.body_text());
            (HashMap::new(), Outcome::Failed(rejection.body_text()))
        }
    };

    tracing::info!("Prediction result: {}", outcome);
    render(HomeTemplate::with_outcome(&submitted, &outcome))
}
