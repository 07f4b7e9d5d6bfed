//! Axum request handlers. Prediction failures never escape as HTTP errors:
//! they are rendered back into the form.
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::{Form, Json};
use serde::Serialize;

use super::form::PredictForm;
use super::pages;
use super::state::{AppState, Snapshot};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub run_id: Option<String>,
}

pub async fn index() -> Html<String> {
    Html(pages::index_page().into_string())
}

pub async fn about() -> Html<String> {
    Html(pages::about_page().into_string())
}

pub async fn predict_form() -> Html<String> {
    Html(pages::predict_page(&PredictForm::default(), None).into_string())
}

pub async fn predict(
    State(state): State<AppState>,
    form: Result<Form<PredictForm>, FormRejection>,
) -> Html<String> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            let message = rejection.body_text();
            log::warn!("Unreadable prediction form: {}", message);
            state.metrics().record_prediction("error");
            return Html(pages::predict_page(&PredictForm::default(), Some(&message)).into_string());
        }
    };

    let markup = match score(&state, &form) {
        Ok(decision) => {
            log::info!("Prediction: {}", decision);
            state.metrics().record_prediction(&decision.to_string());
            pages::result_page(decision, &form)
        }
        Err(message) => {
            log::warn!("Prediction failed: {}", message);
            state.metrics().record_prediction("error");
            pages::predict_page(&form, Some(&message))
        }
    };
    Html(markup.into_string())
}

fn score(state: &AppState, form: &PredictForm) -> Result<credit_risk_core::Decision, String> {
    let record = form.to_record()?;
    match state.current().as_ref() {
        Snapshot::Ready(predictor) => predictor.predict(&record).map_err(|e| e.to_string()),
        Snapshot::Unavailable(message) => Err(message.clone()),
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let response = match state.current().as_ref() {
        Snapshot::Ready(predictor) => HealthResponse {
            status: "ready".to_string(),
            run_id: Some(predictor.run_id().to_string()),
        },
        Snapshot::Unavailable(_) => HealthResponse {
            status: "unavailable".to_string(),
            run_id: None,
        },
    };
    Json(response)
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics().export(),
    )
}
