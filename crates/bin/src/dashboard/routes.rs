use super::AppState;
use super::error::ApiError;
use super::render::{self, FormValues};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::Html;
use frontier::data::PriceSource;
use frontier::optim::{Objective, OptimizeError};
use frontier::{OptimizationRequest, OptimizationResult, PipelineError, TickerSet, parse_range};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

// ── Query params ─────────────────────────────────────────────────────────

/// Form submission from the sidebar. Missing fields arrive as empty strings.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct OptimizeForm {
    #[serde(default)]
    tickers: String,
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: String,
    #[serde(default)]
    objective: String,
}

/// Tickers as a comma-separated string or a JSON list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TickerInput {
    List(Vec<String>),
    Text(String),
}

/// Body of `POST /api/optimize`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiRequest {
    tickers: TickerInput,
    start: String,
    end: String,
    #[serde(default)]
    objective: Option<String>,
}

fn parse_objective(raw: &str) -> Result<Objective, PipelineError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Objective::MaxSharpe);
    }
    raw.parse()
        .map_err(|e: OptimizeError| PipelineError::InvalidRequest(e.to_string()))
}

impl OptimizeForm {
    fn values(&self) -> FormValues {
        FormValues {
            tickers: self.tickers.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            objective: parse_objective(&self.objective).ok(),
        }
    }

    fn request(&self) -> Result<OptimizationRequest, PipelineError> {
        Ok(OptimizationRequest::new(
            TickerSet::parse(&self.tickers)?,
            parse_range(&self.start, &self.end)?,
            parse_objective(&self.objective)?,
        ))
    }
}

impl ApiRequest {
    fn request(&self) -> Result<OptimizationRequest, PipelineError> {
        let tickers = match &self.tickers {
            TickerInput::List(list) => TickerSet::new(list)?,
            TickerInput::Text(text) => TickerSet::parse(text)?,
        };
        Ok(OptimizationRequest::new(
            tickers,
            parse_range(&self.start, &self.end)?,
            parse_objective(self.objective.as_deref().unwrap_or_default())?,
        ))
    }
}

async fn execute<S>(
    state: &AppState<S>,
    request: &OptimizationRequest,
) -> Result<OptimizationResult, PipelineError>
where
    S: PriceSource + Send + Sync + 'static,
{
    info!(
        tickers = %request.tickers,
        range = %request.range,
        objective = %request.objective,
        "optimization requested"
    );
    let result = frontier::run(&state.source, request, &state.optimizer, |_| {}).await;
    if let Err(e) = &result {
        warn!(kind = e.kind(), error = %e, "optimization failed");
    }
    result
}

// ── Handlers ─────────────────────────────────────────────────────────────

pub(crate) async fn index() -> Html<String> {
    Html(render::index_page(&FormValues::default()))
}

pub(crate) async fn optimize_page<S>(
    State(state): State<Arc<AppState<S>>>,
    Query(form): Query<OptimizeForm>,
) -> Html<String>
where
    S: PriceSource + Send + Sync + 'static,
{
    let values = form.values();
    let outcome = match form.request() {
        Ok(request) => execute(&state, &request).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(result) => Html(render::result_page(&values, &result)),
        Err(e) => Html(render::error_page(&values, &e.to_string())),
    }
}

pub(crate) async fn api_optimize<S>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<ApiRequest>, JsonRejection>,
) -> Result<Json<OptimizationResult>, ApiError>
where
    S: PriceSource + Send + Sync + 'static,
{
    let Json(body) = payload.map_err(|e| PipelineError::InvalidRequest(e.body_text()))?;
    let request = body.request()?;
    Ok(Json(execute(&state, &request).await?))
}

pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
