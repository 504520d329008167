use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::{
    error::AppError,
    models::ConversationTurn,
    services::{
        classifier::{self, Classification},
        prompts,
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate-context", post(generate_context))
        .route("/generate-analysis", post(generate_analysis))
        .route("/chat", post(chat))
        .route("/generate-chart-legend", post(generate_chart_legend))
}

#[derive(Debug, Deserialize)]
pub struct ContextRequest {
    #[serde(default)]
    datos: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    datos: Vec<Value>,
    #[serde(default)]
    stats: Map<String, Value>,
    #[serde(default)]
    context: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    message: String,
    #[serde(default)]
    history: Vec<ConversationTurn>,
    #[serde(rename = "analysisContext")]
    analysis_context: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LegendRequest {
    #[serde(rename = "chartType", default)]
    chart_type: String,
    #[serde(default)]
    context: String,
    #[serde(default)]
    datos: Vec<Value>,
    #[serde(default)]
    stats: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct ContextResponse {
    context: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    analysis: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    reply: String,
}

#[derive(Debug, Serialize)]
pub struct LegendResponse {
    legend: String,
}

async fn generate_context(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ContextRequest>,
) -> Result<Json<ContextResponse>, AppError> {
    if request.datos.is_empty() {
        return Err(AppError::InvalidInput(
            "No se proporcionaron datos".to_string(),
        ));
    }

    tracing::info!("Generating context for {} values", request.datos.len());

    let (prompt, fallback) = match classifier::classify(&request.datos) {
        Classification::NumericInteger(summary) => (
            prompts::numeric_context(&summary, true),
            "Conjunto de datos para análisis.",
        ),
        Classification::NumericDecimal(summary) => (
            prompts::numeric_context(&summary, false),
            "Conjunto de datos para análisis.",
        ),
        Classification::Categorical => (
            prompts::categorical_context(&request.datos),
            "Datos para análisis.",
        ),
    };

    let context = state
        .gemini
        .generate(&prompt, None)
        .await?
        .unwrap_or_else(|| fallback.to_string());

    Ok(Json(ContextResponse { context }))
}

async fn generate_analysis(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    tracing::info!(
        "Generating analysis narrative for {} values",
        request.datos.len()
    );

    let prompt = prompts::analysis(&request.datos, &request.stats, &request.context);

    let analysis = state
        .gemini
        .generate(&prompt, None)
        .await?
        .unwrap_or_else(|| "Análisis completado.".to_string());

    Ok(Json(AnalysisResponse { analysis }))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    tracing::info!("Chat request with {} history turns", request.history.len());

    let system = prompts::chat_system(request.analysis_context.as_deref());
    let prompt = prompts::chat_prompt(&request.history, &request.message);

    let reply = state
        .gemini
        .generate(&prompt, Some(&system))
        .await?
        .unwrap_or_else(|| "Lo siento, no pude procesar tu mensaje.".to_string());

    Ok(Json(ChatResponse { reply }))
}

// Legacy endpoint kept for older front-end builds: it answers 200 with an
// empty legend on any failure instead of surfacing an error.
async fn generate_chart_legend(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<LegendRequest>>,
) -> Json<LegendResponse> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();

    let prompt = match prompts::legend(
        &request.chart_type,
        &request.datos,
        &request.stats,
        &request.context,
    ) {
        Some(prompt) => prompt,
        None => {
            tracing::info!("Unknown chart type '{}', returning empty legend", request.chart_type);
            return Json(LegendResponse {
                legend: String::new(),
            });
        }
    };

    let legend = match state.gemini.generate(&prompt, None).await {
        Ok(text) => text.unwrap_or_default(),
        Err(err) => {
            tracing::error!("Legend generation failed, returning empty legend: {}", err);
            String::new()
        }
    };

    Json(LegendResponse { legend })
}
