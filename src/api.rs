// REST API with Axum
// Read-only views over the loaded history. Every request classifies afresh.

use crate::classifier::resolve_suggestion;
use crate::grouping::{group_failures, group_messages, CategoryGroup};
use crate::stats::{CategorySummary, DashboardStats};
use crate::taxonomy::Taxonomy;
use crate::transaction::EscrowTransaction;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub transactions: Arc<Vec<EscrowTransaction>>,
    pub messages: Arc<Taxonomy>,
    pub failures: Arc<Taxonomy>,
}

impl AppState {
    pub fn new(transactions: Vec<EscrowTransaction>, messages: Taxonomy, failures: Taxonomy) -> Self {
        Self {
            transactions: Arc::new(transactions),
            messages: Arc::new(messages),
            failures: Arc::new(failures),
        }
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// One grouping bucket with its members
#[derive(Serialize)]
struct GroupResponse<'a> {
    #[serde(flatten)]
    summary: CategorySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
    transactions: Vec<&'a EscrowTransaction>,
}

impl<'a> From<&CategoryGroup<'a, EscrowTransaction>> for GroupResponse<'a> {
    fn from(group: &CategoryGroup<'a, EscrowTransaction>) -> Self {
        Self {
            summary: CategorySummary::from(group),
            color: group.category.color.as_deref(),
            transactions: group.items.clone(),
        }
    }
}

#[derive(Serialize)]
struct TaxonomiesResponse<'a> {
    messages: &'a Taxonomy,
    failures: &'a Taxonomy,
}

#[derive(Debug, Deserialize)]
struct ClassifyParams {
    #[serde(default)]
    text: String,
    /// `messages` (default) or `failures`
    #[serde(default)]
    kind: Option<String>,
    /// Externally suggested category name
    #[serde(default)]
    suggestion: Option<String>,
}

#[derive(Serialize)]
struct ClassifyResponse<'a> {
    taxonomy: &'a str,
    category: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    keyword: Option<&'a str>,
    fallback: bool,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/transactions - Full history
async fn get_transactions(State(state): State<AppState>) -> Response {
    Json(ApiResponse::ok(state.transactions.as_slice())).into_response()
}

/// GET /api/stats - Dashboard counters
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(DashboardStats::from_transactions(&state.transactions)))
}

/// GET /api/groups/messages - Transactions by message topic
async fn get_message_groups(State(state): State<AppState>) -> Response {
    let groups = group_messages(&state.transactions, &state.messages);
    let response: Vec<GroupResponse> = groups.iter().map(GroupResponse::from).collect();

    Json(ApiResponse::ok(response)).into_response()
}

/// GET /api/groups/failures - Failed transactions by reason
async fn get_failure_groups(State(state): State<AppState>) -> Response {
    let groups = group_failures(&state.transactions, &state.failures);
    let response: Vec<GroupResponse> = groups.iter().map(GroupResponse::from).collect();

    Json(ApiResponse::ok(response)).into_response()
}

/// GET /api/taxonomies - Both category tables
async fn get_taxonomies(State(state): State<AppState>) -> Response {
    Json(ApiResponse::ok(TaxonomiesResponse {
        messages: &state.messages,
        failures: &state.failures,
    }))
    .into_response()
}

/// GET /api/classify?text=..&kind=messages|failures&suggestion=..
async fn classify_text(
    State(state): State<AppState>,
    Query(params): Query<ClassifyParams>,
) -> Response {
    let taxonomy = match params.kind.as_deref().unwrap_or("messages") {
        "messages" => &state.messages,
        "failures" => &state.failures,
        other => {
            tracing::warn!(kind = other, "classify request with unknown taxonomy");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(format!("unknown taxonomy kind: {}", other))),
            )
                .into_response();
        }
    };

    let result = resolve_suggestion(taxonomy, params.suggestion.as_deref(), &params.text);

    Json(ApiResponse::ok(ClassifyResponse {
        taxonomy: taxonomy.name(),
        category: result.name(),
        keyword: result.keyword,
        fallback: result.is_fallback(),
    }))
    .into_response()
}

/// Build the `/api` router
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/transactions", get(get_transactions))
        .route("/stats", get(get_stats))
        .route("/groups/messages", get(get_message_groups))
        .route("/groups/failures", get(get_failure_groups))
        .route("/taxonomies", get(get_taxonomies))
        .route("/classify", get(classify_text))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TxStatus;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Utc;
    use serde_json::Value;
    use tower::ServiceExt;

    fn tx(id: &str, message: Option<&str>, status: TxStatus, error: Option<&str>) -> EscrowTransaction {
        EscrowTransaction {
            id: id.to_string(),
            tx_hash: None,
            recipient: "addr_test1qz".to_string(),
            amount_lovelace: 2_000_000,
            message: message.map(str::to_string),
            status,
            error_message: error.map(str::to_string),
            timestamp: Utc::now(),
        }
    }

    fn app() -> Router {
        let transactions = vec![
            tx("1", Some("Let's grab dinner"), TxStatus::Success, None),
            tx("2", Some("test payment"), TxStatus::Success, None),
            tx("3", Some("   "), TxStatus::Pending, None),
            tx("4", None, TxStatus::Failed, Some("Network timeout occurred")),
            tx("5", None, TxStatus::Failed, Some("Insufficient funds in wallet")),
        ];

        router(AppState::new(
            transactions,
            Taxonomy::message_topics(),
            Taxonomy::failure_reasons(),
        ))
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_transactions() {
        let (_, body) = get_json("/api/transactions").await;

        assert_eq!(body["data"].as_array().unwrap().len(), 5);
        assert_eq!(body["data"][0]["amountLovelace"], 2_000_000);
    }

    #[tokio::test]
    async fn test_stats() {
        let (_, body) = get_json("/api/stats").await;

        assert_eq!(body["data"]["total"], 5);
        assert_eq!(body["data"]["failed"], 2);
        assert_eq!(body["data"]["pending"], 1);
        assert_eq!(body["data"]["total_sent_lovelace"], 4_000_000);
    }

    #[tokio::test]
    async fn test_message_groups() {
        let (_, body) = get_json("/api/groups/messages").await;
        let groups = body["data"].as_array().unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["category"], "Payments & Purchases");
        assert_eq!(groups[1]["category"], "Food & Dining");
        assert_eq!(groups[1]["count"], 1);
        assert_eq!(groups[1]["transactions"][0]["id"], "1");
    }

    #[tokio::test]
    async fn test_failure_groups() {
        let (_, body) = get_json("/api/groups/failures").await;
        let groups = body["data"].as_array().unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["category"], "Network Issues");
        assert_eq!(groups[1]["category"], "Insufficient Funds");
    }

    #[tokio::test]
    async fn test_taxonomies() {
        let (_, body) = get_json("/api/taxonomies").await;

        assert_eq!(body["data"]["messages"]["name"], "messages");
        assert_eq!(body["data"]["failures"]["categories"][5]["name"], "Other Errors");
    }

    #[tokio::test]
    async fn test_classify() {
        let (status, body) =
            get_json("/api/classify?text=Network%20timeout%20occurred&kind=failures").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["category"], "Network Issues");
        assert_eq!(body["data"]["keyword"], "network");
        assert_eq!(body["data"]["fallback"], false);
    }

    #[tokio::test]
    async fn test_classify_with_suggestion() {
        let (_, body) = get_json("/api/classify?text=test%20payment&suggestion=Gifts%20%26%20Tips").await;

        assert_eq!(body["data"]["taxonomy"], "messages");
        assert_eq!(body["data"]["category"], "Gifts & Tips");
    }

    #[tokio::test]
    async fn test_classify_unknown_kind() {
        let (status, body) = get_json("/api/classify?text=hi&kind=bogus").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("bogus"));
    }
}
