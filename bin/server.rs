// Serene Manager - Dashboard Web Server
// Read-only JSON views over the Remote API, plus a single-page dashboard

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use serene_manager::{logging, AppState, Config, PaymentRow, PortfolioSummary, RemoteApi, TenantBalance};

/// Shared server state
struct ServerState {
    api: RemoteApi,
    data: RwLock<AppState>,
    currency: String,
}

type Shared = Arc<ServerState>;

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
        .into_response()
    }
}

fn failure(status: StatusCode, error: impl ToString) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        data: None,
        error: Some(error.to_string()),
    };
    (status, Json(body)).into_response()
}

#[derive(Serialize)]
struct BalancesResponse {
    as_of: NaiveDate,
    currency: String,
    balances: Vec<TenantBalance>,
}

#[derive(Serialize)]
struct RefreshResponse {
    rooms: usize,
    tenants: usize,
    payments: usize,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> Response {
    ApiResponse::ok("OK")
}

/// GET /api/rooms
async fn get_rooms(State(state): State<Shared>) -> Response {
    ApiResponse::ok(state.data.read().await.rooms.clone())
}

/// GET /api/tenants
async fn get_tenants(State(state): State<Shared>) -> Response {
    ApiResponse::ok(state.data.read().await.tenants.clone())
}

/// GET /api/payments
async fn get_payments(State(state): State<Shared>) -> Response {
    ApiResponse::ok(state.data.read().await.payments.clone())
}

/// GET /api/balances - One balance per tenant, as of today
async fn get_balances(State(state): State<Shared>) -> Response {
    let as_of = today();
    let balances = state.data.read().await.balances(as_of);

    ApiResponse::ok(BalancesResponse {
        as_of,
        currency: state.currency.clone(),
        balances,
    })
}

/// GET /api/summary - Collections, arrears, credit, occupancy
async fn get_summary(State(state): State<Shared>) -> Response {
    let summary: PortfolioSummary = state.data.read().await.summary(today());
    ApiResponse::ok(summary)
}

/// GET /api/history - Payment history, newest first
async fn get_history(State(state): State<Shared>) -> Response {
    let rows: Vec<PaymentRow> = state.data.read().await.payment_history();
    ApiResponse::ok(rows)
}

/// POST /api/refresh - Reload everything from the Remote API
async fn refresh(State(state): State<Shared>) -> Response {
    match state.api.load_all().await {
        Ok(fresh) => {
            let counts = RefreshResponse {
                rooms: fresh.rooms.len(),
                tenants: fresh.tenants.len(),
                payments: fresh.payments.len(),
            };
            *state.data.write().await = fresh;
            ApiResponse::ok(counts)
        }
        Err(err) => {
            tracing::warn!(error = %err, "refresh failed");
            let status = if err.is_unauthorized() {
                StatusCode::UNAUTHORIZED
            } else {
                StatusCode::BAD_GATEWAY
            };
            failure(status, err)
        }
    }
}

/// GET / - Serve the dashboard page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

async fn not_found() -> Response {
    failure(StatusCode::NOT_FOUND, "no such endpoint")
}

fn router(state: Shared) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/rooms", get(get_rooms))
        .route("/tenants", get(get_tenants))
        .route("/payments", get(get_payments))
        .route("/balances", get(get_balances))
        .route("/summary", get(get_summary))
        .route("/history", get(get_history))
        .route("/refresh", post(refresh))
        .fallback(not_found)
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    logging::init(std::env::var("SERENE_VERBOSE").is_ok());

    println!("🌐 Serene Manager - Dashboard Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut api = RemoteApi::new(config.api.url.clone(), config.api.timeout())?;
    match (std::env::var("SERENE_TOKEN").ok(), config.api.credentials()) {
        (Some(token), _) => api = api.with_token(token),
        (None, Some((email, password))) => {
            api.login(email, password)
                .await
                .with_context(|| format!("Login to {} failed", config.api.url))?;
        }
        (None, None) => {
            eprintln!("❌ No credentials for {}", config.api.url);
            eprintln!("   Set SERENE_EMAIL and SERENE_PASSWORD (or SERENE_TOKEN)");
            std::process::exit(1);
        }
    }
    println!("✓ Signed in to {}", config.api.url);

    // A backend that is down at startup should not keep the dashboard down
    let initial = match api.load_all().await {
        Ok(state) => {
            println!(
                "✓ Loaded {} rooms, {} tenants, {} payments",
                state.rooms.len(),
                state.tenants.len(),
                state.payments.len()
            );
            state
        }
        Err(err) => {
            tracing::warn!(error = %err, "initial load failed, starting empty");
            println!("⚠️  Initial load failed ({}); POST /api/refresh to retry", err);
            AppState::default()
        }
    };

    let state = Arc::new(ServerState {
        api,
        data: RwLock::new(initial),
        currency: config.display.currency.clone(),
    });

    let addr = config.server.addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/balances", addr);
    println!("   UI:  http://{}", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, router(state))
        .await
        .context("Server stopped unexpectedly")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serene_manager::{Payment, Room, RoomStatus, Tenant};
    use std::time::Duration;
    use tower::ServiceExt;

    fn shared() -> Shared {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day);
        let state = AppState::new(
            vec![Room {
                id: 1,
                room_number: "A-1".to_string(),
                status: RoomStatus::Occupied,
                rent_amount: 10000.0,
                room_type: "single".to_string(),
                tenant_id: Some(1),
            }],
            vec![Tenant {
                id: 1,
                name: "Amina".to_string(),
                email: "amina@example.com".to_string(),
                phone: String::new(),
                moving_in_date: d(2025, 1, 15),
            }],
            vec![Payment {
                id: 1,
                tenant_id: 1,
                room_id: Some(1),
                payment_price: 10000.0,
                payment_date: d(2025, 2, 1),
            }],
        );

        Arc::new(ServerState {
            // Nothing listens here; only /api/refresh talks to it
            api: RemoteApi::new("http://127.0.0.1:9", Duration::from_secs(1))
                .unwrap()
                .with_token("test-token"),
            data: RwLock::new(state),
            currency: "KSh".to_string(),
        })
    }

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(router(shared()), "GET", "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_balances_and_history() {
        let (status, body) = call(router(shared()), "GET", "/api/balances").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["currency"], "KSh");
        assert_eq!(body["data"]["balances"][0]["tenant_name"], "Amina");
        assert_eq!(body["data"]["balances"][0]["total_paid"], 10000.0);

        let (_, body) = call(router(shared()), "GET", "/api/history").await;
        assert_eq!(body["data"][0]["room_number"], "A-1");
    }

    #[tokio::test]
    async fn test_summary() {
        let (status, body) = call(router(shared()), "GET", "/api/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_collections"], 10000.0);
        assert_eq!(body["data"]["occupancy"]["occupied"], 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_state() {
        let state = shared();
        let (status, body) = call(router(state.clone()), "POST", "/api/refresh").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
        assert_eq!(state.data.read().await.rooms.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_endpoint() {
        let (status, body) = call(router(shared()), "GET", "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "no such endpoint");
    }
}
