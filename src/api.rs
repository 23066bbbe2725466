//! Remote API client.
//!
//! Thin typed wrapper over the rental backend's REST endpoints. The backend
//! owns authentication, persistence and business rules; this client only
//! carries the session token and maps responses into entities and
//! [`Mutation`]s for [`AppState`].

use crate::entities::{
    NewPayment, NewRoom, NewTenant, Payment, PaymentPatch, RecordedPayment, Room, RoomStatus,
    RoomUpdate, StatusChangeError, Tenant, TenantPatch,
};
use crate::state::{AppState, Mutation};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors from Remote API calls.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error(transparent)]
    StatusChange(#[from] StatusChangeError),

    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },
}

impl ApiError {
    /// True for 401/403 answers (expired or rejected token)
    pub fn is_unauthorized(&self) -> bool {
        match self {
            ApiError::NotAuthenticated => true,
            ApiError::Status { status, .. } => {
                *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
            }
            _ => false,
        }
    }
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// The user returned by `POST /login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: String,
}

/// A logged-in session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Session {
    #[serde(rename = "access_token")]
    pub token: String,
    pub user: Option<User>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Error bodies look like `{"error": "..."}` or `{"message": "..."}`.
#[derive(Deserialize, Default)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Client for the Remote API.
#[derive(Debug, Clone)]
pub struct RemoteApi {
    base_url: String,
    client: reqwest::Client,
    session: Option<Session>,
}

impl RemoteApi {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:5555`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            session: None,
        })
    }

    /// Reuse a token obtained earlier.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.session = Some(Session {
            token: token.into(),
            user: None,
        });
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn logout(&mut self) {
        self.session = None;
    }

    // ============= Session =============

    /// `POST /login` - stores the returned token for later calls.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session> {
        let response = self
            .client
            .post(self.url("/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let session: Session = decode(response).await?;
        tracing::info!(
            user = session.user.as_ref().map(|u| u.email.as_str()).unwrap_or(email),
            "logged in"
        );
        Ok(self.session.insert(session))
    }

    // ============= Rooms =============

    pub async fn list_rooms(&self) -> Result<Vec<Room>> {
        self.send(Method::GET, "/rooms", None::<&()>).await
    }

    pub async fn create_room(&self, room: &NewRoom) -> Result<Room> {
        self.send(Method::POST, "/rooms", Some(room)).await
    }

    pub async fn update_room(&self, room_id: i64, update: &RoomUpdate) -> Result<Room> {
        self.send(Method::PUT, &format!("/rooms/{}", room_id), Some(update)).await
    }

    pub async fn assign_tenant(&self, room_id: i64, tenant_id: i64) -> Result<Room> {
        self.update_room(room_id, &RoomUpdate::assign(tenant_id)).await
    }

    pub async fn vacate_room(&self, room_id: i64) -> Result<Room> {
        self.update_room(room_id, &RoomUpdate::vacate()).await
    }

    /// Refused locally (nothing is sent) when the change would split status from tenant.
    pub async fn set_room_status(&self, room: &Room, status: RoomStatus) -> Result<Room> {
        let update = RoomUpdate::status_change(room, status)?;
        self.update_room(room.id, &update).await
    }

    pub async fn delete_room(&self, room_id: i64) -> Result<()> {
        self.send_unit(Method::DELETE, &format!("/rooms/{}", room_id), None::<&()>).await
    }

    // ============= Tenants =============

    pub async fn list_tenants(&self) -> Result<Vec<Tenant>> {
        self.send(Method::GET, "/tenants", None::<&()>).await
    }

    pub async fn create_tenant(&self, tenant: &NewTenant) -> Result<Tenant> {
        self.send(Method::POST, "/tenants", Some(tenant)).await
    }

    /// `PATCH /tenants/{id}` answers with a message only.
    pub async fn update_tenant(&self, tenant_id: i64, patch: &TenantPatch) -> Result<()> {
        self.send_unit(Method::PATCH, &format!("/tenants/{}", tenant_id), Some(patch)).await
    }

    pub async fn delete_tenant(&self, tenant_id: i64) -> Result<()> {
        self.send_unit(Method::DELETE, &format!("/tenants/{}", tenant_id), None::<&()>).await
    }

    // ============= Payments =============

    pub async fn list_payments(&self) -> Result<Vec<Payment>> {
        self.send(Method::GET, "/payments", None::<&()>).await
    }

    pub async fn record_payment(&self, payment: &NewPayment) -> Result<(Payment, Option<Room>)> {
        let recorded: RecordedPayment = self.send(Method::POST, "/payments", Some(payment)).await?;
        Ok(recorded.into_parts())
    }

    pub async fn update_payment(&self, payment_id: i64, patch: &PaymentPatch) -> Result<Payment> {
        self.send(Method::PUT, &format!("/payments/{}", payment_id), Some(patch)).await
    }

    // ============= Whole dashboard =============

    /// Fetch the three collections concurrently.
    pub async fn load_all(&self) -> Result<AppState> {
        let (rooms, tenants, payments) =
            tokio::try_join!(self.list_rooms(), self.list_tenants(), self.list_payments())?;

        tracing::info!(
            rooms = rooms.len(),
            tenants = tenants.len(),
            payments = payments.len(),
            "dashboard loaded"
        );
        Ok(AppState::new(rooms, tenants, payments))
    }

    /// Fetch the three collections as a [`Mutation::Loaded`].
    pub async fn reload(&self) -> Result<Mutation> {
        let state = self.load_all().await?;
        Ok(Mutation::Loaded {
            rooms: state.rooms,
            tenants: state.tenants,
            payments: state.payments,
        })
    }

    // ============= Plumbing =============

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let session = self.session.as_ref().ok_or(ApiError::NotAuthenticated)?;
        tracing::debug!(%method, path, "remote api request");
        Ok(self
            .client
            .request(method, self.url(path))
            .bearer_auth(&session.token))
    }

    async fn dispatch<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let mut request = self.request(method, path)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.dispatch(method, path, body).await?;
        decode(response).await
    }

    async fn send_unit<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let response = self.dispatch(method, path, body).await?;
        check_status(response).await.map(|_| ())
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = body
        .error
        .or(body.message)
        .unwrap_or_else(|| {
            if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text.trim().to_string()
            }
        });

    tracing::warn!(%status, %message, "remote api rejected request");
    Err(ApiError::Status { status, message })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
