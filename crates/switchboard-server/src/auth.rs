// ABOUTME: API-key authentication for the switchboard API.
// ABOUTME: Compares the raw Authorization header to the configured key on /api/* routes; /health is exempt.

use axum::Json;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Detail message returned with every rejection.
pub const INVALID_API_KEY: &str = "Invalid api key";

/// Why a request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid api key")]
    InvalidApiKey,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "detail": INVALID_API_KEY })),
        )
            .into_response()
    }
}

/// Accept only a presented credential that equals `api_key` exactly.
/// Absence is checked before comparison; both fail the same way.
pub fn authenticate(presented: Option<&str>, api_key: &str) -> Result<(), AuthError> {
    let Some(presented) = presented else {
        return Err(AuthError::InvalidApiKey);
    };
    if presented != api_key {
        return Err(AuthError::InvalidApiKey);
    }
    Ok(())
}

/// A tower Layer that applies API-key authentication to API routes.
#[derive(Clone)]
pub struct AuthLayer {
    api_key: Arc<String>,
}

impl AuthLayer {
    /// Create a new AuthLayer with the expected api key.
    pub fn new(api_key: String) -> Self {
        Self {
            api_key: Arc::new(api_key),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            api_key: Arc::clone(&self.api_key),
        }
    }
}

/// The middleware service that checks the api key on /api/* routes.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    api_key: Arc<String>,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let path = req.uri().path();

        // Only authenticate /api and /api/* routes
        if !(path == "/api" || path.starts_with("/api/")) {
            let mut inner = self.inner.clone();
            return Box::pin(async move { inner.call(req).await });
        }

        let presented = req
            .headers()
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        match authenticate(presented, &self.api_key) {
            Ok(()) => {
                let mut inner = self.inner.clone();
                Box::pin(async move { inner.call(req).await })
            }
            Err(err) => {
                tracing::warn!(
                    path = %req.uri().path(),
                    header_present = presented.is_some(),
                    "rejected request with invalid api key"
                );
                Box::pin(async move { Ok(err.into_response()) })
            }
        }
    }
}
