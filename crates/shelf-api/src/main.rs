//! HTTP API server for studyshelf.

mod handlers;

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use governor::{Quota, RateLimiter};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use uuid::Uuid;

use shelf_db::{Database, FilesystemBackend, StorageBackend};

use handlers::{
    auth::{login, logout},
    document_types::{
        create_document_type, delete_document_type, ensure_document_type, list_document_types,
    },
    entrance_exams::{delete_entrance_exam, list_entrance_exams, upload_entrance_exam},
    notes::{delete_note, list_notes, upload_note},
    taxonomy::{
        create_chapter, create_class, create_subject, delete_chapter, delete_class,
        delete_subject, list_chapters, list_classes, list_subjects,
    },
};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically, which keeps
/// log correlation cheap when chasing a request across layers.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Global rate limiter type (direct quota, no keyed bucketing).
type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    db: Database,
    /// PDF blob storage.
    storage: Arc<FilesystemBackend>,
    /// Global rate limiter (None if rate limiting is disabled).
    rate_limiter: Option<Arc<GlobalRateLimiter>>,
    /// Admin login email.
    admin_email: String,
    /// Argon2 PHC hash of the admin password.
    admin_password_hash: String,
    /// Session lifetime in seconds.
    session_ttl_secs: i64,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug)]
enum ApiError {
    Database(shelf_core::Error),
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl From<shelf_core::Error> for ApiError {
    fn from(err: shelf_core::Error) -> Self {
        match &err {
            shelf_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            shelf_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            shelf_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg.clone()),
            shelf_core::Error::Database(sqlx_err) => {
                let msg = sqlx_err.to_string();
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    let friendly_msg = if msg.contains("idx_document_type_name_chapter") {
                        "A document type with this name already exists in the chapter".to_string()
                    } else {
                        msg
                    };
                    return ApiError::Conflict(friendly_msg);
                }
                if msg.contains("foreign key") {
                    return ApiError::BadRequest(msg);
                }
                ApiError::Database(err)
            }
            _ => ApiError::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            warn!("Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "rate_limit_exceeded",
                    "error_description": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}

/// Extract the bearer token from an Authorization header.
fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Require a valid admin session for all mutating requests.
///
/// Reads pass through unauthenticated; the catalog is public content. The
/// login route must stay reachable or nobody could ever obtain a session.
async fn require_admin(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<axum::response::Response, ApiError> {
    let method = request.method();
    if method == Method::GET || method == Method::HEAD || method == Method::OPTIONS {
        return Ok(next.run(request).await);
    }
    if request.uri().path() == "/api/auth/login" {
        return Ok(next.run(request).await);
    }

    let token = bearer_token(request.headers())
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    if !state.db.sessions.verify(token).await? {
        return Err(ApiError::Unauthorized(
            "Invalid or expired session".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

// =============================================================================
// HEALTH CHECK AND FILE SERVING
// =============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    shelf_db::log_pool_metrics(&state.db.pool);
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Serve a stored PDF blob.
async fn serve_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Storage paths are always relative and never contain parent traversal.
    if path.contains("..") || path.starts_with('/') {
        return Err(ApiError::BadRequest("Invalid file path".to_string()));
    }

    let data = state
        .storage
        .read(&path)
        .await
        .map_err(|_| ApiError::NotFound(format!("File {} not found", path)))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        ],
        data,
    ))
}

// =============================================================================
// CONFIGURATION
// =============================================================================

fn parse_allowed_origins() -> Vec<HeaderValue> {
    let origins_str = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://localhost:3000".to_string());

    origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   RUST_LOG    - standard env filter (default: "shelf_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shelf_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("shelf-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();
        }
        Some(guard)
    } else if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
        None
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Get configuration from environment
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/studyshelf".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "4000".to_string())
        .parse()
        .unwrap_or(4000);

    // Admin credentials. The server refuses to start without them since every
    // mutation requires a session.
    let admin_email = std::env::var("ADMIN_EMAIL")
        .map_err(|_| anyhow::anyhow!("ADMIN_EMAIL must be set"))?;
    let admin_password_hash = std::env::var("ADMIN_PASSWORD_HASH")
        .map_err(|_| anyhow::anyhow!("ADMIN_PASSWORD_HASH must be set (argon2 PHC string)"))?;
    let session_ttl_secs: i64 = std::env::var("SESSION_TTL_SECS")
        .unwrap_or_else(|_| "86400".to_string())
        .parse()
        .unwrap_or(86400);

    // Rate limiting configuration
    // RATE_LIMIT_REQUESTS: requests per period (default: 100)
    // RATE_LIMIT_PERIOD_SECS: period in seconds (default: 60)
    let rate_limit_requests: u64 = std::env::var("RATE_LIMIT_REQUESTS")
        .unwrap_or_else(|_| "100".to_string())
        .parse()
        .unwrap_or(100);
    let rate_limit_period_secs: u64 = std::env::var("RATE_LIMIT_PERIOD_SECS")
        .unwrap_or_else(|_| "60".to_string())
        .parse()
        .unwrap_or(60);
    let rate_limit_enabled: bool = std::env::var("RATE_LIMIT_ENABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(true);

    info!(
        "Rate limiting: {} ({} requests per {} seconds)",
        if rate_limit_enabled {
            "enabled"
        } else {
            "disabled"
        },
        rate_limit_requests,
        rate_limit_period_secs
    );

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    // Initialize file storage
    let file_storage_path = std::env::var("FILE_STORAGE_PATH")
        .unwrap_or_else(|_| "/var/lib/studyshelf/files".to_string());
    let storage = Arc::new(FilesystemBackend::new(&file_storage_path));
    storage
        .validate()
        .await
        .map_err(|e| anyhow::anyhow!("File storage validation failed: {}", e))?;
    info!("File storage initialized at {}", file_storage_path);

    // Periodic session cleanup
    {
        let purge_db = db.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
            loop {
                interval.tick().await;
                if let Err(e) = purge_db.sessions.purge_expired().await {
                    warn!(error = %e, "Session purge failed");
                }
            }
        });
    }

    // Create rate limiter if enabled
    let rate_limiter = if rate_limit_enabled {
        let quota = Quota::with_period(std::time::Duration::from_secs(rate_limit_period_secs))
            .ok_or_else(|| anyhow::anyhow!("Rate limit period must be non-zero"))?
            .allow_burst(
                NonZeroU32::new(rate_limit_requests as u32)
                    .ok_or_else(|| anyhow::anyhow!("Rate limit must be non-zero"))?,
            );
        Some(Arc::new(RateLimiter::direct(quota)))
    } else {
        None
    };

    // Create app state
    let state = AppState {
        db,
        storage,
        rate_limiter,
        admin_email,
        admin_password_hash,
        session_ttl_secs,
    };

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Admin sessions
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        // Taxonomy
        .route("/api/classes", get(list_classes).post(create_class))
        .route("/api/classes/:id", delete(delete_class))
        .route("/api/subjects", get(list_subjects).post(create_subject))
        .route("/api/subjects/:id", delete(delete_subject))
        .route("/api/chapters", get(list_chapters).post(create_chapter))
        .route("/api/chapters/:id", delete(delete_chapter))
        // Document types
        .route(
            "/api/document-types",
            get(list_document_types).post(create_document_type),
        )
        .route("/api/document-types/ensure", post(ensure_document_type))
        .route("/api/document-types/:id", delete(delete_document_type))
        // Notes and past papers
        .route("/api/notes", get(list_notes).post(upload_note))
        .route("/api/notes/:id", delete(delete_note))
        // Entrance exams
        .route(
            "/api/entrance-exams",
            get(list_entrance_exams).post(upload_entrance_exam),
        )
        .route("/api/entrance-exams/:id", delete(delete_entrance_exam))
        // Stored PDFs
        .route("/files/*path", get(serve_file))
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer({
            let allowed_origins = parse_allowed_origins();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600))
        })
        // PDF uploads cap at 25MB; leave headroom for multipart framing.
        .layer(RequestBodyLimitLayer::new(30 * 1024 * 1024))
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = axum::http::HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(header::AUTHORIZATION, "Basic dXNlcg==".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_api_error_maps_not_found() {
        let err = ApiError::from(shelf_core::Error::NotFound("Class x not found".into()));
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_api_error_maps_invalid_input_to_bad_request() {
        let err = ApiError::from(shelf_core::Error::InvalidInput("bad".into()));
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_api_error_response_shape() {
        let response = ApiError::Conflict("duplicate".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_request_id_is_uuid() {
        let mut maker = MakeRequestUuidV7;
        let req = axum::http::Request::builder().body(()).unwrap();
        let id = maker.make_request_id(&req).unwrap();
        let parsed = Uuid::parse_str(id.header_value().to_str().unwrap()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }
}
