//! End-to-end checks of sign-in, the access guard, and the API gateway
//! against a stand-in marketplace backend on an ephemeral port.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

use renewhire_portal::AppState;
use renewhire_portal::api::ApiError;
use renewhire_portal::api::types::Credentials;
use renewhire_portal::auth::{AuthError, Landing, UNKNOWN_ROLE_MESSAGE};
use renewhire_portal::config::{ApiConfig, AppConfig, ServerConfig, SessionBackend, SessionConfig};
use renewhire_portal::server::build_router;
use renewhire_portal::session::{CachedUser, MemorySessionStore, SessionStore};

// ─────────────────────────────────────────────────────────────────────────────
// Stand-in backend
// ─────────────────────────────────────────────────────────────────────────────

fn mint(role: &str, expires_in_secs: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + expires_in_secs;
    encode(
        &Header::default(),
        &json!({ "sub": "7", "role": role, "exp": exp }),
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap()
}

#[derive(Debug, Default)]
struct Backend {
    reject_sessions: AtomicBool,
    slow_jobs: AtomicBool,
    last_authorization: Mutex<Option<String>>,
}

impl Backend {
    /// Record the bearer and answer 401 when sessions are being rejected.
    fn admit(&self, headers: &HeaderMap) -> Result<(), Response> {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        *self.last_authorization.lock().unwrap() = auth;

        if self.reject_sessions.load(Ordering::SeqCst) {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "jwt expired" })),
            )
                .into_response());
        }
        Ok(())
    }

    fn last_authorization(&self) -> Option<String> {
        self.last_authorization.lock().unwrap().clone()
    }
}

async fn backend_login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    if email == "a@b.com" {
        // Minimal body: an opaque token and a user with nothing but its type.
        return Json(json!({ "token": "T", "user": { "user_type": "client" } })).into_response();
    }
    let account = match email {
        "client@renewhire.test" => Some(("client", "Cleo")),
        "engineer@renewhire.test" => Some(("engineer", "Eddie")),
        "admin@renewhire.test" => Some(("admin", "Ada")),
        "investor@renewhire.test" => Some(("investor", "Ivan")),
        "slow@renewhire.test" => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Some(("client", "Sam"))
        }
        _ => None,
    };

    match account {
        Some((role, name)) => Json(json!({
            "token": mint(role, 3600),
            "user": { "id": 7, "user_type": role, "name": name, "email": email }
        }))
        .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response(),
    }
}

async fn backend_metrics(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if let Err(rejected) = backend.admit(&headers) {
        return rejected;
    }
    Json(json!({ "active_jobs": 3, "open_bids": 5 })).into_response()
}

async fn backend_jobs(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if let Err(rejected) = backend.admit(&headers) {
        return rejected;
    }
    if backend.slow_jobs.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_secs(3)).await;
    }
    Json(json!([{
        "id": 1,
        "title": "Rooftop solar survey",
        "description": "Survey a 40 panel array",
        "location": "Leeds",
        "budget": 1200.0,
        "status": "open"
    }]))
    .into_response()
}

async fn backend_my_bids(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if let Err(rejected) = backend.admit(&headers) {
        return rejected;
    }
    Json(json!([])).into_response()
}

async fn spawn_backend() -> (String, Arc<Backend>) {
    let backend = Arc::new(Backend::default());
    let app = Router::new()
        .route("/api/auth/login", post(backend_login))
        .route("/api/dashboard/metrics", get(backend_metrics))
        .route("/api/jobs", get(backend_jobs))
        .route("/api/bids/my-bids", get(backend_my_bids))
        .with_state(Arc::clone(&backend));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), backend)
}

// ─────────────────────────────────────────────────────────────────────────────
// Portal under test
// ─────────────────────────────────────────────────────────────────────────────

struct Portal {
    app: Router,
    state: AppState,
    store: Arc<MemorySessionStore>,
    backend: Arc<Backend>,
}

impl Portal {
    async fn start() -> Self {
        Self::start_with_timeout(5).await
    }

    async fn start_with_timeout(timeout_secs: u64) -> Self {
        let (base_url, backend) = spawn_backend().await;
        let config = Arc::new(AppConfig {
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".into(),
                static_dir: "static".into(),
            },
            api: ApiConfig {
                base_url,
                timeout_secs,
            },
            session: SessionConfig {
                storage: SessionBackend::Memory,
                path: String::new(),
            },
        });
        let store = Arc::new(MemorySessionStore::new());
        let sessions: Arc<dyn SessionStore> = store.clone();
        let state = AppState::with_store(config, sessions).unwrap();
        Self {
            app: build_router(state.clone()),
            state,
            store,
            backend,
        }
    }

    fn sign_in_as(&self, role: &str, expires_in_secs: i64) -> String {
        let token = mint(role, expires_in_secs);
        self.store
            .save(&token, &CachedUser::new("7", role))
            .unwrap();
        token
    }

    async fn get(&self, uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn post_form(&self, uri: &str, body: &str, htmx: bool) -> Response {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if htmx {
            request = request.header("HX-Request", "true");
        }
        let request = request.body(Body::from(body.to_string())).unwrap();
        self.app.clone().oneshot(request).await.unwrap()
    }

    fn signed_in(&self) -> bool {
        self.store.read().unwrap().is_some()
    }
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn assert_redirected_to_login(response: &Response) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

// ─────────────────────────────────────────────────────────────────────────────
// Sign-in
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_client_login_lands_on_client_dashboard() {
    let portal = Portal::start().await;

    let response = portal
        .post_form(
            "/login",
            "email=client%40renewhire.test&password=pw",
            false,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/client/dashboard");

    let session = portal.store.read().unwrap().expect("session persisted");
    assert_eq!(session.user.role, "client");

    let response = portal.get("/client/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Cleo"));
    assert!(html.contains("Rooftop solar survey"));

    assert_eq!(
        portal.backend.last_authorization(),
        Some(format!("Bearer {}", session.token))
    );
}

#[tokio::test]
async fn test_minimal_login_response_stores_token_and_routes() {
    let portal = Portal::start().await;

    let response = portal
        .post_form("/login", "email=a%40b.com&password=x", false)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/client/dashboard");

    let session = portal.store.read().unwrap().expect("session persisted");
    assert_eq!(session.token, "T");
    assert_eq!(session.user.id, None);
}

#[tokio::test]
async fn test_each_role_lands_on_its_dashboard() {
    let portal = Portal::start().await;

    for (email, landing) in [
        ("client@renewhire.test", Landing::ClientDashboard),
        ("engineer@renewhire.test", Landing::EngineerDashboard),
        ("admin@renewhire.test", Landing::AdminDashboard),
    ] {
        let credentials = Credentials {
            email: email.into(),
            password: "pw".into(),
        };
        assert_eq!(portal.state.login.login(&credentials).await.unwrap(), landing);
    }
}

#[tokio::test]
async fn test_htmx_login_uses_hx_redirect() {
    let portal = Portal::start().await;

    let response = portal
        .post_form(
            "/login",
            "email=engineer%40renewhire.test&password=pw",
            true,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["HX-Redirect"], "/engineer/dashboard");
}

#[tokio::test]
async fn test_wrong_password_keeps_existing_session() {
    let portal = Portal::start().await;
    let token = portal.sign_in_as("client", 3600);

    let response = portal
        .post_form("/login", "email=nobody%40renewhire.test&password=pw", true)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("HX-Redirect").is_none());
    let html = body_text(response).await;
    assert!(html.contains("login-form"));
    assert!(html.contains("Invalid credentials"));

    assert_eq!(portal.store.read().unwrap().unwrap().token, token);
}

#[tokio::test]
async fn test_unknown_role_is_reported_and_not_persisted() {
    let portal = Portal::start().await;

    let response = portal
        .post_form(
            "/login",
            "email=investor%40renewhire.test&password=pw",
            false,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::LOCATION).is_none());
    assert!(body_text(response).await.contains(UNKNOWN_ROLE_MESSAGE));
    assert!(!portal.signed_in());
}

#[tokio::test]
async fn test_second_submit_while_in_flight_is_rejected() {
    let portal = Portal::start().await;
    let credentials = Credentials {
        email: "slow@renewhire.test".into(),
        password: "pw".into(),
    };

    let (first, second) = tokio::join!(
        portal.state.login.login(&credentials),
        portal.state.login.login(&credentials)
    );
    assert_eq!(first.unwrap(), Landing::ClientDashboard);
    assert!(matches!(second, Err(AuthError::LoginInFlight)));

    // The lock is released once the first attempt settles.
    assert!(portal.state.login.login(&credentials).await.is_ok());
}

#[tokio::test]
async fn test_logout_clears_session() {
    let portal = Portal::start().await;
    portal.sign_in_as("engineer", 3600);

    let response = portal.post_form("/logout", "", false).await;
    assert_redirected_to_login(&response);
    assert!(!portal.signed_in());

    assert_redirected_to_login(&portal.get("/engineer/dashboard").await);
}

// ─────────────────────────────────────────────────────────────────────────────
// Access guard
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_no_session_redirects_without_touching_backend() {
    let portal = Portal::start().await;

    assert_redirected_to_login(&portal.get("/client/dashboard").await);
    assert_redirected_to_login(&portal.get("/profile").await);
    assert_eq!(portal.backend.last_authorization(), None);
}

#[tokio::test]
async fn test_wrong_role_is_denied_and_session_cleared() {
    let portal = Portal::start().await;
    portal.sign_in_as("engineer", 3600);

    assert_redirected_to_login(&portal.get("/client/dashboard").await);
    assert!(!portal.signed_in());
}

#[tokio::test]
async fn test_expired_token_is_denied_and_session_cleared() {
    let portal = Portal::start().await;
    portal.sign_in_as("client", -60);

    assert_redirected_to_login(&portal.get("/client/dashboard").await);
    assert!(!portal.signed_in());
}

#[tokio::test]
async fn test_garbage_token_is_denied_and_session_cleared() {
    let portal = Portal::start().await;
    portal
        .store
        .save("not-a-jwt", &CachedUser::new("7", "client"))
        .unwrap();

    assert_redirected_to_login(&portal.get("/client/dashboard").await);
    assert!(!portal.signed_in());
}

#[tokio::test]
async fn test_token_role_wins_over_cached_user_role() {
    let portal = Portal::start().await;
    portal
        .store
        .save(&mint("engineer", 3600), &CachedUser::new("7", "client"))
        .unwrap();

    assert_redirected_to_login(&portal.get("/client/dashboard").await);
}

#[tokio::test]
async fn test_admin_cannot_open_jobs_board() {
    let portal = Portal::start().await;
    portal.sign_in_as("admin", 3600);

    assert_redirected_to_login(&portal.get("/jobs").await);
}

#[tokio::test]
async fn test_profile_open_to_every_role() {
    for role in ["client", "engineer", "admin"] {
        let portal = Portal::start().await;
        portal.sign_in_as(role, 3600);

        let response = portal.get("/profile").await;
        assert_eq!(response.status(), StatusCode::OK, "role {role}");
    }
}

#[tokio::test]
async fn test_htmx_denial_uses_hx_redirect() {
    let portal = Portal::start().await;

    let request = Request::builder()
        .uri("/admin/dashboard")
        .header("HX-Request", "true")
        .body(Body::empty())
        .unwrap();
    let response = portal.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["HX-Redirect"], "/login");
}

// ─────────────────────────────────────────────────────────────────────────────
// API gateway
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_backend_401_clears_session_and_redirects() {
    let portal = Portal::start().await;
    portal.sign_in_as("client", 3600);
    portal.backend.reject_sessions.store(true, Ordering::SeqCst);

    assert_redirected_to_login(&portal.get("/client/dashboard").await);
    assert!(!portal.signed_in());
}

#[tokio::test]
async fn test_slow_backend_times_out_and_keeps_session() {
    let portal = Portal::start_with_timeout(1).await;
    let token = portal.sign_in_as("client", 3600);
    portal.backend.slow_jobs.store(true, Ordering::SeqCst);

    let err = portal.state.api.jobs().list().await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout), "got {err:?}");
    assert_eq!(portal.store.read().unwrap().unwrap().token, token);

    let response = portal.get("/jobs").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("took too long"));
    assert!(portal.signed_in());
}

#[tokio::test]
async fn test_requests_without_session_carry_no_bearer() {
    let portal = Portal::start().await;

    portal.state.api.jobs().list().await.unwrap();
    assert_eq!(portal.backend.last_authorization(), None);

    let token = portal.sign_in_as("engineer", 3600);
    portal.state.api.bids().mine().await.unwrap();
    assert_eq!(
        portal.backend.last_authorization(),
        Some(format!("Bearer {token}"))
    );
}
