//! API routes
//!
//! - `/api/auth`: login, logout, registration, current officer
//! - `/api/admin`: officer back office, behind the session guard
//! - `/api/public`: citizen-facing reads and comments

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::extractors::AppState;
use crate::handlers::{self, activities, auth, documents, feedback, projects, statistics};
use crate::middleware::require_session;

/// Create the complete API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/auth", auth_router(&state))
        .nest("/api/admin", admin_router(&state))
        .nest("/api/public", public_router())
        .fallback(handlers::not_found)
        .with_state(state)
}

fn auth_router(state: &AppState) -> Router<AppState> {
    let session_only = Router::new()
        .route("/me", get(auth::me))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/register", post(auth::register))
        .merge(session_only)
}

fn admin_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/projects", get(projects::list).post(projects::create))
        .route("/projects/:id", get(projects::get).put(projects::update))
        .route("/projects/:id/documents", post(documents::upload))
        .route("/projects/:id/status-updates", post(feedback::create_status_update))
        .route("/activities/:id", delete(activities::delete))
        .route(
            "/documents/:id",
            delete(documents::delete).patch(documents::set_visibility),
        )
        .route("/statistics", get(statistics::show))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session))
}

fn public_router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(projects::list_public))
        .route("/projects/:id", get(projects::get_public))
        .route("/projects/:id/status-updates", get(feedback::list_status_updates))
        .route(
            "/projects/:id/comments",
            get(feedback::list_comments).post(feedback::create_comment),
        )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use cw_auth::{MemorySessionStore, Session, SessionStore};
    use cw_core::config::AppConfig;
    use cw_db::MemoryStore;
    use cw_storage::MemoryStorage;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::extractors::Backends;

    const PDF_BASE64: &str = "data:application/pdf;base64,JVBERi0xLjQK";

    struct TestApp {
        router: Router,
        sessions: Arc<MemorySessionStore>,
        storage: Arc<MemoryStorage>,
    }

    fn test_app(config: AppConfig) -> TestApp {
        let store = Arc::new(MemoryStore::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let storage = Arc::new(MemoryStorage::new());
        let backends = Backends {
            projects: store.clone(),
            feedback: store.clone(),
            officers: store,
            sessions: sessions.clone(),
            storage: storage.clone(),
        };
        TestApp {
            router: router(AppState::new(backends, &config)),
            sessions,
            storage,
        }
    }

    fn app() -> TestApp {
        test_app(AppConfig::default())
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn sign_in(router: &Router) -> String {
        let credentials = json!({ "email": "clerk@city.example", "password": "correct horse" });
        let (status, _) = send(router, json_request("POST", "/api/auth/register", None, credentials.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = send(router, json_request("POST", "/api/auth/login", None, credentials)).await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    fn road_repair() -> Value {
        json!({
            "name": "Main Street resurfacing",
            "code": "RD-001",
            "department": "Public Works",
            "budget": "12,500",
            "status": "in_progress",
            "activities": [
                { "description": "" },
                { "description": "Resurface", "start_date": "2026-01-01", "end_date": "2026-02-01" }
            ],
            "documents": [
                { "name": "Tender", "content": PDF_BASE64, "is_public": true },
                { "name": "Internal memo", "content": PDF_BASE64, "is_public": false }
            ]
        })
    }

    #[tokio::test]
    async fn test_admin_rejects_missing_token() {
        let app = app();
        let (status, body) = send(&app.router, get_request("/api/admin/projects", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_admin_rejects_unknown_token() {
        let app = app();
        let (status, _) = send(&app.router, get_request("/api/admin/statistics", Some("forged"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_rejects_expired_session() {
        let app = app();
        let session = Session::new(1, "clerk@city.example", None, -60);
        let token = session.id.clone();
        app.sessions.set(session).await.unwrap();

        let (status, body) = send(&app.router, get_request("/api/admin/projects", Some(&token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Session expired");
    }

    #[tokio::test]
    async fn test_login_sets_cookie_and_cookie_authenticates() {
        let app = app();
        sign_in(&app.router).await;

        let credentials = json!({ "email": "CLERK@city.example", "password": "correct horse" });
        let response = app
            .router
            .clone()
            .oneshot(json_request("POST", "/api/auth/login", None, credentials))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("cw_session="));
        let pair = cookie.split(';').next().unwrap().to_string();

        let request = Request::builder()
            .uri("/api/auth/me")
            .header(header::COOKIE, pair)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "clerk@city.example");
        assert!(body["data"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_is_generic() {
        let app = app();
        sign_in(&app.router).await;

        let (status, body) = send(
            &app.router,
            json_request(
                "POST",
                "/api/auth/login",
                None,
                json!({ "email": "clerk@city.example", "password": "wrong password" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let app = app();
        let token = sign_in(&app.router).await;

        let (status, _) = send(&app.router, json_request("POST", "/api/auth/logout", Some(&token), json!({}))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app.router, get_request("/api/auth/me", Some(&token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_registration_can_be_disabled() {
        let mut config = AppConfig::default();
        config.auth.self_registration = false;
        let app = test_app(config);

        let (status, _) = send(
            &app.router,
            json_request(
                "POST",
                "/api/auth/register",
                None,
                json!({ "email": "clerk@city.example", "password": "correct horse" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_and_get_project() {
        let app = app();
        let token = sign_in(&app.router).await;

        let (status, body) = send(
            &app.router,
            json_request("POST", "/api/admin/projects", Some(&token), road_repair()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        let id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(body["data"]["budget"], 12500.0);
        assert_eq!(body["data"]["activities"].as_array().unwrap().len(), 1);
        assert_eq!(app.storage.keys().await.len(), 2);

        let (status, body) = send(
            &app.router,
            get_request(&format!("/api/admin/projects/{}", id), Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["code"], "RD-001");
        assert_eq!(body["data"]["documents"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_project_fields_round_trip_over_http() {
        let app = app();
        let token = sign_in(&app.router).await;
        let fields = json!({
            "name": "Harbour wall",
            "code": "HW-7",
            "department": "Public Works",
            "location": "North pier",
            "objective": "Stop winter flooding",
            "category": "Infrastructure",
            "budget": 250000.0,
            "responsible_person": "A. Keller",
            "contact": "works@town.gov",
            "start_date": "2026-04-01",
            "end_date": "2026-10-31",
            "status": "suspended"
        });

        let (status, body) = send(
            &app.router,
            json_request("POST", "/api/admin/projects", Some(&token), fields.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["data"]["id"].as_i64().unwrap();

        let check = |project: &Value, expected: &Value| {
            for (key, value) in expected.as_object().unwrap() {
                assert_eq!(&project[key], value, "{}", key);
            }
        };
        let (_, body) = send(
            &app.router,
            get_request(&format!("/api/admin/projects/{}", id), Some(&token)),
        )
        .await;
        check(&body["data"], &fields);
        let (_, body) = send(&app.router, get_request("/api/admin/projects", Some(&token))).await;
        check(&body["data"][0], &fields);

        let changed = json!({
            "name": "Harbour wall phase 2",
            "code": "HW-8",
            "department": "Harbour Office",
            "location": "South pier",
            "objective": "Raise the wall",
            "category": "Coastal",
            "budget": 90000.0,
            "responsible_person": "B. Osei",
            "contact": "+31 20 555 0100",
            "start_date": "2027-01-15",
            "end_date": "2027-06-30",
            "status": "completed"
        });
        let (status, _) = send(
            &app.router,
            json_request(
                "PUT",
                &format!("/api/admin/projects/{}", id),
                Some(&token),
                changed.clone(),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(
            &app.router,
            get_request(&format!("/api/admin/projects/{}", id), Some(&token)),
        )
        .await;
        check(&body["data"], &changed);
    }

    #[tokio::test]
    async fn test_public_view_hides_private_documents() {
        let app = app();
        let token = sign_in(&app.router).await;
        let (_, body) = send(
            &app.router,
            json_request("POST", "/api/admin/projects", Some(&token), road_repair()),
        )
        .await;
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = send(&app.router, get_request(&format!("/api/public/projects/{}", id), None)).await;
        assert_eq!(status, StatusCode::OK);
        let documents = body["data"]["documents"].as_array().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0]["name"], "Tender");
        assert!(documents[0].get("storage_key").is_none());

        let (_, body) = send(&app.router, get_request("/api/public/projects", None)).await;
        let listed = body["data"].as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["documents"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_envelope() {
        let app = app();
        let token = sign_in(&app.router).await;

        let (status, body) = send(
            &app.router,
            json_request("POST", "/api/admin/projects", Some(&token), json!({ "budget": "lots" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "validation_failed");
        assert!(body["details"]["errors"]["name"].is_array());
        assert!(body["details"]["errors"]["budget"].is_array());
        assert!(app.storage.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_uses_envelope() {
        let app = app();
        let token = sign_in(&app.router).await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/admin/projects")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");
    }

    #[tokio::test]
    async fn test_list_filters() {
        let app = app();
        let token = sign_in(&app.router).await;
        send(&app.router, json_request("POST", "/api/admin/projects", Some(&token), road_repair())).await;
        send(
            &app.router,
            json_request(
                "POST",
                "/api/admin/projects",
                Some(&token),
                json!({ "name": "Park benches", "code": "PK-002", "department": "Parks", "status": "completed" }),
            ),
        )
        .await;

        let (_, body) = send(&app.router, get_request("/api/admin/projects?status=completed", Some(&token))).await;
        let listed = body["data"].as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["code"], "PK-002");

        let (_, body) = send(&app.router, get_request("/api/public/projects?search=main&department=", None)).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, body) = send(&app.router, get_request("/api/admin/projects?status=paused", Some(&token))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["errors"]["status"].is_array());
    }

    #[tokio::test]
    async fn test_update_missing_project_is_not_found() {
        let app = app();
        let token = sign_in(&app.router).await;

        let (status, body) = send(
            &app.router,
            json_request("PUT", "/api/admin/projects/999", Some(&token), road_repair()),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
        assert!(app.storage.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_multipart_upload_and_visibility() {
        let app = app();
        let token = sign_in(&app.router).await;
        let (_, body) = send(
            &app.router,
            json_request(
                "POST",
                "/api/admin/projects",
                Some(&token),
                json!({ "name": "Library roof", "code": "LB-003", "department": "Culture" }),
            ),
        )
        .await;
        let id = body["data"]["id"].as_i64().unwrap();

        let multipart = concat!(
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"file\"; filename=\"roof.pdf\"\r\n",
            "Content-Type: application/pdf\r\n\r\n",
            "%PDF-1.4\r\n",
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"is_public\"\r\n\r\n",
            "false\r\n",
            "--XBOUNDARY--\r\n",
        );
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/admin/projects/{}/documents", id))
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::from(multipart))
            .unwrap();
        let (status, body) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["name"], "roof.pdf");
        assert_eq!(body["data"]["is_public"], false);
        assert_eq!(body["data"]["content_type"], "application/pdf");
        let document_id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = send(
            &app.router,
            json_request(
                "PATCH",
                &format!("/api/admin/documents/{}", document_id),
                Some(&token),
                json!({ "isPublic": "yes" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_public"], true);

        let (status, _) = send(
            &app.router,
            json_request(
                "PATCH",
                &format!("/api/admin/documents/{}", document_id),
                Some(&token),
                json!({}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/api/admin/documents/{}", document_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(app.storage.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_multipart_without_file() {
        let app = app();
        let token = sign_in(&app.router).await;

        let multipart = concat!(
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"name\"\r\n\r\n",
            "Orphan\r\n",
            "--XBOUNDARY--\r\n",
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/admin/projects/1/documents")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::from(multipart))
            .unwrap();
        let (status, body) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["errors"]["file"].is_array());
    }

    #[tokio::test]
    async fn test_multipart_rejects_overlong_content_type() {
        let app = app();
        let token = sign_in(&app.router).await;
        let (_, body) = send(
            &app.router,
            json_request("POST", "/api/admin/projects", Some(&token), road_repair()),
        )
        .await;
        let id = body["data"]["id"].as_i64().unwrap();

        let multipart = format!(
            concat!(
                "--XBOUNDARY\r\n",
                "Content-Disposition: form-data; name=\"file\"; filename=\"plan.pdf\"\r\n",
                "Content-Type: application/{}\r\n\r\n",
                "%PDF-1.4\r\n",
                "--XBOUNDARY--\r\n",
            ),
            "a".repeat(300)
        );
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/admin/projects/{}/documents", id))
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::from(multipart))
            .unwrap();
        let (status, body) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["errors"]["content_type"].is_array());
        assert!(app.storage.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_activity_and_status_updates() {
        let app = app();
        let token = sign_in(&app.router).await;
        let (_, body) = send(
            &app.router,
            json_request("POST", "/api/admin/projects", Some(&token), road_repair()),
        )
        .await;
        let id = body["data"]["id"].as_i64().unwrap();
        let activity_id = body["data"]["activities"][0]["id"].as_i64().unwrap();

        let (status, body) = send(
            &app.router,
            json_request(
                "POST",
                &format!("/api/admin/projects/{}/status-updates", id),
                Some(&token),
                json!({ "activity_id": activity_id, "reporter_name": "Site lead", "problem": "Rain delay" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["activity_id"], activity_id);

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/api/admin/activities/{}", activity_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app.router,
            get_request(&format!("/api/public/projects/{}/status-updates", id), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let updates = body["data"].as_array().unwrap();
        assert_eq!(updates.len(), 1);
        assert!(updates[0]["activity_id"].is_null());
    }

    #[tokio::test]
    async fn test_public_comments() {
        let app = app();
        let token = sign_in(&app.router).await;
        let (_, body) = send(
            &app.router,
            json_request("POST", "/api/admin/projects", Some(&token), road_repair()),
        )
        .await;
        let id = body["data"]["id"].as_i64().unwrap();
        let uri = format!("/api/public/projects/{}/comments", id);

        let (status, _) = send(
            &app.router,
            json_request("POST", &uri, None, json!({ "author_name": "Resident", "content": "Thanks!" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app.router, json_request("POST", &uri, None, json!({ "author_name": "Resident" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["errors"]["content"].is_array());

        let (_, body) = send(&app.router, get_request(&uri, None)).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app.router, get_request("/api/public/projects/999/comments", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_statistics() {
        let app = app();
        let token = sign_in(&app.router).await;
        send(&app.router, json_request("POST", "/api/admin/projects", Some(&token), road_repair())).await;

        let (status, body) = send(&app.router, get_request("/api/admin/statistics", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_projects"], 1);
        assert_eq!(body["data"]["total_budget"], 12500.0);
        assert_eq!(body["data"]["documents"]["private"], 1);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = app();
        let (status, body) = send(&app.router, get_request("/api/nothing-here", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_bad_path_parameter() {
        let app = app();
        let (status, body) = send(&app.router, get_request("/api/public/projects/abc", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");
    }
}
