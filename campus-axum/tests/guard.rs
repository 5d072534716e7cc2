use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::routing::{get, post};
use axum::Json;
use campus_auth::{
    AuthGateway, AuthOptions, Identity, IdentityProvider, JwtOptions, NewRoleAssignment,
    PendingSignUp,
};
use campus_axum::{ApiResult, CampusApp, CampusState, CurrentSession};
use campus_core::{
    CampusConfig, CampusError, CampusResult, MemoryBackend, Role, Route, Table, TableBackend,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

struct AnyPassword;

#[async_trait::async_trait]
impl IdentityProvider for AnyPassword {
    async fn sign_in(&self, email: &str, _password: &str) -> CampusResult<Identity> {
        Ok(Identity {
            user_id: format!("user-{email}"),
            email: email.to_string(),
            full_name: None,
            provider_token: None,
        })
    }

    async fn sign_up(&self, _email: &str, _password: &str, _full_name: &str) -> CampusResult<PendingSignUp> {
        Err(CampusError::internal("not used"))
    }

    async fn sign_out(&self, _identity: &Identity) -> CampusResult<()> {
        Ok(())
    }

    async fn confirm(&self, _token: &str) -> CampusResult<()> {
        Err(CampusError::not_found("not used"))
    }

    async fn delete_user(&self, _user_id: &str) -> CampusResult<()> {
        Ok(())
    }
}

async fn whoami(CurrentSession(session): CurrentSession) -> Json<Value> {
    Json(json!({ "role": session.role, "school_id": session.school_id }))
}

async fn echo(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    Ok(Json(body))
}

async fn page(query: Result<Query<HashMap<String, u32>>, QueryRejection>) -> ApiResult<Json<Value>> {
    let Query(params) = query?;
    Ok(Json(json!({ "page": params.get("page") })))
}

async fn boom() -> ApiResult<Json<Value>> {
    Err(CampusError::Network("connection refused (10.0.0.3:443)".into()).into())
}

struct Harness {
    app: CampusApp,
    gateway: Arc<AuthGateway>,
    backend: Arc<MemoryBackend>,
}

fn harness() -> Harness {
    let backend = Arc::new(MemoryBackend::new());
    let options = AuthOptions {
        jwt: JwtOptions {
            secret: Some("guard-test".into()),
            ..JwtOptions::default()
        },
        ..AuthOptions::default()
    };
    let gateway = Arc::new(AuthGateway::new(options, Arc::new(AnyPassword), backend.clone()).unwrap());
    let state = CampusState::new(gateway.clone(), backend.clone(), CampusConfig::new().snapshot());

    let app = CampusApp::new(state)
        .route(Route::Dashboard, get(whoami))
        .route(Route::Schools, get(whoami))
        .route(Route::Classes, get(whoami))
        .open("/echo", post(echo))
        .open("/page", get(page))
        .open("/boom", get(boom));

    Harness {
        app,
        gateway,
        backend,
    }
}

async fn token_for(h: &Harness, email: &str, role: Role) -> String {
    let school_id = if role.is_school_scoped() {
        let row = h
            .backend
            .insert(Table::Schools, json!({"name": "Oak", "slug": "oak", "school_code": "OAK123"}))
            .await
            .unwrap();
        Some(row["id"].as_str().unwrap().to_string())
    } else {
        None
    };
    h.gateway
        .assign_role(NewRoleAssignment {
            user_id: format!("user-{email}"),
            role,
            school_id,
            full_name: None,
            email: Some(email.to_string()),
        })
        .await
        .unwrap();
    h.gateway.sign_in(email, "pw").await.unwrap().token
}

fn get_with(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        b = b.header("authorization", format!("Bearer {t}"));
    }
    b.body(Body::empty()).unwrap()
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn anonymous_requests_are_redirected_to_login() {
    let h = harness();
    let res = h
        .app
        .into_router()
        .oneshot(get_with("/dashboard", None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get("location").unwrap(), "/login");
}

#[tokio::test]
async fn wrong_role_is_redirected_without_rendering() {
    let h = harness();
    let token = token_for(&h, "t@oak.edu", Role::Teacher).await;
    let res = h
        .app
        .into_router()
        .oneshot(get_with("/dashboard/schools", Some(&token)))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn allowed_role_reaches_the_handler_with_its_session() {
    let h = harness();
    let token = token_for(&h, "a@oak.edu", Role::SchoolAdmin).await;
    let res = h
        .app
        .into_router()
        .oneshot(get_with("/dashboard/classes", Some(&token)))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["role"], "school_admin");
    assert!(body["school_id"].is_string());
}

#[tokio::test]
async fn signed_out_token_no_longer_passes() {
    let h = harness();
    let token = token_for(&h, "root@campus.dev", Role::SuperAdmin).await;
    h.gateway.sign_out(&token).await.unwrap();

    let res = h
        .app
        .into_router()
        .oneshot(get_with("/dashboard", Some(&token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn malformed_json_returns_bad_request_shape() {
    let h = harness();
    let res = h
        .app
        .into_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/echo")
                .header("content-type", "application/json")
                .body(Body::from("{\"name\":\"x\""))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
    assert!(res.headers().get("x-request-id").is_some());
    let body = json_body(res).await;
    assert_eq!(body["name"], "BadRequest");
    assert_eq!(body["className"], "bad-request");
    assert!(body["errors"]["_schema"].is_array());
}

#[tokio::test]
async fn malformed_query_is_a_bad_request() {
    let h = harness();
    let router = h.app.into_router();

    let res = router.clone().oneshot(get_with("/page?page=two", None)).await.unwrap();
    assert_eq!(res.status().as_u16(), 400);
    assert_eq!(json_body(res).await["name"], "BadRequest");

    let res = router.oneshot(get_with("/page?page=2", None)).await.unwrap();
    assert_eq!(json_body(res).await["page"], 2);
}

#[tokio::test]
async fn network_errors_hide_their_detail() {
    let h = harness();
    let res = h.app.into_router().oneshot(get_with("/boom", None)).await.unwrap();

    assert_eq!(res.status().as_u16(), 502);
    let body = json_body(res).await;
    assert_eq!(body["name"], "BadGateway");
    assert!(!body["message"].as_str().unwrap().contains("10.0.0.3"));
}

#[tokio::test]
async fn request_id_is_preserved_when_provided() {
    let h = harness();
    let provided = HeaderValue::from_static("req-test-123");
    let res = h
        .app
        .into_router()
        .oneshot(
            Request::builder()
                .uri("/boom")
                .header("x-request-id", provided.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.headers().get("x-request-id").unwrap(), &provided);
}
