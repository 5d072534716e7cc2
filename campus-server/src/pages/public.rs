// Pages reachable without a session.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::{Extension, Json};
use campus_axum::{ApiResult, BearerToken, CampusState};
use campus_core::{CampusError, Role, SchoolType, LOGIN_REDIRECT};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::services::schools::schools_service::login_state;
use crate::services::{CampusServices, Notification};

const FEATURES: [(&str, &str); 4] = [
    (
        "Multi-School Support",
        "Manage multiple schools from a single platform with isolated data.",
    ),
    (
        "Role-Based Access",
        "Super Admins, School Admins, and Teachers each get tailored dashboards.",
    ),
    (
        "Student Management",
        "Track students, attendance, grades, and performance effortlessly.",
    ),
    (
        "Class Organization",
        "Organize classes, assign teachers, and manage subjects.",
    ),
];

pub async fn landing() -> Json<Value> {
    let features: Vec<Value> = FEATURES
        .iter()
        .map(|(title, description)| json!({ "title": title, "description": description }))
        .collect();

    Json(json!({
        "page": "landing",
        "badge": "Multi-School Management Platform",
        "headline": "One platform to manage all your schools",
        "features": features,
        "actions": [
            { "label": "Start Managing", "to": LOGIN_REDIRECT },
            { "label": "Try School Login", "to": "/demo-school/login" },
        ],
    }))
}

pub async fn login_page() -> Json<Value> {
    Json(json!({
        "page": "login",
        "title": "Enter School Code",
        "subtitle": "Enter your 6-character school code to continue",
        "code_length": campus_core::school_code::CODE_LEN,
        "signup": "/signup",
    }))
}

#[derive(Debug, Deserialize)]
pub struct CodeForm {
    #[serde(default)]
    pub code: String,
}

/// `POST /login`: resolve a school code to its login page.
pub async fn lookup_code(
    Extension(svc): Extension<Arc<CampusServices>>,
    body: Result<Json<CodeForm>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(form) = body?;
    let school = svc.schools.find_by_code(&form.code).await?;
    Ok(Json(json!({
        "redirect": format!("/{}/login", school.slug),
        "state": login_state(&school),
    })))
}

pub async fn signup_page() -> Json<Value> {
    let school_types: Vec<Value> = SchoolType::ALL
        .iter()
        .map(|t| json!({ "value": t, "label": t.label() }))
        .collect();

    Json(json!({
        "page": "signup",
        "sections": ["School Details", "Admin Details"],
        "school_types": school_types,
        "login": LOGIN_REDIRECT,
    }))
}

/// `POST /signup`: register a school with its first admin.
pub async fn signup(
    Extension(svc): Extension<Arc<CampusServices>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(data) = body?;
    let registered = svc.onboarding.sign_up(data).await?;

    let notification = Notification::new("Account created!").with_description(
        "Please check your email to verify your account before signing in.",
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "redirect": LOGIN_REDIRECT,
            "notification": notification,
            "school_code": registered.school.school_code,
            "school": registered.school,
        })),
    ))
}

/// `GET /{school_slug}/login`
pub async fn school_login_page(
    Extension(svc): Extension<Arc<CampusServices>>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(slug) = path?;
    let school = svc.schools.find_by_slug(&slug).await?;
    Ok(Json(json!({
        "page": "school_login",
        "school": login_state(&school),
        "cards": [
            { "title": "Admin login", "role": Role::SchoolAdmin },
            { "title": "Teachers login", "role": Role::Teacher },
        ],
    })))
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /{school_slug}/login`: sign in on a school's login page.
/// School-scoped accounts may only sign in at their own school.
pub async fn school_login(
    State(state): State<CampusState>,
    Extension(svc): Extension<Arc<CampusServices>>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(slug) = path?;
    let Json(creds) = body?;
    let school = svc.schools.find_by_slug(&slug).await?;

    let signed = state.auth.sign_in(&creds.email, &creds.password).await?;
    let session = &signed.session;
    if session.role.is_school_scoped() && session.school_id.as_deref() != Some(school.id.as_str()) {
        state.auth.sign_out(&signed.token).await?;
        return Err(CampusError::forbidden(format!(
            "This account does not belong to {}",
            school.name
        ))
        .into());
    }

    Ok(Json(json!({
        "redirect": "/dashboard",
        "token": signed.token,
        "expires_at": signed.expires_at,
        "session": signed.session,
        "notification": Notification::new("Welcome back!")
            .with_description("You've been logged in successfully."),
    })))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmParams {
    #[serde(default)]
    pub token: String,
}

/// `GET /confirm?token=...`: the link sent after sign-up.
pub async fn confirm(
    State(state): State<CampusState>,
    query: Result<Query<ConfirmParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = query?;
    state.auth.confirm_email(&params.token).await?;
    Ok(Json(json!({
        "redirect": LOGIN_REDIRECT,
        "notification": Notification::new("Email confirmed").with_description("You can now sign in."),
    })))
}

/// `POST /logout`. Always succeeds.
pub async fn logout(State(state): State<CampusState>, BearerToken(token): BearerToken) -> ApiResult<Json<Value>> {
    if let Some(token) = token {
        state.auth.sign_out(&token).await?;
    }
    Ok(Json(json!({ "redirect": "/" })))
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    debug!(path = %uri.path(), "page.not_found");
    let err = CampusError::not_found("Oops! Page not found");
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "page": "not_found",
            "error": err.to_json(),
            "home": "/",
        })),
    )
}
