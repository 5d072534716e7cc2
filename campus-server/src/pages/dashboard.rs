// Pages behind the guard. The guard has already checked the role; handlers
// read the admitted session through `CurrentSession`.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};
use campus_axum::{ApiResult, CurrentSession};
use campus_core::validate::validate_form;
use campus_core::{dispatch, ClassRecord, Dashboard, School, Session, StudentRecord};
use serde_json::{json, Value};

use crate::services::classes::{classes_schema, CreateClass};
use crate::services::schools::{schools_schema, CreateSchool};
use crate::services::students::{students_schema, CreateStudent};
use crate::services::{CampusServices, Created, Notification};

type Services = Extension<Arc<CampusServices>>;
type Body = Result<Json<Value>, JsonRejection>;

fn greeting(dashboard: Dashboard, session: &Session) -> String {
    let name = session.full_name.as_deref().unwrap_or(match dashboard {
        Dashboard::Teacher => "Teacher",
        Dashboard::SuperAdmin | Dashboard::SchoolAdmin => "Admin",
    });
    match dashboard {
        Dashboard::SuperAdmin => format!("Welcome back, {name}"),
        Dashboard::SchoolAdmin => format!("Welcome, {name}. Manage your school operations."),
        Dashboard::Teacher => format!("Welcome, {name}"),
    }
}

/// `GET /dashboard`: the role's own dashboard.
pub async fn home(Extension(svc): Services, CurrentSession(session): CurrentSession) -> Json<Value> {
    let dashboard = dispatch(session.role);
    let cards = svc.stats.cards(dashboard, &session).await;

    Json(json!({
        "dashboard": dashboard,
        "title": dashboard.title(),
        "greeting": greeting(dashboard, &session),
        "role_label": session.role.label(),
        "nav": dashboard.nav(),
        "cards": cards,
        "session": session,
    }))
}

pub async fn schools(Extension(svc): Services) -> ApiResult<Json<Value>> {
    let schools = svc.schools.list().await?;
    Ok(Json(json!({ "page": "schools", "schools": schools })))
}

pub async fn create_school(Extension(svc): Services, body: Body) -> ApiResult<(StatusCode, Json<Created<School>>)> {
    let Json(data) = body?;
    let form: CreateSchool = validate_form(data, schools_schema::SCHEMA_ERROR)?;
    let record = svc.schools.create(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(Created {
            record,
            notification: Notification::new("School created successfully"),
        }),
    ))
}

/// `POST /dashboard/schools/{id}/toggle-active`
pub async fn toggle_school(
    Extension(svc): Services,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let school = svc.schools.toggle_active(&id).await?;
    Ok(Json(json!({ "record": school })))
}

pub async fn analytics(Extension(svc): Services) -> Json<Value> {
    let counts = svc.stats.platform().await;
    Json(json!({
        "page": "analytics",
        "title": "Analytics",
        "subtitle": "Platform-wide insights and reports.",
        "counts": counts,
        "placeholder": "Analytics coming soon",
    }))
}

pub async fn teachers(Extension(svc): Services, CurrentSession(session): CurrentSession) -> ApiResult<Json<Value>> {
    let ctx = session.require_tenant()?;
    let teachers = svc.teachers.list(&ctx).await?;
    Ok(Json(json!({ "page": "teachers", "teachers": teachers })))
}

pub async fn classes(Extension(svc): Services, CurrentSession(session): CurrentSession) -> ApiResult<Json<Value>> {
    let ctx = session.require_tenant()?;
    let classes = svc.classes.list(&ctx).await?;
    Ok(Json(json!({ "page": "classes", "classes": classes })))
}

pub async fn create_class(
    Extension(svc): Services,
    CurrentSession(session): CurrentSession,
    body: Body,
) -> ApiResult<(StatusCode, Json<Created<ClassRecord>>)> {
    let ctx = session.require_tenant()?;
    let Json(data) = body?;
    let form: CreateClass = validate_form(data, classes_schema::SCHEMA_ERROR)?;
    let record = svc.classes.create(&ctx, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(Created {
            record,
            notification: Notification::new("Class created"),
        }),
    ))
}

pub async fn students(Extension(svc): Services, CurrentSession(session): CurrentSession) -> ApiResult<Json<Value>> {
    let ctx = session.require_tenant()?;
    let students = svc.students.list(&ctx).await?;
    Ok(Json(json!({ "page": "students", "students": students })))
}

pub async fn create_student(
    Extension(svc): Services,
    CurrentSession(session): CurrentSession,
    body: Body,
) -> ApiResult<(StatusCode, Json<Created<StudentRecord>>)> {
    let ctx = session.require_tenant()?;
    let Json(data) = body?;
    let form: CreateStudent = validate_form(data, students_schema::SCHEMA_ERROR)?;
    let record = svc.students.create(&ctx, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(Created {
            record,
            notification: Notification::new("Student added"),
        }),
    ))
}

fn empty_page(page: &str, title: &str, subtitle: &str, placeholder: &str) -> Json<Value> {
    Json(json!({
        "page": page,
        "title": title,
        "subtitle": subtitle,
        "placeholder": placeholder,
    }))
}

pub async fn my_classes() -> Json<Value> {
    empty_page(
        "my_classes",
        "My Classes",
        "View and manage your assigned classes.",
        "No classes assigned yet",
    )
}

pub async fn attendance() -> Json<Value> {
    empty_page(
        "attendance",
        "Attendance",
        "Mark and track student attendance.",
        "Select a class to begin",
    )
}

pub async fn grades() -> Json<Value> {
    empty_page(
        "grades",
        "Grades",
        "Manage student grades and assessments.",
        "No grades recorded yet",
    )
}
