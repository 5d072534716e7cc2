pub mod dashboard;
pub mod public;

use axum::routing::{get, post};
use campus_axum::CampusApp;
use campus_core::Route;

/// Mount every page of the route table, plus email confirmation, sign-out,
/// health and the 404 fallback.
pub fn mount(app: CampusApp) -> CampusApp {
    app.route(Route::Landing, get(public::landing))
        .route(Route::Login, get(public::login_page).post(public::lookup_code))
        .route(Route::SignUp, get(public::signup_page).post(public::signup))
        .route(
            Route::SchoolLogin,
            get(public::school_login_page).post(public::school_login),
        )
        .route(Route::Dashboard, get(dashboard::home))
        .route(
            Route::Schools,
            get(dashboard::schools).post(dashboard::create_school),
        )
        .route_as(
            "/dashboard/schools/{id}/toggle-active",
            Route::Schools,
            post(dashboard::toggle_school),
        )
        .route(Route::Analytics, get(dashboard::analytics))
        .route(Route::Teachers, get(dashboard::teachers))
        .route(
            Route::Classes,
            get(dashboard::classes).post(dashboard::create_class),
        )
        .route(
            Route::Students,
            get(dashboard::students).post(dashboard::create_student),
        )
        .route(Route::MyClasses, get(dashboard::my_classes))
        .route(Route::Attendance, get(dashboard::attendance))
        .route(Route::Grades, get(dashboard::grades))
        .open("/confirm", get(public::confirm))
        .open("/logout", post(public::logout))
        .open("/health", get(public::health))
        .fallback(public::not_found)
}
