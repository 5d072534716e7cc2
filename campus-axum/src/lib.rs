//! campus-axum: Axum adapter for Campus.
//!
//! Builds routers from the route table, guards non-public routes with the
//! session guard and renders [`campus_core::CampusError`] as JSON.

pub mod app;
pub mod guard;
pub mod session;
pub mod state;
mod error;

pub use app::{CampusApp, REQUEST_ID_HEADER};
pub use error::{ApiResult, CampusAxumError};
pub use session::{bearer_token, BearerToken, CurrentSession};
pub use state::CampusState;
