// Route guard middleware.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use campus_core::{authorize, Access, Route};
use tracing::debug;

use crate::session::bearer_token;
use crate::state::CampusState;

/// Admit the request iff the bearer token names a live session whose role
/// `route` allows; otherwise answer `303 See Other` to the login page.
pub async fn guard(
    State((state, route)): State<(CampusState, Route)>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = bearer_token(req.headers()).map(str::to_string);
    let session = match token {
        Some(t) => state.auth.current_session(&t).await.ok(),
        None => None,
    };

    match authorize(route.required_roles(), session.as_ref()) {
        Access::Granted(s) => {
            req.extensions_mut().insert(s.clone());
            next.run(req).await
        }
        Access::Redirect(to) => {
            debug!(
                path = %req.uri().path(),
                role = session.as_ref().map(|s| s.role.as_str()).unwrap_or("anonymous"),
                "guard.redirect"
            );
            Redirect::to(to).into_response()
        }
    }
}
