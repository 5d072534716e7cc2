use axum::body::Body;
use axum::handler::Handler;
use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::from_fn_with_state;
use axum::routing::MethodRouter;
use axum::{Extension, Router};
use campus_core::Route;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info_span;
use uuid::Uuid;

use crate::guard::guard;
use crate::state::CampusState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Copy, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Router builder that knows the route table.
///
/// Public routes are mounted as-is; every other route gets the guard
/// layered on with its required roles.
pub struct CampusApp {
    pub state: CampusState,
    router: Router<CampusState>,
}

impl CampusApp {
    pub fn new(state: CampusState) -> Self {
        Self {
            state,
            router: Router::new(),
        }
    }

    /// Mount `handler` at `route`'s own path.
    pub fn route(self, route: Route, handler: MethodRouter<CampusState>) -> Self {
        self.route_as(route.path(), route, handler)
    }

    /// Mount `handler` at `path`, guarded like `route`.
    pub fn route_as(mut self, path: &str, route: Route, handler: MethodRouter<CampusState>) -> Self {
        let handler = if route.is_public() {
            handler
        } else {
            handler.route_layer(from_fn_with_state((self.state.clone(), route), guard))
        };
        self.router = self.router.route(path, handler);
        self
    }

    /// Unguarded route outside the page table (health checks, sign-out).
    pub fn open(mut self, path: &str, handler: MethodRouter<CampusState>) -> Self {
        self.router = self.router.route(path, handler);
        self
    }

    pub fn fallback<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, CampusState>,
        T: 'static,
    {
        self.router = self.router.fallback(handler);
        self
    }

    /// Make `value` available to handlers as `Extension<T>`. Only routes
    /// mounted before this call see it.
    pub fn extension<T>(mut self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.router = self.router.layer(Extension(value));
        self
    }

    /// Finished router with tracing and request-id layers.
    pub fn into_router(self) -> Router {
        let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

        let layers = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    let request_id = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    info_span!("http", method = %req.method(), path = %req.uri().path(), request_id)
                }),
            )
            .layer(PropagateRequestIdLayer::new(x_request_id));

        self.router.layer(layers).with_state(self.state)
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "listening");
        axum::serve(listener, self.into_router()).await?;
        Ok(())
    }
}
