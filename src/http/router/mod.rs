use crate::app::AppEnv;
use crate::common::consts;
use crate::services::i_wh_dump::IWebhookDumpService;
use std::sync::Arc;

use axum::routing::post;
use axum::{routing::get, Router};
use tower::{Layer, ServiceBuilder};
use tower_http::{
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::TraceLayer,
};

mod webhook;

pub fn new<S>(app: AppEnv<S>) -> Router
where
    S: IWebhookDumpService + Clone,
{
    let app_state = Arc::new(app);
    Router::new()
        .route("/", get(|| async { consts::SERVICE_NAME }))
        .route(
            consts::WEBHOOK_ROUTE,
            post(webhook::webhook_handler::<S>).fallback(webhook::method_not_allowed),
        )
        .with_state(app_state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// The router with trailing slashes trimmed before routing; this is what gets served.
pub fn service<S>(app: AppEnv<S>) -> NormalizePath<Router>
where
    S: IWebhookDumpService + Clone,
{
    NormalizePathLayer::trim_trailing_slash().layer(new(app))
}
