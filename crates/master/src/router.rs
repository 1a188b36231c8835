// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The axum application: `/ws` for slave connections, `/healthz` for
//! liveness probes.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::gateway::MasterGateway;

pub fn build_router(gateway: MasterGateway, ws_path: &str) -> Router {
    Router::new()
        .route(ws_path, get(ws_handler))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(gateway)
}

async fn ws_handler(ws: WebSocketUpgrade, State(gateway): State<MasterGateway>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| gateway.handle_socket(socket))
}

async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
