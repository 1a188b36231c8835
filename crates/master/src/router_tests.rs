use super::build_router;
use crate::gateway::{MasterGateway, MasterGatewayConfig};
use crate::secret::GatewaySecret;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use mesh_core::FakeClock;
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;

#[tokio::test]
async fn healthz_returns_ok() {
    let dir = tempdir().expect("tempdir");
    let secret = GatewaySecret::load_or_generate(&dir.path().join("secret")).expect("secret");
    let gateway = MasterGateway::new(secret, Arc::new(FakeClock::default()), MasterGatewayConfig::default());
    let app = build_router(gateway, "/ws");

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}
