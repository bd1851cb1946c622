//! Front end, PWA files and uploaded images.
use std::{path::Path, sync::Arc};

use axum::{
    Router,
    http::{HeaderName, HeaderValue},
};
use tower_http::{
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeader,
};

use crate::state::State;

const SERVICE_WORKER_ALLOWED: HeaderName = HeaderName::from_static("service-worker-allowed");

const PAGES: [(&str, &str); 5] = [
    ("/", "index.html"),
    ("/manifest.json", "manifest.json"),
    ("/style.css", "style.css"),
    ("/script.js", "script.js"),
    ("/config.js", "config.js"),
];

pub fn routes(static_dir: &Path, upload_dir: &Path) -> Router<Arc<State>> {
    let service_worker = SetResponseHeader::overriding(
        ServeFile::new(static_dir.join("sw.js")),
        SERVICE_WORKER_ALLOWED,
        HeaderValue::from_static("/"),
    );

    PAGES
        .iter()
        .fold(Router::new(), |router, (route, file)| {
            router.route_service(route, ServeFile::new(static_dir.join(file)))
        })
        .route_service("/sw.js", service_worker)
        .nest_service("/icons", ServeDir::new(static_dir.join("icons")))
        .nest_service("/uploads", ServeDir::new(upload_dir))
}
