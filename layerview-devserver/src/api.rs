//! HTTP API serving a fleet in the backend's wire format.

use crate::fixtures;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use layerview_sync::protocol::{APPLICATIONS_PATH, STREAM_PATH};
use layerview_sync::WatchEvent;
use layerview_types::{Application, ApplicationList, ResourceTree};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// What the server hands out.
#[derive(Debug, Clone)]
pub struct Fleet {
    pub apps: Vec<Application>,
    /// Application cycled by the live stream; `None` for a static stream.
    pub demo_app: Option<String>,
    /// Pause between live updates.
    pub tick: Duration,
}

impl Fleet {
    /// The built-in demo fleet.
    pub fn demo(tick: Duration) -> Self {
        Self {
            apps: fixtures::demo_fleet(Utc::now()),
            demo_app: Some(fixtures::DEMO_APP.to_string()),
            tick,
        }
    }

    /// A fleet whose stream only replays `apps`.
    pub fn fixed(apps: Vec<Application>) -> Self {
        Self {
            apps,
            demo_app: None,
            tick: Duration::from_secs(5),
        }
    }

    fn find(&self, name: &str) -> Option<&Application> {
        self.apps.iter().find(|app| app.name() == name)
    }
}

#[derive(Debug, Deserialize)]
struct TreeQuery {
    #[serde(rename = "appNamespace")]
    app_namespace: Option<String>,
}

async fn list_handler(State(fleet): State<Arc<Fleet>>) -> Json<ApplicationList> {
    Json(ApplicationList {
        items: fleet.apps.clone(),
    })
}

async fn resource_tree_handler(
    State(fleet): State<Arc<Fleet>>,
    Path(name): Path<String>,
    Query(query): Query<TreeQuery>,
) -> Result<Json<ResourceTree>, StatusCode> {
    let app = fleet.find(&name).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(ns) = query.app_namespace.as_deref() {
        if ns != app.namespace() {
            return Err(StatusCode::NOT_FOUND);
        }
    }
    Ok(Json(fixtures::resource_tree(app, Utc::now())))
}

fn encode(event: WatchEvent) -> Option<String> {
    match event.to_frame() {
        Ok(frame) => Some(frame),
        Err(e) => {
            warn!(error = %e, "failed to encode frame");
            None
        }
    }
}

async fn stream_handler(State(fleet): State<Arc<Fleet>>) -> Response {
    debug!(apps = fleet.apps.len(), "stream client connected");
    let initial: Vec<Result<String, Infallible>> = fleet
        .apps
        .iter()
        .cloned()
        .filter_map(|app| encode(WatchEvent::added(app)))
        .map(Ok)
        .collect();

    let demo = fleet
        .demo_app
        .as_deref()
        .and_then(|name| fleet.find(name))
        .cloned();
    let tick = fleet.tick;
    let updates = stream::unfold(0u64, move |step| {
        let demo = demo.clone();
        async move {
            tokio::time::sleep(tick).await;
            let frame = match demo {
                Some(app) => encode(WatchEvent::modified(fixtures::demo_update(
                    &app,
                    step,
                    Utc::now(),
                ))),
                None => Some(": keepalive\n\n".to_string()),
            };
            Some((frame, step + 1))
        }
    })
    .filter_map(|frame| async move { frame.map(Ok::<_, Infallible>) });

    let body = Body::from_stream(stream::iter(initial).chain(updates));
    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

/// Build the HTTP API router serving `fleet`.
pub fn build_router(fleet: Arc<Fleet>) -> Router {
    Router::new()
        .route(APPLICATIONS_PATH, get(list_handler))
        .route(
            "/api/v1/applications/{name}/resource-tree",
            get(resource_tree_handler),
        )
        .route(STREAM_PATH, get(stream_handler))
        .with_state(fleet)
}
