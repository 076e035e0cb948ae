//! Local stand-in for the GYAO! site, its GraphQL api and the Brightcove playback api.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use gyao_rs::Gyao;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const ACCOUNT_ID: &str = "acc-1";
pub const POLICY_KEY: &str = "pk-test";
pub const GRAPHQL_PATH: &str = "/apis/playback/graphql";

#[derive(Clone)]
struct Fixture {
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

impl IntoResponse for Fixture {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response()
    }
}

#[derive(Default)]
struct Fixtures {
    paths: HashMap<String, Fixture>,
    deliveries: HashMap<String, Fixture>,
    /// Path and query of every request the fallback answered.
    requests: Mutex<Vec<String>>,
}

/// Builder for the fake upstream. Unknown paths answer `404`, unknown video ids answer with
/// `content: null` like the real GraphQL api.
#[derive(Default)]
pub struct FakeUpstream {
    fixtures: Fixtures,
}

impl FakeUpstream {
    pub fn new() -> FakeUpstream {
        FakeUpstream::default()
    }

    pub fn page(self, path: &str, html: String) -> FakeUpstream {
        self.raw(path, StatusCode::OK, "text/html; charset=utf-8", html)
    }

    pub fn json(self, path: &str, body: Value) -> FakeUpstream {
        self.raw(path, StatusCode::OK, "application/json", body.to_string())
    }

    pub fn raw<S: Into<String>>(
        mut self,
        path: &str,
        status: StatusCode,
        content_type: &'static str,
        body: S,
    ) -> FakeUpstream {
        self.fixtures.paths.insert(
            path.to_string(),
            Fixture {
                status,
                content_type,
                body: body.into(),
            },
        );
        self
    }

    pub fn delivery(self, video_id: &str, body: Value) -> FakeUpstream {
        self.delivery_raw(video_id, StatusCode::OK, "application/json", body.to_string())
    }

    pub fn delivery_raw<S: Into<String>>(
        mut self,
        video_id: &str,
        status: StatusCode,
        content_type: &'static str,
        body: S,
    ) -> FakeUpstream {
        self.fixtures.deliveries.insert(
            video_id.to_string(),
            Fixture {
                status,
                content_type,
                body: body.into(),
            },
        );
        self
    }

    pub fn playback(self, delivery_id: &str, body: Value) -> FakeUpstream {
        let path = playback_path(delivery_id);
        self.json(&path, body)
    }

    pub fn playback_raw<S: Into<String>>(
        self,
        delivery_id: &str,
        status: StatusCode,
        content_type: &'static str,
        body: S,
    ) -> FakeUpstream {
        let path = playback_path(delivery_id);
        self.raw(&path, status, content_type, body)
    }

    pub async fn serve(self) -> Upstream {
        let fixtures = Arc::new(self.fixtures);
        let app = Router::new()
            .route(GRAPHQL_PATH, get(graphql))
            .fallback(fallback)
            .with_state(fixtures.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        Upstream {
            base: format!("http://{}", addr),
            fixtures,
        }
    }
}

/// A running [`FakeUpstream`].
pub struct Upstream {
    pub base: String,
    fixtures: Arc<Fixtures>,
}

impl Upstream {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Path and query of all requests to the site and the playback api, in order.
    pub fn requests(&self) -> Vec<String> {
        self.fixtures.requests.lock().unwrap().clone()
    }

    /// A [`Gyao`] instance which sends all requests to this upstream.
    pub fn gyao(&self) -> Gyao {
        Gyao::builder()
            .client(reqwest::Client::builder().no_proxy().build().unwrap())
            .site(&self.base)
            .graphql_endpoint(self.url(GRAPHQL_PATH))
            .playback_endpoint(self.url("/playback/v1/accounts"))
            .account_id(ACCOUNT_ID)
            .policy_key(POLICY_KEY)
            .build()
            .unwrap()
    }
}

fn playback_path(delivery_id: &str) -> String {
    format!("/playback/v1/accounts/{}/videos/{}", ACCOUNT_ID, delivery_id)
}

async fn graphql(
    State(fixtures): State<Arc<Fixtures>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !params.contains_key("appId") || !params.contains_key("query") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    let Some(video_id) = params
        .get("variables")
        .and_then(|variables| serde_json::from_str::<Value>(variables).ok())
        .and_then(|variables| variables["videoId"].as_str().map(|id| id.to_string()))
    else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    match fixtures.deliveries.get(&video_id) {
        Some(fixture) => fixture.clone().into_response(),
        None => (
            [(header::CONTENT_TYPE, "application/json")],
            json!({"data": {"content": null}}).to_string(),
        )
            .into_response(),
    }
}

async fn fallback(State(fixtures): State<Arc<Fixtures>>, uri: Uri, headers: HeaderMap) -> Response {
    fixtures.requests.lock().unwrap().push(
        uri.path_and_query()
            .map(|path_and_query| path_and_query.to_string())
            .unwrap_or_else(|| uri.path().to_string()),
    );

    if uri.path().starts_with("/playback/") {
        let accept = headers
            .get(header::ACCEPT)
            .and_then(|accept| accept.to_str().ok())
            .unwrap_or_default();
        if !accept.contains(&format!("pk={}", POLICY_KEY)) {
            return StatusCode::FORBIDDEN.into_response();
        }
    }

    match fixtures.paths.get(uri.path()) {
        Some(fixture) => fixture.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Html of a GYAO! page which links the series api `endpoint` and, if given, embeds the player
/// for `video_id`.
pub fn page_html(endpoint: &str, video_id: Option<&str>) -> String {
    let player = video_id
        .map(|id| format!(r#"<div class="gyao-player" data-vid="{}"></div>"#, id))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html><html><head><title>GYAO!</title></head><body>
<div id="episodes" data-endpoint-url="{}"></div>
{}
</body></html>"#,
        endpoint, player
    )
}

/// A series listing entry which is flagged as available.
pub fn episode_json(id: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Title {}", id),
        "shortTitle": format!("Short {}", id),
        "streamingAvailability": "available",
        "startDate": "2024-01-01T00:00:00+09:00",
        "endDate": "2099-12-31T23:59:59+09:00",
        "shortWebUrl": format!("https://gyao.yahoo.co.jp/episode/{}", id)
    })
}

pub fn delivery_json(video_id: &str, delivery_id: &str) -> Value {
    json!({
        "data": {
            "content": {
                "video": {
                    "id": video_id,
                    "title": format!("Video {}", video_id),
                    "delivery": {"id": delivery_id, "drm": false}
                }
            }
        }
    })
}

pub fn playback_json(delivery_id: &str) -> Value {
    json!({
        "sources": [
            {
                "type": "application/x-mpegURL",
                "src": format!("https://cdn.example.test/{}/v3.m3u8", delivery_id),
                "ext_x_version": "3"
            },
            {
                "type": "application/x-mpegURL",
                "src": format!("https://cdn.example.test/{}/v4.m3u8", delivery_id),
                "ext_x_version": "4"
            }
        ]
    })
}
