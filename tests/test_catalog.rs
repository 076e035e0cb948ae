use crate::utils::{episode_json, page_html, FakeUpstream};
use axum::http::StatusCode;
use serde_json::json;

mod utils;

const ENDPOINT: &str = "/api/programs/prog-1/videos";

fn listing(ids: &[&str]) -> serde_json::Value {
    json!({ "videos": ids.iter().map(|id| episode_json(id)).collect::<Vec<_>>() })
}

#[tokio::test]
async fn single_episode() {
    let upstream = FakeUpstream::new()
        .page("/episode/foo/vid-2", page_html(ENDPOINT, None))
        .json(ENDPOINT, listing(&["vid-1", "vid-2", "vid-3"]))
        .serve()
        .await;

    let episodes = upstream
        .gyao()
        .episodes(upstream.url("/episode/foo/vid-2"), false)
        .await;

    assert_result!(episodes);
    let episodes = episodes.unwrap();
    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0].id, "vid-2");
    assert_eq!(episodes[0].short_title, "Short vid-2");
    assert_eq!(
        episodes[0].page_url,
        "https://gyao.yahoo.co.jp/episode/vid-2"
    )
}

#[tokio::test]
async fn whole_series() {
    let upstream = FakeUpstream::new()
        .page("/episode/foo/vid-2", page_html(ENDPOINT, None))
        .json(ENDPOINT, listing(&["vid-1", "vid-2", "vid-3"]))
        .serve()
        .await;

    let episodes = upstream
        .gyao()
        .episodes(upstream.url("/episode/foo/vid-2"), true)
        .await;

    assert_result!(episodes);
    let ids = episodes
        .unwrap()
        .into_iter()
        .map(|episode| episode.id)
        .collect::<Vec<String>>();
    assert_eq!(ids, vec!["vid-1", "vid-2", "vid-3"])
}

#[tokio::test]
async fn percent_encoded_page_url() {
    let upstream = FakeUpstream::new()
        .page("/episode/%E9%80%B2%E6%92%83/vid-1", page_html(ENDPOINT, None))
        .json(ENDPOINT, listing(&["vid-1"]))
        .serve()
        .await;
    let gyao = upstream.gyao();

    let raw = gyao.episodes(upstream.url("/episode/進撃/vid-1"), false).await;
    let encoded = gyao
        .episodes(upstream.url("/episode/%E9%80%B2%E6%92%83/vid-1"), false)
        .await;

    assert_result!(raw);
    assert_result!(encoded);
    assert_eq!(raw.unwrap(), encoded.unwrap())
}

#[tokio::test]
async fn title_page_uses_player_video_id() {
    let upstream = FakeUpstream::new()
        .page("/title/foo/series-1", page_html(ENDPOINT, Some("vid-3")))
        .json(ENDPOINT, listing(&["vid-1", "vid-2", "vid-3"]))
        .serve()
        .await;

    let episodes = upstream
        .gyao()
        .episodes(upstream.url("/title/foo/series-1"), false)
        .await;

    assert_result!(episodes);
    assert_eq!(episodes.unwrap()[0].id, "vid-3")
}

#[tokio::test]
async fn title_page_without_player() {
    let upstream = FakeUpstream::new()
        .page("/title/foo/series-1", page_html(ENDPOINT, None))
        .json(ENDPOINT, listing(&["vid-1"]))
        .serve()
        .await;

    let episodes = upstream
        .gyao()
        .episodes(upstream.url("/title/foo/series-1"), false)
        .await;

    assert_error!(episodes, IdentifierNotFound)
}

#[tokio::test]
async fn episode_not_listed() {
    let upstream = FakeUpstream::new()
        .page("/episode/foo/vid-9", page_html(ENDPOINT, None))
        .json(ENDPOINT, listing(&["vid-1", "vid-2"]))
        .serve()
        .await;

    let episodes = upstream
        .gyao()
        .episodes(upstream.url("/episode/foo/vid-9"), false)
        .await;

    assert_error!(episodes, EpisodeNotFound)
}

#[tokio::test]
async fn empty_series() {
    let upstream = FakeUpstream::new()
        .page("/episode/foo/vid-1", page_html(ENDPOINT, None))
        .json(ENDPOINT, listing(&[]))
        .serve()
        .await;

    let episodes = upstream
        .gyao()
        .episodes(upstream.url("/episode/foo/vid-1"), true)
        .await;

    assert_error!(episodes, EmptyCatalog)
}

#[tokio::test]
async fn page_without_endpoint() {
    let upstream = FakeUpstream::new()
        .page(
            "/episode/foo/vid-1",
            "<html><body><p>Not found</p></body></html>".to_string(),
        )
        .serve()
        .await;

    let episodes = upstream
        .gyao()
        .episodes(upstream.url("/episode/foo/vid-1"), false)
        .await;

    assert_error!(episodes, EndpointNotFound)
}

#[tokio::test]
async fn page_not_found() {
    let upstream = FakeUpstream::new().serve().await;

    let episodes = upstream
        .gyao()
        .episodes(upstream.url("/episode/foo/vid-1"), false)
        .await;

    assert_error!(episodes, UpstreamNotFound)
}

#[tokio::test]
async fn listing_with_wrong_field_type() {
    let mut broken = episode_json("vid-1");
    broken["title"] = json!(42);
    let upstream = FakeUpstream::new()
        .page("/episode/foo/vid-1", page_html(ENDPOINT, None))
        .json(ENDPOINT, json!({ "videos": [episode_json("vid-0"), broken] }))
        .serve()
        .await;

    let episodes = upstream
        .gyao()
        .episodes(upstream.url("/episode/foo/vid-1"), true)
        .await;

    assert_error!(episodes, Schema)
}

#[tokio::test]
async fn listing_without_video_list() {
    let upstream = FakeUpstream::new()
        .page("/episode/foo/vid-1", page_html(ENDPOINT, None))
        .json(ENDPOINT, json!({ "videos": {"vid-1": episode_json("vid-1")} }))
        .serve()
        .await;

    let episodes = upstream
        .gyao()
        .episodes(upstream.url("/episode/foo/vid-1"), true)
        .await;

    assert_error!(episodes, Schema)
}

#[tokio::test]
async fn listing_keeps_page_query() {
    // the page itself is requested with the query percent-encoded into its path
    let upstream = FakeUpstream::new()
        .page("/episode/foo/vid-1%3Fsort%3Dasc", page_html(ENDPOINT, None))
        .json(ENDPOINT, listing(&["vid-1"]))
        .serve()
        .await;

    let episodes = upstream
        .gyao()
        .episodes(upstream.url("/episode/foo/vid-1?sort=asc"), false)
        .await;

    assert_result!(episodes);
    assert_eq!(episodes.unwrap()[0].id, "vid-1");
    assert!(upstream
        .requests()
        .contains(&format!("{}?sort=asc", ENDPOINT)))
}

#[tokio::test]
async fn listing_not_json() {
    let upstream = FakeUpstream::new()
        .page("/episode/foo/vid-1", page_html(ENDPOINT, None))
        .raw(
            ENDPOINT,
            StatusCode::OK,
            "text/html; charset=utf-8",
            listing(&["vid-1"]).to_string(),
        )
        .serve()
        .await;

    let episodes = upstream
        .gyao()
        .episodes(upstream.url("/episode/foo/vid-1"), true)
        .await;

    assert_error!(episodes, Schema)
}

#[tokio::test]
async fn listing_item_not_an_object() {
    let upstream = FakeUpstream::new()
        .page("/episode/foo/vid-1", page_html(ENDPOINT, None))
        .json(ENDPOINT, json!({ "videos": [episode_json("vid-1"), "vid-2"] }))
        .serve()
        .await;

    let episodes = upstream
        .gyao()
        .episodes(upstream.url("/episode/foo/vid-1"), true)
        .await;

    assert_error!(episodes, Schema)
}
