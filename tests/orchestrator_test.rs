//! Integration tests for album and artist download orchestration.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};
use spotgrab::{
    config::AppContext,
    download::{Orchestrator, PlanCollector, SourceKind, TrackDownloader},
    error::{DownloadError, Error},
    spotify::{ApiClient, Catalog},
    types::ExtraKeys,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;

#[derive(Debug, Clone)]
struct Call {
    kind: SourceKind,
    track_id: String,
    extra_keys: ExtraKeys,
    disable_progress: bool,
}

/// Records every handoff; fails on `fail_on` when set.
#[derive(Default)]
struct RecordingDownloader {
    calls: Mutex<Vec<Call>>,
    fail_on: Option<&'static str>,
}

impl RecordingDownloader {
    fn failing_on(track_id: &'static str) -> Self {
        Self {
            fail_on: Some(track_id),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackDownloader for RecordingDownloader {
    async fn download_track(
        &self,
        kind: SourceKind,
        track_id: &str,
        extra_keys: &ExtraKeys,
        disable_progress: bool,
    ) -> Result<(), DownloadError> {
        self.calls.lock().unwrap().push(Call {
            kind,
            track_id: track_id.to_string(),
            extra_keys: extra_keys.clone(),
            disable_progress,
        });
        if self.fail_on == Some(track_id) {
            return Err(DownloadError::Transfer("disk full".to_string()));
        }
        Ok(())
    }
}

fn setup(server: &MockServer, locale: &str) -> (AppContext, ApiClient) {
    let config = support::config(&server.uri(), 1, &[("SPOTGRAB_LOCALE", locale)]);
    let ctx = AppContext::new(config).unwrap();
    let client = ApiClient::new(&ctx, std::sync::Arc::new(support::StaticTokens::default()))
        .with_retry_delay(std::time::Duration::ZERO);
    (ctx, client)
}

fn track_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "artists": [{"id": "ar1", "name": "The Band"}],
        "track_number": 1,
        "disc_number": 1,
    })
}

async fn mount_album(server: &MockServer, album_id: &str, track_ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/albums/{album_id}")))
        .and(query_param("market", "from_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": album_id,
            "name": format!("Album {album_id}"),
            "artists": [{"id": "ar1", "name": "The Band"}],
        })))
        .mount(server)
        .await;

    let items: Vec<Value> = track_ids
        .iter()
        .map(|id| track_json(id, &format!("Song {id}")))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/albums/{album_id}/tracks")))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_album_hands_every_track_over_in_order() {
    let server = MockServer::start().await;
    mount_album(&server, "al1", &["t1", "t2", "t3"]).await;

    let (ctx, client) = setup(&server, "en");
    let catalog = Catalog::new(&client, &ctx.config);
    let downloader = RecordingDownloader::default();
    Orchestrator::new(&catalog, &downloader)
        .with_progress(false)
        .download_album("al1")
        .await
        .unwrap();

    let calls = downloader.calls();
    let ids: Vec<&str> = calls.iter().map(|c| c.track_id.as_str()).collect();
    assert_eq!(ids, ["t1", "t2", "t3"]);

    for (n, call) in calls.iter().enumerate() {
        assert_eq!(call.kind, SourceKind::Album);
        assert!(call.disable_progress);
        assert_eq!(call.extra_keys.len(), 2);
        assert_eq!(call.extra_keys["album_num"], format!("{:02}", n + 1));
        assert_eq!(call.extra_keys["album_id"], "al1");
    }
}

#[tokio::test]
async fn test_album_lookup_uses_configured_locale() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/albums/al1"))
        .and(query_param("market", "from_token"))
        .and(query_param("locale", "ja"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "al1",
            "name": "アルバム",
            "artists": [{"id": "ar1", "name": "バンド"}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (ctx, client) = setup(&server, "ja");
    let catalog = Catalog::new(&client, &ctx.config);
    let (artist, album) = catalog.album_name("al1").await.unwrap();

    assert_eq!(artist, "バンド");
    assert_eq!(album, "アルバム");
}

#[tokio::test]
async fn test_album_with_no_tracks_downloads_nothing() {
    let server = MockServer::start().await;
    mount_album(&server, "al1", &[]).await;

    let (ctx, client) = setup(&server, "en");
    let catalog = Catalog::new(&client, &ctx.config);
    let downloader = RecordingDownloader::default();
    Orchestrator::new(&catalog, &downloader)
        .with_progress(false)
        .download_album("al1")
        .await
        .unwrap();

    assert!(downloader.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_album_fails_before_any_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"status": 404, "message": "Non existing id"}
        })))
        .mount(&server)
        .await;

    let (ctx, client) = setup(&server, "en");
    let catalog = Catalog::new(&client, &ctx.config);
    let downloader = RecordingDownloader::default();
    let err = Orchestrator::new(&catalog, &downloader)
        .with_progress(false)
        .download_album("missing")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api(ref e) if e.status == "404"), "got {err:?}");
    assert!(downloader.calls().is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_downloader_error_stops_the_album() {
    let server = MockServer::start().await;
    mount_album(&server, "al1", &["t1", "t2", "t3"]).await;

    let (ctx, client) = setup(&server, "en");
    let catalog = Catalog::new(&client, &ctx.config);
    let downloader = RecordingDownloader::failing_on("t2");
    let err = Orchestrator::new(&catalog, &downloader)
        .with_progress(false)
        .download_album("al1")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Download(DownloadError::Transfer(_))));
    assert_eq!(downloader.calls().len(), 2);
}

#[tokio::test]
async fn test_artist_downloads_each_album_with_fresh_numbering() {
    let server = MockServer::start().await;
    let page2 = format!("{}/artists/ar1/albums/next", server.uri());
    Mock::given(method("GET"))
        .and(path("/artists/ar1/albums"))
        .and(query_param("include_groups", "album,single"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "al1"}],
            "next": page2,
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/artists/ar1/albums/next"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "al2"}],
            "next": null,
        })))
        .mount(&server)
        .await;
    mount_album(&server, "al1", &["a1", "a2", "a3"]).await;
    mount_album(&server, "al2", &["b1", "b2", "b3"]).await;

    let (ctx, client) = setup(&server, "en");
    let catalog = Catalog::new(&client, &ctx.config);
    let downloader = RecordingDownloader::default();
    Orchestrator::new(&catalog, &downloader)
        .with_progress(false)
        .download_artist_albums("ar1")
        .await
        .unwrap();

    let calls = downloader.calls();
    assert_eq!(calls.len(), 6);

    let seen: Vec<(&str, &str, &str)> = calls
        .iter()
        .map(|c| {
            (
                c.track_id.as_str(),
                c.extra_keys["album_num"].as_str(),
                c.extra_keys["album_id"].as_str(),
            )
        })
        .collect();
    assert_eq!(
        seen,
        [
            ("a1", "01", "al1"),
            ("a2", "02", "al1"),
            ("a3", "03", "al1"),
            ("b1", "01", "al2"),
            ("b2", "02", "al2"),
            ("b3", "03", "al2"),
        ]
    );
}

#[tokio::test]
async fn test_artist_without_albums_does_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/artists/ar1/albums"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [], "next": null})))
        .mount(&server)
        .await;

    let (ctx, client) = setup(&server, "en");
    let catalog = Catalog::new(&client, &ctx.config);
    let downloader = RecordingDownloader::default();
    Orchestrator::new(&catalog, &downloader)
        .with_progress(false)
        .download_artist_albums("ar1")
        .await
        .unwrap();

    assert!(downloader.calls().is_empty());
}

#[tokio::test]
async fn test_plan_collector_resolves_localized_tracks() {
    let server = MockServer::start().await;
    mount_album(&server, "al1", &["t1", "t2"]).await;
    for id in ["t1", "t2"] {
        Mock::given(method("GET"))
            .and(path(format!("/tracks/{id}")))
            .and(query_param("locale", "de"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "name": format!("Lied {id}"),
                "artists": [{"id": "ar1", "name": "Die Band"}, {"id": "ar2", "name": "Gast"}],
                "album": {"id": "al1", "name": "Platte"},
            })))
            .mount(&server)
            .await;
    }

    let (ctx, client) = setup(&server, "de");
    let catalog = Catalog::new(&client, &ctx.config);
    let collector = PlanCollector::new(&catalog);
    Orchestrator::new(&catalog, &collector)
        .with_progress(false)
        .download_album("al1")
        .await
        .unwrap();

    let rows = collector.into_rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].album_num, "01");
    assert_eq!(rows[0].name, "Lied t1");
    assert_eq!(rows[0].artists, "Die Band, Gast");
    assert_eq!(rows[0].album, "Platte");
    assert_eq!(rows[1].album_num, "02");
    assert_eq!(rows[1].id, "t2");
}

#[tokio::test]
async fn test_plan_collector_reports_unavailable_track() {
    let server = MockServer::start().await;
    mount_album(&server, "al1", &["gone"]).await;
    Mock::given(method("GET"))
        .and(path("/tracks/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"status": 404, "message": "Non existing id"}
        })))
        .mount(&server)
        .await;

    let (ctx, client) = setup(&server, "en");
    let catalog = Catalog::new(&client, &ctx.config);
    let collector = PlanCollector::new(&catalog);
    let err = Orchestrator::new(&catalog, &collector)
        .with_progress(false)
        .download_album("al1")
        .await
        .unwrap_err();

    match err {
        Error::Download(DownloadError::Api { track_id, source }) => {
            assert_eq!(track_id, "gone");
            assert_eq!(source.message, "Non existing id");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_single_track_is_handed_over_without_extra_keys() {
    let server = MockServer::start().await;

    let (ctx, client) = setup(&server, "en");
    let catalog = Catalog::new(&client, &ctx.config);
    let downloader = RecordingDownloader::default();
    Orchestrator::new(&catalog, &downloader)
        .download_track("t9")
        .await
        .unwrap();
    Orchestrator::new(&catalog, &downloader)
        .with_progress(false)
        .download_track("t10")
        .await
        .unwrap();

    let calls = downloader.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].kind, SourceKind::Track);
    assert_eq!(calls[0].track_id, "t9");
    assert!(calls[0].extra_keys.is_empty());
    assert!(!calls[0].disable_progress);
    assert!(calls[1].disable_progress);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_plan_collector_single_track_has_no_position() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tracks/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(track_json("t1", "Alone")))
        .mount(&server)
        .await;

    let (ctx, client) = setup(&server, "en");
    let catalog = Catalog::new(&client, &ctx.config);
    let collector = PlanCollector::new(&catalog);
    Orchestrator::new(&catalog, &collector)
        .with_progress(false)
        .download_track("t1")
        .await
        .unwrap();

    let rows = collector.into_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].album_num, "-");
    assert_eq!(rows[0].name, "Alone");
    assert_eq!(rows[0].album, "");
}
