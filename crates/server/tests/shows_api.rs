//! Show management API tests.
//!
//! Drive the router in-process with a temp SQLite store and a mock source.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture};
use kanshi_core::{CategoryStore, NotificationPayload, ShowDetails, ShowStore};

// ============================================================================
// Add-show flow
// ============================================================================

#[tokio::test]
async fn test_create_show_runs_initial_check() {
    let fixture = TestFixture::new().await;
    let url = fixtures::show_url("frieren");
    fixture
        .source
        .set_probe_hit(&url, 4, &fixtures::episode_url("frieren", 4))
        .await;

    let response = fixture
        .post(
            "/api/v1/shows",
            json!({
                "title": "Frieren",
                "url": url,
                "current_episode": 3,
                "total_episodes": 28
            }),
        )
        .await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["show"]["title"], "Frieren");
    assert_eq!(response.body["show"]["current_episode"], 3);
    assert_eq!(response.body["show"]["has_new_episode"], true);
    assert!(response.body["show"]["last_checked"].is_string());

    let updates = response.body["updates"].as_array().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0]["new_episode"], 4);
    assert_eq!(
        updates[0]["episode_url"],
        fixtures::episode_url("frieren", 4)
    );

    assert_eq!(
        fixture.notifier.sent().await,
        vec![NotificationPayload::Single {
            title: "Frieren".to_string(),
            episode: 4,
        }]
    );
}

#[tokio::test]
async fn test_create_show_without_new_episode() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/shows",
            json!({
                "title": "Frieren",
                "url": fixtures::show_url("frieren"),
                "current_episode": 3
            }),
        )
        .await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["show"]["has_new_episode"], false);
    assert_eq!(response.body["updates"], json!([]));
    assert!(fixture.notifier.sent().await.is_empty());
}

#[tokio::test]
async fn test_create_show_reads_total_from_details() {
    let fixture = TestFixture::new().await;
    let url = fixtures::show_url("frieren");
    fixture
        .source
        .set_details(
            &url,
            ShowDetails {
                total_episodes: 28,
                image_url: Some("https://www.turkanime.co/imajlar/anime/frieren.jpg".to_string()),
            },
        )
        .await;

    let response = fixture
        .post("/api/v1/shows", json!({ "title": "Frieren", "url": url }))
        .await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["show"]["total_episodes"], 28);
    assert_eq!(
        response.body["show"]["image_url"],
        "https://www.turkanime.co/imajlar/anime/frieren.jpg"
    );
}

#[tokio::test]
async fn test_create_show_explicit_total_wins() {
    let fixture = TestFixture::new().await;
    let url = fixtures::show_url("frieren");
    fixture
        .source
        .set_details(
            &url,
            ShowDetails {
                total_episodes: 28,
                image_url: None,
            },
        )
        .await;

    let response = fixture
        .post(
            "/api/v1/shows",
            json!({ "title": "Frieren", "url": url, "total_episodes": 12 }),
        )
        .await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["show"]["total_episodes"], 12);
}

#[tokio::test]
async fn test_create_show_strips_category_suffix() {
    let fixture = TestFixture::new().await;
    fixture
        .store
        .replace_categories(&["Aksiyon".to_string(), "Dram".to_string(), "Macera".to_string()])
        .unwrap();

    let response = fixture
        .post(
            "/api/v1/shows",
            json!({
                "title": "Vinland SagaAksiyon, Dram, Macera",
                "url": fixtures::show_url("vinland-saga")
            }),
        )
        .await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["show"]["title"], "Vinland Saga");
}

#[tokio::test]
async fn test_create_show_keeps_clean_title_without_categories() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/shows",
            json!({
                "title": "  Vinland Saga  ",
                "url": fixtures::show_url("vinland-saga")
            }),
        )
        .await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["show"]["title"], "Vinland Saga");
}

#[tokio::test]
async fn test_create_duplicate_show_conflicts() {
    let fixture = TestFixture::new().await;
    fixture.seed_show("frieren", 3, 28);

    let response = fixture
        .post(
            "/api/v1/shows",
            json!({ "title": "Frieren", "url": fixtures::show_url("frieren") }),
        )
        .await;

    assert_status!(response, StatusCode::CONFLICT);
    assert!(response.body["error"].as_str().unwrap().contains("frieren"));
}

#[tokio::test]
async fn test_create_show_rejects_foreign_host() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/shows",
            json!({ "title": "Frieren", "url": "https://example.com/anime/frieren" }),
        )
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(fixture.source.probe_calls().await.is_empty());
}

#[tokio::test]
async fn test_create_show_rejects_lookalike_hosts() {
    let fixture = TestFixture::new().await;

    for url in [
        "https://evil.example/anime/frieren?ref=turkanime.co",
        "https://turkanime.co.evil.example/anime/frieren",
    ] {
        let response = fixture
            .post("/api/v1/shows", json!({ "title": "Frieren", "url": url }))
            .await;
        assert_status!(response, StatusCode::BAD_REQUEST);
    }

    let response = fixture.get("/api/v1/shows").await;
    assert_eq!(response.body["total"], 0);
}

#[tokio::test]
async fn test_create_show_rejects_blank_title() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/shows",
            json!({ "title": "   ", "url": fixtures::show_url("frieren") }),
        )
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Reading and listing
// ============================================================================

#[tokio::test]
async fn test_list_shows_flagged_first() {
    let fixture = TestFixture::new().await;
    fixture.seed_show("akira", 1, 1);
    fixture.seed_show("berserk", 2, 25);
    let flagged = fixture.seed_show("zetman", 4, 13);
    fixture.store.set_has_new_episode(&flagged.id, true).unwrap();

    let response = fixture.get("/api/v1/shows").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["total"], 3);
    let titles: Vec<&str> = response.body["shows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["zetman", "akira", "berserk"]);
}

#[tokio::test]
async fn test_get_show() {
    let fixture = TestFixture::new().await;
    let show = fixture.seed_show("frieren", 3, 28);

    let response = fixture.get(&format!("/api/v1/shows/{}", show.id)).await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["id"], show.id);
    assert_eq!(response.body["status"], "watching");
}

#[tokio::test]
async fn test_get_unknown_show_not_found() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/shows/nope").await;

    assert_status!(response, StatusCode::NOT_FOUND);
    assert!(response.body["error"].is_string());
}

// ============================================================================
// Progress and status
// ============================================================================

#[tokio::test]
async fn test_update_episode_clears_flag() {
    let fixture = TestFixture::new().await;
    let show = fixture.seed_show("frieren", 3, 28);
    fixture.store.set_has_new_episode(&show.id, true).unwrap();

    let response = fixture
        .put(
            &format!("/api/v1/shows/{}/episode", show.id),
            json!({ "episode": 4 }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["current_episode"], 4);
    assert_eq!(response.body["has_new_episode"], false);
}

#[tokio::test]
async fn test_update_episode_clamps_negative() {
    let fixture = TestFixture::new().await;
    let show = fixture.seed_show("frieren", 3, 28);

    let response = fixture
        .put(
            &format!("/api/v1/shows/{}/episode", show.id),
            json!({ "episode": -5 }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["current_episode"], 0);
}

#[tokio::test]
async fn test_update_episode_to_total_completes_show() {
    let fixture = TestFixture::new().await;
    let show = fixture.seed_show("frieren", 27, 28);

    let response = fixture
        .put(
            &format!("/api/v1/shows/{}/episode", show.id),
            json!({ "episode": 28 }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "completed");
}

#[tokio::test]
async fn test_update_episode_unknown_show() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .put("/api/v1/shows/nope/episode", json!({ "episode": 4 }))
        .await;

    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_status() {
    let fixture = TestFixture::new().await;
    let show = fixture.seed_show("frieren", 3, 28);

    let response = fixture
        .put(
            &format!("/api/v1/shows/{}/status", show.id),
            json!({ "status": "paused" }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "paused");
}

#[tokio::test]
async fn test_clear_new_episode_keeps_progress() {
    let fixture = TestFixture::new().await;
    let show = fixture.seed_show("frieren", 3, 28);
    fixture.store.set_has_new_episode(&show.id, true).unwrap();

    let response = fixture
        .delete(&format!("/api/v1/shows/{}/new-episode", show.id))
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["has_new_episode"], false);
    assert_eq!(response.body["current_episode"], 3);
}

#[tokio::test]
async fn test_delete_show() {
    let fixture = TestFixture::new().await;
    let show = fixture.seed_show("frieren", 3, 28);

    let response = fixture.delete(&format!("/api/v1/shows/{}", show.id)).await;
    assert_status!(response, StatusCode::NO_CONTENT);

    let response = fixture.get(&format!("/api/v1/shows/{}", show.id)).await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

// ============================================================================
// Watch records
// ============================================================================

#[tokio::test]
async fn test_mark_watched_advances_progress() {
    let fixture = TestFixture::new().await;
    let show = fixture.seed_show("frieren", 3, 28);
    fixture.store.set_has_new_episode(&show.id, true).unwrap();

    let response = fixture
        .post(
            &format!("/api/v1/shows/{}/episodes/5/watched", show.id),
            json!({ "rating": 9 }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["record"]["episode_number"], 5);
    assert_eq!(response.body["record"]["rating"], 9);
    assert_eq!(response.body["show"]["current_episode"], 5);
    assert_eq!(response.body["show"]["has_new_episode"], false);
}

#[tokio::test]
async fn test_mark_earlier_episode_keeps_progress() {
    let fixture = TestFixture::new().await;
    let show = fixture.seed_show("frieren", 10, 28);

    let response = fixture
        .post_empty(&format!("/api/v1/shows/{}/episodes/2/watched", show.id))
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["show"]["current_episode"], 10);
    assert!(response.body["record"]["rating"].is_null());
}

#[tokio::test]
async fn test_list_episode_records() {
    let fixture = TestFixture::new().await;
    let show = fixture.seed_show("frieren", 0, 28);

    for episode in [1, 2] {
        let response = fixture
            .post_empty(&format!(
                "/api/v1/shows/{}/episodes/{}/watched",
                show.id, episode
            ))
            .await;
        assert_status!(response, StatusCode::OK);
    }

    let response = fixture
        .get(&format!("/api/v1/shows/{}/episodes", show.id))
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["show_id"], show.id);
    assert_eq!(response.body["episodes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_mark_watched_stores_notes() {
    let fixture = TestFixture::new().await;
    let show = fixture.seed_show("frieren", 0, 28);

    let response = fixture
        .post(
            &format!("/api/v1/shows/{}/episodes/1/watched", show.id),
            json!({ "rating": 8, "notes": "  great opening  " }),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["record"]["notes"], "great opening");

    let response = fixture
        .post(
            &format!("/api/v1/shows/{}/episodes/2/watched", show.id),
            json!({ "notes": "   " }),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert!(response.body["record"]["notes"].is_null());

    let response = fixture
        .get(&format!("/api/v1/shows/{}/episodes", show.id))
        .await;
    let episodes = response.body["episodes"].as_array().unwrap();
    assert_eq!(episodes[0]["notes"], "great opening");
    assert!(episodes[1]["notes"].is_null());
}

#[tokio::test]
async fn test_mark_watched_unknown_show() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post_empty("/api/v1/shows/nope/episodes/1/watched")
        .await;

    assert_status!(response, StatusCode::NOT_FOUND);
}
