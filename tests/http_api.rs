use std::{path::Path, sync::Arc};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
    response::Response,
};
use serde_json::Value;
use simplayer::{
    DataPaths,
    LoadOptions,
    RecommendationIndex,
    data_dir::{CAREER_FILE, SEASON_FILE, STATS_FILE},
    http,
};
use tower::ServiceExt;

const ORIGIN: &str = "http://localhost:3000";

fn write_fixture(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(
        dir.join(CAREER_FILE),
        r#"{"1": [
            {"playerId": 2, "score": 0.95},
            {"playerId": 999, "score": 0.9},
            {"playerId": 3, "score": 0.8}
        ]}"#,
    )?;
    std::fs::write(
        dir.join(SEASON_FILE),
        r#"{"1_2001": [
            {"playerId": 2, "season": 1999, "score": 0.97},
            {"playerId": 404, "season": 2000, "score": 0.96},
            {"playerId": 3, "season": 1990, "score": 0.5}
        ]}"#,
    )?;
    std::fs::write(
        dir.join(STATS_FILE),
        "playerid,player,season,team,PTS,AST\n\
         1,James Smith,2001,BOS,10,4\n\
         1,James Smith,2002,NYK,20,\n\
         2,Tom Jameson,1999,LAL,15,7\n\
         2,Tom Jameson,2003,,18,6\n\
         2,Tom Jameson,2001,LAL,12,5\n\
         3,Alan Ray,2005,,9,1\n",
    )?;
    Ok(())
}

fn app() -> Result<Router, Box<dyn std::error::Error>> {
    let tempdir = tempfile::tempdir()?;
    write_fixture(tempdir.path())?;

    let paths = DataPaths::in_dir(tempdir.path());
    let index = RecommendationIndex::load(&paths, LoadOptions::default())?;
    Ok(http::router(Arc::new(index), vec![ORIGIN.to_string()]))
}

async fn get(uri: &str) -> Result<Response, Box<dyn std::error::Error>> {
    let request = Request::builder().uri(uri).body(Body::empty())?;
    Ok(app()?.oneshot(request).await?)
}

async fn body_json(response: Response) -> Result<Value, Box<dyn std::error::Error>> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn body_text(response: Response) -> Result<String, Box<dyn std::error::Error>> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

fn names(players: &Value) -> Vec<&str> {
    players
        .as_array()
        .map(|list| list.iter().filter_map(|p| p["name"].as_str()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn search_matches_substring_sorted_by_name() -> Result<(), Box<dyn std::error::Error>> {
    let response = get("/api/similarplayer/players?query=JAM").await?;
    assert_eq!(response.status(), StatusCode::OK);

    let players = body_json(response).await?;
    assert_eq!(names(&players), vec!["James Smith", "Tom Jameson"]);

    let james = &players[0];
    assert_eq!(james["playerId"], 1);
    assert_eq!(james["years"], "2001–2002");
    assert_eq!(james["teams"], serde_json::json!(["BOS", "NYK"]));
    assert_eq!(james["careerStats"]["PTS"], 15.0);
    assert_eq!(james["careerStats"]["AST"], 4.0);
    assert!(james.get("similarityScore").is_none());
    Ok(())
}

#[tokio::test]
async fn search_rejects_blank_and_long_queries() -> Result<(), Box<dyn std::error::Error>> {
    let response = get("/api/similarplayer/players?query=%20%20").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await?, "Invalid player name query.");

    let long = "a".repeat(101);
    let response = get(&format!("/api/similarplayer/players?query={long}")).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get("/api/similarplayer/players").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn career_skips_unknown_players() -> Result<(), Box<dyn std::error::Error>> {
    let response = get("/api/similarplayer/career/1").await?;
    assert_eq!(response.status(), StatusCode::OK);

    let players = body_json(response).await?;
    assert_eq!(names(&players), vec!["Tom Jameson", "Alan Ray"]);
    assert_eq!(players[0]["similarityScore"], 0.95);
    assert_eq!(players[1]["similarityScore"], 0.8);
    Ok(())
}

#[tokio::test]
async fn career_honors_limit() -> Result<(), Box<dyn std::error::Error>> {
    let players = body_json(get("/api/similarplayer/career/1?limit=1").await?).await?;
    assert_eq!(names(&players), vec!["Tom Jameson"]);
    Ok(())
}

#[tokio::test]
async fn career_for_player_without_list_is_empty() -> Result<(), Box<dyn std::error::Error>> {
    let response = get("/api/similarplayer/career/3").await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?, serde_json::json!([]));
    Ok(())
}

#[tokio::test]
async fn season_results_describe_the_matched_season() -> Result<(), Box<dyn std::error::Error>> {
    let response = get("/api/similarplayer/season/1/2001").await?;
    assert_eq!(response.status(), StatusCode::OK);

    let players = body_json(response).await?;
    assert_eq!(names(&players), vec!["Tom Jameson", "Alan Ray"]);

    let tom = &players[0];
    assert_eq!(tom["years"], "1999");
    assert_eq!(tom["teams"], serde_json::json!(["LAL"]));
    assert_eq!(tom["seasonStats"]["PTS"], 15.0);
    assert!(tom.get("careerStats").is_none());
    Ok(())
}

#[tokio::test]
async fn season_rejects_non_positive_input() -> Result<(), Box<dyn std::error::Error>> {
    let response = get("/api/similarplayer/season/1/0").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await?, "Invalid player ID or season.");
    Ok(())
}

#[tokio::test]
async fn seasons_are_most_recent_first() -> Result<(), Box<dyn std::error::Error>> {
    let response = get("/api/similarplayer/seasons/2").await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?, serde_json::json!([2003, 2001, 1999]));

    let response = get("/api/similarplayer/seasons/0").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await?, "Invalid player ID.");
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let response = get("/api/nothing-here").await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn responses_carry_security_headers() -> Result<(), Box<dyn std::error::Error>> {
    let response = get("/health").await?;
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-xss-protection"], "1; mode=block");
    Ok(())
}

#[tokio::test]
async fn allowed_origin_is_echoed() -> Result<(), Box<dyn std::error::Error>> {
    let request = Request::builder()
        .uri("/api/similarplayer/seasons/1")
        .header("origin", ORIGIN)
        .body(Body::empty())?;
    let response = app()?.oneshot(request).await?;
    assert_eq!(response.headers()["access-control-allow-origin"], ORIGIN);

    let request = Request::builder()
        .uri("/api/similarplayer/seasons/1")
        .header("origin", "https://elsewhere.example")
        .body(Body::empty())?;
    let response = app()?.oneshot(request).await?;
    assert!(response.headers().get("access-control-allow-origin").is_none());
    Ok(())
}

#[tokio::test]
async fn preflight_is_answered() -> Result<(), Box<dyn std::error::Error>> {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/similarplayer/career/1")
        .header("origin", ORIGIN)
        .header("access-control-request-method", "GET")
        .body(Body::empty())?;
    let response = app()?.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], ORIGIN);
    assert_eq!(headers["access-control-allow-methods"], "GET, OPTIONS");
    Ok(())
}

#[tokio::test]
async fn health_reports_counts() -> Result<(), Box<dyn std::error::Error>> {
    let health = body_json(get("/health").await?).await?;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["players"], 3);
    assert_eq!(health["seasons"], 6);
    assert_eq!(health["careerLists"], 1);
    assert_eq!(health["seasonLists"], 1);
    Ok(())
}
