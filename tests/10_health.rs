mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn health_reports_database_ok() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };

    let res = reqwest::get(server.url("/health")).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["data"]["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_404() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };

    let res = reqwest::get(server.url("/no-such-route")).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn dropped_server_stops_listening() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let health = server.url("/health");
    assert_eq!(reqwest::get(&health).await?.status(), StatusCode::OK);

    drop(server);

    assert!(reqwest::get(&health).await.is_err());
    Ok(())
}
