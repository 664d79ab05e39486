#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const SECRET_KEY: &str = "integration-test-secret";

/// A server child process owned by one test. Dropping it kills the process.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // DATABASE_URL is inherited; the test environment swaps in the jobly_test database
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_jobly-api"));
        cmd.env("APP_ENV", "test")
            .env("PORT", port.to_string())
            .env("SECRET_KEY", SECRET_KEY)
            .env("DATABASE_RUN_MIGRATIONS", "true")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// A fresh server for the calling test, or `None` when no database is configured.
///
/// The process lives as long as the returned value, including when the
/// readiness wait fails.
pub async fn ensure_server() -> Result<Option<TestServer>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping end-to-end test");
        return Ok(None);
    }

    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(20)).await?;
    Ok(Some(server))
}

pub fn admin_token() -> String {
    jobly_api::auth::create_token("test-admin", true, SECRET_KEY, 1).expect("admin token")
}

pub fn user_token(username: &str) -> String {
    jobly_api::auth::create_token(username, false, SECRET_KEY, 1).expect("user token")
}

/// Short unique suffix so concurrent tests never collide on keys.
pub fn unique(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &id[..12])
}

/// Create a company as admin and return its handle.
pub async fn create_company(server: &TestServer, num_employees: i32) -> Result<String> {
    let handle = unique("c");
    let res = reqwest::Client::new()
        .post(server.url("/companies"))
        .bearer_auth(admin_token())
        .json(&json!({
            "handle": handle,
            "name": format!("Company {}", handle),
            "description": "Test company",
            "numEmployees": num_employees,
            "logoUrl": "http://c.img",
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "create company: {}", res.status());
    Ok(handle)
}

/// Create a job as admin and return its id.
pub async fn create_job(server: &TestServer, handle: &str, title: &str, salary: i32, equity: f64) -> Result<i64> {
    let res = reqwest::Client::new()
        .post(server.url("/jobs"))
        .bearer_auth(admin_token())
        .json(&json!({
            "title": title,
            "salary": salary,
            "equity": equity,
            "companyHandle": handle,
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "create job: {}", res.status());
    let body: Value = res.json().await?;
    body["data"]["job"]["id"].as_i64().context("job id")
}
