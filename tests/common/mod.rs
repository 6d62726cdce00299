#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Datelike;
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub const PASSWORD: &str = "password123";

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

        // In-memory store keeps the suite independent of a running PostgreSQL
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_staff-management-api"));
        cmd.env("STAFF_API_PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("STAFF_DATABASE_BACKEND", "memory")
            .env("JWT_SECRET", "integration-test-secret")
            .env("SECURITY_BCRYPT_COST", "4")
            .env("SECURITY_ALLOW_REGISTRATION", "true")
            .env("STAFF_ADMIN_PASSWORD", PASSWORD)
            .env_remove("CLOUDINARY_URL")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

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
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
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

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Two-digit prefix every id allocated today starts with
pub fn year_prefix() -> String {
    format!("{:02}", chrono::Local::now().year().rem_euclid(100))
}

/// Register a staff member and return the allocated staff id. Roles beyond
/// `Staff` need a personnel `token`.
pub async fn register(
    client: &reqwest::Client,
    server: &TestServer,
    token: Option<&str>,
    name: &str,
    roles: &str,
) -> Result<String> {
    let mut req = client
        .post(server.url("/auth/register"))
        .json(&json!({ "fullName": name, "password": PASSWORD, "roles": roles }));
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    let resp = req.send().await?;
    anyhow::ensure!(resp.status() == StatusCode::CREATED, "register failed: {}", resp.status());

    let body: Value = resp.json().await?;
    body["data"]["staffID"]
        .as_str()
        .map(str::to_string)
        .context("staffID missing from register response")
}

/// Sign in with the default password and return the access token
pub async fn sign_in(client: &reqwest::Client, server: &TestServer, staff_id: &str) -> Result<String> {
    let resp = client
        .post(server.url("/auth/signin"))
        .json(&json!({ "userID": staff_id, "password": PASSWORD }))
        .send()
        .await?;
    anyhow::ensure!(resp.status() == StatusCode::OK, "sign-in failed: {}", resp.status());

    let body: Value = resp.json().await?;
    body["data"]["accessToken"]
        .as_str()
        .map(str::to_string)
        .context("accessToken missing from sign-in response")
}

/// Token of the administrator the server creates at startup (first id of the year)
pub async fn admin_token(client: &reqwest::Client, server: &TestServer) -> Result<String> {
    sign_in(client, server, &format!("{}001", year_prefix())).await
}
