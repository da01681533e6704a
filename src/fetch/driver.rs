// src/fetch/driver.rs
use anyhow::{bail, Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::{path::Path, time::Duration};
use tokio::{
    process::{Child, Command},
    time::{sleep, Instant},
};
use tracing::{debug, info};

/// A chromedriver process plus one WebDriver session against it, spoken
/// directly over the W3C HTTP protocol.
pub struct Driver {
    child: Child,
    http: Client,
    base: String,
    session: String,
}

const STARTUP_POLLS: usize = 40;
const STARTUP_POLL_INTERVAL: Duration = Duration::from_millis(250);
const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(500);

impl Driver {
    /// Spawn chromedriver on `port` and open a headless Chrome session.
    pub async fn launch(chromedriver: &Path, port: u16) -> Result<Self> {
        let child = Command::new(chromedriver)
            .arg(format!("--port={}", port))
            .kill_on_drop(true)
            .spawn()
            .with_context(|| {
                format!("Failed to launch chromedriver at {}", chromedriver.display())
            })?;

        let http = Client::new();
        let base = format!("http://127.0.0.1:{}", port);

        let mut ready = false;
        for _ in 0..STARTUP_POLLS {
            if let Ok(resp) = http.get(format!("{}/status", base)).send().await {
                if resp.status().is_success() {
                    ready = true;
                    break;
                }
            }
            sleep(STARTUP_POLL_INTERVAL).await;
        }
        if !ready {
            bail!("chromedriver did not become ready on port {}", port);
        }

        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "goog:chromeOptions": {
                        "args": [
                            "--headless=new",
                            "start-maximized",
                            "disable-infobars",
                            "disable-search-engine-choice-screen",
                        ]
                    }
                }
            }
        });
        let resp: Value = http
            .post(format!("{}/session", base))
            .json(&capabilities)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let session = resp["value"]["sessionId"]
            .as_str()
            .context("chromedriver returned no sessionId")?
            .to_string();
        info!(session = %session, "webdriver session started");

        Ok(Driver {
            child,
            http,
            base,
            session,
        })
    }

    fn session_url(&self, endpoint: &str) -> String {
        format!("{}/session/{}/{}", self.base, self.session, endpoint)
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        self.http
            .post(self.session_url("url"))
            .json(&json!({ "url": url }))
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("Failed to navigate to {}", url))?;
        Ok(())
    }

    /// Current DOM serialized as HTML, i.e. the rendered page.
    pub async fn page_source(&self) -> Result<String> {
        let resp: Value = self
            .http
            .get(self.session_url("source"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        resp["value"]
            .as_str()
            .map(str::to_string)
            .context("chromedriver returned no page source")
    }

    /// Whether an element matching `css` is currently present.
    pub async fn has_element(&self, css: &str) -> Result<bool> {
        let resp = self
            .http
            .post(self.session_url("element"))
            .json(&json!({ "using": "css selector", "value": css }))
            .send()
            .await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            s => bail!("element lookup failed with status {}", s),
        }
    }

    /// Poll for `css` until it appears or `timeout` elapses.
    pub async fn wait_for(&self, css: &str, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.has_element(css).await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            debug!(css, "selector not present yet");
            sleep(ELEMENT_POLL_INTERVAL).await;
        }
    }

    /// End the session and kill the chromedriver process.
    pub async fn quit(mut self) -> Result<()> {
        let _ = self
            .http
            .delete(format!("{}/session/{}", self.base, self.session))
            .send()
            .await;
        self.child.kill().await.context("Failed to stop chromedriver")?;
        Ok(())
    }
}
