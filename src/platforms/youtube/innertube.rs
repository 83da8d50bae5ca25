//! Minimal InnerTube player client.
//!
//! The Android client context returns direct stream URLs in
//! `streamingData` (no signature deciphering), which keeps this a plain
//! JSON POST + parse.

use std::time::Duration;

use anyhow::anyhow;
use serde_json::json;

const DEFAULT_ENDPOINT: &str = "https://www.youtube.com";
const CLIENT_NAME: &str = "ANDROID";
const CLIENT_VERSION: &str = "19.29.37";
const ANDROID_SDK_VERSION: u32 = 30;
const USER_AGENT: &str = "com.google.android.youtube/19.29.37 (Linux; U; Android 11) gzip";

#[derive(Clone)]
pub struct InnertubeClient {
    http: reqwest::Client,
    endpoint: String,
    request_timeout: Duration,
}

impl InnertubeClient {
    pub fn new(http: reqwest::Client, request_timeout: Duration) -> Self {
        Self::with_endpoint(http, DEFAULT_ENDPOINT, request_timeout)
    }

    pub fn with_endpoint(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            request_timeout,
        }
    }

    pub fn user_agent() -> &'static str {
        USER_AGENT
    }

    /// Fetches the player response for one video id.
    pub async fn player(&self, video_id: &str) -> anyhow::Result<serde_json::Value> {
        let body = json!({
            "context": {
                "client": {
                    "clientName": CLIENT_NAME,
                    "clientVersion": CLIENT_VERSION,
                    "androidSdkVersion": ANDROID_SDK_VERSION,
                    "hl": "en",
                    "gl": "US",
                }
            },
            "videoId": video_id,
            "contentCheckOk": true,
            "racyCheckOk": true,
        });

        let response = self
            .http
            .post(format!("{}/youtubei/v1/player", self.endpoint))
            .timeout(self.request_timeout)
            .header("Content-Type", "application/json")
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("player endpoint returned HTTP {}", status));
        }

        response.json().await.map_err(Into::into)
    }
}
