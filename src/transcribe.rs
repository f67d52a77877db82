use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::settings::settings;

pub const DEFAULT_AUDIO_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Client for an upstream speech-to-text service that accepts raw audio and
/// answers with `{"text": "..."}`.
#[derive(Debug, Clone)]
pub struct HttpTranscriber {
    client: Client,
    endpoint: String,
}

impl HttpTranscriber {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build transcription client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// `None` when no endpoint is configured.
    pub fn from_settings() -> Result<Option<Self>> {
        let s = settings();
        s.transcription
            .endpoint
            .as_deref()
            .map(|endpoint| Self::new(endpoint, Duration::from_secs(s.transcription.timeout_secs)))
            .transpose()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn transcribe(&self, audio: Vec<u8>, content_type: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, content_type)
            .body(audio)
            .send()
            .await
            .context("Transcription request failed")?
            .error_for_status()
            .context("Transcription service returned an error")?;

        let body: TranscriptionResponse = response
            .json()
            .await
            .context("Malformed transcription response")?;
        Ok(body.text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/transcribe")
    }

    #[tokio::test]
    async fn test_transcribe_returns_trimmed_text() {
        let router = Router::new().route(
            "/transcribe",
            post(|body: axum::body::Bytes| async move {
                assert_eq!(&body[..], b"RIFF");
                Json(serde_json::json!({ "text": "  feeling calm today \n" }))
            }),
        );
        let endpoint = serve(router).await;

        let transcriber = HttpTranscriber::new(endpoint, Duration::from_secs(5)).unwrap();
        let text = transcriber
            .transcribe(b"RIFF".to_vec(), "audio/wav")
            .await
            .unwrap();
        assert_eq!(text, "feeling calm today");
    }

    #[tokio::test]
    async fn test_transcribe_error_status() {
        let router = Router::new().route(
            "/transcribe",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let endpoint = serve(router).await;

        let transcriber = HttpTranscriber::new(endpoint, Duration::from_secs(5)).unwrap();
        assert!(transcriber.transcribe(vec![1, 2, 3], "audio/wav").await.is_err());
    }

    #[tokio::test]
    async fn test_transcribe_malformed_body() {
        let router = Router::new().route(
            "/transcribe",
            post(|| async { Json(serde_json::json!({ "transcript": "hi" })) }),
        );
        let endpoint = serve(router).await;

        let transcriber = HttpTranscriber::new(endpoint, Duration::from_secs(5)).unwrap();
        assert!(transcriber.transcribe(vec![0], DEFAULT_AUDIO_TYPE).await.is_err());
    }

    #[test]
    fn test_not_configured_by_default() {
        assert!(HttpTranscriber::from_settings().unwrap().is_none());
    }
}
