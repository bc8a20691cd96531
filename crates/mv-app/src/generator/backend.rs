use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use mv_core::AssetRef;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::generator::ArtifactGenerator;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    reference_urls: &'a [String],
}

#[derive(Deserialize)]
struct GenerateResponse {
    status: String,
    output_url: Option<String>,
    error: Option<String>,
}

/// JSON-over-HTTP client for the image generation service
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    client: Client,
    url: String,
}

impl HttpGenerator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ArtifactGenerator for HttpGenerator {
    async fn generate(
        &self,
        prompt: &str,
        reference_urls: &[String],
    ) -> Result<AssetRef, GenerationError> {
        debug!(
            "POST {} ({} chars, {} references)",
            self.url,
            prompt.len(),
            reference_urls.len()
        );

        let response = self
            .client
            .post(&self.url)
            .json(&GenerateRequest {
                prompt,
                reference_urls,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }

        let result: GenerateResponse = response.json().await?;
        interpret(result)
    }
}

fn interpret(result: GenerateResponse) -> Result<AssetRef, GenerationError> {
    match result.status.as_str() {
        "success" => result
            .output_url
            .filter(|url| !url.is_empty())
            .map(AssetRef::new)
            .ok_or_else(|| GenerationError::Malformed("no output url returned".into())),
        "error" => Err(GenerationError::Service(
            result.error.unwrap_or_else(|| "Unknown error".to_string()),
        )),
        other => Err(GenerationError::Malformed(format!("unexpected status: {other}"))),
    }
}
