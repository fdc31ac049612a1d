use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::TranslateConfig;
use crate::error::{DubflowError, Result};
use crate::segment::BackendKind;

/// Generation request sent to the seq2seq inference server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub text: String,
    pub max_new_tokens: u32,
    pub num_beams: u32,
    pub length_penalty: f64,
    pub no_repeat_ngram_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forced_bos_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,
}

/// A single seq2seq translation model behind the inference endpoint.
/// Implementations differ only in how they steer generation into the
/// target language.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    fn kind(&self) -> BackendKind;
    fn model(&self) -> &str;
    async fn translate(&self, text: &str, max_new_tokens: u32) -> Result<String>;
}

/// How a backend forces generation into the target language.
#[derive(Debug, Clone)]
enum TargetSteering {
    /// Forced BOS token carrying a language tag (e.g. "eng_Latn")
    ForcedBos(String),
    /// Sentence prefix understood by bilingual models (e.g. ">>en<<")
    Prefix(String),
    /// Explicit source and target language codes
    LanguagePair { source: String, target: String },
}

/// HTTP client for one model on the inference server.
pub struct SeqToSeqBackend {
    client: Client,
    endpoint: String,
    model: String,
    kind: BackendKind,
    length_penalty: f64,
    steering: TargetSteering,
}

impl SeqToSeqBackend {
    pub fn primary(client: Client, config: &TranslateConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.primary_model.clone(),
            kind: BackendKind::Primary,
            length_penalty: 1.1,
            steering: TargetSteering::ForcedBos(config.target_language_tag.clone()),
        }
    }

    pub fn bilingual(client: Client, config: &TranslateConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.bilingual_model.clone(),
            kind: BackendKind::FallbackBilingual,
            length_penalty: 1.15,
            steering: TargetSteering::Prefix(format!(">>{}<<", config.target_language)),
        }
    }

    pub fn multilingual(client: Client, config: &TranslateConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.multilingual_model.clone(),
            kind: BackendKind::FallbackMultilingual,
            length_penalty: 1.15,
            steering: TargetSteering::LanguagePair {
                source: config.source_language.clone(),
                target: config.target_language.clone(),
            },
        }
    }

    fn build_request(&self, text: &str, max_new_tokens: u32) -> GenerationRequest {
        let mut request = GenerationRequest {
            model: self.model.clone(),
            text: text.to_string(),
            max_new_tokens,
            num_beams: 4,
            length_penalty: self.length_penalty,
            no_repeat_ngram_size: 3,
            forced_bos_language: None,
            source_language: None,
            target_language: None,
        };

        match &self.steering {
            TargetSteering::ForcedBos(tag) => {
                request.forced_bos_language = Some(tag.clone());
            }
            TargetSteering::Prefix(prefix) => {
                request.text = format!("{} {}", prefix, text);
            }
            TargetSteering::LanguagePair { source, target } => {
                request.source_language = Some(source.clone());
                request.target_language = Some(target.clone());
            }
        }

        request
    }
}

#[async_trait]
impl TranslationBackend for SeqToSeqBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn translate(&self, text: &str, max_new_tokens: u32) -> Result<String> {
        let request = self.build_request(text, max_new_tokens);
        let url = format!("{}/v1/generate", self.endpoint);

        debug!("Sending generation request to {} for model {}", url, self.model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DubflowError::Translate(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DubflowError::Translate(format!(
                "Inference server error {}: {}",
                status, error_text
            )));
        }

        let generation: GenerationResponse = response
            .json()
            .await
            .map_err(|e| DubflowError::Translate(format!("Invalid server response: {}", e)))?;

        Ok(generation.text)
    }
}

/// Check that the inference server is reachable and has the model loaded.
pub async fn check_model_availability(endpoint: &str, model: &str) -> Result<()> {
    let client = Client::new();
    let url = format!("{}/v1/models/show", endpoint);

    let request = json!({ "name": model });

    let response = client
        .post(&url)
        .json(&request)
        .send()
        .await
        .map_err(|e| DubflowError::Translate(format!("Failed to connect to inference server: {}", e)))?;

    if response.status().is_success() {
        info!("Model '{}' is available", model);
        Ok(())
    } else {
        Err(DubflowError::Translate(format!(
            "Model '{}' is not loaded on {}",
            model, endpoint
        )))
    }
}

/// Build the ordered escalation chain. The primary model is mandatory;
/// an unavailable fallback is skipped with a warning so one missing model
/// does not block a run.
pub async fn build_backend_chain(config: &TranslateConfig) -> Result<Vec<Box<dyn TranslationBackend>>> {
    let client = Client::builder()
        .timeout(Duration::from_secs(300))
        .build()
        .map_err(|e| DubflowError::Translate(format!("HTTP client creation failed: {}", e)))?;

    check_model_availability(&config.endpoint, &config.primary_model).await?;

    let mut chain: Vec<Box<dyn TranslationBackend>> =
        vec![Box::new(SeqToSeqBackend::primary(client.clone(), config))];

    match check_model_availability(&config.endpoint, &config.bilingual_model).await {
        Ok(()) => chain.push(Box::new(SeqToSeqBackend::bilingual(client.clone(), config))),
        Err(e) => warn!("Bilingual fallback unavailable, skipping: {}", e),
    }

    match check_model_availability(&config.endpoint, &config.multilingual_model).await {
        Ok(()) => chain.push(Box::new(SeqToSeqBackend::multilingual(client, config))),
        Err(e) => warn!("Multilingual fallback unavailable, skipping: {}", e),
    }

    Ok(chain)
}
