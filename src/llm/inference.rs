//! Hosted text-generation backend (Hugging Face Inference API style)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::errors::GovRagError;
use crate::errors::Result;
use crate::llm::error_from_response;
use crate::llm::flatten_messages;
use crate::llm::LlmBackend;
use crate::llm::SamplingParams;
use crate::models::PromptMessages;

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    temperature: f32,
    max_new_tokens: u32,
    top_p: f32,
    repetition_penalty: f32,
    do_sample: bool,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// The endpoint answers either with a list or a single object
#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Many(Vec<GeneratedText>),
    One(GeneratedText),
}

/// Remote text-generation endpoint authenticated with an API token
pub struct HostedInferenceBackend {
    client: Client,
    endpoint: String,
    model: String,
    token: String,
    params: SamplingParams,
}

impl HostedInferenceBackend {
    pub fn new(
        client: Client,
        endpoint: String,
        model: String,
        token: String,
        params: SamplingParams,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model,
            token,
            params,
        }
    }
}

#[async_trait]
impl LlmBackend for HostedInferenceBackend {
    async fn generate(&self, messages: &PromptMessages) -> Result<String> {
        let url = format!("{}/models/{}", self.endpoint, self.model);
        let prompt = flatten_messages(messages);
        debug!("Calling hosted inference API: {} ({} chars)", url, prompt.len());

        let request = InferenceRequest {
            inputs: &prompt,
            parameters: InferenceParameters {
                temperature: self.params.temperature,
                max_new_tokens: self.params.max_new_tokens,
                top_p: self.params.top_p,
                repetition_penalty: self.params.repetition_penalty,
                do_sample: self.params.temperature > 0.0,
                return_full_text: false,
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| GovRagError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response("Hosted inference", response).await);
        }

        let result: InferenceResponse = response
            .json()
            .await
            .map_err(|e| GovRagError::Generation(format!("Failed to parse response: {e}")))?;

        let text = match result {
            InferenceResponse::One(generated) => Some(generated.generated_text),
            InferenceResponse::Many(list) => list.into_iter().next().map(|g| g.generated_text),
        };
        text.map(|t| t.trim().to_string())
            .ok_or_else(|| GovRagError::Generation("No generated text in response".to_string()))
    }

    fn describe(&self) -> String {
        format!("hosted-inference ({} @ {})", self.model, self.endpoint)
    }
}
