use crate::{core::llm::Llm, err, error::MedibotError, map_err};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default Google Generative Language API endpoint.
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Model used for answer generation.
const MODEL: &str = "gemini-2.0-flash";
/// Cap on the generated answer size.
const MAX_OUTPUT_TOKENS: u32 = 500;

/// Client for the Gemini chat completion API.
///
/// Auth goes through the `?key=` query parameter; the system instruction is
/// a top level field, separate from the user contents.
pub struct GeminiChat {
    endpoint: String,
    key: String,
    client: reqwest::Client,
}

impl GeminiChat {
    pub fn new(api_key: &str) -> Self {
        Self::new_with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    pub fn new_with_endpoint(api_key: &str, endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl Llm for GeminiChat {
    fn id(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<Option<String>, MedibotError> {
        let request = GenerateRequest {
            system_instruction: Instruction {
                parts: vec![RequestPart { text: system }],
            },
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: user }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let url = format!(
            "{}/models/{MODEL}:generateContent?key={}",
            self.endpoint, self.key
        );

        let response = match self.client.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Error in Gemini request: {e}");
                return Err(map_err!(Err(e)));
            }
        };

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Gemini request failed with status {status}: {body}");
            return err!(Gemini, "{status}: {body}");
        }

        let response: GenerateResponse = map_err!(response.json().await);

        // Tolerant extraction: anything missing along the way means the
        // model produced no answer, which is not an error.
        let answer = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts)
            .map(|parts| {
                parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|text| !text.is_empty());

        debug!(
            "Gemini finished, answer text present: {}",
            answer.is_some()
        );

        Ok(answer)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    system_instruction: Instruction<'a>,
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Instruction<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
