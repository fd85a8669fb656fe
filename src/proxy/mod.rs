use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::PromptError;
use crate::provider::{DynBackend, HttpReply};
use crate::wire::{
    AnalysisType, AnalyzeRequest, AnalyzeResponse, BusinessSuggestions, ErrorBody, ImproveRequest,
    ImproveResponse, ImprovementKind, ANALYZE_FUNCTION, IMPROVE_FUNCTION,
};

const UNAVAILABLE: &str = "The AI service is temporarily unavailable. Please try again later.";

/// One call to the remote AI proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyRequest {
    BusinessAnalysis { idea: String },
    GuidedQa { qa_text: String },
    Improve { prompt: String, kind: ImprovementKind },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResponse {
    Analysis(BusinessSuggestions),
    Text(String),
}

/// Thin client over the two proxy functions. No retries and no caching:
/// one request in, one parsed result or one typed error out.
pub struct AiProxyClient {
    backend: DynBackend,
}

impl AiProxyClient {
    pub fn new(backend: DynBackend) -> Self {
        Self { backend }
    }

    pub async fn call(&self, req: &ProxyRequest) -> Result<ParsedResponse, PromptError> {
        match req {
            ProxyRequest::BusinessAnalysis { idea } => {
                let body = AnalyzeRequest {
                    business_idea: idea.trim().to_string(),
                    analysis_type: AnalysisType::BusinessAnalysis,
                };
                let resp: AnalyzeResponse = self.post(ANALYZE_FUNCTION, &body).await?;
                if resp.result.trim().is_empty() {
                    return Err(PromptError::ResponseFormat("no result received from analysis".into()));
                }
                let value = parse_embedded_json(&resp.result)?;
                Ok(ParsedResponse::Analysis(validate_suggestions(value)?))
            }
            ProxyRequest::GuidedQa { qa_text } => {
                let body = AnalyzeRequest {
                    business_idea: qa_text.clone(),
                    analysis_type: AnalysisType::GuidedQa,
                };
                let resp: AnalyzeResponse = self.post(ANALYZE_FUNCTION, &body).await?;
                non_empty_text(resp.result, "synthesized prompt")
            }
            ProxyRequest::Improve { prompt, kind } => {
                let body = ImproveRequest { original_prompt: prompt.clone(), improvement_type: *kind };
                let resp: ImproveResponse = self.post(IMPROVE_FUNCTION, &body).await?;
                non_empty_text(resp.improved_prompt, "improved prompt")
            }
        }
    }

    pub async fn analyze_business(&self, idea: &str) -> Result<BusinessSuggestions, PromptError> {
        match self.call(&ProxyRequest::BusinessAnalysis { idea: idea.to_string() }).await? {
            ParsedResponse::Analysis(s) => Ok(s),
            ParsedResponse::Text(_) => Err(PromptError::ResponseFormat("expected suggestions".into())),
        }
    }

    pub async fn synthesize_guided(&self, qa_text: &str) -> Result<String, PromptError> {
        expect_text(self.call(&ProxyRequest::GuidedQa { qa_text: qa_text.to_string() }).await?)
    }

    pub async fn improve(&self, prompt: &str, kind: ImprovementKind) -> Result<String, PromptError> {
        expect_text(self.call(&ProxyRequest::Improve { prompt: prompt.to_string(), kind }).await?)
    }

    async fn post<B, R>(&self, function: &str, body: &B) -> Result<R, PromptError>
    where
        B: serde::Serialize,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_value(body)
            .map_err(|e| PromptError::Validation(format!("request could not be encoded: {e}")))?;
        debug!(function, "calling AI proxy");
        let reply = self.backend.invoke_function(function, &payload).await?;
        if !reply.is_success() {
            return Err(server_error(function, &reply));
        }
        serde_json::from_str::<R>(&reply.body).map_err(|e| {
            PromptError::ResponseFormat(format!("{function} returned an unexpected body: {e}"))
        })
    }
}

fn expect_text(r: ParsedResponse) -> Result<String, PromptError> {
    match r {
        ParsedResponse::Text(t) => Ok(t),
        ParsedResponse::Analysis(_) => Err(PromptError::ResponseFormat("expected text".into())),
    }
}

fn non_empty_text(text: String, what: &str) -> Result<ParsedResponse, PromptError> {
    if text.trim().is_empty() {
        return Err(PromptError::ResponseFormat(format!("empty {what}")));
    }
    Ok(ParsedResponse::Text(text.trim().to_string()))
}

/// Maps a non-2xx reply to `Server`. Missing server-side credentials are
/// reported generically so their names never reach the user.
fn server_error(function: &str, reply: &HttpReply) -> PromptError {
    let message = serde_json::from_str::<ErrorBody>(&reply.body)
        .map(|b| b.error)
        .unwrap_or_default();
    if is_configuration_error(&message) {
        warn!(function, status = reply.status, "AI proxy is missing its server credential");
        return PromptError::Server(UNAVAILABLE.into());
    }
    if message.trim().is_empty() {
        return PromptError::Server(format!("The AI service returned status {}.", reply.status));
    }
    PromptError::Server(message)
}

/// Matches the proxy's `<NAME>_API_KEY is not configured` failure.
fn is_configuration_error(message: &str) -> bool {
    let Some(head) = message.trim().strip_suffix(" is not configured") else {
        return false;
    };
    let name = head.rsplit(|c: char| c.is_whitespace() || c == ':').next().unwrap_or_default();
    name.len() > "_API_KEY".len()
        && name.ends_with("_API_KEY")
        && name.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Parse model output that should be a JSON object, tolerating prose
/// around it: direct parse first, then the first balanced `{...}`.
pub fn parse_embedded_json(text: &str) -> Result<Value, PromptError> {
    if let Ok(v) = serde_json::from_str::<Value>(text.trim()) {
        if v.is_object() {
            return Ok(v);
        }
    }
    if let Some(obj) = extract_first_json_object(text) {
        if let Ok(v) = serde_json::from_str::<Value>(obj) {
            warn!("AI response contained extra text around its JSON object");
            return Ok(v);
        }
    }
    Err(PromptError::ResponseFormat("response did not contain a JSON object".into()))
}

/// Extracts the first top-level JSON object substring from a string.
/// Handles nested braces and braces inside string literals.
fn extract_first_json_object(s: &str) -> Option<&str> {
    let mut start = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in s.bytes().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' if start.is_some() => in_string = true,
            b'{' => {
                if start.is_none() {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|st| &s[st..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Shape check for a business analysis: `suggestedPages` must be a
/// non-empty list of strings.
fn validate_suggestions(value: Value) -> Result<BusinessSuggestions, PromptError> {
    let pages_ok = value
        .get("suggestedPages")
        .and_then(Value::as_array)
        .map(|a| !a.is_empty() && a.iter().all(Value::is_string))
        .unwrap_or(false);
    if !pages_ok {
        return Err(PromptError::Validation("suggestions are missing a list of pages".into()));
    }
    serde_json::from_value(value)
        .map_err(|e| PromptError::Validation(format!("suggestions have an unexpected shape: {e}")))
}
