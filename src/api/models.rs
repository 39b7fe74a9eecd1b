use serde::{Deserialize, Serialize};

/// Body of `POST /api/analyze`. Absent and `null` fields read as empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzeRequest {
    pub url: Option<String>,
    pub text: Option<String>,
    pub question: Option<String>,
}

/// Trimmed view of an [`AnalyzeRequest`]; empty string means "not provided".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest {
    pub url: String,
    pub text: String,
    pub question: String,
}

impl AnalyzeRequest {
    pub fn normalized(&self) -> NormalizedRequest {
        fn clean(field: &Option<String>) -> String {
            field.as_deref().unwrap_or_default().trim().to_string()
        }

        NormalizedRequest {
            url: clean(&self.url),
            text: clean(&self.text),
            question: clean(&self.question),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}
