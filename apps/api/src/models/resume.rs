use serde::{Deserialize, Serialize};

/// Structured fields extracted from a resume by the external parser.
/// Never stored; consumed by the client to build a recommendation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub experience: Vec<String>,
    pub projects: Vec<String>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// The parser either wraps its result as `{success, message, data}` or
/// returns the fields directly. Anything else, including a 2xx body that
/// reports failure, does not decode.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ParseResumeResponse {
    Envelope { data: ParsedResume },
    Bare(ParsedResume),
}

impl From<ParseResumeResponse> for ParsedResume {
    fn from(response: ParseResumeResponse) -> Self {
        match response {
            ParseResumeResponse::Envelope { data } => data,
            ParseResumeResponse::Bare(resume) => resume,
        }
    }
}
