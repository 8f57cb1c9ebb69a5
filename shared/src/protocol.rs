use serde::{Deserialize, Serialize};

/// Client -> Server: Ask a question
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    /// The question text; absent or `null` means empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

/// Server -> Client: Error response for the API routes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always "error"
    pub status: String,

    /// Human readable reason
    pub message: String,
}

/// Server -> Client: Answer document, as far as a client renders it.
///
/// The server treats the document as opaque JSON; only the fields the
/// answer card shows are modelled here and everything is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerDocument {
    #[serde(rename = "modelResult", default)]
    pub model_result: Option<ModelResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelResult {
    #[serde(default)]
    pub question: Option<String>,

    /// Markdown answer text
    #[serde(default)]
    pub response: Option<String>,

    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// A source passage backing the answer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub metadata: Option<CitationMetadata>,

    #[serde(default)]
    pub page_content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitationMetadata {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub source: Option<String>,
}

impl AskRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
        }
    }

    /// Parse a raw request body.
    ///
    /// Anything that is not a JSON object with an optional string `question`
    /// (empty body, invalid JSON, `null`, arrays, a numeric question) yields
    /// the empty request instead of an error.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(value @ serde_json::Value::Object(_)) => {
                serde_json::from_value(value).unwrap_or_default()
            }
            _ => Self::default(),
        }
    }

    /// The question text, empty when none was given
    pub fn question(&self) -> &str {
        self.question.as_deref().unwrap_or("")
    }
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

impl Citation {
    /// Citation ID, falling back to the metadata ID
    pub fn display_id(&self) -> &str {
        self.id
            .as_deref()
            .or_else(|| self.metadata.as_ref().and_then(|m| m.id.as_deref()))
            .unwrap_or("N/A")
    }

    pub fn display_source(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.source.as_deref())
            .unwrap_or("N/A")
    }

    pub fn display_content(&self) -> &str {
        self.page_content
            .as_deref()
            .unwrap_or("No content available.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_request_from_body() {
        let req = AskRequest::from_body(br#"{"question": "What is TSI?"}"#);
        assert_eq!(req.question(), "What is TSI?");
    }

    #[test]
    fn test_ask_request_missing_question() {
        let req = AskRequest::from_body(br#"{"other": 1}"#);
        assert_eq!(req.question(), "");
    }

    #[test]
    fn test_ask_request_malformed_bodies() {
        let bodies: [&[u8]; 7] = [
            b"",
            b"not json",
            br#"["why?"]"#,
            b"null",
            b"[1, 2]",
            br#"{"question": 42}"#,
            br#"{"question": null}"#,
        ];
        for body in bodies {
            assert_eq!(AskRequest::from_body(body), AskRequest::default());
        }
    }

    #[test]
    fn test_error_response_shape() {
        let json = serde_json::to_value(ErrorResponse::new(crate::NO_FIXTURES_MESSAGE)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "error", "message": "No response files found"})
        );
    }

    #[test]
    fn test_citation_fallbacks() {
        let citation: Citation =
            serde_json::from_str(r#"{"metadata": {"id": "meta-7"}}"#).unwrap();
        assert_eq!(citation.display_id(), "meta-7");
        assert_eq!(citation.display_source(), "N/A");
        assert_eq!(citation.display_content(), "No content available.");

        let citation: Citation = serde_json::from_str(
            r#"{"id": "c1", "metadata": {"id": "meta-7", "source": "docs/a.pdf"}, "page_content": "text"}"#,
        )
        .unwrap();
        assert_eq!(citation.display_id(), "c1");
        assert_eq!(citation.display_source(), "docs/a.pdf");
        assert_eq!(citation.display_content(), "text");
    }

    #[test]
    fn test_answer_document_tolerates_extra_fields() {
        let doc: AnswerDocument = serde_json::from_str(
            r#"{"modelResult": {"question": "q", "response": "**hi**", "latency": 3}, "trace": []}"#,
        )
        .unwrap();
        let result = doc.model_result.unwrap();
        assert_eq!(result.response.as_deref(), Some("**hi**"));
        assert!(result.citations.is_empty());
    }
}
