use anyhow::{Context, Result};
use shared::{AnswerDocument, AskRequest, ErrorResponse, ModelResult, ASK_PATH};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};

pub struct Client {
    server_url: String,
    http_client: reqwest::Client,
}

/// An answer with its round-trip time
pub struct Reply {
    pub document: AnswerDocument,
    pub elapsed: Duration,
}

impl Client {
    pub fn new(server_url: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn ask_url(&self) -> String {
        format!("{}{}", self.server_url, ASK_PATH)
    }

    /// Send one question to the server
    pub async fn ask(&self, question: &str) -> Result<Reply> {
        let started = Instant::now();

        tracing::debug!("Asking {}", self.ask_url());

        let response = self
            .http_client
            .post(self.ask_url())
            .json(&AskRequest::new(question))
            .send()
            .await
            .context("Failed to send question")?;

        if !response.status().is_success() {
            let status = response.status();
            if let Ok(error) = response.json::<ErrorResponse>().await {
                anyhow::bail!("Server error ({}): {}", status, error.message);
            }
            anyhow::bail!("Request failed with status: {}", status);
        }

        let document = response
            .json()
            .await
            .context("Failed to parse answer")?;

        Ok(Reply {
            document,
            elapsed: started.elapsed(),
        })
    }
}

/// An answer card for the terminal.
///
/// The heading is always the question as typed, whatever the document holds.
pub struct Card<'a> {
    question: &'a str,
    reply: &'a Reply,
}

impl<'a> Card<'a> {
    pub fn new(question: &'a str, reply: &'a Reply) -> Self {
        Self { question, reply }
    }
}

impl fmt::Display for Card<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let empty = ModelResult::default();
        let result = self.reply.document.model_result.as_ref().unwrap_or(&empty);

        writeln!(f, "== {}", self.question)?;
        writeln!(f)?;
        writeln!(f, "{}", result.response.as_deref().unwrap_or(""))?;

        if !result.citations.is_empty() {
            writeln!(f)?;
            writeln!(f, "Sources")?;
            for (idx, citation) in result.citations.iter().enumerate() {
                writeln!(f, "  [Source {}]", idx + 1)?;
                writeln!(f, "    ID:      {}", citation.display_id())?;
                writeln!(f, "    Source:  {}", citation.display_source())?;
                writeln!(f, "    Content: {}", citation.display_content())?;
            }
        }

        writeln!(f)?;
        write!(f, "Response took {:.1}s", self.reply.elapsed.as_secs_f64())
    }
}

async fn ask_and_print(client: &Client, question: &str) -> Result<()> {
    let reply = client.ask(question).await?;
    println!("{}\n", Card::new(question, &reply));
    Ok(())
}

/// Ask `question` once, or read questions from stdin when it is empty
pub async fn run(server_url: &str, question: &str) -> Result<()> {
    let client = Client::new(server_url)?;

    let question = question.trim();
    if !question.is_empty() {
        return ask_and_print(&client, question).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        if let Err(e) = ask_and_print(&client, question).await {
            tracing::error!("{:#}", e);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(json: &str, millis: u64) -> Reply {
        Reply {
            document: serde_json::from_str(json).unwrap(),
            elapsed: Duration::from_millis(millis),
        }
    }

    #[test]
    fn test_client_creation() {
        let client = Client::new("http://localhost:5000/").unwrap();
        assert_eq!(client.ask_url(), "http://localhost:5000/api/ask");
    }

    #[test]
    fn test_card_with_citations() {
        let reply = reply(
            r#"{"modelResult": {
                "question": "recorded question",
                "response": "Builds run nightly.",
                "citations": [
                    {"id": "doc-1", "metadata": {"source": "ci.md"}, "page_content": "Nightly at 02:00."},
                    {"metadata": {"id": "doc-2"}}
                ]
            }}"#,
            1234,
        );

        let card = Card::new("When do builds run?", &reply).to_string();

        assert!(card.starts_with("== When do builds run?\n"));
        assert!(!card.contains("recorded question"));
        assert!(card.contains("Builds run nightly."));
        assert!(card.contains("[Source 1]"));
        assert!(card.contains("ID:      doc-1"));
        assert!(card.contains("Source:  ci.md"));
        assert!(card.contains("[Source 2]"));
        assert!(card.contains("ID:      doc-2"));
        assert!(card.contains("Source:  N/A"));
        assert!(card.contains("Content: No content available."));
        assert!(card.ends_with("Response took 1.2s"));
    }

    #[test]
    fn test_card_without_model_result() {
        let reply = reply(r#"{"unexpected": true}"#, 80);
        let card = Card::new("Hello?", &reply).to_string();

        assert!(card.starts_with("== Hello?\n"));
        assert!(!card.contains("Sources"));
        assert!(card.ends_with("Response took 0.1s"));
    }
}
