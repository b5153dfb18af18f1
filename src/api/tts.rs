use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use tracing::info;

use crate::error::{PromoError, Result};

const TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";

// The endpoint rejects long inputs, so captions are split at word
// boundaries and the MP3 responses appended in order.
const MAX_CHUNK_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct TtsClient {
    client: Client,
    lang: String,
    slow: bool,
}

impl TtsClient {
    pub fn new(lang: String, slow: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self { client, lang, slow })
    }

    /// Synthesize `text` into an MP3 at `output_path`.
    pub async fn synthesize(&self, text: &str, output_path: &Path) -> Result<()> {
        let preview: String = text.chars().take(50).collect();
        info!("Generating voiceover: {}...", preview);

        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(PromoError::Tts("empty narration text".to_string()));
        }

        let total = chunks.len();
        let speed = if self.slow { "0.24" } else { "1" };
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let total_param = total.to_string();
            let idx_param = idx.to_string();
            let textlen_param = chunk.chars().count().to_string();
            let response = self
                .client
                .get(TTS_ENDPOINT)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", self.lang.as_str()),
                    ("ttsspeed", speed),
                    ("q", chunk.as_str()),
                    ("total", total_param.as_str()),
                    ("idx", idx_param.as_str()),
                    ("textlen", textlen_param.as_str()),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(PromoError::Tts(format!(
                    "TTS endpoint returned HTTP {}",
                    response.status()
                )));
            }

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            if !content_type.starts_with("audio/") {
                return Err(PromoError::Tts(format!(
                    "TTS endpoint returned '{}' instead of audio",
                    content_type
                )));
            }

            audio.extend_from_slice(&response.bytes().await?);
        }

        tokio::fs::write(output_path, audio).await?;
        Ok(())
    }
}

/// Split text into whitespace-separated chunks of at most `max_chars`
/// characters each. A single oversized word becomes its own chunk.
fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        if current_chars > 0 && current_chars + 1 + word_chars > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        if current_chars > 0 {
            current.push(' ');
            current_chars += 1;
        }
        current.push_str(word);
        current_chars += word_chars;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunk_text("Welcome to Path.", 200);
        assert_eq!(chunks, vec!["Welcome to Path.".to_string()]);
    }

    #[test]
    fn chunks_respect_limit_and_keep_all_words() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = chunk_text(text, 12);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 12, "chunk too long: {}", chunk);
        }
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn oversized_word_is_its_own_chunk() {
        let chunks = chunk_text("supercalifragilistic yes", 10);
        assert_eq!(chunks[0], "supercalifragilistic");
        assert_eq!(chunks[1], "yes");
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_text("   ", 200).is_empty());
    }
}
