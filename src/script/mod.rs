use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PromoError, Result};

/// One scripted slide: a screenshot filename and the caption narrated over it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideSpec {
    pub image: String,
    pub caption: String,
}

/// The full narration script: ordered slides plus a closing message that is
/// narrated over the last slide's image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub slides: Vec<SlideSpec>,
    pub final_message: String,
}

impl Script {
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let script: Script = serde_json::from_str(&raw)?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> Result<()> {
        if self.slides.is_empty() {
            return Err(PromoError::Script("script has no slides".to_string()));
        }
        if self.final_message.trim().is_empty() {
            return Err(PromoError::Script("script has no final message".to_string()));
        }
        Ok(())
    }

    /// The default Path app promo script, used when no script file is given.
    pub fn builtin() -> Self {
        let slides = [
            ("home.png", "Welcome to Path, your daily companion for Bible study. Start each day with a verse of the day and your personalized study plan."),
            ("reader.png", "Read through passages with a clean, distraction-free interface. Take your time to reflect on God's word."),
            ("progress.png", "Track your reading progress and build consistency with daily streaks. See how far you've come in your journey."),
            ("search.png", "Search through the entire Bible to find verses and passages that speak to you."),
            ("favorites.png", "Save your favorite verses and access them anytime for encouragement and reflection."),
            ("ai_summary.png", "Get deeper insights with optional AI-powered explanations, powered by your own self-hosted server for complete privacy."),
            ("settings.png", "Customize your experience with your preferred translation, reading pace, and study reminders."),
        ];

        Script {
            slides: slides
                .into_iter()
                .map(|(image, caption)| SlideSpec {
                    image: image.to_string(),
                    caption: caption.to_string(),
                })
                .collect(),
            final_message: "Path - Building consistent Bible study habits, one day at a time. Download now and start your journey.".to_string(),
        }
    }
}
