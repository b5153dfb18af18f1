use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use tracing::info;

use crate::error::{PromoError, Result};

/// A royalty-free background music candidate.
#[derive(Debug, Clone, Copy)]
pub struct MusicTrack {
    pub key: &'static str,
    pub name: &'static str,
    pub url: &'static str,
    pub description: &'static str,
}

pub const TRACKS: &[MusicTrack] = &[
    MusicTrack {
        key: "calm",
        name: "Calm Background Music",
        url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3",
        description: "Gentle, calm instrumental music",
    },
    MusicTrack {
        key: "inspiring",
        name: "Inspiring Background Music",
        url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-2.mp3",
        description: "Uplifting instrumental music",
    },
];

pub fn find_track(key: &str) -> Result<&'static MusicTrack> {
    TRACKS
        .iter()
        .find(|track| track.key == key)
        .ok_or_else(|| PromoError::UnknownTrack(key.to_string()))
}

pub fn print_catalog() {
    println!("Available tracks:");
    for track in TRACKS {
        println!("  {}: {} - {}", track.key, track.name, track.description);
    }
}

/// Download a catalog track to the path the audio mixer reads.
pub async fn download(track: &MusicTrack, output_path: &Path) -> Result<()> {
    info!("Downloading: {}", track.name);
    info!("Description: {}", track.description);
    info!("URL: {}", track.url);

    let client = Client::builder()
        .timeout(Duration::from_secs(300))
        .build()?;

    let response = client.get(track.url).send().await?;
    if !response.status().is_success() {
        return Err(PromoError::Download {
            url: track.url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let data = response.bytes().await?;
    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output_path, data).await?;

    info!("Music saved to: {}", output_path.display());
    Ok(())
}
