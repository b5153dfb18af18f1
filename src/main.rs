mod api;
mod error;
mod music;
mod script;
mod slide;
mod video;

use std::path::{Path, PathBuf};

use api::TtsClient;
use clap::{Args, Parser, Subcommand};
use error::{PromoError, Result};
use script::Script;
use slide::Slide;
use tracing::{error, info};
use video::{probe_duration, VideoComposer};

#[derive(Parser, Debug)]
#[command(name = "promo-video")]
#[command(about = "Assemble a promo video from screenshots, narration and music", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the promo video
    Render(RenderArgs),
    /// Download a background music track from the built-in catalog
    FetchMusic(FetchMusicArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Narration script as JSON (defaults to the built-in script)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Directory containing the screenshots named by the script
    #[arg(long, default_value = "screenshots")]
    screenshots_dir: PathBuf,

    /// Directory holding the music file and the rendered output
    #[arg(long, default_value = "promo")]
    promo_dir: PathBuf,

    /// Background music file (defaults to <promo-dir>/background_music.mp3)
    #[arg(long)]
    music: Option<PathBuf>,

    /// Output video file (defaults to <promo-dir>/path_promo_video.mp4)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Working directory for temporary files
    #[arg(short = 'w', long)]
    work_dir: Option<PathBuf>,

    /// Narration language code
    #[arg(long, default_value = "en")]
    lang: String,

    /// Slow narration speech rate
    #[arg(long)]
    slow: bool,

    /// Keep temporary files after the run
    #[arg(long)]
    keep_temp: bool,
}

#[derive(Args, Debug)]
struct FetchMusicArgs {
    /// Catalog key of the track to download
    #[arg(default_value = "calm")]
    choice: String,

    /// Directory to place background_music.mp3 in
    #[arg(long, default_value = "promo")]
    promo_dir: PathBuf,

    /// List the catalog and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Render(args) => run_render(args).await,
        Command::FetchMusic(args) => run_fetch_music(args).await,
    };

    if let Err(e) = outcome {
        error!("{}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run_render(args: RenderArgs) -> Result<()> {
    let script = match &args.script {
        Some(path) => Script::load(path).await?,
        None => Script::builtin(),
    };

    info!("Creating promo video ({} scripted slides)...", script.slides.len());

    tokio::fs::create_dir_all(&args.promo_dir).await?;
    let (work_dir, generated_work_dir) = match &args.work_dir {
        Some(dir) => (dir.clone(), false),
        None => (
            std::env::temp_dir().join(format!("promo-video-{}", std::process::id())),
            true,
        ),
    };
    tokio::fs::create_dir_all(&work_dir).await?;

    let music_path = args
        .music
        .clone()
        .unwrap_or_else(|| args.promo_dir.join("background_music.mp3"));
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| args.promo_dir.join("path_promo_video.mp4"));

    let result = build_video(&args, &script, &work_dir, &music_path, &output_path).await;

    if !args.keep_temp {
        if generated_work_dir {
            tokio::fs::remove_dir_all(&work_dir).await.ok();
        } else {
            // a user-supplied work dir may hold unrelated files
            remove_scratch_files(&work_dir).await;
        }
    }

    let timeline_secs = result?;

    let size_bytes = tokio::fs::metadata(&output_path).await?.len();
    info!("Promo video created successfully!");
    info!("  Location: {}", output_path.display());
    info!("  File size: {:.2} MB", size_bytes as f64 / (1024.0 * 1024.0));
    info!("  Duration: {:.1} seconds", timeline_secs);

    Ok(())
}

async fn build_video(
    args: &RenderArgs,
    script: &Script,
    work_dir: &Path,
    music_path: &Path,
    output_path: &Path,
) -> Result<f64> {
    let tts = TtsClient::new(args.lang.clone(), args.slow)?;

    // 1. Narrated slides for every screenshot present on disk
    info!("Step 1/4: Processing screenshots...");
    let planned = slide::plan_slides(script, &args.screenshots_dir);
    if planned.is_empty() {
        return Err(PromoError::EmptyTimeline);
    }

    let mut slides = Vec::with_capacity(planned.len() + 1);
    for entry in &planned {
        info!("  Processing {}...", entry.image_path.display());
        let audio_path = work_dir.join(format!("voiceover_{}.mp3", entry.index));
        tts.synthesize(&entry.caption, &audio_path).await?;
        let audio_secs = probe_duration(&audio_path)?;
        slides.push(Slide::new(entry.image_path.clone(), audio_path, audio_secs));
    }

    // 2. Closing message over the last surviving screenshot
    info!("Step 2/4: Adding final message...");
    let final_audio = work_dir.join("final_message.mp3");
    tts.synthesize(&script.final_message, &final_audio).await?;
    let final_secs = probe_duration(&final_audio)?;
    slide::append_final_slide(&mut slides, final_audio, final_secs)?;

    // 3-4. Sequence, mix, export
    info!("Step 3/4: Combining {} slides...", slides.len());
    info!("Step 4/4: Exporting video to {}...", output_path.display());
    info!("  This may take a few minutes...");
    let composer = VideoComposer::new(work_dir.to_path_buf());
    composer.compose(&slides, music_path, output_path).await
}

/// Best-effort removal of the files this run writes into the work dir,
/// leaving anything else in place.
async fn remove_scratch_files(work_dir: &Path) {
    let Ok(mut entries) = tokio::fs::read_dir(work_dir).await else {
        return;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        if let Some(name) = entry.file_name().to_str() {
            if is_scratch_file(name) {
                tokio::fs::remove_file(entry.path()).await.ok();
            }
        }
    }
}

fn is_scratch_file(name: &str) -> bool {
    name == "concat.txt"
        || name == "merged.mp4"
        || name == "final_message.mp3"
        || (name.starts_with("voiceover_") && name.ends_with(".mp3"))
        || (name.starts_with("segment_") && name.ends_with(".mp4"))
}

async fn run_fetch_music(args: FetchMusicArgs) -> Result<()> {
    if args.list {
        music::print_catalog();
        return Ok(());
    }

    let track = match music::find_track(&args.choice) {
        Ok(track) => track,
        Err(e) => {
            let keys: Vec<&str> = music::TRACKS.iter().map(|t| t.key).collect();
            error!("Available options: {}", keys.join(", "));
            return Err(e);
        }
    };

    let output_path = args.promo_dir.join("background_music.mp3");
    music::download(track, &output_path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_names_are_recognized() {
        assert!(is_scratch_file("voiceover_0.mp3"));
        assert!(is_scratch_file("segment_12.mp4"));
        assert!(is_scratch_file("final_message.mp3"));
        assert!(is_scratch_file("concat.txt"));
        assert!(is_scratch_file("merged.mp4"));
        assert!(!is_scratch_file("notes.txt"));
        assert!(!is_scratch_file("background_music.mp3"));
        assert!(!is_scratch_file("voiceover_0.wav"));
    }

    #[tokio::test]
    async fn scratch_cleanup_spares_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "voiceover_0.mp3",
            "segment_0.mp4",
            "concat.txt",
            "merged.mp4",
            "final_message.mp3",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), b"keep").unwrap();

        remove_scratch_files(dir.path()).await;

        assert!(dir.path().join("notes.txt").exists());
        assert!(!dir.path().join("voiceover_0.mp3").exists());
        assert!(!dir.path().join("segment_0.mp4").exists());
        assert!(!dir.path().join("concat.txt").exists());
    }
}
