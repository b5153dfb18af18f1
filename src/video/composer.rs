use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use crate::error::{PromoError, Result};
use crate::slide::Slide;

const FPS: u32 = 24;
const VIDEO_BITRATE: &str = "5000k";
const X264_PRESET: &str = "medium";
const OUTPUT_HEIGHT: u32 = 1080;
const MUSIC_VOLUME: f64 = 0.2;

pub struct VideoComposer {
    work_dir: PathBuf,
}

impl VideoComposer {
    pub fn new(work_dir: PathBuf) -> Self {
        Self { work_dir }
    }

    /// Render every slide to a segment, concatenate them into one timeline,
    /// mix in background music when `music_path` exists, and write the final
    /// video to `output_path`. Returns the timeline duration in seconds.
    pub async fn compose(
        &self,
        slides: &[Slide],
        music_path: &Path,
        output_path: &Path,
    ) -> Result<f64> {
        let mut segment_paths = Vec::with_capacity(slides.len());
        for (i, slide) in slides.iter().enumerate() {
            let segment_path = self.work_dir.join(format!("segment_{}.mp4", i));
            info!(
                "  Rendering segment {}/{} ({:.1}s)...",
                i + 1,
                slides.len(),
                slide.duration
            );
            self.render_segment(slide, &segment_path)?;
            segment_paths.push(segment_path);
        }

        let merged = self.work_dir.join("merged.mp4");
        self.concat_segments(&segment_paths, &merged).await?;

        let timeline_secs = probe_duration(&merged)?;

        if music_path.exists() {
            info!("Found background music: {}", music_path.display());
            self.mix_music(&merged, music_path, timeline_secs, output_path)?;
            info!("Background music added");
        } else {
            info!("No background music found. Video will use voiceover only.");
            info!(
                "To add music, place a file at {} or run the fetch-music command.",
                music_path.display()
            );
            tokio::fs::copy(&merged, output_path).await?;
        }

        Ok(timeline_secs)
    }

    /// One slide becomes one H.264 segment: the image looped for the slide
    /// duration with its narration as the audio track.
    fn render_segment(&self, slide: &Slide, output_path: &Path) -> Result<()> {
        let output = Command::new("ffmpeg")
            .args(["-y", "-loop", "1", "-i"])
            .arg(&slide.image_path)
            .arg("-i")
            .arg(&slide.audio_path)
            .args([
                "-vf",
                &format!("scale=-2:{}", OUTPUT_HEIGHT),
                "-t",
                &slide.duration.to_string(),
                "-r",
                &FPS.to_string(),
                "-pix_fmt",
                "yuv420p",
                "-c:v",
                "libx264",
                "-preset",
                X264_PRESET,
                "-b:v",
                VIDEO_BITRATE,
                "-c:a",
                "aac",
                "-map",
                "0:v:0",
                "-map",
                "1:a:0",
            ])
            .arg(output_path)
            .output()
            .map_err(|e| PromoError::Ffmpeg(format!("failed to run ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PromoError::Ffmpeg(format!(
                "segment render failed for {}: {}",
                slide.image_path.display(),
                stderr
            )));
        }
        Ok(())
    }

    async fn concat_segments(&self, segments: &[PathBuf], output_path: &Path) -> Result<()> {
        info!("Combining {} video segments...", segments.len());

        let concat_file = self.work_dir.join("concat.txt");
        tokio::fs::write(&concat_file, concat_manifest(segments)?).await?;

        let output = Command::new("ffmpeg")
            .args(["-y", "-f", "concat", "-safe", "0", "-i"])
            .arg(&concat_file)
            .args(["-c", "copy"])
            .arg(output_path)
            .output()
            .map_err(|e| PromoError::Ffmpeg(format!("failed to run ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PromoError::Ffmpeg(format!("concat failed: {}", stderr)));
        }
        Ok(())
    }

    /// Lay the music under the narration: looped then trimmed to the
    /// timeline duration, at 20% volume, narration untouched on top.
    fn mix_music(
        &self,
        video_path: &Path,
        music_path: &Path,
        timeline_secs: f64,
        output_path: &Path,
    ) -> Result<()> {
        let output = Command::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(video_path)
            .arg("-i")
            .arg(music_path)
            .arg("-filter_complex")
            .arg(music_mix_filter(timeline_secs))
            .args([
                "-map", "0:v:0", "-map", "[aout]", "-c:v", "copy", "-c:a", "aac", "-b:a", "192k",
            ])
            .arg(output_path)
            .output()
            .map_err(|e| PromoError::Ffmpeg(format!("failed to run ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PromoError::Ffmpeg(format!("music mix failed: {}", stderr)));
        }
        Ok(())
    }
}

/// concat demuxer manifest with absolute paths, one `file` line per segment.
fn concat_manifest(segments: &[PathBuf]) -> Result<String> {
    let mut manifest = String::new();
    for segment in segments {
        let abs = segment
            .canonicalize()
            .map_err(|e| PromoError::Ffmpeg(format!("failed to resolve segment path: {}", e)))?;
        manifest.push_str(&format!("file '{}'\n", abs.display()));
    }
    Ok(manifest)
}

/// Filter graph for the background bed: infinite aloop then a hard atrim to
/// the timeline length covers both the short-music (loop) and long-music
/// (trim) cases, and `duration=first` pins the mix to the narration track.
fn music_mix_filter(timeline_secs: f64) -> String {
    format!(
        "[1:a]aloop=loop=-1:size=2e+09,atrim=0:{:.3},volume={}[bg];\
         [0:a][bg]amix=inputs=2:duration=first:normalize=0[aout]",
        timeline_secs, MUSIC_VOLUME
    )
}

/// Container duration in seconds, via ffprobe.
pub fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .map_err(|e| PromoError::Probe {
            path: path.to_path_buf(),
            reason: format!("failed to run ffprobe: {}", e),
        })?;

    if !output.status.success() {
        return Err(PromoError::Probe {
            path: path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .trim()
        .parse::<f64>()
        .map_err(|e| PromoError::Probe {
            path: path.to_path_buf(),
            reason: format!("unparseable duration '{}': {}", stdout.trim(), e),
        })
}
