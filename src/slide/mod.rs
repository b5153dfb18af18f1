use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{PromoError, Result};
use crate::script::Script;

pub const MIN_SLIDE_SECS: f64 = 5.0;
pub const NARRATION_PAD_SECS: f64 = 1.0;

/// A script entry whose screenshot was found on disk.
#[derive(Debug, Clone)]
pub struct PlannedSlide {
    pub index: usize,
    pub image_path: PathBuf,
    pub caption: String,
}

/// A fully built slide: image, narration audio and computed duration.
#[derive(Debug, Clone)]
pub struct Slide {
    pub image_path: PathBuf,
    pub audio_path: PathBuf,
    pub duration: f64,
}

impl Slide {
    pub fn new(image_path: PathBuf, audio_path: PathBuf, audio_secs: f64) -> Self {
        Self {
            image_path,
            audio_path,
            duration: slide_duration(audio_secs),
        }
    }
}

/// A slide holds its image for at least five seconds, and one second
/// longer than its narration when the narration runs long.
pub fn slide_duration(audio_secs: f64) -> f64 {
    (audio_secs + NARRATION_PAD_SECS).max(MIN_SLIDE_SECS)
}

/// Resolve script entries against the screenshots directory. A missing
/// screenshot skips that slide with a warning rather than failing the run.
pub fn plan_slides(script: &Script, screenshots_dir: &Path) -> Vec<PlannedSlide> {
    let mut planned = Vec::with_capacity(script.slides.len());

    for (index, spec) in script.slides.iter().enumerate() {
        let image_path = screenshots_dir.join(&spec.image);
        if !image_path.exists() {
            warn!("{} not found, skipping...", image_path.display());
            continue;
        }
        planned.push(PlannedSlide {
            index,
            image_path,
            caption: spec.caption.clone(),
        });
    }

    planned
}

/// Append the closing-message slide, narrated over the last surviving
/// slide's image. An N-slide timeline becomes N+1 clips. Fails when no
/// screenshot survived planning.
pub fn append_final_slide(
    slides: &mut Vec<Slide>,
    audio_path: PathBuf,
    audio_secs: f64,
) -> Result<()> {
    let image_path = slides
        .last()
        .map(|slide| slide.image_path.clone())
        .ok_or(PromoError::EmptyTimeline)?;
    slides.push(Slide::new(image_path, audio_path, audio_secs));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::SlideSpec;
    use std::fs;

    fn script_of(images: &[&str]) -> Script {
        Script {
            slides: images
                .iter()
                .map(|image| SlideSpec {
                    image: image.to_string(),
                    caption: format!("About {}", image),
                })
                .collect(),
            final_message: "The end.".to_string(),
        }
    }

    #[test]
    fn duration_floor_is_five_seconds() {
        assert_eq!(slide_duration(0.0), 5.0);
        assert_eq!(slide_duration(3.2), 5.0);
        // 4.0s of audio plus padding lands exactly on the floor
        assert_eq!(slide_duration(4.0), 5.0);
    }

    #[test]
    fn long_narration_extends_the_slide() {
        assert_eq!(slide_duration(4.5), 5.5);
        assert_eq!(slide_duration(12.0), 13.0);
    }

    #[test]
    fn plan_keeps_all_present_screenshots_in_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            fs::write(dir.path().join(name), b"png").unwrap();
        }

        let planned = plan_slides(&script_of(&["a.png", "b.png", "c.png"]), dir.path());
        assert_eq!(planned.len(), 3);
        assert_eq!(planned[0].index, 0);
        assert_eq!(planned[2].caption, "About c.png");
    }

    #[test]
    fn plan_skips_missing_screenshots() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"png").unwrap();
        fs::write(dir.path().join("c.png"), b"png").unwrap();

        let planned = plan_slides(&script_of(&["a.png", "b.png", "c.png"]), dir.path());
        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].index, 0);
        assert_eq!(planned[1].index, 2);
    }

    #[test]
    fn plan_of_all_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let planned = plan_slides(&script_of(&["a.png"]), dir.path());
        assert!(planned.is_empty());
    }

    #[test]
    fn final_slide_reuses_last_surviving_image() {
        let mut slides = vec![
            Slide::new(
                PathBuf::from("shots/a.png"),
                PathBuf::from("tmp/voiceover_0.mp3"),
                6.0,
            ),
            Slide::new(
                PathBuf::from("shots/c.png"),
                PathBuf::from("tmp/voiceover_2.mp3"),
                3.0,
            ),
        ];

        append_final_slide(&mut slides, PathBuf::from("tmp/final_message.mp3"), 7.5).unwrap();

        assert_eq!(slides.len(), 3);
        let last = slides.last().unwrap();
        assert_eq!(last.image_path, PathBuf::from("shots/c.png"));
        assert_eq!(last.audio_path, PathBuf::from("tmp/final_message.mp3"));
        assert_eq!(last.duration, 8.5);
    }

    #[test]
    fn full_script_yields_one_clip_per_entry_plus_final() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            fs::write(dir.path().join(name), b"png").unwrap();
        }

        let planned = plan_slides(&script_of(&["a.png", "b.png", "c.png"]), dir.path());
        let mut slides: Vec<Slide> = planned
            .iter()
            .map(|entry| {
                Slide::new(
                    entry.image_path.clone(),
                    PathBuf::from(format!("tmp/voiceover_{}.mp3", entry.index)),
                    4.0,
                )
            })
            .collect();
        append_final_slide(&mut slides, PathBuf::from("tmp/final_message.mp3"), 4.0).unwrap();

        assert_eq!(slides.len(), 4);
        assert_eq!(slides[3].image_path, dir.path().join("c.png"));
    }

    #[test]
    fn final_slide_requires_a_surviving_slide() {
        let mut slides = Vec::new();
        let result =
            append_final_slide(&mut slides, PathBuf::from("tmp/final_message.mp3"), 4.0);
        assert!(matches!(result, Err(PromoError::EmptyTimeline)));
        assert!(slides.is_empty());
    }
}
