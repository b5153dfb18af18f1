mod composer;

pub use composer::{probe_duration, VideoComposer};
