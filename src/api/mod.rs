mod tts;

pub use tts::TtsClient;
