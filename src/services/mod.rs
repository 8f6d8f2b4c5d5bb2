pub mod gemini;
pub mod pipeline;
pub mod playback;
pub mod prompt;
