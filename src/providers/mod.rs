pub mod gemini;

pub use gemini::{GeminiClient, GeneratedImage, Part};
