use std::path::Path;

use crate::{
    auth::Credential,
    errors::{Result, Stage},
    modes::{GenerationMode, IntensityLevel, compose_image_prompt},
    providers::{GeminiClient, Part, gemini::mime_type_for},
};
use tokio::fs;
use tracing::debug;

/// Describes the photo as an image-generation prompt in the chosen style.
pub struct ImageAnalyzer {
    gemini: GeminiClient,
    model: String,
    temperature: f32,
}

impl ImageAnalyzer {
    pub fn new(gemini: GeminiClient, model: &str, temperature: f32) -> Self {
        Self {
            gemini,
            model: model.to_string(),
            temperature,
        }
    }

    pub async fn analyze(
        &self,
        credential: &Credential,
        photo: &Path,
        level: IntensityLevel,
        mode: GenerationMode,
        context: Option<&str>,
    ) -> Result<String> {
        let bytes = fs::read(photo).await?;
        let mime_type = mime_type_for(photo.extension().and_then(|ext| ext.to_str()));
        let prompt = compose_image_prompt(mode, level, context);

        debug!(
            target: "gemini",
            model = %self.model,
            image_bytes = bytes.len(),
            prompt_len = prompt.len(),
            "analyzing photo"
        );

        let parts = vec![Part::text(&prompt), Part::image(mime_type, &bytes)];
        self.gemini
            .generate_content(Stage::Vision, &self.model, parts, self.temperature, credential)
            .await
    }
}
