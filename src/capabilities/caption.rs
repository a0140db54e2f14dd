use crate::{
    auth::Credential,
    errors::{Result, Stage},
    modes::{GenerationMode, compose_caption_prompt},
    providers::{GeminiClient, Part},
};

pub struct CaptionWriter {
    gemini: GeminiClient,
    model: String,
    temperature: f32,
}

impl CaptionWriter {
    pub fn new(gemini: GeminiClient, model: &str, temperature: f32) -> Self {
        Self {
            gemini,
            model: model.to_string(),
            temperature,
        }
    }

    pub async fn write(
        &self,
        credential: &Credential,
        source: &str,
        mode: GenerationMode,
    ) -> Result<String> {
        let prompt = compose_caption_prompt(mode, source);
        self.gemini
            .generate_content(
                Stage::Caption,
                &self.model,
                vec![Part::text(&prompt)],
                self.temperature,
                credential,
            )
            .await
    }
}
