use std::{path::PathBuf, sync::Arc};

use crate::{
    auth::Credential,
    capabilities::BinaryArtifact,
    errors::{Result, Stage},
    providers::GeminiClient,
    util::{ArtifactKind, ArtifactStore},
};
use serde_json::{Map, Value, json};

pub struct ImageGenerator {
    gemini: GeminiClient,
    model_name: String,
    artifacts: Arc<dyn ArtifactStore>,
}

impl ImageGenerator {
    pub fn new(gemini: GeminiClient, model_name: &str, artifacts: Arc<dyn ArtifactStore>) -> Self {
        Self {
            gemini,
            model_name: model_name.to_string(),
            artifacts,
        }
    }

    /// Renders `prompt` as a square image and stores it, returning its path.
    pub async fn generate(&self, credential: &Credential, prompt: &str) -> Result<PathBuf> {
        let image = self
            .gemini
            .predict_image(Stage::Imagen, &self.model_name, prompt, credential)
            .await?;

        let mut metadata = Map::new();
        metadata.insert("prompt".to_string(), Value::String(prompt.to_string()));
        metadata.insert("model".to_string(), Value::String(self.model_name.clone()));
        metadata.insert("aspect_ratio".to_string(), json!("1:1"));

        let extension = match image.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            _ => "png",
        };

        let artifact = BinaryArtifact::with_metadata(
            image.data,
            image.mime_type.clone(),
            extension,
            format!("Model: {} | Aspect: 1:1", self.model_name),
            metadata,
        );

        self.artifacts.persist(ArtifactKind::Slop, &artifact).await
    }
}
