mod caption;
mod image;
mod vision;

pub use caption::CaptionWriter;
pub use image::ImageGenerator;
pub use vision::ImageAnalyzer;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    auth::CredentialResolver,
    config::GeminiConfig,
    errors::Result,
    modes::{GenerationMode, IntensityLevel},
    providers::GeminiClient,
    util::ArtifactStore,
};
use async_trait::async_trait;
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub struct BinaryArtifact {
    pub data: Vec<u8>,
    pub media_type: String,
    pub file_extension: String,
    pub summary: String,
    pub metadata: Map<String, Value>,
}

impl BinaryArtifact {
    pub fn new(
        data: Vec<u8>,
        media_type: impl Into<String>,
        file_extension: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self::with_metadata(data, media_type, file_extension, summary, Map::new())
    }

    pub fn with_metadata(
        data: Vec<u8>,
        media_type: impl Into<String>,
        file_extension: impl Into<String>,
        summary: impl Into<String>,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            data,
            media_type: media_type.into(),
            file_extension: file_extension.into(),
            summary: summary.into(),
            metadata,
        }
    }
}

/// The three remote operations the pipeline sequences.
#[async_trait]
pub trait GenerationStages: Send + Sync {
    /// Photo plus styled instruction in, image-generation prompt out.
    async fn analyze_image(
        &self,
        photo: &Path,
        level: IntensityLevel,
        mode: GenerationMode,
        context: Option<&str>,
    ) -> Result<String>;

    /// Prompt in, path of the stored generated image out.
    async fn generate_image(&self, prompt: &str) -> Result<PathBuf>;

    async fn generate_caption(&self, source: &str, mode: GenerationMode) -> Result<String>;
}

/// Gemini/Imagen backed [`GenerationStages`]. Every operation resolves the
/// credential afresh, so a key swapped between runs is picked up next call.
pub struct GenerationClient {
    resolver: CredentialResolver,
    analyzer: ImageAnalyzer,
    generator: ImageGenerator,
    captioner: CaptionWriter,
}

impl GenerationClient {
    pub fn new(
        config: &GeminiConfig,
        resolver: CredentialResolver,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Result<Self> {
        let gemini = GeminiClient::new(config)?;

        Ok(Self {
            resolver,
            analyzer: ImageAnalyzer::new(
                gemini.clone(),
                &config.vision_model,
                config.vision_temperature,
            ),
            generator: ImageGenerator::new(gemini.clone(), &config.image_model, artifacts),
            captioner: CaptionWriter::new(gemini, &config.text_model, config.caption_temperature),
        })
    }
}

#[async_trait]
impl GenerationStages for GenerationClient {
    async fn analyze_image(
        &self,
        photo: &Path,
        level: IntensityLevel,
        mode: GenerationMode,
        context: Option<&str>,
    ) -> Result<String> {
        let credential = self.resolver.resolve().await?;
        self.analyzer
            .analyze(&credential, photo, level, mode, context)
            .await
    }

    async fn generate_image(&self, prompt: &str) -> Result<PathBuf> {
        let credential = self.resolver.resolve().await?;
        self.generator.generate(&credential, prompt).await
    }

    async fn generate_caption(&self, source: &str, mode: GenerationMode) -> Result<String> {
        let credential = self.resolver.resolve().await?;
        self.captioner.write(&credential, source, mode).await
    }
}
