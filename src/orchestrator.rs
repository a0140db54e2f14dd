use std::{fmt, path::PathBuf, sync::Arc};

use crate::{
    capabilities::GenerationStages,
    errors::Result,
    modes::{GenerationMode, IntensityLevel, normalize_context},
    store::SlopRecord,
    util::{ArtifactKind, ArtifactStore, local_path},
};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub type ProgressSender = mpsc::UnboundedSender<ProgressUpdate>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Analyze,
    GenerateImage,
    GenerateCaption,
    PersistOriginal,
}

impl PipelineStage {
    pub fn status_message(&self) -> &'static str {
        match self {
            PipelineStage::Analyze => "Analyzing your mundane reality...",
            PipelineStage::GenerateImage => "Generating chaos...",
            PipelineStage::GenerateCaption => "Crafting the perfect caption...",
            PipelineStage::PersistOriginal => "Preserving the evidence...",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Analyze => "analyze",
            PipelineStage::GenerateImage => "generate_image",
            PipelineStage::GenerateCaption => "generate_caption",
            PipelineStage::PersistOriginal => "persist_original",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,
    pub message: &'static str,
}

#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub photo: PathBuf,
    pub level: IntensityLevel,
    pub mode: GenerationMode,
    pub context: Option<String>,
}

impl PipelineRequest {
    pub fn new(
        photo: &str,
        level: IntensityLevel,
        mode: GenerationMode,
        context: Option<&str>,
    ) -> Self {
        Self {
            photo: local_path(photo),
            level,
            mode,
            context: normalize_context(context).map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    pub original_path: PathBuf,
    pub slop_path: PathBuf,
    pub caption: String,
    pub level: IntensityLevel,
}

/// Runs analyze → generate image → generate caption → persist original.
///
/// Stages run strictly in order; the first failure is returned unchanged and
/// nothing after it runs. There is no resume: each call starts from scratch.
/// Writing the result to a record store is left to the caller.
pub struct SlopPipeline {
    stages: Arc<dyn GenerationStages>,
    artifacts: Arc<dyn ArtifactStore>,
}

impl SlopPipeline {
    pub fn new(stages: Arc<dyn GenerationStages>, artifacts: Arc<dyn ArtifactStore>) -> Self {
        Self { stages, artifacts }
    }

    pub async fn run(
        &self,
        request: &PipelineRequest,
        progress: Option<&ProgressSender>,
    ) -> Result<PipelineResult> {
        info!(
            target: "pipeline",
            mode = %request.mode,
            level = %request.level,
            has_context = request.context.is_some(),
            "pipeline started"
        );

        report(progress, PipelineStage::Analyze);
        let description = self
            .stages
            .analyze_image(
                &request.photo,
                request.level,
                request.mode,
                request.context.as_deref(),
            )
            .await
            .inspect_err(|err| failed(PipelineStage::Analyze, err))?;
        debug!(target: "pipeline", description_len = description.len(), "photo analyzed");

        report(progress, PipelineStage::GenerateImage);
        let slop_path = self
            .stages
            .generate_image(&description)
            .await
            .inspect_err(|err| failed(PipelineStage::GenerateImage, err))?;
        debug!(target: "pipeline", path = %slop_path.display(), "slop image stored");

        report(progress, PipelineStage::GenerateCaption);
        let caption = self
            .stages
            .generate_caption(&description, request.mode)
            .await
            .inspect_err(|err| failed(PipelineStage::GenerateCaption, err))?;

        report(progress, PipelineStage::PersistOriginal);
        let original_path = self
            .artifacts
            .copy_in(ArtifactKind::Original, &request.photo)
            .await
            .inspect_err(|err| failed(PipelineStage::PersistOriginal, err))?;

        info!(target: "pipeline", "pipeline finished");

        Ok(PipelineResult {
            original_path,
            slop_path,
            caption,
            level: request.level,
        })
    }

    /// Writes a fresh caption for a stored slop, feeding its current caption
    /// back in as the source text. The record itself is not touched.
    pub async fn regenerate_caption(&self, record: &SlopRecord) -> Result<String> {
        info!(target: "pipeline", id = record.id, mode = %record.mode, "regenerating caption");
        self.stages
            .generate_caption(&record.caption, record.mode)
            .await
    }
}

fn report(progress: Option<&ProgressSender>, stage: PipelineStage) {
    debug!(target: "pipeline", %stage, "entering stage");
    if let Some(sender) = progress {
        // a dropped receiver only means nobody is watching anymore
        let _ = sender.send(ProgressUpdate {
            stage,
            message: stage.status_message(),
        });
    }
}

fn failed(stage: PipelineStage, err: &crate::errors::SlopError) {
    warn!(target: "pipeline", %stage, kind = ?err.kind(), "pipeline aborted");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::{ErrorKind, SlopError, Stage},
        util::ArtifactWriter,
    };
    use async_trait::async_trait;
    use std::{path::Path, sync::Mutex};

    #[derive(Default)]
    struct ScriptedStages {
        calls: Mutex<Vec<&'static str>>,
        fail_image: bool,
        slop_path: PathBuf,
    }

    impl ScriptedStages {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationStages for ScriptedStages {
        async fn analyze_image(
            &self,
            _photo: &Path,
            level: IntensityLevel,
            mode: GenerationMode,
            context: Option<&str>,
        ) -> Result<String> {
            self.calls.lock().unwrap().push("analyze");
            Ok(format!("{mode}/{level}/{}", context.unwrap_or("-")))
        }

        async fn generate_image(&self, _prompt: &str) -> Result<PathBuf> {
            self.calls.lock().unwrap().push("image");
            if self.fail_image {
                return Err(SlopError::upstream(Stage::Imagen, "quota exceeded"));
            }
            Ok(self.slop_path.clone())
        }

        async fn generate_caption(&self, source: &str, mode: GenerationMode) -> Result<String> {
            self.calls.lock().unwrap().push("caption");
            Ok(format!("caption for {source} as {mode}"))
        }
    }

    async fn fixture(
        stages: ScriptedStages,
    ) -> (tempfile::TempDir, PathBuf, Arc<ScriptedStages>, SlopPipeline) {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("photo.jpg");
        std::fs::write(&photo, b"original photo").unwrap();
        let writer = Arc::new(ArtifactWriter::new(dir.path().join("artifacts")).await.unwrap());
        let stages = Arc::new(stages);
        let pipeline = SlopPipeline::new(stages.clone(), writer);
        (dir, photo, stages, pipeline)
    }

    #[tokio::test]
    async fn successful_run_reports_every_stage_in_order() {
        let (_dir, photo, stages, pipeline) = fixture(ScriptedStages {
            slop_path: PathBuf::from("/slops/slop_1.png"),
            ..Default::default()
        })
        .await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = PipelineRequest::new(
            photo.to_str().unwrap(),
            IntensityLevel::Extreme,
            GenerationMode::Reddit,
            Some("  my dog  "),
        );

        let result = pipeline.run(&request, Some(&tx)).await.unwrap();
        drop(tx);

        assert_eq!(result.slop_path, PathBuf::from("/slops/slop_1.png"));
        assert_eq!(result.caption, "caption for reddit/extreme/my dog as reddit");
        assert_eq!(result.level, IntensityLevel::Extreme);
        assert_ne!(result.original_path, photo);
        assert_eq!(std::fs::read(&result.original_path).unwrap(), b"original photo");
        assert_eq!(stages.calls(), vec!["analyze", "image", "caption"]);

        let mut seen = Vec::new();
        while let Some(update) = rx.recv().await {
            assert_eq!(update.message, update.stage.status_message());
            seen.push(update.stage);
        }
        assert_eq!(
            seen,
            vec![
                PipelineStage::Analyze,
                PipelineStage::GenerateImage,
                PipelineStage::GenerateCaption,
                PipelineStage::PersistOriginal,
            ]
        );
    }

    #[tokio::test]
    async fn image_failure_stops_the_pipeline() {
        let (dir, photo, stages, pipeline) = fixture(ScriptedStages {
            fail_image: true,
            ..Default::default()
        })
        .await;
        let request = PipelineRequest::new(
            photo.to_str().unwrap(),
            IntensityLevel::Mild,
            GenerationMode::Facebook,
            None,
        );

        let err = pipeline.run(&request, None).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.upstream_message(), Some("quota exceeded"));
        assert_eq!(stages.calls(), vec!["analyze", "image"]);
        let persisted = std::fs::read_dir(dir.path().join("artifacts")).unwrap().count();
        assert_eq!(persisted, 0);
    }

    #[tokio::test]
    async fn missing_photo_fails_at_persist_after_remote_stages() {
        let (dir, _photo, stages, pipeline) = fixture(ScriptedStages::default()).await;
        let request = PipelineRequest::new(
            dir.path().join("gone.jpg").to_str().unwrap(),
            IntensityLevel::Medium,
            GenerationMode::Etsy,
            None,
        );

        let err = pipeline.run(&request, None).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::LocalIo);
        assert_eq!(stages.calls(), vec!["analyze", "image", "caption"]);
    }

    #[tokio::test]
    async fn reruns_start_from_scratch() {
        let (_dir, photo, stages, pipeline) = fixture(ScriptedStages::default()).await;
        let request = PipelineRequest::new(
            &format!("file://{}", photo.display()),
            IntensityLevel::Medium,
            GenerationMode::Tiktok,
            Some("   "),
        );
        assert!(request.context.is_none());

        let first = pipeline.run(&request, None).await.unwrap();
        let second = pipeline.run(&request, None).await.unwrap();

        assert_ne!(first.original_path, second.original_path);
        assert_eq!(stages.calls().len(), 6);
    }

    #[tokio::test]
    async fn escaped_file_uri_reaches_the_photo() {
        let (dir, _photo, _stages, pipeline) = fixture(ScriptedStages::default()).await;
        let spaced = dir.path().join("my photo.jpg");
        std::fs::write(&spaced, b"spaced photo").unwrap();
        let uri = url::Url::from_file_path(&spaced).unwrap().to_string();
        assert!(uri.contains("%20"));

        let request =
            PipelineRequest::new(&uri, IntensityLevel::Mild, GenerationMode::Instagram, None);
        assert_eq!(request.photo, spaced);

        let result = pipeline.run(&request, None).await.unwrap();
        assert_eq!(std::fs::read(&result.original_path).unwrap(), b"spaced photo");
    }

    #[tokio::test]
    async fn regenerate_caption_uses_stored_caption() {
        let (_dir, _photo, stages, pipeline) = fixture(ScriptedStages::default()).await;
        let record = SlopRecord {
            id: 7,
            original_path: PathBuf::from("/a.jpg"),
            slop_path: PathBuf::from("/b.png"),
            caption: "old caption".to_string(),
            level: IntensityLevel::Mild,
            mode: GenerationMode::Amazon,
            is_favorite: false,
            created_at: chrono::Utc::now(),
        };

        let caption = pipeline.regenerate_caption(&record).await.unwrap();

        assert_eq!(caption, "caption for old caption as amazon");
        assert_eq!(stages.calls(), vec!["caption"]);
    }
}
