use std::path::{Path, PathBuf};

use crate::{
    capabilities::BinaryArtifact,
    errors::Result,
    util::{file_stamp, now_utc, utc_rfc3339},
};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Original,
    Slop,
}

impl ArtifactKind {
    pub fn as_prefix(&self) -> &'static str {
        match self {
            ArtifactKind::Original => "original",
            ArtifactKind::Slop => "slop",
        }
    }
}

/// Durable home for captured and generated images.
///
/// Every write lands under a freshly generated name, so concurrent pipeline
/// runs never target the same file.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn persist(&self, kind: ArtifactKind, artifact: &BinaryArtifact) -> Result<PathBuf>;

    async fn copy_in(&self, kind: ArtifactKind, source: &Path) -> Result<PathBuf>;

    async fn remove(&self, path: &Path) -> Result<()>;
}

pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub async fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn unique_base_name(kind: ArtifactKind, stamp: &str) -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("{}_{}_{}", kind.as_prefix(), stamp, &id[..8])
    }

    fn meta_path_for(path: &Path) -> Option<PathBuf> {
        let stem = path.file_stem()?.to_str()?;
        Some(path.with_file_name(format!("{stem}.meta.json")))
    }
}

#[async_trait]
impl ArtifactStore for ArtifactWriter {
    async fn persist(&self, kind: ArtifactKind, artifact: &BinaryArtifact) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).await?;
        let now = now_utc();
        let base_name = Self::unique_base_name(kind, &file_stamp(&now));

        let file_name = format!("{}.{}", base_name, artifact.file_extension);
        let file_path = self.root.join(&file_name);
        fs::write(&file_path, &artifact.data).await?;

        let mut meta = Map::new();
        meta.insert("kind".to_string(), json!(kind.as_prefix()));
        meta.insert("media_type".to_string(), json!(artifact.media_type));
        meta.insert("description".to_string(), json!(artifact.summary));
        meta.insert("artifact".to_string(), json!(file_name));
        meta.insert("created_at".to_string(), json!(utc_rfc3339(&now)));

        if !artifact.metadata.is_empty() {
            meta.insert(
                "metadata".to_string(),
                Value::Object(artifact.metadata.clone()),
            );
        }

        let meta_path = self.root.join(format!("{}.meta.json", base_name));
        fs::write(&meta_path, serde_json::to_vec_pretty(&Value::Object(meta))?).await?;

        debug!(target: "artifacts", path = %file_path.display(), bytes = artifact.data.len(), "artifact written");
        Ok(file_path)
    }

    async fn copy_in(&self, kind: ArtifactKind, source: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).await?;
        let extension = source
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_else(|| "jpg".to_string());

        let base_name = Self::unique_base_name(kind, &file_stamp(&now_utc()));
        let target = self.root.join(format!("{base_name}.{extension}"));
        fs::copy(source, &target).await?;

        debug!(target: "artifacts", from = %source.display(), to = %target.display(), "artifact copied");
        Ok(target)
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        if let Some(meta_path) = Self::meta_path_for(path) {
            if let Err(err) = fs::remove_file(&meta_path).await {
                if err.kind() != std::io::ErrorKind::NotFound {
                    return Err(err.into());
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn persisted_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path().join("artifacts")).await.unwrap();
        let artifact = BinaryArtifact::new(vec![1, 2, 3], "image/png", "png", "test");

        let first = writer.persist(ArtifactKind::Slop, &artifact).await.unwrap();
        let second = writer.persist(ArtifactKind::Slop, &artifact).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read(&first).unwrap(), vec![1, 2, 3]);
        let name = first.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("slop_") && name.ends_with(".png"));
        assert!(ArtifactWriter::meta_path_for(&first).unwrap().exists());
    }

    #[tokio::test]
    async fn copy_keeps_bytes_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("IMG_0001.JPG");
        std::fs::write(&source, b"jpeg bytes").unwrap();
        let writer = ArtifactWriter::new(dir.path().join("artifacts")).await.unwrap();

        let copied = writer.copy_in(ArtifactKind::Original, &source).await.unwrap();

        assert!(copied.starts_with(dir.path().join("artifacts")));
        assert_eq!(copied.extension().unwrap(), "jpg");
        assert_eq!(std::fs::read(&copied).unwrap(), b"jpeg bytes");
        assert!(source.exists());
    }

    #[tokio::test]
    async fn remove_drops_sidecar_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path().to_path_buf()).await.unwrap();
        let artifact = BinaryArtifact::new(vec![9], "image/png", "png", "test");
        let path = writer.persist(ArtifactKind::Slop, &artifact).await.unwrap();

        writer.remove(&path).await.unwrap();
        assert!(!path.exists());
        assert!(!ArtifactWriter::meta_path_for(&path).unwrap().exists());
        writer.remove(&path).await.unwrap();
    }

    #[tokio::test]
    async fn copy_of_missing_source_is_local_io() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path().to_path_buf()).await.unwrap();
        let err = writer
            .copy_in(ArtifactKind::Original, &dir.path().join("nope.jpg"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::LocalIo);
    }
}
