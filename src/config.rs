use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, anyhow};
use directories::ProjectDirs;
use serde::Deserialize;

const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_VISION_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";
const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_VISION_TEMPERATURE: f32 = 0.9;
const DEFAULT_CAPTION_TEMPERATURE: f32 = 1.2;

pub const API_KEY_ENV: &str = "SLOPIFY_GOOGLE_AI_API_KEY";
const CONFIG_PATH_ENV: &str = "SLOPIFY_CONFIG";
const DATA_DIR_ENV: &str = "SLOPIFY_DATA_DIR";

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_url: String,
    pub vision_model: String,
    pub image_model: String,
    pub text_model: String,
    pub vision_temperature: f32,
    pub caption_temperature: f32,
    /// Key used when the secret store holds nothing.
    pub default_api_key: Option<String>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_url", &self.api_url)
            .field("vision_model", &self.vision_model)
            .field("image_model", &self.image_model)
            .field("text_model", &self.text_model)
            .field("vision_temperature", &self.vision_temperature)
            .field("caption_temperature", &self.caption_temperature)
            .field("default_api_key", &self.default_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        FileGeminiConfig::default().into_domain()
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub data_dir: PathBuf,
    pub artifacts_dir: PathBuf,
    pub database_path: PathBuf,
    pub secret_path: PathBuf,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(None)
    }

    /// Like [`AppConfig::load`], but an explicit file path wins over
    /// `SLOPIFY_CONFIG` and the per-user config directory.
    pub fn load_from(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let dirs = ProjectDirs::from("app", "slopify", "slopify");

        let explicit = config_path
            .map(Path::to_path_buf)
            .or_else(|| env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

        let file_config = match explicit {
            Some(path) => read_file_config(&path)?,
            None => match dirs.as_ref().map(|d| d.config_dir().join("config.toml")) {
                Some(path) if path.exists() => read_file_config(&path)?,
                _ => FileConfig::default(),
            },
        };

        let data_dir = if let Some(dir) = &file_config.data_dir {
            PathBuf::from(dir)
        } else if let Ok(dir) = env::var(DATA_DIR_ENV) {
            PathBuf::from(dir)
        } else if let Some(dirs) = dirs.as_ref() {
            dirs.data_dir().to_path_buf()
        } else {
            env::current_dir()?.join(".slopify")
        };

        let secret_path = match (&file_config.secret_path, dirs.as_ref()) {
            (Some(path), _) => PathBuf::from(path),
            (None, Some(dirs)) => dirs.config_dir().join("api_key"),
            (None, None) => data_dir.join("api_key"),
        };

        let mut gemini = file_config.gemini.unwrap_or_default().into_domain();
        if gemini.default_api_key.is_none() {
            gemini.default_api_key = env_api_key();
        }
        if gemini.vision_temperature < 0.0 || gemini.caption_temperature < 0.0 {
            return Err(anyhow!("gemini temperatures must not be negative"));
        }

        Ok(Self::assemble(gemini, data_dir, secret_path))
    }

    fn assemble(gemini: GeminiConfig, data_dir: PathBuf, secret_path: PathBuf) -> Self {
        Self {
            gemini,
            artifacts_dir: data_dir.join("artifacts"),
            database_path: data_dir.join("slopify.db"),
            secret_path,
            data_dir,
        }
    }
}

fn read_file_config(path: &Path) -> anyhow::Result<FileConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading config file {:?}", path))?;
    toml::from_str(&contents).with_context(|| format!("parsing config file {:?}", path))
}

fn env_api_key() -> Option<String> {
    env::var(API_KEY_ENV)
        .ok()
        .or_else(|| option_env!("SLOPIFY_GOOGLE_AI_API_KEY").map(str::to_string))
        .filter(|key| !key.trim().is_empty())
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    data_dir: Option<String>,
    #[serde(default)]
    secret_path: Option<String>,
    #[serde(default)]
    gemini: Option<FileGeminiConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct FileGeminiConfig {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    vision_model: Option<String>,
    #[serde(default)]
    image_model: Option<String>,
    #[serde(default)]
    text_model: Option<String>,
    #[serde(default)]
    vision_temperature: Option<f32>,
    #[serde(default)]
    caption_temperature: Option<f32>,
}

impl FileGeminiConfig {
    fn into_domain(self) -> GeminiConfig {
        GeminiConfig {
            api_url: self
                .api_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            vision_model: self
                .vision_model
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            image_model: self
                .image_model
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            text_model: self
                .text_model
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            vision_temperature: self
                .vision_temperature
                .unwrap_or(DEFAULT_VISION_TEMPERATURE),
            caption_temperature: self
                .caption_temperature
                .unwrap_or(DEFAULT_CAPTION_TEMPERATURE),
            default_api_key: self.api_key.filter(|key| !key.trim().is_empty()),
        }
    }
}
