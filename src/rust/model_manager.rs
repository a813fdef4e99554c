use std::path::{Path, PathBuf};
use std::fmt;
use std::fs;
use std::io;
use std::sync::Arc;
use std::env;
use tokio::sync::Mutex;
use reqwest;
use sha2::{Sha256, Digest};
use dirs;
use log;

use crate::classifier::{ClassifierError, Metadata, OnnxModel};
use crate::runtime::RuntimeConfig;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Artifact not found: {0}")]
    NotFound(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("Request to {url} failed with status {status}")]
    HttpStatus {
        url: String,
        status: u16,
    },
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Hash mismatch: expected {expected}, got {actual} for {url}")]
    HashMismatch {
        url: String,
        expected: String,
        actual: String,
    },
}

/// Where a model or metadata artifact lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Url(String),
    Path(PathBuf),
}

impl ModelSource {
    /// `http://` and `https://` locations are remote; anything else is a path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            ModelSource::Url(location.to_string())
        } else {
            ModelSource::Path(PathBuf::from(location))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ModelSource::Url(_))
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Url(url) => write!(f, "{}", url),
            ModelSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// The pair of locations a classifier is initialized from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSources {
    pub model: ModelSource,
    pub metadata: ModelSource,
    /// Expected SHA-256 of the model file, checked when the model is downloaded
    pub model_sha256: Option<String>,
}

impl ModelSources {
    pub fn new(model: &str, metadata: &str) -> Self {
        Self {
            model: ModelSource::parse(model),
            metadata: ModelSource::parse(metadata),
            model_sha256: None,
        }
    }

    pub fn with_model_sha256(mut self, hash: impl Into<String>) -> Self {
        self.model_sha256 = Some(hash.into().to_lowercase());
        self
    }
}

/// Fetches model artifacts and keeps downloaded models in a local cache.
#[derive(Clone)]
pub struct ModelManager {
    models_dir: PathBuf,
    client: reqwest::Client,
    download_lock: Arc<Mutex<()>>,
}

impl ModelManager {
    /// Creates a new ModelManager with the default models directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    /// Returns the default models directory path
    pub fn get_default_models_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("WORDSEQ_CACHE") {
            return PathBuf::from(path).join("models");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("wordseq").join("models");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("wordseq").join("models");
        }

        // 4. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join("wordseq").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            client: reqwest::Client::new(),
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Cache location for a downloaded model, keyed by the SHA-256 of its URL.
    pub fn get_cache_path(&self, url: &str) -> PathBuf {
        self.models_dir.join(format!("{}.onnx", sha256_hex(url.as_bytes())))
    }

    pub fn is_model_downloaded(&self, url: &str) -> bool {
        let path = self.get_cache_path(url);
        log::info!("Cached model path: {:?} (exists: {})", path, path.exists());
        path.exists()
    }

    /// Checks whether an artifact is reachable. Never fails: any error means
    /// the artifact is treated as unavailable.
    pub async fn url_exists(&self, source: &ModelSource) -> bool {
        log::info!("Testing url {}", source);
        match source {
            ModelSource::Path(path) => path.exists(),
            ModelSource::Url(url) => match self.client.head(url).send().await {
                Ok(response) => {
                    log::info!("Availability check status: {}", response.status());
                    response.status().is_success()
                }
                Err(e) => {
                    log::warn!("Availability check of {} failed: {}", url, e);
                    false
                }
            },
        }
    }

    /// Returns a local path for the model, downloading it first when remote.
    pub async fn resolve_model(&self, sources: &ModelSources) -> Result<PathBuf, ModelError> {
        match &sources.model {
            ModelSource::Path(path) => {
                if !path.exists() {
                    return Err(ModelError::NotFound(path.display().to_string()));
                }
                Ok(path.clone())
            }
            ModelSource::Url(url) => {
                let _lock = self.download_lock.lock().await;
                let path = self.get_cache_path(url);
                let expected = sources.model_sha256.as_deref();

                if path.exists() {
                    match expected {
                        Some(hash) if !self.verify_file(&path, hash)? => {
                            log::warn!("Cached model failed verification, redownloading");
                        }
                        _ => {
                            log::info!("Using cached model at {:?}", path);
                            return Ok(path);
                        }
                    }
                }

                if let Err(e) = self.download_file(url, &path, expected).await {
                    // Cleanup on failure
                    let _ = fs::remove_file(&path);
                    return Err(e);
                }
                Ok(path)
            }
        }
    }

    fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, ModelError> {
        log::info!("Verifying file: {:?}", path);
        let bytes = fs::read(path)?;
        let hash = sha256_hex(&bytes);
        log::info!("Calculated hash: {}", hash);
        log::info!("Expected hash:   {}", expected_hash);
        Ok(hash == expected_hash)
    }

    async fn download_file(&self, url: &str, path: &Path, expected_hash: Option<&str>) -> Result<(), ModelError> {
        log::info!("Downloading model from {} to {:?}", url, path);
        let response = self.client.get(url).send().await?;
        log::info!("Download response status: {}", response.status());
        if !response.status().is_success() {
            return Err(ModelError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        if let Some(expected) = expected_hash {
            let hash = sha256_hex(&bytes);
            if hash != expected {
                log::error!("Model hash mismatch: expected {}, got {}", expected, hash);
                return Err(ModelError::HashMismatch {
                    url: url.to_string(),
                    expected: expected.to_string(),
                    actual: hash,
                });
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        log::info!("Model downloaded to {:?}", path);
        Ok(())
    }

    /// Removes a cached download. Local paths are never touched.
    pub fn remove_download(&self, source: &ModelSource) -> Result<(), ModelError> {
        if let ModelSource::Url(url) = source {
            let path = self.get_cache_path(url);
            if path.exists() {
                log::info!("Removing cached model {:?}", path);
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    pub async fn load_model(&self, sources: &ModelSources, config: &RuntimeConfig) -> Result<OnnxModel, ClassifierError> {
        log::info!("Loading pretrained model from {}", sources.model);
        let path = self.resolve_model(sources).await?;
        OnnxModel::from_file(&path, config)
    }

    pub async fn load_metadata(&self, source: &ModelSource) -> Result<Metadata, ClassifierError> {
        log::info!("Loading metadata from {}", source);
        match source {
            ModelSource::Path(path) => Metadata::from_file(path),
            ModelSource::Url(url) => {
                let response = self.client.get(url).send().await.map_err(ModelError::from)?;
                if !response.status().is_success() {
                    return Err(ModelError::HttpStatus {
                        url: url.clone(),
                        status: response.status().as_u16(),
                    }.into());
                }
                let body = response.text().await.map_err(ModelError::from)?;
                Metadata::from_json_str(&body)
            }
        }
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
