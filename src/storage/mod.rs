use anyhow::{Context, Result};
use bytes::Bytes;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    Local {
        path: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    S3 {
        bucket: String,
        region: String,
        access_key: String,
        secret_key: String,
        #[serde(default)]
        endpoint: Option<String>,
        /// Base under which stored objects are publicly reachable. Derived
        /// from the endpoint (or the AWS virtual-host URL) when unset.
        #[serde(default)]
        public_base_url: Option<String>,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Local {
            path: "storage".to_string(),
            base_url: None,
        }
    }
}

#[derive(Clone)]
pub struct Storage {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Local {
        root: PathBuf,
        base_url: Option<String>,
    },
    S3 {
        bucket: Bucket,
        base_url: String,
    },
}

impl Storage {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        match config {
            StorageConfig::Local { path, base_url } => {
                let root = PathBuf::from(path);
                std::fs::create_dir_all(&root)
                    .with_context(|| format!("create storage directory {}", path))?;
                Ok(Self {
                    backend: Backend::Local {
                        root,
                        base_url: base_url.clone(),
                    },
                })
            }
            StorageConfig::S3 {
                bucket,
                region,
                access_key,
                secret_key,
                endpoint,
                public_base_url,
            } => {
                let credentials = Credentials::new(
                    Some(access_key.as_str()),
                    Some(secret_key.as_str()),
                    None,
                    None,
                    None,
                )
                .context("build object store credentials")?;
                let s3_region = match endpoint {
                    Some(ep) => Region::Custom {
                        region: region.clone(),
                        endpoint: ep.clone(),
                    },
                    None => region.parse().context("parse object store region")?,
                };
                let mut handle = Bucket::new(bucket, s3_region, credentials)
                    .with_context(|| format!("create bucket handle for {}", bucket))?
                    .with_path_style();
                // Voicemail objects are linked from chat messages, so every
                // write carries a public-read canned ACL.
                handle.add_header("x-amz-acl", "public-read");

                let base_url = match public_base_url {
                    Some(url) => url.trim_end_matches('/').to_string(),
                    None => match endpoint {
                        Some(ep) => format!("{}/{}", ep.trim_end_matches('/'), bucket),
                        None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
                    },
                };
                Ok(Self {
                    backend: Backend::S3 {
                        bucket: handle,
                        base_url,
                    },
                })
            }
        }
    }

    /// Write an object and return its publicly resolvable URL.
    pub async fn write(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<String> {
        match &self.backend {
            Backend::Local { root, .. } => {
                let dest = root.join(key);
                if let Some(parent) = dest.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&dest, &bytes)
                    .await
                    .with_context(|| format!("write {}", dest.display()))?;
            }
            Backend::S3 { bucket, .. } => {
                let response = bucket
                    .put_object_with_content_type(key, &bytes, content_type)
                    .await
                    .with_context(|| format!("put object {}", key))?;
                if response.status_code() != 200 {
                    anyhow::bail!(
                        "object store returned status {} for {}",
                        response.status_code(),
                        key
                    );
                }
            }
        }
        debug!(key, bytes = bytes.len(), "object stored");
        Ok(self.public_url(key))
    }

    pub async fn read(&self, key: &str) -> Result<Bytes> {
        match &self.backend {
            Backend::Local { root, .. } => {
                let bytes = tokio::fs::read(root.join(key))
                    .await
                    .with_context(|| format!("read {}", key))?;
                Ok(Bytes::from(bytes))
            }
            Backend::S3 { bucket, .. } => {
                let response = bucket
                    .get_object(key)
                    .await
                    .with_context(|| format!("get object {}", key))?;
                Ok(Bytes::copy_from_slice(response.as_slice()))
            }
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        match &self.backend {
            Backend::Local { root, base_url } => match base_url {
                Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
                None => root.join(key).to_string_lossy().into_owned(),
            },
            Backend::S3 { base_url, .. } => format!("{}/{}", base_url, key),
        }
    }
}
