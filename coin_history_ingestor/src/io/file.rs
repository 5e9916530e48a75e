use std::path::{Path, PathBuf};

use async_trait::async_trait;
use snafu::ResultExt;
use tracing::info;

use crate::{
    io::sink::{CreateDirSnafu, PayloadSink, SerializeSnafu, SinkError, WriteSnafu},
    models::{job::FetchJob, payload::RawPayload},
};

/// Writes each payload to `{root}/{coin}/{YYYY-MM-DD}.json`, overwriting any previous file.
#[derive(Clone, Debug)]
pub struct JsonFileSink {
    root: PathBuf,
}

impl JsonFileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic location for a job's payload.
    pub fn path_for(&self, job: &FetchJob) -> PathBuf {
        self.root
            .join(job.coin())
            .join(format!("{}.json", job.date().format("%Y-%m-%d")))
    }
}

#[async_trait]
impl PayloadSink for JsonFileSink {
    type Output = PathBuf;

    async fn write(&self, job: &FetchJob, payload: &RawPayload) -> Result<PathBuf, SinkError> {
        let path = self.path_for(job);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .context(CreateDirSnafu { path: dir })?;
        }

        let bytes = serde_json::to_vec(payload).context(SerializeSnafu)?;
        tokio::fs::write(&path, bytes)
            .await
            .context(WriteSnafu { path: &path })?;

        info!(coin = job.coin(), date = %job.date(), path = %path.display(), "saved payload");
        Ok(path)
    }
}
