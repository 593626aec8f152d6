// Tokio-backed file probe

use async_trait::async_trait;
use std::path::Path;

use pyrun_core::port::FileProbe;

#[derive(Debug, Default, Clone)]
pub struct TokioFileProbe;

impl TokioFileProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileProbe for TokioFileProbe {
    async fn file_exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}
