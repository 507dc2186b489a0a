use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

/// Reads page templates
#[async_trait]
pub trait ContentReader: Send + Sync {
    /// Read a UTF-8 text file
    async fn read_text(&self, path: &Path) -> Result<String>;
}

/// Reads templates from the local filesystem
#[derive(Clone, Copy, Debug, Default)]
pub struct FsContentReader;

#[async_trait]
impl ContentReader for FsContentReader {
    async fn read_text(&self, path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read page template: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_text() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("page.html");
        std::fs::write(&path, "<h1>{{root}}</h1>").unwrap();

        let text = FsContentReader.read_text(&path).await.unwrap();

        assert_eq!(text, "<h1>{{root}}</h1>");
    }

    #[tokio::test]
    async fn test_read_text_missing_file() {
        let result = FsContentReader
            .read_text(Path::new("/nonexistent/page-12345.html"))
            .await;

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to read page template"));
    }
}
