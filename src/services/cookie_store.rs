//! Cookie 持久化
//!
//! 文件格式为 JSON 数组，只保证能被本模块自己读回。

use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, FileError};
use crate::models::CookieRecord;

#[derive(Debug, Clone)]
pub struct CookieStore {
    path: PathBuf,
}

impl CookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 读取 Cookie，文件不存在时返回 `None`
    pub async fn load(&self) -> AppResult<Option<Vec<CookieRecord>>> {
        if !self.path.exists() {
            debug!("Cookie 文件不存在: {}", self.path.display());
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| AppError::file_read_failed(self.path.display().to_string(), e))?;
        let cookies: Vec<CookieRecord> = serde_json::from_str(&content).map_err(|e| {
            AppError::File(FileError::JsonParseFailed {
                path: self.path.display().to_string(),
                source: Box::new(e),
            })
        })?;
        if cookies.is_empty() {
            return Ok(None);
        }
        Ok(Some(cookies))
    }

    pub async fn save(&self, cookies: &[CookieRecord]) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
        }
        let json = serde_json::to_string_pretty(cookies)?;
        fs::write(&self.path, json)
            .await
            .map_err(|e| AppError::file_write_failed(self.path.display().to_string(), e))?;
        info!("🍪 已保存 {} 条 Cookie", cookies.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CookieStore::new(dir.path().join("jar").join("cookies.json"));

        assert!(store.load().await.unwrap().is_none());

        let mut session = CookieRecord::new("session", "s3cr3t", ".prizepicks.com");
        session.http_only = true;
        session.expires = Some(1_900_000_000.0);
        store.save(&[session.clone()]).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, vec![session]);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        std::fs::write(&path, "not json").unwrap();

        let result = CookieStore::new(&path).load().await;
        assert!(matches!(result, Err(AppError::File(FileError::JsonParseFailed { .. }))));
    }
}
