//! 截图取证服务 - 业务能力层
//!
//! 在提交前后保存截图，失败只记日志，不影响流程

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::infrastructure::PageDriver;

#[derive(Debug, Clone)]
pub struct EvidenceRecorder {
    dir: PathBuf,
    enabled: bool,
}

impl EvidenceRecorder {
    pub fn new(dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            dir: dir.into(),
            enabled,
        }
    }

    /// 不截图的记录器
    pub fn disabled() -> Self {
        Self::new(PathBuf::new(), false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 截图并写入 `<dir>/<label>_<时间>.png`，不会覆盖已有截图
    ///
    /// # 返回
    /// 成功时返回文件路径；未启用或失败时返回 `None`
    pub async fn capture(&self, driver: &dyn PageDriver, label: &str) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        match self.try_capture(driver, label).await {
            Ok(path) => {
                info!("📸 截图已保存: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("截图失败 ({}): {:#}", label, e);
                None
            }
        }
    }

    async fn try_capture(&self, driver: &dyn PageDriver, label: &str) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let png = driver.screenshot_png().await?;
        let path = self.unused_path(label).await?;
        tokio::fs::write(&path, png).await?;
        Ok(path)
    }

    /// `<label>_<时间到毫秒>.png`，同名已存在时追加序号
    async fn unused_path(&self, label: &str) -> std::io::Result<PathBuf> {
        let stem = format!(
            "{}_{}",
            label,
            chrono::Local::now().format("%Y%m%d_%H%M%S_%3f")
        );
        let mut path = self.dir.join(format!("{}.png", stem));
        let mut n = 1;
        while tokio::fs::try_exists(&path).await? {
            path = self.dir.join(format!("{}_{}.png", stem, n));
            n += 1;
        }
        Ok(path)
    }
}
