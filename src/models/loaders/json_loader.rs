use crate::models::link::ScrapedEntry;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从抓取结果 JSON 文件加载条目
///
/// 文件内容为数组：元素可以是原始消息（含 `content`），也可以是已提取的链接记录（含 `link`）。
/// 无法识别的元素会被跳过并记录警告。
pub async fn load_scraped_entries(path: &Path) -> Result<Vec<ScrapedEntry>> {
    if !path.exists() {
        anyhow::bail!("文件不存在: {}", path.display());
    }

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取抓取文件: {}", path.display()))?;

    let raw: Vec<serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("无法解析抓取文件: {}", path.display()))?;

    let mut entries = Vec::with_capacity(raw.len());
    for (index, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<ScrapedEntry>(value) {
            Ok(entry) => entries.push(entry),
            Err(e) => tracing::warn!("跳过第 {} 项（格式无法识别）: {}", index + 1, e),
        }
    }

    tracing::info!("从 {} 加载了 {} 项", path.display(), entries.len());
    Ok(entries)
}
