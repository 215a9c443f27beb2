//! 流程结果与结果日志

use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::CandidateLink;

/// 流程最终结局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// 提交并确认成功
    Confirmed,
    /// 已点击提交，但没有看到成功提示
    Unconfirmed,
    /// 失败
    Failed,
}

/// 单次流程结果，创建后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub link: String,
    pub author: Option<String>,
    pub source_channel: Option<String>,
    pub message_id: Option<String>,
    pub timestamp: Option<String>,
    pub unit_size: u32,
    pub success: bool,
    /// 失败分类，例如 "navigation"、"slip not populated"
    pub error: Option<String>,
    pub outcome: Outcome,
    /// 附加说明（失败详情或 "success unconfirmed"）
    pub detail: Option<String>,
    pub placed_at: DateTime<Local>,
}

impl WorkflowResult {
    fn base(link: &CandidateLink, unit_size: u32, outcome: Outcome) -> Self {
        Self {
            link: link.link.clone(),
            author: link.author.clone(),
            source_channel: link.source_channel.clone(),
            message_id: link.message_id.clone(),
            timestamp: link.timestamp.clone(),
            unit_size,
            success: outcome != Outcome::Failed,
            error: None,
            outcome,
            detail: None,
            placed_at: Local::now(),
        }
    }

    pub fn confirmed(link: &CandidateLink, unit_size: u32) -> Self {
        Self::base(link, unit_size, Outcome::Confirmed)
    }

    pub fn unconfirmed(link: &CandidateLink, unit_size: u32) -> Self {
        let mut result = Self::base(link, unit_size, Outcome::Unconfirmed);
        result.detail = Some("success unconfirmed".to_string());
        result
    }

    pub fn failed(
        link: &CandidateLink,
        unit_size: u32,
        reason: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        let mut result = Self::base(link, unit_size, Outcome::Failed);
        result.error = Some(reason.into());
        result.detail = Some(detail.into());
        result
    }

    pub fn is_unconfirmed(&self) -> bool {
        self.outcome == Outcome::Unconfirmed
    }
}

/// 汇总统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_processed: usize,
    pub successful_bets: usize,
    pub unconfirmed_bets: usize,
    pub failed_bets: usize,
    pub success_rate: f64,
}

impl BatchSummary {
    pub fn from_counts(total: usize, successful: usize, unconfirmed: usize) -> Self {
        Self {
            total_processed: total,
            successful_bets: successful,
            unconfirmed_bets: unconfirmed,
            failed_bets: total.saturating_sub(successful),
            success_rate: if total == 0 {
                0.0
            } else {
                successful as f64 / total as f64
            },
        }
    }

    /// 合并另一份统计
    pub fn merge(&self, other: &BatchSummary) -> BatchSummary {
        Self::from_counts(
            self.total_processed + other.total_processed,
            self.successful_bets + other.successful_bets,
            self.unconfirmed_bets + other.unconfirmed_bets,
        )
    }
}

/// 只追加的结果日志
#[derive(Debug, Default)]
pub struct ResultLog {
    results: Vec<WorkflowResult>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: WorkflowResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[WorkflowResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_counts(
            self.results.len(),
            self.results.iter().filter(|r| r.success).count(),
            self.results.iter().filter(|r| r.is_unconfirmed()).count(),
        )
    }

    /// 以 JSON 数组写入磁盘，父目录不存在时自动创建
    pub fn save_json(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
        }
        let json = serde_json::to_string_pretty(&self.results)?;
        std::fs::write(path, json)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        info!("💾 已保存 {} 条结果: {}", self.results.len(), path.display());
        Ok(())
    }
}
