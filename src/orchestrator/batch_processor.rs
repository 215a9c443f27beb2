//! 批量处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **会话初始化**：启动浏览器、恢复 Cookie 或登录
//! 2. **批量加载**：读取抓取文件，提取链接（`Vec<CandidateLink>`）
//! 3. **去重**：同一条链接在进程内只处理一次
//! 4. **串行处理**：逐条调用 `SlipFlow`，两笔之间固定间隔，避免触发风控
//! 5. **结果保存**：写入 `results/bet_results_<时间>.json`
//!
//! 关闭自动下注时只校验链接，不打开浏览器。

use std::collections::HashSet;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};
use crate::models::{
    load_scraped_entries, BatchSummary, CandidateLink, ResultLog, ScrapedEntry, WorkflowResult,
};
use crate::services::{extract_links, LinkValidator, SessionManager};
use crate::utils::{log_batch_summary, log_startup, truncate_text};
use crate::workflow::SlipFlow;

/// 一次批量处理的报告
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub total_links: usize,
    pub successful_bets: usize,
    pub failed_bets: usize,
    /// 是否只做了链接校验
    pub validated_only: bool,
    pub results: Vec<WorkflowResult>,
}

/// 批量处理器
pub struct BetProcessor {
    config: Config,
    sessions: Option<SessionManager>,
    flow: SlipFlow,
    validator: LinkValidator,
    processed_links: HashSet<String>,
    log: ResultLog,
    /// 仅校验模式下的统计（没有结果记录）
    validated: BatchSummary,
}

impl BetProcessor {
    pub fn new(config: Config) -> Self {
        Self {
            flow: SlipFlow::new(&config),
            config,
            sessions: None,
            validator: LinkValidator::new(),
            processed_links: HashSet::new(),
            log: ResultLog::new(),
            validated: BatchSummary::default(),
        }
    }

    /// 使用已经建立好的会话
    pub fn with_session(config: Config, sessions: SessionManager) -> Self {
        let mut processor = Self::new(config);
        processor.sessions = Some(sessions);
        processor
    }

    /// 启动浏览器并确保处于登录状态
    pub async fn initialize_automation(&mut self) -> AppResult<()> {
        if self.sessions.is_none() {
            self.sessions = Some(SessionManager::initialize(self.config.clone()).await?);
        }
        let credentials = self.config.credentials();
        if let Some(sessions) = self.sessions.as_mut() {
            sessions.ensure_authenticated(credentials.as_ref()).await?;
        }
        info!("✅ 自动化已就绪");
        Ok(())
    }

    /// 把抓取条目展开为候选链接
    pub fn extract_candidates(entries: Vec<ScrapedEntry>) -> Vec<CandidateLink> {
        let mut links = Vec::new();
        for entry in entries {
            match entry {
                ScrapedEntry::Message(message) => {
                    for link in extract_links(&message.content) {
                        links.push(message.to_candidate(&link));
                    }
                }
                ScrapedEntry::Link(link) => links.push(link),
            }
        }
        links
    }

    /// 过滤已处理过的链接，并把新链接记为已处理
    pub fn filter_new_links(&mut self, links: Vec<CandidateLink>) -> Vec<CandidateLink> {
        let total = links.len();
        let new_links: Vec<CandidateLink> = links
            .into_iter()
            .filter(|l| self.processed_links.insert(l.link.clone()))
            .collect();
        info!("🔗 共 {} 条链接，其中新链接 {} 条", total, new_links.len());
        new_links
    }

    /// 处理一批链接
    pub async fn process_links(&mut self, links: &[CandidateLink], unit: NonZeroU32) -> BatchReport {
        let mut report = BatchReport {
            total_links: links.len(),
            ..Default::default()
        };

        if !self.config.auto_place_bets {
            info!("自动下注已关闭，只校验链接");
            report.validated_only = true;
            for link in links {
                if self.validator.validate(&link.link) {
                    report.successful_bets += 1;
                    info!("✓ 有效链接: {}", link.link);
                } else {
                    report.failed_bets += 1;
                    warn!("⚠️ 无效链接: {}", link.link);
                }
            }
            self.validated = self
                .validated
                .merge(&BatchSummary::from_counts(links.len(), report.successful_bets, 0));
            return report;
        }

        let Some(sessions) = self.sessions.as_mut() else {
            error!("自动化未初始化，无法下注");
            return report;
        };

        for (i, link) in links.iter().enumerate() {
            info!("\n{}", "─".repeat(60));
            info!(
                "📄 处理第 {}/{} 条: {}",
                i + 1,
                links.len(),
                truncate_text(&link.link, 80)
            );

            let result = match sessions.session_mut() {
                Ok(session) => self.flow.run(session, link, unit).await,
                Err(e) => WorkflowResult::failed(link, unit.get(), "environment", e.to_string()),
            };

            if result.success {
                report.successful_bets += 1;
            } else {
                report.failed_bets += 1;
            }
            self.log.push(result.clone());
            report.results.push(result);

            if i + 1 < links.len() {
                sleep(self.config.inter_bet_delay).await;
            }
        }

        report
    }

    /// 保存报告，返回文件路径
    pub fn save_report(&self, report: &BatchReport) -> AppResult<PathBuf> {
        let dir = &self.config.results_dir;
        std::fs::create_dir_all(dir)
            .map_err(|e| AppError::file_write_failed(dir.display().to_string(), e))?;
        let filename = format!(
            "bet_results_{}.json",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(filename);
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        info!("💾 结果已保存: {}", path.display());
        Ok(path)
    }

    /// 所有已处理链接的统计（下注结果 + 仅校验的链接）
    pub fn summary(&self) -> BatchSummary {
        self.log.summary().merge(&self.validated)
    }

    /// 关闭浏览器
    pub async fn close(&mut self) {
        if let Some(sessions) = self.sessions.as_mut() {
            sessions.teardown().await;
        }
    }
}

/// 解析注额：命令行优先，否则使用配置默认值
pub fn resolve_unit(config: &Config, unit_size: Option<u32>) -> AppResult<NonZeroU32> {
    let value = unit_size.unwrap_or(config.default_unit_size);
    NonZeroU32::new(value).ok_or_else(|| {
        ConfigError::InvalidValue {
            name: "unit_size".to_string(),
            message: "注额必须是正整数".to_string(),
        }
        .into()
    })
}

/// 处理一个抓取文件：加载 → 去重 → 下注 → 保存 → 统计
pub async fn process_scraped_file(
    config: Config,
    path: &Path,
    unit_size: Option<u32>,
) -> anyhow::Result<()> {
    let unit = resolve_unit(&config, unit_size)?;
    log_startup(&config);

    let mut processor = BetProcessor::new(config.clone());
    let outcome = async {
        if config.auto_place_bets {
            processor.initialize_automation().await?;
        }

        let entries = load_scraped_entries(path).await?;
        let links = BetProcessor::extract_candidates(entries);
        if links.is_empty() {
            warn!("⚠️ 文件中没有找到链接");
            return anyhow::Ok(());
        }

        let new_links = processor.filter_new_links(links);
        if new_links.is_empty() {
            info!("没有新的链接需要处理");
            return anyhow::Ok(());
        }

        let report = processor.process_links(&new_links, unit).await;
        let saved = match processor.save_report(&report) {
            Ok(p) => Some(p.display().to_string()),
            Err(e) => {
                error!("保存结果失败: {}", e);
                None
            }
        };
        log_batch_summary(&processor.summary(), saved.as_deref());
        anyhow::Ok(())
    }
    .await;

    processor.close().await;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScrapedMessage;

    const SHARE: &str = "https://prizepicks.onelink.me/gCQS/shareEntry?entryId=abc123";

    #[test]
    fn test_extract_candidates_keeps_provenance() {
        let message = ScrapedMessage {
            id: Some(serde_json::json!("42")),
            content: format!("lock it in {SHARE}"),
            author: Some(serde_json::json!("capper")),
            channel_id: None,
            timestamp: Some("2025-06-01T08:00:00Z".to_string()),
        };
        let links = BetProcessor::extract_candidates(vec![
            ScrapedEntry::Message(message),
            ScrapedEntry::Link(CandidateLink::bare("https://app.prizepicks.com/board")),
        ]);

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].link, SHARE);
        assert_eq!(links[0].author.as_deref(), Some("capper"));
        assert_eq!(links[0].message_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_filter_new_links_drops_repeats_across_batches() {
        let mut processor = BetProcessor::new(Config::default());
        let first = processor.filter_new_links(vec![
            CandidateLink::bare(SHARE),
            CandidateLink::bare(SHARE),
        ]);
        assert_eq!(first.len(), 1);

        let second = processor.filter_new_links(vec![CandidateLink::bare(SHARE)]);
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_validate_only_mode_counts_links() {
        let mut processor = BetProcessor::new(Config::default());
        let unit = NonZeroU32::new(1).unwrap();
        let report = processor
            .process_links(
                &[
                    CandidateLink::bare(SHARE),
                    CandidateLink::bare("app.prizepicks.com/board"),
                ],
                unit,
            )
            .await;

        assert!(report.validated_only);
        assert_eq!(report.successful_bets, 1);
        assert_eq!(report.failed_bets, 1);
        assert!(report.results.is_empty());
    }

    #[tokio::test]
    async fn test_validate_only_summary_counts_validated_links() {
        let mut processor = BetProcessor::new(Config::default());
        let unit = NonZeroU32::new(1).unwrap();
        let report = processor
            .process_links(
                &[
                    CandidateLink::bare(SHARE),
                    CandidateLink::bare("https://app.prizepicks.com/board"),
                ],
                unit,
            )
            .await;

        let summary = processor.summary();
        assert_eq!(summary.total_processed, report.total_links);
        assert_eq!(summary.successful_bets, 2);
        assert_eq!(summary.failed_bets, 0);
        assert!((summary.success_rate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resolve_unit() {
        let config = Config::default();
        assert_eq!(resolve_unit(&config, None).unwrap().get(), 1);
        assert_eq!(resolve_unit(&config, Some(4)).unwrap().get(), 4);
        assert!(resolve_unit(&config, Some(0)).is_err());
    }
}
