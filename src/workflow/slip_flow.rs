//! 投注单提交流程 - 流程层
//!
//! 核心职责：定义"一条分享链接"的完整处理流程
//!
//! 流程顺序：
//! 1. 打开链接 → 检查是否错误页
//! 2. 校验投注单（容器 / 选项 / 提交按钮）
//! 3. 设置注额并回读
//! 4. 截图 → 点击提交 → 截图
//! 5. 确认结果（成功提示 / 投注单清空 / 未确认）

use std::num::NonZeroU32;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{NavigationError, VerificationError};
use crate::infrastructure::PageDriver;
use crate::models::page_selectors::{
    PICK_ITEM, SLIP_CONTAINER, SUBMIT_CONTROL, SUCCESS_INDICATOR, UNIT_SIZE_INPUT,
};
use crate::models::{CandidateLink, WorkflowResult};
use crate::services::{ElementResolver, EvidenceRecorder, LinkValidator, Session};
use crate::workflow::state::{Confirmation, WorkflowState};

/// 标题或 URL 中出现即视为错误页
const ERROR_PAGE_MARKERS: [&str; 3] = ["error", "expired", "not found"];

/// 流程失败原因
#[derive(Debug, Error)]
enum FlowError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Verification(#[from] VerificationError),
}

impl FlowError {
    fn reason(&self) -> &'static str {
        match self {
            FlowError::Navigation(e) => e.reason(),
            FlowError::Verification(e) => e.reason(),
        }
    }
}

/// 投注单提交流程
///
/// - 编排一条链接从打开到确认的全过程
/// - 不持有浏览器，只借用 `Session`
/// - 不做重试，失败的链接由调用方决定是否重新提交
pub struct SlipFlow {
    validator: LinkValidator,
    resolver: ElementResolver,
    recorder: EvidenceRecorder,
    page_load_timeout: Duration,
    element_wait_timeout: Duration,
    navigation_settle_delay: Duration,
    unit_settle_delay: Duration,
    submission_delay: Duration,
    max_unit_size: u32,
}

impl SlipFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            validator: LinkValidator::new(),
            resolver: ElementResolver::new(config.poll_interval),
            recorder: EvidenceRecorder::new(
                config.screenshots_dir.clone(),
                config.screenshot_on_submission,
            ),
            page_load_timeout: config.page_load_timeout,
            element_wait_timeout: config.element_wait_timeout,
            navigation_settle_delay: config.navigation_settle_delay,
            unit_settle_delay: config.unit_settle_delay,
            submission_delay: config.submission_delay,
            max_unit_size: config.max_unit_size,
        }
    }

    /// 替换截图记录器
    pub fn with_recorder(mut self, recorder: EvidenceRecorder) -> Self {
        self.recorder = recorder;
        self
    }

    /// 处理一条链接，总是返回一条结果记录
    pub async fn run(
        &self,
        session: &mut Session,
        link: &CandidateLink,
        unit: NonZeroU32,
    ) -> WorkflowResult {
        let unit_size = unit.get();
        info!("🎯 开始处理链接: {} (注额: {})", link.link, unit_size);
        if unit_size > self.max_unit_size {
            warn!(
                "⚠️ 注额 {} 超过上限提示 {}，仍按原值提交",
                unit_size, self.max_unit_size
            );
        }

        let mut state = WorkflowState::Idle;
        match self.drive(session.driver(), &link.link, unit_size, &mut state).await {
            Ok(Confirmation::Confirmed) => {
                info!("✅ 投注单提交成功: {}", link.link);
                WorkflowResult::confirmed(link, unit_size)
            }
            Ok(Confirmation::Unconfirmed) => {
                warn!("❔ 已点击提交但未看到成功提示: {}", link.link);
                WorkflowResult::unconfirmed(link, unit_size)
            }
            Err(e) => {
                error!("❌ 在 [{}] 之后失败: {}", state, e);
                advance(&mut state, WorkflowState::Failed);
                WorkflowResult::failed(link, unit_size, e.reason(), e.to_string())
            }
        }
    }

    async fn drive(
        &self,
        driver: &dyn PageDriver,
        url: &str,
        unit_size: u32,
        state: &mut WorkflowState,
    ) -> Result<Confirmation, FlowError> {
        self.navigate(driver, url).await?;
        advance(state, WorkflowState::Navigated);

        self.verify_slip(driver).await?;
        advance(state, WorkflowState::SlipVerified);

        self.set_unit_size(driver, unit_size).await?;
        advance(state, WorkflowState::UnitSet);

        self.submit(driver).await?;
        advance(state, WorkflowState::Submitted);

        let confirmation = self.confirm(driver).await;
        advance(state, WorkflowState::Confirmed);
        Ok(confirmation)
    }

    /// Idle → Navigated
    async fn navigate(&self, driver: &dyn PageDriver, url: &str) -> Result<(), FlowError> {
        if !self.validator.validate(url) {
            return Err(NavigationError::InvalidLink {
                url: url.to_string(),
            }
            .into());
        }

        match timeout(self.page_load_timeout, driver.goto(url)).await {
            Err(_) => {
                return Err(NavigationError::Timeout {
                    url: url.to_string(),
                }
                .into())
            }
            Ok(Err(e)) => {
                return Err(NavigationError::LoadFailed {
                    url: url.to_string(),
                    message: format!("{:#}", e),
                }
                .into())
            }
            Ok(Ok(())) => {}
        }

        sleep(self.navigation_settle_delay).await;

        let title = driver.title().await.unwrap_or_default();
        let current_url = driver.current_url().await.unwrap_or_default();
        debug!("落地页: 标题 {:?}, URL {:?}", title, current_url);

        if is_error_page(&title, &current_url) {
            return Err(NavigationError::ErrorPage { title, current_url }.into());
        }
        Ok(())
    }

    /// Navigated → SlipVerified
    async fn verify_slip(&self, driver: &dyn PageDriver) -> Result<(), FlowError> {
        self.resolver
            .resolve(driver, &SLIP_CONTAINER, Some(self.element_wait_timeout))
            .await
            .ok_or_else(|| slip_missing(SLIP_CONTAINER.name()))?;

        let picks = self.resolver.resolve_all(driver, &PICK_ITEM).await;
        if picks.is_empty() {
            return Err(slip_missing(PICK_ITEM.name()));
        }
        info!("✓ 投注单中有 {} 个选项", picks.len());

        self.resolver
            .resolve(driver, &SUBMIT_CONTROL, None)
            .await
            .ok_or_else(|| slip_missing(SUBMIT_CONTROL.name()))?;
        debug!("提交按钮可用");
        Ok(())
    }

    /// SlipVerified → UnitSet
    async fn set_unit_size(&self, driver: &dyn PageDriver, unit_size: u32) -> Result<(), FlowError> {
        let input = self
            .resolver
            .resolve(driver, &UNIT_SIZE_INPUT, None)
            .await
            .ok_or(VerificationError::UnitInputMissing)?;

        let expected = unit_size.to_string();
        if let Err(e) = driver.fill(&input, &expected).await {
            warn!("写入注额失败: {:#}", e);
            return Err(VerificationError::UnitSizeNotApplied {
                expected: unit_size,
                actual: String::new(),
            }
            .into());
        }

        sleep(self.unit_settle_delay).await;

        let actual = driver.read_value(&input).await.unwrap_or_default();
        if !actual.contains(&expected) {
            return Err(VerificationError::UnitSizeNotApplied {
                expected: unit_size,
                actual,
            }
            .into());
        }
        info!("✓ 注额已设置为 {}", actual);
        Ok(())
    }

    /// UnitSet → Submitted
    async fn submit(&self, driver: &dyn PageDriver) -> Result<(), FlowError> {
        let button = self
            .resolver
            .resolve(driver, &SUBMIT_CONTROL, None)
            .await
            .ok_or(VerificationError::SubmitControlMissing)?;

        self.recorder.capture(driver, "before_submission").await;

        info!("🖱️ 点击提交按钮...");
        if let Err(e) = driver.click(&button).await {
            warn!("点击提交按钮失败: {:#}", e);
            return Err(VerificationError::SubmitControlMissing.into());
        }

        sleep(self.submission_delay).await;

        self.recorder.capture(driver, "after_submission").await;
        Ok(())
    }

    /// Submitted → Confirmed，不会失败
    async fn confirm(&self, driver: &dyn PageDriver) -> Confirmation {
        if self
            .resolver
            .resolve(driver, &SUCCESS_INDICATOR, None)
            .await
            .is_some()
        {
            info!("✓ 找到成功提示");
            return Confirmation::Confirmed;
        }

        // 隐藏的容器也要检查，不能走只看可见元素的 resolver
        for selector in SLIP_CONTAINER.candidates() {
            let state = match driver.query(selector).await {
                Ok(states) => states.into_iter().next(),
                Err(e) => {
                    debug!("查询投注单容器失败 {}: {}", selector, e);
                    None
                }
            };
            let Some(state) = state else { continue };

            if !state.displayed
                || state.class_name.contains("empty")
                || state.text.trim().is_empty()
            {
                info!("✓ 投注单已清空或隐藏，视为提交成功");
                return Confirmation::Confirmed;
            }
            break;
        }

        Confirmation::Unconfirmed
    }
}

fn advance(state: &mut WorkflowState, next: WorkflowState) {
    debug_assert!(!state.is_terminal(), "终止状态不能再转移");
    debug!("状态: {} → {}", state, next);
    *state = next;
}

fn slip_missing(element: &str) -> FlowError {
    VerificationError::SlipNotPopulated {
        element: element.to_string(),
    }
    .into()
}

/// 落地页是否为错误页或空白页
fn is_error_page(title: &str, current_url: &str) -> bool {
    let url = current_url.trim();
    if url.is_empty() || url == "about:blank" {
        return true;
    }
    let title = title.to_lowercase();
    let url = url.to_lowercase();
    ERROR_PAGE_MARKERS
        .iter()
        .any(|marker| title.contains(marker) || url.contains(marker))
}
