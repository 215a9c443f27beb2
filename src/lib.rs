//! # Slip Submit
//!
//! 通过浏览器自动提交 PrizePicks 分享投注单的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有浏览器与页面，只暴露能力
//! - `PageDriver` - 页面操作接口，测试中可替换
//! - `CdpDriver` / `JsExecutor` - 基于 chromiumoxide 的真实实现
//!
//! ### ② 业务能力层（Services）
//! - `SessionManager` - 会话建立、Cookie 恢复、登录、关闭
//! - `ElementResolver` - 按优先级定位元素
//! - `LinkValidator` - 分享链接校验
//! - `EvidenceRecorder` - 提交前后截图
//!
//! ### ③ 流程层（Workflow）
//! - `SlipFlow` - 一条链接的完整处理：导航 → 校验 → 注额 → 提交 → 确认
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量处理抓取文件
//! - `orchestrator/dispatcher` - 链接队列，保证同一会话上串行执行

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, Credentials};
pub use error::{AppError, AppResult};
pub use infrastructure::{CdpDriver, ElementHandle, ElementState, PageDriver};
pub use models::{CandidateLink, Outcome, Selector, SelectorSet, WorkflowResult};
pub use orchestrator::{process_scraped_file, BetProcessor, DispatcherHandle, LinkDispatcher};
pub use services::{ElementResolver, LinkValidator, Session, SessionManager};
pub use workflow::SlipFlow;
