//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和调度，是唯一持有 `SessionManager` 的地方。
//!
//! ### `batch_processor` - 批量处理器
//! - 加载抓取文件，提取并去重链接
//! - 逐条调用 `SlipFlow`，两笔之间固定间隔
//! - 保存结果并输出统计
//!
//! ### `dispatcher` - 链接队列
//! - 链接可能同时到达，但同一会话上的流程必须串行
//! - 单个后台任务持有会话，按到达顺序逐条处理
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor / dispatcher (处理 Vec<CandidateLink>)
//!     ↓
//! workflow::SlipFlow (处理单条链接)
//!     ↓
//! services (能力层：resolver / session / evidence)
//!     ↓
//! infrastructure (基础设施：PageDriver)
//! ```

pub mod batch_processor;
pub mod dispatcher;

pub use batch_processor::{process_scraped_file, BatchReport, BetProcessor};
pub use dispatcher::{DispatcherHandle, LinkDispatcher};
