//! 流程状态

use std::fmt;

/// 投注单提交流程的状态
///
/// `Idle → Navigated → SlipVerified → UnitSet → Submitted → Confirmed`，
/// 任何非终止状态都可以进入 `Failed`。流程不可恢复，失败后只能从 `Idle` 重新开始。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Navigated,
    SlipVerified,
    UnitSet,
    Submitted,
    Confirmed,
    Failed,
}

impl WorkflowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowState::Confirmed | WorkflowState::Failed)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::Idle => "待开始",
            WorkflowState::Navigated => "已打开链接",
            WorkflowState::SlipVerified => "投注单已校验",
            WorkflowState::UnitSet => "注额已设置",
            WorkflowState::Submitted => "已提交",
            WorkflowState::Confirmed => "已完成",
            WorkflowState::Failed => "失败",
        };
        f.write_str(name)
    }
}

/// 提交后的确认结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// 看到成功提示或投注单已清空
    Confirmed,
    /// 已点击提交，但没有任何成功信号
    Unconfirmed,
}
