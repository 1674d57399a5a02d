//! 编排错误类型
//!
//! 顺序 / 循环组合遇错即停并原样上抛；并行组合等所有分支结束后按列表位置上抛第一个失败。
//! 循环达到上限而未收到退出信号不是错误，见 `LoopOutcome`。

use thiserror::Error;

/// 工作流运行过程中可能出现的错误（缺少输入、未注册能力、工具失败、远程调用失败等）
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// 任务单元缺少必需的会话槽位，或其模型调用失败
    #[error("Invocation failed in `{unit}`: {reason}")]
    Invocation { unit: String, reason: String },

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error("Tool `{tool}` failed: {reason}")]
    ToolExecutionFailed { tool: String, reason: String },

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    #[error("Remote agent error: {0}")]
    Remote(String),

    #[error("Invalid workflow configuration: {0}")]
    InvalidConfiguration(String),
}

impl WorkflowError {
    pub fn invocation(unit: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invocation {
            unit: unit.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_slot(unit: impl Into<String>, slot: &str) -> Self {
        Self::invocation(unit, format!("missing session slot `{slot}`"))
    }
}
