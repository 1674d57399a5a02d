//! 工作流类型定义
//!
//! 退出信号、循环状态机与循环结果

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 退出信号：由声明了 `signals_exit` 的工具产生，只有 LoopAgent 观察并消费
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitSignal {
    /// 发出信号的能力名
    pub raised_by: String,
    /// 该能力的返回值
    pub payload: Value,
}

/// 循环状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopState {
    /// 尚未开始
    Pending,
    /// 正在执行第 iteration 轮（从 0 计）
    Running { iteration: usize },
    /// 已结束；exited_early 表示收到退出信号而非达到上限
    Done { iterations: usize, exited_early: bool },
}

impl LoopState {
    pub fn is_done(&self) -> bool {
        matches!(self, LoopState::Done { .. })
    }
}

/// 一次循环运行的结果；达到上限（exited_early = false）是正常结束，不是错误
#[derive(Debug, Clone, PartialEq)]
pub struct LoopOutcome {
    pub iterations: usize,
    pub exited_early: bool,
    /// 最后一轮循环体的输出
    pub output: Value,
}

/// 循环报告，记录在会话上并由 Runner 返回
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopReport {
    pub name: String,
    pub iterations: usize,
    pub exited_early: bool,
}
