//! 工作流单元 trait
//!
//! 任务单元（Agent）、组合器（Sequential / Parallel / Loop）与远程代理都实现 Unit，
//! 组合器对子单元一视同仁。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::WorkflowError;
use crate::session::SessionState;

#[async_trait]
pub trait Unit: Send + Sync {
    /// 单元名（一次运行内唯一）
    fn name(&self) -> &str;

    /// 描述（作为能力注册时供 LLM 理解）
    fn description(&self) -> &str {
        ""
    }

    /// 最终输出所在槽位：任务单元为自身槽位，组合器为最后一个子单元的槽位
    fn output_slot(&self) -> Option<&str>;

    /// 直接子单元（组合器使用）
    fn sub_units(&self) -> &[Arc<dyn Unit>] {
        &[]
    }

    /// 作为工具注册、由本单元按需调用的单元（agent-as-tool）
    fn tool_units(&self) -> Vec<Arc<dyn Unit>> {
        Vec::new()
    }

    /// 在会话上执行一次
    async fn invoke(&self, input: &str, session: &mut SessionState) -> Result<Value, WorkflowError>;
}

/// 组合器的最终槽位：最后一个子单元的最终槽位
pub(crate) fn last_output_slot(children: &[Arc<dyn Unit>]) -> Option<&str> {
    children.last().and_then(|child| child.output_slot())
}
