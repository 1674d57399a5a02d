//! 退出循环工具
//!
//! 仅在评审结论为通过时调用；执行成功即由网关在会话上登记退出信号，由所在的 LoopAgent 消费。

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::Tool;

/// 退出工具名
pub const EXIT_LOOP_TOOL: &str = "exit_loop";

/// exit_loop：返回 approved 状态并发出退出信号
pub struct ExitLoopTool;

#[async_trait]
impl Tool for ExitLoopTool {
    fn name(&self) -> &str {
        EXIT_LOOP_TOOL
    }

    fn description(&self) -> &str {
        "Call this ONLY when the critique is exactly 'APPROVED': the draft is finished and the refinement loop stops. Args: {}"
    }

    fn signals_exit(&self) -> bool {
        true
    }

    async fn execute(&self, _args: Value) -> Result<Value, String> {
        Ok(serde_json::json!({
            "status": "approved",
            "message": "Draft approved. Exiting refinement loop."
        }))
    }
}
