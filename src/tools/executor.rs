//! 工具调用网关
//!
//! 持有 ToolRegistry 与单次调用超时；call(name, args, session) 按名派发到本地工具或嵌套单元，
//! 调用方无需区分两者。每次调用输出结构化审计日志（JSON）。

use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::time::timeout;

use crate::core::WorkflowError;
use crate::session::SessionState;
use crate::tools::{Capability, ToolRegistry};
use crate::workflow::ExitSignal;

/// 工具调用网关：对每次调用施加超时，并将失败映射为 WorkflowError
pub struct ToolGateway {
    registry: ToolRegistry,
    timeout: Duration,
}

impl ToolGateway {
    pub fn new(registry: ToolRegistry, timeout_secs: u64) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// 调用指定能力
    ///
    /// 未注册的名称返回 UnknownCapability；本地工具失败返回 ToolExecutionFailed，超时返回 ToolTimeout；
    /// 嵌套单元在调用方的会话上运行，其错误原样上抛；超时同样作用于嵌套单元，
    /// 超时被取消时它已写入的槽位保留在会话中。
    /// 声明了 `signals_exit` 的工具成功后在会话上登记退出信号。
    pub async fn call(
        &self,
        name: &str,
        args: Value,
        session: &mut SessionState,
    ) -> Result<Value, WorkflowError> {
        let capability = self
            .registry
            .get(name)
            .ok_or_else(|| WorkflowError::UnknownCapability(name.to_string()))?;

        let start = Instant::now();
        let args_preview = args_preview(&args);

        let result = match &capability {
            Capability::Local(tool) => match timeout(self.timeout, tool.execute(args)).await {
                Ok(Ok(value)) => {
                    if tool.signals_exit() {
                        session.raise_exit(ExitSignal {
                            raised_by: name.to_string(),
                            payload: value.clone(),
                        });
                    }
                    Ok(value)
                }
                Ok(Err(reason)) => Err(WorkflowError::ToolExecutionFailed {
                    tool: name.to_string(),
                    reason,
                }),
                Err(_) => Err(WorkflowError::ToolTimeout(name.to_string())),
            },
            Capability::Nested(unit) => {
                let input = nested_input(&args);
                match timeout(self.timeout, unit.invoke(&input, session)).await {
                    Ok(result) => result,
                    Err(_) => Err(WorkflowError::ToolTimeout(name.to_string())),
                }
            }
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(WorkflowError::ToolTimeout(_)) => "timeout",
            Err(_) => "error",
        };
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": name,
            "kind": capability.kind(),
            "ok": result.is_ok(),
            "outcome": outcome,
            "duration_ms": start.elapsed().as_millis() as u64,
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit, "tool");

        result
    }
}

/// 嵌套单元的输入：优先取 args.request 字符串，否则整个 args 的 JSON 文本
fn nested_input(args: &Value) -> String {
    match args.get("request") {
        Some(Value::String(request)) => request.clone(),
        _ => args.to_string(),
    }
}

fn args_preview(args: &Value) -> String {
    let s = args.to_string();
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}
