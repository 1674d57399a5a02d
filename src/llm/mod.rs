//! LLM 层：客户端抽象、消息与内置 Mock 实现

pub mod message;
pub mod mock;
pub mod traits;

use std::sync::Arc;

pub use message::{Message, Role};
pub use mock::{FnLlmClient, MockLlmClient, ScriptedLlmClient};
pub use traits::{LlmClient, LlmError, RetryPolicy};

use crate::config::LlmSection;
use crate::core::WorkflowError;

/// 根据 [llm] 配置创建客户端；真实模型后端由外部提供，此处仅内置 mock
pub fn create_llm_from_config(cfg: &LlmSection) -> Result<Arc<dyn LlmClient>, WorkflowError> {
    match cfg.provider.as_str() {
        "mock" => {
            tracing::info!(model = %cfg.model, retry_attempts = cfg.retry.attempts, "using mock LLM client");
            Ok(Arc::new(MockLlmClient))
        }
        other => Err(WorkflowError::InvalidConfiguration(format!(
            "LLM provider `{other}` is not bundled; inject an LlmClient instead"
        ))),
    }
}
