//! LLM 客户端抽象
//!
//! 编排内核只依赖 `LlmClient::complete`；具体后端与重试执行都属于外部客户端，
//! 这里仅定义交给它的重试策略配置与错误分类。

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::llm::Message;

/// LLM 客户端 trait：给定对话返回一段文本
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;
}

/// 模型调用错误
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// 按重试策略判断该错误是否值得外部客户端重试
    pub fn is_retryable(&self, policy: &RetryPolicy) -> bool {
        match self {
            LlmError::Status { code, .. } => policy.http_status_codes.contains(code),
            LlmError::Network(_) => true,
            LlmError::InvalidResponse(_) => false,
        }
    }
}

/// 重试策略：最大尝试次数、退避倍数、首次延迟、可重试的 HTTP 状态码
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub exp_base: u32,
    pub initial_delay_secs: u64,
    pub http_status_codes: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            exp_base: 7,
            initial_delay_secs: 1,
            http_status_codes: vec![429, 500, 503, 504],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let policy = RetryPolicy::default();
        let throttled = LlmError::Status { code: 429, message: "quota".into() };
        let bad_request = LlmError::Status { code: 400, message: "bad".into() };

        assert!(throttled.is_retryable(&policy));
        assert!(!bad_request.is_retryable(&policy));
        assert!(LlmError::Network("reset".into()).is_retryable(&policy));
        assert!(!LlmError::InvalidResponse("empty".into()).is_retryable(&policy));
    }
}
