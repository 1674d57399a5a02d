//! Mock LLM 客户端（用于测试与演示，无需 API）
//!
//! - `MockLlmClient`：回显最后一条 User 消息
//! - `ScriptedLlmClient`：按顺序返回预置回复，可加延迟，并记录收到的对话
//! - `FnLlmClient`：由闭包根据对话决定回复

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError, Message, Role};

fn last_user(messages: &[Message]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or("(no input)")
}

/// Mock 客户端：回显用户最后一条消息
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        Ok(format!("Echo from Mock: {}", last_user(messages)))
    }
}

/// 脚本客户端：每次调用弹出一条预置回复，耗尽后返回 InvalidResponse
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    replies: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<Vec<Message>>>,
    delay: Option<Duration>,
}

impl ScriptedLlmClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            seen: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// 每次回复前等待（用于构造并行分支的完成先后）
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 已收到的对话（按调用顺序）
    pub fn conversations(&self) -> Vec<Vec<Message>> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(messages.to_vec());
        }
        self.replies
            .lock()
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?
            .pop_front()
            .ok_or_else(|| LlmError::InvalidResponse("script exhausted".to_string()))
    }
}

/// 闭包客户端
pub struct FnLlmClient<F>
where
    F: Fn(&[Message]) -> Result<String, LlmError> + Send + Sync,
{
    f: F,
}

impl<F> FnLlmClient<F>
where
    F: Fn(&[Message]) -> Result<String, LlmError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> LlmClient for FnLlmClient<F>
where
    F: Fn(&[Message]) -> Result<String, LlmError> + Send + Sync,
{
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        (self.f)(messages)
    }
}
