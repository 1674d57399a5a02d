//! 远程传输：获取 Agent Card、发送一条文本消息并取回文本回复
//!
//! HttpTransport 使用 JSON-RPC 2.0 的 `message/send`，请求带超时；失败统一转为 WorkflowError::Remote。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::WorkflowError;
use crate::remote::{card_url, AgentCard};

#[async_trait]
pub trait RemoteTransport: Send + Sync {
    async fn fetch_card(&self, base_url: &str) -> Result<AgentCard, WorkflowError>;

    async fn send(&self, card: &AgentCard, input: &str) -> Result<String, WorkflowError>;
}

/// HTTP 传输
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout_secs: u64) -> Result<Self, WorkflowError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| WorkflowError::Remote(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RemoteTransport for HttpTransport {
    async fn fetch_card(&self, base_url: &str) -> Result<AgentCard, WorkflowError> {
        let url = card_url(base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WorkflowError::Remote(format!("{url}: {e}")))?;
        if !resp.status().is_success() {
            return Err(WorkflowError::Remote(format!("{url}: HTTP {}", resp.status())));
        }
        resp.json::<AgentCard>()
            .await
            .map_err(|e| WorkflowError::Remote(format!("{url}: invalid agent card: {e}")))
    }

    async fn send(&self, card: &AgentCard, input: &str) -> Result<String, WorkflowError> {
        let body = message_send_request(input);
        let resp = self
            .client
            .post(&card.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WorkflowError::Remote(format!("{}: {e}", card.name)))?;
        if !resp.status().is_success() {
            return Err(WorkflowError::Remote(format!("{}: HTTP {}", card.name, resp.status())));
        }
        let reply: Value = resp
            .json()
            .await
            .map_err(|e| WorkflowError::Remote(format!("{}: {e}", card.name)))?;
        parse_message_send_response(&card.name, &reply)
    }
}

/// 构造 message/send 请求（单个文本 part）
pub fn message_send_request(input: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": uuid::Uuid::new_v4().to_string(),
        "method": "message/send",
        "params": {
            "message": {
                "kind": "message",
                "role": "user",
                "messageId": uuid::Uuid::new_v4().to_string(),
                "parts": [{ "kind": "text", "text": input }]
            }
        }
    })
}

/// 解析 message/send 响应：error 转为 Remote；result 中所有文本 part（消息本身、任务状态消息、产物）按顺序拼接
pub fn parse_message_send_response(agent: &str, reply: &Value) -> Result<String, WorkflowError> {
    if let Some(error) = reply.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(WorkflowError::Remote(format!("{agent}: {message}")));
    }
    let result = reply
        .get("result")
        .ok_or_else(|| WorkflowError::Remote(format!("{agent}: response has no result")))?;

    let mut texts = Vec::new();
    collect_text_parts(result.get("parts"), &mut texts);
    collect_text_parts(result.pointer("/status/message/parts"), &mut texts);
    if let Some(artifacts) = result.get("artifacts").and_then(Value::as_array) {
        for artifact in artifacts {
            collect_text_parts(artifact.get("parts"), &mut texts);
        }
    }

    if texts.is_empty() {
        return Err(WorkflowError::Remote(format!("{agent}: reply has no text parts")));
    }
    Ok(texts.join("\n"))
}

fn collect_text_parts(parts: Option<&Value>, out: &mut Vec<String>) {
    let Some(parts) = parts.and_then(Value::as_array) else {
        return;
    };
    for part in parts {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            out.push(text.to_string());
        }
    }
}
