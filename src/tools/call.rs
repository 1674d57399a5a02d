//! Tool Call 解析
//!
//! 模型以简化 JSON 请求调用能力：{"tool": "exit_loop", "args": {}}。
//! 回复中找不到合法的 Tool Call 时视为普通文本回复。

use serde::{Deserialize, Serialize};

/// 模型请求的一次能力调用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// 从模型回复中提取 Tool Call（```json 代码块或最外层 {...}）；tool 为空或 JSON 不合法时返回 None
pub fn parse_tool_call(output: &str) -> Option<ToolCall> {
    let trimmed = output.trim();

    let json_str = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        rest.find("```").map(|end| rest[..end].trim()).unwrap_or(rest.trim())
    } else {
        let start = trimmed.find('{')?;
        let end = trimmed.rfind('}')?;
        if end < start {
            return None;
        }
        &trimmed[start..=end]
    };

    let call: ToolCall = serde_json::from_str(json_str).ok()?;
    if call.tool.is_empty() {
        None
    } else {
        Some(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_json_call() {
        let call = parse_tool_call(r#"{"tool": "exit_loop", "args": {}}"#).unwrap();
        assert_eq!(call.tool, "exit_loop");
        assert_eq!(call.args, json!({}));
    }

    #[test]
    fn test_parse_fenced_call_without_args() {
        let call = parse_tool_call("Calling now:\n```json\n{\"tool\": \"ResearchAgent\"}\n```").unwrap();
        assert_eq!(call.tool, "ResearchAgent");
        assert_eq!(call.args, serde_json::Value::Null);
    }

    #[test]
    fn test_prose_is_not_a_call() {
        assert!(parse_tool_call("The keeper unfolded the map {slowly}.").is_none());
        assert!(parse_tool_call("APPROVED").is_none());
        assert!(parse_tool_call(r#"{"tool": "", "args": {}}"#).is_none());
    }
}
