//! 能力注册表
//!
//! 本地工具实现 Tool trait（name / description / execute）；嵌套的工作流单元也可作为能力注册，
//! 二者统一存放为 `Capability`，由 ToolGateway 按名派发。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::workflow::Unit;

/// 工具 trait：名称、描述（供 LLM 理解）、参数 schema、异步执行（args 为 JSON）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（用于 JSON 中的 "tool" 字段）
    fn name(&self) -> &str;

    /// 工具描述（供 LLM 理解功能）
    fn description(&self) -> &str;

    /// 参数 JSON Schema；默认返回空对象，表示无参数或参数格式不限
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    /// 为 true 时，执行成功即向外层 LoopAgent 发出退出信号
    fn signals_exit(&self) -> bool {
        false
    }

    async fn execute(&self, args: Value) -> Result<Value, String>;
}

/// 可被调用的能力：本地函数或嵌套单元（agent-as-tool）
#[derive(Clone)]
pub enum Capability {
    Local(Arc<dyn Tool>),
    Nested(Arc<dyn Unit>),
}

impl Capability {
    pub fn name(&self) -> &str {
        match self {
            Capability::Local(tool) => tool.name(),
            Capability::Nested(unit) => unit.name(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Capability::Local(tool) => tool.description(),
            Capability::Nested(unit) => unit.description(),
        }
    }

    pub fn parameters_schema(&self) -> Value {
        match self {
            Capability::Local(tool) => tool.parameters_schema(),
            Capability::Nested(_) => serde_json::json!({
                "type": "object",
                "properties": { "request": { "type": "string" } },
                "required": ["request"]
            }),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Capability::Local(_) => "local",
            Capability::Nested(_) => "nested",
        }
    }
}

/// 能力注册表：按名称存储 Capability，同名后注册者覆盖
#[derive(Default, Clone)]
pub struct ToolRegistry {
    capabilities: HashMap<String, Capability>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.register_capability(Capability::Local(Arc::new(tool)));
    }

    /// 将单元注册为能力，名称取单元名
    pub fn register_unit(&mut self, unit: Arc<dyn Unit>) {
        self.register_capability(Capability::Nested(unit));
    }

    pub fn register_capability(&mut self, capability: Capability) {
        let name = capability.name().to_string();
        self.capabilities.insert(name, capability);
    }

    pub fn get(&self, name: &str) -> Option<Capability> {
        self.capabilities.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// 已注册的能力名（排序，保证 prompt 稳定）
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.capabilities.keys().cloned().collect();
        names.sort();
        names
    }

    /// 返回 (name, description) 列表，用于生成 prompt 中的 Available tools 段落
    pub fn tool_descriptions(&self) -> Vec<(String, String)> {
        self.tool_names()
            .into_iter()
            .filter_map(|name| {
                let desc = self.capabilities.get(&name)?.description().to_string();
                Some((name, desc))
            })
            .collect()
    }

    /// 注册为能力的嵌套单元（按名称排序）
    pub fn nested_units(&self) -> Vec<Arc<dyn Unit>> {
        self.tool_names()
            .iter()
            .filter_map(|name| match self.capabilities.get(name)? {
                Capability::Nested(unit) => Some(Arc::clone(unit)),
                Capability::Local(_) => None,
            })
            .collect()
    }

    /// 动态生成能力 schema JSON
    pub fn to_schema_json(&self) -> String {
        let tools: Vec<Value> = self
            .tool_names()
            .iter()
            .filter_map(|name| self.capabilities.get(name))
            .map(|cap| {
                serde_json::json!({
                    "name": cap.name(),
                    "description": cap.description(),
                    "parameters": cap.parameters_schema()
                })
            })
            .collect();
        serde_json::to_string_pretty(&tools).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ExitLoopTool, FunctionTool};

    #[test]
    fn test_names_are_sorted_and_described() {
        let mut registry = ToolRegistry::new();
        registry.register(ExitLoopTool);
        registry.register(FunctionTool::new("lookup", "Look up a product", |args| Ok(args)));

        assert_eq!(registry.tool_names(), vec!["exit_loop", "lookup"]);
        assert!(registry.contains("exit_loop"));
        assert!(registry.get("missing").is_none());

        let schema: Value = serde_json::from_str(&registry.to_schema_json()).unwrap();
        assert_eq!(schema.as_array().map(Vec::len), Some(2));
        assert_eq!(schema[0]["name"], "exit_loop");
    }
}
