//! 函数工具：用闭包包装本地可调用对象

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::Tool;

type ToolFn = dyn Fn(Value) -> Result<Value, String> + Send + Sync;

/// 闭包工具：名称、描述与同步闭包；适合目录查询、计数等纯计算能力
pub struct FunctionTool {
    name: String,
    description: String,
    parameters: Option<Value>,
    f: Box<ToolFn>,
}

impl FunctionTool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: None,
            f: Box::new(f),
        }
    }

    /// 设置参数 JSON Schema
    pub fn with_parameters(mut self, schema: Value) -> Self {
        self.parameters = Some(schema);
        self
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.parameters.clone().unwrap_or_else(|| {
            serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            })
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, String> {
        (self.f)(args)
    }
}
