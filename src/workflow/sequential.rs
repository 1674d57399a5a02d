//! 顺序组合：按列表顺序执行子单元，共享同一会话，遇错即停

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::WorkflowError;
use crate::session::SessionState;
use crate::workflow::unit::last_output_slot;
use crate::workflow::Unit;

pub struct SequentialAgent {
    name: String,
    description: String,
    children: Vec<Arc<dyn Unit>>,
}

impl SequentialAgent {
    pub fn new(name: impl Into<String>, children: Vec<Arc<dyn Unit>>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            children,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }
}

#[async_trait]
impl Unit for SequentialAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn output_slot(&self) -> Option<&str> {
        last_output_slot(&self.children)
    }

    fn sub_units(&self) -> &[Arc<dyn Unit>] {
        &self.children
    }

    /// 子单元 i+1 能读到子单元 i 的写入；返回最后一个子单元的结果（无子单元时为 Null）
    async fn invoke(&self, input: &str, session: &mut SessionState) -> Result<Value, WorkflowError> {
        let mut last = Value::Null;
        for (index, child) in self.children.iter().enumerate() {
            tracing::debug!(unit = %self.name, child = %child.name(), index, "sequential step");
            last = child.invoke(input, session).await.map_err(|e| {
                tracing::warn!(unit = %self.name, child = %child.name(), error = %e, "sequential step failed");
                e
            })?;
        }
        Ok(last)
    }
}
