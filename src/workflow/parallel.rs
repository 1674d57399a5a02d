//! 并行组合
//!
//! 每个子单元在独立的 tokio 任务上、基于启动时会话的快照运行，互相看不到对方的写入。
//! 等所有子单元结束后：若有失败，返回列表中最靠前的失败且不合并任何写入；
//! 否则按列表顺序把各分支的写入并回会话（同一槽位以列表靠后者为准，与完成先后无关）。

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::Value;

use crate::core::WorkflowError;
use crate::session::SessionState;
use crate::workflow::unit::last_output_slot;
use crate::workflow::Unit;

pub struct ParallelAgent {
    name: String,
    description: String,
    children: Vec<Arc<dyn Unit>>,
}

impl ParallelAgent {
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
impl Unit for ParallelAgent {
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

    /// 返回按列表顺序排列的子单元结果数组
    async fn invoke(&self, input: &str, session: &mut SessionState) -> Result<Value, WorkflowError> {
        tracing::debug!(unit = %self.name, branches = self.children.len(), "parallel fan-out");

        let handles: Vec<_> = self
            .children
            .iter()
            .map(|child| {
                let child = Arc::clone(child);
                let input = input.to_string();
                let mut branch = session.snapshot();
                tokio::spawn(async move {
                    let result = child.invoke(&input, &mut branch).await;
                    (result, branch)
                })
            })
            .collect();

        let joined = join_all(handles).await;

        let mut branches = Vec::with_capacity(joined.len());
        let mut first_error = None;
        for (child, outcome) in self.children.iter().zip(joined) {
            match outcome {
                Ok((Ok(value), branch)) => branches.push((value, branch)),
                Ok((Err(e), _)) => {
                    tracing::warn!(unit = %self.name, child = %child.name(), error = %e, "parallel branch failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(join_error) => {
                    tracing::warn!(unit = %self.name, child = %child.name(), error = %join_error, "parallel branch panicked");
                    if first_error.is_none() {
                        first_error = Some(WorkflowError::invocation(child.name(), join_error.to_string()));
                    }
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let mut outputs = Vec::with_capacity(branches.len());
        for (value, branch) in branches {
            session.merge(branch);
            outputs.push(value);
        }
        Ok(Value::Array(outputs))
    }
}
