//! 有界循环组合
//!
//! 状态机：Pending -> Running { iteration } -> Done { iterations, exited_early }。
//! 每轮把子单元作为一次顺序步骤执行，步骤结束后检查会话上的退出信号；
//! 收到信号则提前结束，否则在 max_iterations 轮后结束。迭代上限不可关闭。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::WorkflowError;
use crate::session::SessionState;
use crate::workflow::{LoopOutcome, LoopReport, LoopState, SequentialAgent, Unit};

pub struct LoopAgent {
    name: String,
    description: String,
    body: SequentialAgent,
    max_iterations: usize,
}

impl LoopAgent {
    /// 创建循环；max_iterations 为 0 时返回 InvalidConfiguration
    pub fn new(
        name: impl Into<String>,
        children: Vec<Arc<dyn Unit>>,
        max_iterations: usize,
    ) -> Result<Self, WorkflowError> {
        let name = name.into();
        if max_iterations == 0 {
            return Err(WorkflowError::InvalidConfiguration(format!(
                "loop `{name}` needs max_iterations >= 1"
            )));
        }
        Ok(Self {
            body: SequentialAgent::new(format!("{name}.body"), children),
            name,
            description: String::new(),
            max_iterations,
        })
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// 执行循环并返回结果；循环体错误原样上抛
    pub async fn run_loop(
        &self,
        input: &str,
        session: &mut SessionState,
    ) -> Result<LoopOutcome, WorkflowError> {
        // 循环外残留的信号不属于本循环
        if let Some(stale) = session.take_exit() {
            tracing::debug!(unit = %self.name, raised_by = %stale.raised_by, "discarding stale exit signal");
        }

        let mut state = LoopState::Pending;
        let mut iteration = 0;
        let mut output = Value::Null;
        tracing::debug!(unit = %self.name, ?state, max_iterations = self.max_iterations, "loop starting");

        let exited_early = loop {
            if iteration >= self.max_iterations {
                break false;
            }
            state = LoopState::Running { iteration };
            tracing::debug!(unit = %self.name, ?state, "loop iteration");

            output = self.body.invoke(input, session).await?;
            iteration += 1;

            if let Some(signal) = session.take_exit() {
                tracing::info!(unit = %self.name, iterations = iteration, raised_by = %signal.raised_by, "loop exited on signal");
                break true;
            }
        };

        state = LoopState::Done {
            iterations: iteration,
            exited_early,
        };
        if !exited_early {
            tracing::info!(unit = %self.name, iterations = iteration, "loop reached max iterations");
        }
        tracing::debug!(unit = %self.name, ?state, "loop finished");

        Ok(LoopOutcome {
            iterations: iteration,
            exited_early,
            output,
        })
    }
}

#[async_trait]
impl Unit for LoopAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn output_slot(&self) -> Option<&str> {
        self.body.output_slot()
    }

    fn sub_units(&self) -> &[Arc<dyn Unit>] {
        self.body.sub_units()
    }

    async fn invoke(&self, input: &str, session: &mut SessionState) -> Result<Value, WorkflowError> {
        let outcome = self.run_loop(input, session).await?;
        session.record_loop(LoopReport {
            name: self.name.clone(),
            iterations: outcome.iterations,
            exited_early: outcome.exited_early,
        });
        Ok(outcome.output)
    }
}
