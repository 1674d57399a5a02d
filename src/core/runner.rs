//! 编排入口：为每次运行创建新会话，驱动根单元执行到结束并返回最终输出
//!
//! Runner 不重试、不吞错：树中第一个未恢复的错误原样返回给调用方。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::core::WorkflowError;
use crate::session::SessionState;
use crate::workflow::{LoopReport, Unit};

/// 一次运行的结果
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub run_id: String,
    pub root: String,
    /// 根单元的最终槽位（最后一个单元的输出槽位）
    pub final_slot: Option<String>,
    /// 最终槽位的值；根单元没有槽位时为其返回值
    pub output: Value,
    /// 运行结束时的会话内容
    pub state: BTreeMap<String, Value>,
    pub loops: Vec<LoopReport>,
    pub started_at: i64,
    pub completed_at: i64,
}

/// 编排 Runner：持有根单元，可多次运行，每次运行互不影响
pub struct Runner {
    root: Arc<dyn Unit>,
}

impl Runner {
    /// 创建 Runner；树中不同单元重名时返回 InvalidConfiguration（同一单元实例可重复出现）
    pub fn new(root: Arc<dyn Unit>) -> Result<Self, WorkflowError> {
        let mut seen: HashMap<String, Arc<dyn Unit>> = HashMap::new();
        check_unique_names(&root, &mut seen)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Arc<dyn Unit> {
        &self.root
    }

    pub async fn run(&self, input: &str) -> Result<RunOutput, WorkflowError> {
        let mut session = SessionState::new();
        let run_id = session.id().to_string();
        let started_at = chrono::Utc::now().timestamp_millis();
        tracing::info!(run_id = %run_id, root = %self.root.name(), "run started");

        let returned = match self.root.invoke(input, &mut session).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(run_id = %run_id, root = %self.root.name(), error = %e, "run failed");
                return Err(e);
            }
        };

        let final_slot = self.root.output_slot().map(str::to_string);
        let output = final_slot
            .as_deref()
            .and_then(|slot| session.get(slot).cloned())
            .unwrap_or(returned);

        let completed_at = chrono::Utc::now().timestamp_millis();
        tracing::info!(
            run_id = %run_id,
            root = %self.root.name(),
            duration_ms = completed_at - started_at,
            slots = session.len(),
            "run completed"
        );

        let (state, loops) = session.into_parts();
        Ok(RunOutput {
            run_id,
            root: self.root.name().to_string(),
            final_slot,
            output,
            state: state.into_iter().collect(),
            loops,
            started_at,
            completed_at,
        })
    }
}

/// 遍历子单元与作为工具注册的单元；同名必须是同一实例
fn check_unique_names(
    unit: &Arc<dyn Unit>,
    seen: &mut HashMap<String, Arc<dyn Unit>>,
) -> Result<(), WorkflowError> {
    match seen.get(unit.name()) {
        Some(existing) if !Arc::ptr_eq(existing, unit) => {
            return Err(WorkflowError::InvalidConfiguration(format!(
                "duplicate unit name `{}`",
                unit.name()
            )));
        }
        Some(_) => return Ok(()),
        None => {
            seen.insert(unit.name().to_string(), Arc::clone(unit));
        }
    }
    for child in unit.sub_units() {
        check_unique_names(child, seen)?;
    }
    for tool_unit in unit.tool_units() {
        check_unique_names(&tool_unit, seen)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlmClient;
    use crate::workflow::{AgentBuilder, ParallelAgent, SequentialAgent};
    use serde_json::json;

    fn agent(name: &str, slot: &str, reply: &str) -> Arc<dyn Unit> {
        AgentBuilder::new(name)
            .instruction("work")
            .model(Arc::new(ScriptedLlmClient::new([reply])))
            .output_slot(slot)
            .build_unit()
            .unwrap()
    }

    #[tokio::test]
    async fn test_output_is_final_slot_of_last_unit() {
        let root: Arc<dyn Unit> = Arc::new(SequentialAgent::new(
            "BlogPipeline",
            vec![agent("Outline", "blog_outline", "outline"), agent("Editor", "final_blog", "polished")],
        ));
        let out = Runner::new(root).unwrap().run("topic").await.unwrap();

        assert_eq!(out.final_slot.as_deref(), Some("final_blog"));
        assert_eq!(out.output, json!("polished"));
        assert_eq!(out.state.len(), 2);
        assert!(out.completed_at >= out.started_at);
    }

    #[tokio::test]
    async fn test_runs_use_fresh_sessions() {
        let llm = Arc::new(ScriptedLlmClient::new(["first", "second"]));
        let root = AgentBuilder::new("Solo")
            .instruction("work")
            .model(llm)
            .output_slot("out")
            .build_unit()
            .unwrap();
        let runner = Runner::new(root).unwrap();

        let a = runner.run("x").await.unwrap();
        let b = runner.run("y").await.unwrap();
        assert_ne!(a.run_id, b.run_id);
        assert_eq!(b.output, json!("second"));
        assert_eq!(b.state.len(), 1);
    }

    #[tokio::test]
    async fn test_errors_are_returned_unchanged() {
        let root = AgentBuilder::new("Broken")
            .instruction("{nothing}")
            .model(Arc::new(ScriptedLlmClient::new(["x"])))
            .output_slot("out")
            .build_unit()
            .unwrap();
        let err = Runner::new(root).unwrap().run("go").await.unwrap_err();
        assert!(matches!(err, WorkflowError::Invocation { unit, .. } if unit == "Broken"));
    }

    #[test]
    fn test_duplicate_names_rejected_but_reuse_allowed() {
        let shared = agent("Shared", "s", "x");
        let reuse: Arc<dyn Unit> = Arc::new(SequentialAgent::new("Reuse", vec![shared.clone(), shared]));
        assert!(Runner::new(reuse).is_ok());

        let clash: Arc<dyn Unit> = Arc::new(ParallelAgent::new(
            "Clash",
            vec![agent("Twin", "a", "x"), agent("Twin", "b", "y")],
        ));
        assert!(matches!(Runner::new(clash), Err(WorkflowError::InvalidConfiguration(_))));
    }

    fn coordinator(researcher: Arc<dyn Unit>) -> Arc<dyn Unit> {
        AgentBuilder::new("Coordinator")
            .instruction("Delegate to the researcher.")
            .model(Arc::new(ScriptedLlmClient::new(["done"])))
            .agent_tool(researcher)
            .output_slot("answer")
            .build_unit()
            .unwrap()
    }

    #[test]
    fn test_agent_tool_names_are_checked() {
        let clash: Arc<dyn Unit> = Arc::new(SequentialAgent::new(
            "Pipeline",
            vec![
                coordinator(agent("ResearchAgent", "findings", "a")),
                agent("ResearchAgent", "findings", "b"),
            ],
        ));
        assert!(matches!(Runner::new(clash), Err(WorkflowError::InvalidConfiguration(msg)) if msg.contains("ResearchAgent")));

        let researcher = agent("ResearchAgent", "findings", "a");
        let shared: Arc<dyn Unit> = Arc::new(SequentialAgent::new(
            "Pipeline",
            vec![coordinator(researcher.clone()), researcher],
        ));
        assert!(Runner::new(shared).is_ok());
    }
}
