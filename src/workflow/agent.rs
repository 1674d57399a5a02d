//! 任务单元：一次 Agent 调用
//!
//! invoke 流程：校验依赖槽位 -> 渲染指令模板 -> 调用模型 -> 若回复是 Tool Call 则经网关派发并把结果喂回模型
//! -> 把最终结果写入输出槽位（每次调用恰好写一次）。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::WorkflowError;
use crate::llm::{LlmClient, Message};
use crate::session::{render, value_to_text, SessionState};
use crate::tools::{parse_tool_call, ToolGateway};
use crate::workflow::Unit;

/// LLM 驱动的任务单元，由 AgentBuilder 构建，构建后不可变
pub struct Agent {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) instruction: String,
    pub(crate) llm: Arc<dyn LlmClient>,
    pub(crate) tools: Option<ToolGateway>,
    pub(crate) output_slot: String,
    /// 模板之外额外声明的依赖槽位
    pub(crate) reads: Vec<String>,
    pub(crate) max_tool_rounds: usize,
}

impl Agent {
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn tools(&self) -> Option<&ToolGateway> {
        self.tools.as_ref()
    }

    /// 渲染 system prompt：指令模板 + 可用工具说明
    fn system_prompt(&self, session: &SessionState) -> Result<String, WorkflowError> {
        for slot in &self.reads {
            if !session.contains(slot) {
                return Err(WorkflowError::missing_slot(&self.name, slot));
            }
        }
        let mut prompt = render(&self.instruction, session)
            .map_err(|slot| WorkflowError::missing_slot(&self.name, &slot))?;

        if let Some(gateway) = &self.tools {
            prompt.push_str("\n\n## Available tools\n");
            for (name, desc) in gateway.registry().tool_descriptions() {
                prompt.push_str(&format!("- {name}: {desc}\n"));
            }
            prompt.push_str(
                "\nTo call a tool, reply with only JSON: {\"tool\": \"<name>\", \"args\": {...}}\n",
            );
        }
        Ok(prompt)
    }

    async fn complete(&self, messages: &[Message]) -> Result<String, WorkflowError> {
        self.llm
            .complete(messages)
            .await
            .map_err(|e| WorkflowError::invocation(&self.name, e.to_string()))
    }

    /// 模型 / 工具往返，直到得到非 Tool Call 回复或收到退出信号
    async fn run_model(
        &self,
        input: &str,
        session: &mut SessionState,
    ) -> Result<Value, WorkflowError> {
        let mut messages = vec![
            Message::system(self.system_prompt(session)?),
            Message::user(input),
        ];
        let mut rounds = 0;

        loop {
            let reply = self.complete(&messages).await?;

            let Some(gateway) = &self.tools else {
                return Ok(Value::String(reply));
            };
            let Some(call) = parse_tool_call(&reply) else {
                return Ok(Value::String(reply));
            };

            if rounds >= self.max_tool_rounds {
                return Err(WorkflowError::invocation(
                    &self.name,
                    format!("tool round limit ({}) reached", self.max_tool_rounds),
                ));
            }
            rounds += 1;

            // 先取走同一轮里更早登记的信号，只看本次调用是否发出退出
            let pending = session.take_exit();
            tracing::debug!(unit = %self.name, tool = %call.tool, round = rounds, "dispatching tool call");
            let result = gateway.call(&call.tool, call.args, session).await;
            let raised_here = session.exit_requested();
            if !raised_here {
                if let Some(signal) = pending {
                    session.raise_exit(signal);
                }
            }
            let result = result?;

            if raised_here {
                // 已通过的草稿保持不变
                return Ok(session.get(&self.output_slot).cloned().unwrap_or(result));
            }

            messages.push(Message::assistant(reply));
            messages.push(Message::user(format!(
                "Tool `{}` returned: {}",
                call.tool,
                value_to_text(&result)
            )));
        }
    }
}

#[async_trait]
impl Unit for Agent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn output_slot(&self) -> Option<&str> {
        Some(&self.output_slot)
    }

    fn tool_units(&self) -> Vec<Arc<dyn Unit>> {
        self.tools
            .as_ref()
            .map(|gateway| gateway.registry().nested_units())
            .unwrap_or_default()
    }

    async fn invoke(&self, input: &str, session: &mut SessionState) -> Result<Value, WorkflowError> {
        tracing::debug!(unit = %self.name, slot = %self.output_slot, "agent invoked");
        let output = self.run_model(input, session).await?;
        session.set(self.output_slot.clone(), output.clone());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlmClient;
    use crate::tools::{ExitLoopTool, FunctionTool};
    use crate::workflow::AgentBuilder;
    use serde_json::json;

    #[tokio::test]
    async fn test_writes_reply_to_output_slot() {
        let llm = Arc::new(ScriptedLlmClient::new(["1. Hook\n2. Sections"]));
        let agent = AgentBuilder::new("OutlineAgent")
            .instruction("Create a blog outline for the given topic.")
            .model(llm.clone())
            .output_slot("blog_outline")
            .build()
            .unwrap();

        let mut session = SessionState::new();
        let out = agent.invoke("multi-agent systems", &mut session).await.unwrap();

        assert_eq!(out, json!("1. Hook\n2. Sections"));
        assert_eq!(session.get("blog_outline"), Some(&out));
        let seen = llm.conversations();
        assert_eq!(seen[0][1].content, "multi-agent systems");
    }

    #[tokio::test]
    async fn test_missing_template_slot_fails_before_model_call() {
        let llm = Arc::new(ScriptedLlmClient::new(["draft"]));
        let agent = AgentBuilder::new("WriterAgent")
            .instruction("Following this outline strictly: {blog_outline}")
            .model(llm.clone())
            .output_slot("blog_draft")
            .build()
            .unwrap();

        let mut session = SessionState::new();
        let err = agent.invoke("topic", &mut session).await.unwrap_err();

        assert!(matches!(&err, WorkflowError::Invocation { unit, reason }
            if unit == "WriterAgent" && reason.contains("blog_outline")));
        assert_eq!(llm.call_count(), 0);
        assert!(!session.contains("blog_draft"));
    }

    #[tokio::test]
    async fn test_declared_reads_are_required() {
        let agent = AgentBuilder::new("Aggregator")
            .instruction("Combine the findings.")
            .model(Arc::new(ScriptedLlmClient::new(["summary"])))
            .reads(["tech_research"])
            .output_slot("executive_summary")
            .build()
            .unwrap();

        let mut session = SessionState::new();
        assert!(agent.invoke("go", &mut session).await.is_err());

        session.set("tech_research", json!("LLMs"));
        assert_eq!(agent.invoke("go", &mut session).await.unwrap(), json!("summary"));
    }

    #[tokio::test]
    async fn test_tool_result_is_fed_back_to_model() {
        let llm = Arc::new(ScriptedLlmClient::new([
            r#"{"tool": "get_product_info", "args": {"product_name": "iPad Air"}}"#,
            "The iPad Air costs $599.",
        ]));
        let agent = AgentBuilder::new("product_catalog_agent")
            .instruction("Use the get_product_info tool.")
            .model(llm.clone())
            .tool(FunctionTool::new("get_product_info", "Look up a product", |args| {
                let name = args["product_name"].as_str().unwrap_or_default().to_string();
                Ok(json!(format!("Product: {name}, $599")))
            }))
            .output_slot("answer")
            .build()
            .unwrap();

        let mut session = SessionState::new();
        let out = agent.invoke("How much is the iPad Air?", &mut session).await.unwrap();

        assert_eq!(out, json!("The iPad Air costs $599."));
        let second_call = &llm.conversations()[1];
        assert!(second_call.last().unwrap().content.contains("Product: iPad Air, $599"));
        assert!(second_call[0].content.contains("get_product_info"));
    }

    #[tokio::test]
    async fn test_tool_round_limit() {
        let call = r#"{"tool": "noop", "args": {}}"#;
        let agent = AgentBuilder::new("Looper")
            .instruction("Keep calling.")
            .model(Arc::new(ScriptedLlmClient::new([call, call, call])))
            .tool(FunctionTool::new("noop", "does nothing", |_| Ok(Value::Null)))
            .max_tool_rounds(2)
            .output_slot("out")
            .build()
            .unwrap();

        let err = agent.invoke("go", &mut SessionState::new()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Invocation { reason, .. } if reason.contains("round limit")));
    }

    #[tokio::test]
    async fn test_exit_keeps_current_slot_value() {
        let agent = AgentBuilder::new("RefinerAgent")
            .instruction("Story: {current_story}\nCritique: {critique}")
            .model(Arc::new(ScriptedLlmClient::new([r#"{"tool": "exit_loop", "args": {}}"#])))
            .tool(ExitLoopTool)
            .output_slot("current_story")
            .build()
            .unwrap();

        let mut session = SessionState::new();
        session.set("current_story", json!("The lighthouse keeper..."));
        session.set("critique", json!("APPROVED"));

        let out = agent.invoke("refine", &mut session).await.unwrap();
        assert_eq!(out, json!("The lighthouse keeper..."));
        assert!(session.exit_requested());
    }

    #[tokio::test]
    async fn test_ordinary_tool_keeps_earlier_exit_signal() {
        let agent = AgentBuilder::new("Lookup")
            .instruction("Look things up.")
            .model(Arc::new(ScriptedLlmClient::new([
                r#"{"tool": "noop", "args": {}}"#,
                "done",
            ])))
            .tool(FunctionTool::new("noop", "does nothing", |_| Ok(Value::Null)))
            .output_slot("out")
            .build()
            .unwrap();

        let mut session = SessionState::new();
        session.raise_exit(crate::workflow::ExitSignal {
            raised_by: "exit_loop".to_string(),
            payload: Value::Null,
        });

        assert_eq!(agent.invoke("go", &mut session).await.unwrap(), json!("done"));
        assert_eq!(session.take_exit().map(|s| s.raised_by), Some("exit_loop".to_string()));
    }
}
