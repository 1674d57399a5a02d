//! Agent 构建器
//!
//! 提供流畅的 API 来构建任务单元

use std::sync::Arc;

use crate::config::WorkflowSection;
use crate::core::WorkflowError;
use crate::llm::LlmClient;
use crate::tools::{Tool, ToolGateway, ToolRegistry};
use crate::workflow::{Agent, Unit};

/// Agent 构建器
pub struct AgentBuilder {
    name: String,
    description: String,
    instruction: String,
    llm: Option<Arc<dyn LlmClient>>,
    registry: ToolRegistry,
    output_slot: Option<String>,
    reads: Vec<String>,
    max_tool_rounds: usize,
    tool_timeout_secs: u64,
}

impl AgentBuilder {
    /// 创建新的构建器
    pub fn new(name: impl Into<String>) -> Self {
        let defaults = WorkflowSection::default();
        Self {
            name: name.into(),
            description: String::new(),
            instruction: String::new(),
            llm: None,
            registry: ToolRegistry::new(),
            output_slot: None,
            reads: Vec::new(),
            max_tool_rounds: defaults.max_tool_rounds,
            tool_timeout_secs: defaults.tool_timeout_secs,
        }
    }

    /// 采用 [workflow] 配置中的工具轮数与超时
    pub fn with_defaults(mut self, cfg: &WorkflowSection) -> Self {
        self.max_tool_rounds = cfg.max_tool_rounds;
        self.tool_timeout_secs = cfg.tool_timeout_secs;
        self
    }

    /// 设置描述
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// 设置指令模板（可引用 `{slot}` / `{slot?}`）
    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// 设置模型客户端
    pub fn model(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// 添加本地工具
    pub fn tool(mut self, tool: impl Tool + 'static) -> Self {
        self.registry.register(tool);
        self
    }

    /// 把另一个单元作为工具（agent-as-tool）
    pub fn agent_tool(mut self, unit: Arc<dyn Unit>) -> Self {
        self.registry.register_unit(unit);
        self
    }

    /// 设置输出槽位
    pub fn output_slot(mut self, slot: impl Into<String>) -> Self {
        self.output_slot = Some(slot.into());
        self
    }

    /// 声明模板之外的依赖槽位
    pub fn reads<I, S>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reads.extend(slots.into_iter().map(Into::into));
        self
    }

    pub fn max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn tool_timeout_secs(mut self, secs: u64) -> Self {
        self.tool_timeout_secs = secs;
        self
    }

    /// 构建 Agent；缺少模型或输出槽位时返回 InvalidConfiguration
    pub fn build(self) -> Result<Agent, WorkflowError> {
        if self.name.trim().is_empty() {
            return Err(WorkflowError::InvalidConfiguration("agent name is required".to_string()));
        }
        let llm = self.llm.ok_or_else(|| {
            WorkflowError::InvalidConfiguration(format!("agent `{}` has no model", self.name))
        })?;
        let output_slot = self.output_slot.ok_or_else(|| {
            WorkflowError::InvalidConfiguration(format!("agent `{}` has no output slot", self.name))
        })?;

        let tools = if self.registry.is_empty() {
            None
        } else {
            Some(ToolGateway::new(self.registry, self.tool_timeout_secs))
        };

        Ok(Agent {
            name: self.name,
            description: self.description,
            instruction: self.instruction,
            llm,
            tools,
            output_slot,
            reads: self.reads,
            max_tool_rounds: self.max_tool_rounds,
        })
    }

    /// 构建并包装为 `Arc<dyn Unit>`，便于放入组合器
    pub fn build_unit(self) -> Result<Arc<dyn Unit>, WorkflowError> {
        Ok(Arc::new(self.build()?))
    }
}
