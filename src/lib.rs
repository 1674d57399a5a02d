//! Hive - 多 Agent 工作流编排内核
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型与编排运行器（Runner）
//! - **llm**: LLM 客户端抽象、消息类型、重试策略与 Mock / 脚本客户端
//! - **observability**: tracing 日志初始化
//! - **pipelines**: 演示流水线（博客、简报、故事打磨、研究协调）
//! - **remote**: 远程 Agent（Agent Card + JSON-RPC 传输）
//! - **session**: 会话共享状态与指令模板
//! - **tools**: 工具注册表、调用网关、工具调用解析与内置工具
//! - **workflow**: 任务单元（Agent）与顺序 / 并行 / 循环组合器

pub mod config;
pub mod core;
pub mod llm;
pub mod observability;
pub mod pipelines;
pub mod remote;
pub mod session;
pub mod tools;
pub mod workflow;
