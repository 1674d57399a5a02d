//! 工具层：能力注册表、调用网关、Tool Call 解析与内置工具

pub mod call;
pub mod executor;
pub mod exit_loop;
pub mod function;
pub mod registry;

pub use call::{parse_tool_call, ToolCall};
pub use executor::ToolGateway;
pub use exit_loop::{ExitLoopTool, EXIT_LOOP_TOOL};
pub use function::FunctionTool;
pub use registry::{Capability, Tool, ToolRegistry};
