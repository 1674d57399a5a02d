//! 核心编排层：错误类型与运行入口

pub mod error;
pub mod runner;

pub use error::WorkflowError;
pub use runner::{RunOutput, Runner};
