//! 会话层：共享会话状态与指令模板

pub mod state;
pub mod template;

pub use state::SessionState;
pub use template::{placeholders, render, value_to_text, Placeholder};
