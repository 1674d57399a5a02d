pub mod agent;
pub mod builder;
pub mod loop_;
pub mod parallel;
pub mod sequential;
pub mod types;
pub mod unit;

pub use agent::Agent;
pub use builder::AgentBuilder;
pub use loop_::LoopAgent;
pub use parallel::ParallelAgent;
pub use sequential::SequentialAgent;
pub use types::*;
pub use unit::Unit;
