//! 远程能力代理：Agent Card、传输与代理单元

pub mod agent;
pub mod card;
pub mod transport;

pub use agent::RemoteAgent;
pub use card::{card_url, AgentCard, AgentSkill, AGENT_CARD_WELL_KNOWN_PATH};
pub use transport::{HttpTransport, RemoteTransport};
