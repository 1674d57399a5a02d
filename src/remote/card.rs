//! Agent Card：远程 Agent 在约定路径发布的能力描述

use serde::{Deserialize, Serialize};

/// Agent Card 的约定发布路径（相对服务根地址）
pub const AGENT_CARD_WELL_KNOWN_PATH: &str = "/.well-known/agent-card.json";

/// 远程 Agent 的能力描述：名称、描述、调用端点；编排内核只读取不修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCard {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// 调用端点
    pub url: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub skills: Vec<AgentSkill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// 由服务根地址拼出 Agent Card 地址
pub fn card_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), AGENT_CARD_WELL_KNOWN_PATH)
}
