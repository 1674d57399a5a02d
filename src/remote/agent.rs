//! 远程 Agent 代理：解析 Agent Card 后包装为普通 Unit，组合器与网关无需区分本地 / 远程

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::WorkflowError;
use crate::remote::{AgentCard, RemoteTransport};
use crate::session::SessionState;
use crate::workflow::Unit;

pub struct RemoteAgent {
    card: AgentCard,
    transport: Arc<dyn RemoteTransport>,
    output_slot: String,
}

impl RemoteAgent {
    /// 从服务根地址获取 Agent Card 并创建代理
    pub async fn resolve(
        base_url: &str,
        transport: Arc<dyn RemoteTransport>,
        output_slot: impl Into<String>,
    ) -> Result<Self, WorkflowError> {
        let card = transport.fetch_card(base_url).await?;
        tracing::info!(agent = %card.name, endpoint = %card.url, "resolved remote agent");
        Ok(Self::from_card(card, transport, output_slot))
    }

    pub fn from_card(
        card: AgentCard,
        transport: Arc<dyn RemoteTransport>,
        output_slot: impl Into<String>,
    ) -> Self {
        Self {
            card,
            transport,
            output_slot: output_slot.into(),
        }
    }

    pub fn card(&self) -> &AgentCard {
        &self.card
    }
}

#[async_trait]
impl Unit for RemoteAgent {
    fn name(&self) -> &str {
        &self.card.name
    }

    fn description(&self) -> &str {
        &self.card.description
    }

    fn output_slot(&self) -> Option<&str> {
        Some(&self.output_slot)
    }

    async fn invoke(&self, input: &str, session: &mut SessionState) -> Result<Value, WorkflowError> {
        tracing::debug!(unit = %self.card.name, endpoint = %self.card.url, "remote invoke");
        let reply = self.transport.send(&self.card, input).await?;
        let output = Value::String(reply);
        session.set(self.output_slot.clone(), output.clone());
        Ok(output)
    }
}
