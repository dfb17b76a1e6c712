//! Request dispatch
//!
//! `{type, payload}` requests are routed to the delegate agent when one
//! is configured, and to the local engines otherwise or whenever the
//! delegate fails (network error, non-2xx, malformed answer). Only an
//! unknown request type or an undecodable payload reaches the caller as
//! an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::advisor::{advise_expenses, AdviceOptions, DEFAULT_CURRENCY};
use crate::agent::AgentClient;
use crate::error::MeshError;
use crate::models::{AddAck, AdviceResult, AdvisePayload, Expense, PlanPayload, PlanResult};
use crate::planner::{plan_tasks, seed_from_payload, PlanClock};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    ExpenseAdvise,
    TasksPlan,
    ExpenseAdd,
}

impl RequestKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "expense.advise" => Some(RequestKind::ExpenseAdvise),
            "tasks.plan" => Some(RequestKind::TasksPlan),
            "expense.add" => Some(RequestKind::ExpenseAdd),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::ExpenseAdvise => "expense.advise",
            RequestKind::TasksPlan => "tasks.plan",
            RequestKind::ExpenseAdd => "expense.add",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wire envelope, before the payload is interpreted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshEnvelope {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone)]
pub enum MeshRequest {
    Advise(AdvisePayload),
    Plan(PlanPayload),
    Add(Expense),
}

impl MeshRequest {
    pub fn from_envelope(envelope: &MeshEnvelope) -> Result<Self> {
        let kind = RequestKind::parse(envelope.kind.trim())
            .ok_or_else(|| MeshError::UnknownRequestType(envelope.kind.clone()))?;

        let request = match kind {
            RequestKind::ExpenseAdvise => MeshRequest::Advise(decode_payload(kind, &envelope.payload)?),
            RequestKind::TasksPlan => MeshRequest::Plan(decode_payload(kind, &envelope.payload)?),
            RequestKind::ExpenseAdd => MeshRequest::Add(decode_payload(kind, &envelope.payload)?),
        };
        Ok(request)
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            MeshRequest::Advise(_) => RequestKind::ExpenseAdvise,
            MeshRequest::Plan(_) => RequestKind::TasksPlan,
            MeshRequest::Add(_) => RequestKind::ExpenseAdd,
        }
    }
}

fn decode_payload<T>(kind: RequestKind, payload: &Value) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if payload.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(payload.clone())
        .map_err(|e| MeshError::InvalidPayload(format!("{}: {}", kind, e)))
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MeshResponse {
    Advice(AdviceResult),
    Plan(PlanResult),
    Added(AddAck),
}

/// Which side produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Agent,
    Local,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Agent => "agent",
            ResponseSource::Local => "local",
        }
    }
}

pub struct MeshService {
    agent: Option<Arc<dyn AgentClient>>,
    default_currency: String,
    clock: fn() -> PlanClock,
}

impl Default for MeshService {
    fn default() -> Self {
        Self::new(None, DEFAULT_CURRENCY)
    }
}

impl MeshService {
    pub fn new(agent: Option<Arc<dyn AgentClient>>, default_currency: &str) -> Self {
        Self {
            agent,
            default_currency: default_currency.to_string(),
            clock: PlanClock::now,
        }
    }

    /// Override the wall clock used by `tasks.plan`
    pub fn with_clock(mut self, clock: fn() -> PlanClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn has_agent(&self) -> bool {
        self.agent.is_some()
    }

    /// Handle one raw request body.
    pub async fn dispatch(&self, body: &Value) -> Result<(MeshResponse, ResponseSource)> {
        let envelope: MeshEnvelope = serde_json::from_value(body.clone())
            .map_err(|e| MeshError::InvalidPayload(format!("request envelope: {}", e)))?;

        let request = MeshRequest::from_envelope(&envelope).map_err(|e| {
            warn!(kind = %envelope.kind, "Rejected mesh request: {}", e);
            e
        })?;
        let kind = request.kind();

        if let Some(agent) = &self.agent {
            match self.delegate(agent.as_ref(), kind, body).await {
                Ok(response) => {
                    info!(kind = %kind, agent = agent.name(), "Answered by agent");
                    return Ok((response, ResponseSource::Agent));
                }
                Err(e) => {
                    warn!(kind = %kind, "Agent unavailable, using local engine: {}", e);
                }
            }
        }

        let response = self.run_local(request);
        info!(kind = %kind, "Answered locally");
        Ok((response, ResponseSource::Local))
    }

    async fn delegate(
        &self,
        agent: &dyn AgentClient,
        kind: RequestKind,
        body: &Value,
    ) -> Result<MeshResponse> {
        let answer = agent.send(body).await?;
        let response = match kind {
            RequestKind::ExpenseAdvise => MeshResponse::Advice(serde_json::from_value(answer)?),
            RequestKind::TasksPlan => MeshResponse::Plan(serde_json::from_value(answer)?),
            RequestKind::ExpenseAdd => MeshResponse::Added(serde_json::from_value(answer)?),
        };
        Ok(response)
    }

    /// Answer with the local engines only.
    pub fn run_local(&self, request: MeshRequest) -> MeshResponse {
        match request {
            MeshRequest::Advise(payload) => {
                let opts = AdviceOptions::from_payload(&payload, &self.default_currency);
                MeshResponse::Advice(advise_expenses(&payload.items, &opts))
            }
            MeshRequest::Plan(payload) => {
                let seed = seed_from_payload(&payload);
                MeshResponse::Plan(plan_tasks(&payload.tasks, seed, (self.clock)()))
            }
            MeshRequest::Add(expense) => {
                // browser storage stays the source of truth; nothing is kept here
                let id = if expense.id.trim().is_empty() {
                    stable_expense_id(&expense)
                } else {
                    expense.id.clone()
                };
                MeshResponse::Added(AddAck {
                    ok: true,
                    id: Some(id),
                })
            }
        }
    }
}

/// Deterministic id for an expense submitted without one
pub fn stable_expense_id(expense: &Expense) -> String {
    let key = format!(
        "{}|{}|{}|{}",
        expense.date, expense.category, expense.description, expense.amount
    );
    let hash = Sha256::digest(key.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);

    // Set UUID version (4) and variant (RFC4122) bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    uuid::Uuid::from_bytes(bytes).to_string()
}
