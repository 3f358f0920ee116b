use serde::{Deserialize, Serialize};

// === SCALARS ===

/// Money per unit of a good.
pub type Price = f64;
/// Units of a good.
pub type Quantity = f64;

/// Slopes below this are treated as absent curves: the agent contributes
/// nothing to aggregation and the line answers zero quantity everywhere.
pub const EPSILON: f64 = 1e-4;

// === IDS ===

/// Stable integer identity of an agent (consumer, laborer, or farmer).
/// Survives vector re-indexing when other agents are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

/// Handle into the product catalog. Products are immutable catalog entries;
/// every per-agent map is keyed by this handle, never by a local copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub usize);

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
