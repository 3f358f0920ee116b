use serde::{Deserialize, Serialize};

use crate::types::{AgentId, ProductId};

// === SELECTION REGISTRY ===

/// The "currently selected" handles used by the command layer.
///
/// Handles are ids, not references: the owning vectors re-index when an agent
/// is removed, so each handle is resolved to a transient reference at the
/// point of use (see the `selected_*` methods on `World`). The selected firm
/// is not stored - it is derived as the first firm owned by the selected
/// consumer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selections {
    pub consumer: Option<AgentId>,
    pub laborer: Option<AgentId>,
    pub farmer: Option<AgentId>,
    pub market: Option<ProductId>,
}

impl Selections {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Drop any handle pointing at `id`. Must run before the agent is removed
    /// from its owning vector so a handle never outlives its referent.
    pub fn forget_agent(&mut self, id: AgentId) {
        if self.consumer == Some(id) {
            self.consumer = None;
        }
        if self.laborer == Some(id) {
            self.laborer = None;
        }
        if self.farmer == Some(id) {
            self.farmer = None;
        }
    }
}
