use serde::{Deserialize, Serialize};

use crate::agents::consumer::Consumer;

/// An employable household: a consumer with a skill level and a reservation
/// wage. Adds nothing structural to the daily update - firms read the skill
/// and wage fields when hiring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laborer {
    pub consumer: Consumer,
    /// Skill in [0, 1]; firms hire highest-skill first.
    pub skill: f64,
    /// Minimum acceptable daily wage.
    pub min_wage: f64,
}

impl Laborer {
    pub fn new(consumer: Consumer, skill: f64, min_wage: f64) -> Self {
        Self {
            consumer,
            skill,
            min_wage,
        }
    }
}
