use serde::{Deserialize, Serialize};

use crate::curves::SupplyLine;
use crate::types::{AgentId, EPSILON, ProductId, Quantity};

// === PRODUCTION FUNCTION ===

/// The firm's technology. Chosen at construction, never mutated.
///
/// Inputs are factor counts: L = hired workers, K = capital units. Capital
/// efficiency is a pricing attribute only and does not enter output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProductionFn {
    /// `Q = A · L^α · K^β`
    CobbDouglas { alpha: f64, beta: f64, tech: f64 },
    /// `Q = (L^ρ + K^ρ)^(1/ρ)`
    Ces { rho: f64 },
}

impl ProductionFn {
    pub fn output(&self, l: f64, k: f64) -> Quantity {
        match *self {
            ProductionFn::CobbDouglas { alpha, beta, tech } => l.powf(alpha) * k.powf(beta) * tech,
            ProductionFn::Ces { rho } => (l.powf(rho) + k.powf(rho)).powf(1.0 / rho),
        }
    }
}

// === FACTORS ===

/// One rented machine. Efficiency weights the rental-rate comparison in
/// factor-mix analysis but not the production function.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CapitalUnit {
    pub rental_rate: f64,
    pub efficiency: f64,
}

/// Snapshot of a hired laborer. The labor roster is firm-owned data, not a
/// reference into the world's laborer vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub id: AgentId,
    pub name: String,
    pub skill: f64,
}

// === COSTS ===

/// Cached cost metrics, recomputed on any hire, fire, capital change, or
/// daily pass. `average_fixed` and `average` are infinite when the firm
/// produces nothing but still pays rent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Costs {
    pub total_fixed: f64,
    pub total_variable: f64,
    pub total: f64,
    pub average_fixed: f64,
    pub average_variable: f64,
    pub average: f64,
    pub marginal: f64,
    pub output: Quantity,
}

/// Where the firm sits on its average-cost curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleRegime {
    EconomiesOfScale,
    DiminishingReturns,
}

impl std::fmt::Display for ScaleRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleRegime::EconomiesOfScale => write!(f, "economies of scale"),
            ScaleRegime::DiminishingReturns => write!(f, "diminishing returns"),
        }
    }
}

/// Marginal product per unit of factor cost, for both factors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FactorEfficiency {
    /// MPL / wage
    pub labor: f64,
    /// MPK / average capital rental
    pub capital: f64,
}

/// Tolerance within which the factor mix counts as optimal.
pub const MIX_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorMix {
    NearOptimal,
    FavorLabor,
    FavorCapital,
}

impl FactorEfficiency {
    pub fn mix(&self) -> FactorMix {
        if (self.labor - self.capital).abs() < MIX_TOLERANCE {
            FactorMix::NearOptimal
        } else if self.labor > self.capital {
            FactorMix::FavorLabor
        } else {
            FactorMix::FavorCapital
        }
    }
}

// === FIRM ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Firm {
    /// The consumer who owns this firm. Ownership records survive the owner.
    pub owner: AgentId,
    pub cash: f64,
    pub production: ProductionFn,
    /// Daily wage paid per worker.
    pub wage: f64,
    pub fixed_overhead: f64,
    pub workers: Vec<Worker>,
    pub capital: Vec<CapitalUnit>,
    /// Products this firm supplies to markets.
    pub products: Vec<ProductId>,
    pub costs: Costs,
}

impl Firm {
    pub fn new(owner: AgentId, cash: f64, production: ProductionFn) -> Self {
        Self {
            owner,
            cash,
            production,
            wage: 0.0,
            fixed_overhead: 0.0,
            workers: Vec::new(),
            capital: Vec::new(),
            products: Vec::new(),
            costs: Costs::default(),
        }
    }

    pub fn labor(&self) -> f64 {
        self.workers.len() as f64
    }

    pub fn capital_units(&self) -> f64 {
        self.capital.len() as f64
    }

    /// Total rental paid on capital per day.
    pub fn capital_cost(&self) -> f64 {
        self.capital.iter().map(|c| c.rental_rate).sum()
    }

    pub fn produces(&self, product: ProductId) -> bool {
        self.products.contains(&product)
    }

    /// Discrete marginal product of labor: `Q(L+1, K) − Q(L, K)`.
    pub fn marginal_product_of_labor(&self) -> f64 {
        let (l, k) = (self.labor(), self.capital_units());
        self.production.output(l + 1.0, k) - self.production.output(l, k)
    }

    /// Discrete marginal product of capital: `Q(L, K+1) − Q(L, K)`.
    pub fn marginal_product_of_capital(&self) -> f64 {
        let (l, k) = (self.labor(), self.capital_units());
        self.production.output(l, k + 1.0) - self.production.output(l, k)
    }

    /// Recompute the cached cost metrics from the current factor counts.
    pub fn recalculate_costs(&mut self) {
        let (l, k) = (self.labor(), self.capital_units());

        let output = self.production.output(l, k);
        let total_fixed = self.fixed_overhead + self.capital_cost();
        let total_variable = l * self.wage;
        let total = total_fixed + total_variable;

        let (average_fixed, average_variable, average) = if output > EPSILON {
            (total_fixed / output, total_variable / output, total / output)
        } else {
            // Paying rent while producing nothing.
            (f64::INFINITY, 0.0, f64::INFINITY)
        };

        let mpl = self.marginal_product_of_labor();
        let marginal = if mpl > EPSILON {
            self.wage / mpl
        } else {
            f64::INFINITY
        };

        self.costs = Costs {
            total_fixed,
            total_variable,
            total,
            average_fixed,
            average_variable,
            average,
            marginal,
            output,
        };
    }

    /// Bang-for-buck of each factor at the current mix.
    pub fn factor_efficiency(&self) -> FactorEfficiency {
        let labor = if self.wage > 0.0 {
            self.marginal_product_of_labor() / self.wage
        } else {
            0.0
        };
        let avg_rental = if self.capital.is_empty() {
            0.0
        } else {
            self.capital_cost() / self.capital_units()
        };
        let capital = if avg_rental > 0.0 {
            self.marginal_product_of_capital() / avg_rental
        } else {
            0.0
        };
        FactorEfficiency { labor, capital }
    }

    /// MC below AC means spreading fixed costs still pays; above means the
    /// variable factor has hit diminishing returns.
    pub fn scale_regime(&self) -> ScaleRegime {
        if self.costs.marginal < self.costs.average {
            ScaleRegime::EconomiesOfScale
        } else {
            ScaleRegime::DiminishingReturns
        }
    }

    /// The firm's contribution to a market's aggregate supply: the line
    /// through `(0, AVC)` and `(Q, MC)`, so the firm offers along its
    /// marginal-cost ray. None when output is negligible or costs are
    /// degenerate.
    pub fn supply_line(&self) -> Option<SupplyLine> {
        let q = self.costs.output;
        if q <= EPSILON || !self.costs.marginal.is_finite() {
            return None;
        }
        let slope = (self.costs.marginal - self.costs.average_variable) / q;
        if slope <= EPSILON {
            return None;
        }
        Some(SupplyLine::new(slope, self.costs.average_variable))
    }

    pub fn hire(&mut self, worker: Worker) {
        self.workers.push(worker);
        self.recalculate_costs();
    }

    /// Remove a worker by name. Returns false (and changes nothing) when no
    /// worker matches.
    pub fn fire_named(&mut self, name: &str) -> bool {
        let Some(pos) = self.workers.iter().position(|w| w.name == name) else {
            return false;
        };
        self.workers.remove(pos);
        self.recalculate_costs();
        true
    }

    /// Drop the most recently hired worker.
    pub fn fire_last(&mut self) -> Option<Worker> {
        let worker = self.workers.pop()?;
        self.recalculate_costs();
        Some(worker)
    }

    pub fn add_capital(&mut self, rental_rate: f64, efficiency: f64) {
        self.capital.push(CapitalUnit {
            rental_rate,
            efficiency,
        });
        self.recalculate_costs();
    }

    pub fn employs(&self, id: AgentId) -> bool {
        self.workers.iter().any(|w| w.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn garment_firm() -> Firm {
        let mut f = Firm::new(
            AgentId(11),
            600_000.0,
            ProductionFn::CobbDouglas {
                alpha: 0.6,
                beta: 0.4,
                tech: 1.2,
            },
        );
        f.wage = 430.0;
        f.fixed_overhead = 3500.0;
        f.workers.push(Worker {
            id: AgentId(31),
            name: "Kowshik".into(),
            skill: 0.7,
        });
        f.workers.push(Worker {
            id: AgentId(32),
            name: "Cauchy".into(),
            skill: 0.5,
        });
        f.capital.push(CapitalUnit {
            rental_rate: 800.0,
            efficiency: 1.5,
        });
        f.recalculate_costs();
        f
    }

    #[test]
    fn cobb_douglas_cost_accounting() {
        let f = garment_firm();
        // Q = 1.2 · 2^0.6 · 1^0.4
        let q = 1.2 * 2.0_f64.powf(0.6);
        assert!((f.costs.output - q).abs() < 1e-9);
        assert!((f.costs.total_fixed - 4300.0).abs() < 1e-9);
        assert!((f.costs.total_variable - 860.0).abs() < 1e-9);
        assert!((f.costs.total - 5160.0).abs() < 1e-9);
        assert!((f.costs.average - 5160.0 / q).abs() < 1e-9);

        let mpl = 1.2 * (3.0_f64.powf(0.6) - 2.0_f64.powf(0.6));
        assert!((f.marginal_product_of_labor() - mpl).abs() < 1e-9);
        assert!((f.costs.marginal - 430.0 / mpl).abs() < 1e-9);
    }

    #[test]
    fn zero_output_means_infinite_average_cost() {
        let mut f = Firm::new(AgentId(1), 1000.0, ProductionFn::Ces { rho: 0.5 });
        f.wage = 100.0;
        f.fixed_overhead = 500.0;
        f.recalculate_costs();
        assert!(f.costs.average.is_infinite());
        assert!(f.costs.average_fixed.is_infinite());
        assert_eq!(f.costs.average_variable, 0.0);
    }

    #[test]
    fn average_cost_dominates_its_components() {
        let f = garment_firm();
        assert!(f.costs.average >= f.costs.average_fixed);
        assert!(f.costs.average >= f.costs.average_variable);
    }

    #[test]
    fn ces_is_symmetric_in_factors() {
        let p = ProductionFn::Ces { rho: 0.5 };
        assert!((p.output(2.0, 3.0) - p.output(3.0, 2.0)).abs() < 1e-12);
    }

    #[test]
    fn supply_line_passes_through_avc_and_mc() {
        let f = garment_firm();
        let line = f.supply_line().expect("positive output");
        assert!((line.c - f.costs.average_variable).abs() < 1e-9);
        assert!((line.price_at(f.costs.output) - f.costs.marginal).abs() < 1e-9);
    }

    #[test]
    fn fire_named_is_transactional() {
        let mut f = garment_firm();
        let costs_before = f.costs;
        assert!(!f.fire_named("nobody"));
        assert_eq!(f.workers.len(), 2);
        assert_eq!(f.costs.total, costs_before.total);

        assert!(f.fire_named("Cauchy"));
        assert_eq!(f.workers.len(), 1);
    }

    #[test]
    fn scale_regime_tracks_mc_vs_ac() {
        let f = garment_firm();
        // Heavy fixed overhead relative to output puts MC well under AC.
        assert_eq!(f.scale_regime(), ScaleRegime::EconomiesOfScale);
    }
}
