use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::agents::{Consumer, Farmer, Laborer};
use crate::curves::{DemandLine, SupplyLine, aggregate_demand, aggregate_supply};
use crate::firm::Firm;
use crate::types::{Price, ProductId, Quantity};

// === CONSTANTS ===

/// Prices never fall below this floor.
pub const PRICE_FLOOR: Price = 0.1;
/// Most recent days of price history kept per market.
pub const HISTORY_LEN: usize = 30;
/// Tâtonnement step on excess demand / excess supply.
const ADJUST_UP: f64 = 1.02;
const ADJUST_DOWN: f64 = 0.98;

// === EQUILIBRIUM ===

/// A market-clearing point. Degenerate aggregations report the held price
/// with zero quantity, so GDP sums stay well-defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equilibrium {
    pub price: Price,
    pub quantity: Quantity,
}

/// One tâtonnement step's observable effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub excess_before: Quantity,
    pub excess_after: Quantity,
}

// === MARKET ===

/// The per-product market: aggregates the heterogeneous linear curves of
/// everyone trading this product and clears them into an equilibrium price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub product: ProductId,
    pub price: Price,
    pub demand: DemandLine,
    pub supply: SupplyLine,
    /// Bounded ring of recent prices, oldest first.
    pub history: VecDeque<Price>,
}

impl Market {
    pub fn new(product: ProductId) -> Self {
        Self {
            product,
            price: PRICE_FLOOR,
            demand: DemandLine::default(),
            supply: SupplyLine::default(),
            history: VecDeque::new(),
        }
    }

    /// Rebuild the aggregate curves from current agent state.
    ///
    /// Demand comes from every household kind; supply from farmers growing
    /// this crop plus firms producing this product (via their derived
    /// marginal-cost lines).
    pub fn refresh_aggregates(
        &mut self,
        consumers: &[Consumer],
        laborers: &[Laborer],
        farmers: &[Farmer],
        firms: &[Firm],
    ) {
        let product = self.product;
        let demand_lines = consumers
            .iter()
            .filter_map(|c| c.demand.get(&product).copied())
            .chain(
                farmers
                    .iter()
                    .filter_map(|f| f.consumer.demand.get(&product).copied()),
            )
            .chain(
                laborers
                    .iter()
                    .filter_map(|l| l.consumer.demand.get(&product).copied()),
            );
        self.demand = aggregate_demand(demand_lines);

        let supply_lines = farmers
            .iter()
            .filter_map(|f| f.supply.get(&product).copied())
            .chain(
                firms
                    .iter()
                    .filter(|f| f.produces(product))
                    .filter_map(|f| f.supply_line()),
            );
        self.supply = aggregate_supply(supply_lines);
    }

    /// Solve `c_d − m_d·Q = c_s + m_s·Q`. Degenerate cases (near-flat curve
    /// sum, or a crossing at non-positive quantity) hold the current price.
    pub fn equilibrium(&self) -> Equilibrium {
        let denominator = self.demand.m + self.supply.m;
        if denominator < crate::types::EPSILON {
            return Equilibrium {
                price: self.price,
                quantity: 0.0,
            };
        }
        let quantity = (self.demand.c - self.supply.c) / denominator;
        if quantity <= 0.0 {
            return Equilibrium {
                price: self.price,
                quantity: 0.0,
            };
        }
        Equilibrium {
            price: self.demand.price_at(quantity),
            quantity,
        }
    }

    /// Adopt the equilibrium price, but only when both aggregate curves are
    /// non-trivial and the crossing sits above the floor - otherwise the
    /// tâtonnement path is left to move the price.
    pub fn clear(&mut self) {
        let eq = self.equilibrium();
        if !self.demand.is_trivial()
            && !self.supply.is_trivial()
            && eq.quantity > 0.0
            && eq.price > PRICE_FLOOR
        {
            self.price = eq.price;
        }
        if self.price < PRICE_FLOOR {
            self.price = PRICE_FLOOR;
        }
    }

    /// One Walrasian tâtonnement step: nudge the price up on excess demand,
    /// down on excess supply. A dead market (no quantity on either side) is
    /// left untouched.
    pub fn adjust_price(&mut self) -> Adjustment {
        let qd = self.demand.quantity_at(self.price);
        let qs = self.supply.quantity_at(self.price);
        if qd == 0.0 && qs == 0.0 {
            return Adjustment {
                excess_before: 0.0,
                excess_after: 0.0,
            };
        }

        let excess_before = qd - qs;
        if excess_before > 0.0 {
            self.price *= ADJUST_UP;
        } else if excess_before < 0.0 {
            self.price *= ADJUST_DOWN;
        }
        self.price = self.price.max(PRICE_FLOOR);

        let excess_after =
            self.demand.quantity_at(self.price) - self.supply.quantity_at(self.price);

        tracing::debug!(
            target: "market",
            product = self.product.0,
            price = self.price,
            excess_before,
            excess_after,
            "tatonnement step"
        );

        Adjustment {
            excess_before,
            excess_after,
        }
    }

    /// Append today's price, evicting the oldest entry past the window.
    pub fn record_history(&mut self) {
        self.history.push_back(self.price);
        if self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }
    }
}
