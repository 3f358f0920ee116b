use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::curves::DemandLine;
use crate::types::{AgentId, Price, ProductId, Quantity};

// === CONSTANTS ===

/// Fraction of daily income a household will spend on a single good.
const BUDGET_SHARE: f64 = 0.3;
/// Days of income counted as wealth for marginal-utility purposes.
const MU_WEALTH_DAYS: f64 = 30.0;
/// Days of income counted as wealth for the income-elastic consumption base.
const CONSUMPTION_WEALTH_DAYS: f64 = 365.0;
/// Observed-price / intercept ratio beyond which the reservation price gives.
const PRICE_SHOCK_RATIO: f64 = 1.2;
/// Intercept multiplier applied on a price shock.
const PRICE_SHOCK_DAMPING: f64 = 0.95;
/// Intercept shift per unit of income change for normal goods (scaled by η).
const NORMAL_INCOME_SHIFT: f64 = 0.05;
/// Same for inferior goods, with the 0.5 intercept floor.
const INFERIOR_INCOME_SHIFT: f64 = 0.02;
const INFERIOR_INTERCEPT_FLOOR: f64 = 0.5;

// === DAILY CONTEXT ===

/// Read-only inputs to an agent's daily update.
pub struct DayContext<'a> {
    pub gdp_per_capita: f64,
    /// Current market prices. Absent or near-zero entries fall back to the
    /// agent's own willingness to pay.
    pub prices: &'a HashMap<ProductId, Price>,
    pub catalog: &'a Catalog,
}

// === CONSUMER ===

/// The household component shared by all three agent kinds.
///
/// Farmers and laborers embed a `Consumer` rather than inheriting from one;
/// their extra per-day behavior runs after this component's update.
///
/// Invariant: `demand`, `consumed`, and `substitution` are keyed by exactly
/// the products in `needs`. [`Consumer::add_need`] is the only path that
/// creates entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consumer {
    pub id: AgentId,
    pub name: String,
    pub age_days: u32,
    pub alive: bool,
    /// Money stock.
    pub savings: f64,
    /// Money flow per day.
    pub daily_income: f64,
    /// Total spent during the most recent daily update.
    pub expenses: f64,
    /// Cached 1 / wealth; the common denominator for substitution ratios.
    pub mu_per_unit: f64,
    /// Needed products in insertion order. Iteration order of every per-need
    /// loop in the kernel.
    pub needs: Vec<ProductId>,
    pub demand: HashMap<ProductId, DemandLine>,
    /// Cumulative consumed quantity per product, net of decay.
    pub consumed: HashMap<ProductId, Quantity>,
    /// Marginal-utility ratio of each need relative to the staple.
    pub substitution: HashMap<ProductId, f64>,
    /// Income observed at the end of the previous daily update, for the
    /// Engel-shift rule.
    last_income: f64,
}

impl Consumer {
    pub fn new(id: AgentId, name: impl Into<String>, age_years: u32) -> Self {
        Self {
            id,
            name: name.into(),
            age_days: age_years * 365,
            alive: true,
            savings: 0.0,
            daily_income: 0.0,
            expenses: 0.0,
            mu_per_unit: 1.0,
            needs: Vec::new(),
            demand: HashMap::new(),
            consumed: HashMap::new(),
            substitution: HashMap::new(),
            last_income: 0.0,
        }
    }

    pub fn with_savings(mut self, savings: f64) -> Self {
        self.savings = savings;
        self.refresh_mu();
        self
    }

    pub fn with_income(mut self, income: f64) -> Self {
        self.daily_income = income;
        self.last_income = income;
        self.refresh_mu();
        self
    }

    /// Register a demand entry for a product. Slope and intercept are floored
    /// so the line stays usable; all three maps gain the key together.
    pub fn add_need(&mut self, product: ProductId, line: DemandLine) {
        if !self.needs.contains(&product) {
            self.needs.push(product);
        }
        self.demand.insert(
            product,
            DemandLine::new(line.m.max(0.05), line.c.max(1.0)),
        );
        self.consumed.insert(product, 0.0);
        self.substitution.insert(product, 0.0);
    }

    /// Align the Engel-shift baseline with the current income. Called after
    /// an external income overwrite that applies its own demand shift, so the
    /// next daily update does not shift twice.
    pub fn sync_income(&mut self) {
        self.last_income = self.daily_income;
    }

    /// Wealth for marginal-utility purposes: savings plus a month of income.
    pub fn wealth(&self) -> f64 {
        self.savings + self.daily_income * MU_WEALTH_DAYS
    }

    pub fn refresh_mu(&mut self) {
        self.mu_per_unit = 1.0 / self.wealth().max(1.0);
    }

    /// Willingness to pay for the next unit given what has been consumed.
    pub fn willingness_to_pay(&self, product: ProductId) -> Option<Price> {
        let line = self.demand.get(&product)?;
        let consumed = self.consumed.get(&product).copied().unwrap_or(0.0);
        Some(line.price_at(consumed))
    }

    /// Marginal utility of a product: WTP expressed in utility units.
    pub fn marginal_utility(&self, product: ProductId) -> Option<f64> {
        Some(self.willingness_to_pay(product)? * self.mu_per_unit)
    }

    /// Consumer surplus at a quoted market price: `½·(c − p)·Q*` with
    /// `Q* = max(0, (c − p)/m)`, clamped at zero from below.
    pub fn surplus(&self, product: ProductId, market_price: Price) -> Option<f64> {
        let line = self.demand.get(&product)?;
        let q_star = line.quantity_at(market_price);
        Some((0.5 * (line.c - market_price) * q_star).max(0.0))
    }

    /// Income-elastic consumption for one product, capped by the per-good
    /// budget share.
    fn consumption_rate(&self, product: ProductId, gdp_per_capita: f64, catalog: &Catalog) -> Quantity {
        let prod = catalog.get(product);
        let wealth = self.savings + self.daily_income * CONSUMPTION_WEALTH_DAYS;
        // An indebted household has zero elastic base; the powf must never
        // see a negative base.
        let wealth_ratio = (wealth / gdp_per_capita.max(1.0)).max(0.0);
        let base = prod.base_consumption * wealth_ratio.powf(prod.eta);

        let intercept = self
            .demand
            .get(&product)
            .map(|line| line.c)
            .filter(|c| *c > 0.01)
            .unwrap_or(1.0);
        let max_affordable = self.daily_income * BUDGET_SHARE / intercept;

        base.min(max_affordable)
    }

    /// One simulated day: age, consume each need under the budget constraint,
    /// settle finances, then refresh the cached utility state.
    ///
    /// Side effects run in a fixed order so two same-seed runs stay identical.
    pub fn pass_day(&mut self, ctx: &DayContext) {
        debug_assert!(
            self.needs.len() == self.demand.len()
                && self.needs.len() == self.consumed.len()
                && self.needs.len() == self.substitution.len(),
            "need maps out of step for {}",
            self.name
        );

        self.age_days += 1;

        self.expenses = 0.0;
        for i in 0..self.needs.len() {
            let product = self.needs[i];
            let quantity = self.consumption_rate(product, ctx.gdp_per_capita, ctx.catalog);

            // Market price when one is quoted, own WTP otherwise.
            let price = match ctx.prices.get(&product).copied() {
                Some(p) if p > 0.01 => p,
                _ => self.willingness_to_pay(product).unwrap_or(0.01).max(0.01),
            };

            self.expenses += price * quantity;
            let consumed = self.consumed.entry(product).or_insert(0.0);
            *consumed += quantity;

            // Spoilage eats into the stock of past consumption.
            *consumed = (*consumed - ctx.catalog.get(product).decay_rate).max(0.0);
        }

        self.savings += self.daily_income - self.expenses;

        let income_change = self.daily_income - self.last_income;
        if income_change.abs() > 0.01 {
            self.shift_demand_for_income_change(income_change, ctx.catalog);
        }
        self.last_income = self.daily_income;

        self.refresh_mu();
        self.refresh_substitution(ctx.catalog);
    }

    /// Engel-curve shift: normal goods move with income, inferior goods move
    /// against it (with a floor so the line never collapses).
    pub fn shift_demand_for_income_change(&mut self, income_change: f64, catalog: &Catalog) {
        for i in 0..self.needs.len() {
            let product = self.needs[i];
            let eta = catalog.get(product).eta;
            let Some(line) = self.demand.get_mut(&product) else {
                continue;
            };
            if eta > 0.0 {
                line.c += income_change * NORMAL_INCOME_SHIFT * eta;
            } else if eta < 0.0 {
                line.c = (line.c + income_change * INFERIOR_INCOME_SHIFT * eta)
                    .max(INFERIOR_INTERCEPT_FLOOR);
            }
        }
    }

    /// Damp the reservation price when the observed market price runs well
    /// above it.
    pub fn observe_price(&mut self, product: ProductId, observed: Price) {
        if let Some(line) = self.demand.get_mut(&product) {
            let shock = observed / line.c.max(0.1);
            if shock > PRICE_SHOCK_RATIO {
                line.c *= PRICE_SHOCK_DAMPING;
            }
        }
    }

    fn refresh_substitution(&mut self, catalog: &Catalog) {
        let staple_mu = self.marginal_utility(catalog.staple()).unwrap_or(0.0);
        for i in 0..self.needs.len() {
            let product = self.needs[i];
            let ratio = if staple_mu.abs() > f64::EPSILON {
                self.marginal_utility(product).unwrap_or(0.0) / staple_mu
            } else {
                0.0
            };
            self.substitution.insert(product, ratio);
        }
    }

    /// Mark dead and drop dependent collections. The owning world removes the
    /// entry and clears selection handles.
    pub fn die(&mut self) {
        self.alive = false;
        self.needs.clear();
        self.demand.clear();
        self.consumed.clear();
        self.substitution.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_consumer(catalog: &Catalog) -> Consumer {
        let mut c = Consumer::new(AgentId(1), "Ana", 30)
            .with_savings(10_000.0)
            .with_income(500.0);
        c.add_need(catalog.staple(), DemandLine::new(2.0, 90.0));
        c
    }

    #[test]
    fn add_need_keeps_maps_in_step() {
        let catalog = Catalog::standard();
        let c = test_consumer(&catalog);
        for need in &c.needs {
            assert!(c.demand.contains_key(need));
            assert!(c.consumed.contains_key(need));
            assert!(c.substitution.contains_key(need));
        }
    }

    #[test]
    fn budget_share_caps_expenditure() {
        let catalog = Catalog::standard();
        let mut c = test_consumer(&catalog);
        let prices = HashMap::new();
        c.pass_day(&DayContext {
            gdp_per_capita: 1000.0,
            prices: &prices,
            catalog: &catalog,
        });
        // With the WTP fallback, price ≤ intercept, so spend per good is
        // bounded by the 30% share.
        assert!(c.expenses <= c.daily_income * BUDGET_SHARE * c.needs.len() as f64 + 1e-9);
    }

    #[test]
    fn price_shock_damps_intercept() {
        let catalog = Catalog::standard();
        let mut c = test_consumer(&catalog);
        let rice = catalog.staple();
        let before = c.demand[&rice].c;

        // Ratio just below the trigger: no change.
        c.observe_price(rice, before * 1.19);
        assert_eq!(c.demand[&rice].c, before);

        // Above the trigger: intercept shrinks by exactly the damping factor.
        c.observe_price(rice, before * 1.3);
        assert!((c.demand[&rice].c - before * PRICE_SHOCK_DAMPING).abs() < 1e-9);
    }

    #[test]
    fn income_rise_shifts_normal_good_out() {
        let catalog = Catalog::standard();
        let mut c = test_consumer(&catalog);
        let rice = catalog.staple();
        let before = c.demand[&rice].c;
        c.daily_income += 100.0;
        let prices = HashMap::new();
        c.pass_day(&DayContext {
            gdp_per_capita: 1000.0,
            prices: &prices,
            catalog: &catalog,
        });
        // rice is a normal good (η > 0): intercept moves up with income
        assert!(c.demand[&rice].c > before);
    }

    #[test]
    fn surplus_clamps_at_zero() {
        let catalog = Catalog::standard();
        let c = test_consumer(&catalog);
        let rice = catalog.staple();
        assert_eq!(c.surplus(rice, 200.0), Some(0.0));
        let s = c.surplus(rice, 50.0).unwrap();
        // ½ · (90 − 50) · (40/2) = 400
        assert!((s - 400.0).abs() < 1e-9);
    }

    #[test]
    fn die_clears_dependent_state() {
        let catalog = Catalog::standard();
        let mut c = test_consumer(&catalog);
        c.die();
        assert!(!c.alive);
        assert!(c.needs.is_empty());
        assert!(c.demand.is_empty() && c.consumed.is_empty() && c.substitution.is_empty());
    }
}
