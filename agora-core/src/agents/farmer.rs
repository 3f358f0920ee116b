use std::collections::HashMap;

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::agents::consumer::{Consumer, DayContext};
use crate::catalog::Catalog;
use crate::curves::SupplyLine;
use crate::types::{Price, ProductId, Quantity};

// === COST-STRUCTURE CONSTANTS ===

/// Cost penalty per missing acre below the viable-farm threshold.
const SMALL_FARM_THRESHOLD: f64 = 3.0;
const SMALL_FARM_PENALTY: f64 = 2.5;
/// Cost discount per unit of tech level.
const TECH_DISCOUNT: f64 = 8.0;
/// Cost penalty per unit of weather shortfall below the growing norm.
const WEATHER_NORM: f64 = 0.65;
const WEATHER_PENALTY: f64 = 10.0;
/// Cost penalty per unit of tax rate.
const TAX_PENALTY: f64 = 30.0;
const COST_FLOOR: f64 = 8.0;
const SLOPE_FLOOR: f64 = 0.08;

/// Per-crop base marginal-cost floor, before farm-specific adjustments.
fn base_crop_cost(name: &str) -> f64 {
    match name {
        "rice" => 37.0,
        "potato" => 22.0,
        "banana" => 18.0,
        "corn" => 27.0,
        "jute" => 34.0,
        _ => 30.0,
    }
}

/// Per-crop base supply slope.
fn base_crop_slope(name: &str) -> f64 {
    match name {
        "rice" => 0.22,
        "potato" => 0.16,
        "banana" => 0.14,
        "corn" => 0.19,
        "jute" => 0.28,
        _ => 0.20,
    }
}

// === FARMER ===

/// A landholding household: consumes like any other agent, and supplies its
/// crops through per-product supply curves shaped by land, tech, weather,
/// and tax.
///
/// Invariant: every product in `crops` has an entry in all four per-crop
/// maps. [`Farmer::add_crop`] is the only path that creates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Farmer {
    pub consumer: Consumer,
    /// Acres under cultivation.
    pub land: f64,
    /// Mechanization/fertilizer level in [0, 1].
    pub tech: f64,
    /// Tax rate in [0, 1], a direct marginal-cost add-on.
    pub tax: f64,
    /// Today's growing conditions in [0, 1]; redrawn every day.
    pub weather: f64,
    /// Crops in insertion order.
    pub crops: Vec<ProductId>,
    pub supply: HashMap<ProductId, SupplyLine>,
    pub growth: HashMap<ProductId, f64>,
    pub decay: HashMap<ProductId, f64>,
    /// Current capacity ceiling per crop; evolves with growth and weather.
    pub max_output: HashMap<ProductId, Quantity>,
}

impl Farmer {
    pub fn new(consumer: Consumer, land: f64, tech: f64) -> Self {
        Self {
            consumer,
            land,
            tech,
            tax: 0.0,
            weather: 0.5,
            crops: Vec::new(),
            supply: HashMap::new(),
            growth: HashMap::new(),
            decay: HashMap::new(),
            max_output: HashMap::new(),
        }
    }

    /// Register a crop with its initial supply line and yield dynamics.
    pub fn add_crop(
        &mut self,
        product: ProductId,
        line: SupplyLine,
        growth: f64,
        decay: f64,
        initial_max: Quantity,
    ) {
        if !self.crops.contains(&product) {
            self.crops.push(product);
        }
        self.supply.insert(product, line);
        self.growth.insert(product, growth);
        self.decay.insert(product, decay);
        self.max_output.insert(product, initial_max);
    }

    pub fn grows(&self, product: ProductId) -> bool {
        self.crops.contains(&product)
    }

    /// Quantity supplied at a quoted price for one crop.
    ///
    /// The effective cost floor is the line's intercept plus tax minus twice
    /// the tech level; the effective slope steepens as weather worsens.
    pub fn supply_at(&self, product: ProductId, price: Price) -> Quantity {
        let Some(line) = self.supply.get(&product) else {
            return 0.0;
        };
        let mc_floor = line.c + self.tax - 2.0 * self.tech;
        let slope = line.m * self.weather;
        if price <= mc_floor || slope <= 0.0 {
            return 0.0;
        }
        let quantity = (price - mc_floor) / slope;
        quantity.min(self.max_output.get(&product).copied().unwrap_or(0.0))
    }

    /// Recompute every crop's supply line from the base-cost/base-slope
    /// tables and the farm's current parameters. Runs on tech upgrades and
    /// tax changes.
    pub fn refresh_supply_curves(&mut self, catalog: &Catalog) {
        for i in 0..self.crops.len() {
            let product = self.crops[i];
            let name = &catalog.get(product).name;
            let base_cost = base_crop_cost(name);
            let base_slope = base_crop_slope(name);

            let small_farm = if self.land < SMALL_FARM_THRESHOLD {
                (SMALL_FARM_THRESHOLD - self.land) * SMALL_FARM_PENALTY
            } else {
                0.0
            };
            let tech_discount = self.tech * TECH_DISCOUNT;
            let weather_penalty = (WEATHER_NORM - self.weather).max(0.0) * WEATHER_PENALTY;
            let tax_penalty = self.tax * TAX_PENALTY;

            let c = (base_cost - tech_discount + small_farm + weather_penalty + tax_penalty)
                .max(COST_FLOOR);
            let m = (base_slope + 0.18 / self.land.max(1.0) + 0.06 * (1.0 - self.tech))
                .max(SLOPE_FLOOR);

            self.supply.insert(product, SupplyLine::new(m, c));
        }
    }

    pub fn upgrade_tech(&mut self, level: f64, catalog: &Catalog) {
        self.tech = level;
        self.refresh_supply_curves(catalog);
    }

    pub fn set_tax(&mut self, rate: f64, catalog: &Catalog) {
        self.tax = rate;
        self.refresh_supply_curves(catalog);
    }

    /// One simulated day: the consumer update, then a fresh weather draw and
    /// the crop capacity evolution (growth minus weather-scaled decay).
    pub fn pass_day(&mut self, ctx: &DayContext, rng: &mut StdRng) {
        debug_assert!(
            self.crops.iter().all(|c| {
                self.supply.contains_key(c)
                    && self.growth.contains_key(c)
                    && self.decay.contains_key(c)
                    && self.max_output.contains_key(c)
            }),
            "crop maps out of step for {}",
            self.consumer.name
        );

        self.consumer.pass_day(ctx);

        self.weather = rng.random_range(0.0..1.0);

        for i in 0..self.crops.len() {
            let product = self.crops[i];
            let growth = self.growth.get(&product).copied().unwrap_or(0.0);
            let decay = self.decay.get(&product).copied().unwrap_or(0.0);
            let cap = self.max_output.entry(product).or_insert(0.0);
            *cap += growth;
            *cap -= decay * self.weather;
            *cap = cap.max(0.0);
        }
    }

    pub fn die(&mut self) {
        self.consumer.die();
        self.crops.clear();
        self.supply.clear();
        self.growth.clear();
        self.decay.clear();
        self.max_output.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AgentId;

    fn rice_farmer(catalog: &Catalog) -> Farmer {
        let consumer = Consumer::new(AgentId(21), "Shafin", 30)
            .with_savings(28_000.0)
            .with_income(450.0);
        let mut f = Farmer::new(consumer, 5.0, 0.6);
        f.tax = 0.05;
        f.weather = 0.70;
        f.add_crop(
            catalog.staple(),
            SupplyLine::new(0.25, 38.0),
            50.0,
            2.0,
            120.0,
        );
        f
    }

    #[test]
    fn supply_curve_from_cost_tables() {
        let catalog = Catalog::standard();
        let mut f = rice_farmer(&catalog);
        f.refresh_supply_curves(&catalog);

        // c = max(8, 37 − 8·0.6 + 0 + 0 + 30·0.05) = 33.7
        // m = 0.22 + 0.18/5 + 0.06·(1 − 0.6) = 0.28
        let line = f.supply[&catalog.staple()];
        assert!((line.c - 33.7).abs() < 1e-9);
        assert!((line.m - 0.28).abs() < 1e-9);
    }

    #[test]
    fn small_farm_and_tax_raise_the_cost_floor() {
        let catalog = Catalog::standard();
        let mut f = rice_farmer(&catalog);
        f.land = 1.5;
        f.set_tax(0.20, &catalog);
        let line = f.supply[&catalog.staple()];
        // 37 − 4.8 + (3 − 1.5)·2.5 + 0 + 30·0.20 = 41.95
        assert!((line.c - 41.95).abs() < 1e-9);
    }

    #[test]
    fn no_supply_below_effective_cost_floor() {
        let catalog = Catalog::standard();
        let mut f = rice_farmer(&catalog);
        f.refresh_supply_curves(&catalog);
        let rice = catalog.staple();

        // MC_eff = 33.7 + 0.05 − 1.2 = 32.55
        assert_eq!(f.supply_at(rice, 32.0), 0.0);
        assert!(f.supply_at(rice, 40.0) > 0.0);
    }

    #[test]
    fn supply_is_capped_by_max_output() {
        let catalog = Catalog::standard();
        let mut f = rice_farmer(&catalog);
        f.refresh_supply_curves(&catalog);
        let rice = catalog.staple();
        let q = f.supply_at(rice, 10_000.0);
        assert_eq!(q, f.max_output[&rice]);
    }

    #[test]
    fn crop_maps_stay_in_step() {
        let catalog = Catalog::standard();
        let f = rice_farmer(&catalog);
        for crop in &f.crops {
            assert!(f.supply.contains_key(crop));
            assert!(f.growth.contains_key(crop));
            assert!(f.decay.contains_key(crop));
            assert!(f.max_output.contains_key(crop));
        }
    }
}
