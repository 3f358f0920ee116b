use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::agents::{Consumer, Farmer, Laborer};
use crate::catalog::{Catalog, products};
use crate::curves::{DemandLine, SupplyLine};
use crate::error::{KernelError, KernelResult};
use crate::firm::{Firm, ProductionFn, Worker};
use crate::market::Market;
use crate::selection::Selections;
use crate::types::{AgentId, Price, ProductId};

// === CONSTANTS ===

/// Fixed seed of the default world; two runs with the same seed and command
/// sequence are numerically identical.
pub const DEFAULT_SEED: u64 = 42;

/// Id blocks for operator-created agents, kept clear of the seeded roster.
const ADDED_CONSUMER_BASE: u32 = 100;
const ADDED_FARMER_BASE: u32 = 120;
const ADDED_LABORER_BASE: u32 = 140;

// === MACRO AGGREGATES ===

/// Snapshot of the economy-wide aggregates, refreshed once per tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Stats {
    pub gdp: f64,
    pub unemployment: f64,
    pub employed: usize,
    pub population: usize,
    pub money_supply: f64,
    pub firms: usize,
}

/// What changed across a multi-day fast-forward, for the shell's summary.
#[derive(Debug, Clone)]
pub struct DaySummary {
    pub days: u32,
    pub gdp_before: f64,
    pub gdp_after: f64,
    /// (product, price before, price after) per market.
    pub prices: Vec<(ProductId, Price, Price)>,
}

// === WORLD ===

/// The single owner of all simulation state: agents, firms, markets, the
/// selection registry, and the seeded RNG every stochastic draw goes
/// through.
#[derive(Debug)]
pub struct World {
    pub catalog: Catalog,
    pub day: u64,
    pub consumers: Vec<Consumer>,
    pub laborers: Vec<Laborer>,
    pub farmers: Vec<Farmer>,
    pub firms: Vec<Firm>,
    pub markets: Vec<Market>,
    pub selections: Selections,
    pub stats: Stats,
    pub rng: StdRng,
}

impl World {
    /// An empty world over a catalog. Markets are created eagerly, one per
    /// product.
    pub fn new(catalog: Catalog, seed: u64) -> Self {
        let markets = (0..catalog.len()).map(ProductId).map(Market::new).collect();
        Self {
            catalog,
            day: 0,
            consumers: Vec::new(),
            laborers: Vec::new(),
            farmers: Vec::new(),
            firms: Vec::new(),
            markets,
            selections: Selections::default(),
            stats: Stats::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    // === QUERIES ===

    pub fn population(&self) -> usize {
        self.consumers.len() + self.laborers.len() + self.farmers.len()
    }

    pub fn find_consumer(&self, name: &str) -> Option<&Consumer> {
        self.consumers.iter().find(|c| c.name == name)
    }

    pub fn find_laborer(&self, name: &str) -> Option<&Laborer> {
        self.laborers.iter().find(|l| l.consumer.name == name)
    }

    pub fn find_farmer(&self, name: &str) -> Option<&Farmer> {
        self.farmers.iter().find(|f| f.consumer.name == name)
    }

    pub fn market_for(&self, product: ProductId) -> Option<&Market> {
        self.markets.iter().find(|m| m.product == product)
    }

    /// Current market prices keyed by product handle.
    pub fn price_map(&self) -> HashMap<ProductId, Price> {
        self.markets.iter().map(|m| (m.product, m.price)).collect()
    }

    /// Per-market equilibrium contributions to GDP.
    pub fn gdp_breakdown(&self) -> Vec<(ProductId, crate::market::Equilibrium)> {
        self.markets
            .iter()
            .map(|m| (m.product, m.equilibrium()))
            .collect()
    }

    /// True when some firm employs this laborer.
    pub fn is_employed(&self, id: AgentId) -> bool {
        self.firms.iter().any(|f| f.employs(id))
    }

    // === SELECTION RESOLUTION ===

    pub fn selected_consumer(&self) -> Option<&Consumer> {
        let id = self.selections.consumer?;
        self.consumers.iter().find(|c| c.id == id)
    }

    pub fn selected_consumer_mut(&mut self) -> Option<&mut Consumer> {
        let id = self.selections.consumer?;
        self.consumers.iter_mut().find(|c| c.id == id)
    }

    pub fn selected_laborer(&self) -> Option<&Laborer> {
        let id = self.selections.laborer?;
        self.laborers.iter().find(|l| l.consumer.id == id)
    }

    pub fn selected_farmer(&self) -> Option<&Farmer> {
        let id = self.selections.farmer?;
        self.farmers.iter().find(|f| f.consumer.id == id)
    }

    pub fn selected_farmer_mut(&mut self) -> Option<&mut Farmer> {
        let id = self.selections.farmer?;
        self.farmers.iter_mut().find(|f| f.consumer.id == id)
    }

    pub fn selected_market(&self) -> Option<&Market> {
        let product = self.selections.market?;
        self.market_for(product)
    }

    /// The selected firm is derived: the first firm owned by the selected
    /// consumer.
    pub fn selected_firm(&self) -> Option<&Firm> {
        let owner = self.selections.consumer?;
        self.firms.iter().find(|f| f.owner == owner)
    }

    pub fn selected_firm_mut(&mut self) -> Option<&mut Firm> {
        let owner = self.selections.consumer?;
        self.firms.iter_mut().find(|f| f.owner == owner)
    }

    // === SELECTION COMMANDS ===

    pub fn select_consumer(&mut self, name: &str) -> KernelResult<AgentId> {
        let id = self
            .find_consumer(name)
            .map(|c| c.id)
            .ok_or_else(|| KernelError::NotFound {
                kind: "consumer",
                name: name.to_string(),
            })?;
        self.selections.consumer = Some(id);
        Ok(id)
    }

    pub fn select_laborer(&mut self, name: &str) -> KernelResult<AgentId> {
        let id = self
            .find_laborer(name)
            .map(|l| l.consumer.id)
            .ok_or_else(|| KernelError::NotFound {
                kind: "laborer",
                name: name.to_string(),
            })?;
        self.selections.laborer = Some(id);
        Ok(id)
    }

    pub fn select_farmer(&mut self, name: &str) -> KernelResult<AgentId> {
        let id = self
            .find_farmer(name)
            .map(|f| f.consumer.id)
            .ok_or_else(|| KernelError::NotFound {
                kind: "farmer",
                name: name.to_string(),
            })?;
        self.selections.farmer = Some(id);
        Ok(id)
    }

    pub fn select_market(&mut self, product_name: &str) -> KernelResult<ProductId> {
        let product = self
            .catalog
            .find(product_name)
            .ok_or_else(|| KernelError::NotFound {
                kind: "market",
                name: product_name.to_string(),
            })?;
        self.selections.market = Some(product);
        Ok(product)
    }

    // === CREATION ===

    pub fn add_consumer(&mut self, name: &str, age: u32) -> AgentId {
        let id = AgentId(ADDED_CONSUMER_BASE + self.consumers.len() as u32);
        let mut consumer = Consumer::new(id, name, age);
        calibrate_demand(&mut consumer, &self.catalog);
        self.consumers.push(consumer);
        id
    }

    pub fn add_laborer(&mut self, name: &str, age: u32, skill: f64, min_wage: f64) -> KernelResult<AgentId> {
        if !(0.0..=1.0).contains(&skill) {
            return Err(KernelError::OutOfRange {
                what: "skill",
                min: 0.0,
                max: 1.0,
            });
        }
        let id = AgentId(ADDED_LABORER_BASE + self.laborers.len() as u32);
        let mut consumer = Consumer::new(id, name, age);
        calibrate_demand(&mut consumer, &self.catalog);
        self.laborers.push(Laborer::new(consumer, skill, min_wage));
        Ok(id)
    }

    pub fn add_farmer(&mut self, name: &str, age: u32, land: f64, tech: f64) -> KernelResult<AgentId> {
        if !(0.0..=1.0).contains(&tech) {
            return Err(KernelError::OutOfRange {
                what: "tech level",
                min: 0.0,
                max: 1.0,
            });
        }
        let id = AgentId(ADDED_FARMER_BASE + self.farmers.len() as u32);
        let mut consumer = Consumer::new(id, name, age);
        calibrate_demand(&mut consumer, &self.catalog);
        self.farmers.push(Farmer::new(consumer, land, tech));
        Ok(id)
    }

    /// Add a Cobb-Douglas firm owned by an existing consumer.
    pub fn add_firm(&mut self, owner: AgentId, cash: f64, alpha: f64, beta: f64) -> KernelResult<()> {
        if !self.consumers.iter().any(|c| c.id == owner) {
            return Err(KernelError::NotFound {
                kind: "consumer",
                name: owner.to_string(),
            });
        }
        let mut firm = Firm::new(
            owner,
            cash,
            ProductionFn::CobbDouglas {
                alpha,
                beta,
                tech: 1.0,
            },
        );
        firm.recalculate_costs();
        self.firms.push(firm);
        Ok(())
    }

    // === MUTATION COMMANDS ===

    /// Overwrite the selected consumer's daily income, shifting their demand
    /// curves along the Engel rule immediately.
    pub fn set_selected_income(&mut self, value: f64) -> KernelResult<(f64, f64)> {
        if value < 0.0 {
            return Err(KernelError::NegativeIncome);
        }
        let id = self
            .selections
            .consumer
            .ok_or(KernelError::NoSelection("consumer"))?;
        let Self {
            catalog, consumers, ..
        } = self;
        let consumer = consumers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(KernelError::NoSelection("consumer"))?;
        let old = consumer.daily_income;
        let change = value - old;
        consumer.daily_income = value;
        consumer.sync_income();
        consumer.refresh_mu();
        consumer.shift_demand_for_income_change(change, catalog);
        Ok((old, value))
    }

    pub fn upgrade_selected_farmer(&mut self, level: f64) -> KernelResult<()> {
        if !(0.0..=1.0).contains(&level) {
            return Err(KernelError::OutOfRange {
                what: "tech level",
                min: 0.0,
                max: 1.0,
            });
        }
        let id = self
            .selections
            .farmer
            .ok_or(KernelError::NoSelection("farmer"))?;
        let Self {
            catalog, farmers, ..
        } = self;
        let farmer = farmers
            .iter_mut()
            .find(|f| f.consumer.id == id)
            .ok_or(KernelError::NoSelection("farmer"))?;
        farmer.upgrade_tech(level, catalog);
        Ok(())
    }

    pub fn tax_selected_farmer(&mut self, rate: f64) -> KernelResult<()> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(KernelError::OutOfRange {
                what: "tax rate",
                min: 0.0,
                max: 1.0,
            });
        }
        let id = self
            .selections
            .farmer
            .ok_or(KernelError::NoSelection("farmer"))?;
        let Self {
            catalog, farmers, ..
        } = self;
        let farmer = farmers
            .iter_mut()
            .find(|f| f.consumer.id == id)
            .ok_or(KernelError::NoSelection("farmer"))?;
        farmer.set_tax(rate, catalog);
        Ok(())
    }

    /// Hire a named laborer into the selected firm. Validates everything
    /// before touching the worker list, so a failure leaves no partial state.
    pub fn hire_into_selected_firm(&mut self, laborer_name: &str) -> KernelResult<()> {
        let laborer = self
            .find_laborer(laborer_name)
            .ok_or_else(|| KernelError::NotFound {
                kind: "laborer",
                name: laborer_name.to_string(),
            })?;
        let worker = Worker {
            id: laborer.consumer.id,
            name: laborer.consumer.name.clone(),
            skill: laborer.skill,
        };
        if self.is_employed(worker.id) {
            return Err(KernelError::AlreadyEmployed(worker.name));
        }
        let firm = self.selected_firm_mut().ok_or(KernelError::NoFirmOwned)?;
        firm.hire(worker);
        Ok(())
    }

    pub fn fire_from_selected_firm(&mut self, laborer_name: &str) -> KernelResult<()> {
        let firm = self.selected_firm_mut().ok_or(KernelError::NoFirmOwned)?;
        if !firm.fire_named(laborer_name) {
            return Err(KernelError::NotFound {
                kind: "worker",
                name: laborer_name.to_string(),
            });
        }
        Ok(())
    }

    pub fn add_capital_to_selected_firm(&mut self, rental: f64, efficiency: f64) -> KernelResult<()> {
        let firm = self.selected_firm_mut().ok_or(KernelError::NoFirmOwned)?;
        firm.add_capital(rental, efficiency);
        Ok(())
    }

    /// Overwrite the cached GDP aggregate (the `gdp = <value>` assignment).
    pub fn set_gdp(&mut self, value: f64) {
        self.stats.gdp = value;
    }

    // === LIFECYCLE ===

    pub fn kill_selected_consumer(&mut self) -> KernelResult<String> {
        let id = self
            .selections
            .consumer
            .ok_or(KernelError::NoSelection("consumer"))?;
        let index = self.consumers.iter().position(|c| c.id == id).ok_or(
            // A handle must never outlive its referent.
            KernelError::NoSelection("consumer"),
        )?;
        self.consumers[index].die();
        self.selections.forget_agent(id);
        let consumer = self.consumers.remove(index);
        tracing::info!(target: "world", id = id.0, name = %consumer.name, "consumer removed");
        Ok(consumer.name)
    }

    pub fn kill_selected_farmer(&mut self) -> KernelResult<String> {
        let id = self
            .selections
            .farmer
            .ok_or(KernelError::NoSelection("farmer"))?;
        let index = self
            .farmers
            .iter()
            .position(|f| f.consumer.id == id)
            .ok_or(KernelError::NoSelection("farmer"))?;
        self.farmers[index].die();
        self.selections.forget_agent(id);
        let farmer = self.farmers.remove(index);
        tracing::info!(target: "world", id = id.0, name = %farmer.consumer.name, "farmer removed");
        Ok(farmer.consumer.name)
    }

    pub fn kill_selected_laborer(&mut self) -> KernelResult<String> {
        let id = self
            .selections
            .laborer
            .ok_or(KernelError::NoSelection("laborer"))?;
        let index = self
            .laborers
            .iter()
            .position(|l| l.consumer.id == id)
            .ok_or(KernelError::NoSelection("laborer"))?;
        self.laborers[index].consumer.die();
        self.selections.forget_agent(id);
        let laborer = self.laborers.remove(index);
        tracing::info!(target: "world", id = id.0, name = %laborer.consumer.name, "laborer removed");
        Ok(laborer.consumer.name)
    }

    // === SIMULATION ===

    pub fn pass_day(&mut self) {
        crate::tick::run_day(self);
    }

    /// Fast-forward `n` days (1 ≤ n ≤ 365), reporting GDP and per-market
    /// price movement across the span.
    pub fn pass_days(&mut self, n: u32) -> KernelResult<DaySummary> {
        if !(1..=365).contains(&n) {
            return Err(KernelError::OutOfRange {
                what: "days",
                min: 1.0,
                max: 365.0,
            });
        }
        let gdp_before = self.stats.gdp;
        let prices_before = self.price_map();
        for _ in 0..n {
            self.pass_day();
        }
        let prices = self
            .markets
            .iter()
            .map(|m| {
                let before = prices_before.get(&m.product).copied().unwrap_or(0.0);
                (m.product, before, m.price)
            })
            .collect();
        Ok(DaySummary {
            days: n,
            gdp_before,
            gdp_after: self.stats.gdp,
            prices,
        })
    }
}

// === DEMAND CALIBRATION ===

/// Give an agent the default consumption basket, calibrated from income,
/// wealth, and a small per-agent taste shift. Staples go to everyone;
/// durables gate on wealth; jute skews to lower-wealth households.
fn calibrate_demand(consumer: &mut Consumer, catalog: &Catalog) {
    debug_assert!(catalog.len() > products::JUTE.0);

    let income = consumer.daily_income;
    let wealth = consumer.wealth();
    let taste = ((consumer.id.0 % 5) as f64 - 2.0) * 1.2;

    consumer.add_need(products::RICE, DemandLine::new(2.2, 95.0 + income * 0.050 + taste));
    consumer.add_need(products::CLOTH, DemandLine::new(2.0, 78.0 + income * 0.060 + taste));
    consumer.add_need(
        products::POTATO,
        DemandLine::new(2.5, (44.0 + income * 0.010 - wealth * 0.00008 + taste).max(26.0)),
    );
    consumer.add_need(products::BANANA, DemandLine::new(2.0, 37.0 + income * 0.030 + taste));
    consumer.add_need(products::CORN, DemandLine::new(2.2, 46.0 + income * 0.020 + taste));

    if wealth < 90_000.0 {
        consumer.add_need(products::JUTE, DemandLine::new(2.8, 50.0 + income * 0.015 + taste));
    }
    if wealth > 40_000.0 {
        consumer.add_need(products::STEEL, DemandLine::new(0.6, 42.0 + income * 0.012 + taste));
    }
    if wealth > 22_000.0 {
        consumer.add_need(
            products::PHONE,
            DemandLine::new(0.25, 68.0 + income * 0.010 + wealth * 0.00045 + taste),
        );
    }
    if wealth > 55_000.0 {
        consumer.add_need(
            products::COMPUTER,
            DemandLine::new(0.18, 105.0 + income * 0.020 + wealth * 0.00090 + taste),
        );
    }
    if wealth > 110_000.0 {
        consumer.add_need(
            products::CAR,
            DemandLine::new(0.05, 160.0 + income * 0.015 + wealth * 0.00050 + taste),
        );
    }
}

// === SEEDED ROSTER ===

impl World {
    /// The default world: ten markets, nine urban consumers, eight laborers,
    /// six farmers with their own crop portfolios, and six firms with seeded
    /// workforces. Seed 42 for reproducibility.
    pub fn standard() -> Self {
        let mut w = World::new(Catalog::standard(), DEFAULT_SEED);

        // Urban consumers: id block 11–19, wage references span garment
        // worker to manager.
        let consumers: [(u32, &str, u32, f64, f64); 9] = [
            (11, "Rahim", 28, 18_000.0, 420.0),
            (12, "Priom", 26, 55_000.0, 700.0),
            (13, "Rohan", 20, 9_000.0, 280.0),
            (14, "Rudaba", 24, 35_000.0, 580.0),
            (15, "Atef", 35, 90_000.0, 950.0),
            (16, "Siam", 22, 6_500.0, 310.0),
            (17, "Nahid", 30, 42_000.0, 640.0),
            (18, "Liam", 27, 28_000.0, 510.0),
            (19, "Somio", 32, 62_000.0, 780.0),
        ];
        for (id, name, age, savings, income) in consumers {
            w.consumers.push(
                Consumer::new(AgentId(id), name, age)
                    .with_savings(savings)
                    .with_income(income),
            );
        }

        // Daily-wage laborers: id block 31–38.
        let laborers: [(u32, &str, u32, f64, f64, f64, f64); 8] = [
            (31, "Kowshik", 25, 0.70, 400.0, 11_000.0, 480.0),
            (32, "Cauchy", 22, 0.50, 320.0, 7_000.0, 370.0),
            (33, "Mahin", 28, 0.80, 500.0, 13_000.0, 530.0),
            (34, "Shad", 23, 0.45, 300.0, 5_500.0, 340.0),
            (35, "Mahir", 30, 0.65, 420.0, 10_000.0, 460.0),
            (36, "Labib", 26, 0.55, 350.0, 8_000.0, 400.0),
            (37, "Jubair", 24, 0.40, 290.0, 4_500.0, 320.0),
            (38, "Nabil", 29, 0.75, 450.0, 12_000.0, 500.0),
        ];
        for (id, name, age, skill, min_wage, savings, income) in laborers {
            let consumer = Consumer::new(AgentId(id), name, age)
                .with_savings(savings)
                .with_income(income);
            w.laborers.push(Laborer::new(consumer, skill, min_wage));
        }

        // Farmers: id block 23–28, diverse scale and crop portfolios.
        {
            // Shafin - 5 ac, mixed rice + potato
            let consumer = Consumer::new(AgentId(23), "Shafin", 30)
                .with_savings(28_000.0)
                .with_income(450.0);
            let mut f = Farmer::new(consumer, 5.0, 0.60);
            f.tax = 0.05;
            f.weather = 0.70;
            f.add_crop(products::RICE, SupplyLine::new(0.25, 38.0), 50.0, 2.0, 120.0);
            f.add_crop(products::POTATO, SupplyLine::new(0.15, 22.0), 80.0, 4.0, 200.0);
            w.farmers.push(f);
        }
        {
            // Khalek - 3 ac, rice only, lower tech
            let consumer = Consumer::new(AgentId(24), "Khalek", 35)
                .with_savings(14_000.0)
                .with_income(300.0);
            let mut f = Farmer::new(consumer, 3.0, 0.40);
            f.tax = 0.05;
            f.weather = 0.70;
            f.add_crop(products::RICE, SupplyLine::new(0.28, 42.0), 45.0, 2.5, 80.0);
            w.farmers.push(f);
        }
        {
            // Sohan - 4 ac, corn + jute, moderate tech
            let consumer = Consumer::new(AgentId(25), "Sohan", 40)
                .with_savings(19_000.0)
                .with_income(380.0);
            let mut f = Farmer::new(consumer, 4.0, 0.50);
            f.tax = 0.06;
            f.weather = 0.65;
            f.add_crop(products::CORN, SupplyLine::new(0.20, 28.0), 60.0, 3.0, 150.0);
            f.add_crop(products::JUTE, SupplyLine::new(0.30, 35.0), 40.0, 3.5, 90.0);
            w.farmers.push(f);
        }
        {
            // Sadnan - 2 ac, banana + potato, small scale
            let consumer = Consumer::new(AgentId(26), "Sadnan", 29)
                .with_savings(9_000.0)
                .with_income(240.0);
            let mut f = Farmer::new(consumer, 2.0, 0.35);
            f.tax = 0.04;
            f.weather = 0.75;
            f.add_crop(products::BANANA, SupplyLine::new(0.12, 18.0), 90.0, 5.0, 180.0);
            f.add_crop(products::POTATO, SupplyLine::new(0.18, 24.0), 70.0, 4.5, 140.0);
            w.farmers.push(f);
        }
        {
            // Mahin - 8 ac, large rice + corn operation, high tech
            let consumer = Consumer::new(AgentId(27), "Mahin", 45)
                .with_savings(52_000.0)
                .with_income(620.0);
            let mut f = Farmer::new(consumer, 8.0, 0.75);
            f.tax = 0.07;
            f.weather = 0.60;
            f.add_crop(products::RICE, SupplyLine::new(0.22, 36.0), 55.0, 1.8, 200.0);
            f.add_crop(products::CORN, SupplyLine::new(0.18, 26.0), 65.0, 2.5, 180.0);
            w.farmers.push(f);
        }
        {
            // Sohag - 1.5 ac marginal farmer, potato only
            let consumer = Consumer::new(AgentId(28), "Sohag", 32)
                .with_savings(5_500.0)
                .with_income(190.0);
            let mut f = Farmer::new(consumer, 1.5, 0.25);
            f.tax = 0.03;
            f.weather = 0.80;
            f.add_crop(products::POTATO, SupplyLine::new(0.22, 28.0), 55.0, 5.5, 80.0);
            w.farmers.push(f);
        }

        // Firms, each seeded with workers so output starts non-zero.
        let worker = |w: &World, index: usize| {
            let l = &w.laborers[index];
            Worker {
                id: l.consumer.id,
                name: l.consumer.name.clone(),
                skill: l.skill,
            }
        };
        {
            // Rahim's garment firm - cloth, labour-intensive
            let mut f = Firm::new(
                AgentId(11),
                600_000.0,
                ProductionFn::CobbDouglas {
                    alpha: 0.6,
                    beta: 0.4,
                    tech: 1.2,
                },
            );
            f.products.push(products::CLOTH);
            f.wage = 430.0;
            f.fixed_overhead = 3500.0;
            f.workers.push(worker(&w, 0)); // Kowshik
            f.workers.push(worker(&w, 1)); // Cauchy
            f.capital.push(crate::firm::CapitalUnit {
                rental_rate: 800.0,
                efficiency: 1.5,
            });
            f.recalculate_costs();
            w.firms.push(f);
        }
        {
            // Rohan's garment firm - cloth, balanced exponents
            let mut f = Firm::new(
                AgentId(13),
                350_000.0,
                ProductionFn::CobbDouglas {
                    alpha: 0.5,
                    beta: 0.5,
                    tech: 1.5,
                },
            );
            f.products.push(products::CLOTH);
            f.wage = 410.0;
            f.fixed_overhead = 2500.0;
            f.workers.push(worker(&w, 3)); // Shad
            f.capital.push(crate::firm::CapitalUnit {
                rental_rate: 600.0,
                efficiency: 1.2,
            });
            f.recalculate_costs();
            w.firms.push(f);
        }
        {
            // Priom's electronics firm - computer, CES, high capital
            let mut f = Firm::new(AgentId(12), 1_800_000.0, ProductionFn::Ces { rho: 0.5 });
            f.products.push(products::COMPUTER);
            f.wage = 750.0;
            f.fixed_overhead = 9000.0;
            f.workers.push(worker(&w, 2)); // Mahin
            for _ in 0..2 {
                f.capital.push(crate::firm::CapitalUnit {
                    rental_rate: 2000.0,
                    efficiency: 2.0,
                });
            }
            f.recalculate_costs();
            w.firms.push(f);
        }
        {
            // Atef's textile firm - cloth, more workers
            let mut f = Firm::new(
                AgentId(15),
                950_000.0,
                ProductionFn::CobbDouglas {
                    alpha: 0.55,
                    beta: 0.45,
                    tech: 1.3,
                },
            );
            f.products.push(products::CLOTH);
            f.wage = 450.0;
            f.fixed_overhead = 4200.0;
            f.workers.push(worker(&w, 4)); // Mahir
            f.workers.push(worker(&w, 5)); // Labib
            f.capital.push(crate::firm::CapitalUnit {
                rental_rate: 900.0,
                efficiency: 1.6,
            });
            f.recalculate_costs();
            w.firms.push(f);
        }
        {
            // Somio's small food-processing firm - rice
            let mut f = Firm::new(
                AgentId(19),
                420_000.0,
                ProductionFn::CobbDouglas {
                    alpha: 0.65,
                    beta: 0.35,
                    tech: 1.1,
                },
            );
            f.products.push(products::RICE);
            f.wage = 380.0;
            f.fixed_overhead = 1800.0;
            f.workers.push(worker(&w, 6)); // Jubair
            f.capital.push(crate::firm::CapitalUnit {
                rental_rate: 500.0,
                efficiency: 1.0,
            });
            f.recalculate_costs();
            w.firms.push(f);
        }
        {
            // Nahid's phone assembly firm - phone, high-capital CES
            let mut f = Firm::new(AgentId(17), 1_200_000.0, ProductionFn::Ces { rho: 0.45 });
            f.products.push(products::PHONE);
            f.wage = 680.0;
            f.fixed_overhead = 5500.0;
            f.workers.push(worker(&w, 7)); // Nabil
            for _ in 0..2 {
                f.capital.push(crate::firm::CapitalUnit {
                    rental_rate: 1800.0,
                    efficiency: 1.8,
                });
            }
            f.recalculate_costs();
            w.firms.push(f);
        }

        // Agent curves, then initial market equilibria.
        let catalog = w.catalog.clone();
        for c in &mut w.consumers {
            calibrate_demand(c, &catalog);
        }
        for f in &mut w.farmers {
            calibrate_demand(&mut f.consumer, &catalog);
            f.refresh_supply_curves(&catalog);
        }
        for l in &mut w.laborers {
            calibrate_demand(&mut l.consumer, &catalog);
        }

        crate::tick::refresh_and_clear_markets(&mut w, true);

        // Default selections.
        w.selections.consumer = Some(w.consumers[0].id);
        w.selections.farmer = Some(w.farmers[0].consumer.id);
        w.selections.laborer = Some(w.laborers[0].consumer.id);
        w.selections.market = Some(w.markets[0].product);

        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_world_shape() {
        let w = World::standard();
        assert_eq!(w.consumers.len(), 9);
        assert_eq!(w.laborers.len(), 8);
        assert_eq!(w.farmers.len(), 6);
        assert_eq!(w.firms.len(), 6);
        assert_eq!(w.markets.len(), 10);
        assert_eq!(w.population(), 23);
    }

    #[test]
    fn default_selections_resolve() {
        let w = World::standard();
        assert_eq!(w.selected_consumer().unwrap().name, "Rahim");
        assert_eq!(w.selected_farmer().unwrap().consumer.name, "Shafin");
        assert_eq!(w.selected_laborer().unwrap().consumer.name, "Kowshik");
        assert_eq!(w.selected_market().unwrap().product, products::RICE);
        // Rahim owns the garment firm.
        assert_eq!(w.selected_firm().unwrap().owner, AgentId(11));
    }

    #[test]
    fn every_market_has_a_demand_side() {
        let w = World::standard();
        for market in &w.markets {
            assert!(
                !market.demand.is_trivial(),
                "no demand for {}",
                w.catalog.get(market.product).name
            );
        }
    }

    #[test]
    fn add_firm_requires_existing_owner() {
        let mut w = World::standard();
        assert!(w.add_firm(AgentId(999), 1000.0, 0.5, 0.5).is_err());
        let count = w.firms.len();
        w.add_firm(AgentId(12), 1000.0, 0.5, 0.5).unwrap();
        assert_eq!(w.firms.len(), count + 1);
    }

    #[test]
    fn kill_consumer_clears_selection_and_shrinks_population() {
        let mut w = World::standard();
        let before = w.population();
        let name = w.kill_selected_consumer().unwrap();
        assert_eq!(name, "Rahim");
        assert_eq!(w.population(), before - 1);
        assert!(w.selections.consumer.is_none());
        assert!(w.find_consumer("Rahim").is_none());
        // Ownership records survive the owner, mirroring the ledger model.
        assert!(w.firms.iter().any(|f| f.owner == AgentId(11)));
    }

    #[test]
    fn hire_validates_before_mutating() {
        let mut w = World::standard();
        // Kowshik is already employed by Rahim's firm.
        let err = w.hire_into_selected_firm("Kowshik").unwrap_err();
        assert!(matches!(err, KernelError::AlreadyEmployed(_)));

        let err = w.hire_into_selected_firm("Nobody").unwrap_err();
        assert!(matches!(err, KernelError::NotFound { .. }));
    }

    #[test]
    fn set_income_rejects_negative_and_shifts_demand() {
        let mut w = World::standard();
        assert!(w.set_selected_income(-5.0).is_err());

        let rice_before = w.selected_consumer().unwrap().demand[&products::RICE].c;
        let (old, new) = w.set_selected_income(800.0).unwrap();
        assert_eq!(old, 420.0);
        assert_eq!(new, 800.0);
        // Income rose and rice is a normal good.
        assert!(w.selected_consumer().unwrap().demand[&products::RICE].c > rice_before);
    }
}
