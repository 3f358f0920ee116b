//! The per-day phase sequence.
//!
//! One call to [`World::pass_day`] runs the phases below in a fixed order;
//! the ordering is observable (prices seen by agents, RNG draw order) and
//! must not change:
//!
//! 1. Markets aggregate and record their equilibrium price.
//! 2. Agents observe prices and run their day (consumers, then farmers, then
//!    laborers, each in insertion order).
//! 3. Markets re-aggregate and re-clear.
//! 4. Firms recompute costs and run the hire/fire/capital heuristic.
//! 5. Macro aggregates are computed.
//! 6. Every market takes one tâtonnement step.
//! 7. Incomes jitter and firm wages drift with the employment rate.
//! 8. Every seventh day, one market takes a demand shock.

use std::collections::HashSet;

use rand::Rng;

use crate::agents::DayContext;
use crate::firm::Worker;
use crate::types::AgentId;
use crate::world::World;

// === CONSTANTS ===

/// Physical units of output represented by one unit of the production
/// function, used when converting marginal product into revenue.
const FIRM_OUTPUT_SCALE: f64 = 80.0;
/// Hire when a marginal worker returns more than this multiple of the wage.
const HIRE_MARGIN: f64 = 1.05;
/// Fire when the return falls below this multiple.
const FIRE_MARGIN: f64 = 0.80;
const MAX_WORKERS: usize = 8;
/// One-in-N chance per firm per day of considering a capital purchase.
const CAPITAL_ROLL: u32 = 20;

const INCOME_JITTER_SPAN: f64 = 0.04;
const INCOME_FLOOR: f64 = 50.0;
const WAGE_JITTER_SPAN: f64 = 0.03;
const WAGE_FLOOR: f64 = 250.0;

/// Wage drift factors by employment-rate band.
const WAGE_TREND_TIGHT: f64 = 1.012;
const WAGE_TREND_NORMAL: f64 = 1.003;
const WAGE_TREND_SLACK: f64 = 0.994;

const DEMAND_SHOCK_PERIOD: u64 = 7;
const DEMAND_SHOCK_SPAN: f64 = 0.05;
const DEMAND_SHOCK_FLOOR: f64 = 1.0;

// === DAY ORCHESTRATION ===

pub(crate) fn run_day(world: &mut World) {
    world.day += 1;

    // GDP per capita from the previous day's aggregates; day one sees zero.
    let gdp_per_capita = world.stats.gdp / world.population().max(1) as f64;

    // 1. Pre-price clearing, with history.
    refresh_and_clear_markets(world, true);

    // 2. Agent day.
    run_agent_day(world, gdp_per_capita);

    // 3. Post-agent clearing.
    refresh_and_clear_markets(world, false);

    // 4. Firm cost pass and input-mix heuristic.
    for firm in world.firms.iter_mut() {
        firm.recalculate_costs();
    }
    optimize_firms(world);

    // 5. Macro aggregates.
    compute_stats(world);

    // 6. Walrasian tâtonnement.
    for market in world.markets.iter_mut() {
        market.adjust_price();
    }

    // 7. Income jitter and wage drift.
    apply_income_jitter(world);

    // 8. Periodic demand shock.
    if world.day % DEMAND_SHOCK_PERIOD == 0 {
        apply_demand_shock(world);
    }
}

/// Re-aggregate every market from current agent state and adopt the
/// equilibrium price where the non-trivial-curve guard allows.
pub(crate) fn refresh_and_clear_markets(world: &mut World, record_history: bool) {
    let World {
        consumers,
        laborers,
        farmers,
        firms,
        markets,
        ..
    } = world;
    for market in markets.iter_mut() {
        market.refresh_aggregates(consumers, laborers, farmers, firms);
        market.clear();
        if record_history {
            market.record_history();
        }
    }
}

/// Phase 2: every household observes the new prices (damping its reservation
/// price on shocks) and then runs its daily update. Consumers first, then
/// farmers (whose update also redraws weather), then laborers.
fn run_agent_day(world: &mut World, gdp_per_capita: f64) {
    let prices = world.price_map();
    let World {
        catalog,
        consumers,
        farmers,
        laborers,
        rng,
        ..
    } = world;
    let ctx = DayContext {
        gdp_per_capita,
        prices: &prices,
        catalog: &*catalog,
    };

    for consumer in consumers.iter_mut() {
        for i in 0..consumer.needs.len() {
            let product = consumer.needs[i];
            if let Some(&price) = prices.get(&product) {
                consumer.observe_price(product, price);
            }
        }
        consumer.pass_day(&ctx);
    }

    for farmer in farmers.iter_mut() {
        for i in 0..farmer.consumer.needs.len() {
            let product = farmer.consumer.needs[i];
            if let Some(&price) = prices.get(&product) {
                farmer.consumer.observe_price(product, price);
            }
        }
        farmer.pass_day(&ctx, rng);
    }

    for laborer in laborers.iter_mut() {
        for i in 0..laborer.consumer.needs.len() {
            let product = laborer.consumer.needs[i];
            if let Some(&price) = prices.get(&product) {
                laborer.consumer.observe_price(product, price);
            }
        }
        laborer.consumer.pass_day(&ctx);
    }
}

/// Phase 4: per-firm hire/fire/capital heuristic against the best market
/// price among the firm's products.
fn optimize_firms(world: &mut World) {
    let World {
        firms,
        markets,
        laborers,
        rng,
        day,
        ..
    } = world;

    let mut employed: HashSet<AgentId> = firms
        .iter()
        .flat_map(|f| f.workers.iter().map(|w| w.id))
        .collect();

    for firm in firms.iter_mut() {
        let mut market_price: f64 = 0.0;
        for market in markets.iter() {
            if firm.produces(market.product) {
                market_price = market_price.max(market.price);
            }
        }
        if market_price < 1.0 {
            continue;
        }

        let revenue_per_worker =
            firm.marginal_product_of_labor() * FIRM_OUTPUT_SCALE * market_price;
        let should_hire =
            revenue_per_worker > firm.wage * HIRE_MARGIN && firm.workers.len() < MAX_WORKERS;
        let should_fire = revenue_per_worker < firm.wage * FIRE_MARGIN && firm.workers.len() > 1;

        if should_hire {
            // Highest-skill unemployed laborer whose reservation wage fits;
            // ties go to the earliest-listed.
            let mut best: Option<&crate::agents::Laborer> = None;
            for laborer in laborers.iter() {
                if laborer.min_wage > firm.wage || employed.contains(&laborer.consumer.id) {
                    continue;
                }
                if best.is_none_or(|b| laborer.skill > b.skill) {
                    best = Some(laborer);
                }
            }
            if let Some(laborer) = best {
                employed.insert(laborer.consumer.id);
                tracing::info!(
                    target: "firm",
                    day = *day,
                    owner = firm.owner.0,
                    worker = %laborer.consumer.name,
                    revenue_per_worker,
                    "hire"
                );
                firm.hire(Worker {
                    id: laborer.consumer.id,
                    name: laborer.consumer.name.clone(),
                    skill: laborer.skill,
                });
            }
        } else if should_fire {
            if let Some(worker) = firm.fire_last() {
                employed.remove(&worker.id);
                tracing::info!(
                    target: "firm",
                    day = *day,
                    owner = firm.owner.0,
                    worker = %worker.name,
                    revenue_per_worker,
                    "fire"
                );
            }
        }

        // Occasional capital purchase when the marginal machine beats half
        // the average cost. The roll is drawn every tick to keep the RNG
        // stream stable.
        let roll = rng.random_range(0..CAPITAL_ROLL) == 0;
        if roll
            && firm.marginal_product_of_capital() * FIRM_OUTPUT_SCALE * market_price
                > firm.costs.average * 0.5
        {
            let rental = firm.wage * 1.8 + rng.random_range(0.0..200.0);
            let efficiency = 1.0 + rng.random_range(0.0..1.0);
            firm.add_capital(rental, efficiency);
            tracing::info!(
                target: "firm",
                day = *day,
                owner = firm.owner.0,
                rental,
                efficiency,
                "capital added"
            );
        }
    }
}

/// Phase 5: GDP over market equilibria, employment, unemployment, money
/// supply, population.
fn compute_stats(world: &mut World) {
    let gdp: f64 = world
        .markets
        .iter()
        .map(|m| {
            let eq = m.equilibrium();
            eq.price * eq.quantity
        })
        .sum();

    let employed: usize = world.firms.iter().map(|f| f.workers.len()).sum();
    let labor_force = world.laborers.len();
    let unemployment = if labor_force > 0 {
        ((labor_force as f64 - employed as f64) / labor_force as f64).max(0.0)
    } else {
        0.0
    };

    let money_supply: f64 = world.consumers.iter().map(|c| c.savings).sum::<f64>()
        + world
            .farmers
            .iter()
            .map(|f| f.consumer.savings)
            .sum::<f64>()
        + world
            .laborers
            .iter()
            .map(|l| l.consumer.savings)
            .sum::<f64>()
        + world.firms.iter().map(|f| f.cash).sum::<f64>();

    world.stats = crate::world::Stats {
        gdp,
        unemployment,
        employed,
        population: world.population(),
        money_supply,
        firms: world.firms.len(),
    };

    tracing::debug!(
        target: "stats",
        day = world.day,
        gdp,
        unemployment,
        employed,
        money_supply,
        "aggregates"
    );
}

/// Phase 7: every agent's income jitters a few percent (consumers, then
/// laborers, then farmers - the RNG draw order is part of the contract),
/// then firm wages drift with labor-market tightness.
fn apply_income_jitter(world: &mut World) {
    let World {
        consumers,
        laborers,
        farmers,
        firms,
        rng,
        stats,
        ..
    } = world;

    let mut jitter = |income: &mut f64| {
        let delta = rng.random_range(-INCOME_JITTER_SPAN..INCOME_JITTER_SPAN);
        *income = (*income * (1.0 + delta)).max(INCOME_FLOOR);
    };
    for consumer in consumers.iter_mut() {
        jitter(&mut consumer.daily_income);
    }
    for laborer in laborers.iter_mut() {
        jitter(&mut laborer.consumer.daily_income);
    }
    for farmer in farmers.iter_mut() {
        jitter(&mut farmer.consumer.daily_income);
    }

    let labor_force = laborers.len() as f64;
    let employment_rate = if labor_force > 0.0 {
        stats.employed as f64 / labor_force
    } else {
        0.5
    };
    let wage_trend = if employment_rate > 0.80 {
        WAGE_TREND_TIGHT
    } else if employment_rate > 0.55 {
        WAGE_TREND_NORMAL
    } else {
        WAGE_TREND_SLACK
    };

    for firm in firms.iter_mut() {
        let delta = rng.random_range(-WAGE_JITTER_SPAN..WAGE_JITTER_SPAN);
        firm.wage = (firm.wage * wage_trend * (1.0 + delta)).max(WAGE_FLOOR);
        firm.recalculate_costs();
    }
}

/// Phase 8: pick one market uniformly at random and shift every agent's
/// demand intercept for that product by a few percent - taste change,
/// season, news. Market choice and factor are the tick's last draws.
fn apply_demand_shock(world: &mut World) {
    let World {
        consumers,
        laborers,
        farmers,
        markets,
        rng,
        day,
        ..
    } = world;
    if markets.is_empty() {
        return;
    }

    let index = rng.random_range(0..markets.len());
    let product = markets[index].product;
    let factor = 1.0 + rng.random_range(-DEMAND_SHOCK_SPAN..DEMAND_SHOCK_SPAN);

    tracing::info!(target: "shock", day = *day, product = product.0, factor, "demand shock");

    for consumer in consumers.iter_mut() {
        if let Some(line) = consumer.demand.get_mut(&product) {
            line.c = (line.c * factor).max(DEMAND_SHOCK_FLOOR);
        }
    }
    for farmer in farmers.iter_mut() {
        if let Some(line) = farmer.consumer.demand.get_mut(&product) {
            line.c = (line.c * factor).max(DEMAND_SHOCK_FLOOR);
        }
    }
    for laborer in laborers.iter_mut() {
        if let Some(line) = laborer.consumer.demand.get_mut(&product) {
            line.c = (line.c * factor).max(DEMAND_SHOCK_FLOOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_day_advances_the_counter_and_stats() {
        let mut world = World::standard();
        assert_eq!(world.day, 0);
        world.pass_day();
        assert_eq!(world.day, 1);
        assert!(world.stats.gdp > 0.0);
        assert!(world.stats.population > 0);
        assert!(world.stats.money_supply > 0.0);
    }

    #[test]
    fn employment_never_exceeds_the_labor_force() {
        let mut world = World::standard();
        for _ in 0..20 {
            world.pass_day();
            assert!(world.stats.employed <= world.laborers.len());
            assert!((0.0..=1.0).contains(&world.stats.unemployment));
        }
    }

    #[test]
    fn history_grows_once_per_day() {
        let mut world = World::standard();
        let initial = world.markets[0].history.len();
        world.pass_day();
        world.pass_day();
        assert_eq!(world.markets[0].history.len(), initial + 2);
    }

    #[test]
    fn agent_consumption_runs_every_day() {
        let mut world = World::standard();
        let age_before = world.consumers[0].age_days;
        world.pass_day();
        assert_eq!(world.consumers[0].age_days, age_before + 1);
        assert!(world.consumers[0].expenses > 0.0);
    }
}
