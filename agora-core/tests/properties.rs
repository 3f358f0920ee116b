//! Property-based tests for the simulation invariants.
//!
//! These verify that the economic logic holds regardless of the specific
//! parameterization: aggregation is a true horizontal sum, equilibria solve
//! the curves they came from, budgets bind, and same-seed runs are
//! bit-identical.

use std::collections::HashMap;

use agora_core::{
    AgentId, Catalog, Consumer, DayContext, DemandLine, Market, ProductId, ScaleRegime,
    SupplyLine, World, aggregate_demand, aggregate_supply,
};

const TOLERANCE: f64 = 1e-6;

// === FIXTURES ===

fn demand_set() -> Vec<DemandLine> {
    vec![
        DemandLine::new(2.0, 100.0),
        DemandLine::new(4.0, 80.0),
        DemandLine::new(1.5, 60.0),
        DemandLine::new(0.7, 45.0),
    ]
}

fn supply_set() -> Vec<SupplyLine> {
    vec![
        SupplyLine::new(1.0, 20.0),
        SupplyLine::new(0.5, 15.0),
        SupplyLine::new(2.5, 30.0),
    ]
}

fn market_with(demand: Vec<DemandLine>, supply: Vec<SupplyLine>) -> Market {
    let mut market = Market::new(ProductId(0));
    market.demand = aggregate_demand(demand);
    market.supply = aggregate_supply(supply);
    market
}

// === PROPERTY 1: AGGREGATION IDENTITY ===

#[test]
fn aggregate_demand_is_a_horizontal_sum() {
    let lines = demand_set();
    let agg = aggregate_demand(lines.clone());

    // At any price inside the envelope, the aggregate quantity equals the
    // sum of individual quantities.
    for price in [10.0, 25.0, 40.0, 55.0] {
        let individual: f64 = lines.iter().map(|l| l.quantity_at(price)).sum();
        let aggregated = agg.quantity_at(price);
        // The closed-form aggregate is exact only where every line is
        // active; stay below the smallest intercept.
        if lines.iter().all(|l| price < l.c) {
            assert!(
                (individual - aggregated).abs() < TOLERANCE,
                "price {price}: sum {individual} vs aggregate {aggregated}"
            );
        }
    }
}

#[test]
fn aggregation_identity_holds_at_equilibrium() {
    let demand = demand_set();
    let supply = supply_set();
    let market = market_with(demand.clone(), supply.clone());
    let eq = market.equilibrium();
    assert!(eq.quantity > 0.0);

    if demand.iter().all(|l| eq.price < l.c) {
        let sum_demand: f64 = demand.iter().map(|l| l.quantity_at(eq.price)).sum();
        assert!((sum_demand - eq.quantity).abs() < TOLERANCE);
    }
    if supply.iter().all(|l| eq.price > l.c) {
        let sum_supply: f64 = supply.iter().map(|l| l.quantity_at(eq.price)).sum();
        assert!((sum_supply - eq.quantity).abs() < TOLERANCE);
    }
}

// === PROPERTY 2: EQUILIBRIUM CORRECTNESS ===

#[test]
fn equilibrium_satisfies_both_curves() {
    let market = market_with(demand_set(), supply_set());
    let eq = market.equilibrium();
    assert!(eq.quantity > 0.0);

    let demand_price = market.demand.price_at(eq.quantity);
    let supply_price = market.supply.price_at(eq.quantity);
    assert!((demand_price - eq.price).abs() < TOLERANCE);
    assert!((supply_price - eq.price).abs() < TOLERANCE);
}

// === PROPERTY 3: BUDGET CONSTRAINT ===

#[test]
fn no_single_good_takes_more_than_the_budget_share() {
    let catalog = Catalog::standard();

    // One consumer per staple good, so per-good spend is observable.
    for (product, _descriptor) in catalog.iter().take(2) {
        for income in [100.0, 400.0, 1200.0] {
            let mut consumer = Consumer::new(AgentId(1), "Solo", 30)
                .with_savings(50_000.0)
                .with_income(income);
            consumer.add_need(product, DemandLine::new(2.0, 80.0));

            // Market price below the intercept keeps the cap binding.
            let prices: HashMap<ProductId, f64> = [(product, 60.0)].into();
            consumer.pass_day(&DayContext {
                gdp_per_capita: 500.0,
                prices: &prices,
                catalog: &catalog,
            });

            assert!(
                consumer.expenses <= 0.3 * income + TOLERANCE,
                "income {income}: spent {} on one good",
                consumer.expenses
            );
        }
    }
}

// === PROPERTY 4: DETERMINISM ===

#[test]
fn same_seed_same_commands_same_world() {
    let mut a = World::standard();
    let mut b = World::standard();

    for _ in 0..15 {
        a.pass_day();
        b.pass_day();

        assert_eq!(a.stats.gdp, b.stats.gdp);
        assert_eq!(a.stats.unemployment, b.stats.unemployment);
        assert_eq!(a.stats.money_supply, b.stats.money_supply);
        for (ma, mb) in a.markets.iter().zip(b.markets.iter()) {
            assert_eq!(ma.price, mb.price);
        }
        for (fa, fb) in a.farmers.iter().zip(b.farmers.iter()) {
            assert_eq!(fa.weather, fb.weather);
        }
    }
}

// === PROPERTY 5: TÂTONNEMENT MONOTONICITY ===

#[test]
fn adjustment_shrinks_or_flips_excess_demand() {
    for start_price in [5.0, 20.0, 33.0, 47.0, 60.0, 90.0] {
        let mut market = market_with(demand_set(), supply_set());
        market.price = start_price;
        let step = market.adjust_price();
        if step.excess_before == 0.0 {
            continue;
        }
        let shrunk = step.excess_after.abs() < step.excess_before.abs();
        let flipped = step.excess_after.signum() != step.excess_before.signum();
        assert!(
            shrunk || flipped,
            "price {start_price}: ED {} -> {}",
            step.excess_before,
            step.excess_after
        );
    }
}

// === PROPERTY 6: COST ORDERING ===

#[test]
fn average_cost_dominates_and_regimes_match() {
    let world = World::standard();
    for firm in &world.firms {
        let costs = firm.costs;
        assert!(costs.output > 0.0, "roster firms start producing");
        assert!(costs.average >= costs.average_fixed - TOLERANCE);
        assert!(costs.average >= costs.average_variable - TOLERANCE);

        let regime = firm.scale_regime();
        if costs.marginal < costs.average {
            assert_eq!(regime, ScaleRegime::EconomiesOfScale);
            assert_eq!(regime.to_string(), "economies of scale");
        } else {
            assert_eq!(regime, ScaleRegime::DiminishingReturns);
            assert_eq!(regime.to_string(), "diminishing returns");
        }
    }
}

// === PROPERTY 7: SHOCK DAMPING ===

#[test]
fn price_shock_strictly_damps_the_intercept() {
    let catalog = Catalog::standard();
    let rice = catalog.staple();

    for ratio in [1.21, 1.5, 2.0, 5.0] {
        let mut consumer = Consumer::new(AgentId(1), "Watcher", 30).with_income(400.0);
        consumer.add_need(rice, DemandLine::new(2.0, 90.0));
        consumer.observe_price(rice, 90.0 * ratio);
        let after = consumer.demand[&rice].c;
        assert!((after - 90.0 * 0.95).abs() < TOLERANCE, "ratio {ratio}");
        assert!(after < 90.0);
    }

    // At or below the threshold, nothing moves.
    let mut consumer = Consumer::new(AgentId(1), "Watcher", 30).with_income(400.0);
    consumer.add_need(rice, DemandLine::new(2.0, 90.0));
    consumer.observe_price(rice, 90.0 * 1.2);
    assert_eq!(consumer.demand[&rice].c, 90.0);
}

// === PROPERTY 8: KILL INVARIANT ===

#[test]
fn killed_consumer_leaves_no_dangling_state() {
    let mut world = World::standard();
    let id = world.selected_consumer().unwrap().id;
    let owned_before: Vec<AgentId> = world.firms.iter().map(|f| f.owner).collect();

    world.kill_selected_consumer().unwrap();

    assert!(world.consumers.iter().all(|c| c.id != id));
    assert!(world.selections.consumer.is_none());
    assert!(world.selected_consumer().is_none());
    assert!(world.selected_firm().is_none());
    // Ownership records are left as-is.
    let owned_after: Vec<AgentId> = world.firms.iter().map(|f| f.owner).collect();
    assert_eq!(owned_before, owned_after);

    // The world keeps ticking without the agent.
    world.pass_day();
    assert!(world.stats.gdp > 0.0);
}
