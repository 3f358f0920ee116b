//! Concrete numeric scenarios with literal inputs and pinned outputs.

use agora_core::{
    AgentId, Catalog, Consumer, DemandLine, Farmer, Firm, Market, PRICE_FLOOR, ProductId,
    ProductionFn, SupplyLine, World, aggregate_demand, products,
};

const TOLERANCE: f64 = 0.01;

// === S1: SINGLE-CURVE EQUILIBRIUM ===

#[test]
fn s1_one_consumer_one_farmer() {
    let mut market = Market::new(ProductId(0));
    market.demand = DemandLine::new(2.0, 100.0);
    market.supply = SupplyLine::new(1.0, 20.0);

    let eq = market.equilibrium();
    assert!((eq.price - 46.67).abs() < TOLERANCE);
    assert!((eq.quantity - 26.67).abs() < TOLERANCE);
}

// === S2: TWO-CONSUMER AGGREGATION ===

#[test]
fn s2_two_consumer_aggregation() {
    let agg = aggregate_demand([DemandLine::new(2.0, 100.0), DemandLine::new(4.0, 80.0)]);
    // S_m = 1/2 + 1/4 = 0.75, S_c = 50 + 20 = 70
    assert!((agg.c - 93.33).abs() < TOLERANCE);
    assert!((agg.m - 1.333).abs() < 0.001);
}

// === S3: FARMER SUPPLY CURVE DERIVATION ===

#[test]
fn s3_supply_curve_from_farm_parameters() {
    let catalog = Catalog::standard();
    let consumer = Consumer::new(AgentId(1), "Casek", 40)
        .with_savings(20_000.0)
        .with_income(400.0);
    let mut farmer = Farmer::new(consumer, 5.0, 0.6);
    farmer.tax = 0.05;
    farmer.weather = 0.70;
    farmer.add_crop(products::RICE, SupplyLine::new(0.22, 37.0), 50.0, 2.0, 120.0);
    farmer.refresh_supply_curves(&catalog);

    // c = max(8, 37 − 8·0.6 + 0 + 0 + 30·0.05) = 33.7
    // m = 0.22 + 0.18/5 + 0.06·(1 − 0.6) = 0.28
    let line = farmer.supply[&products::RICE];
    assert!((line.c - 33.7).abs() < TOLERANCE);
    assert!((line.m - 0.28).abs() < TOLERANCE);
}

// === S4: FIRM COST PANEL ===

#[test]
fn s4_cobb_douglas_cost_panel() {
    let mut firm = Firm::new(
        AgentId(1),
        600_000.0,
        ProductionFn::CobbDouglas {
            alpha: 0.6,
            beta: 0.4,
            tech: 1.2,
        },
    );
    firm.wage = 430.0;
    firm.fixed_overhead = 3500.0;
    firm.workers.push(agora_core::Worker {
        id: AgentId(31),
        name: "W1".into(),
        skill: 0.7,
    });
    firm.workers.push(agora_core::Worker {
        id: AgentId(32),
        name: "W2".into(),
        skill: 0.5,
    });
    firm.capital.push(agora_core::CapitalUnit {
        rental_rate: 800.0,
        efficiency: 1.5,
    });
    firm.recalculate_costs();

    // Q = 1.2·2^0.6·1^0.4 ≈ 1.8189
    assert!((firm.costs.output - 1.2 * 2f64.powf(0.6)).abs() < 1e-9);
    assert!((firm.costs.output - 1.8189).abs() < 0.001);
    assert!((firm.costs.total_fixed - 4300.0).abs() < TOLERANCE);
    assert!((firm.costs.total_variable - 860.0).abs() < TOLERANCE);
    assert!((firm.costs.total - 5160.0).abs() < TOLERANCE);
    assert!((firm.costs.average - 5160.0 / firm.costs.output).abs() < TOLERANCE);

    // MPL = 1.2·(3^0.6 − 2^0.6) ≈ 0.5010, MC = 430/MPL ≈ 858.3
    let mpl = firm.marginal_product_of_labor();
    assert!((mpl - 1.2 * (3f64.powf(0.6) - 2f64.powf(0.6))).abs() < 1e-9);
    assert!((firm.costs.marginal - 430.0 / mpl).abs() < 1e-9);
}

// === S5: THIRTY DAYS OF THE DEFAULT WORLD ===

#[test]
fn s5_thirty_days_stay_sane() {
    let mut world = World::standard();
    for _ in 0..30 {
        world.pass_day();
    }

    assert!(world.stats.gdp > 0.0);
    assert!((0.0..=1.0).contains(&world.stats.unemployment));
    for market in &world.markets {
        assert!(
            market.price > PRICE_FLOOR,
            "{} stuck at the floor",
            world.catalog.get(market.product).name
        );
    }
}

// === S6: KILL THEN STATUS ===

#[test]
fn s6_kill_consumer_then_status() {
    let mut world = World::standard();
    world.pass_day();
    let population_before = world.stats.population;

    world.kill_selected_consumer().unwrap();
    world.pass_day();

    assert_eq!(world.stats.population, population_before - 1);
    assert!(world.selections.consumer.is_none());
    assert!(world.selected_firm().is_none());
}
