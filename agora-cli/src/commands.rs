//! Command dispatch: maps parsed shell input onto kernel operations and
//! renders the results as plain text.

use agora_core::{FactorMix, KernelError, World};
use anyhow::{Result, anyhow, bail};

use crate::parser::{Arg, Input};

pub enum Outcome {
    Continue,
    Exit,
}

// === ARGUMENT RESOLUTION ===

/// Resolves declared parameters against positional-or-keyword arguments.
struct Args<'a> {
    command: &'static str,
    params: &'static [&'static str],
    args: &'a [Arg],
}

impl<'a> Args<'a> {
    fn new(command: &'static str, params: &'static [&'static str], args: &'a [Arg]) -> Result<Self> {
        if args.len() > params.len() {
            bail!("too many arguments for {command}({})", params.join(", "));
        }
        for arg in args {
            if let Some(key) = &arg.key {
                if !params.contains(&key.as_str()) {
                    bail!("unknown keyword '{key}' for {command}({})", params.join(", "));
                }
            }
        }
        Ok(Self {
            command,
            params,
            args,
        })
    }

    fn get(&self, key: &str) -> Option<&str> {
        if let Some(arg) = self.args.iter().find(|a| a.key.as_deref() == Some(key)) {
            return Some(&arg.value);
        }
        let index = self.params.iter().position(|p| *p == key)?;
        let arg = self.args.get(index)?;
        if arg.key.is_some() {
            return None;
        }
        Some(&arg.value)
    }

    fn str(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| {
            anyhow!(
                "missing argument - usage: {}({})",
                self.command,
                self.params.join(", ")
            )
        })
    }

    fn f64(&self, key: &str) -> Result<f64> {
        self.str(key)?
            .parse()
            .map_err(|_| anyhow!("{key} must be a number"))
    }

    fn u32(&self, key: &str) -> Result<u32> {
        self.str(key)?
            .parse()
            .map_err(|_| anyhow!("{key} must be a whole number"))
    }

    fn opt_u32(&self, key: &str) -> Result<Option<u32>> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v
                .parse()
                .map(Some)
                .map_err(|_| anyhow!("{key} must be a whole number")),
        }
    }
}

// === RENDERING HELPERS ===

fn header(title: &str) {
    println!("\n== {title} ==");
}

fn kv(key: &str, value: impl std::fmt::Display) {
    println!("  {key:<22}{value}");
}

fn money(x: f64) -> String {
    format!("Tk {x:.2}")
}

// === DISPATCH ===

pub fn dispatch(world: &mut World, input: Input) -> Result<Outcome> {
    match input {
        Input::Empty => Ok(Outcome::Continue),
        Input::Property { object, property } => {
            query_property(world, &object, &property)?;
            Ok(Outcome::Continue)
        }
        Input::Assignment { target, value } => {
            assign(world, &target, &value)?;
            Ok(Outcome::Continue)
        }
        Input::Command { name, args } => run_command(world, &name, &args),
    }
}

fn run_command(world: &mut World, name: &str, args: &[Arg]) -> Result<Outcome> {
    match name {
        // Listing
        "consumers" => list_consumers(world),
        "laborers" => list_laborers(world),
        "farmers" => list_farmers(world),
        "firms" => list_firms(world),
        "markets" => list_markets(world),
        "products" => list_products(world),

        // Creation
        "add_consumer" => {
            let a = Args::new("add_consumer", &["name", "age"], args)?;
            let name = a.str("name")?.to_string();
            let age = a.u32("age")?;
            let id = world.add_consumer(&name, age);
            println!("Consumer added: {name} ({id})");
        }
        "add_laborer" => {
            let a = Args::new("add_laborer", &["name", "age", "skill", "min_wage"], args)?;
            let name = a.str("name")?.to_string();
            let (age, skill, min_wage) = (a.u32("age")?, a.f64("skill")?, a.f64("min_wage")?);
            let id = world.add_laborer(&name, age, skill, min_wage)?;
            println!("Laborer added: {name} ({id}), skill {:.0}%", skill * 100.0);
        }
        "add_farmer" => {
            let a = Args::new("add_farmer", &["name", "age", "land", "tech"], args)?;
            let name = a.str("name")?.to_string();
            let (age, land, tech) = (a.u32("age")?, a.f64("land")?, a.f64("tech")?);
            let id = world.add_farmer(&name, age, land, tech)?;
            println!("Farmer added: {name} ({id}), {land:.1} acres");
        }
        "add_firm" => {
            let a = Args::new("add_firm", &["owner_id", "cash", "alpha", "beta"], args)?;
            let owner = agora_core::AgentId(a.u32("owner_id")?);
            let (cash, alpha, beta) = (a.f64("cash")?, a.f64("alpha")?, a.f64("beta")?);
            world.add_firm(owner, cash, alpha, beta)?;
            println!("Firm added: owner {owner}, alpha {alpha:.2}, beta {beta:.2}");
        }

        // Selection
        "select_consumer" => {
            let a = Args::new("select_consumer", &["name"], args)?;
            let name = a.str("name")?;
            world.select_consumer(name)?;
            println!("Selected consumer: {name}");
        }
        "select_laborer" => {
            let a = Args::new("select_laborer", &["name"], args)?;
            let name = a.str("name")?;
            world.select_laborer(name)?;
            println!("Selected laborer: {name}");
        }
        "select_farmer" => {
            let a = Args::new("select_farmer", &["name"], args)?;
            let name = a.str("name")?;
            world.select_farmer(name)?;
            println!("Selected farmer: {name}");
        }
        "select_market" => {
            let a = Args::new("select_market", &["product"], args)?;
            let name = a.str("product")?;
            world.select_market(name)?;
            println!("Selected market: {name}");
        }
        "clear_selection" => {
            world.selections.clear();
            println!("All selections cleared");
        }

        // Consumer inspection
        "consumer_details" => consumer_details(world)?,
        "consumer_mu" => consumer_mu(world, args)?,
        "consumer_surplus" => consumer_surplus(world, args)?,
        "consumer_substitution" => consumer_substitution(world)?,
        "consumer_needs" => consumer_needs(world)?,
        "consumer_demand_curve" => consumer_demand_curve(world, args)?,

        // Farmer inspection & mutation
        "farmer_details" => farmer_details(world)?,
        "farmer_supply" => farmer_supply(world, args)?,
        "farmer_crops" => farmer_crops(world)?,
        "farmer_weather" => farmer_weather(world)?,
        "farmer_supply_curve" => farmer_supply_curve(world, args)?,
        "farmer_upgrade" => {
            let a = Args::new("farmer_upgrade", &["level"], args)?;
            let level = a.f64("level")?;
            world.upgrade_selected_farmer(level)?;
            println!("Tech upgraded to {:.0}%; supply curves recomputed", level * 100.0);
        }
        "farmer_tax" => {
            let a = Args::new("farmer_tax", &["rate"], args)?;
            let rate = a.f64("rate")?;
            world.tax_selected_farmer(rate)?;
            println!("Tax set to {:.1}%; supply curves recomputed", rate * 100.0);
        }

        // Laborer inspection
        "laborer_details" => laborer_details(world)?,

        // Firm inspection & mutation
        "firm_details" => firm_details(world)?,
        "firm_costs" => firm_costs(world)?,
        "firm_output" => firm_output(world)?,
        "firm_mp" => firm_mp(world)?,
        "firm_efficiency" => firm_efficiency(world)?,
        "firm_hire" => {
            let a = Args::new("firm_hire", &["laborer"], args)?;
            let name = a.str("laborer")?.to_string();
            world.hire_into_selected_firm(&name)?;
            println!("Hired {name}");
        }
        "firm_fire" => {
            let a = Args::new("firm_fire", &["laborer"], args)?;
            let name = a.str("laborer")?.to_string();
            world.fire_from_selected_firm(&name)?;
            println!("Fired {name}");
        }
        "firm_capital" => {
            let a = Args::new("firm_capital", &["rental", "efficiency"], args)?;
            let (rental, efficiency) = (a.f64("rental")?, a.f64("efficiency")?);
            world.add_capital_to_selected_firm(rental, efficiency)?;
            println!("Capital added: rental {}, efficiency {efficiency:.2}", money(rental));
        }

        // Consumer mutation
        "set_income" => {
            let a = Args::new("set_income", &["value"], args)?;
            let value = a.f64("value")?;
            let (old, new) = world.set_selected_income(value)?;
            println!("Daily income: {} -> {}", money(old), money(new));
        }
        "kill_consumer" => {
            let name = world.kill_selected_consumer()?;
            println!("{name} was removed from the simulation");
        }
        "kill_farmer" => {
            let name = world.kill_selected_farmer()?;
            println!("{name} was removed from the simulation");
        }
        "kill_laborer" => {
            let name = world.kill_selected_laborer()?;
            println!("{name} was removed from the simulation");
        }

        // Market inspection
        "market_details" => market_details(world)?,
        "market_history" => market_history(world)?,

        // Simulation
        "pass_day" => {
            let a = Args::new("pass_day", &["n"], args)?;
            let n = a.opt_u32("n")?.unwrap_or(1);
            pass_day(world, n)?;
        }
        "status" => status(world),

        "help" => help(),
        "exit" | "quit" => return Ok(Outcome::Exit),

        other => bail!("unknown command: {other} (try 'help')"),
    }
    Ok(Outcome::Continue)
}

// === LISTING ===

fn list_consumers(world: &World) {
    header(&format!("CONSUMERS ({})", world.consumers.len()));
    for c in &world.consumers {
        println!(
            "  {:<4} {:<10} age {:<3} savings {:<14} income {}/day",
            c.id,
            c.name,
            c.age_days / 365,
            money(c.savings),
            money(c.daily_income)
        );
    }
}

fn list_laborers(world: &World) {
    header(&format!("LABORERS ({})", world.laborers.len()));
    for l in &world.laborers {
        let employed = if world.is_employed(l.consumer.id) {
            "employed"
        } else {
            "unemployed"
        };
        println!(
            "  {:<4} {:<10} skill {:>3.0}% min wage {:<10} {}",
            l.consumer.id,
            l.consumer.name,
            l.skill * 100.0,
            money(l.min_wage),
            employed
        );
    }
}

fn list_farmers(world: &World) {
    header(&format!("FARMERS ({})", world.farmers.len()));
    for f in &world.farmers {
        let crops: Vec<&str> = f
            .crops
            .iter()
            .map(|&c| world.catalog.get(c).name.as_str())
            .collect();
        println!(
            "  {:<4} {:<10} {:>4.1} ac  tech {:>3.0}%  tax {:>4.1}%  crops: {}",
            f.consumer.id,
            f.consumer.name,
            f.land,
            f.tech * 100.0,
            f.tax * 100.0,
            crops.join(", ")
        );
    }
}

fn list_firms(world: &World) {
    header(&format!("FIRMS ({})", world.firms.len()));
    for f in &world.firms {
        let products: Vec<&str> = f
            .products
            .iter()
            .map(|&p| world.catalog.get(p).name.as_str())
            .collect();
        println!(
            "  owner {:<4} cash {:<16} workers {:<2} capital {:<2} wage {:<10} makes: {}",
            f.owner,
            money(f.cash),
            f.workers.len(),
            f.capital.len(),
            money(f.wage),
            products.join(", ")
        );
    }
}

fn list_markets(world: &World) {
    header(&format!("MARKETS ({})", world.markets.len()));
    for m in &world.markets {
        println!(
            "  {:<12} P {:<12} D: p = {:.2} - {:.3}Q   S: p = {:.2} + {:.3}Q",
            world.catalog.get(m.product).name,
            money(m.price),
            m.demand.c,
            m.demand.m,
            m.supply.c,
            m.supply.m
        );
    }
}

fn list_products(world: &World) {
    header(&format!("PRODUCTS ({})", world.catalog.len()));
    for (_, p) in world.catalog.iter() {
        println!(
            "  {:<12} decay {:<6.3} eta {:<6.2} base {:.3} units/day",
            p.name, p.decay_rate, p.eta, p.base_consumption
        );
    }
}

// === CONSUMER INSPECTION ===

fn selected_consumer(world: &World) -> Result<&agora_core::Consumer> {
    Ok(world
        .selected_consumer()
        .ok_or(KernelError::NoSelection("consumer"))?)
}

fn resolve_product(world: &World, name: &str) -> Result<agora_core::ProductId> {
    world.catalog.find(name).ok_or_else(|| {
        KernelError::NotFound {
            kind: "product",
            name: name.to_string(),
        }
        .into()
    })
}

fn consumer_details(world: &World) -> Result<()> {
    let c = selected_consumer(world)?;
    header(&format!("CONSUMER: {}", c.name));
    kv("Age", format!("{} years", c.age_days / 365));
    kv("Savings", money(c.savings));
    kv("Daily income", money(c.daily_income));
    kv("Last expenses", money(c.expenses));
    kv("MU per Tk", format!("{:.7}", c.mu_per_unit));
    println!("  Consumption:");
    for &need in &c.needs {
        kv(
            &format!("  {}", world.catalog.get(need).name),
            format!("{:.2} units", c.consumed[&need]),
        );
    }
    Ok(())
}

fn consumer_mu(world: &World, args: &[Arg]) -> Result<()> {
    let a = Args::new("consumer_mu", &["product"], args)?;
    let product = resolve_product(world, a.str("product")?)?;
    let c = selected_consumer(world)?;
    let wtp = c
        .willingness_to_pay(product)
        .ok_or_else(|| anyhow!("{} does not demand {}", c.name, world.catalog.get(product).name))?;
    header(&format!("MARGINAL UTILITY: {} -> {}", c.name, world.catalog.get(product).name));
    kv("MU per Tk", format!("{:.7}  (= 1 / wealth)", c.mu_per_unit));
    kv("Willingness to pay", money(wtp));
    kv("Marginal utility", format!("{:.7}", c.marginal_utility(product).unwrap_or(0.0)));
    Ok(())
}

fn consumer_surplus(world: &World, args: &[Arg]) -> Result<()> {
    let a = Args::new("consumer_surplus", &["product"], args)?;
    let product = resolve_product(world, a.str("product")?)?;
    let c = selected_consumer(world)?;
    let market = world
        .market_for(product)
        .ok_or_else(|| anyhow!("no market for {}", world.catalog.get(product).name))?;
    let surplus = c
        .surplus(product, market.price)
        .ok_or_else(|| anyhow!("{} does not demand {}", c.name, world.catalog.get(product).name))?;
    header(&format!("CONSUMER SURPLUS: {}", world.catalog.get(product).name));
    kv("Market price", money(market.price));
    kv("Surplus", money(surplus));
    Ok(())
}

fn consumer_substitution(world: &World) -> Result<()> {
    let c = selected_consumer(world)?;
    let staple = world.catalog.staple();
    header(&format!("SUBSTITUTION vs {} ({})", world.catalog.get(staple).name, c.name));
    for &need in &c.needs {
        kv(
            &world.catalog.get(need).name,
            format!("{:.4}", c.substitution[&need]),
        );
    }
    Ok(())
}

fn consumer_needs(world: &World) -> Result<()> {
    let c = selected_consumer(world)?;
    header(&format!("NEEDS: {}", c.name));
    for &need in &c.needs {
        let line = c.demand[&need];
        println!(
            "  {:<12} consumed {:>8.2}   p = {:.2} - {:.3}Q",
            world.catalog.get(need).name,
            c.consumed[&need],
            line.c,
            line.m
        );
    }
    Ok(())
}

fn consumer_demand_curve(world: &World, args: &[Arg]) -> Result<()> {
    let a = Args::new("consumer_demand_curve", &["product"], args)?;
    let product = resolve_product(world, a.str("product")?)?;
    let c = selected_consumer(world)?;
    let line = c
        .demand
        .get(&product)
        .ok_or_else(|| anyhow!("{} does not demand {}", c.name, world.catalog.get(product).name))?;
    header(&format!("DEMAND CURVE: {} -> {}", c.name, world.catalog.get(product).name));
    kv("Curve", format!("p = {:.2} - {:.3}Q", line.c, line.m));
    kv("Choke price", money(line.c));
    kv("Max quantity", format!("{:.2} units", line.c / line.m));
    Ok(())
}

// === FARMER INSPECTION ===

fn selected_farmer(world: &World) -> Result<&agora_core::Farmer> {
    Ok(world
        .selected_farmer()
        .ok_or(KernelError::NoSelection("farmer"))?)
}

fn farmer_details(world: &World) -> Result<()> {
    let f = selected_farmer(world)?;
    header(&format!("FARMER: {}", f.consumer.name));
    kv("Age", format!("{} years", f.consumer.age_days / 365));
    kv("Land", format!("{:.1} acres", f.land));
    kv("Tech level", format!("{:.0}%", f.tech * 100.0));
    kv("Tax rate", format!("{:.1}%", f.tax * 100.0));
    kv("Weather", format!("{:.2}", f.weather));
    kv("Savings", money(f.consumer.savings));
    kv("Daily income", money(f.consumer.daily_income));
    Ok(())
}

fn farmer_supply(world: &World, args: &[Arg]) -> Result<()> {
    let a = Args::new("farmer_supply", &["product", "price"], args)?;
    let product = resolve_product(world, a.str("product")?)?;
    let price = a.f64("price")?;
    let f = selected_farmer(world)?;
    if !f.grows(product) {
        bail!("{} does not grow {}", f.consumer.name, world.catalog.get(product).name);
    }
    let quantity = f.supply_at(product, price);
    header(&format!("SUPPLY AT {}", money(price)));
    kv(&world.catalog.get(product).name, format!("{quantity:.2} units"));
    Ok(())
}

fn farmer_crops(world: &World) -> Result<()> {
    let f = selected_farmer(world)?;
    header(&format!("CROPS: {}", f.consumer.name));
    for &crop in &f.crops {
        let line = f.supply[&crop];
        println!(
            "  {:<12} p = {:.2} + {:.3}Q   max {:.1} u  growth {:.1}  decay {:.1}",
            world.catalog.get(crop).name,
            line.c,
            line.m,
            f.max_output[&crop],
            f.growth[&crop],
            f.decay[&crop]
        );
    }
    Ok(())
}

fn farmer_weather(world: &World) -> Result<()> {
    let f = selected_farmer(world)?;
    header("WEATHER");
    kv("Today", format!("{:.2}  (0 = ruinous, 1 = ideal)", f.weather));
    Ok(())
}

fn farmer_supply_curve(world: &World, args: &[Arg]) -> Result<()> {
    let a = Args::new("farmer_supply_curve", &["product"], args)?;
    let product = resolve_product(world, a.str("product")?)?;
    let f = selected_farmer(world)?;
    let line = f
        .supply
        .get(&product)
        .ok_or_else(|| anyhow!("{} does not grow {}", f.consumer.name, world.catalog.get(product).name))?;
    header(&format!("SUPPLY CURVE: {} -> {}", f.consumer.name, world.catalog.get(product).name));
    kv("Curve", format!("p = {:.2} + {:.3}Q", line.c, line.m));
    kv("Effective MC floor", money(line.c + f.tax - 2.0 * f.tech));
    kv("Max output", format!("{:.1} units", f.max_output[&product]));
    Ok(())
}

// === LABORER INSPECTION ===

fn laborer_details(world: &World) -> Result<()> {
    let l = world
        .selected_laborer()
        .ok_or(KernelError::NoSelection("laborer"))?;
    header(&format!("LABORER: {}", l.consumer.name));
    kv("Age", format!("{} years", l.consumer.age_days / 365));
    kv("Skill", format!("{:.0}%", l.skill * 100.0));
    kv("Min wage", money(l.min_wage));
    kv("Savings", money(l.consumer.savings));
    kv(
        "Employment",
        if world.is_employed(l.consumer.id) {
            "employed"
        } else {
            "unemployed"
        },
    );
    Ok(())
}

// === FIRM INSPECTION ===

fn selected_firm(world: &World) -> Result<&agora_core::Firm> {
    Ok(world.selected_firm().ok_or(KernelError::NoFirmOwned)?)
}

fn firm_details(world: &World) -> Result<()> {
    let f = selected_firm(world)?;
    header(&format!("FIRM (owner {})", f.owner));
    kv("Cash", money(f.cash));
    kv("Workers", f.workers.len());
    kv("Capital units", f.capital.len());
    kv("Wage", money(f.wage));
    kv("Output", format!("{:.3}", f.costs.output));
    kv("Total cost", money(f.costs.total));
    kv("Average cost", money(f.costs.average));
    kv("Marginal cost", money(f.costs.marginal));
    let eff = f.factor_efficiency();
    kv("MPL/w", format!("{:.5}", eff.labor));
    kv("MPK/r", format!("{:.5}", eff.capital));
    kv(
        "Recommendation",
        match eff.mix() {
            FactorMix::NearOptimal => "optimal mix",
            FactorMix::FavorLabor => "hire more labor",
            FactorMix::FavorCapital => "add more capital",
        },
    );
    Ok(())
}

fn firm_costs(world: &World) -> Result<()> {
    let f = selected_firm(world)?;
    let c = f.costs;
    header("FIRM COSTS");
    kv("TFC", money(c.total_fixed));
    kv("TVC", money(c.total_variable));
    kv("TC", money(c.total));
    kv("AFC", money(c.average_fixed));
    kv("AVC", money(c.average_variable));
    kv("AC", money(c.average));
    kv("MC", money(c.marginal));
    kv("Q", format!("{:.3}", c.output));
    kv("Regime", f.scale_regime());
    Ok(())
}

fn firm_output(world: &World) -> Result<()> {
    let f = selected_firm(world)?;
    header("FIRM OUTPUT");
    kv("L", f.workers.len());
    kv("K", f.capital.len());
    kv("Q", format!("{:.3}", f.costs.output));
    Ok(())
}

fn firm_mp(world: &World) -> Result<()> {
    let f = selected_firm(world)?;
    header("MARGINAL PRODUCTS");
    kv("MPL", format!("{:.5}", f.marginal_product_of_labor()));
    kv("MPK", format!("{:.5}", f.marginal_product_of_capital()));
    Ok(())
}

fn firm_efficiency(world: &World) -> Result<()> {
    let f = selected_firm(world)?;
    let eff = f.factor_efficiency();
    header("FACTOR EFFICIENCY");
    kv("Labor  (MPL/w)", format!("{:.5}", eff.labor));
    kv("Capital (MPK/r)", format!("{:.5}", eff.capital));
    kv(
        "Status",
        match eff.mix() {
            FactorMix::NearOptimal => "optimal mix (isoquant tangent to isocost)",
            FactorMix::FavorLabor => "labor is cheap relative to output: hire",
            FactorMix::FavorCapital => "capital is cheap relative to output: invest",
        },
    );
    Ok(())
}

// === MARKET INSPECTION ===

fn market_details(world: &World) -> Result<()> {
    let m = world
        .selected_market()
        .ok_or(KernelError::NoSelection("market"))?;
    let eq = m.equilibrium();
    header(&format!("MARKET: {}", world.catalog.get(m.product).name));
    kv("Price", money(m.price));
    kv("Demand", format!("p = {:.2} - {:.3}Q", m.demand.c, m.demand.m));
    kv("Supply", format!("p = {:.2} + {:.3}Q", m.supply.c, m.supply.m));
    kv("Equilibrium price", money(eq.price));
    kv("Equilibrium qty", format!("{:.2} units", eq.quantity));
    kv("Market value", money(eq.price * eq.quantity));
    Ok(())
}

fn market_history(world: &World) -> Result<()> {
    let m = world
        .selected_market()
        .ok_or(KernelError::NoSelection("market"))?;
    if m.history.is_empty() {
        println!("No history yet; run pass_day first");
        return Ok(());
    }
    header(&format!(
        "PRICE HISTORY: {} (last {} days)",
        world.catalog.get(m.product).name,
        m.history.len()
    ));
    for (i, price) in m.history.iter().enumerate() {
        println!("  day -{:<3} {}", m.history.len() - i, money(*price));
    }
    Ok(())
}

// === SIMULATION ===

fn pass_day(world: &mut World, n: u32) -> Result<()> {
    let summary = world.pass_days(n)?;
    if n == 1 {
        println!("Day {} complete. GDP {}", world.day, money(world.stats.gdp));
        return Ok(());
    }
    header(&format!("AFTER {} DAYS", summary.days));
    kv(
        "GDP",
        format!("{} -> {}", money(summary.gdp_before), money(summary.gdp_after)),
    );
    for (product, before, after) in &summary.prices {
        if *before < 0.1 && *after < 0.1 {
            continue;
        }
        let diff = after - before;
        let trend = if diff > 0.005 {
            format!("up {diff:+.2}")
        } else if diff < -0.005 {
            format!("down {diff:+.2}")
        } else {
            "stable".to_string()
        };
        kv(
            &world.catalog.get(*product).name,
            format!("{} -> {}  {}", money(*before), money(*after), trend),
        );
    }
    Ok(())
}

fn status(world: &World) {
    let s = world.stats;
    header(&format!("ECONOMY, DAY {}", world.day));
    kv("GDP", money(s.gdp));
    kv(
        "GDP per capita",
        money(s.gdp / (s.population.max(1)) as f64),
    );
    kv("Population", s.population);
    kv("Firms", s.firms);
    kv("Employed", s.employed);
    kv("Unemployment", format!("{:.1}%", s.unemployment * 100.0));
    kv("Money supply", money(s.money_supply));
    println!("  GDP breakdown:");
    for (product, eq) in world.gdp_breakdown() {
        let value = eq.price * eq.quantity;
        if value > 0.01 {
            kv(
                &format!("  {}", world.catalog.get(product).name),
                format!("{} ({:.2} u @ {})", money(value), eq.quantity, money(eq.price)),
            );
        }
    }
}

// === PROPERTIES & ASSIGNMENT ===

fn query_property(world: &World, object: &str, property: &str) -> Result<()> {
    match (object, property) {
        ("system", "gdp") => println!("{:.2}", world.stats.gdp),
        ("system", "unemployment") => println!("{:.4}", world.stats.unemployment),
        ("system", "employed") => println!("{}", world.stats.employed),
        ("system", "population") => println!("{}", world.population()),
        ("system", "money_supply") => println!("{:.2}", world.stats.money_supply),
        ("system", "firms") => println!("{}", world.firms.len()),
        ("system", "day") => println!("{}", world.day),
        ("market", "price") => {
            let m = world
                .selected_market()
                .ok_or(KernelError::NoSelection("market"))?;
            println!("{:.2}", m.price);
        }
        ("consumer", "savings") => println!("{:.2}", selected_consumer(world)?.savings),
        ("consumer", "income") => println!("{:.2}", selected_consumer(world)?.daily_income),
        ("farmer", "weather") => println!("{:.2}", selected_farmer(world)?.weather),
        _ => bail!("unknown property: {object}.{property}"),
    }
    Ok(())
}

fn assign(world: &mut World, target: &str, value: &str) -> Result<()> {
    match target {
        "gdp" => {
            let gdp: f64 = value.parse().map_err(|_| anyhow!("gdp must be a number"))?;
            world.set_gdp(gdp);
            println!("GDP set to {}", money(gdp));
        }
        other => bail!("{other} is not assignable"),
    }
    Ok(())
}

fn help() {
    println!(
        "\nCommands:\n\
         \x20 listing     consumers | laborers | farmers | firms | markets | products\n\
         \x20 creation    add_consumer(name, age) | add_laborer(name, age, skill, min_wage)\n\
         \x20             add_farmer(name, age, land, tech) | add_firm(owner_id, cash, alpha, beta)\n\
         \x20 selection   select_consumer(name) | select_laborer(name) | select_farmer(name)\n\
         \x20             select_market(product) | clear_selection\n\
         \x20 consumer    consumer_details | consumer_mu(product) | consumer_surplus(product)\n\
         \x20             consumer_substitution | consumer_needs | consumer_demand_curve(product)\n\
         \x20             set_income(value) | kill_consumer\n\
         \x20 farmer      farmer_details | farmer_supply(product, price) | farmer_crops\n\
         \x20             farmer_weather | farmer_supply_curve(product) | farmer_upgrade(level)\n\
         \x20             farmer_tax(rate) | kill_farmer\n\
         \x20 laborer     laborer_details | kill_laborer\n\
         \x20 firm        firm_details | firm_costs | firm_output | firm_mp | firm_efficiency\n\
         \x20             firm_hire(laborer) | firm_fire(laborer) | firm_capital(rental, efficiency)\n\
         \x20 market      market_details | market_history\n\
         \x20 simulation  pass_day | pass_day(n) | status\n\
         \x20 queries     system.gdp | system.unemployment | market.price | ...  and  gdp = <value>\n\
         \x20 exit | quit"
    );
}
