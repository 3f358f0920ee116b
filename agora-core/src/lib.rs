//! Agent-based microeconomic simulation kernel
//!
//! This crate advances a small closed economy one day at a time. Three
//! household kinds and firms trade a fixed catalog of products through
//! per-product markets that clear by aggregating linear demand and supply
//! curves into an equilibrium price.
//!
//! ## Agents
//!
//! All three household kinds share one **consumer** component: daily
//! consumption under a budget constraint, income-elastic demand curves, and
//! substitution ratios against the staple good.
//!
//! - **Consumers** are pure households - they only consume.
//! - **Farmers** also hold land and supply crops through per-crop supply
//!   curves shaped by land, tech level, weather, and tax.
//! - **Laborers** also carry a skill level and a reservation wage, and are
//!   hired and fired by firms.
//!
//! **Firms** combine labor and capital through a production function
//! (Cobb-Douglas or CES), track the full cost panel (TFC/TVC/AC/MC …), and
//! re-balance their input mix each day against market prices.
//!
//! ## Markets
//!
//! Markets are **per-product**. Each day a market horizontally sums the
//! demand curves of every household and the supply curves of farmers and
//! producing firms, solves the linear equilibrium, and records the price.
//! Between equilibria a Walrasian tâtonnement step nudges the price toward
//! the crossing, so even one-sided markets keep moving.
//!
//! ## The day
//!
//! [`World::pass_day`] runs a fixed phase sequence (see [`tick`]): clear →
//! agent day → re-clear → firm heuristics → macro aggregates → tâtonnement →
//! income jitter → periodic demand shock. All randomness flows through the
//! world's single seeded RNG, so a seed plus a command sequence fully
//! determines the run.
//!
//! ## Module Structure
//!
//! - `types`      Ids and scalar aliases
//! - `catalog`    Immutable product descriptors
//! - `curves`     Linear curve primitives and horizontal-sum aggregation
//! - `agents`     Consumer component, farmer and laborer extensions
//! - `firm`       Production functions and cost accounting
//! - `market`     Per-product clearing, tâtonnement, price history
//! - `world`      State container, lifecycle, seeded default roster
//! - `tick`       The per-day phase sequence
//! - `selection`  Handles used by the command layer
//! - `error`      Precondition error taxonomy

pub mod agents;
pub mod catalog;
pub mod curves;
pub mod error;
pub mod firm;
pub mod market;
pub mod selection;
pub mod tick;
pub mod types;
pub mod world;

// Re-export commonly used types at the crate root

pub use agents::{Consumer, DayContext, Farmer, Laborer};
pub use catalog::{Catalog, Product, products};
pub use curves::{DemandLine, SupplyLine, aggregate_demand, aggregate_supply};
pub use error::{KernelError, KernelResult};
pub use firm::{
    CapitalUnit, Costs, FactorEfficiency, FactorMix, Firm, ProductionFn, ScaleRegime, Worker,
};
pub use market::{Adjustment, Equilibrium, HISTORY_LEN, Market, PRICE_FLOOR};
pub use selection::Selections;
pub use types::{AgentId, EPSILON, Price, ProductId, Quantity};
pub use world::{DEFAULT_SEED, DaySummary, Stats, World};
