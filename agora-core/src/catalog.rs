use serde::{Deserialize, Serialize};

use crate::types::ProductId;

// === PRODUCT ===

/// Static descriptor of a tradeable good. Stored once in the [`Catalog`];
/// agents refer to it by [`ProductId`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    /// Units lost from an agent's consumed stock per day (spoilage).
    pub decay_rate: f64,
    /// Income elasticity. Positive = normal good, negative = inferior.
    pub eta: f64,
    /// Average person's daily need in units.
    pub base_consumption: f64,
    /// Units produced per acre per season. Zero for non-crops.
    pub growth_rate: f64,
}

// === CATALOG ===

/// The immutable product catalog. Built once at world creation; lookups by
/// name exist because command input arrives as text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The ten-good default catalog: staples, cash crops, and durables.
    pub fn standard() -> Self {
        let p = |name: &str, decay_rate: f64, eta: f64, base_consumption: f64, growth_rate: f64| {
            Product {
                name: name.to_string(),
                decay_rate,
                eta,
                base_consumption,
                growth_rate,
            }
        };
        Self::new(vec![
            p("rice", 0.08, 0.30, 0.45, 50.0),
            p("cloth", 0.01, 0.80, 0.05, 0.0),
            p("computer", 0.002, 1.60, 0.002, 0.0),
            p("phone", 0.004, 1.30, 0.004, 0.0),
            p("car", 0.001, 1.90, 0.0005, 0.0),
            p("steel", 0.001, 0.90, 0.01, 0.0),
            p("potato", 0.12, -0.40, 0.30, 80.0),
            p("banana", 0.20, 0.50, 0.25, 90.0),
            p("corn", 0.10, 0.20, 0.20, 60.0),
            p("jute", 0.03, -0.20, 0.08, 40.0),
        ])
    }

    pub fn get(&self, id: ProductId) -> &Product {
        &self.products[id.0]
    }

    /// Resolve a product by name. Command input is matched case-insensitively.
    pub fn find(&self, name: &str) -> Option<ProductId> {
        self.products
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
            .map(ProductId)
    }

    /// The staple good against which substitution ratios are measured.
    pub fn staple(&self) -> ProductId {
        ProductId(0)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductId, &Product)> {
        self.products
            .iter()
            .enumerate()
            .map(|(i, p)| (ProductId(i), p))
    }
}

/// Well-known handles into the [`Catalog::standard`] ordering.
pub mod products {
    use crate::types::ProductId;

    pub const RICE: ProductId = ProductId(0);
    pub const CLOTH: ProductId = ProductId(1);
    pub const COMPUTER: ProductId = ProductId(2);
    pub const PHONE: ProductId = ProductId(3);
    pub const CAR: ProductId = ProductId(4);
    pub const STEEL: ProductId = ProductId(5);
    pub const POTATO: ProductId = ProductId(6);
    pub const BANANA: ProductId = ProductId(7);
    pub const CORN: ProductId = ProductId(8);
    pub const JUTE: ProductId = ProductId(9);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_order_matches_well_known_handles() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.get(products::RICE).name, "rice");
        assert_eq!(catalog.get(products::CAR).name, "car");
        assert_eq!(catalog.get(products::JUTE).name, "jute");
        assert_eq!(catalog.len(), 10);
    }

    #[test]
    fn find_is_case_insensitive() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.find("rice"), Some(ProductId(0)));
        assert_eq!(catalog.find("Rice"), Some(ProductId(0)));
        assert_eq!(catalog.find("JUTE"), catalog.find("jute"));
        assert_eq!(catalog.find("mango"), None);
    }

    #[test]
    fn staple_is_rice() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.get(catalog.staple()).name, "rice");
    }
}
