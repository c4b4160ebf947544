//! Product filtering and sorting.
//!
//! The catalog page recomputes its product list from scratch on every request:
//! a fixed sequence of independent filters followed by one stable sort. Each
//! filter is a pure predicate, so the dimensions commute and re-applying a
//! query to its own output changes nothing.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::types::{CategoryId, Price};

/// Sort order for the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Featured first, then best sellers, otherwise API order.
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    NameAsc,
    /// Most recently created first; undated products last.
    Newest,
}

impl SortKey {
    /// All sort keys in the order the sort menu lists them.
    pub const ALL: [Self; 5] = [
        Self::Featured,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::NameAsc,
        Self::Newest,
    ];

    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::NameAsc => "name_asc",
            Self::Newest => "newest",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Featured => b
                .is_featured
                .cmp(&a.is_featured)
                .then_with(|| b.is_best_seller.cmp(&a.is_best_seller)),
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
            Self::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            // `None < Some`, so reversing puts undated products last
            Self::Newest => b.created_at.cmp(&a.created_at),
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("invalid sort key: {s}"))
    }
}

/// The catalog's filter state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Free-text search over name and description.
    pub search: Option<String>,
    pub category: Option<CategoryId>,
    /// Inclusive lower bound.
    pub min_price: Option<Price>,
    /// Inclusive upper bound.
    pub max_price: Option<Price>,
    /// Allowed cities; empty means any city.
    pub cities: BTreeSet<String>,
    pub sort: SortKey,
}

impl ProductQuery {
    /// Whether any filter (not counting the sort) is active.
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        self.search_needle().is_some()
            || self.category.is_some()
            || self.min_price.is_some()
            || self.max_price.is_some()
            || !self.cities.is_empty()
    }

    /// Run the filters and the sort over `products`.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let needle = self.search_needle();

        let mut result: Vec<Product> = products
            .iter()
            .filter(|p| needle.as_deref().is_none_or(|n| p.matches_text(n)))
            .filter(|p| self.category.as_ref().is_none_or(|c| &p.category == c))
            .filter(|p| self.min_price.is_none_or(|min| p.price >= min))
            .filter(|p| self.max_price.is_none_or(|max| p.price <= max))
            .filter(|p| self.matches_city(p))
            .cloned()
            .collect();

        // Vec::sort_by is stable, ties keep API order
        result.sort_by(|a, b| self.sort.compare(a, b));
        result
    }

    fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn matches_city(&self, product: &Product) -> bool {
        if self.cities.is_empty() {
            return true;
        }
        product
            .city
            .as_ref()
            .is_some_and(|city| self.cities.contains(city))
    }
}

/// Distinct cities offered by `products`, sorted.
#[must_use]
pub fn available_cities(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .filter_map(|p| p.city.clone())
        .filter(|c| !c.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Lowest and highest price in `products`, for the price filter defaults.
#[must_use]
pub fn price_bounds(products: &[Product]) -> Option<(Price, Price)> {
    let min = products.iter().map(|p| p.price).min()?;
    let max = products.iter().map(|p| p.price).max()?;
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::types::ProductId;

    fn product(id: &str, name: &str, cents: i64, category: &str, city: Option<&str>) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: format!("{name} arrangement"),
            price: Price::from_cents(cents),
            category: CategoryId::new(category),
            images: Vec::new(),
            image: None,
            is_featured: false,
            is_best_seller: false,
            colors: Vec::new(),
            occasions: Vec::new(),
            city: city.map(String::from),
            store: None,
            created_at: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("1", "Red Roses", 8_000, "bouquets", Some("Seattle")),
            product("2", "White Lilies", 4_500, "bouquets", Some("Portland")),
            product("3", "Sunflower Box", 12_000, "boxes", Some("Seattle")),
            product("4", "Tulip Mix", 3_000, "bouquets", Some("Seattle")),
            product("5", "Orchid Pot", 6_000, "plants", None),
        ]
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    fn seattle_bouquets_under_100() -> ProductQuery {
        ProductQuery {
            category: Some(CategoryId::new("bouquets")),
            min_price: Some(Price::from_cents(0)),
            max_price: Some(Price::from_cents(10_000)),
            cities: BTreeSet::from(["Seattle".to_string()]),
            sort: SortKey::PriceAsc,
            ..ProductQuery::default()
        }
    }

    #[test]
    fn test_combined_filters() {
        let result = seattle_bouquets_under_100().apply(&catalog());
        assert_eq!(ids(&result), vec!["4", "1"]);
    }

    #[test]
    fn test_empty_query_keeps_everything_in_order() {
        let result = ProductQuery::default().apply(&catalog());
        assert_eq!(ids(&result), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_filters_commute() {
        let full = seattle_bouquets_under_100();
        let only_city = ProductQuery {
            cities: full.cities.clone(),
            ..ProductQuery::default()
        };
        let only_category = ProductQuery {
            category: full.category.clone(),
            ..ProductQuery::default()
        };
        let only_price = ProductQuery {
            min_price: full.min_price,
            max_price: full.max_price,
            sort: SortKey::PriceAsc,
            ..ProductQuery::default()
        };

        let a = only_price.apply(&only_category.apply(&only_city.apply(&catalog())));
        let b = only_price.apply(&only_city.apply(&only_category.apply(&catalog())));
        assert_eq!(ids(&a), ids(&full.apply(&catalog())));
        assert_eq!(ids(&b), ids(&a));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let query = seattle_bouquets_under_100();
        let once = query.apply(&catalog());
        assert_eq!(query.apply(&once), once);
    }

    #[test]
    fn test_search_is_case_insensitive_and_trims() {
        let query = ProductQuery {
            search: Some("  ROSES ".to_string()),
            ..ProductQuery::default()
        };
        assert_eq!(ids(&query.apply(&catalog())), vec!["1"]);

        let blank = ProductQuery {
            search: Some("   ".to_string()),
            ..ProductQuery::default()
        };
        assert!(!blank.is_filtered());
        assert_eq!(blank.apply(&catalog()).len(), 5);
    }

    #[test]
    fn test_search_matches_description() {
        let mut products = catalog();
        products[4].description = "Phalaenopsis in a ceramic pot".to_string();
        let query = ProductQuery {
            search: Some("ceramic".to_string()),
            ..ProductQuery::default()
        };
        assert_eq!(ids(&query.apply(&products)), vec!["5"]);
    }

    #[test]
    fn test_city_filter_excludes_products_without_city() {
        let query = ProductQuery {
            cities: BTreeSet::from(["Seattle".to_string(), "Portland".to_string()]),
            ..ProductQuery::default()
        };
        assert_eq!(ids(&query.apply(&catalog())), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let query = ProductQuery {
            min_price: Some(Price::from_cents(4_500)),
            max_price: Some(Price::from_cents(8_000)),
            ..ProductQuery::default()
        };
        assert_eq!(ids(&query.apply(&catalog())), vec!["1", "2", "5"]);
    }

    #[test]
    fn test_sort_keys() {
        let sorted = |sort| {
            let query = ProductQuery {
                sort,
                ..ProductQuery::default()
            };
            ids(&query.apply(&catalog()))
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        };
        assert_eq!(sorted(SortKey::PriceDesc), vec!["3", "1", "5", "2", "4"]);
        assert_eq!(sorted(SortKey::NameAsc), vec!["5", "1", "3", "4", "2"]);
    }

    #[test]
    fn test_featured_sort_is_stable() {
        let mut products = catalog();
        products[3].is_featured = true;
        products[1].is_best_seller = true;
        let result = ProductQuery::default().apply(&products);
        assert_eq!(ids(&result), vec!["4", "2", "1", "3", "5"]);
    }

    #[test]
    fn test_newest_puts_undated_last() {
        let mut products = catalog();
        products[0].created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
        products[2].created_at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).single();
        let query = ProductQuery {
            sort: SortKey::Newest,
            ..ProductQuery::default()
        };
        assert_eq!(ids(&query.apply(&products)), vec!["3", "1", "2", "4", "5"]);
    }

    #[test]
    fn test_available_cities_and_bounds() {
        assert_eq!(available_cities(&catalog()), vec!["Portland", "Seattle"]);
        assert_eq!(
            price_bounds(&catalog()),
            Some((Price::from_cents(3_000), Price::from_cents(12_000)))
        );
        assert_eq!(price_bounds(&[]), None);
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("price_desc".parse::<SortKey>(), Ok(SortKey::PriceDesc));
        assert!("cheapest".parse::<SortKey>().is_err());
    }
}
