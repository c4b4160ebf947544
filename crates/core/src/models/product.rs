//! Product records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId, StoreId};

/// A product as returned by the REST API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(deserialize_with = "super::reference")]
    pub category: CategoryId,
    #[serde(default)]
    pub images: Vec<String>,
    /// Legacy single-image field, still sent for older products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_best_seller: bool,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub occasions: Vec<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "super::optional_reference")]
    pub store: Option<StoreId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The image shown on cards and in the cart.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images
            .first()
            .map(String::as_str)
            .or(self.image.as_deref())
    }

    /// Case-insensitive match of the search text against name and description.
    #[must_use]
    pub fn matches_text(&self, needle_lowercase: &str) -> bool {
        self.name.to_lowercase().contains(needle_lowercase)
            || self.description.to_lowercase().contains(needle_lowercase)
    }
}

/// Body for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: CategoryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    pub is_featured: bool,
    pub is_best_seller: bool,
    pub colors: Vec<String>,
    pub occasions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            category: product.category.clone(),
            store: product.store.clone(),
            images: product.images.clone(),
            is_featured: product.is_featured,
            is_best_seller: product.is_best_seller,
            colors: product.colors.clone(),
            occasions: product.occasions.clone(),
            city: product.city.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_populated_references() {
        let json = r#"{
            "_id": "p1",
            "name": "Red Roses",
            "price": 59.9,
            "category": {"_id": "bouquets", "name": "Bouquets"},
            "store": {"_id": "s1", "name": "Downtown"},
            "isFeatured": true,
            "city": "Seattle",
            "__v": 3
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category, CategoryId::new("bouquets"));
        assert_eq!(product.store, Some(StoreId::new("s1")));
        assert!(product.is_featured);
        assert!(!product.is_best_seller);
        assert_eq!(product.price, Price::from_cents(5990));
    }

    #[test]
    fn test_deserialize_bare_references() {
        let json = r#"{"id": "p2", "name": "Tulips", "price": 20, "category": "c9", "store": null}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category, CategoryId::new("c9"));
        assert_eq!(product.store, None);
        assert!(product.images.is_empty());
    }

    #[test]
    fn test_primary_image_falls_back_to_legacy_field() {
        let json = r#"{"_id": "p3", "name": "Lily", "price": 5, "category": "c", "image": "/u/lily.jpg"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.primary_image(), Some("/u/lily.jpg"));
    }

    #[test]
    fn test_input_serializes_camel_case_numbers() {
        let input = ProductInput {
            name: "Peonies".to_string(),
            description: String::new(),
            price: Price::from_cents(3500),
            category: CategoryId::new("c1"),
            store: None,
            images: Vec::new(),
            is_featured: false,
            is_best_seller: true,
            colors: vec!["pink".to_string()],
            occasions: Vec::new(),
            city: None,
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["isBestSeller"], serde_json::json!(true));
        assert_eq!(value["price"], serde_json::json!(35.0));
        assert!(value.get("store").is_none());
    }
}
