//! Cache types for read-mostly API responses.

use std::sync::Arc;

use bloomway_core::models::{Category, Product, Store};
use bloomway_core::{ProductId, StoreId};

/// REST resource a cache entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Products,
    Stores,
    Categories,
}

/// Cache key for public reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Featured,
    BestSellers,
    Product(ProductId),
    StoreProducts(StoreId),
    Stores,
    Store(StoreId),
    Categories,
}

impl CacheKey {
    #[must_use]
    pub const fn resource(&self) -> Resource {
        match self {
            Self::Products
            | Self::Featured
            | Self::BestSellers
            | Self::Product(_)
            | Self::StoreProducts(_) => Resource::Products,
            Self::Stores | Self::Store(_) => Resource::Stores,
            Self::Categories => Resource::Categories,
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Arc<Product>),
    Stores(Arc<Vec<Store>>),
    Store(Arc<Store>),
    Categories(Arc<Vec<Category>>),
}

/// Types that can be stored in the cache.
pub(crate) trait Cached: Sized {
    fn wrap(value: Arc<Self>) -> CacheValue;
    fn unwrap(value: CacheValue) -> Option<Arc<Self>>;
}

macro_rules! cached {
    ($ty:ty => $variant:ident) => {
        impl Cached for $ty {
            fn wrap(value: Arc<Self>) -> CacheValue {
                CacheValue::$variant(value)
            }

            fn unwrap(value: CacheValue) -> Option<Arc<Self>> {
                match value {
                    CacheValue::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

cached!(Vec<Product> => Products);
cached!(Product => Product);
cached!(Vec<Store> => Stores);
cached!(Store => Store);
cached!(Vec<Category> => Categories);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_map_to_resources() {
        assert_eq!(CacheKey::Featured.resource(), Resource::Products);
        assert_eq!(
            CacheKey::StoreProducts(StoreId::new("s1")).resource(),
            Resource::Products
        );
        assert_eq!(CacheKey::Store(StoreId::new("s1")).resource(), Resource::Stores);
        assert_eq!(CacheKey::Categories.resource(), Resource::Categories);
    }
}
