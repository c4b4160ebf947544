//! Catalog route handlers.

use std::collections::BTreeSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, RawQuery, State};
use bloomway_core::cart::Favorites;
use bloomway_core::catalog::{CategoryTree, ProductQuery, SortKey, available_cities};
use bloomway_core::models::{Category, Product};
use bloomway_core::{CategoryId, ProductId};
use tracing::instrument;
use url::form_urlencoded;

use crate::api::ApiClient;
use crate::error::Result;
use crate::filters;
use crate::middleware::Page;
use crate::routes::forms::parse_price;
use crate::state::AppState;

// =============================================================================
// View types
// =============================================================================

/// Product summary for grids (home, catalog, favorites).
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image: Option<String>,
    pub city: Option<String>,
    pub is_featured: bool,
    pub is_best_seller: bool,
    pub is_favorite: bool,
}

impl ProductCard {
    #[must_use]
    pub fn new(api: &ApiClient, product: &Product, favorites: Option<&Favorites>) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.display(),
            image: product.primary_image().map(|img| api.asset_url(img)),
            city: product.city.clone(),
            is_featured: product.is_featured,
            is_best_seller: product.is_best_seller,
            is_favorite: favorites.is_some_and(|f| f.contains(&product.id)),
        }
    }

    pub fn list(api: &ApiClient, products: &[Product], favorites: Option<&Favorites>) -> Vec<Self> {
        products
            .iter()
            .map(|p| Self::new(api, p, favorites))
            .collect()
    }
}

/// A `<select>` option.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// A city checkbox.
#[derive(Debug, Clone)]
pub struct CityOption {
    pub name: String,
    pub checked: bool,
}

/// Category options indented by tree depth.
pub fn category_options(categories: &[Category], selected: Option<&CategoryId>) -> Vec<SelectOption> {
    CategoryTree::build(categories)
        .rows()
        .into_iter()
        .map(|row| SelectOption {
            value: row.category.id.to_string(),
            label: format!("{}{}", "\u{2014} ".repeat(row.depth), row.category.name),
            selected: selected == Some(&row.category.id),
        })
        .collect()
}

// =============================================================================
// Query parsing
// =============================================================================

/// Raw catalog query as typed by the visitor, echoed back into the form.
#[derive(Debug, Clone, Default)]
pub struct CatalogParams {
    pub q: String,
    pub category: String,
    pub min: String,
    pub max: String,
    pub cities: BTreeSet<String>,
    pub sort: String,
}

impl CatalogParams {
    /// Parse `q`, `category`, `min`, `max`, repeated `city` and `sort`.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let value = value.trim().to_string();
            match key.as_ref() {
                "q" => params.q = value,
                "category" => params.category = value,
                "min" => params.min = value,
                "max" => params.max = value,
                "city" if !value.is_empty() => {
                    params.cities.insert(value);
                }
                "sort" => params.sort = value,
                _ => {}
            }
        }
        params
    }

    /// The filter state. Unparseable bounds and sort keys are ignored.
    #[must_use]
    pub fn query(&self) -> ProductQuery {
        let bound = |raw: &str| {
            if raw.is_empty() {
                None
            } else {
                parse_price(raw, "price").ok()
            }
        };
        ProductQuery {
            search: Some(self.q.clone()).filter(|q| !q.is_empty()),
            category: Some(self.category.as_str())
                .filter(|c| !c.is_empty())
                .map(CategoryId::new),
            min_price: bound(&self.min),
            max_price: bound(&self.max),
            cities: self.cities.clone(),
            sort: self.sort.parse().unwrap_or_default(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogTemplate {
    pub page: Page,
    pub params: CatalogParams,
    pub categories: Vec<SelectOption>,
    pub cities: Vec<CityOption>,
    pub sorts: Vec<SelectOption>,
    pub products: Vec<ProductCard>,
    pub total: usize,
    pub is_filtered: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "catalog/show.html")]
pub struct ProductTemplate {
    pub page: Page,
    pub card: ProductCard,
    pub description: String,
    pub images: Vec<String>,
    pub category: Option<String>,
    pub colors: Vec<String>,
    pub occasions: Vec<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Catalog page.
#[instrument(skip(state, page))]
pub async fn index(
    State(state): State<AppState>,
    page: Page,
    RawQuery(raw): RawQuery,
) -> Result<CatalogTemplate> {
    let api = state.api();
    let params = CatalogParams::parse(raw.as_deref());
    let query = params.query();

    let (products, categories) = tokio::try_join!(api.products(), api.categories())?;
    let favorites = super::favorites::load_for(&state, page.user.as_ref()).await?;

    let filtered = query.apply(&products);
    let cities = available_cities(&products)
        .into_iter()
        .map(|name| CityOption {
            checked: query.cities.contains(&name),
            name,
        })
        .collect();
    let sorts = SortKey::ALL
        .into_iter()
        .map(|key| SelectOption {
            value: key.as_str().to_string(),
            label: page.labels.sort(key).to_string(),
            selected: key == query.sort,
        })
        .collect();

    Ok(CatalogTemplate {
        categories: category_options(&categories, query.category.as_ref()),
        cities,
        sorts,
        total: filtered.len(),
        products: ProductCard::list(api, &filtered, favorites.as_ref()),
        is_filtered: query.is_filtered(),
        params,
        page,
    })
}

/// Product detail page.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    page: Page,
    Path(id): Path<String>,
) -> Result<ProductTemplate> {
    let api = state.api();
    let product = api.product(&ProductId::new(id)).await?;
    let favorites = super::favorites::load_for(&state, page.user.as_ref()).await?;

    // The category name is decoration; a failed lookup leaves it out.
    let category = match api.categories().await {
        Ok(categories) => categories
            .iter()
            .find(|c| c.id == product.category)
            .map(|c| c.name.clone()),
        Err(e) => {
            tracing::warn!(error = %e, "Could not load categories for product page");
            None
        }
    };

    let mut images: Vec<String> = product.images.iter().map(|i| api.asset_url(i)).collect();
    if images.is_empty() {
        images.extend(product.image.as_deref().map(|i| api.asset_url(i)));
    }

    Ok(ProductTemplate {
        card: ProductCard::new(api, &product, favorites.as_ref()),
        description: product.description.clone(),
        images,
        category,
        colors: product.colors.clone(),
        occasions: product.occasions.clone(),
        page,
    })
}
