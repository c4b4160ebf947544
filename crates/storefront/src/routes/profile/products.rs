//! Product management with image upload.
//!
//! Managers work on the products of their own stores; admins on every
//! product. Forms are `multipart/form-data` so a photo can ride along.

use std::collections::HashSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
};
use bloomway_core::i18n::Labels;
use bloomway_core::models::{Category, Product, ProductInput, Store};
use bloomway_core::{CategoryId, ProductId, StoreId};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Page, RequireStaff};
use crate::models::{CurrentUser, Flash};
use crate::routes::catalog::{ProductCard, SelectOption, category_options};
use crate::routes::forms::{MultipartForm, parse_price, split_list};
use crate::routes::profile::stores::manageable_stores;
use crate::routes::{labels, recover, redirect_with};
use crate::state::AppState;

/// Multipart field carrying the product photo.
const IMAGE_FIELD: &str = "image";

/// Products `user` may manage, with the stores they belong to.
async fn manageable_products(state: &AppState, user: &CurrentUser) -> Result<(Vec<Product>, Vec<Store>)> {
    let (products, stores) = tokio::try_join!(state.api().products(), manageable_stores(state, user))?;
    if user.is_admin() {
        return Ok((products.as_ref().clone(), stores));
    }
    let own: HashSet<&StoreId> = stores.iter().map(|s| &s.id).collect();
    let products = products
        .iter()
        .filter(|p| p.store.as_ref().is_some_and(|s| own.contains(s)))
        .cloned()
        .collect();
    Ok((products, stores))
}

async fn find_manageable(state: &AppState, user: &CurrentUser, id: &ProductId) -> Result<(Product, Vec<Store>)> {
    let (products, stores) = manageable_products(state, user).await?;
    products
        .into_iter()
        .find(|p| &p.id == id)
        .map(|p| (p, stores))
        .ok_or_else(|| AppError::NotFound("product".to_string()))
}

// =============================================================================
// Form model
// =============================================================================

/// The product editor's inputs, as typed.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub store: String,
    pub city: String,
    pub colors: String,
    pub occasions: String,
    pub is_featured: bool,
    pub is_best_seller: bool,
    /// Images already attached; kept on update.
    pub images: Vec<String>,
}

impl ProductForm {
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.amount().to_string(),
            category: product.category.to_string(),
            store: product.store.as_ref().map(ToString::to_string).unwrap_or_default(),
            city: product.city.clone().unwrap_or_default(),
            colors: product.colors.join(", "),
            occasions: product.occasions.join(", "),
            is_featured: product.is_featured,
            is_best_seller: product.is_best_seller,
            images: product.images.clone(),
        }
    }

    #[must_use]
    pub fn from_multipart(form: &MultipartForm) -> Self {
        Self {
            name: form.text("name"),
            description: form.text("description"),
            price: form.text("price"),
            category: form.text("category"),
            store: form.text("store"),
            city: form.text("city"),
            colors: form.text("colors"),
            occasions: form.text("occasions"),
            is_featured: form.checked("is_featured"),
            is_best_seller: form.checked("is_best_seller"),
            images: Vec::new(),
        }
    }

    /// Validate into an API body. A missing city falls back to the store's.
    /// With `require_store` a blank store is rejected; only admins may save
    /// a product without one.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn to_input(
        &self,
        labels: &Labels,
        stores: &[Store],
        require_store: bool,
    ) -> std::result::Result<ProductInput, String> {
        let invalid = |field: &str| format!("{field}: {}", labels.invalid_form);
        if self.name.is_empty() {
            return Err(invalid(labels.name));
        }
        if self.category.is_empty() {
            return Err(invalid(labels.category));
        }
        let price = parse_price(&self.price, labels.price)?;

        let store = if self.store.is_empty() {
            if require_store {
                return Err(invalid(labels.store));
            }
            None
        } else {
            Some(
                stores
                    .iter()
                    .find(|s| s.id.as_str() == self.store)
                    .ok_or_else(|| invalid(labels.store))?,
            )
        };
        let city = Some(self.city.clone())
            .filter(|c| !c.is_empty())
            .or_else(|| store.map(|s| s.city.clone()).filter(|c| !c.is_empty()));

        Ok(ProductInput {
            name: self.name.clone(),
            description: self.description.clone(),
            price,
            category: CategoryId::new(self.category.as_str()),
            store: store.map(|s| s.id.clone()),
            images: self.images.clone(),
            is_featured: self.is_featured,
            is_best_seller: self.is_best_seller,
            colors: split_list(&self.colors),
            occasions: split_list(&self.occasions),
            city,
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "profile/products.html")]
pub struct ProductsTemplate {
    pub page: Page,
    pub products: Vec<ProductCard>,
}

#[derive(Template, WebTemplate)]
#[template(path = "profile/product_form.html")]
pub struct ProductFormTemplate {
    pub page: Page,
    pub action: String,
    pub form: ProductForm,
    pub categories: Vec<SelectOption>,
    pub stores: Vec<SelectOption>,
    pub images: Vec<String>,
    pub error: Option<String>,
}

impl ProductFormTemplate {
    fn new(
        state: &AppState,
        page: Page,
        action: String,
        form: ProductForm,
        categories: &[Category],
        stores: &[Store],
        error: Option<String>,
    ) -> Self {
        let selected_category = Some(CategoryId::new(form.category.as_str())).filter(|_| !form.category.is_empty());
        let store_options = stores
            .iter()
            .map(|s| SelectOption {
                value: s.id.to_string(),
                label: format!("{} ({})", s.name, s.city),
                selected: s.id.as_str() == form.store,
            })
            .collect();
        Self {
            categories: category_options(categories, selected_category.as_ref()),
            stores: store_options,
            images: form.images.iter().map(|i| state.api().asset_url(i)).collect(),
            page,
            action,
            form,
            error,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Products the user manages.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    page: Page,
) -> Result<ProductsTemplate> {
    let (products, _) = manageable_products(&state, &user).await?;
    Ok(ProductsTemplate {
        products: ProductCard::list(state.api(), &products, None),
        page,
    })
}

/// Blank product form.
#[instrument(skip_all)]
pub async fn new(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    page: Page,
) -> Result<ProductFormTemplate> {
    let (categories, stores) =
        tokio::try_join!(state.api().categories(), manageable_stores(&state, &user))?;
    let form = ProductForm {
        store: stores.first().map(|s| s.id.to_string()).unwrap_or_default(),
        ..ProductForm::default()
    };
    Ok(ProductFormTemplate::new(
        &state,
        page,
        "/profile/products".to_string(),
        form,
        &categories,
        &stores,
        None,
    ))
}

/// Create a product, then attach the photo if one was chosen.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireStaff(user): RequireStaff,
    page: Page,
    multipart: Multipart,
) -> Result<Response> {
    let mut multipart = MultipartForm::read(multipart, IMAGE_FIELD).await?;
    let form = ProductForm::from_multipart(&multipart);
    let (categories, stores) =
        tokio::try_join!(state.api().categories(), manageable_stores(&state, &user))?;

    let input = match form.to_input(page.labels, &stores, !user.is_admin()) {
        Ok(input) => input,
        Err(error) => {
            let action = "/profile/products".to_string();
            return Ok(
                ProductFormTemplate::new(&state, page, action, form, &categories, &stores, Some(error))
                    .into_response(),
            );
        }
    };

    let api = state.api();
    let product = match api.create_product(user.token(), &input).await {
        Ok(product) => product,
        Err(e) => return recover(&session, page.labels, e, "/profile/products/new").await,
    };
    tracing::info!(product_id = %product.id, "Product created");

    if let Some(upload) = multipart.take_file() {
        if let Err(e) = api.upload_product_image(user.token(), &product.id, upload).await {
            let edit = format!("/profile/products/{}/edit", product.id);
            return recover(&session, page.labels, e, &edit).await;
        }
    }

    Ok(redirect_with(&session, Flash::success(page.labels.saved), "/profile/products").await)
}

/// Product form filled with the current values.
#[instrument(skip(state, user, page))]
pub async fn edit(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    page: Page,
    Path(id): Path<String>,
) -> Result<ProductFormTemplate> {
    let (product, stores) = find_manageable(&state, &user, &ProductId::new(id)).await?;
    let categories = state.api().categories().await?;
    Ok(ProductFormTemplate::new(
        &state,
        page,
        format!("/profile/products/{}", product.id),
        ProductForm::from_product(&product),
        &categories,
        &stores,
        None,
    ))
}

/// Save changes to a product and attach a new photo if one was chosen.
#[instrument(skip(state, session, user, page, multipart))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireStaff(user): RequireStaff,
    page: Page,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let mut multipart = MultipartForm::read(multipart, IMAGE_FIELD).await?;
    let (product, stores) = find_manageable(&state, &user, &ProductId::new(id)).await?;
    let action = format!("/profile/products/{}", product.id);

    let mut form = ProductForm::from_multipart(&multipart);
    form.images.clone_from(&product.images);

    let input = match form.to_input(page.labels, &stores, !user.is_admin()) {
        Ok(input) => input,
        Err(error) => {
            let categories = state.api().categories().await?;
            return Ok(
                ProductFormTemplate::new(&state, page, action, form, &categories, &stores, Some(error))
                    .into_response(),
            );
        }
    };

    let api = state.api();
    let edit = format!("{action}/edit");
    if let Err(e) = api.update_product(user.token(), &product.id, &input).await {
        return recover(&session, page.labels, e, &edit).await;
    }
    if let Some(upload) = multipart.take_file() {
        if let Err(e) = api.upload_product_image(user.token(), &product.id, upload).await {
            return recover(&session, page.labels, e, &edit).await;
        }
    }

    Ok(redirect_with(&session, Flash::success(page.labels.saved), "/profile/products").await)
}

/// Delete a product.
#[instrument(skip(state, session, user))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireStaff(user): RequireStaff,
    Path(id): Path<String>,
) -> Result<Response> {
    let labels = labels(&state, &session).await;
    let (product, _) = find_manageable(&state, &user, &ProductId::new(id)).await?;

    match state.api().delete_product(user.token(), &product.id).await {
        Ok(()) => {
            tracing::info!(product_id = %product.id, "Product deleted");
            Ok(redirect_with(&session, Flash::success(labels.deleted), "/profile/products").await)
        }
        Err(e) => recover(&session, labels, e, "/profile/products").await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bloomway_core::Price;
    use bloomway_core::i18n::Language;

    use super::*;

    fn stores() -> Vec<Store> {
        serde_json::from_value(serde_json::json!([
            {"_id": "s1", "name": "Pike Place", "city": "Seattle"}
        ]))
        .unwrap()
    }

    fn form() -> ProductForm {
        ProductForm {
            name: "Red roses".to_string(),
            price: "24.90".to_string(),
            category: "c1".to_string(),
            store: "s1".to_string(),
            colors: "red, white".to_string(),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_city_defaults_to_store_city() {
        let input = form().to_input(Language::En.labels(), &stores(), true).unwrap();
        assert_eq!(input.city.as_deref(), Some("Seattle"));
        assert_eq!(input.store, Some(StoreId::new("s1")));
        assert_eq!(input.price, Price::from_cents(2490));
        assert_eq!(input.colors, vec!["red".to_string(), "white".to_string()]);
    }

    #[test]
    fn test_rejects_foreign_store_and_bad_price() {
        let labels = Language::En.labels();
        let foreign = ProductForm {
            store: "s9".to_string(),
            ..form()
        };
        assert!(foreign.to_input(labels, &stores(), true).unwrap_err().starts_with("Store"));

        let bad_price = ProductForm {
            price: "free".to_string(),
            ..form()
        };
        assert!(bad_price.to_input(labels, &stores(), true).unwrap_err().starts_with("Price"));
    }

    #[test]
    fn test_blank_store_only_allowed_without_requirement() {
        let labels = Language::En.labels();
        let unassigned = ProductForm {
            store: String::new(),
            ..form()
        };
        assert!(unassigned.to_input(labels, &stores(), true).unwrap_err().starts_with("Store"));

        let input = unassigned.to_input(labels, &stores(), false).unwrap();
        assert_eq!(input.store, None);
        assert_eq!(input.city, None);
    }

    #[test]
    fn test_existing_product_round_trips() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "_id": "p1", "name": "Tulips", "price": 12.5, "category": "c1",
            "store": "s1", "images": ["/uploads/t.jpg"], "colors": ["yellow"]
        }))
        .unwrap();
        let form = ProductForm::from_product(&product);
        assert_eq!(form.colors, "yellow");
        let input = form.to_input(Language::En.labels(), &stores(), true).unwrap();
        assert_eq!(input.images, vec!["/uploads/t.jpg".to_string()]);
        assert_eq!(input.price, Price::from_cents(1250));
    }
}
