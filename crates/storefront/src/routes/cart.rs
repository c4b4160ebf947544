//! Cart route handlers.
//!
//! The cart lives in the session. Adding a product snapshots its name, price
//! and image from the API so the cart page renders without another fetch.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use bloomway_core::ProductId;
use bloomway_core::cart::{Cart, CartLine, MAX_LINE_QUANTITY};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{Page, session};
use crate::models::Flash;
use crate::routes::{labels, recover, redirect_with};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub image: Option<String>,
    pub price: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    fn new(cart: &Cart, state: &AppState) -> Self {
        let line = |line: &CartLine| CartLineView {
            product_id: line.product_id.to_string(),
            name: line.name.clone(),
            image: line.image.as_deref().map(|img| state.api().asset_url(img)),
            price: line.price.display(),
            quantity: line.quantity,
            line_total: line.line_total().display(),
        };
        Self {
            lines: cart.lines().iter().map(line).collect(),
            total: cart.total().display(),
            item_count: cart.item_count(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub page: Page,
    pub cart: CartView,
    pub max_quantity: u32,
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: u32,
}

/// Remove line form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page.
#[instrument(skip_all)]
pub async fn show(State(state): State<AppState>, session: Session, page: Page) -> CartTemplate {
    let cart = session::load_cart(&session).await;
    CartTemplate {
        cart: CartView::new(&cart, &state),
        max_quantity: MAX_LINE_QUANTITY,
        page,
    }
}

/// Add a product to the cart and return to the page the form was on.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let labels = labels(&state, &session).await;
    let back = session::referer_path(&headers).unwrap_or_else(|| "/cart".to_string());
    let product_id = ProductId::new(form.product_id);

    let product = match state.api().product(&product_id).await {
        Ok(product) => product,
        Err(e) => return recover(&session, labels, e, &back).await,
    };

    let mut cart = session::load_cart(&session).await;
    cart.add(&product, form.quantity.unwrap_or(1));
    session::save_cart(&session, &cart).await?;

    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));
    Ok(redirect_with(&session, Flash::success(labels.added_to_cart), &back).await)
}

/// Set a line's quantity; zero removes it.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let labels = labels(&state, &session).await;
    let mut cart = session::load_cart(&session).await;
    if cart.update(&ProductId::new(form.product_id), form.quantity) {
        session::save_cart(&session, &cart).await?;
    }
    Ok(redirect_with(&session, Flash::success(labels.cart_updated), "/cart").await)
}

/// Remove a line.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let labels = labels(&state, &session).await;
    let mut cart = session::load_cart(&session).await;
    if cart.remove(&ProductId::new(form.product_id)) {
        session::save_cart(&session, &cart).await?;
    }
    Ok(redirect_with(&session, Flash::success(labels.cart_updated), "/cart").await)
}

/// Empty the cart.
#[instrument(skip_all)]
pub async fn clear(session: Session) -> Result<Response> {
    let mut cart = session::load_cart(&session).await;
    cart.clear();
    session::save_cart(&session, &cart).await?;
    Ok(Redirect::to("/cart").into_response())
}
