//! Category management.
//!
//! One page shows the whole tree. Each row carries its own edit form, so
//! every mutation redirects back to the tree with a flash message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::Response,
};
use bloomway_core::CategoryId;
use bloomway_core::catalog::{CategoryTree, TreeRow};
use bloomway_core::i18n::Labels;
use bloomway_core::models::CategoryInput;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{ApiClient, Upload};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Page, RequireAdmin};
use crate::models::{CurrentUser, Flash};
use crate::routes::catalog::SelectOption;
use crate::routes::forms::MultipartForm;
use crate::routes::{labels, recover, redirect_with};
use crate::state::AppState;

const TREE_PATH: &str = "/admin/categories";
const IMAGE_FIELD: &str = "image";

/// One row of the tree with its inline edit form.
#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub depth: usize,
    pub has_children: bool,
    pub is_active: bool,
    pub image: Option<String>,
    pub parents: Vec<SelectOption>,
}

fn parent_select(rows: &[TreeRow], selected: Option<&CategoryId>) -> Vec<SelectOption> {
    rows.iter()
        .map(|row| SelectOption {
            value: row.category.id.to_string(),
            label: format!("{}{}", "\u{2014} ".repeat(row.depth), row.category.name),
            selected: selected == Some(&row.category.id),
        })
        .collect()
}

impl CategoryRow {
    fn new(api: &ApiClient, tree: &CategoryTree, row: &TreeRow) -> Self {
        let category = &row.category;
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            description: category.description.clone(),
            depth: row.depth,
            has_children: row.has_children,
            is_active: category.is_active,
            image: category.images.first().map(|i| api.asset_url(i)),
            parents: parent_select(&tree.parent_options(&category.id), category.parent.as_ref()),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/categories.html")]
pub struct CategoriesTemplate {
    pub page: Page,
    pub rows: Vec<CategoryRow>,
    /// Parent choices for the create form.
    pub parents: Vec<SelectOption>,
}

/// Category editor inputs, as typed.
#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub name: String,
    pub description: String,
    pub parent: String,
    pub is_active: bool,
}

impl CategoryForm {
    #[must_use]
    pub fn from_multipart(form: &MultipartForm) -> Self {
        Self {
            name: form.text("name"),
            description: form.text("description"),
            parent: form.text("parent"),
            is_active: form.checked("is_active"),
        }
    }

    /// Validate into an API body. When `editing` is set the parent must not
    /// be the category itself or one of its descendants.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn to_input(
        &self,
        labels: &Labels,
        tree: &CategoryTree,
        editing: Option<&CategoryId>,
        images: Vec<String>,
    ) -> std::result::Result<CategoryInput, String> {
        let invalid = |field: &str| format!("{field}: {}", labels.invalid_form);
        if self.name.is_empty() {
            return Err(invalid(labels.name));
        }

        let parent = Some(CategoryId::new(self.parent.as_str())).filter(|_| !self.parent.is_empty());
        if let Some(parent) = &parent {
            let allowed = match editing {
                Some(id) => tree
                    .parent_options(id)
                    .iter()
                    .any(|row| &row.category.id == parent),
                None => tree.find(parent).is_some(),
            };
            if !allowed {
                return Err(invalid(labels.parent));
            }
        }

        Ok(CategoryInput {
            name: self.name.clone(),
            description: self.description.clone(),
            parent,
            is_active: self.is_active,
            images,
        })
    }
}

async fn upload_image(
    api: &ApiClient,
    user: &CurrentUser,
    upload: Option<Upload>,
) -> std::result::Result<Option<String>, crate::api::ApiError> {
    match upload {
        Some(upload) => api.upload(user.token(), upload).await.map(Some),
        None => Ok(None),
    }
}

/// The category tree.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
    page: Page,
) -> Result<CategoriesTemplate> {
    let api = state.api();
    let categories = api.categories().await?;
    let tree = CategoryTree::build(&categories);
    let rows = tree.rows();

    Ok(CategoriesTemplate {
        parents: parent_select(&rows, None),
        rows: rows.iter().map(|row| CategoryRow::new(api, &tree, row)).collect(),
        page,
    })
}

/// Create a category, uploading its image first when one was chosen.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    multipart: Multipart,
) -> Result<Response> {
    let labels = labels(&state, &session).await;
    let mut multipart = MultipartForm::read(multipart, IMAGE_FIELD).await?;
    let api = state.api();
    let tree = CategoryTree::build(&api.categories().await?);

    let form = CategoryForm::from_multipart(&multipart);
    if let Err(error) = form.to_input(labels, &tree, None, Vec::new()) {
        return Ok(redirect_with(&session, Flash::error(error), TREE_PATH).await);
    }

    let images = match upload_image(api, &user, multipart.take_file()).await {
        Ok(url) => url.into_iter().collect(),
        Err(e) => return recover(&session, labels, e, TREE_PATH).await,
    };
    let input = form
        .to_input(labels, &tree, None, images)
        .map_err(AppError::BadRequest)?;

    match api.create_category(user.token(), &input).await {
        Ok(category) => {
            tracing::info!(category_id = %category.id, "Category created");
            Ok(redirect_with(&session, Flash::success(labels.saved), TREE_PATH).await)
        }
        Err(e) => recover(&session, labels, e, TREE_PATH).await,
    }
}

/// Save a row's inline form. A new image is added to the existing ones.
#[instrument(skip(state, session, user, multipart))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let labels = labels(&state, &session).await;
    let mut multipart = MultipartForm::read(multipart, IMAGE_FIELD).await?;
    let api = state.api();
    let id = CategoryId::new(id);

    let tree = CategoryTree::build(&api.categories().await?);
    let existing = tree
        .find(&id)
        .map(|node| node.category.clone())
        .ok_or_else(|| AppError::NotFound("category".to_string()))?;

    let form = CategoryForm::from_multipart(&multipart);
    if let Err(error) = form.to_input(labels, &tree, Some(&id), Vec::new()) {
        return Ok(redirect_with(&session, Flash::error(error), TREE_PATH).await);
    }

    let mut images = existing.images;
    match upload_image(api, &user, multipart.take_file()).await {
        Ok(url) => images.extend(url),
        Err(e) => return recover(&session, labels, e, TREE_PATH).await,
    }
    let input = form
        .to_input(labels, &tree, Some(&id), images)
        .map_err(AppError::BadRequest)?;

    match api.update_category(user.token(), &id, &input).await {
        Ok(_) => Ok(redirect_with(&session, Flash::success(labels.saved), TREE_PATH).await),
        Err(e) => recover(&session, labels, e, TREE_PATH).await,
    }
}

/// Delete a category. The API decides what happens to its children.
#[instrument(skip(state, session, user))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Response> {
    let labels = labels(&state, &session).await;
    let id = CategoryId::new(id);
    match state.api().delete_category(user.token(), &id).await {
        Ok(()) => {
            tracing::info!(category_id = %id, "Category deleted");
            Ok(redirect_with(&session, Flash::success(labels.deleted), TREE_PATH).await)
        }
        Err(e) => recover(&session, labels, e, TREE_PATH).await,
    }
}
