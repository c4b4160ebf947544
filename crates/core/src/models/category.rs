//! Product category records.

use serde::{Deserialize, Serialize};

use crate::types::CategoryId;

/// A product category. Categories form a forest through `parent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        alias = "parentId",
        deserialize_with = "super::optional_reference"
    )]
    pub parent: Option<CategoryId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub images: Vec<String>,
}

const fn default_active() -> bool {
    true
}

/// Body for creating or updating a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    pub description: String,
    pub parent: Option<CategoryId>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl From<&Category> for CategoryInput {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone(),
            parent: category.parent.clone(),
            is_active: category.is_active,
            images: category.images.clone(),
        }
    }
}
