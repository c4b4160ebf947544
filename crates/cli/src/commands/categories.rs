//! `categories`: print the category tree.

use bloomway_core::catalog::{CategoryTree, TreeRow};

use super::{CommandError, public_client};

/// One indented line per category, depth first.
#[must_use]
pub fn render(rows: &[TreeRow]) -> Vec<String> {
    rows.iter()
        .map(|row| {
            let marker = if row.category.is_active { "" } else { " (inactive)" };
            format!(
                "{}{}{}  [{}]",
                "  ".repeat(row.depth),
                row.category.name,
                marker,
                row.category.id
            )
        })
        .collect()
}

pub async fn tree() -> Result<(), CommandError> {
    let api = public_client()?;
    let categories = api.categories().await?;
    let tree = CategoryTree::build(&categories);

    tracing::info!("{} categories", tree.len());
    for line in render(&tree.rows()) {
        tracing::info!("{line}");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bloomway_core::models::Category;

    use super::*;

    #[test]
    fn test_render_indents_children() {
        let categories: Vec<Category> = serde_json::from_value(serde_json::json!([
            {"_id": "b", "name": "Bouquets"},
            {"_id": "r", "name": "Roses", "parent": "b", "isActive": false}
        ]))
        .unwrap();
        let lines = render(&CategoryTree::build(&categories).rows());
        assert_eq!(lines, vec!["Bouquets  [b]", "  Roses (inactive)  [r]"]);
    }
}
