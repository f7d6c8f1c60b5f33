use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const UNCATEGORIZED: &str = "uncategorized";
pub const DEFAULT_COLOR: &str = "#000000";

/// Category metadata copied onto an item when it is added. Never follows
/// later catalog edits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetails {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
}

impl Default for CategoryDetails {
    fn default() -> Self {
        Self {
            id: UNCATEGORIZED.to_string(),
            name: "Uncategorized".to_string(),
            image: None,
        }
    }
}

impl CategoryDetails {
    /// Details derived from a bare category id, e.g. `"dairy-eggs"` becomes
    /// `Dairy Eggs`.
    pub fn for_category(id: &str) -> Self {
        let id = id.trim();
        if id.is_empty() || id == UNCATEGORIZED {
            return Self::default();
        }
        Self {
            id: id.to_string(),
            name: title_case(id),
            image: None,
        }
    }

    /// Picks the item's category id and details from whatever the client sent.
    pub fn resolve(category: Option<&str>, details: Option<CategoryDetails>) -> (String, Self) {
        let category = category.map(str::trim).filter(|value| !value.is_empty());
        match (category, details) {
            (Some(id), Some(details)) => (id.to_string(), details),
            (None, Some(details)) => (details.id.clone(), details),
            (Some(id), None) => {
                let details = Self::for_category(id);
                (id.to_string(), details)
            }
            (None, None) => (UNCATEGORIZED.to_string(), Self::default()),
        }
    }
}

fn title_case(raw: &str) -> String {
    raw.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Validated input for the category catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
    pub color: String,
}

impl CategoryDraft {
    pub fn new(
        name: &str,
        description: Option<&str>,
        color: Option<&str>,
    ) -> Result<Self, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::bad_request("Category name is required"));
        }
        let color = color
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_COLOR);
        if !is_hex_color(color) {
            return Err(AppError::bad_request(format!("Invalid color: {color}")));
        }
        Ok(Self {
            name: name.to_string(),
            description: description.unwrap_or_default().trim().to_string(),
            color: color.to_string(),
        })
    }
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::{CategoryDetails, CategoryDraft, DEFAULT_COLOR, UNCATEGORIZED};

    #[test]
    fn default_details_are_uncategorized() {
        let details = CategoryDetails::default();
        assert_eq!(details.id, UNCATEGORIZED);
        assert_eq!(details.name, "Uncategorized");
        assert!(details.image.is_none());
    }

    #[test]
    fn bare_category_id_gets_title_cased_name() {
        let details = CategoryDetails::for_category("dairy-eggs");
        assert_eq!(details.id, "dairy-eggs");
        assert_eq!(details.name, "Dairy Eggs");
    }

    #[test]
    fn resolve_prefers_explicit_details_and_fills_missing_id() {
        let custom = CategoryDetails {
            id: "bakery".to_string(),
            name: "Bakery".to_string(),
            image: Some("/img/bread.png".to_string()),
        };

        let (id, details) = CategoryDetails::resolve(None, Some(custom.clone()));
        assert_eq!(id, "bakery");
        assert_eq!(details, custom);

        let (id, details) = CategoryDetails::resolve(Some("  "), None);
        assert_eq!(id, UNCATEGORIZED);
        assert_eq!(details, CategoryDetails::default());
    }

    #[test]
    fn details_serialize_with_null_image() {
        let json = serde_json::to_value(CategoryDetails::default()).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "id": "uncategorized", "name": "Uncategorized", "image": null })
        );
    }

    #[test]
    fn category_draft_applies_defaults_and_validates() {
        let draft = CategoryDraft::new(" Produce ", None, None).expect("valid draft");
        assert_eq!(draft.name, "Produce");
        assert_eq!(draft.description, "");
        assert_eq!(draft.color, DEFAULT_COLOR);

        let err = CategoryDraft::new("   ", None, None).expect_err("blank name");
        assert_eq!(err.message(), "Category name is required");

        let err = CategoryDraft::new("Produce", None, Some("green")).expect_err("bad color");
        assert_eq!(err.message(), "Invalid color: green");
    }
}
