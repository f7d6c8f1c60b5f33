use serde::Serialize;
use uuid::Uuid;

use super::category::CategoryDetails;
use crate::error::AppError;

pub fn normalize_title(raw: &str) -> Result<&str, AppError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::bad_request("Title is required"));
    }
    Ok(title)
}

pub fn normalize_item_name(raw: &str) -> Result<&str, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("Item name is required"));
    }
    Ok(name)
}

fn normalize_optional(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// A validated item waiting to be appended to a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub quantity: String,
    pub unit: Option<String>,
    pub category: String,
    pub category_details: CategoryDetails,
}

impl ItemDraft {
    pub fn new(
        name: &str,
        quantity: Option<String>,
        unit: Option<String>,
        category: Option<&str>,
        category_details: Option<CategoryDetails>,
    ) -> Result<Self, AppError> {
        let name = normalize_item_name(name)?;
        let (category, category_details) = CategoryDetails::resolve(category, category_details);
        Ok(Self {
            name: name.to_string(),
            quantity: quantity.map(|q| q.trim().to_string()).unwrap_or_default(),
            unit: normalize_optional(unit),
            category,
            category_details,
        })
    }
}

/// Partial item update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub category_details: Option<CategoryDetails>,
    pub checked: Option<bool>,
}

impl ItemPatch {
    pub fn normalized(mut self) -> Result<Self, AppError> {
        if let Some(name) = self.name.as_deref() {
            self.name = Some(normalize_item_name(name)?.to_string());
        }
        self.quantity = self.quantity.map(|q| q.trim().to_string());
        if self.category.is_some() || self.category_details.is_some() {
            let (category, details) =
                CategoryDetails::resolve(self.category.as_deref(), self.category_details.take());
            self.category = Some(category);
            self.category_details = Some(details);
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.unit.is_none()
            && self.category.is_none()
            && self.category_details.is_none()
            && self.checked.is_none()
    }
}

/// Completion summary shown next to each list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: u32,
    pub total: u32,
    pub display: String,
    pub progress: u32,
}

impl Progress {
    pub fn from_checked<I>(checked: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let (completed, total) = checked
            .into_iter()
            .fold((0u32, 0u32), |(done, total), checked| {
                (done + u32::from(checked), total + 1)
            });
        let progress = if total == 0 {
            0
        } else {
            ((f64::from(completed) / f64::from(total)) * 100.0).round() as u32
        };
        Self {
            completed,
            total,
            display: format!("{completed}/{total} done"),
            progress,
        }
    }
}

/// A list is complete once it has items and every one of them is checked.
pub fn is_completed<I>(checked: I) -> bool
where
    I: IntoIterator<Item = bool>,
{
    let mut any = false;
    for checked in checked {
        if !checked {
            return false;
        }
        any = true;
    }
    any
}

pub fn ensure_owner(owner_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    if owner_id != user_id {
        return Err(AppError::forbidden("Not authorized to modify this list"));
    }
    Ok(())
}

pub fn ensure_visible(owner_id: Uuid, members: &[Uuid], user_id: Uuid) -> Result<(), AppError> {
    if owner_id != user_id && !members.contains(&user_id) {
        return Err(AppError::forbidden("Not authorized to view this list"));
    }
    Ok(())
}

const TOO_MANY_ITEMS: &str = "List has too many items";

/// Position stored for the `index`-th item of a new list.
pub fn item_position(index: usize) -> Result<i32, AppError> {
    i32::try_from(index).map_err(|_| AppError::bad_request(TOO_MANY_ITEMS))
}

/// Position after the highest one in use; 0 for an empty list.
pub fn next_position<I>(positions: I) -> Result<i32, AppError>
where
    I: IntoIterator<Item = i32>,
{
    match positions.into_iter().max() {
        Some(last) => last
            .checked_add(1)
            .ok_or_else(|| AppError::bad_request(TOO_MANY_ITEMS)),
        None => Ok(0),
    }
}
