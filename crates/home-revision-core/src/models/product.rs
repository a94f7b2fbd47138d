//! Product model and the client-side forms used to create and edit products.
//!
//! `Product` mirrors the server representation. `ProductForm` carries raw
//! user input and is validated into a `NewProduct` (create) or a
//! `ProductEdit` (update). `ProductEdit::diff` reduces an edit to the
//! `ProductPatch` that is actually sent, so unchanged fields never reach
//! the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Client-side field validation failures. These never reach the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a product title.")]
    EmptyTitle,

    #[error("Quantity must be a non-negative number.")]
    InvalidQuantity,

    #[error("Target quantity must be a non-negative number.")]
    InvalidTargetQuantity,

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),
}

/// Unit of measure. Serialized as the abbreviated labels the server stores.
///
/// Labels this client does not know decode as `Unknown`, so one odd row
/// does not fail a whole listing. `Unknown` is never sent back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum Unit {
    #[default]
    #[serde(rename = "шт", alias = "piece")]
    Piece,
    #[serde(rename = "кг", alias = "kg")]
    Kilogram,
    #[serde(rename = "гр", alias = "gram")]
    Gram,
    #[serde(rename = "л", alias = "liter")]
    Liter,
    #[serde(rename = "мл", alias = "milliliter")]
    Milliliter,
    #[serde(other, skip_serializing)]
    Unknown,
}

impl Unit {
    pub const ALL: [Unit; 5] = [
        Unit::Piece,
        Unit::Kilogram,
        Unit::Gram,
        Unit::Liter,
        Unit::Milliliter,
    ];

    /// Label as stored by the server and shown next to quantities
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Piece => "шт",
            Unit::Kilogram => "кг",
            Unit::Gram => "гр",
            Unit::Liter => "л",
            Unit::Milliliter => "мл",
            Unit::Unknown => "?",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Unit::Piece => "piece",
            Unit::Kilogram => "kg",
            Unit::Gram => "gram",
            Unit::Liter => "liter",
            Unit::Milliliter => "milliliter",
            Unit::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Unit::Unknown
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Unit {
    type Err = ValidationError;

    /// Accepts either the server label or the English name (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Unit::ALL
            .into_iter()
            .find(|u| u.label() == needle || u.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ValidationError::UnknownUnit(needle.to_string()))
    }
}

/// A tracked household product as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Product {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub quantity: u32,
    pub target_quantity: u32,
    pub unit: Unit,
}

impl Product {
    /// How many units are missing to reach the target
    pub fn deficit(&self) -> u32 {
        self.target_quantity.saturating_sub(self.quantity)
    }

    pub fn is_short(&self) -> bool {
        self.quantity < self.target_quantity
    }

    /// Share of the target currently in stock, clamped to `0.0..=1.0`
    pub fn fill_ratio(&self) -> f64 {
        let filled = self.quantity.min(self.target_quantity);
        f64::from(filled) / f64::from(self.target_quantity.max(1))
    }

    /// Apply a successful partial update to this product.
    ///
    /// The server does not echo the updated resource, so the new state is
    /// reconstructed from the prior value plus the fields that were sent.
    pub fn with_patch(&self, patch: &ProductPatch) -> Product {
        let mut updated = self.clone();
        if let Some(ref title) = patch.title {
            updated.title = title.clone();
        }
        if let Some(ref description) = patch.description {
            updated.description = if description.is_empty() {
                None
            } else {
                Some(description.clone())
            };
        }
        if let Some(quantity) = patch.quantity {
            updated.quantity = quantity;
        }
        if let Some(target) = patch.target_quantity {
            updated.target_quantity = target;
        }
        if let Some(unit) = patch.unit {
            updated.unit = unit;
        }
        updated
    }
}

/// Request body for the create endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub quantity: u32,
    pub target_quantity: u32,
    pub unit: Unit,
}

/// Requested changes to a product. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<u32>,
    pub target_quantity: Option<u32>,
    pub unit: Option<Unit>,
}

impl ProductEdit {
    /// Edit touching only the stock counters
    pub fn quantities(quantity: u32, target_quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            target_quantity: Some(target_quantity),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref title) = self.title {
            if title.trim().is_empty() {
                return Err(ValidationError::EmptyTitle);
            }
        }
        match self.unit {
            Some(unit) if !unit.is_known() => Err(ValidationError::UnknownUnit(unit.to_string())),
            _ => Ok(()),
        }
    }

    /// Keep only the fields whose value differs from `current`.
    ///
    /// Text fields compare trimmed, and a missing description equals an
    /// empty one.
    pub fn diff(&self, current: &Product) -> ProductPatch {
        let current_description = current.description.as_deref().unwrap_or("").trim();
        ProductPatch {
            title: self
                .title
                .clone()
                .filter(|t| t.trim() != current.title.trim()),
            description: self
                .description
                .clone()
                .filter(|d| d.trim() != current_description),
            quantity: self.quantity.filter(|q| *q != current.quantity),
            target_quantity: self
                .target_quantity
                .filter(|t| *t != current.target_quantity),
            unit: self.unit.filter(|u| *u != current.unit),
        }
    }
}

/// Partial-update body: only changed fields are serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.quantity.is_none()
            && self.target_quantity.is_none()
            && self.unit.is_none()
    }
}

/// Raw product fields as typed into an add/edit screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub title: String,
    pub description: String,
    pub quantity: String,
    pub target_quantity: String,
    pub unit: Unit,
}

impl ProductForm {
    /// Pre-fill a form from an existing product (edit screen)
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone().unwrap_or_default(),
            quantity: product.quantity.to_string(),
            target_quantity: product.target_quantity.to_string(),
            unit: product.unit,
        }
    }

    /// Validate for creation. Checks run in on-screen order and stop at the
    /// first failing field.
    pub fn validate(&self) -> Result<NewProduct, ValidationError> {
        let (title, quantity, target_quantity) = self.parse_fields()?;
        if !self.unit.is_known() {
            return Err(ValidationError::UnknownUnit(self.unit.to_string()));
        }

        Ok(NewProduct {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            quantity,
            target_quantity,
            unit: self.unit,
        })
    }

    /// Validate for update. Every field is included; diffing against the
    /// stored product drops the unchanged ones. An unknown unit means the
    /// stored one is kept.
    pub fn to_edit(&self) -> Result<ProductEdit, ValidationError> {
        let (title, quantity, target_quantity) = self.parse_fields()?;
        Ok(ProductEdit {
            title: Some(title.to_string()),
            description: Some(self.description.trim().to_string()),
            quantity: Some(quantity),
            target_quantity: Some(target_quantity),
            unit: Some(self.unit).filter(Unit::is_known),
        })
    }

    fn parse_fields(&self) -> Result<(&str, u32, u32), ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let quantity = parse_count(&self.quantity).ok_or(ValidationError::InvalidQuantity)?;
        let target_quantity =
            parse_count(&self.target_quantity).ok_or(ValidationError::InvalidTargetQuantity)?;
        Ok((title, quantity, target_quantity))
    }
}

fn parse_count(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn milk() -> Product {
        Product {
            id: 5,
            user_id: 1,
            title: "Milk".to_string(),
            description: None,
            quantity: 10,
            target_quantity: 12,
            unit: Unit::Liter,
        }
    }

    fn form(title: &str, quantity: &str, target: &str) -> ProductForm {
        ProductForm {
            title: title.to_string(),
            description: String::new(),
            quantity: quantity.to_string(),
            target_quantity: target.to_string(),
            unit: Unit::Piece,
        }
    }

    #[test]
    fn test_product_decodes_server_shape() {
        let json = r#"{"id": 2, "user_id": 7, "title": "Rice", "description": null,
                       "quantity": 1, "target_quantity": 3, "unit": "кг"}"#;
        let product: Product = serde_json::from_str(json).expect("valid product json");
        assert_eq!(product.id, 2);
        assert_eq!(product.user_id, 7);
        assert_eq!(product.description, None);
        assert_eq!(product.unit, Unit::Kilogram);
    }

    #[test]
    fn test_product_rejects_negative_quantity() {
        let json = r#"{"id": 2, "user_id": 7, "title": "Rice", "description": null,
                       "quantity": -1, "target_quantity": 3, "unit": "кг"}"#;
        assert!(serde_json::from_str::<Product>(json).is_err());
    }

    #[test]
    fn test_unit_accepts_english_aliases() {
        let unit: Unit = serde_json::from_str(r#""milliliter""#).expect("alias");
        assert_eq!(unit, Unit::Milliliter);
        assert_eq!(serde_json::to_string(&unit).expect("serialize"), r#""мл""#);
        assert_eq!("KG".parse::<Unit>(), Ok(Unit::Kilogram));
        assert_eq!("гр".parse::<Unit>(), Ok(Unit::Gram));
        assert!(matches!("box".parse::<Unit>(), Err(ValidationError::UnknownUnit(_))));
    }

    #[test]
    fn test_stock_helpers() {
        let p = milk();
        assert!(p.is_short());
        assert_eq!(p.deficit(), 2);

        let over = Product { quantity: 20, ..milk() };
        assert!(!over.is_short());
        assert_eq!(over.deficit(), 0);
        assert!((over.fill_ratio() - 1.0).abs() < f64::EPSILON);

        let zero_target = Product { quantity: 0, target_quantity: 0, ..milk() };
        assert_eq!(zero_target.fill_ratio(), 0.0);
    }

    #[test]
    fn test_form_validation_order() {
        assert_eq!(form("", "1", "1").validate(), Err(ValidationError::EmptyTitle));
        assert_eq!(form("   ", "1", "1").validate(), Err(ValidationError::EmptyTitle));
        assert_eq!(form("Eggs", "-1", "1").validate(), Err(ValidationError::InvalidQuantity));
        assert_eq!(form("Eggs", "ten", "1").validate(), Err(ValidationError::InvalidQuantity));
        assert_eq!(form("Eggs", "", "1").validate(), Err(ValidationError::InvalidQuantity));
        assert_eq!(
            form("Eggs", "1", "-3").validate(),
            Err(ValidationError::InvalidTargetQuantity)
        );
    }

    #[test]
    fn test_form_validation_success() {
        let new = form(" Eggs ", " 6 ", "12").validate().expect("valid form");
        assert_eq!(new.title, "Eggs");
        assert_eq!(new.quantity, 6);
        assert_eq!(new.target_quantity, 12);
        assert_eq!(new.description, "");
    }

    #[test]
    fn test_diff_keeps_only_changed_fields() {
        let current = milk();
        let edit = ProductForm {
            quantity: "11".to_string(),
            ..ProductForm::from_product(&current)
        }
        .to_edit()
        .expect("valid edit");

        let patch = edit.diff(&current);
        assert_eq!(
            patch,
            ProductPatch {
                quantity: Some(11),
                ..ProductPatch::default()
            }
        );
        let body = serde_json::to_value(&patch).expect("serialize patch");
        assert_eq!(body, serde_json::json!({"quantity": 11}));
    }

    #[test]
    fn test_diff_of_unchanged_values_is_empty() {
        let current = milk();
        let edit = ProductEdit {
            quantity: Some(10),
            description: Some(String::new()),
            ..ProductEdit::default()
        };
        assert!(edit.diff(&current).is_empty());
        assert!(ProductEdit::default().diff(&current).is_empty());
    }

    #[test]
    fn test_with_patch_merges_changes() {
        let current = milk();
        let patch = ProductPatch {
            description: Some("2.5%".to_string()),
            target_quantity: Some(6),
            ..ProductPatch::default()
        };
        let updated = current.with_patch(&patch);
        assert_eq!(updated.description.as_deref(), Some("2.5%"));
        assert_eq!(updated.target_quantity, 6);
        assert_eq!(updated.quantity, current.quantity);
        assert_eq!(updated.id, current.id);

        let cleared = updated.with_patch(&ProductPatch {
            description: Some(String::new()),
            ..ProductPatch::default()
        });
        assert_eq!(cleared.description, None);
    }

    #[test]
    fn test_unrecognised_unit_decodes_as_unknown() {
        let json = r#"{"id": 9, "user_id": 7, "title": "Rope", "description": null,
                       "quantity": 1, "target_quantity": 1, "unit": "м"}"#;
        let product: Product = serde_json::from_str(json).expect("unknown unit still decodes");
        assert_eq!(product.unit, Unit::Unknown);
        assert_eq!(product.unit.label(), "?");
        assert!("unknown".parse::<Unit>().is_err());
        assert!(serde_json::to_string(&Unit::Unknown).is_err());
    }

    #[test]
    fn test_unknown_unit_is_never_sent() {
        let rope = Product {
            unit: Unit::Unknown,
            ..milk()
        };
        let edit = ProductForm {
            quantity: "4".to_string(),
            ..ProductForm::from_product(&rope)
        }
        .to_edit()
        .expect("unit is left alone");
        assert_eq!(edit.unit, None);
        assert_eq!(
            edit.diff(&rope),
            ProductPatch {
                quantity: Some(4),
                ..ProductPatch::default()
            }
        );

        let create = ProductForm {
            unit: Unit::Unknown,
            ..form("Rope", "1", "1")
        };
        assert!(matches!(create.validate(), Err(ValidationError::UnknownUnit(_))));
        let edit = ProductEdit {
            unit: Some(Unit::Unknown),
            ..ProductEdit::default()
        };
        assert!(matches!(edit.validate(), Err(ValidationError::UnknownUnit(_))));
    }

    #[test]
    fn test_untouched_form_with_padded_title_has_no_diff() {
        let padded = Product {
            title: " Milk ".to_string(),
            description: Some("fresh ".to_string()),
            ..milk()
        };
        let edit = ProductForm::from_product(&padded)
            .to_edit()
            .expect("valid edit");
        assert!(edit.diff(&padded).is_empty());
    }

    #[test]
    fn test_edit_rejects_blank_title() {
        let edit = ProductEdit {
            title: Some("  ".to_string()),
            ..ProductEdit::default()
        };
        assert_eq!(edit.validate(), Err(ValidationError::EmptyTitle));
        assert_eq!(ProductEdit::quantities(1, 2).validate(), Ok(()));
    }
}
