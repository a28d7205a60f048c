//! Catalog rules: the closed category/type table and item validation.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Low-stock threshold used when none is given.
pub const DEFAULT_LOW_STOCK_LIMIT: i32 = 10;

/// Decimal places a stored price keeps.
pub const PRICE_SCALE: u32 = 2;

/// Largest unit price the price columns hold (`numeric(12, 2)`).
#[must_use]
pub fn max_price() -> Decimal {
    Decimal::new(999_999_999_999, PRICE_SCALE)
}

/// Errors raised while validating catalog input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Item name is empty.
    #[error("Item name is required")]
    EmptyName,

    /// Category is not one of the fixed set.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Type does not belong to the category.
    #[error("Type '{item_type}' is not allowed for category {category}")]
    TypeNotAllowed {
        /// Category given.
        category: Category,
        /// Type given.
        item_type: String,
    },

    /// Quantity below zero.
    #[error("Quantity cannot be negative")]
    NegativeQuantity,

    /// Cost or sell price below zero.
    #[error("{0} cannot be negative")]
    NegativePrice(&'static str),

    /// Price has fractions of a cent or does not fit the price column.
    #[error("{0} must have at most two decimal places and not exceed 9999999999.99")]
    InvalidPrice(&'static str),

    /// Threshold below one.
    #[error("Low stock limit must be at least 1")]
    InvalidLowStockLimit,
}

impl CatalogError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        "VALIDATION_ERROR"
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        400
    }
}

/// Item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Live plants.
    Plants,
    /// Containers.
    Pots,
    /// Gardening tools.
    Tools,
    /// Anything else.
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 4] = [Self::Plants, Self::Pots, Self::Tools, Self::Other];

    /// Types an item of this category may carry.
    #[must_use]
    pub const fn allowed_types(self) -> &'static [&'static str] {
        match self {
            Self::Plants => &["Flower", "Succulent", "Indoor", "Outdoor", "Bonsai", "Cactus"],
            Self::Pots => &["Ceramic", "Plastic", "Terracotta", "Hanging", "Large", "Small"],
            Self::Tools => &["Cutter", "Pruner", "Shovel", "Sprayer"],
            Self::Other => &["Other"],
        }
    }

    /// Returns true if `item_type` belongs to this category.
    #[must_use]
    pub fn allows(self, item_type: &str) -> bool {
        self.allowed_types().contains(&item_type)
    }

    /// Stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plants => "Plants",
            Self::Pots => "Pots",
            Self::Tools => "Tools",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CatalogError::UnknownCategory(s.to_string()))
    }
}

/// Fields accepted by an inventory upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInput {
    /// Unique item name.
    pub item: String,
    /// Category.
    pub category: Category,
    /// Type within the category.
    #[serde(rename = "type")]
    pub item_type: String,
    /// Units on hand.
    pub quantity: i64,
    /// Unit cost.
    pub cost_price: Decimal,
    /// Unit selling price.
    pub sell_price: Decimal,
    /// Low-stock threshold.
    #[serde(default = "default_low_stock_limit")]
    pub low_stock_limit: i32,
}

const fn default_low_stock_limit() -> i32 {
    DEFAULT_LOW_STOCK_LIMIT
}

impl ItemInput {
    /// Checks every field and returns the input with a trimmed name.
    ///
    /// # Errors
    ///
    /// Returns the first rule the input breaks.
    pub fn validate(mut self) -> Result<Self, CatalogError> {
        let name = self.item.trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        self.item = name.to_string();

        if !self.category.allows(&self.item_type) {
            return Err(CatalogError::TypeNotAllowed {
                category: self.category,
                item_type: self.item_type,
            });
        }
        if self.quantity < 0 {
            return Err(CatalogError::NegativeQuantity);
        }
        check_price("Cost price", self.cost_price)?;
        check_price("Sell price", self.sell_price)?;
        if self.low_stock_limit < 1 {
            return Err(CatalogError::InvalidLowStockLimit);
        }
        Ok(self)
    }
}

fn check_price(field: &'static str, price: Decimal) -> Result<(), CatalogError> {
    if price < Decimal::ZERO {
        return Err(CatalogError::NegativePrice(field));
    }
    if price.round_dp(PRICE_SCALE) != price || price > max_price() {
        return Err(CatalogError::InvalidPrice(field));
    }
    Ok(())
}

/// Returns true when stock is positive but at or below the threshold.
///
/// Items that are already sold out are not reported as low.
#[must_use]
pub fn is_low_stock(quantity: i64, low_stock_limit: i32) -> bool {
    quantity > 0 && quantity <= i64::from(low_stock_limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn rose() -> ItemInput {
        ItemInput {
            item: "  Rose ".to_string(),
            category: Category::Plants,
            item_type: "Flower".to_string(),
            quantity: 5,
            cost_price: dec!(60),
            sell_price: dec!(100),
            low_stock_limit: DEFAULT_LOW_STOCK_LIMIT,
        }
    }

    #[test]
    fn test_valid_item_is_trimmed() {
        let item = rose().validate().unwrap();
        assert_eq!(item.item, "Rose");
    }

    #[rstest]
    #[case(Category::Plants, "Cactus", true)]
    #[case(Category::Plants, "Ceramic", false)]
    #[case(Category::Pots, "Terracotta", true)]
    #[case(Category::Tools, "Sprayer", true)]
    #[case(Category::Tools, "Flower", false)]
    #[case(Category::Other, "Other", true)]
    #[case(Category::Other, "Shovel", false)]
    fn test_type_table(#[case] category: Category, #[case] item_type: &str, #[case] ok: bool) {
        assert_eq!(category.allows(item_type), ok);
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut empty = rose();
        empty.item = "   ".to_string();
        assert_eq!(empty.validate(), Err(CatalogError::EmptyName));

        let mut bad_type = rose();
        bad_type.item_type = "Shovel".to_string();
        assert!(matches!(
            bad_type.validate(),
            Err(CatalogError::TypeNotAllowed { .. })
        ));

        let mut negative_qty = rose();
        negative_qty.quantity = -1;
        assert_eq!(negative_qty.validate(), Err(CatalogError::NegativeQuantity));

        let mut negative_price = rose();
        negative_price.sell_price = dec!(-0.01);
        assert_eq!(
            negative_price.validate(),
            Err(CatalogError::NegativePrice("Sell price"))
        );

        let mut zero_limit = rose();
        zero_limit.low_stock_limit = 0;
        assert_eq!(zero_limit.validate(), Err(CatalogError::InvalidLowStockLimit));
    }

    #[test]
    fn test_zero_prices_are_allowed() {
        let mut item = rose();
        item.cost_price = Decimal::ZERO;
        item.sell_price = Decimal::ZERO;
        assert!(item.validate().is_ok());
    }

    #[rstest]
    #[case(dec!(0.004), dec!(1))]
    #[case(dec!(1), dec!(0.005))]
    #[case(dec!(99999999999999), dec!(1))]
    #[case(dec!(10000000000.00), dec!(1))]
    fn test_rejects_prices_the_column_cannot_hold(#[case] sell: Decimal, #[case] cost: Decimal) {
        let mut item = rose();
        item.sell_price = sell;
        item.cost_price = cost;
        assert!(matches!(item.validate(), Err(CatalogError::InvalidPrice(_))));
    }

    #[rstest]
    #[case(dec!(12.50))]
    #[case(dec!(12.500))]
    #[case(dec!(9999999999.99))]
    fn test_accepts_cent_prices(#[case] sell: Decimal) {
        let mut item = rose();
        item.sell_price = sell;
        assert_eq!(item.validate().unwrap().sell_price, sell);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("pots".parse::<Category>().unwrap(), Category::Pots);
        assert!("Seeds".parse::<Category>().is_err());
    }

    #[rstest]
    #[case(0, 10, false)]
    #[case(1, 10, true)]
    #[case(10, 10, true)]
    #[case(11, 10, false)]
    fn test_low_stock(#[case] quantity: i64, #[case] limit: i32, #[case] low: bool) {
        assert_eq!(is_low_stock(quantity, limit), low);
    }
}
