//! Course entity and its value types.
//!
//! Prices are exact decimals. The tax-inclusive price is derived on every
//! read and never stored, so it can not drift from the base price.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::{Category, CategoryId};

/// Lowest accepted course price.
pub const MIN_COURSE_PRICE: Decimal = Decimal::TEN;
/// Multiplier applied to a base price to include tax (exactly `1.1`).
pub const TAX_MULTIPLIER: Decimal = Decimal::from_parts(11, 0, 0, false, 1);
/// Fewest characters a course title may have.
pub const MIN_TITLE_LEN: usize = 10;
/// Most characters a course title or instructor name may have.
pub const MAX_TEXT_LEN: usize = 120;

/// Store-generated course identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(i64);

impl CourseId {
    /// Wrap a raw identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exact course price.
///
/// # Examples
/// ```
/// use course_catalogue::domain::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::TEN);
/// assert_eq!(price.after_tax().to_string(), "11.0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Wrap a decimal amount. Range rules are applied by course validation.
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Base amount.
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Tax-inclusive amount, `amount * 1.1`.
    pub fn after_tax(&self) -> Decimal {
        self.0.saturating_mul(TAX_MULTIPLIER)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Sanitised course title.
///
/// Only produced by course validation or rebuilt from stored rows, so the
/// contained text never holds active markup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CourseTitle(String);

impl CourseTitle {
    pub(crate) fn from_sanitised(value: String) -> Self {
        Self(value)
    }

    /// Rebuild a title read back from the store.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Sanitised text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CourseTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated course ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    /// Unique sanitised title.
    pub title: CourseTitle,
    /// Instructor, possibly empty.
    pub instructor: String,
    /// Base price before tax.
    pub price: Price,
    /// Existing category.
    pub category_id: CategoryId,
}

/// Stored course with its category resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: CourseTitle,
    instructor: String,
    price: Price,
    category: Category,
}

impl Course {
    /// Attach a store-generated identifier and the resolved category.
    pub fn from_new(id: CourseId, new: NewCourse, category: Category) -> Self {
        Self {
            id,
            title: new.title,
            instructor: new.instructor,
            price: new.price,
            category,
        }
    }

    /// Rebuild a course from trusted stored columns.
    pub fn from_parts(
        id: CourseId,
        title: CourseTitle,
        instructor: impl Into<String>,
        price: Price,
        category: Category,
    ) -> Self {
        Self {
            id,
            title,
            instructor: instructor.into(),
            price,
            category,
        }
    }

    /// Store-assigned identifier.
    pub fn id(&self) -> CourseId {
        self.id
    }

    /// Sanitised title.
    pub fn title(&self) -> &CourseTitle {
        &self.title
    }

    /// Instructor name, possibly empty.
    pub fn instructor(&self) -> &str {
        self.instructor.as_str()
    }

    /// Base price before tax.
    pub fn price(&self) -> Price {
        self.price
    }

    /// Tax-inclusive price computed from the stored base price.
    pub fn price_after_tax(&self) -> Decimal {
        self.price.after_tax()
    }

    /// Resolved category.
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Replace the title, keeping every other attribute.
    pub fn with_title(mut self, title: CourseTitle) -> Self {
        self.title = title;
        self
    }
}
