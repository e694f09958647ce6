//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer.

use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::domain::{Category, CategoryId, Course, CourseId, CourseTitle, Price};

use super::schema::{categories, courses};

/// Row struct for reading from the categories table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: i64,
    pub slug: String,
    pub title: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category::from_parts(CategoryId::new(row.id), row.slug, row.title)
    }
}

/// Insertable struct for creating category records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = categories)]
pub(crate) struct NewCategoryRow<'a> {
    pub slug: &'a str,
    pub title: &'a str,
}

/// Row struct for reading from the courses table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub id: i64,
    pub title: String,
    pub instructor: String,
    pub price: Decimal,
}

impl CourseRow {
    /// Combine a course row with its joined category.
    pub(crate) fn into_course(self, category: CategoryRow) -> Course {
        Course::from_parts(
            CourseId::new(self.id),
            CourseTitle::from_stored(self.title),
            self.instructor,
            Price::new(self.price),
            category.into(),
        )
    }
}

/// Insertable struct for creating course records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = courses)]
pub(crate) struct NewCourseRow<'a> {
    pub title: &'a str,
    pub instructor: &'a str,
    pub price: Decimal,
    pub category_id: i64,
}
