//! PostgreSQL-backed course repository.
//!
//! Listing plans compile into one joined query: filters become `WHERE`
//! clauses, ordering keys become `ORDER BY` terms closed by the primary key,
//! and the page window becomes `LIMIT`/`OFFSET`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use rust_decimal::Decimal;

use crate::domain::ports::{CourseConflicts, CourseRepository, CourseRepositoryError};
use crate::domain::{
    Course, CourseFilter, CourseId, CourseListPlan, CourseTitle, NewCourse, Price, SortDirection,
    SortField,
};

use super::diesel_helpers::{
    COURSE_TITLE_PRICE_KEY, DieselFailure, classify_diesel_error, contains_pattern,
};
use super::models::{CategoryRow, CourseRow, NewCourseRow};
use super::pool::{DbPool, PoolError};
use super::schema::{categories, courses};

/// Diesel-backed implementation of [`CourseRepository`].
#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    /// Repository drawing connections from `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CourseRepositoryError {
    CourseRepositoryError::connection(error.into_message())
}

fn map_read_error(error: diesel::result::Error) -> CourseRepositoryError {
    match classify_diesel_error(error, "read courses") {
        DieselFailure::Connection(message) => CourseRepositoryError::connection(message),
        DieselFailure::Query(message) => CourseRepositoryError::query(message),
        DieselFailure::Unique { .. } | DieselFailure::ForeignKey => {
            CourseRepositoryError::query("unexpected constraint violation on read")
        }
    }
}

fn map_insert_error(error: diesel::result::Error, course: &NewCourse) -> CourseRepositoryError {
    match classify_diesel_error(error, "insert course") {
        DieselFailure::Unique { constraint }
            if constraint.as_deref() == Some(COURSE_TITLE_PRICE_KEY) =>
        {
            CourseRepositoryError::duplicate_combination(
                course.title.as_str(),
                course.price.to_string(),
            )
        }
        DieselFailure::Unique { .. } => {
            CourseRepositoryError::duplicate_title(course.title.as_str())
        }
        DieselFailure::ForeignKey => {
            CourseRepositoryError::unknown_category(course.category_id.get())
        }
        DieselFailure::Connection(message) => CourseRepositoryError::connection(message),
        DieselFailure::Query(message) => CourseRepositoryError::query(message),
    }
}

fn map_rename_error(error: diesel::result::Error, title: &CourseTitle) -> CourseRepositoryError {
    match classify_diesel_error(error, "rename course") {
        DieselFailure::Unique { .. } => CourseRepositoryError::duplicate_title(title.as_str()),
        DieselFailure::Connection(message) => CourseRepositoryError::connection(message),
        DieselFailure::Query(message) => CourseRepositoryError::query(message),
        DieselFailure::ForeignKey => {
            CourseRepositoryError::query("unexpected foreign key violation on rename")
        }
    }
}

async fn load_course(
    conn: &mut AsyncPgConnection,
    id: CourseId,
) -> Result<Option<Course>, CourseRepositoryError> {
    let row: Option<(CourseRow, CategoryRow)> = courses::table
        .inner_join(categories::table)
        .filter(courses::id.eq(id.get()))
        .select((CourseRow::as_select(), CategoryRow::as_select()))
        .first(conn)
        .await
        .optional()
        .map_err(map_read_error)?;
    Ok(row.map(|(course, category)| course.into_course(category)))
}

macro_rules! then_order {
    ($query:expr, $column:expr, $direction:expr) => {
        match $direction {
            SortDirection::Ascending => $query.then_order_by($column.asc()),
            SortDirection::Descending => $query.then_order_by($column.desc()),
        }
    };
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn list(&self, plan: &CourseListPlan) -> Result<Vec<Course>, CourseRepositoryError> {
        let window = plan.window();
        let offset = i64::try_from(window.offset())
            .map_err(|_| CourseRepositoryError::query("page offset exceeds database range"))?;

        let mut query = courses::table
            .inner_join(categories::table)
            .select((CourseRow::as_select(), CategoryRow::as_select()))
            .into_boxed();

        for filter in plan.filters() {
            query = match filter {
                CourseFilter::TitleContains(needle) => {
                    query.filter(courses::title.ilike(contains_pattern(needle)))
                }
                CourseFilter::PriceAtMost(ceiling) => {
                    query.filter(courses::price.le(ceiling.amount()))
                }
            };
        }

        for key in plan.ordering() {
            query = match key.field {
                SortField::Id => then_order!(query, courses::id, key.direction),
                SortField::Title => then_order!(query, courses::title, key.direction),
                SortField::Instructor => then_order!(query, courses::instructor, key.direction),
                SortField::Price => then_order!(query, courses::price, key.direction),
                SortField::Category => then_order!(query, courses::category_id, key.direction),
            };
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(CourseRow, CategoryRow)> = query
            .then_order_by(courses::id.asc())
            .limit(i64::from(window.limit()))
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_read_error)?;

        Ok(rows
            .into_iter()
            .map(|(course, category)| course.into_course(category))
            .collect())
    }

    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_course(&mut conn, id).await
    }

    async fn find_conflicts(
        &self,
        title: &CourseTitle,
        price: Option<Price>,
        exclude: Option<CourseId>,
    ) -> Result<CourseConflicts, CourseRepositoryError> {
        let mut query = courses::table
            .filter(courses::title.eq(title.as_str()))
            .select(courses::price)
            .into_boxed();
        if let Some(id) = exclude {
            query = query.filter(courses::id.ne(id.get()));
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let prices: Vec<Decimal> = query.load(&mut conn).await.map_err(map_read_error)?;

        Ok(CourseConflicts {
            title_taken: !prices.is_empty(),
            combination_taken: price
                .is_some_and(|candidate| prices.iter().any(|stored| *stored == candidate.amount())),
        })
    }

    async fn create(&self, course: &NewCourse) -> Result<Course, CourseRepositoryError> {
        let row = NewCourseRow {
            title: course.title.as_str(),
            instructor: course.instructor.as_str(),
            price: course.price.amount(),
            category_id: course.category_id.get(),
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id: i64 = diesel::insert_into(courses::table)
            .values(&row)
            .returning(courses::id)
            .get_result(&mut conn)
            .await
            .map_err(|err| map_insert_error(err, course))?;

        load_course(&mut conn, CourseId::new(id))
            .await?
            .ok_or_else(|| CourseRepositoryError::query("inserted course could not be read back"))
    }

    async fn rename(
        &self,
        id: CourseId,
        title: &CourseTitle,
    ) -> Result<Course, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated: Option<i64> = diesel::update(courses::table.filter(courses::id.eq(id.get())))
            .set(courses::title.eq(title.as_str()))
            .returning(courses::id)
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_rename_error(err, title))?;
        if updated.is_none() {
            return Err(CourseRepositoryError::not_found(id.get()));
        }

        load_course(&mut conn, id)
            .await?
            .ok_or_else(|| CourseRepositoryError::not_found(id.get()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;
    use std::str::FromStr;

    use crate::domain::CategoryId;

    struct Info(Option<&'static str>);

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "constraint violated"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("courses")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.0
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info(constraint)))
    }

    fn course() -> NewCourse {
        NewCourse {
            title: CourseTitle::from_stored("Intro to Rust"),
            instructor: String::new(),
            price: Price::new(Decimal::from_str("20").expect("decimal")),
            category_id: CategoryId::new(7),
        }
    }

    #[rstest]
    #[case(Some("courses_title_price_key"), "duplicate_combination")]
    #[case(Some("courses_title_key"), "duplicate_title")]
    #[case(None, "duplicate_title")]
    fn unique_violations_name_the_clashing_constraint(
        #[case] constraint: Option<&'static str>,
        #[case] expected: &str,
    ) {
        let err = map_insert_error(
            db_error(DatabaseErrorKind::UniqueViolation, constraint),
            &course(),
        );
        let actual = match err {
            CourseRepositoryError::DuplicateCombination { .. } => "duplicate_combination",
            CourseRepositoryError::DuplicateTitle { .. } => "duplicate_title",
            other => panic!("unexpected error: {other:?}"),
        };
        assert_eq!(actual, expected);
    }

    #[rstest]
    fn foreign_key_violations_report_the_category() {
        let err = map_insert_error(
            db_error(DatabaseErrorKind::ForeignKeyViolation, Some("courses_category_id_fkey")),
            &course(),
        );
        assert_eq!(err, CourseRepositoryError::unknown_category(7));
    }

    #[rstest]
    fn closed_connections_map_to_connection_errors() {
        let err = map_read_error(db_error(DatabaseErrorKind::ClosedConnection, None));
        assert!(matches!(err, CourseRepositoryError::Connection { .. }));
    }
}
