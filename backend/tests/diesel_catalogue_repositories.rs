//! Integration tests for the Diesel course and category repositories against
//! embedded PostgreSQL.
//!
//! The suite needs the embedded PostgreSQL binaries, so it is opt-in:
//! `cargo test --test diesel_catalogue_repositories -- --ignored`. Set
//! `SKIP_TEST_CLUSTER=1` to skip when the cluster cannot start.

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use std::str::FromStr;

use course_catalogue::domain::ports::{
    CategoryRepository, CategoryRepositoryError, CourseRepository, CourseRepositoryError,
};
use course_catalogue::domain::{
    Category, CategoryDraft, CourseListParams, CourseListPlan, CourseTitle, NewCategory,
    NewCourse, Price,
};
use course_catalogue::outbound::persistence::{
    DbPool, DieselCategoryRepository, DieselCourseRepository, PoolConfig,
};
use embedded_postgres::{fresh_database, handle_cluster_setup_failure, test_cluster};
use pg_embedded_setup_unpriv::TestCluster;
use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use tokio::runtime::Runtime;

struct RepoContext {
    runtime: Runtime,
    _cluster: TestCluster,
    courses: DieselCourseRepository,
    categories: DieselCategoryRepository,
}

impl RepoContext {
    fn category(&self, slug: &str) -> Category {
        let draft = CategoryDraft {
            slug: slug.to_owned(),
            title: format!("{slug} courses"),
        };
        let new = NewCategory::try_from(draft).expect("valid category");
        self.runtime
            .block_on(self.categories.create(&new))
            .expect("create category")
    }

    fn course(&self, title: &str, price: &str, category: &Category) -> NewCourse {
        NewCourse {
            title: CourseTitle::from_stored(title),
            instructor: String::new(),
            price: Price::new(Decimal::from_str(price).expect("decimal")),
            category_id: category.id(),
        }
    }

    fn insert(&self, title: &str, price: &str, category: &Category) {
        let course = self.course(title, price, category);
        self.runtime
            .block_on(self.courses.create(&course))
            .expect("create course");
    }

    fn list_titles(&self, params: CourseListParams) -> Vec<String> {
        let plan = CourseListPlan::parse(&params).expect("valid listing parameters");
        self.runtime
            .block_on(self.courses.list(&plan))
            .expect("list courses")
            .iter()
            .map(|course| course.title().as_str().to_owned())
            .collect()
    }
}

fn setup_context(database: &str) -> Result<RepoContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    let url = fresh_database(&cluster, database)?;
    let pool = runtime
        .block_on(DbPool::new(PoolConfig::new(url).with_max_size(2)))
        .map_err(|err| err.to_string())?;
    Ok(RepoContext {
        runtime,
        _cluster: cluster,
        courses: DieselCourseRepository::new(pool.clone()),
        categories: DieselCategoryRepository::new(pool),
    })
}

#[fixture]
fn repo_context() -> Option<RepoContext> {
    match setup_context("diesel_catalogue_repositories") {
        Ok(context) => Some(context),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
#[ignore = "requires embedded PostgreSQL binaries"]
fn listing_applies_filters_ordering_and_window(repo_context: Option<RepoContext>) {
    let Some(context) = repo_context else {
        return;
    };
    let web = context.category("web");
    context.insert("Alpha Rust", "30", &web);
    context.insert("Bravo rust", "20", &web);
    context.insert("Charlie Go", "20", &web);
    context.insert("Delta RUST", "90.50", &web);

    let filtered = context.list_titles(CourseListParams {
        title: Some("rust".to_owned()),
        price: Some("30".to_owned()),
        ordering: Some("-price,title".to_owned()),
        perpage: Some("10".to_owned()),
        ..CourseListParams::default()
    });
    assert_eq!(filtered, ["Alpha Rust", "Bravo rust"]);

    let second_page = context.list_titles(CourseListParams {
        ordering: Some("price,-title".to_owned()),
        perpage: Some("2".to_owned()),
        page: Some("2".to_owned()),
        ..CourseListParams::default()
    });
    assert_eq!(second_page, ["Alpha Rust", "Delta RUST"]);
}

#[rstest]
#[ignore = "requires embedded PostgreSQL binaries"]
fn stored_prices_keep_their_precision(repo_context: Option<RepoContext>) {
    let Some(context) = repo_context else {
        return;
    };
    let data = context.category("data");
    context.insert("Statistics", "25.50", &data);

    let plan = CourseListPlan::parse(&CourseListParams::default()).expect("defaults");
    let courses = context
        .runtime
        .block_on(context.courses.list(&plan))
        .expect("list courses");
    let course = courses.first().expect("one course");
    assert_eq!(course.price().to_string(), "25.50");
    assert_eq!(course.price_after_tax().to_string(), "28.050");
    assert_eq!(course.category().slug(), "data");
}

#[rstest]
#[ignore = "requires embedded PostgreSQL binaries"]
fn conflicts_report_title_and_combination(repo_context: Option<RepoContext>) {
    let Some(context) = repo_context else {
        return;
    };
    let web = context.category("web");
    context.insert("Intro", "20", &web);
    let title = CourseTitle::from_stored("Intro");

    let same_price = context
        .runtime
        .block_on(context.courses.find_conflicts(
            &title,
            Some(Price::new(Decimal::from(20))),
            None,
        ))
        .expect("conflict lookup");
    assert!(same_price.title_taken);
    assert!(same_price.combination_taken);

    let duplicate = context
        .runtime
        .block_on(context.courses.create(&context.course("Intro", "45", &web)))
        .expect_err("unique title");
    assert!(matches!(
        duplicate,
        CourseRepositoryError::DuplicateTitle { .. } | CourseRepositoryError::DuplicateCombination { .. }
    ));
}

#[rstest]
#[ignore = "requires embedded PostgreSQL binaries"]
fn renaming_a_missing_course_is_not_found(repo_context: Option<RepoContext>) {
    let Some(context) = repo_context else {
        return;
    };
    let err = context
        .runtime
        .block_on(context.courses.rename(
            course_catalogue::domain::CourseId::new(404),
            &CourseTitle::from_stored("Anything"),
        ))
        .expect_err("no such course");
    assert_eq!(err, CourseRepositoryError::not_found(404_i64));
}

#[rstest]
#[ignore = "requires embedded PostgreSQL binaries"]
fn referenced_categories_are_protected(repo_context: Option<RepoContext>) {
    let Some(context) = repo_context else {
        return;
    };
    let systems = context.category("systems");
    let spare = context.category("spare");
    context.insert("Kernels", "50", &systems);

    let protected = context
        .runtime
        .block_on(context.categories.delete(systems.id()))
        .expect_err("referenced category");
    assert!(matches!(protected, CategoryRepositoryError::Protected { .. }));

    let deleted = context
        .runtime
        .block_on(context.categories.delete(spare.id()))
        .expect("delete spare");
    assert!(deleted);

    let remaining = context
        .runtime
        .block_on(context.categories.list())
        .expect("list categories");
    assert_eq!(remaining, vec![systems]);
}

#[rstest]
#[ignore = "requires embedded PostgreSQL binaries"]
fn duplicate_slugs_are_rejected(repo_context: Option<RepoContext>) {
    let Some(context) = repo_context else {
        return;
    };
    context.category("web");
    let again = NewCategory::try_from(CategoryDraft {
        slug: "web".to_owned(),
        title: "Web again".to_owned(),
    })
    .expect("valid category");
    let err = context
        .runtime
        .block_on(context.categories.create(&again))
        .expect_err("duplicate slug");
    assert!(matches!(err, CategoryRepositoryError::DuplicateSlug { .. }));
}
