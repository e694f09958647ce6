//! Tests for the in-memory catalogue store.

use super::*;
use crate::domain::{CategoryDraft, CourseListParams};
use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use std::str::FromStr;

fn new_course(title: &str, price: &str, category: CategoryId) -> NewCourse {
    NewCourse {
        title: CourseTitle::from_stored(title),
        instructor: String::new(),
        price: Price::new(Decimal::from_str(price).expect("decimal")),
        category_id: category,
    }
}

fn plan(ordering: Option<&str>) -> CourseListPlan {
    CourseListPlan::parse(&CourseListParams {
        ordering: ordering.map(str::to_owned),
        perpage: Some("10".to_owned()),
        ..CourseListParams::default()
    })
    .expect("valid plan")
}

async fn seed_category(store: &InMemoryCatalogueStore, slug: &str) -> Category {
    let category = NewCategory::try_from(CategoryDraft {
        slug: slug.to_owned(),
        title: slug.to_uppercase(),
    })
    .expect("valid category");
    CategoryRepository::create(store, &category)
        .await
        .expect("category stored")
}

#[fixture]
fn store() -> InMemoryCatalogueStore {
    InMemoryCatalogueStore::new()
}

#[rstest]
#[tokio::test]
async fn ordering_ties_keep_insertion_order(store: InMemoryCatalogueStore) {
    let web = seed_category(&store, "web").await;
    for (title, price) in [("Course A title", "20"), ("Course B title", "10"), ("Course C title", "10")] {
        CourseRepository::create(&store, &new_course(title, price, web.id()))
            .await
            .expect("course stored");
    }

    let listed = CourseRepository::list(&store, &plan(Some("price"))).await.expect("listed");
    let titles: Vec<&str> = listed.iter().map(|course| course.title().as_str()).collect();
    assert_eq!(titles, vec!["Course B title", "Course C title", "Course A title"]);
}

#[rstest]
#[tokio::test]
async fn enforces_course_constraints(store: InMemoryCatalogueStore) {
    let web = seed_category(&store, "web").await;
    CourseRepository::create(&store, &new_course("Intro to Rust", "20", web.id()))
        .await
        .expect("first course");

    let pair = CourseRepository::create(&store, &new_course("Intro to Rust", "20", web.id()))
        .await
        .expect_err("duplicate pair");
    assert!(matches!(pair, CourseRepositoryError::DuplicateCombination { .. }));

    let title = CourseRepository::create(&store, &new_course("Intro to Rust", "30", web.id()))
        .await
        .expect_err("duplicate title");
    assert!(matches!(title, CourseRepositoryError::DuplicateTitle { .. }));

    let orphan = CourseRepository::create(&store, &new_course("Orphaned course", "30", CategoryId::new(99)))
        .await
        .expect_err("unknown category");
    assert_eq!(orphan, CourseRepositoryError::unknown_category(99));
}

#[rstest]
#[tokio::test]
async fn referenced_categories_cannot_be_deleted(store: InMemoryCatalogueStore) {
    let web = seed_category(&store, "web").await;
    let spare = seed_category(&store, "spare").await;
    CourseRepository::create(&store, &new_course("Intro to Rust", "20", web.id()))
        .await
        .expect("course stored");

    let err = CategoryRepository::delete(&store, web.id())
        .await
        .expect_err("protected");
    assert_eq!(err, CategoryRepositoryError::protected(web.id().get()));
    assert!(CategoryRepository::delete(&store, spare.id()).await.expect("deleted"));
    assert!(!CategoryRepository::delete(&store, spare.id()).await.expect("already gone"));
    assert_eq!(CategoryRepository::list(&store).await.expect("listed"), vec![web]);
}

#[rstest]
#[tokio::test]
async fn conflicts_ignore_the_excluded_course(store: InMemoryCatalogueStore) {
    let web = seed_category(&store, "web").await;
    let course = CourseRepository::create(&store, &new_course("Intro to Rust", "20", web.id()))
        .await
        .expect("course stored");

    let title = CourseTitle::from_stored("Intro to Rust");
    let found = store
        .find_conflicts(&title, Some(course.price()), None)
        .await
        .expect("conflicts");
    assert!(found.title_taken && found.combination_taken);

    let excluded = store
        .find_conflicts(&title, None, Some(course.id()))
        .await
        .expect("conflicts");
    assert_eq!(excluded, CourseConflicts::default());
}

#[rstest]
#[tokio::test]
async fn rename_rejects_titles_in_use(store: InMemoryCatalogueStore) {
    let web = seed_category(&store, "web").await;
    let first = CourseRepository::create(&store, &new_course("Intro to Rust", "20", web.id()))
        .await
        .expect("first");
    CourseRepository::create(&store, &new_course("Async in Depth", "25", web.id()))
        .await
        .expect("second");

    let err = store
        .rename(first.id(), &CourseTitle::from_stored("Async in Depth"))
        .await
        .expect_err("title in use");
    assert!(matches!(err, CourseRepositoryError::DuplicateTitle { .. }));

    let renamed = store
        .rename(first.id(), &CourseTitle::from_stored("Rust for Pythonistas"))
        .await
        .expect("renamed");
    assert_eq!(renamed.title().as_str(), "Rust for Pythonistas");
    assert_eq!(renamed.price(), first.price());
}

#[rstest]
#[tokio::test]
async fn duplicate_slugs_are_rejected(store: InMemoryCatalogueStore) {
    seed_category(&store, "web").await;
    let again = NewCategory::try_from(CategoryDraft {
        slug: "web".to_owned(),
        title: "Web again".to_owned(),
    })
    .expect("valid");
    let err = CategoryRepository::create(&store, &again)
        .await
        .expect_err("duplicate slug");
    assert!(matches!(err, CategoryRepositoryError::DuplicateSlug { .. }));
}
