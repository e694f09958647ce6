//! Builders for the HTTP state: catalogue services over the selected store
//! plus the access gate.

use std::sync::Arc;

use course_catalogue::domain::ports::{CategoryRepository, CourseRepository};
use course_catalogue::domain::{AccessGate, CategoryCatalogueService, CourseCatalogueService};
use course_catalogue::inbound::http::state::{HttpState, HttpStatePorts};
use course_catalogue::outbound::auth::StaticAccountAuthenticator;
use course_catalogue::outbound::markup::MarkupCleaner;
use course_catalogue::outbound::memory::InMemoryCatalogueStore;
use course_catalogue::outbound::persistence::{DieselCategoryRepository, DieselCourseRepository};
use course_catalogue::outbound::throttle::GovernorRateLimiter;

use super::ServerConfig;

/// Wire course and category services over one pair of repositories.
fn catalogue_ports<C, K>(courses: Arc<C>, categories: Arc<K>) -> HttpStatePorts
where
    C: CourseRepository + 'static,
    K: CategoryRepository + 'static,
{
    let course_service = Arc::new(CourseCatalogueService::new(
        courses,
        Arc::clone(&categories),
        Arc::new(MarkupCleaner::new()),
    ));
    let category_service = Arc::new(CategoryCatalogueService::new(categories));
    HttpStatePorts {
        courses: course_service.clone(),
        course_commands: course_service,
        categories: category_service.clone(),
        category_commands: category_service,
    }
}

fn build_ports(config: &ServerConfig) -> HttpStatePorts {
    match &config.db_pool {
        Some(pool) => catalogue_ports(
            Arc::new(DieselCourseRepository::new(pool.clone())),
            Arc::new(DieselCategoryRepository::new(pool.clone())),
        ),
        None => {
            let store = Arc::new(InMemoryCatalogueStore::new());
            catalogue_ports(store.clone(), store)
        }
    }
}

fn build_access_gate(config: &ServerConfig) -> AccessGate {
    AccessGate::new(
        Arc::new(StaticAccountAuthenticator::new(config.accounts.clone())),
        Arc::new(GovernorRateLimiter::new()),
        config.rates.clone(),
    )
}

/// Build the shared handler state from the server configuration.
pub(super) fn build_http_state(config: &ServerConfig) -> HttpState {
    HttpState::new(build_ports(config), build_access_gate(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_catalogue::domain::{CategoryDraft, ThrottleRates};
    use course_catalogue::outbound::auth::DEFAULT_ACCOUNTS;
    use rstest::rstest;

    fn memory_config() -> ServerConfig {
        ServerConfig::new(
            "127.0.0.1:0".parse().expect("socket address"),
            DEFAULT_ACCOUNTS.parse().expect("accounts"),
            ThrottleRates::default(),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn memory_ports_share_one_store() {
        let state = build_http_state(&memory_config());
        state
            .category_commands
            .create_category(CategoryDraft {
                slug: "web".to_owned(),
                title: "Web development".to_owned(),
            })
            .await
            .expect("category stored");

        let listed = state.categories.list_categories().await.expect("list");
        assert_eq!(listed.len(), 1);
    }
}
