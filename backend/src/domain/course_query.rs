//! Course listing pipeline.
//!
//! Raw query parameters are interpreted into an ordered list of stages:
//! filters first, then an optional multi-key ordering, then a page window.
//! Store adapters receive the finished [`CourseListPlan`] and execute it;
//! [`CourseListPlan::apply`] is the reference execution over an in-memory
//! collection already in natural storage order.

use std::cmp::Ordering;
use std::str::FromStr;

use pagination::{MAX_PAGE_SIZE, PageNumber, PageSize, PageWindow};
use rust_decimal::Decimal;
use serde_json::json;

use super::course::{Course, Price};
use super::error::Error;

/// Raw, untrusted listing parameters exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseListParams {
    /// Case-insensitive title substring.
    pub title: Option<String>,
    /// Inclusive price ceiling.
    pub price: Option<String>,
    /// Comma-separated ordering keys.
    pub ordering: Option<String>,
    /// Page size.
    pub perpage: Option<String>,
    /// One-based page number.
    pub page: Option<String>,
}

/// Reason a listing parameter was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidParameter {
    /// `price` is not a decimal.
    #[error("price must be a decimal number")]
    Price {
        /// Rejected input.
        value: String,
    },
    /// `perpage` is not a positive integer.
    #[error("perpage must be a positive integer")]
    PerPage {
        /// Rejected input.
        value: String,
    },
    /// `page` is not an integer.
    #[error("page must be an integer")]
    Page {
        /// Rejected input.
        value: String,
    },
    /// `ordering` names an unknown field.
    #[error("cannot order by unknown field `{field}`")]
    OrderingField {
        /// Unknown field name.
        field: String,
    },
}

impl InvalidParameter {
    /// Query parameter the failure refers to.
    pub fn parameter(&self) -> &'static str {
        match self {
            Self::Price { .. } => "price",
            Self::PerPage { .. } => "perpage",
            Self::Page { .. } => "page",
            Self::OrderingField { .. } => "ordering",
        }
    }

    fn value(&self) -> &str {
        match self {
            Self::Price { value } | Self::PerPage { value } | Self::Page { value } => value,
            Self::OrderingField { field } => field,
        }
    }
}

impl From<InvalidParameter> for Error {
    fn from(err: InvalidParameter) -> Self {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": err.parameter(),
            "value": err.value(),
            "code": "invalid_parameter",
        }))
    }
}

/// Fields a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    /// Store-assigned identifier.
    Id,
    /// Title, compared bytewise.
    Title,
    /// Instructor name.
    Instructor,
    /// Base price.
    Price,
    /// Category identifier.
    Category,
}

impl SortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "instructor" => Some(Self::Instructor),
            "price" => Some(Self::Price),
            "category" | "category_id" => Some(Self::Category),
            _ => None,
        }
    }

    fn compare(self, left: &Course, right: &Course) -> Ordering {
        match self {
            Self::Id => left.id().cmp(&right.id()),
            Self::Title => left.title().as_str().cmp(right.title().as_str()),
            Self::Instructor => left.instructor().cmp(right.instructor()),
            Self::Price => left.price().cmp(&right.price()),
            Self::Category => left.category().id().cmp(&right.category().id()),
        }
    }
}

/// Direction of one ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// One ordering key; a leading `-` in the request selects descending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortKey {
    /// Field compared.
    pub field: SortField,
    /// Comparison direction.
    pub direction: SortDirection,
}

impl FromStr for SortKey {
    type Err = InvalidParameter;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (direction, name) = match raw.strip_prefix('-') {
            Some(rest) => (SortDirection::Descending, rest),
            None => (SortDirection::Ascending, raw),
        };
        let field = SortField::parse(name).ok_or_else(|| InvalidParameter::OrderingField {
            field: raw.to_owned(),
        })?;
        Ok(Self { field, direction })
    }
}

impl SortKey {
    fn compare(&self, left: &Course, right: &Course) -> Ordering {
        let ordering = self.field.compare(left, right);
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Predicate applied before ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseFilter {
    /// Case-insensitive substring match on the title.
    TitleContains(String),
    /// Inclusive price ceiling.
    PriceAtMost(Price),
}

impl CourseFilter {
    fn matches(&self, course: &Course) -> bool {
        match self {
            Self::TitleContains(needle) => course
                .title()
                .as_str()
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Self::PriceAtMost(ceiling) => course.price() <= *ceiling,
        }
    }
}

/// One step of the listing pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStage {
    /// Keep matching courses.
    Filter(CourseFilter),
    /// Stable sort by the keys in priority order.
    Order(Vec<SortKey>),
    /// Cut one page out of the result.
    Page(PageWindow),
}

/// Ordered listing pipeline handed to the course store.
///
/// ## Invariants
/// - Filter stages precede the order stage, which precedes the single page
///   stage that always closes the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseListPlan {
    stages: Vec<PipelineStage>,
}

impl CourseListPlan {
    /// Interpret raw request parameters.
    ///
    /// # Examples
    /// ```
    /// use course_catalogue::domain::{CourseListParams, CourseListPlan};
    ///
    /// let params = CourseListParams {
    ///     perpage: Some("50".to_owned()),
    ///     ..CourseListParams::default()
    /// };
    /// let plan = CourseListPlan::parse(&params).expect("valid parameters");
    /// assert_eq!(plan.window().limit(), 10);
    /// ```
    pub fn parse(params: &CourseListParams) -> Result<Self, InvalidParameter> {
        let mut stages = Vec::new();

        if let Some(title) = non_empty(params.title.as_deref()) {
            stages.push(PipelineStage::Filter(CourseFilter::TitleContains(
                title.to_owned(),
            )));
        }
        if let Some(raw) = non_empty(params.price.as_deref()) {
            let ceiling = Decimal::from_str(raw.trim()).map_err(|_| InvalidParameter::Price {
                value: raw.to_owned(),
            })?;
            stages.push(PipelineStage::Filter(CourseFilter::PriceAtMost(Price::new(
                ceiling,
            ))));
        }
        if let Some(raw) = non_empty(params.ordering.as_deref()) {
            let keys = parse_ordering(raw)?;
            if !keys.is_empty() {
                stages.push(PipelineStage::Order(keys));
            }
        }
        stages.push(PipelineStage::Page(parse_window(params)?));

        Ok(Self { stages })
    }

    /// Stages in execution order.
    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    /// Filter predicates, in request order.
    pub fn filters(&self) -> impl Iterator<Item = &CourseFilter> {
        self.stages.iter().filter_map(|stage| match stage {
            PipelineStage::Filter(filter) => Some(filter),
            _ => None,
        })
    }

    /// Ordering keys by priority; empty when natural order applies.
    pub fn ordering(&self) -> &[SortKey] {
        self.stages
            .iter()
            .find_map(|stage| match stage {
                PipelineStage::Order(keys) => Some(keys.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Page window closing the plan.
    pub fn window(&self) -> PageWindow {
        self.stages
            .iter()
            .find_map(|stage| match stage {
                PipelineStage::Page(window) => Some(*window),
                _ => None,
            })
            .unwrap_or_else(|| PageWindow::new(PageSize::default(), PageNumber::default()))
    }

    /// Execute the plan over `courses`, which must be in natural storage
    /// order. Ordering is a stable sort, so ties keep that order.
    pub fn apply(&self, mut courses: Vec<Course>) -> Vec<Course> {
        for stage in &self.stages {
            courses = match stage {
                PipelineStage::Filter(filter) => courses
                    .into_iter()
                    .filter(|course| filter.matches(course))
                    .collect(),
                PipelineStage::Order(keys) => {
                    courses.sort_by(|left, right| {
                        keys.iter()
                            .map(|key| key.compare(left, right))
                            .find(|ordering| ordering.is_ne())
                            .unwrap_or(Ordering::Equal)
                    });
                    courses
                }
                PipelineStage::Page(window) => window.slice(&courses).to_vec(),
            };
        }
        courses
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|raw| !raw.is_empty())
}

fn parse_ordering(raw: &str) -> Result<Vec<SortKey>, InvalidParameter> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(SortKey::from_str)
        .collect()
}

fn parse_window(params: &CourseListParams) -> Result<PageWindow, InvalidParameter> {
    let size = match non_empty(params.perpage.as_deref()) {
        Some(raw) => {
            let requested: i64 = raw.trim().parse().map_err(|_| InvalidParameter::PerPage {
                value: raw.to_owned(),
            })?;
            PageSize::clamped(requested, MAX_PAGE_SIZE).map_err(|_| InvalidParameter::PerPage {
                value: raw.to_owned(),
            })?
        }
        None => PageSize::default(),
    };
    let number = match non_empty(params.page.as_deref()) {
        Some(raw) => PageNumber::new(raw.trim().parse().map_err(|_| InvalidParameter::Page {
            value: raw.to_owned(),
        })?),
        None => PageNumber::default(),
    };
    Ok(PageWindow::new(size, number))
}
