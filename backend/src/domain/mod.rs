//! Domain primitives, services and ports.
//!
//! Purpose: define the course catalogue entities, the listing pipeline, write
//! validation and the access control chain without depending on any
//! transport or store. Adapters live under `inbound` and `outbound`.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — transport-agnostic error payload.
//! - Course, Category and their value types.
//! - CourseListPlan — ordered filter/order/page stages for listings.
//! - CourseValidator — field rules for course writes.
//! - AccessGate — authentication, capability and throttle checks.

pub mod access;
pub mod auth;
pub mod category;
pub mod category_service;
pub mod course;
pub mod course_query;
pub mod course_service;
pub mod course_validation;
pub mod error;
pub mod ports;
mod slug;
pub mod trace_id;

pub use self::access::{
    AccessDenial, AccessGate, AccessPolicy, Caller, Capability, TEN_PER_MINUTE_SCOPE,
    ThrottlePolicy, ThrottleRate, ThrottleRateParseError, ThrottleRates,
};
pub use self::auth::{AuthToken, INSTRUCTORS_GROUP, LoginCredentials, LoginValidationError, Principal};
pub use self::category::{
    Category, CategoryDraft, CategoryId, CategoryValidationError, MAX_CATEGORY_TITLE_LEN,
    NewCategory,
};
pub use self::category_service::CategoryCatalogueService;
pub use self::course::{
    Course, CourseId, CourseTitle, MAX_TEXT_LEN, MIN_COURSE_PRICE,
    MIN_TITLE_LEN, NewCourse, Price, TAX_MULTIPLIER,
};
pub use self::course_query::{
    CourseFilter, CourseListParams, CourseListPlan, InvalidParameter, PipelineStage, SortDirection,
    SortField, SortKey,
};
pub use self::course_service::CourseCatalogueService;
pub use self::course_validation::{
    CheckedCourse, CourseDraft, CourseValidator, FieldInput, FieldViolation, NON_FIELD_ERRORS,
    REJECTED_WRITE_MESSAGE, ValidationFailure, ViolationReason,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, FieldErrors, TRACE_ID_HEADER};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use course_catalogue::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
