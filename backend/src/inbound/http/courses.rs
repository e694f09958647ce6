//! Course HTTP handlers.
//!
//! ```text
//! GET  /api/courses?title=&price=&ordering=&perpage=&page=
//! POST /api/courses {"title":"...","price":"25.00","category_id":1}
//! GET  /api/courses/{id}
//! PUT  /api/courses/{id} {"title":"..."}
//! ```

use std::str::FromStr;

use actix_web::{HttpRequest, HttpResponse, get, post, put, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    AccessPolicy, Course, CourseDraft, CourseId, CourseListParams, FieldInput,
    FieldViolation, NON_FIELD_ERRORS, ValidationFailure, ViolationReason,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::admit;
use crate::inbound::http::categories::CategoryResponse;
use crate::inbound::http::schemas::{ErrorSchema, MessageResponse};
use crate::inbound::http::state::HttpState;

/// Acknowledgement returned after a course is stored.
pub const CREATED_MESSAGE: &str = "data created successfully";

/// Raw listing parameters. Every value is interpreted by the domain.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseListQuery {
    /// Case-insensitive title substring.
    pub title: Option<String>,
    /// Inclusive price ceiling.
    pub price: Option<String>,
    /// Comma separated fields; `-` prefix sorts descending.
    #[param(example = "price,-title")]
    pub ordering: Option<String>,
    /// Page size, capped at 10.
    pub perpage: Option<String>,
    /// 1-based page number.
    pub page: Option<String>,
}

impl From<CourseListQuery> for CourseListParams {
    fn from(query: CourseListQuery) -> Self {
        Self {
            title: query.title,
            price: query.price,
            ordering: query.ordering,
            perpage: query.perpage,
            page: query.page,
        }
    }
}

/// Serialized course with derived tax-inclusive price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CourseResponse {
    /// Store-assigned identifier.
    pub id: i64,
    /// Sanitised title.
    pub title: String,
    /// Base price as an exact decimal string.
    #[schema(example = "10")]
    pub price: String,
    /// `price * 1.1`, exact.
    #[schema(example = "11.0")]
    pub price_after_tax: String,
    /// Category the course belongs to.
    pub category: CategoryResponse,
}

impl From<&Course> for CourseResponse {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id().get(),
            title: course.title().as_str().to_owned(),
            price: course.price().amount().to_string(),
            price_after_tax: course.price_after_tax().to_string(),
            category: CategoryResponse::from(course.category()),
        }
    }
}

/// Course write payload, documented for OpenAPI. Handlers read the body as
/// loose JSON so type mismatches become field errors.
#[derive(Debug, Deserialize, ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct CourseWriteRequest {
    #[schema(example = "Introduction to Rust")]
    title: String,
    #[schema(value_type = String, example = "25.00")]
    price: String,
    category_id: i64,
    instructor: Option<String>,
}

/// Title replacement payload.
#[derive(Debug, Deserialize, ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct CourseTitleRequest {
    #[schema(example = "Ownership in Practice")]
    title: String,
}

fn text_field(body: &Map<String, Value>, name: &str) -> FieldInput<String> {
    match body.get(name) {
        None | Some(Value::Null) => FieldInput::Missing,
        Some(Value::String(text)) => FieldInput::Present(text.clone()),
        Some(Value::Number(number)) => FieldInput::Present(number.to_string()),
        Some(_) => FieldInput::Malformed,
    }
}

fn decimal_field(body: &Map<String, Value>, name: &str) -> FieldInput<Decimal> {
    let raw = match body.get(name) {
        None | Some(Value::Null) => return FieldInput::Missing,
        Some(Value::String(text)) => text.trim().to_owned(),
        Some(Value::Number(number)) => number.to_string(),
        Some(_) => return FieldInput::Malformed,
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_or(FieldInput::Malformed, FieldInput::Present)
}

fn integer_field(body: &Map<String, Value>, name: &str) -> FieldInput<i64> {
    match body.get(name) {
        None | Some(Value::Null) => FieldInput::Missing,
        Some(Value::Number(number)) => number
            .as_i64()
            .map_or(FieldInput::Malformed, FieldInput::Present),
        Some(Value::String(text)) => text
            .trim()
            .parse()
            .map_or(FieldInput::Malformed, FieldInput::Present),
        Some(_) => FieldInput::Malformed,
    }
}

fn expect_object(body: &Value) -> ApiResult<&Map<String, Value>> {
    body.as_object().ok_or_else(|| {
        ValidationFailure::new(vec![FieldViolation::new(
            NON_FIELD_ERRORS,
            ViolationReason::Invalid,
            "Invalid data. Expected a dictionary.",
        )])
        .into()
    })
}

/// Decode a course write body into a draft without judging the values.
pub fn course_draft_from_json(body: &Value) -> ApiResult<CourseDraft> {
    let object = expect_object(body)?;
    let instructor = match text_field(object, "instructor") {
        FieldInput::Present(text) => Some(text),
        FieldInput::Missing | FieldInput::Malformed => None,
    };
    Ok(CourseDraft {
        title: text_field(object, "title"),
        instructor,
        price: decimal_field(object, "price"),
        category_id: integer_field(object, "category_id"),
    })
}

/// List courses through the filter, order and page pipeline.
#[utoipa::path(
    get,
    path = "/api/courses",
    params(CourseListQuery),
    responses(
        (status = 200, description = "One page of courses", body = [CourseResponse]),
        (status = 400, description = "Malformed query parameter", body = ErrorSchema),
        (status = 429, description = "Throttled", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "listCourses"
)]
#[get("/courses")]
pub async fn list_courses(
    request: HttpRequest,
    state: web::Data<HttpState>,
    query: web::Query<CourseListQuery>,
) -> ApiResult<web::Json<Vec<CourseResponse>>> {
    admit(&request, &state, &AccessPolicy::BROWSING).await?;
    let params = CourseListParams::from(query.into_inner());
    let courses = state.courses.list_courses(&params).await?;
    Ok(web::Json(courses.iter().map(CourseResponse::from).collect()))
}

/// Validate and store a new course.
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CourseWriteRequest,
    responses(
        (status = 201, description = "Course stored", body = MessageResponse),
        (status = 400, description = "Rejected write with per-field errors", body = ErrorSchema),
        (status = 429, description = "Throttled", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "createCourse"
)]
#[post("/courses")]
pub async fn create_course(
    request: HttpRequest,
    state: web::Data<HttpState>,
    body: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    admit(&request, &state, &AccessPolicy::BROWSING).await?;
    let draft = course_draft_from_json(&body)?;
    let course = state.course_commands.create_course(draft).await?;
    info!(course_id = %course.id(), "course created");
    Ok(HttpResponse::Created().json(MessageResponse::new(CREATED_MESSAGE)))
}

/// Fetch one course.
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Course", body = CourseResponse),
        (status = 404, description = "Unknown course", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "getCourse"
)]
#[get("/courses/{id}")]
pub async fn get_course(
    request: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<CourseResponse>> {
    admit(&request, &state, &AccessPolicy::PUBLIC).await?;
    let course = state.courses.get_course(CourseId::new(path.into_inner())).await?;
    Ok(web::Json(CourseResponse::from(&course)))
}

/// Replace a course title.
#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course identifier")),
    request_body = CourseTitleRequest,
    responses(
        (status = 200, description = "Renamed course", body = CourseResponse),
        (status = 400, description = "Rejected title", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not an instructor", body = ErrorSchema),
        (status = 404, description = "Unknown course", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "renameCourse",
    security(("token" = []))
)]
#[put("/courses/{id}")]
pub async fn rename_course(
    request: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> ApiResult<web::Json<CourseResponse>> {
    let caller = admit(&request, &state, &AccessPolicy::INSTRUCTORS).await?;
    let title = text_field(expect_object(&body)?, "title");
    let id = CourseId::new(path.into_inner());
    let course = state.course_commands.rename_course(id, title).await?;
    info!(
        course_id = %id,
        username = caller.principal().map(|p| p.username()),
        "course renamed"
    );
    Ok(web::Json(CourseResponse::from(&course)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    use crate::domain::ErrorCode;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).expect("decimal")
    }

    #[rstest]
    fn drafts_read_loose_json() {
        let draft = course_draft_from_json(&json!({
            "title": "Introduction to Rust",
            "price": "25.50",
            "category_id": "3",
        }))
        .expect("object body");
        assert_eq!(
            draft.title,
            FieldInput::Present("Introduction to Rust".to_owned())
        );
        assert_eq!(draft.price, FieldInput::Present(dec("25.50")));
        assert_eq!(draft.category_id, FieldInput::Present(3));
        assert_eq!(draft.instructor, None);
    }

    #[rstest]
    #[case(json!(10), FieldInput::Present(dec("10")))]
    #[case(json!(10.5), FieldInput::Present(dec("10.5")))]
    #[case(json!(" 12 "), FieldInput::Present(dec("12")))]
    #[case(json!("ten"), FieldInput::Malformed)]
    #[case(json!([10]), FieldInput::Malformed)]
    #[case(json!(null), FieldInput::Missing)]
    fn prices_parse_without_floating_point(
        #[case] raw: Value,
        #[case] expected: FieldInput<Decimal>,
    ) {
        let draft = course_draft_from_json(&json!({ "price": raw })).expect("object body");
        assert_eq!(draft.price, expected);
    }

    #[rstest]
    #[case(json!(4), FieldInput::Present(4))]
    #[case(json!(4.5), FieldInput::Malformed)]
    #[case(json!("x"), FieldInput::Malformed)]
    #[case(json!({"id": 4}), FieldInput::Malformed)]
    fn category_ids_must_be_integers(#[case] raw: Value, #[case] expected: FieldInput<i64>) {
        let draft = course_draft_from_json(&json!({ "category_id": raw })).expect("object body");
        assert_eq!(draft.category_id, expected);
    }

    #[rstest]
    fn non_object_bodies_are_rejected_as_a_whole() {
        let err = course_draft_from_json(&json!(["title"])).expect_err("array body");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert!(
            err.field_errors()
                .is_some_and(|errors| errors.contains_key(NON_FIELD_ERRORS))
        );
    }

    #[rstest]
    fn listing_query_maps_every_parameter() {
        let params = CourseListParams::from(CourseListQuery {
            title: Some("rust".to_owned()),
            price: Some("50".to_owned()),
            ordering: Some("-price".to_owned()),
            perpage: Some("5".to_owned()),
            page: Some("2".to_owned()),
        });
        assert_eq!(params.title.as_deref(), Some("rust"));
        assert_eq!(params.price.as_deref(), Some("50"));
        assert_eq!(params.ordering.as_deref(), Some("-price"));
        assert_eq!(params.perpage.as_deref(), Some("5"));
        assert_eq!(params.page.as_deref(), Some("2"));
    }
}
