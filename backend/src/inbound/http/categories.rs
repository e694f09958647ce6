//! Category HTTP handlers.
//!
//! ```text
//! GET    /api/categories
//! POST   /api/categories {"slug":"web","title":"Web development"}
//! DELETE /api/categories/{id}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{AccessPolicy, Category, CategoryDraft, CategoryId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::admit;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Serialized category, also nested inside course representations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    /// Store-assigned identifier.
    pub id: i64,
    /// URL-safe unique name.
    #[schema(example = "web")]
    pub slug: String,
    /// Display title.
    #[schema(example = "Web development")]
    pub title: String,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id().get(),
            slug: category.slug().to_owned(),
            title: category.title().to_owned(),
        }
    }
}

/// Category creation payload. Absent fields are validated as blank.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CategoryRequest {
    /// Requested slug.
    pub slug: Option<String>,
    /// Requested title.
    pub title: Option<String>,
}

impl From<CategoryRequest> for CategoryDraft {
    fn from(request: CategoryRequest) -> Self {
        Self {
            slug: request.slug.unwrap_or_default(),
            title: request.title.unwrap_or_default(),
        }
    }
}

/// List every category.
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Categories in id order", body = [CategoryResponse])
    ),
    tags = ["categories"],
    operation_id = "listCategories"
)]
#[get("/categories")]
pub async fn list_categories(
    request: HttpRequest,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CategoryResponse>>> {
    admit(&request, &state, &AccessPolicy::PUBLIC).await?;
    let categories = state.categories.list_categories().await?;
    Ok(web::Json(
        categories.iter().map(CategoryResponse::from).collect(),
    ))
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category stored", body = CategoryResponse),
        (status = 400, description = "Rejected category", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not an instructor", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "createCategory",
    security(("token" = []))
)]
#[post("/categories")]
pub async fn create_category(
    request: HttpRequest,
    state: web::Data<HttpState>,
    payload: web::Json<CategoryRequest>,
) -> ApiResult<HttpResponse> {
    admit(&request, &state, &AccessPolicy::INSTRUCTORS).await?;
    let category = state
        .category_commands
        .create_category(payload.into_inner().into())
        .await?;
    info!(category_id = %category.id(), slug = category.slug(), "category created");
    Ok(HttpResponse::Created().json(CategoryResponse::from(&category)))
}

/// Delete a category no course references.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category identifier")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not an instructor", body = ErrorSchema),
        (status = 404, description = "Unknown category", body = ErrorSchema),
        (status = 409, description = "Category still referenced by courses", body = ErrorSchema)
    ),
    tags = ["categories"],
    operation_id = "deleteCategory",
    security(("token" = []))
)]
#[delete("/categories/{id}")]
pub async fn delete_category(
    request: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    admit(&request, &state, &AccessPolicy::INSTRUCTORS).await?;
    let id = CategoryId::new(path.into_inner());
    state.category_commands.delete_category(id).await?;
    info!(category_id = %id, "category deleted");
    Ok(HttpResponse::NoContent().finish())
}
