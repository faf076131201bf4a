//! Admin-gated product catalog routes.
//!
//! Create and update accept `multipart/form-data` so that an image can
//! be uploaded alongside the product fields. Uploaded files get a
//! unique name and are served back under `/uploads/`.

use std::path::Path;

use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path as UrlPath, State};
use axum::http::StatusCode;
use mercado_auth::require_role;
use mercado_core::models::product::{CreateProduct, Product, UpdateProduct};
use mercado_core::models::user::Role;
use mercado_core::repository::ProductRepository;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::AuthSession;
use crate::state::AppState;

/// Product fields collected from a multipart form. Everything is
/// optional at this stage; create and update enforce their own
/// requirements.
#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    stock: Option<i64>,
    image: Option<String>,
}

async fn field_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid form field: {e}")))
}

/// Write an uploaded image under the uploads directory with a unique
/// name, keeping the original extension. Returns the server-relative
/// path stored on the product.
async fn save_upload(
    uploads_dir: &Path,
    original_name: Option<&str>,
    bytes: &[u8],
) -> Result<String, ApiError> {
    let ext = original_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let file_name = format!("{}{}", Uuid::new_v4(), ext);

    tokio::fs::create_dir_all(uploads_dir)
        .await
        .map_err(|e| ApiError::Internal(format!("creating uploads dir: {e}")))?;
    tokio::fs::write(uploads_dir.join(&file_name), bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("writing upload: {e}")))?;

    Ok(format!("/uploads/{file_name}"))
}

async fn read_form(multipart: &mut Multipart, uploads_dir: &Path) -> Result<ProductForm, ApiError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match name.as_str() {
            "name" => form.name = Some(field_text(field).await?),
            "description" => form.description = Some(field_text(field).await?),
            "price" => {
                let raw = field_text(field).await?;
                form.price = Some(raw.trim().parse().map_err(|_| {
                    ApiError::BadRequest("price must be a number".into())
                })?);
            }
            "stock" => {
                let raw = field_text(field).await?;
                form.stock = Some(raw.trim().parse().map_err(|_| {
                    ApiError::BadRequest("stock must be an integer".into())
                })?);
            }
            "image" => {
                let original_name = field.file_name().map(str::to_owned);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("invalid image upload: {e}")))?;
                // An empty file part means no image was chosen.
                if !bytes.is_empty() {
                    form.image =
                        Some(save_upload(uploads_dir, original_name.as_deref(), &bytes).await?);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// `GET /api/products` — any valid session. Returns the whole catalog.
pub async fn list(
    State(state): State<AppState>,
    AuthSession(_claims): AuthSession,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.products.list().await?;
    Ok(Json(products))
}

/// `POST /api/products` — admin only, multipart with optional image.
pub async fn create(
    State(state): State<AppState>,
    AuthSession(claims): AuthSession,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_role(&claims, Role::Admin)?;

    let form = read_form(&mut multipart, &state.uploads_dir).await?;
    let (Some(name), Some(description), Some(price), Some(stock)) =
        (form.name, form.description, form.price, form.stock)
    else {
        return Err(ApiError::BadRequest("Missing product fields".into()));
    };

    let product = state
        .products
        .create(CreateProduct {
            name,
            description,
            price,
            stock,
            image: form.image,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Product created successfully",
            "product": product,
        })),
    ))
}

/// `PUT /api/products/:id` — admin only; replaces only supplied
/// fields, and the image only when a new one was uploaded.
pub async fn update(
    State(state): State<AppState>,
    AuthSession(claims): AuthSession,
    UrlPath(id): UrlPath<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    require_role(&claims, Role::Admin)?;

    let form = read_form(&mut multipart, &state.uploads_dir).await?;
    let product = state
        .products
        .update(
            id,
            UpdateProduct {
                name: form.name,
                description: form.description,
                price: form.price,
                stock: form.stock,
                image: form.image,
            },
        )
        .await?;

    Ok(Json(json!({
        "message": "Product updated successfully",
        "product": product,
    })))
}

/// `DELETE /api/products/:id` — admin only.
pub async fn remove(
    State(state): State<AppState>,
    AuthSession(claims): AuthSession,
    UrlPath(id): UrlPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_role(&claims, Role::Admin)?;

    state.products.delete(id).await?;
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}
