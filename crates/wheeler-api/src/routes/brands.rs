//! # Brand Routes
//!
//! | Method | Path | Auth | Handler |
//! |---|---|---|---|
//! | GET | `/api/brand` | — | [`list_brands`] |
//! | GET | `/api/brand/{slug}` | — | [`get_brand`] |
//! | POST | `/api/brand` | admin | [`create_brand`] (multipart: `name`, `brandPictures`) |
//! | PUT | `/api/brand/{id}` | admin | [`update_brand`] |
//! | DELETE | `/api/brand/{id}` | admin | [`delete_brand`] |
//!
//! Brand names and slugs are unique. A clash on either is reported as a
//! soft failure (`200`, `success: false`, `"Brand already exists"`), so two
//! names that differ only in case or punctuation cannot share an image file
//! or a lookup key.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use wheeler_core::slugify_or;
use wheeler_media::{BlobScope, Upload};

use super::MessageResponse;
use crate::auth::AdminIdentity;
use crate::catalog::{brand_view, BrandView};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, parse_id, MultipartForm, Validate};
use crate::state::{AppState, BrandRecord};

/// Multipart field carrying the brand image.
pub const IMAGE_FIELD: &str = "brandPictures";

const NAME_REQUIRED: &str = "Brand Name is Required";
const IMAGE_REQUIRED: &str = "Brand Image is Required";
const ALREADY_EXISTS: &str = "Brand already exists";

// -- Request / response types -------------------------------------------------

/// Multipart body of `POST /api/brand` (documentation only).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct CreateBrandForm {
    pub name: String,
    #[schema(value_type = String, format = Binary)]
    pub brand_pictures: Vec<u8>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBrandRequest {
    pub name: Option<String>,
}

impl Validate for UpdateBrandRequest {
    fn validate(&self) -> Result<(), String> {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(()),
            _ => Err(NAME_REQUIRED.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandListResponse {
    pub success: bool,
    pub total_brand: usize,
    pub message: String,
    pub brands: Vec<BrandView>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BrandViewResponse {
    pub success: bool,
    pub message: String,
    pub brand: BrandView,
}

/// Stored document, returned by writes.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BrandResponse {
    pub success: bool,
    pub message: String,
    pub brand: BrandRecord,
}

// -- Router -------------------------------------------------------------------

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/brand", get(list_brands).post(create_brand))
        .route("/api/brand/", get(list_brands).post(create_brand))
        .route(
            "/api/brand/{key}",
            get(get_brand).put(update_brand).delete(delete_brand),
        )
}

// -- Handlers -----------------------------------------------------------------

/// GET /api/brand — All brands with their cars.
#[utoipa::path(
    get,
    path = "/api/brand",
    responses(
        (status = 200, description = "All brands", body = BrandListResponse),
    ),
    tag = "brands"
)]
pub async fn list_brands(State(state): State<AppState>) -> Json<BrandListResponse> {
    let brands: Vec<BrandView> = state
        .brands
        .list()
        .into_iter()
        .map(|b| brand_view(b, &state.cars))
        .collect();

    Json(BrandListResponse {
        success: true,
        total_brand: brands.len(),
        message: "All Brands".into(),
        brands,
    })
}

/// GET /api/brand/{slug} — One brand with its cars.
#[utoipa::path(
    get,
    path = "/api/brand/{slug}",
    params(("slug" = String, Path, description = "Brand slug")),
    responses(
        (status = 200, description = "Brand found", body = BrandViewResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "brands"
)]
pub async fn get_brand(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BrandViewResponse>, AppError> {
    let brand = state
        .brands
        .find(|b| b.slug == slug)
        .ok_or_else(|| AppError::NotFound("Brand not found".into()))?;

    Ok(Json(BrandViewResponse {
        success: true,
        message: "Brand Found".into(),
        brand: brand_view(brand, &state.cars),
    }))
}

/// POST /api/brand — Create a brand with its image.
///
/// Name and image are checked before anything is uploaded. The image is
/// stored as `<slug>.png` in the brands scope.
#[utoipa::path(
    post,
    path = "/api/brand",
    request_body(content = CreateBrandForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Brand created", body = BrandResponse),
        (status = 200, description = "Brand already exists (success=false)", body = crate::error::ErrorBody),
        (status = 400, description = "Name or image missing", body = crate::error::ErrorBody),
        (status = 401, description = "No or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not an admin", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "brands"
)]
pub async fn create_brand(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<BrandResponse>), AppError> {
    let mut form = MultipartForm::read(multipart).await?;

    let name = form.required("name", || NAME_REQUIRED.into())?.to_string();
    let image = form
        .take_files(IMAGE_FIELD)
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Validation(IMAGE_REQUIRED.into()))?;

    let id = Uuid::new_v4();
    let slug = slugify_or(&name, &id.simple().to_string());
    let clashes = |b: &BrandRecord| b.name == name || b.slug == slug;
    if state.brands.find(clashes).is_some() {
        return Err(AppError::Duplicate(ALREADY_EXISTS.into()));
    }

    let stored = state
        .blobs
        .put(Upload {
            scope: BlobScope::Brands,
            file_name: format!("{slug}.png"),
            content_type: image.content_type,
            bytes: image.bytes,
        })
        .await?;

    let now = Utc::now();
    let record = BrandRecord {
        id,
        name,
        slug,
        image: stored.reference,
        cars: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::brands::insert(pool, &record).await {
            if crate::db::is_unique_violation(&e) {
                return Err(AppError::Duplicate(ALREADY_EXISTS.into()));
            }
            tracing::error!(brand_id = %record.id, error = %e, "failed to persist brand to database");
            return Err(AppError::Internal("brand database persist failed".into()));
        }
    }

    if !state
        .brands
        .insert_unless(record.clone(), |b| {
            b.name == record.name || b.slug == record.slug
        })
    {
        return Err(AppError::Duplicate(ALREADY_EXISTS.into()));
    }

    tracing::info!(
        brand_id = %record.id,
        slug = %record.slug,
        admin = %admin.user_id,
        "brand created"
    );

    Ok((
        StatusCode::CREATED,
        Json(BrandResponse {
            success: true,
            message: "Brand Created Successfully".into(),
            brand: record,
        }),
    ))
}

/// PUT /api/brand/{id} — Rename a brand (slug is re-derived).
///
/// A rename onto a slug held by another brand is a duplicate.
#[utoipa::path(
    put,
    path = "/api/brand/{id}",
    params(("id" = Uuid, Path, description = "Brand ID")),
    request_body = UpdateBrandRequest,
    responses(
        (status = 200, description = "Brand updated, or slug taken (success=false)", body = BrandResponse),
        (status = 400, description = "Name missing", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "brands"
)]
pub async fn update_brand(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(key): Path<String>,
    body: Result<Json<UpdateBrandRequest>, JsonRejection>,
) -> Result<Json<BrandResponse>, AppError> {
    let id = parse_id(&key, "brand")?;
    let req = extract_validated_json(body)?;
    let name = req.name.unwrap_or_default().trim().to_string();

    if state.brands.get(&id).is_none() {
        return Err(AppError::NotFound("Brand not found".into()));
    }

    let slug = slugify_or(&name, &id.simple().to_string());
    if state
        .brands
        .find(|b| b.id != id && b.slug == slug)
        .is_some()
    {
        return Err(AppError::Duplicate(ALREADY_EXISTS.into()));
    }
    let now = Utc::now();

    if let Some(pool) = &state.db_pool {
        match crate::db::brands::update_name(pool, id, &name, &slug, now).await {
            Ok(true) => {}
            Ok(false) => return Err(AppError::NotFound("Brand not found".into())),
            Err(e) if crate::db::is_unique_violation(&e) => {
                return Err(AppError::Duplicate(ALREADY_EXISTS.into()));
            }
            Err(e) => {
                tracing::error!(brand_id = %id, error = %e, "failed to persist brand update");
                return Err(AppError::Internal("brand database update failed".into()));
            }
        }
    }

    let brand = state
        .brands
        .update(&id, |b| {
            b.name = name;
            b.slug = slug;
            b.updated_at = now;
        })
        .ok_or_else(|| AppError::NotFound("Brand not found".into()))?;

    tracing::info!(brand_id = %id, slug = %brand.slug, admin = %admin.user_id, "brand updated");

    Ok(Json(BrandResponse {
        success: true,
        message: "Brand Updated Successfully".into(),
        brand,
    }))
}

/// DELETE /api/brand/{id} — Remove a brand. Its cars are kept.
///
/// Deleting an id that does not exist still succeeds.
#[utoipa::path(
    delete,
    path = "/api/brand/{id}",
    params(("id" = Uuid, Path, description = "Brand ID")),
    responses(
        (status = 200, description = "Brand deleted", body = MessageResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "brands"
)]
pub async fn delete_brand(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&key, "brand")?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::brands::delete(pool, id).await {
            tracing::error!(brand_id = %id, error = %e, "failed to delete brand from database");
            return Err(AppError::Internal("brand database delete failed".into()));
        }
    }

    let existed = state.brands.remove(&id).is_some();
    tracing::info!(brand_id = %id, existed, admin = %admin.user_id, "brand deleted");

    Ok(Json(MessageResponse::ok("Brand Deleted Successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::auth_middleware;
    use crate::routes::test_support::{
        body_json, empty_request, json_request, state, state_with_blobs, token, Form,
    };
    use axum::middleware::from_fn_with_state;
    use std::sync::Arc;
    use tower::ServiceExt;
    use wheeler_core::{slugify, Role};
    use wheeler_media::LocalBlobStore;

    fn app(state: &AppState) -> Router {
        router()
            .layer(from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state.clone())
    }

    fn seed(state: &AppState, name: &str) -> BrandRecord {
        let now = Utc::now();
        let record = BrandRecord {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: slugify(name).unwrap(),
            image: format!("/storage/brands/{}.png", slugify(name).unwrap()),
            cars: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        state.brands.insert(record.clone());
        record
    }

    #[test]
    fn update_request_requires_name() {
        assert!(UpdateBrandRequest { name: None }.validate().is_err());
        assert!(UpdateBrandRequest { name: Some("  ".into()) }.validate().is_err());
        assert!(UpdateBrandRequest { name: Some("BMW".into()) }.validate().is_ok());
    }

    #[tokio::test]
    async fn create_stores_image_under_slug() {
        let (st, blobs) = state();
        let admin = token(&st, Role::Admin);
        let req = Form::default()
            .text("name", "Aston Martin")
            .file(IMAGE_FIELD, "logo.jpg", b"img")
            .request("POST", "/api/brand", Some(&admin));

        let resp = app(&st).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Brand Created Successfully");
        assert_eq!(body["brand"]["slug"], "aston-martin");
        assert_eq!(body["brand"]["image"], "/storage/brands/aston-martin.png");

        let uploads = blobs.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].file_name, "aston-martin.png");
        assert_eq!(uploads[0].scope, BlobScope::Brands);
        assert_eq!(st.brands.len(), 1);
    }

    #[tokio::test]
    async fn create_without_name_is_400_and_uploads_nothing() {
        let (st, blobs) = state();
        let admin = token(&st, Role::Admin);
        let req = Form::default()
            .file(IMAGE_FIELD, "logo.jpg", b"img")
            .request("POST", "/api/brand", Some(&admin));

        let resp = app(&st).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["message"], NAME_REQUIRED);
        assert!(blobs.is_empty());
        assert!(st.brands.is_empty());
    }

    #[tokio::test]
    async fn create_without_image_is_400() {
        let (st, blobs) = state();
        let admin = token(&st, Role::Admin);
        let req = Form::default()
            .text("name", "Lotus")
            .request("POST", "/api/brand", Some(&admin));

        let resp = app(&st).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["message"], IMAGE_REQUIRED);
        assert!(blobs.is_empty());
        assert!(st.brands.is_empty());
    }

    #[tokio::test]
    async fn duplicate_name_is_soft_failure() {
        let (st, blobs) = state();
        seed(&st, "Ford");
        let admin = token(&st, Role::Admin);
        let req = Form::default()
            .text("name", "Ford")
            .file(IMAGE_FIELD, "ford.png", b"img")
            .request("POST", "/api/brand", Some(&admin));

        let resp = app(&st).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], ALREADY_EXISTS);
        assert_eq!(st.brands.len(), 1);
        assert!(blobs.is_empty());
    }

    #[tokio::test]
    async fn same_slug_different_case_is_duplicate() {
        let (st, blobs) = state();
        seed(&st, "Tata Motors");
        let admin = token(&st, Role::Admin);
        let req = Form::default()
            .text("name", "TATA MOTORS")
            .file(IMAGE_FIELD, "tata.png", b"SECOND")
            .request("POST", "/api/brand", Some(&admin));

        let resp = app(&st).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], ALREADY_EXISTS);
        assert_eq!(st.brands.len(), 1);
        assert!(blobs.is_empty());
    }

    #[tokio::test]
    async fn slug_clash_keeps_first_image_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalBlobStore::new(dir.path());
        local.init().await.unwrap();
        let st = state_with_blobs(Arc::new(local));
        let admin = token(&st, Role::Admin);

        for (name, bytes) in [("Tata Motors", &b"FIRST"[..]), ("TATA MOTORS", &b"SECOND"[..])] {
            let req = Form::default()
                .text("name", name)
                .file(IMAGE_FIELD, "logo.png", bytes)
                .request("POST", "/api/brand", Some(&admin));
            app(&st).oneshot(req).await.unwrap();
        }

        let on_disk = std::fs::read(dir.path().join("brands/tata-motors.png")).unwrap();
        assert_eq!(on_disk, b"FIRST");
        assert_eq!(st.brands.len(), 1);
    }

    #[tokio::test]
    async fn unsluggable_name_falls_back_to_id() {
        let (st, blobs) = state();
        let admin = token(&st, Role::Admin);
        let req = Form::default()
            .text("name", "!!!")
            .file(IMAGE_FIELD, "logo.png", b"img")
            .request("POST", "/api/brand", Some(&admin));

        let resp = app(&st).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        let id: Uuid = serde_json::from_value(body["brand"]["id"].clone()).unwrap();
        assert_eq!(body["brand"]["slug"], id.simple().to_string());
        assert_eq!(blobs.uploads()[0].file_name, format!("{}.png", id.simple()));
    }

    #[tokio::test]
    async fn create_requires_admin() {
        let (st, _) = state();
        let form = || {
            Form::default()
                .text("name", "Mini")
                .file(IMAGE_FIELD, "mini.png", b"img")
        };

        let resp = app(&st)
            .oneshot(form().request("POST", "/api/brand", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let user = token(&st, Role::Standard);
        let resp = app(&st)
            .oneshot(form().request("POST", "/api/brand", Some(&user)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(st.brands.is_empty());
    }

    #[tokio::test]
    async fn get_by_slug_and_missing_slug() {
        let (st, _) = state();
        seed(&st, "Rolls Royce");

        let resp = app(&st)
            .oneshot(empty_request("GET", "/api/brand/rolls-royce", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["message"], "Brand Found");
        assert_eq!(body["brand"]["name"], "Rolls Royce");

        let resp = app(&st)
            .oneshot(empty_request("GET", "/api/brand/nope", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_reports_total() {
        let (st, _) = state();
        seed(&st, "Kia");
        seed(&st, "Hyundai");

        let resp = app(&st)
            .oneshot(empty_request("GET", "/api/brand/", None))
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["totalBrand"], 2);
        assert_eq!(body["brands"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_renames_and_reslugs() {
        let (st, _) = state();
        let brand = seed(&st, "Merc");
        let admin = token(&st, Role::Admin);

        let resp = app(&st)
            .oneshot(json_request(
                "PUT",
                &format!("/api/brand/{}", brand.id),
                Some(&admin),
                serde_json::json!({ "name": "Mercedes Benz" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["brand"]["slug"], "mercedes-benz");
        assert_eq!(st.brands.get(&brand.id).unwrap().name, "Mercedes Benz");
    }

    #[tokio::test]
    async fn rename_onto_taken_slug_is_duplicate() {
        let (st, _) = state();
        seed(&st, "Tata Motors");
        let other = seed(&st, "Tata");
        let admin = token(&st, Role::Admin);

        let resp = app(&st)
            .oneshot(json_request(
                "PUT",
                &format!("/api/brand/{}", other.id),
                Some(&admin),
                serde_json::json!({ "name": "tata  motors" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], ALREADY_EXISTS);
        assert_eq!(st.brands.get(&other.id).unwrap().name, "Tata");
    }

    #[tokio::test]
    async fn rename_keeping_own_slug_is_allowed() {
        let (st, _) = state();
        let brand = seed(&st, "Tata Motors");
        let admin = token(&st, Role::Admin);

        let resp = app(&st)
            .oneshot(json_request(
                "PUT",
                &format!("/api/brand/{}", brand.id),
                Some(&admin),
                serde_json::json!({ "name": "TATA MOTORS" }),
            ))
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["brand"]["slug"], "tata-motors");
    }

    #[tokio::test]
    async fn update_unknown_brand_is_404() {
        let (st, _) = state();
        let admin = token(&st, Role::Admin);
        let resp = app(&st)
            .oneshot(json_request(
                "PUT",
                &format!("/api/brand/{}", Uuid::new_v4()),
                Some(&admin),
                serde_json::json!({ "name": "Ghost" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (st, _) = state();
        let brand = seed(&st, "Saab");
        let admin = token(&st, Role::Admin);
        let uri = format!("/api/brand/{}", brand.id);

        for _ in 0..2 {
            let resp = app(&st)
                .oneshot(empty_request("DELETE", &uri, Some(&admin)))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(body_json(resp).await["message"], "Brand Deleted Successfully");
        }
        assert!(st.brands.is_empty());
    }

    #[tokio::test]
    async fn delete_with_malformed_id_is_400() {
        let (st, _) = state();
        let admin = token(&st, Role::Admin);
        let resp = app(&st)
            .oneshot(empty_request("DELETE", "/api/brand/not-a-uuid", Some(&admin)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
