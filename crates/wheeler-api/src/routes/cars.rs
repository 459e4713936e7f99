//! # Car Routes
//!
//! | Method | Path | Auth | Handler |
//! |---|---|---|---|
//! | GET | `/api/car` | — | [`list_cars`] |
//! | GET | `/api/car/{slug}` | — | [`get_car`] |
//! | GET | `/api/car/related/{cid}/{bid}` | — | [`related_cars`] |
//! | POST | `/api/car` | admin | [`create_car`] (multipart, files in `productPictures`) |
//! | PUT | `/api/car/{id}` | admin | [`update_car`] |
//! | DELETE | `/api/car/{id}` | admin | [`delete_car`] |
//!
//! Creating a car appends its id to the owning brand's `cars` list. Updates
//! and deletes leave that list alone; readers skip ids that no longer
//! resolve.

use std::str::FromStr;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use wheeler_core::{slugify_or, validate_price};
use wheeler_media::{timestamped_name, BlobScope, Upload};

use super::MessageResponse;
use crate::auth::AdminIdentity;
use crate::catalog::{car_view, CarView};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, parse_id, MultipartForm, Validate};
use crate::state::{AppState, CarRecord};

/// Multipart field carrying car images.
pub const IMAGES_FIELD: &str = "productPictures";

/// Required multipart fields, in the order they are checked.
const REQUIRED_FIELDS: [&str; 13] = [
    "name",
    "description",
    "brand",
    "price",
    "fuelType",
    "transmission",
    "engineSize",
    "mileage",
    "safetyRating",
    "warranty",
    "seater",
    "size",
    "fuelTank",
];

/// Lower-case spellings accepted for camelCase form fields.
const FIELD_ALIASES: [(&str, &str); 1] = [("safetyRating", "safetyrating")];

/// Non-negative, at most two decimal places, fits `NUMERIC(14, 2)`.
fn check_price(price: Decimal) -> Result<Decimal, String> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err("price must not be negative".into());
    }
    validate_price(price).map_err(|_| {
        "price must have at most two decimal places and at most 12 integer digits".to_string()
    })
}

// -- Request / response types -------------------------------------------------

/// Multipart body of `POST /api/car` (documentation only).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct CreateCarForm {
    pub name: String,
    pub description: String,
    /// Brand id.
    pub brand: Uuid,
    pub price: String,
    pub fuel_type: String,
    pub transmission: String,
    pub engine_size: String,
    pub mileage: String,
    pub safety_rating: String,
    pub warranty: String,
    pub seater: i32,
    pub size: String,
    pub fuel_tank: String,
    #[schema(value_type = Vec<String>)]
    pub product_pictures: Vec<Vec<u8>>,
}

/// Partial update. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCarRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<Uuid>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub engine_size: Option<String>,
    pub mileage: Option<String>,
    pub safety_rating: Option<String>,
    pub warranty: Option<String>,
    pub seater: Option<i32>,
    pub size: Option<String>,
    pub fuel_tank: Option<String>,
    pub images: Option<Vec<String>>,
}

impl Validate for UpdateCarRequest {
    fn validate(&self) -> Result<(), String> {
        if matches!(&self.name, Some(n) if n.trim().is_empty()) {
            return Err("name must not be empty".into());
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        if matches!(self.seater, Some(s) if s <= 0) {
            return Err("seater must be a positive integer".into());
        }
        Ok(())
    }
}

impl UpdateCarRequest {
    fn apply(self, car: &mut CarRecord, slug: Option<String>, now: DateTime<Utc>) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }

        set(&mut car.name, self.name);
        set(&mut car.slug, slug);
        set(&mut car.description, self.description);
        set(&mut car.brand, self.brand);
        set(&mut car.price, self.price);
        set(&mut car.fuel_type, self.fuel_type);
        set(&mut car.transmission, self.transmission);
        set(&mut car.engine_size, self.engine_size);
        set(&mut car.mileage, self.mileage);
        set(&mut car.safety_rating, self.safety_rating);
        set(&mut car.warranty, self.warranty);
        set(&mut car.seater, self.seater);
        set(&mut car.size, self.size);
        set(&mut car.fuel_tank, self.fuel_tank);
        set(&mut car.images, self.images);
        car.updated_at = now;
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarListResponse {
    pub success: bool,
    pub total_car: usize,
    pub message: String,
    pub cars: Vec<CarView>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CarViewResponse {
    pub success: bool,
    pub message: String,
    pub car: CarView,
}

/// Stored document, returned by writes.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CarResponse {
    pub success: bool,
    pub message: String,
    pub car: CarRecord,
}

// -- Router -------------------------------------------------------------------

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/car", get(list_cars).post(create_car))
        .route("/api/car/", get(list_cars).post(create_car))
        .route(
            "/api/car/{key}",
            get(get_car).put(update_car).delete(delete_car),
        )
        .route("/api/car/related/{cid}/{bid}", get(related_cars))
}

// -- Form parsing -------------------------------------------------------------

/// Validated text fields of a car creation form.
#[derive(Debug)]
struct NewCar {
    name: String,
    description: String,
    brand: Uuid,
    price: Decimal,
    fuel_type: String,
    transmission: String,
    engine_size: String,
    mileage: String,
    safety_rating: String,
    warranty: String,
    seater: i32,
    size: String,
    fuel_tank: String,
}

/// A form value by its canonical name, falling back to its alias.
fn form_text<'a>(form: &'a MultipartForm, field: &str) -> Option<&'a str> {
    form.text(field).or_else(|| {
        FIELD_ALIASES
            .iter()
            .find(|(canonical, _)| *canonical == field)
            .and_then(|(_, alias)| form.text(alias))
    })
}

impl NewCar {
    fn from_form(form: &MultipartForm) -> Result<Self, AppError> {
        for field in REQUIRED_FIELDS {
            if form_text(form, field).is_none() {
                return Err(AppError::Validation(format!("{field} is required")));
            }
        }
        let text = |field: &str| form_text(form, field).unwrap_or_default().to_string();

        let brand = Uuid::parse_str(&text("brand"))
            .map_err(|_| AppError::Validation("brand must be a valid brand id".into()))?;
        let price = Decimal::from_str(&text("price"))
            .map_err(|_| AppError::Validation("price must be a number".into()))?;
        let price = check_price(price).map_err(AppError::Validation)?;
        let seater = text("seater")
            .parse::<i32>()
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| AppError::Validation("seater must be a positive integer".into()))?;

        Ok(Self {
            name: text("name"),
            description: text("description"),
            brand,
            price,
            fuel_type: text("fuelType"),
            transmission: text("transmission"),
            engine_size: text("engineSize"),
            mileage: text("mileage"),
            safety_rating: text("safetyRating"),
            warranty: text("warranty"),
            seater,
            size: text("size"),
            fuel_tank: text("fuelTank"),
        })
    }
}

// -- Handlers -----------------------------------------------------------------

/// GET /api/car — All cars with their brand.
#[utoipa::path(
    get,
    path = "/api/car",
    responses(
        (status = 200, description = "All cars", body = CarListResponse),
    ),
    tag = "cars"
)]
pub async fn list_cars(State(state): State<AppState>) -> Json<CarListResponse> {
    let cars: Vec<CarView> = state
        .cars
        .list()
        .into_iter()
        .map(|c| car_view(c, &state.brands))
        .collect();

    Json(CarListResponse {
        success: true,
        total_car: cars.len(),
        message: "All cars".into(),
        cars,
    })
}

/// GET /api/car/{slug}
#[utoipa::path(
    get,
    path = "/api/car/{slug}",
    params(("slug" = String, Path, description = "Car slug")),
    responses(
        (status = 200, description = "Car found", body = CarViewResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "cars"
)]
pub async fn get_car(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CarViewResponse>, AppError> {
    let car = state
        .cars
        .find(|c| c.slug == slug)
        .ok_or_else(|| AppError::NotFound("Car not found".into()))?;

    Ok(Json(CarViewResponse {
        success: true,
        message: "Car by this slug".into(),
        car: car_view(car, &state.brands),
    }))
}

/// GET /api/car/related/{cid}/{bid} — Other cars of the same brand.
#[utoipa::path(
    get,
    path = "/api/car/related/{cid}/{bid}",
    params(
        ("cid" = Uuid, Path, description = "Car to exclude"),
        ("bid" = Uuid, Path, description = "Brand ID"),
    ),
    responses(
        (status = 200, description = "Related cars", body = CarListResponse),
        (status = 400, description = "Malformed id", body = crate::error::ErrorBody),
    ),
    tag = "cars"
)]
pub async fn related_cars(
    State(state): State<AppState>,
    Path((cid, bid)): Path<(String, String)>,
) -> Result<Json<CarListResponse>, AppError> {
    let car_id = parse_id(&cid, "car")?;
    let brand_id = parse_id(&bid, "brand")?;

    let cars: Vec<CarView> = state
        .cars
        .filter(|c| c.brand == brand_id && c.id != car_id)
        .into_iter()
        .map(|c| car_view(c, &state.brands))
        .collect();

    Ok(Json(CarListResponse {
        success: true,
        total_car: cars.len(),
        message: "Related cars for this brand".into(),
        cars,
    }))
}

/// POST /api/car — Create a car and upload its images.
///
/// Every required field is checked before the first upload. Images are
/// stored in submission order under timestamped names.
#[utoipa::path(
    post,
    path = "/api/car",
    request_body(content = CreateCarForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Car created", body = CarResponse),
        (status = 400, description = "Missing or malformed field", body = crate::error::ErrorBody),
        (status = 401, description = "No or invalid token", body = crate::error::ErrorBody),
        (status = 403, description = "Not an admin", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "cars"
)]
pub async fn create_car(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<CarResponse>), AppError> {
    let mut form = MultipartForm::read(multipart).await?;
    let fields = NewCar::from_form(&form)?;
    let id = Uuid::new_v4();
    let slug = slugify_or(&fields.name, &id.simple().to_string());

    let mut images = Vec::new();
    for file in form.take_files(IMAGES_FIELD) {
        let stored = state
            .blobs
            .put(Upload {
                scope: BlobScope::Cars,
                file_name: timestamped_name(Utc::now().timestamp_millis(), &file.file_name),
                content_type: file.content_type,
                bytes: file.bytes,
            })
            .await?;
        images.push(stored.reference);
    }

    let now = Utc::now();
    let record = CarRecord {
        id,
        name: fields.name,
        slug,
        description: fields.description,
        brand: fields.brand,
        images,
        price: fields.price,
        fuel_type: fields.fuel_type,
        transmission: fields.transmission,
        engine_size: fields.engine_size,
        mileage: fields.mileage,
        safety_rating: fields.safety_rating,
        warranty: fields.warranty,
        seater: fields.seater,
        size: fields.size,
        fuel_tank: fields.fuel_tank,
        created_at: now,
        updated_at: now,
    };

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::cars::insert(pool, &record).await {
            tracing::error!(car_id = %record.id, error = %e, "failed to persist car to database");
            return Err(AppError::Internal("car database persist failed".into()));
        }
    }
    state.cars.insert(record.clone());

    link_to_brand(&state, record.brand, record.id, now).await;

    tracing::info!(
        car_id = %record.id,
        brand_id = %record.brand,
        images = record.images.len(),
        admin = %admin.user_id,
        "car created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CarResponse {
            success: true,
            message: "Car created successfully".into(),
            car: record,
        }),
    ))
}

/// Append `car_id` to the brand's back-reference list.
///
/// The car is already stored when this runs, so failures are logged and
/// the request still succeeds.
async fn link_to_brand(state: &AppState, brand_id: Uuid, car_id: Uuid, now: DateTime<Utc>) {
    if let Some(pool) = &state.db_pool {
        match crate::db::brands::append_car(pool, brand_id, car_id, now).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(%brand_id, %car_id, "car references a brand that does not exist");
                return;
            }
            Err(e) => {
                tracing::warn!(%brand_id, %car_id, error = %e, "failed to link car to brand");
                return;
            }
        }
    }

    let linked = state.brands.update(&brand_id, |b| {
        if !b.cars.contains(&car_id) {
            b.cars.push(car_id);
            b.updated_at = now;
        }
    });
    if linked.is_none() {
        tracing::warn!(%brand_id, %car_id, "car references a brand that does not exist");
    }
}

/// PUT /api/car/{id} — Partial update.
///
/// Only the fields present in the body are written, in the database and in
/// memory, so concurrent updates to different fields do not overwrite each
/// other.
#[utoipa::path(
    put,
    path = "/api/car/{id}",
    params(("id" = Uuid, Path, description = "Car ID")),
    request_body = UpdateCarRequest,
    responses(
        (status = 200, description = "Car updated", body = CarResponse),
        (status = 400, description = "Invalid field", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "cars"
)]
pub async fn update_car(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(key): Path<String>,
    body: Result<Json<UpdateCarRequest>, JsonRejection>,
) -> Result<Json<CarResponse>, AppError> {
    let id = parse_id(&key, "car")?;
    let mut req = extract_validated_json(body)?;
    req.name = req.name.map(|n| n.trim().to_string());

    if state.cars.get(&id).is_none() {
        return Err(AppError::NotFound("Car not found".into()));
    }

    let slug = req
        .name
        .as_deref()
        .map(|name| slugify_or(name, &id.simple().to_string()));
    let now = Utc::now();

    if let Some(pool) = &state.db_pool {
        match crate::db::cars::update(pool, id, &req, slug.as_deref(), now).await {
            Ok(true) => {}
            Ok(false) => return Err(AppError::NotFound("Car not found".into())),
            Err(e) => {
                tracing::error!(car_id = %id, error = %e, "failed to persist car update");
                return Err(AppError::Internal("car database update failed".into()));
            }
        }
    }

    let car = state
        .cars
        .update(&id, move |c| req.apply(c, slug, now))
        .ok_or_else(|| AppError::NotFound("Car not found".into()))?;

    tracing::info!(car_id = %id, slug = %car.slug, admin = %admin.user_id, "car updated");

    Ok(Json(CarResponse {
        success: true,
        message: "Car updated successfully".into(),
        car,
    }))
}

/// DELETE /api/car/{id} — Remove a car. Uploaded images are kept.
#[utoipa::path(
    delete,
    path = "/api/car/{id}",
    params(("id" = Uuid, Path, description = "Car ID")),
    responses(
        (status = 200, description = "Car deleted", body = MessageResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "cars"
)]
pub async fn delete_car(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&key, "car")?;

    if state.cars.get(&id).is_none() {
        return Err(AppError::NotFound("Car not found".into()));
    }

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::cars::delete(pool, id).await {
            tracing::error!(car_id = %id, error = %e, "failed to delete car from database");
            return Err(AppError::Internal("car database delete failed".into()));
        }
    }

    state
        .cars
        .remove(&id)
        .ok_or_else(|| AppError::NotFound("Car not found".into()))?;
    tracing::info!(car_id = %id, admin = %admin.user_id, "car deleted");

    Ok(Json(MessageResponse::ok("Car deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::auth_middleware;
    use crate::routes::test_support::{body_json, empty_request, json_request, state, token, Form};
    use crate::state::BrandRecord;
    use axum::middleware::from_fn_with_state;
    use tower::ServiceExt;
    use wheeler_core::{slugify, Role};

    fn app(state: &AppState) -> Router {
        router()
            .layer(from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state.clone())
    }

    fn seed_brand(state: &AppState) -> BrandRecord {
        let now = Utc::now();
        let brand = BrandRecord {
            id: Uuid::new_v4(),
            name: "Porsche".into(),
            slug: "porsche".into(),
            image: "https://drive.google.com/file/d/PORSCHE/view".into(),
            cars: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        state.brands.insert(brand.clone());
        brand
    }

    fn seed_car(state: &AppState, name: &str, brand: Uuid) -> CarRecord {
        let now = Utc::now();
        let car = CarRecord {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: slugify(name).unwrap(),
            description: "Sports car".into(),
            brand,
            images: vec!["https://drive.google.com/file/d/CARIMG/view".into()],
            price: Decimal::new(9_500_000, 2),
            fuel_type: "Petrol".into(),
            transmission: "Automatic".into(),
            engine_size: "3.0L".into(),
            mileage: "9 km/l".into(),
            safety_rating: "5".into(),
            warranty: "2 years".into(),
            seater: 2,
            size: "Compact".into(),
            fuel_tank: "64L".into(),
            created_at: now,
            updated_at: now,
        };
        state.cars.insert(car.clone());
        car
    }

    fn full_form(brand: Uuid) -> Form {
        form_using(brand, "safetyRating")
    }

    fn form_using(brand: Uuid, safety_field: &str) -> Form {
        Form::default()
            .text("name", "911 Carrera")
            .text("description", "Rear-engined coupe")
            .text("brand", &brand.to_string())
            .text("price", "125000.50")
            .text("fuelType", "Petrol")
            .text("transmission", "PDK")
            .text("engineSize", "3.0L")
            .text("mileage", "10 km/l")
            .text(safety_field, "5")
            .text("warranty", "2 years")
            .text("seater", "4")
            .text("size", "Compact")
            .text("fuelTank", "64L")
    }

    #[test]
    fn update_request_rules() {
        assert!(UpdateCarRequest::default().validate().is_ok());
        let bad_price = UpdateCarRequest {
            price: Some(Decimal::new(-1, 0)),
            ..Default::default()
        };
        assert!(bad_price.validate().is_err());
        let bad_seater = UpdateCarRequest {
            seater: Some(0),
            ..Default::default()
        };
        assert!(bad_seater.validate().is_err());
    }

    #[test]
    fn update_price_must_fit_the_column() {
        for raw in ["19.999", "1000000000000"] {
            let req = UpdateCarRequest {
                price: Some(Decimal::from_str(raw).unwrap()),
                ..Default::default()
            };
            assert!(req.validate().is_err(), "{raw} accepted");
        }
        let ok = UpdateCarRequest {
            price: Some(Decimal::from_str("999999999999.99").unwrap()),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn apply_touches_only_present_fields() {
        let (st, _) = state();
        let car = seed_car(&st, "Macan", Uuid::new_v4());
        let now = Utc::now();

        st.cars.update(&car.id, |c| {
            UpdateCarRequest {
                mileage: Some("11 km/l".into()),
                ..Default::default()
            }
            .apply(c, None, now)
        });
        st.cars.update(&car.id, |c| {
            UpdateCarRequest {
                warranty: Some("3 years".into()),
                ..Default::default()
            }
            .apply(c, None, now)
        });

        let stored = st.cars.get(&car.id).unwrap();
        assert_eq!(stored.mileage, "11 km/l");
        assert_eq!(stored.warranty, "3 years");
        assert_eq!(stored.name, "Macan");
        assert_eq!(stored.price, car.price);
    }

    #[tokio::test]
    async fn create_uploads_images_and_links_brand() {
        let (st, blobs) = state();
        let brand = seed_brand(&st);
        let admin = token(&st, Role::Admin);
        let req = full_form(brand.id)
            .file(IMAGES_FIELD, "front.jpg", b"front")
            .file(IMAGES_FIELD, "back.jpg", b"back")
            .request("POST", "/api/car", Some(&admin));

        let resp = app(&st).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert_eq!(body["message"], "Car created successfully");
        assert_eq!(body["car"]["slug"], "911-carrera");
        assert_eq!(body["car"]["price"], "125000.50");
        assert_eq!(body["car"]["images"].as_array().unwrap().len(), 2);

        let uploads = blobs.uploads();
        assert_eq!(uploads.len(), 2);
        assert!(uploads[0].file_name.ends_with("-front.jpg"));
        assert!(uploads[1].file_name.ends_with("-back.jpg"));
        assert!(uploads.iter().all(|u| u.scope == BlobScope::Cars));

        let car_id: Uuid = serde_json::from_value(body["car"]["id"].clone()).unwrap();
        assert_eq!(st.brands.get(&brand.id).unwrap().cars, vec![car_id]);
    }

    #[tokio::test]
    async fn missing_price_names_the_field() {
        let (st, blobs) = state();
        let brand = seed_brand(&st);
        let admin = token(&st, Role::Admin);
        let req = Form::default()
            .text("name", "Cayenne")
            .text("description", "SUV")
            .text("brand", &brand.id.to_string())
            .text("fuelType", "Petrol")
            .file(IMAGES_FIELD, "a.jpg", b"a")
            .request("POST", "/api/car", Some(&admin));

        let resp = app(&st).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["message"], "price is required");
        assert!(blobs.is_empty());
        assert!(st.cars.is_empty());
        assert!(st.brands.get(&brand.id).unwrap().cars.is_empty());
    }

    #[tokio::test]
    async fn malformed_numbers_are_rejected() {
        let (st, blobs) = state();
        let brand = seed_brand(&st);
        let admin = token(&st, Role::Admin);

        let req = full_form(brand.id)
            .text("price", "a lot")
            .request("POST", "/api/car", Some(&admin));
        let resp = app(&st).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = full_form(brand.id)
            .text("seater", "-2")
            .request("POST", "/api/car", Some(&admin));
        let resp = app(&st).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = full_form(brand.id)
            .text("brand", "porsche")
            .request("POST", "/api/car", Some(&admin));
        let resp = app(&st).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        assert!(blobs.is_empty());
        assert!(st.cars.is_empty());
    }

    #[tokio::test]
    async fn lowercase_safety_rating_field_is_accepted() {
        let (st, _) = state();
        let brand = seed_brand(&st);
        let admin = token(&st, Role::Admin);
        let req = form_using(brand.id, "safetyrating").request("POST", "/api/car", Some(&admin));

        let resp = app(&st).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(body_json(resp).await["car"]["safetyRating"], "5");
    }

    #[tokio::test]
    async fn missing_safety_rating_keeps_camel_case_message() {
        let (st, _) = state();
        let brand = seed_brand(&st);
        let admin = token(&st, Role::Admin);
        let req = form_using(brand.id, "rating").request("POST", "/api/car", Some(&admin));

        let resp = app(&st).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["message"], "safetyRating is required");
    }

    #[tokio::test]
    async fn price_that_cannot_be_stored_is_400() {
        let (st, blobs) = state();
        let brand = seed_brand(&st);
        let admin = token(&st, Role::Admin);

        for price in ["19.999", "10000000000000"] {
            let req = full_form(brand.id)
                .text("price", price)
                .file(IMAGES_FIELD, "a.jpg", b"a")
                .request("POST", "/api/car", Some(&admin));
            let resp = app(&st).oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{price}");
        }
        assert!(blobs.is_empty());
        assert!(st.cars.is_empty());
    }

    #[tokio::test]
    async fn create_with_unknown_brand_still_succeeds() {
        let (st, _) = state();
        let admin = token(&st, Role::Admin);
        let req = full_form(Uuid::new_v4()).request("POST", "/api/car", Some(&admin));

        let resp = app(&st).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(st.cars.len(), 1);
    }

    #[tokio::test]
    async fn standard_user_cannot_create() {
        let (st, blobs) = state();
        let brand = seed_brand(&st);
        let user = token(&st, Role::Standard);
        let req = full_form(brand.id)
            .file(IMAGES_FIELD, "a.jpg", b"a")
            .request("POST", "/api/car", Some(&user));

        let resp = app(&st).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(blobs.is_empty());
        assert!(st.cars.is_empty());
    }

    #[tokio::test]
    async fn get_by_slug_rewrites_images() {
        let (st, _) = state();
        let brand = seed_brand(&st);
        seed_car(&st, "Taycan", brand.id);

        let resp = app(&st)
            .oneshot(empty_request("GET", "/api/car/taycan", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(
            body["car"]["images"][0],
            "https://lh3.googleusercontent.com/d/CARIMG=w1000?authuser=0"
        );
        assert_eq!(
            body["car"]["brand"]["image"],
            "https://lh3.googleusercontent.com/d/PORSCHE=w1000?authuser=0"
        );

        let resp = app(&st)
            .oneshot(empty_request("GET", "/api/car/unknown", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["message"], "Car not found");
    }

    #[tokio::test]
    async fn related_excludes_the_car_itself() {
        let (st, _) = state();
        let brand = seed_brand(&st);
        let a = seed_car(&st, "Macan", brand.id);
        let b = seed_car(&st, "Panamera", brand.id);
        seed_car(&st, "Other", Uuid::new_v4());

        let uri = format!("/api/car/related/{}/{}", a.id, brand.id);
        let resp = app(&st).oneshot(empty_request("GET", &uri, None)).await.unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["totalCar"], 1);
        assert_eq!(body["cars"][0]["id"], b.id.to_string());
    }

    #[tokio::test]
    async fn update_reslugs_and_keeps_other_fields() {
        let (st, _) = state();
        let brand = seed_brand(&st);
        let car = seed_car(&st, "Boxster", brand.id);
        let admin = token(&st, Role::Admin);

        let resp = app(&st)
            .oneshot(json_request(
                "PUT",
                &format!("/api/car/{}", car.id),
                Some(&admin),
                serde_json::json!({ "name": "Boxster GTS", "price": "99000" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let stored = st.cars.get(&car.id).unwrap();
        assert_eq!(stored.slug, "boxster-gts");
        assert_eq!(stored.price, Decimal::new(99000, 0));
        assert_eq!(stored.description, car.description);
        assert_eq!(stored.images, car.images);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_are_404() {
        let (st, _) = state();
        let admin = token(&st, Role::Admin);
        let uri = format!("/api/car/{}", Uuid::new_v4());

        let resp = app(&st)
            .oneshot(json_request("PUT", &uri, Some(&admin), serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app(&st)
            .oneshot(empty_request("DELETE", &uri, Some(&admin)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_removes_car() {
        let (st, _) = state();
        let brand = seed_brand(&st);
        let car = seed_car(&st, "Cayman", brand.id);
        let admin = token(&st, Role::Admin);

        let resp = app(&st)
            .oneshot(empty_request("DELETE", &format!("/api/car/{}", car.id), Some(&admin)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["message"], "Car deleted successfully");
        assert!(st.cars.is_empty());
    }
}
