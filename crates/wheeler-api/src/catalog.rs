//! # Catalogue Views
//!
//! Read-side shaping for brands and cars: relational population (a brand
//! with its car documents, a car with its brand document) and the CDN
//! rewrite of every image reference. Stored records are never modified.
//!
//! Dangling ids are skipped: a brand that lists a deleted car, or a car
//! whose brand was deleted, renders without the missing side.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use wheeler_core::rewrite_reference;

use crate::state::{BrandRecord, CarRecord, Store};

/// Brand with its cars populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandView {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub cars: Vec<CarRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Car with its brand populated (`None` when the brand no longer exists).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarView {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub brand: Option<BrandRecord>,
    pub images: Vec<String>,
    pub price: Decimal,
    pub fuel_type: String,
    pub transmission: String,
    pub engine_size: String,
    pub mileage: String,
    pub safety_rating: String,
    pub warranty: String,
    pub seater: i32,
    pub size: String,
    pub fuel_tank: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn with_public_image(mut brand: BrandRecord) -> BrandRecord {
    brand.image = rewrite_reference(&brand.image);
    brand
}

fn with_public_images(mut car: CarRecord) -> CarRecord {
    car.images = car.images.iter().map(|r| rewrite_reference(r)).collect();
    car
}

pub fn brand_view(brand: BrandRecord, cars: &Store<CarRecord>) -> BrandView {
    let populated = brand
        .cars
        .iter()
        .filter_map(|id| cars.get(id))
        .map(with_public_images)
        .collect();

    BrandView {
        id: brand.id,
        name: brand.name,
        slug: brand.slug,
        image: rewrite_reference(&brand.image),
        cars: populated,
        created_at: brand.created_at,
        updated_at: brand.updated_at,
    }
}

pub fn car_view(car: CarRecord, brands: &Store<BrandRecord>) -> CarView {
    let brand = brands.get(&car.brand).map(with_public_image);
    let car = with_public_images(car);

    CarView {
        id: car.id,
        name: car.name,
        slug: car.slug,
        description: car.description,
        brand,
        images: car.images,
        price: car.price,
        fuel_type: car.fuel_type,
        transmission: car.transmission,
        engine_size: car.engine_size,
        mileage: car.mileage,
        safety_rating: car.safety_rating,
        warranty: car.warranty,
        seater: car.seater,
        size: car.size,
        fuel_tank: car.fuel_tank,
        created_at: car.created_at,
        updated_at: car.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand(image: &str) -> BrandRecord {
        let now = Utc::now();
        BrandRecord {
            id: Uuid::new_v4(),
            name: "Tesla".into(),
            slug: "tesla".into(),
            image: image.into(),
            cars: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn car(brand: Uuid, images: &[&str]) -> CarRecord {
        let now = Utc::now();
        CarRecord {
            id: Uuid::new_v4(),
            name: "Model 3".into(),
            slug: "model-3".into(),
            description: "Electric sedan".into(),
            brand,
            images: images.iter().map(|s| s.to_string()).collect(),
            price: Decimal::new(4_299_000, 2),
            fuel_type: "Electric".into(),
            transmission: "Automatic".into(),
            engine_size: "N/A".into(),
            mileage: "500 km".into(),
            safety_rating: "5".into(),
            warranty: "4 years".into(),
            seater: 5,
            size: "Mid-size".into(),
            fuel_tank: "0".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn brand_view_populates_and_rewrites() {
        let cars = Store::new();
        let mut b = brand("https://drive.google.com/file/d/BRAND1/view");
        let c = car(b.id, &["https://drive.google.com/file/d/CAR1/view", "/storage/cars/x.jpg"]);
        b.cars = vec![c.id, Uuid::new_v4()];
        cars.insert(c.clone());

        let view = brand_view(b, &cars);
        assert_eq!(
            view.image,
            "https://lh3.googleusercontent.com/d/BRAND1=w1000?authuser=0"
        );
        assert_eq!(view.cars.len(), 1, "dangling car id is skipped");
        assert_eq!(
            view.cars[0].images,
            [
                "https://lh3.googleusercontent.com/d/CAR1=w1000?authuser=0",
                "/storage/cars/x.jpg"
            ]
        );
    }

    #[test]
    fn car_view_populates_brand() {
        let brands = Store::new();
        let b = brand("https://drive.google.com/file/d/B2/view");
        brands.insert(b.clone());

        let view = car_view(car(b.id, &[]), &brands);
        let populated = view.brand.unwrap();
        assert_eq!(populated.id, b.id);
        assert!(populated.image.starts_with("https://lh3.googleusercontent.com/d/B2"));
    }

    #[test]
    fn car_view_without_brand() {
        let view = car_view(car(Uuid::new_v4(), &["/storage/cars/a.jpg"]), &Store::new());
        assert!(view.brand.is_none());
        assert_eq!(view.images, ["/storage/cars/a.jpg"]);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(car_view(car(Uuid::new_v4(), &[]), &Store::new())).unwrap();
        assert!(json.get("fuelType").is_some());
        assert!(json.get("safetyRating").is_some());
        assert_eq!(json["price"], "42990.00");
    }
}
