use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{de, Deserialize, Deserializer, Serialize};

use super::{
    enums::{comma_separated, Amenity, Highlight, PropertyType},
    location::Location,
};
use crate::db::schema::properties;

#[derive(Debug, Clone, PartialEq, Queryable, QueryableByName, Selectable, Serialize, Deserialize)]
#[diesel(table_name = properties)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price_per_month: f64,
    pub security_deposit: f64,
    pub application_fee: f64,
    pub photo_urls: Vec<String>,
    pub amenities: Vec<Amenity>,
    pub highlights: Vec<Highlight>,
    pub is_pets_allowed: bool,
    pub is_parking_included: bool,
    pub beds: i32,
    pub baths: f64,
    pub square_feet: i32,
    pub property_type: PropertyType,
    pub posted_date: DateTime<Utc>,
    pub average_rating: Option<f64>,
    pub number_of_reviews: Option<i32>,
    pub location_id: i32,
    pub manager_cognito_id: String,
}

/// A property with its joined location, as every read endpoint returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyWithLocation {
    #[serde(flatten)]
    pub property: Property,
    pub location: Location,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = properties)]
pub struct NewProperty {
    pub name: String,
    pub description: String,
    pub price_per_month: f64,
    pub security_deposit: f64,
    pub application_fee: f64,
    pub photo_urls: Vec<String>,
    pub amenities: Vec<Amenity>,
    pub highlights: Vec<Highlight>,
    pub is_pets_allowed: bool,
    pub is_parking_included: bool,
    pub beds: i32,
    pub baths: f64,
    pub square_feet: i32,
    pub property_type: PropertyType,
    pub manager_cognito_id: String,
}

/// Body of `POST /properties`. Numeric and boolean fields may arrive as
/// strings, lists as comma separated strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "serde_this_or_that::as_f64")]
    pub price_per_month: f64,
    #[serde(deserialize_with = "serde_this_or_that::as_f64")]
    pub security_deposit: f64,
    #[serde(deserialize_with = "serde_this_or_that::as_f64")]
    pub application_fee: f64,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub amenities: Vec<Amenity>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub highlights: Vec<Highlight>,
    #[serde(default, deserialize_with = "serde_this_or_that::as_bool")]
    pub is_pets_allowed: bool,
    #[serde(default, deserialize_with = "serde_this_or_that::as_bool")]
    pub is_parking_included: bool,
    #[serde(deserialize_with = "as_i32")]
    pub beds: i32,
    #[serde(deserialize_with = "serde_this_or_that::as_f64")]
    pub baths: f64,
    #[serde(deserialize_with = "as_i32")]
    pub square_feet: i32,
    pub property_type: PropertyType,
    pub manager_cognito_id: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

/// Integer given as a number or a string; values outside `i32` are rejected.
fn as_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_this_or_that::as_i64(deserializer)?;
    i32::try_from(value).map_err(|_| de::Error::custom(format!("{value} is out of range")))
}

impl CreatePropertyRequest {
    pub fn new_property(&self) -> NewProperty {
        NewProperty {
            name: self.name.clone(),
            description: self.description.clone(),
            price_per_month: self.price_per_month,
            security_deposit: self.security_deposit,
            application_fee: self.application_fee,
            photo_urls: self.photo_urls.clone(),
            amenities: self.amenities.clone(),
            highlights: self.highlights.clone(),
            is_pets_allowed: self.is_pets_allowed,
            is_parking_included: self.is_parking_included,
            beds: self.beds,
            baths: self.baths,
            square_feet: self.square_feet,
            property_type: self.property_type,
            manager_cognito_id: self.manager_cognito_id.clone(),
        }
    }
}
