use serde::{Deserialize, Serialize};

/// A WGS84 point. Longitude first, like PostGIS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i32,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    pub coordinates: Coordinates,
}

/// The parts of an address a geocoder needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
}

impl Address {
    pub fn into_location(self, coordinates: Coordinates) -> NewLocation {
        NewLocation {
            address: self.street,
            city: self.city,
            state: self.state,
            country: self.country,
            postal_code: self.postal_code,
            coordinates,
        }
    }
}
