use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::{config::Config, models::location::{Address, Coordinates}};

/// Resolves a postal address to a point.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &Address) -> Result<Coordinates>;
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Geocoder backed by a Nominatim `/search` endpoint.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to create geocoder HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.geocoder_url, &config.geocoder_user_agent)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    /// Addresses Nominatim cannot place resolve to `(0, 0)`.
    async fn geocode(&self, address: &Address) -> Result<Coordinates> {
        let places: Vec<Place> = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("street", address.street.as_str()),
                ("city", address.city.as_str()),
                ("state", address.state.as_str()),
                ("country", address.country.as_str()),
                ("postalcode", address.postal_code.as_str()),
                ("format", "json"),
                ("limit", "1"),
            ])
            .send()
            .await
            .context("Geocoding request failed")?
            .error_for_status()?
            .json()
            .await
            .context("Malformed geocoding response")?;

        let Some(place) = places.first() else {
            warn!("No geocoding result for {}, {}", address.street, address.city);
            return Ok(Coordinates::new(0.0, 0.0));
        };

        let coordinates = match (place.lon.parse(), place.lat.parse()) {
            (Ok(longitude), Ok(latitude)) => Coordinates::new(longitude, latitude),
            _ => {
                warn!("Unparsable geocoding result {place:?}");
                Coordinates::new(0.0, 0.0)
            }
        };
        info!(
            "Geocoded {}, {} to ({}, {})",
            address.street, address.city, coordinates.longitude, coordinates.latitude
        );
        Ok(coordinates)
    }
}
