//! Property search: turns the optional query parameters of `GET /properties`
//! into a typed [`PropertySearch`], which [`query::build_search_query`] renders
//! as SQL and [`PropertySearch::matches`] evaluates in memory.
//!
//! The spatial filter works in degrees: the radius in kilometers is divided by
//! 111.32 and compared against the planar distance between points. It is loose
//! far from the equator.

pub mod query;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use serde::Deserialize;

use crate::models::{
    enums::PropertyType,
    lease::Lease,
    location::{Coordinates, Location},
    property::Property,
};

pub const DEFAULT_RADIUS_KM: f64 = 1000.0;
pub const KM_PER_DEGREE: f64 = 111.32;

const ANY: &str = "any";

/// Raw query string of `GET /properties`. Everything arrives as text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub beds: Option<String>,
    pub baths: Option<String>,
    pub property_type: Option<String>,
    pub favorites_ids: Option<String>,
    pub square_feet_min: Option<String>,
    pub square_feet_max: Option<String>,
    pub amenities: Option<String>,
    pub available_from: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySearch {
    pub favorite_ids: Option<Vec<i32>>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub beds: Option<i32>,
    pub baths: Option<f64>,
    pub property_type: Option<PropertyType>,
    pub square_feet_min: Option<f64>,
    pub square_feet_max: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub available_from: Option<DateTime<Utc>>,
    pub center: Option<Coordinates>,
    pub radius_km: f64,
}

impl Default for PropertySearch {
    fn default() -> Self {
        Self {
            favorite_ids: None,
            price_min: None,
            price_max: None,
            beds: None,
            baths: None,
            property_type: None,
            square_feet_min: None,
            square_feet_max: None,
            amenities: None,
            available_from: None,
            center: None,
            radius_km: DEFAULT_RADIUS_KM,
        }
    }
}

/// Empty values are treated as missing.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Like [`present`], but `"any"` also means no filter.
fn chosen(value: &Option<String>) -> Option<&str> {
    present(value).filter(|v| *v != ANY)
}

fn number(name: &str, value: &str) -> Result<f64> {
    let parsed: f64 = value
        .parse()
        .with_context(|| format!("{name} is not a number: {value:?}"))?;
    if parsed.is_nan() {
        return Err(anyhow!("{name} is not a number: {value:?}"));
    }
    Ok(parsed)
}

/// Counts come from select boxes that offer "4+" style options.
fn count(name: &str, value: &str) -> Result<i32> {
    value
        .trim_end_matches('+')
        .parse()
        .with_context(|| format!("{name} is not a count: {value:?}"))
}

/// Unparsable dates are ignored rather than rejected.
fn date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(day) => day.and_hms_opt(0, 0, 0).map(|midnight| midnight.and_utc()),
        Err(_) => {
            debug!("Ignoring unparsable availableFrom {value:?}");
            None
        }
    }
}

impl PropertySearch {
    pub fn from_params(params: &SearchParams, radius_km: f64) -> Result<Self> {
        let favorite_ids = present(&params.favorites_ids)
            .map(|ids| {
                ids.split(',')
                    .map(|id| {
                        id.trim()
                            .parse::<i32>()
                            .with_context(|| format!("favoritesIds contains {id:?}"))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        let center = match (present(&params.latitude), present(&params.longitude)) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(
                number("longitude", lon)?,
                number("latitude", lat)?,
            )),
            _ => None,
        };

        Ok(Self {
            favorite_ids,
            price_min: present(&params.price_min)
                .map(|v| number("priceMin", v))
                .transpose()?,
            price_max: present(&params.price_max)
                .map(|v| number("priceMax", v))
                .transpose()?,
            beds: chosen(&params.beds).map(|v| count("beds", v)).transpose()?,
            baths: chosen(&params.baths)
                .map(|v| number("baths", v.trim_end_matches('+')))
                .transpose()?,
            property_type: chosen(&params.property_type)
                .map(str::parse)
                .transpose()?,
            square_feet_min: chosen(&params.square_feet_min)
                .map(|v| number("squareFeetMin", v))
                .transpose()?,
            square_feet_max: chosen(&params.square_feet_max)
                .map(|v| number("squareFeetMax", v))
                .transpose()?,
            amenities: chosen(&params.amenities).map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string)
                    .collect()
            }),
            available_from: present(&params.available_from).and_then(date),
            center,
            radius_km,
        })
    }

    pub fn radius_degrees(&self) -> f64 {
        self.radius_km / KM_PER_DEGREE
    }

    pub fn is_unfiltered(&self) -> bool {
        self.favorite_ids.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.beds.is_none()
            && self.baths.is_none()
            && self.property_type.is_none()
            && self.square_feet_min.is_none()
            && self.square_feet_max.is_none()
            && self.amenities.is_none()
            && self.available_from.is_none()
            && self.center.is_none()
    }

    /// Evaluates the same predicates the SQL query applies. `leases` may hold
    /// leases of any property; only those of `property` are considered.
    pub fn matches(&self, property: &Property, location: &Location, leases: &[Lease]) -> bool {
        if let Some(ids) = &self.favorite_ids {
            if !ids.contains(&property.id) {
                return false;
            }
        }
        if self.price_min.is_some_and(|min| property.price_per_month < min)
            || self.price_max.is_some_and(|max| property.price_per_month > max)
        {
            return false;
        }
        if self.beds.is_some_and(|beds| property.beds < beds)
            || self.baths.is_some_and(|baths| property.baths < baths)
        {
            return false;
        }
        if self
            .property_type
            .is_some_and(|kind| property.property_type != kind)
        {
            return false;
        }
        let square_feet = f64::from(property.square_feet);
        if self.square_feet_min.is_some_and(|min| square_feet < min)
            || self.square_feet_max.is_some_and(|max| square_feet > max)
        {
            return false;
        }
        if let Some(amenities) = &self.amenities {
            let has_all = amenities
                .iter()
                .all(|wanted| property.amenities.iter().any(|a| a.as_str() == wanted));
            if !has_all {
                return false;
            }
        }
        if let Some(from) = self.available_from {
            let leased_after = leases
                .iter()
                .any(|lease| lease.property_id == property.id && lease.start_date >= from);
            if !leased_after {
                return false;
            }
        }
        if let Some(center) = self.center {
            let d_lon = location.coordinates.longitude - center.longitude;
            let d_lat = location.coordinates.latitude - center.latitude;
            if (d_lon * d_lon + d_lat * d_lat).sqrt() > self.radius_degrees() {
                return false;
            }
        }
        true
    }
}
