//! Keeps the address bar in step with the search filters.
//!
//! Filter edits arrive in bursts (dragging a slider, ticking several
//! amenities). [`UrlSynchronizer`] holds back navigation until the filters
//! have been quiet for one interval and then pushes only the latest state.

use std::{collections::BTreeSet, time::Duration};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::debug;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant},
};
use url::form_urlencoded;

use super::filters::{FilterState, Range};
use crate::{config::Config, models::location::Coordinates};

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_millis(300);

const ANY: &str = "any";

fn join<T: ToString>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn range_value(range: &Range) -> Option<String> {
    if range.is_unbounded() {
        return None;
    }
    let end = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    Some(format!("{},{}", end(range.min), end(range.max)))
}

/// Serializes the filters that are set. "Any" choices and empty values are
/// left out; lists and ranges are comma separated.
pub fn to_query_string(filters: &FilterState) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());

    if !filters.location.is_empty() {
        query.append_pair("location", &filters.location);
    }
    if let Some(beds) = filters.beds {
        query.append_pair("beds", &beds.to_string());
    }
    if let Some(baths) = filters.baths {
        query.append_pair("baths", &baths.to_string());
    }
    if let Some(property_type) = filters.property_type {
        query.append_pair("propertyType", property_type.as_str());
    }
    if !filters.amenities.is_empty() {
        query.append_pair("amenities", &join(filters.amenities.iter().map(|a| a.as_str())));
    }
    if let Some(date) = filters.available_from {
        query.append_pair("availableFrom", &date.format("%Y-%m-%d").to_string());
    }
    if let Some(price) = range_value(&filters.price_range) {
        query.append_pair("priceRange", &price);
    }
    if let Some(square_feet) = range_value(&filters.square_feet) {
        query.append_pair("squareFeet", &square_feet);
    }
    query.append_pair(
        "coordinates",
        &join([filters.coordinates.longitude, filters.coordinates.latitude]),
    );

    query.finish()
}

fn parse_choice(value: &str) -> Option<u32> {
    match value {
        ANY | "" => None,
        other => other.trim_end_matches('+').parse().ok(),
    }
}

fn parse_range(value: &str) -> Option<Range> {
    let (min, max) = value.split_once(',')?;
    let bound = |v: &str| v.trim().parse::<f64>().ok();
    Some(Range::new(bound(min), bound(max)))
}

fn parse_coordinates(value: &str) -> Option<Coordinates> {
    let (longitude, latitude) = value.split_once(',')?;
    Some(Coordinates::new(
        longitude.trim().parse().ok()?,
        latitude.trim().parse().ok()?,
    ))
}

/// Reads filters back from a query string. Missing or unparsable fields keep
/// their default.
pub fn from_query_string(query: &str) -> FilterState {
    let mut filters = FilterState::default();
    let query = query.strip_prefix('?').unwrap_or(query);

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "location" if !value.is_empty() => filters.location = value.into_owned(),
            "beds" => filters.beds = parse_choice(&value),
            "baths" => filters.baths = parse_choice(&value),
            "propertyType" => filters.property_type = value.parse().ok(),
            "amenities" => {
                filters.amenities = value
                    .split(',')
                    .filter_map(|a| a.trim().parse().ok())
                    .collect::<BTreeSet<_>>()
            }
            "availableFrom" => {
                filters.available_from = NaiveDate::parse_from_str(&value, "%Y-%m-%d").ok()
            }
            "priceRange" => filters.price_range = parse_range(&value).unwrap_or_default(),
            "squareFeet" => filters.square_feet = parse_range(&value).unwrap_or_default(),
            "coordinates" => {
                if let Some(coordinates) = parse_coordinates(&value) {
                    filters.coordinates = coordinates;
                }
            }
            other => debug!("Ignoring query parameter {other}"),
        }
    }

    filters
}

/// `path?query`, or just `path` when no filter is set.
pub fn href(path: &str, filters: &FilterState) -> String {
    let query = to_query_string(filters);
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

/// Holds at most one pending value. Each offer replaces the pending value and
/// restarts the interval; the value is released once the interval passes
/// without a newer offer.
#[derive(Debug)]
pub struct Coalescer<T> {
    interval: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Coalescer<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    pub fn offer(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// When the pending value becomes due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending
            .as_ref()
            .map(|(_, offered_at)| *offered_at + self.interval)
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.take(),
            _ => None,
        }
    }

    /// Releases the pending value without waiting.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Where the synchronizer sends the URLs it settles on.
pub trait Navigator: Send + 'static {
    fn push(&mut self, url: String);
}

/// Background task that turns a stream of filter states into navigations.
pub struct UrlSynchronizer<N> {
    tx: mpsc::UnboundedSender<FilterState>,
    task: JoinHandle<N>,
}

impl<N: Navigator> UrlSynchronizer<N> {
    pub fn spawn(path: impl Into<String>, interval: Duration, navigator: N) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(path.into(), rx, Coalescer::new(interval), navigator));
        Self { tx, task }
    }

    pub fn from_config(path: impl Into<String>, config: &Config, navigator: N) -> Self {
        Self::spawn(
            path,
            Duration::from_millis(config.url_sync_interval_ms),
            navigator,
        )
    }

    pub fn update(&self, filters: FilterState) -> Result<()> {
        self.tx
            .send(filters)
            .map_err(|_| anyhow::anyhow!("URL synchronizer has stopped"))
    }

    /// Stops the task, flushing a pending update first, and hands the
    /// navigator back.
    pub async fn close(self) -> Result<N> {
        drop(self.tx);
        self.task.await.context("URL synchronizer task failed")
    }
}

async fn run<N: Navigator>(
    path: String,
    mut rx: mpsc::UnboundedReceiver<FilterState>,
    mut pending: Coalescer<FilterState>,
    mut navigator: N,
) -> N {
    loop {
        let next = match pending.deadline() {
            Some(deadline) => tokio::select! {
                next = rx.recv() => next,
                _ = time::sleep_until(deadline) => {
                    if let Some(filters) = pending.poll(Instant::now()) {
                        navigator.push(href(&path, &filters));
                    }
                    continue;
                }
            },
            None => rx.recv().await,
        };

        match next {
            Some(filters) => pending.offer(filters, Instant::now()),
            None => {
                if let Some(filters) = pending.take() {
                    navigator.push(href(&path, &filters));
                }
                return navigator;
            }
        }
    }
}
