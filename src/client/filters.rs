//! Search page state and the reducers that change it.
//!
//! Every reducer is a pure function from the previous [`SearchState`] to the
//! next one. Values are stored exactly as given; a minimum above its maximum
//! is kept as is.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::{
    enums::{Amenity, PropertyType},
    location::Coordinates,
};

pub const DEFAULT_LOCATION: &str = "Los Angeles";
pub const DEFAULT_COORDINATES: Coordinates = Coordinates {
    longitude: -118.2437,
    latitude: 34.0522,
};

/// An optional lower and upper bound. `None` is the "any" choice.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Range {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Range {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// The filters of the search page. `None` stands for "any".
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub location: String,
    /// Minimum bedrooms; the top option of the select means "4+".
    pub beds: Option<u32>,
    /// Minimum bathrooms; the top option of the select means "3+".
    pub baths: Option<u32>,
    pub property_type: Option<PropertyType>,
    pub amenities: BTreeSet<Amenity>,
    pub available_from: Option<NaiveDate>,
    pub price_range: Range,
    pub square_feet: Range,
    pub coordinates: Coordinates,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
            beds: None,
            baths: None,
            property_type: None,
            amenities: BTreeSet::new(),
            available_from: None,
            price_range: Range::default(),
            square_feet: Range::default(),
            coordinates: DEFAULT_COORDINATES,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub filters: FilterState,
    pub is_full_filter_panel_open: bool,
    pub view_mode: ViewMode,
}

/// A partial update of [`FilterState`]. Only the fields that are `Some` are
/// written; a nested `None` clears the filter back to "any".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiltersPatch {
    pub location: Option<String>,
    pub beds: Option<Option<u32>>,
    pub baths: Option<Option<u32>>,
    pub property_type: Option<Option<PropertyType>>,
    pub amenities: Option<BTreeSet<Amenity>>,
    pub available_from: Option<Option<NaiveDate>>,
    pub price_range: Option<Range>,
    pub square_feet: Option<Range>,
    pub coordinates: Option<Coordinates>,
}

impl FiltersPatch {
    fn apply(self, filters: &mut FilterState) {
        if let Some(location) = self.location {
            filters.location = location;
        }
        if let Some(beds) = self.beds {
            filters.beds = beds;
        }
        if let Some(baths) = self.baths {
            filters.baths = baths;
        }
        if let Some(property_type) = self.property_type {
            filters.property_type = property_type;
        }
        if let Some(amenities) = self.amenities {
            filters.amenities = amenities;
        }
        if let Some(available_from) = self.available_from {
            filters.available_from = available_from;
        }
        if let Some(price_range) = self.price_range {
            filters.price_range = price_range;
        }
        if let Some(square_feet) = self.square_feet {
            filters.square_feet = square_feet;
        }
        if let Some(coordinates) = self.coordinates {
            filters.coordinates = coordinates;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeField {
    Price,
    SquareFeet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetFilters(FiltersPatch),
    /// Changes one end of a range select and leaves the other end alone.
    SetRangeBound {
        field: RangeField,
        bound: Bound,
        value: Option<f64>,
    },
    ToggleFullFilterPanel,
    SetViewMode(ViewMode),
    ResetFilters,
}

pub fn reduce(state: &SearchState, action: Action) -> SearchState {
    match action {
        Action::SetFilters(patch) => set_filters(state, patch),
        Action::SetRangeBound {
            field,
            bound,
            value,
        } => set_range_bound(state, field, bound, value),
        Action::ToggleFullFilterPanel => toggle_full_filter_panel(state),
        Action::SetViewMode(mode) => set_view_mode(state, mode),
        Action::ResetFilters => reset_filters(state),
    }
}

/// Shallow merge; the last write to a field wins.
pub fn set_filters(state: &SearchState, patch: FiltersPatch) -> SearchState {
    let mut next = state.clone();
    patch.apply(&mut next.filters);
    next
}

pub fn set_range_bound(
    state: &SearchState,
    field: RangeField,
    bound: Bound,
    value: Option<f64>,
) -> SearchState {
    let mut next = state.clone();
    let range = match field {
        RangeField::Price => &mut next.filters.price_range,
        RangeField::SquareFeet => &mut next.filters.square_feet,
    };
    match bound {
        Bound::Min => range.min = value,
        Bound::Max => range.max = value,
    }
    next
}

pub fn toggle_full_filter_panel(state: &SearchState) -> SearchState {
    SearchState {
        is_full_filter_panel_open: !state.is_full_filter_panel_open,
        ..state.clone()
    }
}

pub fn set_view_mode(state: &SearchState, view_mode: ViewMode) -> SearchState {
    SearchState {
        view_mode,
        ..state.clone()
    }
}

/// Restores the default filters. The panel and view mode stay as they are.
pub fn reset_filters(state: &SearchState) -> SearchState {
    SearchState {
        filters: FilterState::default(),
        ..state.clone()
    }
}
