#[cfg(test)]
mod filters {
    use std::{collections::BTreeSet, time::Duration};

    use chrono::NaiveDate;
    use rentals::{
        client::{
            api::search_params,
            filters::{
                reduce, reset_filters, set_filters, toggle_full_filter_panel, Action, Bound,
                FilterState, FiltersPatch, Range, RangeField, SearchState, ViewMode,
                DEFAULT_COORDINATES,
            },
            url_sync::{from_query_string, href, to_query_string, Coalescer},
        },
        models::{
            enums::{Amenity, PropertyType},
            location::Coordinates,
        },
    };
    use tokio::time::Instant;

    #[test]
    fn defaults_match_the_landing_search() {
        let state = SearchState::default();
        assert_eq!(state.filters.location, "Los Angeles");
        assert_eq!(state.filters.coordinates, DEFAULT_COORDINATES);
        assert!(state.filters.beds.is_none());
        assert!(state.filters.price_range.is_unbounded());
        assert!(!state.is_full_filter_panel_open);
        assert_eq!(state.view_mode, ViewMode::Grid);
    }

    #[test]
    fn set_filters_merges_last_write_wins() {
        let state = SearchState::default();
        let state = set_filters(
            &state,
            FiltersPatch {
                beds: Some(Some(2)),
                location: Some("Austin".to_string()),
                ..Default::default()
            },
        );
        let state = set_filters(
            &state,
            FiltersPatch {
                beds: Some(Some(3)),
                ..Default::default()
            },
        );

        assert_eq!(state.filters.beds, Some(3));
        assert_eq!(state.filters.location, "Austin");
        assert_eq!(state.filters.coordinates, DEFAULT_COORDINATES);
    }

    #[test]
    fn inverted_ranges_pass_through() {
        let state = SearchState::default();
        let state = reduce(
            &state,
            Action::SetRangeBound {
                field: RangeField::Price,
                bound: Bound::Min,
                value: Some(3000.0),
            },
        );
        let state = reduce(
            &state,
            Action::SetRangeBound {
                field: RangeField::Price,
                bound: Bound::Max,
                value: Some(1000.0),
            },
        );

        assert_eq!(state.filters.price_range, Range::new(Some(3000.0), Some(1000.0)));
        assert!(state.filters.square_feet.is_unbounded());
    }

    #[test]
    fn panel_toggle_and_view_mode() {
        let state = SearchState::default();
        let opened = toggle_full_filter_panel(&state);
        assert!(opened.is_full_filter_panel_open);
        assert!(!toggle_full_filter_panel(&opened).is_full_filter_panel_open);

        let listed = reduce(&opened, Action::SetViewMode(ViewMode::List));
        assert_eq!(listed.view_mode, ViewMode::List);
        assert_eq!(listed.view_mode.as_str(), "list");
    }

    #[test]
    fn reset_keeps_panel_and_view() {
        let state = SearchState {
            is_full_filter_panel_open: true,
            view_mode: ViewMode::List,
            ..Default::default()
        };
        let state = reduce(
            &state,
            Action::SetFilters(FiltersPatch {
                property_type: Some(Some(PropertyType::Cottage)),
                ..Default::default()
            }),
        );

        let reset = reset_filters(&state);
        assert_eq!(reset.filters, FilterState::default());
        assert!(reset.is_full_filter_panel_open);
        assert_eq!(reset.view_mode, ViewMode::List);
    }

    #[test]
    fn default_query_string_has_location_and_coordinates() {
        assert_eq!(
            to_query_string(&FilterState::default()),
            "location=Los+Angeles&coordinates=-118.2437%2C34.0522"
        );
    }

    #[test]
    fn query_string_restores_filters() {
        let filters = FilterState {
            location: "San Diego".to_string(),
            beds: Some(2),
            baths: Some(1),
            property_type: Some(PropertyType::Townhouse),
            amenities: BTreeSet::from([Amenity::Pool, Amenity::WiFi]),
            available_from: NaiveDate::from_ymd_opt(2024, 9, 1),
            price_range: Range::new(Some(1000.0), None),
            square_feet: Range::new(Some(500.0), Some(1500.0)),
            coordinates: Coordinates::new(-117.1611, 32.7157),
        };

        let query = to_query_string(&filters);
        assert!(query.contains("priceRange=1000%2C&"));
        assert!(query.contains("amenities=Pool%2CWiFi"));
        assert_eq!(from_query_string(&query), filters);
        assert_eq!(from_query_string(&format!("?{query}")), filters);
    }

    #[test]
    fn bad_query_values_fall_back_to_defaults() {
        let filters = from_query_string("beds=lots&propertyType=Castle&coordinates=here&priceRange=abc");
        assert_eq!(filters, FilterState::default());

        let filters = from_query_string("beds=4%2B&baths=any");
        assert_eq!(filters.beds, Some(4));
        assert_eq!(filters.baths, None);
    }

    #[test]
    fn href_prefixes_path() {
        assert_eq!(
            href("/search", &FilterState::default()),
            "/search?location=Los+Angeles&coordinates=-118.2437%2C34.0522"
        );
    }

    #[test]
    fn api_search_params_skip_any() {
        let mut filters = FilterState::default();
        filters.price_range = Range::new(Some(1000.0), Some(2000.0));
        filters.amenities = BTreeSet::from([Amenity::Gym]);

        let params = search_params(&filters, &[3, 5]);
        assert_eq!(
            params,
            vec![
                ("location", "Los Angeles".to_string()),
                ("priceMin", "1000".to_string()),
                ("priceMax", "2000".to_string()),
                ("favoritesIds", "3,5".to_string()),
                ("amenities", "Gym".to_string()),
                ("latitude", "34.0522".to_string()),
                ("longitude", "-118.2437".to_string()),
            ]
        );
    }

    #[test]
    fn coalescer_releases_latest_after_quiet_interval() {
        let start = Instant::now();
        let interval = Duration::from_millis(300);
        let mut pending = Coalescer::new(interval);

        pending.offer(1, start);
        pending.offer(2, start + Duration::from_millis(100));
        pending.offer(3, start + Duration::from_millis(200));

        assert_eq!(pending.poll(start + Duration::from_millis(450)), None);
        assert_eq!(pending.deadline(), Some(start + Duration::from_millis(500)));
        assert_eq!(pending.poll(start + Duration::from_millis(500)), Some(3));
        assert!(!pending.is_pending());
        assert_eq!(pending.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn coalescer_take_flushes_immediately() {
        let mut pending = Coalescer::new(Duration::from_secs(1));
        assert_eq!(pending.take(), None::<&str>);

        pending.offer("final", Instant::now());
        assert_eq!(pending.take(), Some("final"));
        assert_eq!(pending.deadline(), None);
    }
}
