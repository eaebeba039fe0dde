#[cfg(test)]
mod property_search {
    use chrono::{TimeZone, Utc};
    use rentals::{
        db::{MemoryRepository, Repository},
        error::AppError,
        models::{
            enums::{Amenity, PropertyType},
            lease::NewLease,
            location::{Coordinates, NewLocation},
            property::NewProperty,
        },
        search::{SearchParams, DEFAULT_RADIUS_KM},
        services::properties,
    };

    fn new_property(name: &str, price: f64, amenities: Vec<Amenity>) -> NewProperty {
        NewProperty {
            name: name.to_string(),
            description: "Bright and quiet".to_string(),
            price_per_month: price,
            security_deposit: price,
            application_fee: 50.0,
            photo_urls: vec![],
            amenities,
            highlights: vec![],
            is_pets_allowed: false,
            is_parking_included: true,
            beds: 2,
            baths: 1.0,
            square_feet: 800,
            property_type: PropertyType::Apartment,
            manager_cognito_id: "manager-1".to_string(),
        }
    }

    fn location(longitude: f64, latitude: f64) -> NewLocation {
        NewLocation {
            address: "123 Main St".to_string(),
            city: "Los Angeles".to_string(),
            state: "CA".to_string(),
            country: "United States".to_string(),
            postal_code: "90012".to_string(),
            coordinates: Coordinates::new(longitude, latitude),
        }
    }

    fn names(repo: &MemoryRepository, params: SearchParams) -> Vec<String> {
        properties::search(repo, &params, DEFAULT_RADIUS_KM)
            .unwrap()
            .into_iter()
            .map(|p| p.property.name)
            .collect()
    }

    #[test]
    fn price_range_keeps_only_matching_rent() {
        let repo = MemoryRepository::new();
        repo.create_property(new_property("cheap", 1500.0, vec![]), location(-118.2437, 34.0522))
            .unwrap();
        repo.create_property(new_property("pricey", 2500.0, vec![]), location(-118.2437, 34.0522))
            .unwrap();

        let found = names(
            &repo,
            SearchParams {
                price_min: Some("1000".to_string()),
                price_max: Some("2000".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(found, vec!["cheap".to_string()]);
    }

    #[test]
    fn same_coordinates_are_within_default_radius() {
        let repo = MemoryRepository::new();
        repo.create_property(new_property("downtown", 1500.0, vec![]), location(-118.2437, 34.0522))
            .unwrap();
        repo.create_property(new_property("far away", 1500.0, vec![]), location(0.0, 0.0))
            .unwrap();

        let found = names(
            &repo,
            SearchParams {
                latitude: Some("34.0522".to_string()),
                longitude: Some("-118.2437".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(found, vec!["downtown".to_string()]);
    }

    #[test]
    fn amenities_must_all_be_present() {
        let repo = MemoryRepository::new();
        repo.create_property(
            new_property("pool and gym", 1500.0, vec![Amenity::Pool, Amenity::Gym]),
            location(-118.2437, 34.0522),
        )
        .unwrap();
        repo.create_property(
            new_property("pool only", 1500.0, vec![Amenity::Pool]),
            location(-118.2437, 34.0522),
        )
        .unwrap();

        let found = names(
            &repo,
            SearchParams {
                amenities: Some("Pool,Gym".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(found, vec!["pool and gym".to_string()]);
    }

    #[test]
    fn available_from_needs_a_later_lease() {
        let repo = MemoryRepository::new();
        let leased = repo
            .create_property(new_property("leased", 1500.0, vec![]), location(-118.2437, 34.0522))
            .unwrap();
        repo.create_property(new_property("never leased", 1500.0, vec![]), location(-118.2437, 34.0522))
            .unwrap();

        let start = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        repo.create_application(
            rentals::models::application::NewApplication {
                application_date: start,
                status: rentals::models::enums::ApplicationStatus::Pending,
                property_id: leased.property.id,
                tenant_cognito_id: "tenant-1".to_string(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone_number: "555-0100".to_string(),
                message: None,
            },
            NewLease::for_property(&leased.property, "tenant-1", start),
        )
        .unwrap();

        let found = names(
            &repo,
            SearchParams {
                available_from: Some("2024-06-01".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(found, vec!["leased".to_string()]);
    }

    #[test]
    fn no_filters_returns_everything() {
        let repo = MemoryRepository::new();
        repo.create_property(new_property("a", 900.0, vec![]), location(10.0, 10.0))
            .unwrap();
        repo.create_property(new_property("b", 3000.0, vec![]), location(-10.0, -10.0))
            .unwrap();

        assert_eq!(names(&repo, SearchParams::default()).len(), 2);
    }

    #[test]
    fn malformed_parameters_are_a_server_error() {
        let repo = MemoryRepository::new();
        let params = SearchParams {
            price_max: Some("lots".to_string()),
            ..Default::default()
        };

        let err = properties::search(&repo, &params, DEFAULT_RADIUS_KM).unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
        assert_eq!(err.to_string(), "Error getting properties");
    }

    #[test]
    fn missing_property_is_not_found() {
        let repo = MemoryRepository::new();
        let err = properties::get(&repo, 42).unwrap_err();
        assert!(matches!(err, AppError::NotFound("Property not found")));
    }
}
