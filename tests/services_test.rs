#[cfg(test)]
mod services {
    use std::{sync::Barrier, thread};

    use chrono::{DateTime, TimeZone, Utc};
    use rentals::{
        db::{MemoryRepository, Repository},
        error::AppError,
        models::{
            application::{ApplicationFilter, CreateApplicationRequest},
            enums::{ApplicationStatus, PaymentStatus, PropertyType},
            lease::{next_payment_date, NewLease},
            location::{Coordinates, NewLocation},
            payment::Payment,
            profile::{NewProfile, ProfileChanges},
            property::{NewProperty, PropertyWithLocation},
        },
        services::{applications, leases, managers, tenants},
    };

    const TENANT: &str = "tenant-1";
    const MANAGER: &str = "manager-1";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn profile(cognito_id: &str) -> NewProfile {
        NewProfile {
            cognito_id: cognito_id.to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone_number: "555-0100".to_string(),
        }
    }

    fn seed_property(repo: &MemoryRepository, price: f64) -> PropertyWithLocation {
        repo.create_property(
            NewProperty {
                name: "Sunset Villa".to_string(),
                description: "Ocean view".to_string(),
                price_per_month: price,
                security_deposit: 500.0,
                application_fee: 50.0,
                photo_urls: vec![],
                amenities: vec![],
                highlights: vec![],
                is_pets_allowed: true,
                is_parking_included: false,
                beds: 3,
                baths: 2.0,
                square_feet: 1200,
                property_type: PropertyType::Villa,
                manager_cognito_id: MANAGER.to_string(),
            },
            NewLocation {
                address: "1 Ocean Ave".to_string(),
                city: "Santa Monica".to_string(),
                state: "CA".to_string(),
                country: "United States".to_string(),
                postal_code: "90401".to_string(),
                coordinates: Coordinates::new(-118.4912, 34.0195),
            },
        )
        .unwrap()
    }

    fn setup() -> (MemoryRepository, PropertyWithLocation) {
        let repo = MemoryRepository::new();
        tenants::create(&repo, profile(TENANT)).unwrap();
        managers::create(&repo, profile(MANAGER)).unwrap();
        let property = seed_property(&repo, 2000.0);
        (repo, property)
    }

    fn apply(repo: &MemoryRepository, property_id: i32) -> i32 {
        let details = applications::create(
            repo,
            CreateApplicationRequest {
                application_date: now(),
                status: ApplicationStatus::Pending,
                property_id,
                tenant_cognito_id: TENANT.to_string(),
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                phone_number: "555-0100".to_string(),
                message: Some("I love the view".to_string()),
            },
            now(),
        )
        .unwrap();
        details.application.id
    }

    #[test]
    fn favorite_round_trip_restores_favorites() {
        let (repo, property) = setup();
        let before = tenants::get(&repo, TENANT).unwrap().favorites;

        let added = tenants::add_favorite(&repo, TENANT, property.property.id).unwrap();
        assert_eq!(added.favorites.len(), before.len() + 1);

        let removed = tenants::remove_favorite(&repo, TENANT, property.property.id).unwrap();
        assert_eq!(removed.favorites, before);
    }

    #[test]
    fn duplicate_favorite_is_a_conflict() {
        let (repo, property) = setup();
        tenants::add_favorite(&repo, TENANT, property.property.id).unwrap();

        let err = tenants::add_favorite(&repo, TENANT, property.property.id).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.to_string(), "Property already added as favorite");
    }

    #[test]
    fn unknown_tenant_is_not_found() {
        let (repo, property) = setup();
        assert!(matches!(
            tenants::get(&repo, "nobody"),
            Err(AppError::NotFound("Tenant not found"))
        ));
        assert!(matches!(
            tenants::add_favorite(&repo, "nobody", property.property.id),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            tenants::update(&repo, "nobody", ProfileChanges::default()),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn update_changes_only_given_fields() {
        let (repo, _) = setup();
        let updated = tenants::update(
            &repo,
            TENANT,
            ProfileChanges {
                email: Some("ada@lovelace.dev".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(updated.email, "ada@lovelace.dev");
        assert_eq!(updated.name, "Ada Lovelace");
    }

    #[test]
    fn manager_properties_need_an_existing_manager() {
        let (repo, property) = setup();
        assert_eq!(
            managers::properties(&repo, MANAGER).unwrap(),
            vec![property]
        );
        assert!(matches!(
            managers::properties(&repo, "nobody"),
            Err(AppError::NotFound("Manager not found"))
        ));
    }

    #[test]
    fn creating_an_application_creates_its_lease() {
        let (repo, property) = setup();
        let id = apply(&repo, property.property.id);

        let application = repo.get_application(id).unwrap().unwrap();
        assert_eq!(application.status, ApplicationStatus::Pending);

        let lease = repo.get_lease(application.lease_id.unwrap()).unwrap().unwrap();
        assert_eq!(lease.rent, 2000.0);
        assert_eq!(lease.deposit, 500.0);
        assert_eq!(lease.start_date, now());
        assert_eq!(
            lease.end_date,
            Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn application_for_missing_property_is_not_found() {
        let (repo, _) = setup();
        let err = applications::create(
            &repo,
            CreateApplicationRequest {
                application_date: now(),
                status: ApplicationStatus::Pending,
                property_id: 999,
                tenant_cognito_id: TENANT.to_string(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone_number: "555-0100".to_string(),
                message: None,
            },
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Property not found")));
        assert!(repo.list_leases().unwrap().is_empty());
    }

    #[test]
    fn approving_once_creates_exactly_one_lease() {
        let (repo, property) = setup();
        let id = apply(&repo, property.property.id);
        let leases_before = repo.list_leases().unwrap().len();

        let approved =
            applications::update_status(&repo, id, ApplicationStatus::Approved, now()).unwrap();
        assert_eq!(approved.application.status, ApplicationStatus::Approved);
        assert_eq!(repo.list_leases().unwrap().len(), leases_before + 1);
        assert_eq!(approved.lease.map(|l| l.id), approved.application.lease_id);

        let residences = tenants::current_residences(&repo, TENANT).unwrap();
        assert_eq!(residences, vec![property]);

        let err = applications::update_status(&repo, id, ApplicationStatus::Approved, now())
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.list_leases().unwrap().len(), leases_before + 1);
    }

    #[test]
    fn concurrent_approvals_create_one_lease() {
        for _ in 0..100 {
            let (repo, property) = setup();
            let id = apply(&repo, property.property.id);
            let leases_before = repo.list_leases().unwrap().len();
            let barrier = Barrier::new(2);

            let outcomes: Vec<_> = thread::scope(|scope| {
                let workers: Vec<_> = (0..2)
                    .map(|_| {
                        scope.spawn(|| {
                            barrier.wait();
                            applications::update_status(&repo, id, ApplicationStatus::Approved, now())
                        })
                    })
                    .collect();
                workers.into_iter().map(|w| w.join().unwrap()).collect()
            });

            assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
            assert!(outcomes
                .iter()
                .any(|o| matches!(o, Err(AppError::Conflict(_)))));
            assert_eq!(repo.list_leases().unwrap().len(), leases_before + 1);
        }
    }

    #[test]
    fn decided_application_is_not_written_again() {
        let (repo, property) = setup();
        let id = apply(&repo, property.property.id);
        repo.set_application_status(id, ApplicationStatus::Denied)
            .unwrap()
            .expect("pending application is decided");
        let leases_before = repo.list_leases().unwrap().len();

        let new_lease = NewLease::for_property(&property.property, TENANT, now());
        assert!(repo.approve_application(id, new_lease).unwrap().is_none());
        assert!(repo
            .set_application_status(id, ApplicationStatus::Approved)
            .unwrap()
            .is_none());
        assert_eq!(repo.list_leases().unwrap().len(), leases_before);
        assert_eq!(
            repo.get_application(id).unwrap().unwrap().status,
            ApplicationStatus::Denied
        );
    }

    #[test]
    fn application_from_unknown_tenant_is_rejected() {
        let (repo, property) = setup();
        let err = applications::create(
            &repo,
            CreateApplicationRequest {
                application_date: now(),
                status: ApplicationStatus::Pending,
                property_id: property.property.id,
                tenant_cognito_id: "nobody".to_string(),
                name: "Nobody".to_string(),
                email: "nobody@example.com".to_string(),
                phone_number: "555-0199".to_string(),
                message: None,
            },
            now(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Internal {
                message: "Error creating application",
                ..
            }
        ));
        assert!(repo.list_leases().unwrap().is_empty());
        assert!(repo
            .list_applications(&ApplicationFilter::All)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn denied_applications_stay_denied() {
        let (repo, property) = setup();
        let id = apply(&repo, property.property.id);
        let leases_before = repo.list_leases().unwrap().len();

        let denied =
            applications::update_status(&repo, id, ApplicationStatus::Denied, now()).unwrap();
        assert_eq!(denied.application.status, ApplicationStatus::Denied);
        assert_eq!(repo.list_leases().unwrap().len(), leases_before);

        assert!(matches!(
            applications::update_status(&repo, id, ApplicationStatus::Approved, now()),
            Err(AppError::Conflict(_))
        ));
        assert!(tenants::current_residences(&repo, TENANT).unwrap().is_empty());
    }

    #[test]
    fn unknown_application_is_not_found() {
        let (repo, _) = setup();
        assert!(matches!(
            applications::update_status(&repo, 7, ApplicationStatus::Approved, now()),
            Err(AppError::NotFound("Application not found"))
        ));
    }

    #[test]
    fn listing_filters_by_user_and_embeds_relations() {
        let (repo, property) = setup();
        apply(&repo, property.property.id);

        let today = Utc.with_ymd_and_hms(2024, 3, 20, 9, 0, 0).unwrap();
        let listings =
            applications::list(&repo, &ApplicationFilter::Tenant(TENANT.to_string()), today)
                .unwrap();
        assert_eq!(listings.len(), 1);

        let listing = &listings[0];
        assert_eq!(listing.property.address, "1 Ocean Ave");
        assert_eq!(listing.manager.as_ref().map(|m| m.cognito_id.as_str()), Some(MANAGER));
        assert_eq!(listing.tenant.as_ref().map(|t| t.cognito_id.as_str()), Some(TENANT));
        assert_eq!(
            listing.lease.as_ref().map(|l| l.next_payment_date),
            Some(Utc.with_ymd_and_hms(2024, 4, 15, 12, 0, 0).unwrap())
        );

        let for_manager =
            applications::list(&repo, &ApplicationFilter::Manager(MANAGER.to_string()), today)
                .unwrap();
        assert_eq!(for_manager.len(), 1);

        let for_other =
            applications::list(&repo, &ApplicationFilter::Tenant("someone".to_string()), today)
                .unwrap();
        assert!(for_other.is_empty());
    }

    #[test]
    fn application_filter_from_query() {
        assert_eq!(
            ApplicationFilter::from_query(Some("t1"), Some("tenant")),
            ApplicationFilter::Tenant("t1".to_string())
        );
        assert_eq!(
            ApplicationFilter::from_query(Some("m1"), Some("manager")),
            ApplicationFilter::Manager("m1".to_string())
        );
        assert_eq!(
            ApplicationFilter::from_query(Some("x"), None),
            ApplicationFilter::All
        );
        assert_eq!(
            ApplicationFilter::from_query(None, Some("tenant")),
            ApplicationFilter::All
        );
    }

    #[test]
    fn leases_embed_property_and_tenant() {
        let (repo, property) = setup();
        apply(&repo, property.property.id);

        let details = leases::list(&repo).unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].property.as_ref(), Some(&property));
        assert_eq!(
            details[0].tenant.as_ref().map(|t| t.cognito_id.as_str()),
            Some(TENANT)
        );
    }

    #[test]
    fn payments_are_listed_per_lease() {
        let (repo, property) = setup();
        apply(&repo, property.property.id);
        let lease_id = repo.list_leases().unwrap()[0].id;

        repo.insert_payment(Payment {
            id: 0,
            amount_due: 2000.0,
            amount_paid: 2000.0,
            due_date: now(),
            payment_date: now(),
            payment_status: PaymentStatus::Paid,
            lease_id,
        })
        .unwrap();

        assert_eq!(leases::payments(&repo, lease_id).unwrap().len(), 1);
        assert!(leases::payments(&repo, lease_id + 1).unwrap().is_empty());
    }

    #[test]
    fn next_payment_is_the_following_monthly_anniversary() {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();

        let today = Utc.with_ymd_and_hms(2024, 3, 20, 0, 0, 0).unwrap();
        assert_eq!(
            next_payment_date(start, today),
            Utc.with_ymd_and_hms(2024, 4, 15, 0, 0, 0).unwrap()
        );

        let on_anniversary = Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap();
        assert_eq!(
            next_payment_date(start, on_anniversary),
            Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
        );

        let before_start = Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap();
        assert_eq!(next_payment_date(start, before_start), start);
    }

    #[test]
    fn duplicate_profiles_are_rejected() {
        let (repo, _) = setup();
        assert!(matches!(
            tenants::create(&repo, profile(TENANT)),
            Err(AppError::Internal { .. })
        ));
    }
}
