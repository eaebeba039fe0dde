// Maintained by hand: `locations.coordinates` is a PostGIS geography column
// diesel has no type for, so it is left out and only touched through raw SQL.

diesel::table! {
    applications (id) {
        id -> Int4,
        application_date -> Timestamptz,
        status -> Text,
        property_id -> Int4,
        tenant_cognito_id -> Text,
        name -> Text,
        email -> Text,
        phone_number -> Text,
        message -> Nullable<Text>,
        lease_id -> Nullable<Int4>,
    }
}

diesel::table! {
    leases (id) {
        id -> Int4,
        start_date -> Timestamptz,
        end_date -> Timestamptz,
        rent -> Float8,
        deposit -> Float8,
        property_id -> Int4,
        tenant_cognito_id -> Text,
    }
}

diesel::table! {
    locations (id) {
        id -> Int4,
        address -> Text,
        city -> Text,
        state -> Text,
        country -> Text,
        postal_code -> Text,
    }
}

diesel::table! {
    managers (id) {
        id -> Int4,
        cognito_id -> Text,
        name -> Text,
        email -> Text,
        phone_number -> Text,
    }
}

diesel::table! {
    payments (id) {
        id -> Int4,
        amount_due -> Float8,
        amount_paid -> Float8,
        due_date -> Timestamptz,
        payment_date -> Timestamptz,
        payment_status -> Text,
        lease_id -> Int4,
    }
}

diesel::table! {
    properties (id) {
        id -> Int4,
        name -> Text,
        description -> Text,
        price_per_month -> Float8,
        security_deposit -> Float8,
        application_fee -> Float8,
        photo_urls -> Array<Text>,
        amenities -> Array<Text>,
        highlights -> Array<Text>,
        is_pets_allowed -> Bool,
        is_parking_included -> Bool,
        beds -> Int4,
        baths -> Float8,
        square_feet -> Int4,
        property_type -> Text,
        posted_date -> Timestamptz,
        average_rating -> Nullable<Float8>,
        number_of_reviews -> Nullable<Int4>,
        location_id -> Int4,
        manager_cognito_id -> Text,
    }
}

diesel::table! {
    property_tenants (property_id, tenant_id) {
        property_id -> Int4,
        tenant_id -> Int4,
    }
}

diesel::table! {
    tenant_favorites (tenant_id, property_id) {
        tenant_id -> Int4,
        property_id -> Int4,
    }
}

diesel::table! {
    tenants (id) {
        id -> Int4,
        cognito_id -> Text,
        name -> Text,
        email -> Text,
        phone_number -> Text,
    }
}

diesel::joinable!(applications -> properties (property_id));
diesel::joinable!(leases -> properties (property_id));
diesel::joinable!(payments -> leases (lease_id));
diesel::joinable!(properties -> locations (location_id));
diesel::joinable!(property_tenants -> properties (property_id));
diesel::joinable!(property_tenants -> tenants (tenant_id));
diesel::joinable!(tenant_favorites -> properties (property_id));
diesel::joinable!(tenant_favorites -> tenants (tenant_id));

diesel::allow_tables_to_appear_in_same_query!(
    applications,
    leases,
    locations,
    managers,
    payments,
    properties,
    property_tenants,
    tenant_favorites,
    tenants,
);
