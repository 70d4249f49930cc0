//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the migrations exactly; regenerate with
//! `diesel print-schema` after a schema change.

diesel::table! {
    /// Registered user accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        full_name -> Varchar,
        /// Login key; backed by a unique index.
        email -> Varchar,
        password_hash -> Varchar,
        contact_number -> Nullable<Varchar>,
        profile_picture -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Published car listings.
    car_listings (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        name -> Varchar,
        location -> Varchar,
        price -> Int8,
        year -> Int4,
        mileage -> Int8,
        fuel -> Varchar,
        transmission -> Varchar,
        category -> Varchar,
        make -> Varchar,
        model -> Varchar,
        description -> Nullable<Varchar>,
        /// Ordered image references; the first is the primary image.
        images -> Array<Text>,
        featured -> Bool,
        /// Owning seller.
        seller_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(car_listings, users);
