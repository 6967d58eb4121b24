//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` or edit by hand when a migration changes a table.

diesel::table! {
    /// Applications submitted through the public forms. Never deleted.
    applications (id) {
        id -> Uuid,
        full_name -> Varchar,
        email -> Varchar,
        phone -> Varchar,
        location -> Varchar,
        profile_url -> Nullable<Text>,
        cover_note -> Nullable<Text>,
        role -> Varchar,
        position -> Nullable<Varchar>,
        veteran_status -> Nullable<Varchar>,
        willing_to_relocate -> Nullable<Bool>,
        desired_start_date -> Nullable<Date>,
        /// Canonical workflow status name.
        status -> Varchar,
        internal_notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        reviewed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Fundraising campaigns. Amounts are integer minor units.
    campaigns (id) {
        id -> Uuid,
        title -> Varchar,
        slug -> Varchar,
        description -> Nullable<Text>,
        goal_amount -> Int8,
        current_amount -> Int8,
        starts_on -> Nullable<Date>,
        ends_on -> Nullable<Date>,
        status -> Varchar,
        featured -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    donors (id) {
        id -> Uuid,
        full_name -> Varchar,
        /// Unique, stored lowercased.
        email -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    donations (id) {
        id -> Uuid,
        amount -> Int8,
        donor_id -> Uuid,
        campaign_id -> Nullable<Uuid>,
        cadence -> Varchar,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    events (id) {
        id -> Uuid,
        title -> Varchar,
        slug -> Varchar,
        summary -> Nullable<Text>,
        location -> Nullable<Varchar>,
        starts_at -> Timestamptz,
        ends_at -> Nullable<Timestamptz>,
        published -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    news_posts (id) {
        id -> Uuid,
        title -> Varchar,
        slug -> Varchar,
        excerpt -> Nullable<Text>,
        body -> Text,
        published_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Back-office login credentials.
    accounts (user_id) {
        user_id -> Uuid,
        email -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    role_assignments (user_id, role) {
        user_id -> Uuid,
        role -> Varchar,
    }
}
