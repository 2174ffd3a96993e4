//! Diesel table definitions. Must match `backend/migrations` exactly.

diesel::table! {
    /// Registered accounts. `username` and `email` carry unique constraints
    /// named `users_username_key` and `users_email_key`.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// By-identifier view of journal entries.
    entries (id) {
        id -> Uuid,
        user_id -> Uuid,
        title -> Varchar,
        content -> Text,
        location -> Nullable<Varchar>,
        photos -> Array<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// By-owner view of journal entries, clustered on
    /// `(user_id, created_at, id)`.
    entries_by_user (user_id, created_at, id) {
        user_id -> Uuid,
        created_at -> Timestamptz,
        id -> Uuid,
        title -> Varchar,
        content -> Text,
        location -> Nullable<Varchar>,
        photos -> Array<Text>,
    }
}

diesel::joinable!(entries -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, entries, entries_by_user);
