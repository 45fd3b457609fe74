//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`
//! exactly. Regenerate with `diesel print-schema` after schema changes.

diesel::table! {
    /// Registered accounts.
    ///
    /// `email` carries the `users_email_key` unique constraint.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name (max 50 characters).
        name -> Varchar,
        /// Normalised login email.
        email -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        /// `dark` or `light`.
        theme -> Varchar,
        /// Demo account flag.
        is_demo -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last profile change.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Anime saved to a user's watch list.
    ///
    /// `(owner_id, catalog_id)` carries the `anime_entries_owner_catalog_key`
    /// unique constraint.
    anime_entries (id) {
        id -> Uuid,
        owner_id -> Uuid,
        catalog_id -> Varchar,
        title -> Varchar,
        rating -> Nullable<Float8>,
        format -> Varchar,
        episode_count -> Nullable<Int4>,
        synopsis -> Text,
        cover_image -> Text,
        creation_date -> Nullable<Date>,
        youtube_video_id -> Nullable<Varchar>,
        age_rating -> Nullable<Varchar>,
        status -> Varchar,
        added_at -> Timestamptz,
    }
}

diesel::table! {
    /// Named, ordered groupings of anime entries.
    playlists (id) {
        id -> Uuid,
        owner_id -> Uuid,
        title -> Varchar,
        /// Ordered anime entry identifiers, all owned by `owner_id`.
        anime_ids -> Array<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(anime_entries -> users (owner_id));
diesel::joinable!(playlists -> users (owner_id));

diesel::allow_tables_to_appear_in_same_query!(anime_entries, playlists, users);
