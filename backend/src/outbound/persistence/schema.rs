//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a migration
//! changes a table, update the matching block here (or regenerate it with
//! `diesel print-schema` against a migrated database).

diesel::table! {
    /// Registered accounts. `email` is unique and stored lowercased.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        display_name -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        email_confirmed -> Bool,
        /// SHA-256 digest of the outstanding confirmation token.
        confirmation_token_hash -> Nullable<Text>,
        created_at -> Timestamptz,
        last_login_at -> Nullable<Timestamptz>,
        is_deleted -> Bool,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Role names held by each user.
    user_roles (user_id, role) {
        user_id -> Uuid,
        role -> Varchar,
    }
}

diesel::table! {
    /// Issued refresh tokens. Only digests are stored.
    refresh_tokens (id) {
        id -> Uuid,
        user_id -> Uuid,
        token_hash -> Varchar,
        expires_at -> Timestamptz,
        /// Set when the token is rotated or revoked.
        expired -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    groups (id) {
        id -> Int8,
        name -> Varchar,
        description -> Text,
        is_active -> Bool,
        created_by -> Uuid,
        created_at -> Timestamptz,
        is_deleted -> Bool,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Memberships. `user_id` is unique: a user belongs to at most one group.
    user_groups (user_id, group_id) {
        user_id -> Uuid,
        group_id -> Int8,
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    /// Join requests. At most one `pending` row per (user, group).
    group_membership_requests (id) {
        id -> Int8,
        user_id -> Uuid,
        group_id -> Int8,
        status -> Varchar,
        requested_at -> Timestamptz,
        decided_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    ideas (id) {
        id -> Int8,
        title -> Varchar,
        description -> Text,
        status -> Varchar,
        is_promoted_to_project -> Bool,
        author_id -> Uuid,
        group_id -> Int8,
        created_at -> Timestamptz,
        updated_at -> Nullable<Timestamptz>,
        is_deleted -> Bool,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// One row per (user, idea) for its whole life; un-voting soft-deletes.
    votes (id) {
        id -> Int8,
        user_id -> Uuid,
        idea_id -> Int8,
        voted_at -> Timestamptz,
        is_deleted -> Bool,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    projects (id) {
        id -> Int8,
        title -> Varchar,
        description -> Text,
        status -> Varchar,
        created_by -> Uuid,
        overseen_by -> Uuid,
        idea_id -> Int8,
        group_id -> Int8,
        created_at -> Timestamptz,
        updated_at -> Nullable<Timestamptz>,
        is_deleted -> Bool,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(user_roles -> users (user_id));
diesel::joinable!(refresh_tokens -> users (user_id));
diesel::joinable!(user_groups -> users (user_id));
diesel::joinable!(user_groups -> groups (group_id));
diesel::joinable!(group_membership_requests -> groups (group_id));
diesel::joinable!(group_membership_requests -> users (user_id));
diesel::joinable!(ideas -> groups (group_id));
diesel::joinable!(votes -> ideas (idea_id));
diesel::joinable!(projects -> ideas (idea_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    user_roles,
    refresh_tokens,
    groups,
    user_groups,
    group_membership_requests,
    ideas,
    votes,
    projects,
);
