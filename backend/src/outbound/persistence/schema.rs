//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation; when a migration changes the schema this file must change
//! with it.

diesel::table! {
    /// Registered user accounts.
    ///
    /// The `email` column carries a unique constraint; `password_hash`
    /// never leaves the persistence layer unredacted.
    users (id) {
        /// Primary key: serial identifier.
        id -> Int4,
        /// Unique login email, stored case-sensitively.
        email -> Varchar,
        /// One-way bcrypt hash of the account password.
        password_hash -> Varchar,
        /// Optional display name.
        display_name -> Nullable<Varchar>,
        /// Optional avatar reference.
        avatar -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Feedback categories, seeded by migration.
    categories (id) {
        /// Primary key: serial identifier.
        id -> Int4,
        /// Unique category name.
        name -> Varchar,
    }
}

diesel::table! {
    /// Workflow statuses, seeded by migration.
    statuses (id) {
        /// Primary key: serial identifier.
        id -> Int4,
        /// Unique status name.
        name -> Varchar,
    }
}

diesel::table! {
    /// Feedback posts.
    ///
    /// `author_id` cascades on user deletion; `category_id` and
    /// `status_id` are `ON DELETE RESTRICT` so referenced taxonomy rows
    /// cannot disappear underneath a post.
    posts (id) {
        /// Primary key: serial identifier.
        id -> Int4,
        /// Short summary line.
        title -> Varchar,
        /// Full description body.
        description -> Text,
        /// Owning author.
        author_id -> Int4,
        /// Classifying category.
        category_id -> Int4,
        /// Workflow status.
        status_id -> Int4,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Existence-only vote rows.
    ///
    /// The composite primary key doubles as the unique `(user, post)`
    /// constraint that makes vote toggling race-safe. Both foreign keys
    /// cascade on deletion of their referent.
    votes (user_id, post_id) {
        /// Voting user.
        user_id -> Int4,
        /// Voted post.
        post_id -> Int4,
        /// Vote creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(posts -> users (author_id));
diesel::joinable!(posts -> categories (category_id));
diesel::joinable!(posts -> statuses (status_id));
diesel::joinable!(votes -> posts (post_id));

diesel::allow_tables_to_appear_in_same_query!(users, categories, statuses, posts, votes);
