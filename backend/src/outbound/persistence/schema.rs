//! Diesel table definitions. Must match `backend/migrations`.

diesel::table! {
    /// User profiles. Rows are created by the account service.
    users (id) {
        id -> Uuid,
        /// Unique, 1 to 16 characters.
        username -> Varchar,
        bio -> Nullable<Varchar>,
        /// Server-relative URL path of the current avatar file.
        avatar -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
