//! Diesel table definitions for the board store.

diesel::table! {
    topics (id) {
        id -> Integer,
        user_id -> BigInt,
        body -> Text,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    replies (id) {
        id -> Integer,
        topic_id -> Integer,
        user_id -> BigInt,
        body -> Text,
        is_active -> Bool,
        created_at -> Timestamp,
    }
}

diesel::table! {
    reports (id) {
        id -> Integer,
        topic_id -> Integer,
        reporter_id -> BigInt,
        reason -> Text,
        status -> Text,
        resolution -> Nullable<Text>,
        admin_id -> Nullable<BigInt>,
        created_at -> Timestamp,
        resolved_at -> Nullable<Timestamp>,
    }
}

diesel::table! {
    bans (user_id) {
        user_id -> BigInt,
        reason -> Text,
        admin_id -> BigInt,
        banned_at -> Timestamp,
        unban_at -> Nullable<Timestamp>,
        is_active -> Bool,
    }
}

diesel::table! {
    user_stats (user_id) {
        user_id -> BigInt,
        topics_created -> Integer,
        replies_written -> Integer,
        replies_received -> Integer,
        last_active -> Timestamp,
    }
}

diesel::table! {
    user_names (user_id) {
        user_id -> BigInt,
        username -> Text,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    daily_limits (user_id, day) {
        user_id -> BigInt,
        day -> Date,
        topics_created -> Integer,
    }
}

diesel::table! {
    notification_prefs (user_id) {
        user_id -> BigInt,
        reply_notifications -> Bool,
        updated_at -> Timestamp,
    }
}

diesel::joinable!(replies -> topics (topic_id));
diesel::joinable!(reports -> topics (topic_id));

diesel::allow_tables_to_appear_in_same_query!(topics, replies, reports, user_names);
