// Mirrors `db::SCHEMA_SQL`; keep both in step.

diesel::table! {
    products (id) {
        id -> BigInt,
        code -> Text,
        name -> Text,
        price -> Text,
        currency -> Text,
        target_currency -> Text,
        converted_price -> Nullable<Text>,
        quote_rate -> Nullable<Text>,
        quote_fetched_at -> Nullable<Timestamp>,
        quote_source -> Nullable<Text>,
        available -> Bool,
        version -> BigInt,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}
