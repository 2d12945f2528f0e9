diesel::table! {
    #[sql_name = "Item"]
    items (item_id) {
        item_id -> Integer,
        name -> Text,
        quantity -> Integer,
    }
}

diesel::table! {
    #[sql_name = "Log"]
    logs (log_id) {
        log_id -> Integer,
        item_id -> Integer,
        #[sql_name = "type"]
        kind -> Text,
        qty -> Integer,
        date -> Text,
    }
}

diesel::joinable!(logs -> items (item_id));

diesel::allow_tables_to_appear_in_same_query!(items, logs);
