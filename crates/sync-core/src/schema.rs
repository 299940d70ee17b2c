diesel::table! {
    quote_data (ticker) {
        ticker -> Varchar,
        name -> Varchar,
        currency -> Varchar,
        current_price -> Nullable<Numeric>,
        change_amount -> Nullable<Numeric>,
        change_percent -> Nullable<Numeric>,
        previous_close -> Nullable<Numeric>,
        day_high -> Nullable<Numeric>,
        day_low -> Nullable<Numeric>,
        volume -> Bigint,
        last_updated -> Timestamp,
    }
}

diesel::table! {
    historical_price (ticker, price_date) {
        ticker -> Varchar,
        price_date -> Date,
        close_price -> Numeric,
    }
}

diesel::allow_tables_to_appear_in_same_query!(quote_data, historical_price);
