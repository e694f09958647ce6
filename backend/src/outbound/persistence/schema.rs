//! Diesel table definitions mirroring `migrations/`.

diesel::table! {
    categories (id) {
        id -> Int8,
        #[max_length = 50]
        slug -> Varchar,
        #[max_length = 120]
        title -> Varchar,
    }
}

diesel::table! {
    courses (id) {
        id -> Int8,
        #[max_length = 720]
        title -> Varchar,
        #[max_length = 120]
        instructor -> Varchar,
        price -> Numeric,
        category_id -> Int8,
    }
}

diesel::joinable!(courses -> categories (category_id));

diesel::allow_tables_to_appear_in_same_query!(categories, courses);
