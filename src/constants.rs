pub const RECIPE_COUNT_PER_PAGE: i64 = 10;
pub const USER_COUNT_PER_PAGE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

pub const SHOPPING_LIST_FILENAME: &str = "shopping_cart.txt";
pub const SHOPPING_LIST_CONTENT_TYPE: &str = "text/plain; charset=utf8";
pub const SHOPPING_LIST_DISPOSITION: &str = "attachment; filename=shopping_cart.txt";

pub const MAX_JSON_BODY_BYTES: u64 = 1024 * 64;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
