pub const RECIPE_MIN_COOKING_TIME: i64 = 1;
pub const RECIPE_MAX_COOKING_TIME: i64 = i32::MAX as i64;
pub const INGREDIENT_MIN_AMOUNT: i64 = 1;
/// Largest amount one recipe line may carry.
pub const INGREDIENT_MAX_AMOUNT: i64 = i16::MAX as i64;

pub const RECIPE_NAME_LENGTH: usize = 256;
pub const USER_EMAIL_LENGTH: usize = 254;
pub const USER_NAME_LENGTH: usize = 150;

pub const DEFAULT_PAGE_SIZE: u32 = 6;
pub const MAX_PAGE_SIZE: u32 = 100;

/// How many recipes a followed author carries in subscription responses
/// when the caller does not pass `recipes_limit`.
pub const DEFAULT_RECIPES_LIMIT: u32 = 3;

pub const JWT_EXPIRY_DAYS: i64 = 90;
