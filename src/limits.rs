//! Hard limits applied at the store and wire boundaries.

/// Hours in a day; exclusive upper bound for spans and operating hours.
pub const HOURS_PER_DAY: u8 = 24;

pub const MAX_VENUES: usize = 1024;
pub const MAX_VENUE_NAME_LEN: usize = 128;

pub const MAX_RESERVATIONS_PER_VENUE: usize = 500_000;
pub const MAX_RECURRING_PER_VENUE: usize = 10_000;
pub const MAX_TIME_BANDS: usize = 48;
pub const MAX_PRODUCT_SALES_PER_VENUE: usize = 1_000_000;

pub const MAX_LABEL_LEN: usize = 256;

/// Largest single price or sale total accepted.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Longest window accepted by `revenue_last_days`.
pub const MAX_REVENUE_WINDOW_DAYS: u32 = 366;
