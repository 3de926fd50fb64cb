use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::limits::{HOURS_PER_DAY, MAX_AMOUNT, MAX_LABEL_LEN};

/// Whole hour of the day. `24` only appears as an exclusive end.
pub type Hour = u8;

/// Currency amount in whole units (the court bills in pesos, no cents).
pub type Amount = i64;

/// Half-open hour interval `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HourSpan {
    pub start: Hour,
    pub end: Hour,
}

impl HourSpan {
    pub fn new(start: Hour, end: Hour) -> Result<Self, ModelError> {
        if start >= end || end > HOURS_PER_DAY {
            return Err(ModelError::InvalidHourSpan { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn hour_count(&self) -> u8 {
        self.end - self.start
    }

    pub fn contains_hour(&self, hour: Hour) -> bool {
        self.start <= hour && hour < self.end
    }

    pub fn overlaps(&self, other: &HourSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn hours(&self) -> std::ops::Range<Hour> {
        self.start..self.end
    }
}

impl fmt::Display for HourSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00-{:02}:00", self.start, self.end)
    }
}

/// Day of week, 0 = Sunday .. 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const SUNDAY: Self = Self(0);
    pub const MONDAY: Self = Self(1);
    pub const FRIDAY: Self = Self(5);
    pub const SATURDAY: Self = Self(6);

    pub fn new(n: u8) -> Result<Self, ModelError> {
        if n > 6 {
            return Err(ModelError::InvalidDayOfWeek(n));
        }
        Ok(Self(n))
    }

    /// Calendar weekday of a date. `NaiveDate` carries no zone, so a
    /// date-only value can never shift to the neighbouring day.
    pub fn of(date: NaiveDate) -> Self {
        Self(date.weekday().num_days_from_sunday() as u8)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn kind(self) -> DayKind {
        match self.0 {
            0 | 6 => DayKind::WeekendHoliday,
            5 => DayKind::Friday,
            _ => DayKind::Weekday,
        }
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = ModelError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> u8 {
        day.0
    }
}

/// Which price column of a band applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayKind {
    Weekday,
    Friday,
    WeekendHoliday,
}

/// Coarse display hint derived from a band's start hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Mid,
    High,
}

impl Tier {
    pub fn from_start_hour(start: Hour) -> Self {
        if start < 12 {
            Tier::Low
        } else if start < 18 {
            Tier::Mid
        } else {
            Tier::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Mid => "mid",
            Tier::High => "high",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Price bands ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandPrices {
    pub weekday: Amount,
    pub friday: Amount,
    pub weekend_holiday: Amount,
}

impl BandPrices {
    pub fn for_day(&self, kind: DayKind) -> Amount {
        match kind {
            DayKind::Weekday => self.weekday,
            DayKind::Friday => self.friday,
            DayKind::WeekendHoliday => self.weekend_holiday,
        }
    }
}

/// A contiguous hour range with its own day-type pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBand {
    pub id: Ulid,
    pub span: HourSpan,
    pub prices: BandPrices,
    pub label: String,
    pub active: bool,
}

impl TimeBand {
    pub fn new(
        id: Ulid,
        span: HourSpan,
        prices: BandPrices,
        label: String,
        active: bool,
    ) -> Result<Self, ModelError> {
        for amount in [prices.weekday, prices.friday, prices.weekend_holiday] {
            if amount <= 0 {
                return Err(ModelError::NonPositivePrice(amount));
            }
            check_amount(amount)?;
        }
        check_label(&label)?;
        Ok(Self { id, span, prices, label, active })
    }

    pub fn tier(&self) -> Tier {
        Tier::from_start_hour(self.span.start)
    }
}

// ── Reservations ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    /// Re-applying the current status is allowed and changes nothing.
    pub fn can_transition_to(self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (Pending, Pending)
                | (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Confirmed)
                | (Confirmed, Cancelled)
                | (Cancelled, Cancelled)
        )
    }
}

impl FromStr for ReservationStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReservationStatus::Pending),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "cancelled" | "canceled" => Ok(ReservationStatus::Cancelled),
            _ => Err(ModelError::UnknownStatus(s.to_string())),
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_RESERVATION_KIND: &str = "normal";

/// A one-off booking of the court on a specific date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Ulid,
    pub date: NaiveDate,
    pub span: HourSpan,
    pub status: ReservationStatus,
    pub kind: String,
    pub price: Amount,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub payment_method: Option<String>,
}

impl Reservation {
    /// New pending reservation of the default kind.
    pub fn new(id: Ulid, date: NaiveDate, span: HourSpan, price: Amount) -> Result<Self, ModelError> {
        if price < 0 {
            return Err(ModelError::NegativeAmount(price));
        }
        check_amount(price)?;
        Ok(Self {
            id,
            date,
            span,
            status: ReservationStatus::Pending,
            kind: DEFAULT_RESERVATION_KIND.to_string(),
            price,
            client_name: None,
            client_phone: None,
            payment_method: None,
        })
    }

    pub fn with_status(mut self, status: ReservationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_client(mut self, name: Option<String>, phone: Option<String>) -> Self {
        self.client_name = name;
        self.client_phone = phone;
        self
    }

    pub fn with_payment_method(mut self, method: Option<String>) -> Self {
        self.payment_method = method;
        self
    }

    pub fn occupies(&self) -> bool {
        self.status != ReservationStatus::Cancelled
    }
}

// ── Fixed clients ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringStatus {
    /// Asked for by the client, not yet accepted. Does not occupy the court.
    Requested,
    Active,
    Inactive,
}

impl RecurringStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecurringStatus::Requested => "requested",
            RecurringStatus::Active => "active",
            RecurringStatus::Inactive => "inactive",
        }
    }

    pub fn can_transition_to(self, next: RecurringStatus) -> bool {
        use RecurringStatus::*;
        self == next
            || matches!(
                (self, next),
                (Requested, Active) | (Requested, Inactive) | (Active, Inactive) | (Inactive, Active)
            )
    }
}

impl FromStr for RecurringStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "requested" => Ok(RecurringStatus::Requested),
            "active" => Ok(RecurringStatus::Active),
            "inactive" => Ok(RecurringStatus::Inactive),
            _ => Err(ModelError::UnknownStatus(s.to_string())),
        }
    }
}

impl fmt::Display for RecurringStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weekly reservation keyed by day of week ("fixed client").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringBooking {
    pub id: Ulid,
    pub day: DayOfWeek,
    pub span: HourSpan,
    pub status: RecurringStatus,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub party_size: Option<u32>,
}

impl RecurringBooking {
    pub fn new(id: Ulid, day: DayOfWeek, span: HourSpan) -> Self {
        Self {
            id,
            day,
            span,
            status: RecurringStatus::Requested,
            client_name: None,
            client_phone: None,
            party_size: None,
        }
    }

    pub fn with_status(mut self, status: RecurringStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_client(mut self, name: Option<String>, phone: Option<String>, party_size: Option<u32>) -> Self {
        self.client_name = name;
        self.client_phone = phone;
        self.party_size = party_size;
        self
    }

    pub fn occupies(&self) -> bool {
        self.status == RecurringStatus::Active
    }
}

// ── Shop ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSale {
    pub id: Ulid,
    pub date: NaiveDate,
    pub product_id: Option<Ulid>,
    pub quantity: u32,
    pub unit_price: Amount,
    pub total: Amount,
}

impl ProductSale {
    pub fn new(
        id: Ulid,
        date: NaiveDate,
        product_id: Option<Ulid>,
        quantity: u32,
        unit_price: Amount,
    ) -> Result<Self, ModelError> {
        if quantity == 0 {
            return Err(ModelError::InvalidQuantity(quantity));
        }
        if unit_price < 0 {
            return Err(ModelError::NegativeAmount(unit_price));
        }
        let total = unit_price
            .checked_mul(Amount::from(quantity))
            .ok_or(ModelError::AmountOverflow)?;
        check_amount(total)?;
        Ok(Self {
            id,
            date,
            product_id,
            quantity,
            unit_price,
            total,
        })
    }
}

// ── Opening hours ────────────────────────────────────────────────

/// Bookable window `[start, end)`. `start == end` means closed all day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub start: Hour,
    pub end: Hour,
}

impl OperatingHours {
    pub const DEFAULT: Self = Self { start: 7, end: 23 };

    pub fn new(start: Hour, end: Hour) -> Result<Self, ModelError> {
        if start > end || end > HOURS_PER_DAY {
            return Err(ModelError::InvalidOperatingHours { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn hours(&self) -> std::ops::Range<Hour> {
        self.start..self.end
    }

    pub fn slot_count(&self) -> usize {
        usize::from(self.end - self.start)
    }
}

impl Default for OperatingHours {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Inclusive date range; `end = None` is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn since(start: NaiveDate) -> Self {
        Self { start, end: None }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end: Some(end) }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && self.end.is_none_or(|end| date <= end)
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ModelError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| ModelError::InvalidDate(s.to_string()))
}

/// Parse an hour written as `18` or `18:00`. Only whole hours are accepted.
pub fn parse_hour(s: &str) -> Result<Hour, ModelError> {
    let s = s.trim();
    let (h, m) = match s.split_once(':') {
        Some((h, rest)) => (h, rest.split(':').next().unwrap_or("00")),
        None => (s, "00"),
    };
    let hour: Hour = h.parse().map_err(|_| ModelError::InvalidHour(s.to_string()))?;
    if m.parse::<u8>().ok() != Some(0) || hour > HOURS_PER_DAY {
        return Err(ModelError::InvalidHour(s.to_string()));
    }
    Ok(hour)
}

fn check_amount(amount: Amount) -> Result<(), ModelError> {
    if amount > MAX_AMOUNT {
        return Err(ModelError::AmountTooLarge(amount));
    }
    Ok(())
}

/// Checked sum; a total past `Amount::MAX` is an error, never a wrap.
pub fn sum_amounts(amounts: impl IntoIterator<Item = Amount>) -> Result<Amount, ModelError> {
    amounts
        .into_iter()
        .try_fold(0, |acc: Amount, a| acc.checked_add(a))
        .ok_or(ModelError::AmountOverflow)
}

fn check_label(label: &str) -> Result<(), ModelError> {
    if label.len() > MAX_LABEL_LEN {
        return Err(ModelError::LabelTooLong(label.len()));
    }
    Ok(())
}

// ── Query result types ───────────────────────────────────────────

/// Who holds an hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupant {
    Reservation { id: Ulid, status: ReservationStatus },
    Recurring { id: Ulid },
}

impl Occupant {
    pub fn id(&self) -> Ulid {
        match self {
            Occupant::Reservation { id, .. } | Occupant::Recurring { id } => *id,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Occupant::Reservation { .. } => "reservation",
            Occupant::Recurring { .. } => "fixed_client",
        }
    }
}

/// One bookable hour on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub hour: Hour,
    pub price: Amount,
    pub tier: Tier,
    pub label: String,
    pub occupied_by: Option<Occupant>,
}

impl Slot {
    pub fn is_occupied(&self) -> bool {
        self.occupied_by.is_some()
    }
}

/// Result of a price lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub price: Amount,
    pub tier: Tier,
    pub label: String,
}

impl PriceQuote {
    pub const UNKNOWN_LABEL: &'static str = "—";

    /// Hour falls in a gap between bands.
    pub fn unknown() -> Self {
        Self {
            price: 0,
            tier: Tier::Mid,
            label: Self::UNKNOWN_LABEL.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.price == 0 && self.label == Self::UNKNOWN_LABEL
    }
}

/// Claims on a date, unmerged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Occupancy {
    pub reservations: Vec<Reservation>,
    pub recurring: Vec<RecurringBooking>,
}

/// Two or more claims on the same hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyConflict {
    pub date: NaiveDate,
    pub hour: Hour,
    pub claims: Vec<Occupant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MonthTotal {
    pub court_revenue: Amount,
    pub shop_revenue: Amount,
    pub total: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DaySummary {
    pub pending: u32,
    pub confirmed: u32,
    pub occupied_hours: u32,
    pub revenue: Amount,
}

// ── Errors ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    InvalidHourSpan { start: Hour, end: Hour },
    InvalidOperatingHours { start: Hour, end: Hour },
    InvalidDayOfWeek(u8),
    InvalidHour(String),
    InvalidDate(String),
    NonPositivePrice(Amount),
    NegativeAmount(Amount),
    AmountTooLarge(Amount),
    AmountOverflow,
    InvalidQuantity(u32),
    UnknownStatus(String),
    LabelTooLong(usize),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidHourSpan { start, end } => {
                write!(f, "invalid hour span [{start}, {end}): need start < end <= 24")
            }
            ModelError::InvalidOperatingHours { start, end } => {
                write!(f, "invalid operating hours [{start}, {end}): need start <= end <= 24")
            }
            ModelError::InvalidDayOfWeek(n) => write!(f, "invalid day of week: {n} (0=Sunday..6=Saturday)"),
            ModelError::InvalidHour(s) => write!(f, "invalid hour: {s}"),
            ModelError::InvalidDate(s) => write!(f, "invalid date: {s} (expected YYYY-MM-DD)"),
            ModelError::NonPositivePrice(p) => write!(f, "band price must be positive, got {p}"),
            ModelError::NegativeAmount(a) => write!(f, "amount must not be negative, got {a}"),
            ModelError::AmountTooLarge(a) => write!(f, "amount too large: {a} (max {MAX_AMOUNT})"),
            ModelError::AmountOverflow => write!(f, "amount total out of range"),
            ModelError::InvalidQuantity(q) => write!(f, "quantity must be positive, got {q}"),
            ModelError::UnknownStatus(s) => write!(f, "unknown status: {s}"),
            ModelError::LabelTooLong(len) => write!(f, "label too long: {len} bytes"),
        }
    }
}

impl std::error::Error for ModelError {}
