use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use chrono_tz::US::Pacific;
use solara_core::order::Location;
use tracing::debug;

/// Local hour (in the reference timezone) after which next-day
/// bookings close.
pub const CUTOFF_HOUR: u32 = 17;

/// User-facing message when filtering leaves no usable dates.
pub const NO_DATES_MESSAGE: &str = "No available dates in your selection: surveys are booked on \
     weekdays only, and next-day appointments close at 5 PM Pacific. \
     Please choose different weekday dates.";

/// A regional booking blackout: dates on which no survey may be booked
/// for addresses matching any of the markers. Policy data, not logic;
/// edit the table, not the filter.
pub struct RegionalBlackout {
    pub region: &'static str,
    pub address_markers: &'static [&'static str],
    pub dates: &'static [(i32, u32, u32)],
}

pub const REGIONAL_BLACKOUTS: &[RegionalBlackout] = &[RegionalBlackout {
    region: "Florida",
    address_markers: &[", FL ", "Florida"],
    dates: &[(2025, 5, 15), (2025, 5, 16)],
}];

/// Why a candidate date was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalReason {
    Weekend,
    NextDayCutoff,
    RegionalBlackout(&'static str),
}

impl std::fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemovalReason::Weekend => write!(f, "weekend"),
            RemovalReason::NextDayCutoff => write!(f, "next-day cutoff"),
            RemovalReason::RegionalBlackout(region) => write!(f, "{} blackout", region),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemovedDate {
    pub date: NaiveDate,
    pub reason: RemovalReason,
}

#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub kept: Vec<NaiveDate>,
    pub removed: Vec<RemovedDate>,
}

/// Current time in the reference timezone used by the cutoff rule.
pub fn pacific_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&Pacific)
}

/// Apply the booking policy to a set of candidate dates: weekend
/// exclusion, the 5 PM next-day cutoff, then regional blackouts for
/// the order's address. Pure; removals are returned for the caller to
/// log alongside the request.
pub fn filter_dates(dates: &[NaiveDate], location: &Location, now: DateTime<Tz>) -> FilterOutcome {
    let mut kept = Vec::new();
    let mut removed = Vec::new();

    for &date in dates {
        match date_violation(date, location, now) {
            Some(reason) => {
                debug!(%date, %reason, "candidate date removed");
                removed.push(RemovedDate { date, reason });
            }
            None => kept.push(date),
        }
    }

    FilterOutcome { kept, removed }
}

/// First rule violated by `date`, if any. Rules apply in order:
/// weekend, cutoff, blackout.
pub fn date_violation(date: NaiveDate, location: &Location, now: DateTime<Tz>) -> Option<RemovalReason> {
    if is_weekend(date) {
        return Some(RemovalReason::Weekend);
    }
    if blocked_by_cutoff(date, now) {
        return Some(RemovalReason::NextDayCutoff);
    }
    for blackout in REGIONAL_BLACKOUTS {
        if region_matches(blackout, &location.address) && blackout_date(blackout, date) {
            return Some(RemovalReason::RegionalBlackout(blackout.region));
        }
    }
    None
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// After the cutoff hour, tomorrow (relative to the reference clock)
/// is no longer bookable. Dates further out are unaffected.
pub fn blocked_by_cutoff(date: NaiveDate, now: DateTime<Tz>) -> bool {
    now.hour() >= CUTOFF_HOUR && date == now.date_naive() + Duration::days(1)
}

/// Weekend check against a provider slot's `from` timestamp. Guards
/// against weekend windows slipping through upstream filtering; the
/// historical single-date patch is subsumed by this check.
pub fn slot_on_weekend(from_timestamp: &str) -> bool {
    // get() rather than a byte slice: the timestamp comes from the
    // provider and may not be ASCII
    let Some(date_part) = from_timestamp.get(..10) else {
        return false;
    };
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => is_weekend(date),
        Err(_) => false,
    }
}

fn region_matches(blackout: &RegionalBlackout, address: &str) -> bool {
    blackout.address_markers.iter().any(|m| address.contains(m))
}

fn blackout_date(blackout: &RegionalBlackout, date: NaiveDate) -> bool {
    blackout
        .dates
        .iter()
        .any(|&(y, m, d)| date.year() == y && date.month() == m && date.day() == d)
}
