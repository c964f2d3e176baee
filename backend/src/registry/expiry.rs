//! Subscription lifecycle status.
//!
//! Everything here is a pure function of `(start date, package, now)`. Nothing
//! is cached or persisted since the result changes as `now` moves. Malformed
//! dates or packages never raise: they surface as `None` / `Unknown`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownVariant;
use crate::model::{Package, DATE_FORMAT};

/// Days left at which a subscription counts as expiring soon (inclusive).
pub const EXPIRING_SOON_DAYS: i64 = 7;

/// Report section a row falls into. Sections never interleave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UrgencyGroup {
    Live,
    Expired,
    NoExpiry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    Active,
    ExpiringSoon,
    Expired,
    Lifetime,
    Unknown,
}

impl StatusClass {
    pub const ALL: [StatusClass; 5] = [
        StatusClass::Active,
        StatusClass::ExpiringSoon,
        StatusClass::Expired,
        StatusClass::Lifetime,
        StatusClass::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatusClass::Active => "active",
            StatusClass::ExpiringSoon => "expiring_soon",
            StatusClass::Expired => "expired",
            StatusClass::Lifetime => "lifetime",
            StatusClass::Unknown => "unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusClass::Active => "Active",
            StatusClass::ExpiringSoon => "Expiring Soon",
            StatusClass::Expired => "Expired",
            StatusClass::Lifetime => "Lifetime",
            StatusClass::Unknown => "Unknown",
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            StatusClass::Active | StatusClass::Lifetime => "🟢",
            StatusClass::ExpiringSoon => "🟠",
            StatusClass::Expired => "🔴",
            StatusClass::Unknown => "⚪",
        }
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatusClass {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        StatusClass::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s) || c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant::new("status", s))
    }
}

/// Expiry date for a stored start date and package name.
///
/// `None` for lifetime packages, unrecognised packages and start dates that are
/// not `YYYY-MM-DD`.
pub fn compute_expiry_date(start_date: &str, package: &str) -> Option<NaiveDate> {
    let start = NaiveDate::parse_from_str(start_date.trim(), DATE_FORMAT).ok()?;
    let package: Package = package.parse().ok()?;
    package.expiry_from(start)
}

/// Whole days from `now` until `expiry_date`.
///
/// The time of day in `now` is dropped before subtracting, so an expiry of
/// today gives `0` and one of yesterday gives `-1`.
pub fn compute_days_remaining(expiry_date: Option<NaiveDate>, now: NaiveDateTime) -> Option<i64> {
    let expiry = expiry_date?;
    Some(expiry.signed_duration_since(now.date()).num_days())
}

pub fn classify_status(days_remaining: Option<i64>, package: Option<Package>) -> StatusClass {
    if package == Some(Package::Lifetime) {
        return StatusClass::Lifetime;
    }
    match days_remaining {
        None => StatusClass::Unknown,
        Some(d) if d < 0 => StatusClass::Expired,
        Some(d) if d <= EXPIRING_SOON_DAYS => StatusClass::ExpiringSoon,
        Some(_) => StatusClass::Active,
    }
}

/// Urgency ordering for the expiry report, ascending.
///
/// Live subscriptions sort by days left, however far out. Expired ones follow,
/// the longest expired last. Lifetime and unknown rows share the final key.
pub fn urgency_sort_key(
    status: StatusClass,
    days_remaining: Option<i64>,
) -> (UrgencyGroup, i64) {
    match (status, days_remaining) {
        (StatusClass::Lifetime | StatusClass::Unknown, _) | (_, None) => {
            (UrgencyGroup::NoExpiry, 0)
        }
        (StatusClass::Expired, Some(d)) => (UrgencyGroup::Expired, d.saturating_neg()),
        (_, Some(d)) => (UrgencyGroup::Live, d),
    }
}

/// Derived status of one subscription, recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpiryStatus {
    pub expiry_date: Option<NaiveDate>,
    pub days_remaining: Option<i64>,
    pub status: StatusClass,
}

impl ExpiryStatus {
    pub fn evaluate(start_date: &str, package: &str, now: NaiveDateTime) -> Self {
        let parsed_package = package.parse::<Package>().ok();
        if parsed_package == Some(Package::Lifetime) {
            return Self {
                expiry_date: None,
                days_remaining: None,
                status: StatusClass::Lifetime,
            };
        }

        let expiry_date = compute_expiry_date(start_date, package);
        let days_remaining = compute_days_remaining(expiry_date, now);
        Self {
            expiry_date,
            days_remaining,
            status: classify_status(days_remaining, parsed_package),
        }
    }

    pub fn sort_key(&self) -> (UrgencyGroup, i64) {
        urgency_sort_key(self.status, self.days_remaining)
    }
}
