//! Timestamp convention for the TEXT columns.
//!
//! Every timestamp is stored as RFC 3339 UTC with fixed microsecond
//! precision, e.g. `2024-12-23T00:00:00.000000Z`. The fixed width makes
//! string comparison equal chronological comparison, which the
//! `week_start >= ?` range filter relies on.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

pub fn encode(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("bad timestamp in database: {s:?}"))
}
