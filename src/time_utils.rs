// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time, formatted for storage.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_with_millis_and_z() {
        let date = Utc.with_ymd_and_hms(2025, 10, 31, 9, 0, 0).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2025-10-31T09:00:00.000Z");
    }
}
