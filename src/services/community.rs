// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Community member count shown on the home page.

use crate::db::Store;
use crate::error::AppError;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CommunityStats {
    pub members: u64,
    pub label: String,
}

/// Nearest 50 below 1000, nearest 100 from there on.
pub fn rounded_count(count: u64) -> u64 {
    let step = if count < 1000 { 50 } else { 100 };
    (count + step / 2) / step * step
}

/// "N+" below 1000, otherwise thousands with one decimal ("1.2k+", "3k+").
pub fn format_rounded_count(rounded: u64) -> String {
    if rounded < 1000 {
        return format!("{rounded}+");
    }
    let thousands = format!("{:.1}", rounded as f64 / 1000.0);
    let thousands = thousands.strip_suffix(".0").unwrap_or(&thousands);
    format!("{thousands}k+")
}

impl CommunityStats {
    pub fn from_count(count: u64) -> Self {
        let members = rounded_count(count);
        Self {
            members,
            label: format_rounded_count(members),
        }
    }
}

pub async fn community_stats(store: &Store) -> Result<CommunityStats, AppError> {
    let count = store.count_users().await?;
    tracing::debug!(count, "Counted community members");
    Ok(CommunityStats::from_count(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_step() {
        assert_eq!(rounded_count(0), 0);
        assert_eq!(rounded_count(24), 0);
        assert_eq!(rounded_count(25), 50);
        assert_eq!(rounded_count(437), 450);
        assert_eq!(rounded_count(974), 950);
        assert_eq!(rounded_count(975), 1000);
        assert_eq!(rounded_count(1249), 1200);
        assert_eq!(rounded_count(1250), 1300);
    }

    #[test]
    fn labels() {
        assert_eq!(format_rounded_count(450), "450+");
        assert_eq!(format_rounded_count(1000), "1k+");
        assert_eq!(format_rounded_count(1200), "1.2k+");
        assert_eq!(format_rounded_count(12300), "12.3k+");
    }

    #[tokio::test]
    async fn stats_from_memory_store() {
        let store = Store::memory();
        let stats = community_stats(&store).await.unwrap();
        assert_eq!(stats, CommunityStats::from_count(0));
        assert_eq!(stats.label, "0+");
    }
}
