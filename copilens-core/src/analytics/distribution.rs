//! Seat distributions by team, editor and activity recency.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::recency::{activity_recency, RecencyBucket};
use crate::types::Seat;

/// One slice of a distribution chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionEntry {
    pub label: String,
    pub count: u64,
}

/// Count items per label, in order of first encounter.
pub fn group_by<T, F>(items: &[T], mut key_fn: F) -> Vec<DistributionEntry>
where
    F: FnMut(&T) -> String,
{
    let mut entries: Vec<DistributionEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let label = key_fn(item);
        match index.get(&label) {
            Some(&idx) => entries[idx].count += 1,
            None => {
                index.insert(label.clone(), entries.len());
                entries.push(DistributionEntry { label, count: 1 });
            }
        }
    }

    entries
}

/// Seats per assigning team; seats without a team land in "Unassigned".
pub fn team_distribution(seats: &[Seat]) -> Vec<DistributionEntry> {
    group_by(seats, |s| s.team_label().to_string())
}

/// Seats per editor family; seats without an editor land in "Unknown".
pub fn editor_distribution(seats: &[Seat]) -> Vec<DistributionEntry> {
    group_by(seats, |s| s.editor_label())
}

/// Seats per recency bucket in fixed order, empty buckets omitted.
pub fn activity_distribution(seats: &[Seat], now: DateTime<Utc>) -> Vec<DistributionEntry> {
    let mut counts = [0u64; 4];
    for seat in seats {
        let bucket = activity_recency(seat.last_activity_at, now).bucket();
        let idx = RecencyBucket::ALL
            .iter()
            .position(|b| *b == bucket)
            .unwrap_or(RecencyBucket::ALL.len() - 1);
        counts[idx] += 1;
    }

    RecencyBucket::ALL
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(bucket, count)| DistributionEntry {
            label: bucket.label().to_string(),
            count,
        })
        .collect()
}
