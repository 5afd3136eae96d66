//! Seat adoption ratio and classification.

use serde::Serialize;

/// Adoption band for the active-users / seats ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AdoptionLevel {
    /// 70% and above
    Strong,
    /// 40% to 69%
    Moderate,
    /// Below 40%
    Underutilized,
}

impl AdoptionLevel {
    /// All bands, best first.
    pub const ALL: [AdoptionLevel; 3] = [
        AdoptionLevel::Strong,
        AdoptionLevel::Moderate,
        AdoptionLevel::Underutilized,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AdoptionLevel::Strong => "Strong",
            AdoptionLevel::Moderate => "Moderate",
            AdoptionLevel::Underutilized => "Underutilized",
        }
    }

    /// Human-readable ratio range for this band.
    pub fn range_label(&self) -> &'static str {
        match self {
            AdoptionLevel::Strong => "≥70%",
            AdoptionLevel::Moderate => "40-69%",
            AdoptionLevel::Underutilized => "<40%",
        }
    }

    /// Classify a rounded percentage. Lower bounds are inclusive.
    pub fn from_ratio(ratio: u32) -> Self {
        if ratio >= 70 {
            AdoptionLevel::Strong
        } else if ratio >= 40 {
            AdoptionLevel::Moderate
        } else {
            AdoptionLevel::Underutilized
        }
    }
}

impl std::fmt::Display for AdoptionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Adoption ratio (rounded percent) and its band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdoptionStatus {
    pub ratio: u32,
    pub level: AdoptionLevel,
}

/// Compute adoption from the latest active-user count and current seat total.
///
/// A zero seat total yields a 0% ratio rather than dividing by zero.
pub fn adoption_status(active_users: u64, total_seats: u64) -> AdoptionStatus {
    let ratio = if total_seats > 0 {
        (active_users as f64 / total_seats as f64 * 100.0).round() as u32
    } else {
        0
    };
    AdoptionStatus {
        ratio,
        level: AdoptionLevel::from_ratio(ratio),
    }
}
