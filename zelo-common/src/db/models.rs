//! Shared database models for Zelo services

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of a timeline event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    /// A reported problem (the only category the recurrence engine analyzes)
    Problem,
    /// Completed or planned maintenance work
    Maintenance,
    /// A decision recorded against the asset
    Decision,
    /// An inspection report
    Inspection,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Problem => "problem",
            EventCategory::Maintenance => "maintenance",
            EventCategory::Decision => "decision",
            EventCategory::Inspection => "inspection",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "problem" => Some(EventCategory::Problem),
            "maintenance" => Some(EventCategory::Maintenance),
            "decision" => Some(EventCategory::Decision),
            "inspection" => Some(EventCategory::Inspection),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry in an asset's maintenance timeline
///
/// Read-only input for the recurrence engine; only `Problem` events are
/// analyzed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: EventCategory,
    pub recorded_at: DateTime<Utc>,
}

impl TimelineEvent {
    /// Combined searchable text: title plus description (empty when absent)
    pub fn combined_text(&self) -> String {
        match &self.description {
            Some(desc) => format!("{} {}", self.title, desc),
            None => self.title.clone(),
        }
    }
}

/// Qualitative frequency bucket for a tracked keyword, derived from the
/// keyword's share of the asset's total problem volume
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FrequencyTier {
    Rare,
    Occasional,
    Frequent,
    VeryFrequent,
}

impl FrequencyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrequencyTier::Rare => "rare",
            FrequencyTier::Occasional => "occasional",
            FrequencyTier::Frequent => "frequent",
            FrequencyTier::VeryFrequent => "very-frequent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rare" => Some(FrequencyTier::Rare),
            "occasional" => Some(FrequencyTier::Occasional),
            "frequent" => Some(FrequencyTier::Frequent),
            "very-frequent" => Some(FrequencyTier::VeryFrequent),
            _ => None,
        }
    }
}

impl std::fmt::Display for FrequencyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracked recurrence state for one keyword on one asset
///
/// Unique per `(asset_id, company_id, keyword)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceRecord {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub company_id: Uuid,
    /// Normalized token, always longer than 3 characters
    pub keyword: String,
    pub occurrence_count: i64,
    pub last_occurrence_date: DateTime<Utc>,
    pub frequency_tier: FrequencyTier,
    /// True while an alert for this keyword is active; flipped true at most
    /// once per recurrence episode, never reset by the engine
    pub alert_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Severity of an alert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl AlertSeverity {
    /// Severity for a recurring-problem alert given the keyword's
    /// occurrence count
    ///
    /// Emission only happens at count >= 3, so `Low` is defensive.
    pub fn for_count(count: i64) -> Self {
        if count >= 5 {
            AlertSeverity::High
        } else if count >= 3 {
            AlertSeverity::Medium
        } else {
            AlertSeverity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(AlertSeverity::Low),
            "medium" => Some(AlertSeverity::Medium),
            "high" => Some(AlertSeverity::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notification-worthy finding, surfaced to users by the host product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub company_id: Uuid,
    /// Link to the recurrence record that triggered the alert, when known
    pub recurrence_id: Option<Uuid>,
    pub title: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_thresholds() {
        assert_eq!(AlertSeverity::for_count(2), AlertSeverity::Low);
        assert_eq!(AlertSeverity::for_count(3), AlertSeverity::Medium);
        assert_eq!(AlertSeverity::for_count(4), AlertSeverity::Medium);
        assert_eq!(AlertSeverity::for_count(5), AlertSeverity::High);
        assert_eq!(AlertSeverity::for_count(12), AlertSeverity::High);
    }

    #[test]
    fn tier_round_trip() {
        for tier in [
            FrequencyTier::Rare,
            FrequencyTier::Occasional,
            FrequencyTier::Frequent,
            FrequencyTier::VeryFrequent,
        ] {
            assert_eq!(FrequencyTier::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(FrequencyTier::parse("unknown"), None);
    }

    #[test]
    fn category_round_trip() {
        for cat in [
            EventCategory::Problem,
            EventCategory::Maintenance,
            EventCategory::Decision,
            EventCategory::Inspection,
        ] {
            assert_eq!(EventCategory::parse(cat.as_str()), Some(cat));
        }
    }

    #[test]
    fn combined_text_defaults_description_to_empty() {
        let event = TimelineEvent {
            id: Uuid::new_v4(),
            asset_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            title: "Vazamento no telhado".to_string(),
            description: None,
            category: EventCategory::Problem,
            recorded_at: Utc::now(),
        };
        assert_eq!(event.combined_text(), "Vazamento no telhado");
    }
}
