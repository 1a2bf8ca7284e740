//! Renewal window and status tag classification.
//!
//! Everything here is a pure function of its inputs. "Today" is always passed
//! in so results do not depend on when they are computed.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Policy, PolicyStatus};

/// Last day (inclusive) of the upcoming-renewal window.
pub const RENEWAL_WINDOW_DAYS: i64 = 30;

/// Days-before-renewal at which agents are reminded to reach out.
pub const ALERT_INTERVALS: [i64; 3] = [90, 60, 30];

/// A policy together with how far away its renewal is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalWindow<'a> {
    pub policy: &'a Policy,
    pub days_until_renewal: i64,
}

/// Whole calendar days from `today` until `renewal_date`. Negative when the
/// renewal date has passed.
pub fn days_until_renewal(renewal_date: NaiveDate, today: NaiveDate) -> i64 {
    (renewal_date - today).num_days()
}

/// A policy is upcoming when it has not lapsed and renews within the next
/// [`RENEWAL_WINDOW_DAYS`] days, today included.
pub fn is_upcoming(policy: &Policy, today: NaiveDate) -> bool {
    window_for(policy, today).is_some()
}

pub fn upcoming_renewals(policies: &[Policy], today: NaiveDate) -> Vec<RenewalWindow<'_>> {
    policies
        .iter()
        .filter_map(|policy| window_for(policy, today))
        .collect()
}

fn window_for(policy: &Policy, today: NaiveDate) -> Option<RenewalWindow<'_>> {
    if policy.status == PolicyStatus::Lapsed {
        return None;
    }
    let days = days_until_renewal(policy.renewal_date()?, today);
    (0..=RENEWAL_WINDOW_DAYS)
        .contains(&days)
        .then_some(RenewalWindow {
            policy,
            days_until_renewal: days,
        })
}

/// Policies that hit one of the [`ALERT_INTERVALS`] exactly today. Only
/// active and pending policies are worth a reminder.
pub fn renewal_alerts(policies: &[Policy], today: NaiveDate) -> Vec<RenewalWindow<'_>> {
    policies
        .iter()
        .filter(|p| matches!(p.status, PolicyStatus::Active | PolicyStatus::Pending))
        .filter_map(|policy| {
            let days = days_until_renewal(policy.renewal_date()?, today);
            ALERT_INTERVALS.contains(&days).then_some(RenewalWindow {
                policy,
                days_until_renewal: days,
            })
        })
        .collect()
}

/// Visual tone for a policy status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum StatusTag {
    Positive,
    Warning,
    Negative,
    Neutral,
}

impl StatusTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTag::Positive => "positive",
            StatusTag::Warning => "warning",
            StatusTag::Negative => "negative",
            StatusTag::Neutral => "neutral",
        }
    }
}

pub fn status_tag(status: &PolicyStatus) -> StatusTag {
    match status {
        PolicyStatus::Active => StatusTag::Positive,
        PolicyStatus::Pending => StatusTag::Warning,
        PolicyStatus::Lapsed => StatusTag::Negative,
        // Includes statuses introduced server-side after this client shipped
        _ => StatusTag::Neutral,
    }
}
