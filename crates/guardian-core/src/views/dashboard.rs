use chrono::NaiveDate;
use serde::Serialize;

use crate::api::ApiClient;
use crate::auth::Claims;
use crate::models::Policy;
use crate::renewals::{self, RenewalWindow, StatusTag};
use crate::utils::format_date;

use super::LoadState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DashboardTab {
    #[default]
    All,
    /// Renewals due within the next 30 days.
    Upcoming,
}

/// One line of the policy table, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyRow {
    pub id: i64,
    pub policy_number: String,
    pub client_name: String,
    pub policy_type: String,
    pub premium: String,
    pub renewal_date: String,
    pub status: String,
    pub tag: StatusTag,
    pub days_until_renewal: Option<i64>,
    /// Set when the renewal falls inside the upcoming window.
    pub highlight: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    policies: Vec<Policy>,
    today: NaiveDate,
}

impl Dashboard {
    pub fn new(policies: Vec<Policy>, today: NaiveDate) -> Self {
        Self { policies, today }
    }

    pub async fn load(api: &ApiClient, today: NaiveDate) -> LoadState<Self> {
        let result = api
            .fetch_policies()
            .await
            .map(|policies| Self::new(policies, today));
        LoadState::from_result(result, "dashboard")
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn upcoming(&self) -> Vec<RenewalWindow<'_>> {
        renewals::upcoming_renewals(&self.policies, self.today)
    }

    pub fn alerts(&self) -> Vec<RenewalWindow<'_>> {
        renewals::renewal_alerts(&self.policies, self.today)
    }

    pub fn alert_count(&self) -> usize {
        self.alerts().len()
    }

    /// Rows for a tab. The upcoming tab lists the soonest renewal first.
    pub fn rows(&self, tab: DashboardTab) -> Vec<PolicyRow> {
        match tab {
            DashboardTab::All => self.policies.iter().map(|p| self.row(p)).collect(),
            DashboardTab::Upcoming => {
                let mut windows = self.upcoming();
                windows.sort_by_key(|w| w.days_until_renewal);
                windows.into_iter().map(|w| self.row(w.policy)).collect()
            }
        }
    }

    fn row(&self, policy: &Policy) -> PolicyRow {
        PolicyRow {
            id: policy.id,
            policy_number: policy.policy_number.clone(),
            client_name: policy.client_name().to_string(),
            policy_type: policy.policy_type_display().to_string(),
            premium: policy.premium_display(),
            renewal_date: policy
                .renewal_date
                .as_deref()
                .map(format_date)
                .unwrap_or_else(|| "-".to_string()),
            status: policy.status.label().to_string(),
            tag: policy.status_tag(),
            days_until_renewal: policy
                .renewal_date()
                .map(|d| renewals::days_until_renewal(d, self.today)),
            highlight: renewals::is_upcoming(policy, self.today),
        }
    }
}

pub fn greeting(claims: &Claims) -> String {
    format!("Welcome back, {}", claims.display_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PolicyStatus;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn policy(id: i64, status: &str, days: i64) -> Policy {
        let renewal = today() + Duration::days(days);
        serde_json::from_value(serde_json::json!({
            "id": id,
            "policy_number": format!("POL-{}", id),
            "client_details": {"id": 10 + id, "name": format!("Client {}", id)},
            "policy_type": "HOME",
            "status": status,
            "premium_amount": "950",
            "renewal_date": renewal.format("%Y-%m-%d").to_string(),
        }))
        .unwrap()
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(
            vec![
                policy(1, "ACTIVE", 20),
                policy(2, "LAPSED", 5),
                policy(3, "PENDING", 45),
                policy(4, "ACTIVE", 3),
                policy(5, "PENDING", 60),
            ],
            today(),
        )
    }

    #[test]
    fn test_all_tab_keeps_server_order() {
        let rows = dashboard().rows(DashboardTab::All);
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let lapsed = &rows[1];
        assert_eq!(lapsed.tag, StatusTag::Negative);
        assert!(!lapsed.highlight);
        assert_eq!(lapsed.days_until_renewal, Some(5));

        let first = &rows[0];
        assert!(first.highlight);
        assert_eq!(first.client_name, "Client 1");
        assert_eq!(first.policy_type, "Home Insurance");
        assert_eq!(first.premium, "$950.00");
        assert_eq!(first.renewal_date, "Nov 05, 2026");
        assert_eq!(first.status, "Active");
    }

    #[test]
    fn test_upcoming_tab_sorted_by_soonest() {
        let rows = dashboard().rows(DashboardTab::Upcoming);
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4, 1]);
        assert!(rows.iter().all(|r| r.highlight));
    }

    #[test]
    fn test_alert_count() {
        assert_eq!(dashboard().alert_count(), 1);
        assert_eq!(dashboard().alerts()[0].policy.status, PolicyStatus::Pending);
    }

    #[test]
    fn test_empty_dashboard() {
        let empty = Dashboard::new(Vec::new(), today());
        assert!(empty.rows(DashboardTab::All).is_empty());
        assert!(empty.rows(DashboardTab::Upcoming).is_empty());
        assert_eq!(empty.alert_count(), 0);
    }
}
