//! Signed-in user's progress, history and dashboard analytics.

use futures::future;

use crate::api::Backend;
use crate::error::Outcome;
use crate::types::*;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserState {
    pub progress: UserProgress,
    pub history: Vec<PracticeHistoryEntry>,
    pub points_audit: Vec<PointsAuditEntry>,
    pub calendar: Vec<CalendarDay>,
    pub analytics: DashboardAnalytics,
    pub recent_activity: Vec<RecentActivity>,
    pub auto_refresh: bool,
    pub offline: bool,
    pub last_refreshed: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub analytics: DashboardAnalytics,
    pub recent_activity: Vec<RecentActivity>,
}

impl UserState {
    pub fn apply_dashboard(&mut self, outcome: Outcome<DashboardSnapshot>, now: i64) {
        self.offline = outcome.is_degraded();
        if let Some(snapshot) = outcome.into_value() {
            self.analytics = snapshot.analytics;
            self.recent_activity = snapshot.recent_activity;
            self.last_refreshed = Some(now);
        }
    }

    pub fn apply_progress(&mut self, outcome: Outcome<UserProgress>) {
        if let Some(progress) = outcome.into_value() {
            self.progress = progress;
        }
    }

    pub fn practiced_days(&self) -> usize {
        self.calendar.iter().filter(|d| d.practiced).count()
    }

    /// Net points from the audit trail, including deductions.
    pub fn audited_points(&self) -> i64 {
        self.points_audit.iter().map(|e| e.points as i64).sum()
    }
}

/// Analytics and recent activity fetched together. Either failing yields
/// defaults for that half and marks the snapshot degraded.
pub async fn refresh_dashboard<B: Backend>(backend: &B, user_id: &str) -> Outcome<DashboardSnapshot> {
    let (analytics, activity) = future::join(
        backend.fetch_dashboard_analytics(user_id),
        backend.fetch_recent_activity(user_id),
    )
    .await;

    let degraded = analytics.is_err() || activity.is_err();
    if let Err(e) = analytics.as_ref().and(activity.as_ref()) {
        tracing::warn!("dashboard refresh incomplete: {}", e);
    }
    let snapshot = DashboardSnapshot {
        analytics: analytics.unwrap_or_default(),
        recent_activity: activity.unwrap_or_default(),
    };
    if degraded {
        Outcome::Degraded(snapshot)
    } else {
        Outcome::Live(snapshot)
    }
}

pub async fn fetch_progress<B: Backend>(backend: &B, user_id: &str) -> Outcome<UserProgress> {
    Outcome::or_degraded(backend.fetch_progress(user_id).await, UserProgress::default)
}

pub async fn fetch_history<B: Backend>(backend: &B, user_id: &str) -> Outcome<Vec<PracticeHistoryEntry>> {
    Outcome::or_degraded(backend.fetch_practice_history(user_id).await, Vec::new)
}

pub async fn fetch_points_audit<B: Backend>(backend: &B, user_id: &str) -> Outcome<Vec<PointsAuditEntry>> {
    Outcome::or_degraded(backend.fetch_points_audit(user_id).await, Vec::new)
}

/// `month` is `YYYY-MM`.
pub async fn fetch_calendar<B: Backend>(backend: &B, user_id: &str, month: &str) -> Outcome<Vec<CalendarDay>> {
    Outcome::or_degraded(backend.fetch_calendar(user_id, month).await, Vec::new)
}
