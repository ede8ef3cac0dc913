//! Punch/kick/kata/technique accumulator for one practice session.

use chrono::NaiveDate;

use crate::api::Backend;
use crate::error::{Outcome, Result};
use crate::stats;
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Active { started_at: i64 },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PracticeState {
    pub phase: Phase,
    pub punches: u32,
    pub kicks: u32,
    pub katas: Vec<KataRep>,
    pub techniques: Vec<TechniqueCount>,
    pub session_timer: u32,
    pub history: Vec<SessionSummary>,
    pub totals: PracticeTotals,
    pub streak: Streak,
    pub last_points: Option<u32>,
}

impl PracticeState {
    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active { .. })
    }

    /// Idle → Active. Returns false, changing nothing, if a session is
    /// already running; callers only start a tick interval on true.
    pub fn start_session(&mut self, now: i64) -> bool {
        if self.is_active() {
            return false;
        }
        self.reset_counters();
        self.phase = Phase::Active { started_at: now };
        self.last_points = None;
        true
    }

    pub fn tick(&mut self) {
        if self.is_active() {
            self.session_timer += 1;
        }
    }

    pub fn add_punches(&mut self, n: u32) {
        if self.is_active() {
            self.punches += n;
        }
    }

    pub fn add_kicks(&mut self, n: u32) {
        if self.is_active() {
            self.kicks += n;
        }
    }

    pub fn add_kata_repetition(&mut self, kata_id: u32, name: &str) {
        if !self.is_active() {
            return;
        }
        match self.katas.iter_mut().find(|k| k.kata_id == kata_id) {
            Some(k) => k.repetitions += 1,
            None => self.katas.push(KataRep { kata_id, name: name.to_string(), repetitions: 1 }),
        }
    }

    pub fn add_technique(&mut self, name: &str, points: u32) {
        if !self.is_active() {
            return;
        }
        match self.techniques.iter_mut().find(|t| t.name == name) {
            Some(t) => t.count += 1,
            None => self.techniques.push(TechniqueCount { name: name.to_string(), count: 1, points }),
        }
    }

    pub fn current_points(&self) -> u32 {
        stats::session_points(self.punches, self.kicks, &self.katas, &self.techniques)
    }

    /// Active → Idle. Scores the session, records it in history and totals
    /// and zeroes the counters. `None` when no session is running.
    pub fn end_session(&mut self, now: i64) -> Option<PracticeRecord> {
        let Phase::Active { started_at } = self.phase else {
            return None;
        };

        let points_earned = self.current_points();
        let record = PracticeRecord {
            punches: self.punches,
            kicks: self.kicks,
            katas: std::mem::take(&mut self.katas),
            techniques: std::mem::take(&mut self.techniques),
            duration_secs: self.session_timer,
            points_earned,
            started_at,
            ended_at: now,
        };

        let summary = SessionSummary {
            ended_at: now,
            duration_secs: record.duration_secs,
            points_earned,
            punches: record.punches,
            kicks: record.kicks,
            kata_reps: stats::kata_reps(&record.katas),
            technique_reps: stats::technique_reps(&record.techniques),
        };
        self.totals.add(&summary);
        self.history.push(summary);

        self.phase = Phase::Idle;
        self.reset_counters();
        self.last_points = Some(points_earned);
        Some(record)
    }

    /// Take the backend's streak when available, else estimate it locally.
    pub fn apply_streak(&mut self, fetched: Option<u32>, today: NaiveDate) {
        self.streak = match fetched {
            Some(current) => Streak {
                current,
                best: self.streak.best.max(current),
                last_practice: Some(today),
            },
            None => stats::advance_streak(&self.streak, today),
        };
    }

    fn reset_counters(&mut self) {
        self.punches = 0;
        self.kicks = 0;
        self.katas.clear();
        self.techniques.clear();
        self.session_timer = 0;
    }
}

/// Best effort: a failed submission is logged and reported, never retried.
pub async fn submit_session<B: Backend>(backend: &B, user_id: &str, record: &PracticeRecord) -> Outcome<()> {
    let result = backend.submit_practice_session(user_id, record).await;
    match &result {
        Ok(()) => tracing::info!("practice session saved ({} points)", record.points_earned),
        Err(e) => tracing::warn!("practice session not saved: {}", e),
    }
    Outcome::from_result(result)
}

/// Current streak from the backend, if reachable.
pub async fn fetch_streak<B: Backend>(backend: &B, user_id: &str) -> Option<u32> {
    match backend.fetch_progress(user_id).await {
        Ok(progress) => Some(progress.current_streak),
        Err(e) => {
            tracing::warn!("streak unavailable, estimating locally: {}", e);
            None
        }
    }
}

pub async fn record_quick_practice<B: Backend>(backend: &B, practice: &QuickPractice) -> Result<()> {
    backend.record_practice(practice).await
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use futures::executor::block_on;

    use super::*;
    use crate::api::mock::MockBackend;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn counters_ignore_input_while_idle() {
        let mut state = PracticeState::default();
        state.add_punches(10);
        state.add_kata_repetition(2, "Heian Shodan");
        state.tick();
        assert_eq!(state.punches, 0);
        assert!(state.katas.is_empty());
        assert_eq!(state.session_timer, 0);
        assert_eq!(state.end_session(10), None);
    }

    #[test]
    fn starting_twice_keeps_one_session() {
        let mut state = PracticeState::default();
        assert!(state.start_session(100));
        state.add_punches(5);
        assert!(!state.start_session(200));
        assert_eq!(state.phase, Phase::Active { started_at: 100 });
        assert_eq!(state.punches, 5);
    }

    #[test]
    fn empty_session_scores_base_points() {
        let mut state = PracticeState::default();
        state.start_session(0);
        let record = state.end_session(60).unwrap();
        assert_eq!(record.points_earned, 10);
        assert_eq!(state.last_points, Some(10));
    }

    #[test]
    fn end_session_scores_and_resets() {
        let mut state = PracticeState::default();
        state.start_session(1000);
        state.add_punches(50);
        state.add_kicks(30);
        for _ in 0..3 {
            state.add_kata_repetition(2, "Heian Shodan");
        }
        for _ in 0..90 {
            state.tick();
        }

        let record = state.end_session(1090).unwrap();
        assert_eq!(record.points_earned, 33);
        assert_eq!(record.duration_secs, 90);
        assert_eq!(record.katas, vec![KataRep { kata_id: 2, name: "Heian Shodan".into(), repetitions: 3 }]);

        assert!(!state.is_active());
        assert_eq!((state.punches, state.kicks, state.session_timer), (0, 0, 0));
        assert!(state.katas.is_empty());
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.totals.points, 33);
        assert_eq!(state.totals.kata_reps, 3);
    }

    #[test]
    fn techniques_use_their_own_points() {
        let mut state = PracticeState::default();
        state.start_session(0);
        state.add_technique("Mawashi Geri", 3);
        state.add_technique("Mawashi Geri", 3);
        state.add_technique("Shuto Uke", 1);
        assert_eq!(state.current_points(), 10 + 6 + 1);
    }

    #[test]
    fn totals_accumulate_across_sessions() {
        let mut state = PracticeState::default();
        for i in 0..3 {
            state.start_session(i * 100);
            state.add_kicks(20);
            state.end_session(i * 100 + 50);
        }
        assert_eq!(state.totals.sessions, 3);
        assert_eq!(state.totals.kicks, 60);
        assert_eq!(state.totals.points, 36);
        assert_eq!(state.totals.average_points(), 12);
    }

    #[test]
    fn streak_prefers_backend_value() {
        let mut state = PracticeState::default();
        state.apply_streak(Some(9), day("2024-05-01"));
        assert_eq!(state.streak.current, 9);
        assert_eq!(state.streak.best, 9);

        state.apply_streak(None, day("2024-05-02"));
        assert_eq!(state.streak.current, 10);
    }

    #[test]
    fn submission_failure_is_reported() {
        let mut state = PracticeState::default();
        state.start_session(0);
        let record = state.end_session(1).unwrap();

        let offline = MockBackend::offline();
        assert_matches!(block_on(submit_session(&offline, "u1", &record)), Outcome::Failed(_));
        assert_eq!(block_on(fetch_streak(&offline, "u1")), None);

        let online = MockBackend::online();
        assert_eq!(block_on(submit_session(&online, "u1", &record)), Outcome::Live(()));
        assert_eq!(online.submitted.borrow().len(), 1);
    }
}
