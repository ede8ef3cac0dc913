use chrono::NaiveDate;
use crate::types::*;

/// Every finished session is worth at least this much.
pub const BASE_SESSION_POINTS: u32 = 10;
pub const POINTS_PER_KATA_REP: u32 = 5;

/// Points for one session: base + one per ten punches + one per ten kicks
/// + five per kata repetition + each technique's own value per rep.
pub fn session_points(punches: u32, kicks: u32, katas: &[KataRep], techniques: &[TechniqueCount]) -> u32 {
    let kata_points: u32 = katas.iter().map(|k| k.repetitions * POINTS_PER_KATA_REP).sum();
    let technique_points: u32 = techniques.iter().map(|t| t.count * t.points).sum();
    BASE_SESSION_POINTS + punches / 10 + kicks / 10 + kata_points + technique_points
}

pub fn kata_reps(katas: &[KataRep]) -> u32 {
    katas.iter().map(|k| k.repetitions).sum()
}

pub fn technique_reps(techniques: &[TechniqueCount]) -> u32 {
    techniques.iter().map(|t| t.count).sum()
}

/// Local streak estimate used when the backend's value is unavailable.
pub fn advance_streak(streak: &Streak, today: NaiveDate) -> Streak {
    let current = match streak.last_practice {
        Some(last) if last == today => streak.current.max(1),
        Some(last) if last.succ_opt() == Some(today) => streak.current + 1,
        _ => 1,
    };
    Streak {
        current,
        best: streak.best.max(current),
        last_practice: Some(today),
    }
}

impl PracticeTotals {
    pub fn add(&mut self, summary: &SessionSummary) {
        self.sessions += 1;
        self.punches += summary.punches;
        self.kicks += summary.kicks;
        self.kata_reps += summary.kata_reps;
        self.technique_reps += summary.technique_reps;
        self.points += summary.points_earned;
        self.practice_secs += summary.duration_secs;
    }

    pub fn average_points(&self) -> u32 {
        if self.sessions == 0 { 0 } else { self.points / self.sessions }
    }
}

/// Mastery bucket shown on kata cards. The percentage itself comes from the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MasteryLevel {
    NotStarted,
    Learning,
    Practicing,
    Mastered,
}

impl MasteryLevel {
    pub fn from_percentage(pct: f64) -> Self {
        if pct <= 0.0 {
            MasteryLevel::NotStarted
        } else if pct < 40.0 {
            MasteryLevel::Learning
        } else if pct < 90.0 {
            MasteryLevel::Practicing
        } else {
            MasteryLevel::Mastered
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MasteryLevel::NotStarted => "Not started",
            MasteryLevel::Learning => "Learning",
            MasteryLevel::Practicing => "Practicing",
            MasteryLevel::Mastered => "Mastered",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kata(reps: u32) -> KataRep {
        KataRep { kata_id: 2, name: "Heian Shodan".into(), repetitions: reps }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn empty_session_earns_base_points() {
        assert_eq!(session_points(0, 0, &[], &[]), 10);
    }

    #[test]
    fn points_follow_formula() {
        assert_eq!(session_points(50, 30, &[kata(3)], &[]), 33);
        let techniques = vec![TechniqueCount { name: "Mae Geri".into(), count: 4, points: 2 }];
        assert_eq!(session_points(9, 19, &[], &techniques), 10 + 0 + 1 + 8);
    }

    #[test]
    fn points_grow_with_activity() {
        let mut last = session_points(0, 0, &[], &[]);
        for punches in (10..100).step_by(10) {
            let p = session_points(punches, 0, &[], &[]);
            assert!(p > last);
            last = p;
        }
    }

    #[test]
    fn streak_same_day_is_unchanged() {
        let s = Streak { current: 3, best: 5, last_practice: Some(date("2024-03-10")) };
        let next = advance_streak(&s, date("2024-03-10"));
        assert_eq!(next.current, 3);
        assert_eq!(next.best, 5);
    }

    #[test]
    fn streak_next_day_increments() {
        let s = Streak { current: 5, best: 5, last_practice: Some(date("2024-02-29")) };
        let next = advance_streak(&s, date("2024-03-01"));
        assert_eq!(next.current, 6);
        assert_eq!(next.best, 6);
    }

    #[test]
    fn streak_gap_resets_to_one() {
        let s = Streak { current: 4, best: 7, last_practice: Some(date("2024-03-01")) };
        let next = advance_streak(&s, date("2024-03-05"));
        assert_eq!(next.current, 1);
        assert_eq!(next.best, 7);
        assert_eq!(advance_streak(&Streak::default(), date("2024-03-05")).current, 1);
    }

    #[test]
    fn mastery_buckets() {
        assert_eq!(MasteryLevel::from_percentage(0.0), MasteryLevel::NotStarted);
        assert_eq!(MasteryLevel::from_percentage(39.9), MasteryLevel::Learning);
        assert_eq!(MasteryLevel::from_percentage(90.0), MasteryLevel::Mastered);
    }
}
