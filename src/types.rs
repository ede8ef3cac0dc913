use serde::{Deserialize, Serialize};

// ============ AUTH ============

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Kid,
    Parent,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub token: String,
    pub user: AuthUser,
}

// ============ MOVEMENT ============

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MoveType {
    Stance,
    Direction,
    Technique,
}

impl MoveType {
    pub fn label(&self) -> &'static str {
        match self {
            MoveType::Stance => "Stance",
            MoveType::Direction => "Direction",
            MoveType::Technique => "Technique",
        }
    }

    pub fn all() -> [MoveType; 3] {
        [MoveType::Stance, MoveType::Direction, MoveType::Technique]
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Move {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub move_type: MoveType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration_seconds: u32,
}

impl Move {
    pub fn new(move_type: MoveType, name: &str, description: &str, duration_seconds: u32) -> Self {
        Self {
            id: None,
            move_type,
            name: name.to_string(),
            description: description.to_string(),
            duration_seconds,
        }
    }

    pub fn stance(name: &str) -> Self {
        Self::new(MoveType::Stance, name, "", 3)
    }

    pub fn direction(name: &str) -> Self {
        Self::new(MoveType::Direction, name, "", 2)
    }

    pub fn technique(name: &str) -> Self {
        Self::new(MoveType::Technique, name, "", 2)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Combination {
    pub combination_id: String,
    pub name: String,
    pub moves: Vec<Move>,
    pub repeat_count: u32,
    pub created_at: i64,
}

/// Builder draft for a combination, before an id is assigned.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewCombination {
    pub name: String,
    pub moves: Vec<Move>,
    pub repeat_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MovementSession {
    pub session_id: String,
    pub combination_ids: Vec<String>,
    pub start_time: i64,
    #[serde(default)]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub notes: String,
    pub total_moves: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct MoveCounter {
    pub move_name: String,
    pub forward_count: u32,
    pub backward_count: u32,
    pub total_count: u32,
    pub last_updated: i64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PracticeProgress {
    pub current_move_index: usize,
    pub total_moves: usize,
    pub completed_moves: usize,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SessionData {
    pub combinations: usize,
    pub moves: usize,
    pub session_time: i64,
}

// ============ PRACTICE ============

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct KataRep {
    pub kata_id: u32,
    pub name: String,
    pub repetitions: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TechniqueCount {
    pub name: String,
    pub count: u32,
    pub points: u32,
}

/// Full session record submitted to the backend at session end.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PracticeRecord {
    pub punches: u32,
    pub kicks: u32,
    pub katas: Vec<KataRep>,
    pub techniques: Vec<TechniqueCount>,
    pub duration_secs: u32,
    pub points_earned: u32,
    pub started_at: i64,
    pub ended_at: i64,
}

/// Single-activity log entry for `/api/practice/record`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuickPractice {
    pub user_id: String,
    pub activity: String,
    pub count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub ended_at: i64,
    pub duration_secs: u32,
    pub points_earned: u32,
    pub punches: u32,
    pub kicks: u32,
    pub kata_reps: u32,
    pub technique_reps: u32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PracticeTotals {
    pub sessions: u32,
    pub punches: u32,
    pub kicks: u32,
    pub kata_reps: u32,
    pub technique_reps: u32,
    pub points: u32,
    pub practice_secs: u32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Streak {
    pub current: u32,
    pub best: u32,
    pub last_practice: Option<chrono::NaiveDate>,
}

// ============ REWARDS ============

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Reward {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub points: u32,
    pub progress: f64,
    pub earned: bool,
    pub approved: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewardStatus {
    Unearned,
    Pending,
    Approved,
}

impl Reward {
    pub fn status(&self) -> RewardStatus {
        match (self.earned, self.approved) {
            (true, true) => RewardStatus::Approved,
            (true, false) => RewardStatus::Pending,
            _ => RewardStatus::Unearned,
        }
    }
}

// ============ KATAS ============

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Kata {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub belt: String,
    #[serde(default)]
    pub move_count: u32,
    #[serde(default)]
    pub video_url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct KataProgress {
    pub kata_id: u32,
    pub mastery_percentage: f64,
    pub times_practiced: u32,
    #[serde(default)]
    pub last_practiced: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct KataPractice {
    pub user_id: String,
    pub kata_id: u32,
    pub repetitions: u32,
    pub duration_secs: u32,
}

// ============ USER / DASHBOARD ============

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct UserProgress {
    pub total_points: u32,
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub sessions_completed: u32,
    #[serde(default)]
    pub belt: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PracticeHistoryEntry {
    pub date: String,
    pub punches: u32,
    pub kicks: u32,
    pub katas: u32,
    pub points: u32,
    #[serde(default)]
    pub duration_secs: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PointsAuditEntry {
    pub timestamp: i64,
    pub points: i32,
    pub reason: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CalendarDay {
    pub date: String,
    pub practiced: bool,
    #[serde(default)]
    pub points: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct DashboardAnalytics {
    pub weekly_points: u32,
    pub weekly_sessions: u32,
    #[serde(default)]
    pub average_session_secs: u32,
    #[serde(default)]
    pub favorite_kata: Option<String>,
    #[serde(default)]
    pub points_by_day: Vec<(String, u32)>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RecentActivity {
    pub timestamp: i64,
    pub description: String,
    #[serde(default)]
    pub points: u32,
}

// ============ UI ============

#[derive(Clone, Debug, PartialEq)]
pub enum AppView {
    Login,
    Register,
    Dashboard,
    Movement,
    Katas,
    Parent,
}
