use crate::types::{Reward, RewardStatus};

fn reward(id: u32, name: &str, description: &str, points: u32) -> Reward {
    Reward {
        id,
        name: name.to_string(),
        description: description.to_string(),
        points,
        progress: 0.0,
        earned: false,
        approved: false,
    }
}

/// Starter rewards shown before a parent configures anything.
pub fn sample_rewards() -> Vec<Reward> {
    vec![
        reward(1, "Sticker Pack", "Pick a karate sticker sheet", 50),
        reward(2, "Extra Screen Time", "30 minutes of extra screen time", 100),
        reward(3, "Choose Dinner", "Pick what the family eats tonight", 150),
        reward(4, "New Belt Bag", "A bag for your gi and belt", 300),
        reward(5, "Trip to the Park", "An afternoon at the park", 500),
    ]
}

#[derive(Clone, Debug, PartialEq)]
pub struct RewardsState {
    pub rewards: Vec<Reward>,
}

impl Default for RewardsState {
    fn default() -> Self {
        Self { rewards: sample_rewards() }
    }
}

impl RewardsState {
    /// Move every unearned reward towards its goal. Rewards that reach
    /// full progress become earned and wait for parent approval.
    pub fn update_reward_progress(&mut self, points: u32) {
        for reward in self.rewards.iter_mut().filter(|r| !r.earned) {
            let step = if reward.points == 0 {
                1.0
            } else {
                points as f64 / reward.points as f64
            };
            reward.progress = (reward.progress + step).min(1.0);
            if reward.progress >= 1.0 {
                reward.earned = true;
                reward.approved = false;
                tracing::info!("reward earned: {}", reward.name);
            }
        }
    }

    /// Pending → approved. Returns false if the reward was not pending.
    pub fn approve(&mut self, id: u32) -> bool {
        match self.rewards.iter_mut().find(|r| r.id == id) {
            Some(r) if r.status() == RewardStatus::Pending => {
                r.approved = true;
                true
            }
            _ => false,
        }
    }

    /// Send a reward back to the start.
    pub fn deny(&mut self, id: u32) -> bool {
        match self.rewards.iter_mut().find(|r| r.id == id) {
            Some(r) => {
                r.earned = false;
                r.approved = false;
                r.progress = 0.0;
                true
            }
            None => false,
        }
    }

    pub fn with_status(&self, status: RewardStatus) -> Vec<&Reward> {
        self.rewards.iter().filter(|r| r.status() == status).collect()
    }

    pub fn pending(&self) -> Vec<&Reward> {
        self.with_status(RewardStatus::Pending)
    }

    pub fn approved(&self) -> Vec<&Reward> {
        self.with_status(RewardStatus::Approved)
    }

    pub fn in_progress(&self) -> Vec<&Reward> {
        self.with_status(RewardStatus::Unearned)
    }

    /// The unearned reward closest to completion.
    pub fn next_goal(&self) -> Option<&Reward> {
        self.rewards
            .iter()
            .filter(|r| !r.earned)
            .max_by(|a, b| a.progress.total_cmp(&b.progress))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_fraction_of_reward_points() {
        let mut state = RewardsState::default();
        state.update_reward_progress(25);
        assert_eq!(state.rewards[0].progress, 0.5);
        assert_eq!(state.rewards[1].progress, 0.25);
        assert!(state.rewards.iter().all(|r| !r.earned));
    }

    #[test]
    fn progress_is_clamped_and_marks_earned() {
        let mut state = RewardsState::default();
        state.update_reward_progress(120);
        let sticker = &state.rewards[0];
        assert_eq!(sticker.progress, 1.0);
        assert_eq!(sticker.status(), RewardStatus::Pending);
        assert_eq!(state.rewards[1].status(), RewardStatus::Pending);
        assert!(state.rewards.iter().all(|r| r.progress <= 1.0));
    }

    #[test]
    fn earned_rewards_are_not_touched() {
        let mut state = RewardsState::default();
        state.update_reward_progress(50);
        assert!(state.approve(1));
        let before = state.rewards[0].clone();
        state.update_reward_progress(1000);
        assert_eq!(state.rewards[0], before);
    }

    #[test]
    fn approve_only_pending() {
        let mut state = RewardsState::default();
        assert!(!state.approve(1));
        state.update_reward_progress(50);
        assert!(state.approve(1));
        assert!(!state.approve(1));
        assert_eq!(state.rewards[0].status(), RewardStatus::Approved);
        assert!(state.pending().is_empty());
    }

    #[test]
    fn views_partition_rewards() {
        let mut state = RewardsState::default();
        state.update_reward_progress(100);
        state.approve(1);
        assert_eq!(state.approved().iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(state.pending().iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(state.in_progress().len(), 3);
    }

    #[test]
    fn deny_resets_reward() {
        let mut state = RewardsState::default();
        state.update_reward_progress(60);
        assert!(state.deny(1));
        let r = &state.rewards[0];
        assert!(!r.earned && !r.approved);
        assert_eq!(r.progress, 0.0);
        assert!(!state.deny(99));
    }

    #[test]
    fn zero_point_reward_is_earned_on_any_update() {
        let mut state = RewardsState { rewards: vec![reward(7, "High Five", "", 0)] };
        state.update_reward_progress(0);
        assert!(state.rewards[0].earned);
    }

    #[test]
    fn next_goal_is_closest_unearned() {
        let mut state = RewardsState::default();
        state.update_reward_progress(60);
        assert_eq!(state.next_goal().map(|r| r.id), Some(2));
    }
}
