use kiai::error::Outcome;
use kiai::movement::{self, MovementState};
use kiai::practice::PracticeState;
use kiai::rewards::RewardsState;
use kiai::types::{MovementSession, RewardStatus};

// End-to-end flows across the state containers, without a backend.

#[test]
fn practice_sessions_earn_rewards_that_a_parent_approves() {
    let mut practice = PracticeState::default();
    let mut rewards = RewardsState::default();

    // Session 1: 10 base + 2 + 1 + 2 kata reps (10) + 2 techniques (6)
    assert!(practice.start_session(1_000));
    assert!(!practice.start_session(1_001));
    practice.add_punches(25);
    practice.add_kicks(12);
    practice.add_kata_repetition(2, "Heian Shodan");
    practice.add_kata_repetition(2, "Heian Shodan");
    practice.add_technique("Mae Geri", 3);
    practice.add_technique("Mae Geri", 3);
    for _ in 0..90 {
        practice.tick();
    }
    let record = practice.end_session(1_090).expect("session was active");
    assert_eq!(record.points_earned, 29);
    assert_eq!(record.duration_secs, 90);
    rewards.update_reward_progress(record.points_earned);

    assert!(rewards.pending().is_empty());
    assert_eq!(rewards.next_goal().map(|r| r.id), Some(1));

    // Session 2: 10 base + 20 for two hundred punches
    assert!(practice.start_session(2_000));
    practice.add_punches(200);
    let record = practice.end_session(2_300).expect("session was active");
    assert_eq!(record.points_earned, 30);
    rewards.update_reward_progress(record.points_earned);

    assert_eq!(rewards.pending().iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
    assert_eq!(practice.totals.sessions, 2);
    assert_eq!(practice.totals.points, 59);
    assert_eq!(practice.history.len(), 2);

    assert!(rewards.approve(1));
    assert_eq!(rewards.rewards[0].status(), RewardStatus::Approved);

    // Denying an in-progress reward resets it
    assert!(rewards.deny(2));
    assert_eq!(rewards.rewards[1].progress, 0.0);
}

#[test]
fn offline_movement_session_updates_direction_counters() {
    let mut state = MovementState::default();
    state.apply_loaded(Outcome::Degraded((movement::fallback_combinations(0), Vec::new())));
    assert!(state.offline);
    assert_eq!(state.combinations.len(), 3);

    let ids = vec!["shotokan-1".to_string(), "shotokan-2".to_string(), "missing".to_string()];
    let moves = movement::expand_combinations(&state.combinations, &ids);
    assert_eq!(moves.len(), 14);

    let session = MovementSession {
        session_id: movement::local_id(50),
        combination_ids: ids.clone(),
        start_time: 50,
        end_time: None,
        notes: String::new(),
        total_moves: 0,
    };
    let session_id = session.session_id.clone();
    state.begin_session(session, moves);
    assert_eq!(state.session_data(80).session_time, 30);
    assert_eq!(state.session_data(80).moves, 14);

    let mut finished = false;
    for _ in 0..14 {
        finished = state.complete_current_move();
    }
    assert!(finished);
    assert_eq!(state.practice_progress.current_move_index, 13);
    assert_eq!(state.practice_progress.completed_moves, 14);

    let ended = state.finish_session(&session_id, "good focus", 200).expect("session was active");
    assert_eq!(ended.session.end_time, Some(200));
    assert_eq!(ended.session.notes, "good focus");

    let forward = state.counters.iter().find(|c| c.move_name == "Step Forward").expect("forward counter");
    assert_eq!((forward.forward_count, forward.backward_count, forward.total_count), (2, 0, 2));
    let backward = state.counters.iter().find(|c| c.move_name == "Step Backward").expect("backward counter");
    assert_eq!((backward.forward_count, backward.backward_count, backward.total_count), (0, 2, 2));
    assert_eq!(ended.updated_counters.len(), 2);

    assert!(!state.is_active());
    assert_eq!(state.session_data(300).session_time, 0);
}
