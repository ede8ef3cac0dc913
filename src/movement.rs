//! Movement combinations and the move-by-move practice session.
//!
//! `MovementState` is the single owner of the active session and its
//! navigation index. Network calls live in the free `async fn`s below and
//! hand their results back to the state as [`Outcome`]s.

use std::sync::atomic::{AtomicU32, Ordering};

use futures::future;

use crate::api::Backend;
use crate::error::{Error, Outcome, Result};
use crate::katas::kata_name;
use crate::types::*;

static NEXT_LOCAL_ID: AtomicU32 = AtomicU32::new(1);

/// Client-side id for data the backend never confirmed.
pub fn local_id(now: i64) -> String {
    let seq = NEXT_LOCAL_ID.fetch_add(1, Ordering::Relaxed);
    format!("local-{}-{}", now, seq)
}

pub fn validate_draft(draft: &NewCombination) -> Result<()> {
    if draft.name.trim().is_empty() {
        return Err(Error::InvalidInput("Combination needs a name".into()));
    }
    if draft.moves.is_empty() {
        return Err(Error::InvalidInput("Add at least one move".into()));
    }
    if draft.repeat_count == 0 {
        return Err(Error::InvalidInput("Repeat count must be at least 1".into()));
    }
    Ok(())
}

pub fn local_combination(draft: &NewCombination, now: i64) -> Combination {
    Combination {
        combination_id: local_id(now),
        name: draft.name.trim().to_string(),
        moves: draft.moves.clone(),
        repeat_count: draft.repeat_count,
        created_at: now,
    }
}

/// Flatten the selected combinations, in selection order, each repeated
/// `repeat_count` times. Unknown ids are skipped.
pub fn expand_combinations(combinations: &[Combination], ids: &[String]) -> Vec<Move> {
    ids.iter()
        .filter_map(|id| combinations.iter().find(|c| &c.combination_id == id))
        .flat_map(|c| {
            (0..c.repeat_count).flat_map(move |_| c.moves.iter().cloned())
        })
        .collect()
}

/// Offline seed: three combinations drawn from the Heian kata.
pub fn fallback_combinations(now: i64) -> Vec<Combination> {
    let patterns: [(u32, Vec<Move>, u32); 3] = [
        (2, vec![
            Move::stance("Zenkutsu Dachi"),
            Move::direction("Step Forward"),
            Move::technique("Gedan Barai"),
            Move::technique("Oi Zuki"),
        ], 2),
        (3, vec![
            Move::stance("Kokutsu Dachi"),
            Move::direction("Step Backward"),
            Move::technique("Shuto Uke"),
        ], 2),
        (4, vec![
            Move::stance("Kiba Dachi"),
            Move::direction("Turn Left"),
            Move::technique("Uchi Uke"),
            Move::direction("Step Forward"),
            Move::technique("Mae Geri"),
        ], 1),
    ];

    patterns
        .into_iter()
        .enumerate()
        .map(|(i, (kata_id, moves, repeat_count))| Combination {
            combination_id: format!("shotokan-{}", i + 1),
            name: format!("{} Basics", kata_name(kata_id).unwrap_or("Shotokan")),
            moves,
            repeat_count,
            created_at: now,
        })
        .collect()
}

fn direction_flags(m: &Move) -> Option<(bool, bool)> {
    if m.move_type != MoveType::Direction {
        return None;
    }
    let name = m.name.to_lowercase();
    let forward = name.contains("forward");
    let backward = name.contains("backward");
    (forward || backward).then_some((forward, backward))
}

/// A session that was closed locally and still has to be reported.
#[derive(Clone, Debug, PartialEq)]
pub struct EndedSession {
    pub session: MovementSession,
    pub updated_counters: Vec<MoveCounter>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovementState {
    pub combinations: Vec<Combination>,
    pub counters: Vec<MoveCounter>,
    pub active_session: Option<MovementSession>,
    pub current_session_moves: Vec<Move>,
    pub practice_progress: PracticeProgress,
    pub offline: bool,
    pub loading: bool,
}

impl MovementState {
    pub fn apply_loaded(&mut self, outcome: Outcome<(Vec<Combination>, Vec<MoveCounter>)>) {
        self.loading = false;
        self.offline = outcome.is_degraded();
        if let Some((combinations, counters)) = outcome.into_value() {
            self.combinations = combinations;
            self.counters = counters;
        }
    }

    /// Append a saved combination; both live and local copies are kept.
    pub fn apply_saved_combination(&mut self, outcome: Outcome<Combination>) -> Option<&Combination> {
        if outcome.is_degraded() {
            self.offline = true;
        }
        let combination = outcome.into_value()?;
        self.combinations.push(combination);
        self.combinations.last()
    }

    /// Add combinations saved while offline that the backend does not know.
    pub fn merge_local(&mut self, local: Vec<Combination>) {
        for combination in local {
            if self.combination(&combination.combination_id).is_none() {
                self.combinations.push(combination);
            }
        }
    }

    pub fn combination(&self, id: &str) -> Option<&Combination> {
        self.combinations.iter().find(|c| c.combination_id == id)
    }

    pub fn is_active(&self) -> bool {
        self.active_session.is_some()
    }

    /// Install a session and its expanded moves. Returns false, changing
    /// nothing, while another session is still active.
    pub fn begin_session(&mut self, mut session: MovementSession, moves: Vec<Move>) -> bool {
        if self.is_active() {
            tracing::warn!("ignoring session {}: another session is active", session.session_id);
            return false;
        }
        session.total_moves = moves.len();
        self.practice_progress = PracticeProgress {
            current_move_index: 0,
            total_moves: moves.len(),
            completed_moves: 0,
        };
        self.current_session_moves = moves;
        self.active_session = Some(session);
        true
    }

    /// Close the active session, bumping forward/backward counters once per
    /// occurrence. `None` when `session_id` is not the active session.
    pub fn finish_session(&mut self, session_id: &str, notes: &str, now: i64) -> Option<EndedSession> {
        if self.active_session.as_ref().map(|s| s.session_id.as_str()) != Some(session_id) {
            return None;
        }
        let mut session = self.active_session.take()?;
        session.end_time = Some(now);
        session.notes = notes.to_string();

        let mut touched: Vec<String> = Vec::new();
        for m in &self.current_session_moves {
            let Some((forward, backward)) = direction_flags(m) else { continue };
            let idx = match self.counters.iter().position(|c| c.move_name == m.name) {
                Some(idx) => idx,
                None => {
                    self.counters.push(MoveCounter { move_name: m.name.clone(), ..MoveCounter::default() });
                    self.counters.len() - 1
                }
            };
            let counter = &mut self.counters[idx];
            if forward {
                counter.forward_count += 1;
            }
            if backward {
                counter.backward_count += 1;
            }
            counter.total_count += 1;
            counter.last_updated = now;
            if !touched.contains(&m.name) {
                touched.push(m.name.clone());
            }
        }

        let updated_counters = self
            .counters
            .iter()
            .filter(|c| touched.contains(&c.move_name))
            .cloned()
            .collect();

        self.current_session_moves.clear();
        self.practice_progress = PracticeProgress::default();

        Some(EndedSession { session, updated_counters })
    }

    /// Elapsed time is recomputed from `start_time` on every call.
    pub fn session_data(&self, now: i64) -> SessionData {
        match &self.active_session {
            Some(s) => SessionData {
                combinations: s.combination_ids.len(),
                moves: self.current_session_moves.len(),
                session_time: (now - s.start_time).max(0),
            },
            None => SessionData::default(),
        }
    }

    // navigation

    pub fn current_move(&self) -> Option<&Move> {
        self.current_session_moves.get(self.practice_progress.current_move_index)
    }

    pub fn next_move(&mut self) {
        let total = self.current_session_moves.len();
        if total > 0 {
            let idx = &mut self.practice_progress.current_move_index;
            *idx = (*idx + 1).min(total - 1);
        }
    }

    pub fn previous_move(&mut self) {
        let idx = &mut self.practice_progress.current_move_index;
        *idx = idx.saturating_sub(1);
    }

    pub fn go_to_move(&mut self, index: usize) {
        let total = self.current_session_moves.len();
        if total > 0 {
            self.practice_progress.current_move_index = index.min(total - 1);
        }
    }

    /// Mark the current move done and advance. Returns true once every move is done.
    pub fn complete_current_move(&mut self) -> bool {
        let progress = &mut self.practice_progress;
        if progress.total_moves == 0 {
            return false;
        }
        if progress.completed_moves < progress.total_moves {
            progress.completed_moves += 1;
        }
        if progress.current_move_index + 1 < progress.total_moves {
            progress.current_move_index += 1;
        }
        progress.completed_moves == progress.total_moves
    }
}

// ============ EFFECTS ============

/// Combinations and counters, fetched in parallel. Any failure seeds the
/// offline Shotokan set.
pub async fn load<B: Backend>(backend: &B, now: i64) -> Outcome<(Vec<Combination>, Vec<MoveCounter>)> {
    let (combinations, counters) = future::join(backend.fetch_combinations(), backend.fetch_move_counters()).await;
    let result = combinations.and_then(|c| counters.map(|k| (c, k)));
    Outcome::or_degraded(result, || (fallback_combinations(now), Vec::new()))
}

pub async fn add_combination<B: Backend>(
    backend: &B,
    auth: Option<&AuthSession>,
    draft: NewCombination,
    now: i64,
) -> Result<Outcome<Combination>> {
    if auth.is_none() {
        return Err(Error::NotAuthenticated);
    }
    validate_draft(&draft)?;

    Ok(Outcome::or_degraded(backend.create_combination(&draft).await, || {
        local_combination(&draft, now)
    }))
}

/// Create a session for the given combinations and expand its moves.
/// A backend failure still starts the session, under a local id.
pub async fn start_movement_session<B: Backend>(
    backend: &B,
    state: &MovementState,
    combination_ids: &[String],
    now: i64,
) -> Result<Outcome<(MovementSession, Vec<Move>)>> {
    if state.is_active() {
        return Err(Error::InvalidInput("Finish the current session first".into()));
    }
    if combination_ids.is_empty() {
        return Err(Error::InvalidInput("Select at least one combination".into()));
    }
    let moves = expand_combinations(&state.combinations, combination_ids);
    if moves.is_empty() {
        return Err(Error::InvalidInput("Selected combinations have no moves".into()));
    }
    let total_moves = moves.len();

    let created = backend.create_movement_session(combination_ids).await;
    let outcome = Outcome::or_degraded(created, || MovementSession {
        session_id: local_id(now),
        combination_ids: combination_ids.to_vec(),
        start_time: now,
        end_time: None,
        notes: String::new(),
        total_moves,
    });

    Ok(outcome.map(|mut session| {
        // The elapsed-time display runs on the client clock.
        session.start_time = now;
        session.total_moves = total_moves;
        (session, moves)
    }))
}

/// Report a locally closed session. The local state is already cleared.
pub async fn report_session_end<B: Backend>(backend: &B, ended: &EndedSession) -> Outcome<()> {
    let result = backend
        .end_movement_session(&ended.session.session_id, &ended.session.notes, &ended.updated_counters)
        .await;
    if let Err(e) = &result {
        tracing::warn!("movement session {} not recorded: {}", ended.session.session_id, e);
    }
    Outcome::from_result(result)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use futures::executor::block_on;

    use super::*;
    use crate::api::mock::MockBackend;

    fn combo(id: &str, moves: usize, repeat_count: u32) -> Combination {
        Combination {
            combination_id: id.into(),
            name: format!("Combo {}", id),
            moves: (0..moves).map(|i| Move::technique(&format!("{}-{}", id, i))).collect(),
            repeat_count,
            created_at: 0,
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn session(id: &str, combination_ids: Vec<String>, start_time: i64) -> MovementSession {
        MovementSession {
            session_id: id.into(),
            combination_ids,
            start_time,
            end_time: None,
            notes: String::new(),
            total_moves: 0,
        }
    }

    fn auth() -> AuthSession {
        AuthSession {
            token: "t".into(),
            user: AuthUser { id: "u1".into(), email: "kid@dojo.test".into(), name: "Kid".into(), role: UserRole::Kid },
        }
    }

    #[test]
    fn expansion_length_is_sum_of_repeats() {
        let combos = vec![combo("a", 3, 2), combo("b", 2, 1)];
        let moves = expand_combinations(&combos, &ids(&["a", "b"]));
        assert_eq!(moves.len(), 8);
        assert_eq!(moves[0].name, "a-0");
        assert_eq!(moves[3].name, "a-0");
        assert_eq!(moves[6].name, "b-0");
    }

    #[test]
    fn expansion_follows_selection_order() {
        let combos = vec![combo("a", 1, 1), combo("b", 1, 1)];
        let moves = expand_combinations(&combos, &ids(&["b", "a", "missing"]));
        let names: Vec<_> = moves.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["b-0", "a-0"]);
    }

    #[test]
    fn session_moves_are_fixed_at_start() {
        let mut state = MovementState { combinations: vec![combo("a", 2, 2)], ..Default::default() };
        let moves = expand_combinations(&state.combinations, &ids(&["a"]));
        state.begin_session(session("s1", ids(&["a"]), 100), moves);

        state.combinations[0].repeat_count = 10;
        state.combinations[0].moves.clear();

        assert_eq!(state.current_session_moves.len(), 4);
        assert_eq!(state.session_data(130), SessionData { combinations: 1, moves: 4, session_time: 30 });
    }

    #[test]
    fn merge_local_skips_known_ids() {
        let mut state = MovementState { combinations: vec![combo("a", 1, 1)], ..Default::default() };
        state.merge_local(vec![combo("a", 5, 5), combo("local-1", 2, 1)]);
        assert_eq!(state.combinations.len(), 2);
        assert_eq!(state.combinations[0].moves.len(), 1);
    }

    #[test]
    fn session_data_is_zero_when_idle() {
        assert_eq!(MovementState::default().session_data(999), SessionData::default());
    }

    #[test]
    fn finishing_counts_forward_and_backward_moves() {
        let moves = vec![
            Move::direction("Step Forward"),
            Move::direction("Step Backward"),
            Move::direction("Turn Left"),
            Move::technique("Forward Punch"),
        ];
        let combination = Combination {
            combination_id: "c".into(),
            name: "Lines".into(),
            moves,
            repeat_count: 2,
            created_at: 0,
        };
        let mut state = MovementState { combinations: vec![combination], ..Default::default() };
        let expanded = expand_combinations(&state.combinations, &ids(&["c"]));
        state.begin_session(session("s1", ids(&["c"]), 0), expanded);

        let ended = state.finish_session("s1", "good", 60).unwrap();
        assert_eq!(ended.session.end_time, Some(60));
        assert_eq!(ended.session.notes, "good");
        assert_eq!(ended.updated_counters.len(), 2);

        let fwd = state.counters.iter().find(|c| c.move_name == "Step Forward").unwrap();
        assert_eq!((fwd.forward_count, fwd.backward_count, fwd.total_count), (2, 0, 2));
        let back = state.counters.iter().find(|c| c.move_name == "Step Backward").unwrap();
        assert_eq!((back.forward_count, back.backward_count, back.total_count), (0, 2, 2));
        assert!(state.counters.iter().all(|c| c.move_name != "Forward Punch"));

        assert!(!state.is_active());
        assert!(state.current_session_moves.is_empty());
        assert_eq!(state.practice_progress, PracticeProgress::default());
    }

    #[test]
    fn finishing_a_different_session_is_a_noop() {
        let mut state = MovementState { combinations: vec![combo("a", 2, 1)], ..Default::default() };
        let moves = expand_combinations(&state.combinations, &ids(&["a"]));
        state.begin_session(session("s1", ids(&["a"]), 0), moves);
        let before = state.clone();

        assert_eq!(state.finish_session("other", "", 10), None);
        assert_eq!(state, before);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut state = MovementState { combinations: vec![combo("a", 3, 1)], ..Default::default() };
        let moves = expand_combinations(&state.combinations, &ids(&["a"]));
        state.begin_session(session("s1", ids(&["a"]), 0), moves);

        state.previous_move();
        assert_eq!(state.practice_progress.current_move_index, 0);
        state.next_move();
        state.next_move();
        state.next_move();
        assert_eq!(state.practice_progress.current_move_index, 2);
        state.go_to_move(99);
        assert_eq!(state.current_move().map(|m| m.name.as_str()), Some("a-2"));
    }

    #[test]
    fn completing_all_moves_finishes_progress() {
        let mut state = MovementState { combinations: vec![combo("a", 2, 1)], ..Default::default() };
        let moves = expand_combinations(&state.combinations, &ids(&["a"]));
        state.begin_session(session("s1", ids(&["a"]), 0), moves);

        assert!(!state.complete_current_move());
        assert_eq!(state.practice_progress.current_move_index, 1);
        assert!(state.complete_current_move());
        assert!(state.complete_current_move());
        assert_eq!(state.practice_progress.completed_moves, 2);
        assert_eq!(state.practice_progress.current_move_index, 1);
    }

    #[test]
    fn add_combination_requires_sign_in() {
        let backend = MockBackend::online();
        let draft = NewCombination { name: "Jab".into(), moves: vec![Move::technique("Oi Zuki")], repeat_count: 1 };
        let result = block_on(add_combination(&backend, None, draft, 0));
        assert_matches!(result, Err(Error::NotAuthenticated));
        assert!(backend.calls.borrow().is_empty());
    }

    #[test]
    fn add_combination_rejects_empty_draft() {
        let backend = MockBackend::online();
        let draft = NewCombination { name: "  ".into(), moves: vec![], repeat_count: 1 };
        let result = block_on(add_combination(&backend, Some(&auth()), draft, 0));
        assert_matches!(result, Err(Error::InvalidInput(_)));
    }

    #[test]
    fn unnamed_draft_with_moves_is_rejected_up_front() {
        let draft = NewCombination {
            name: String::new(),
            moves: vec![Move::stance("Zenkutsu Dachi"), Move::technique("Oi Zuki"), Move::direction("Step Forward")],
            repeat_count: 2,
        };
        assert_matches!(validate_draft(&draft), Err(Error::InvalidInput(m)) if m.contains("name"));
        assert_eq!(draft.moves.len(), 3);

        let backend = MockBackend::online();
        assert_matches!(block_on(add_combination(&backend, Some(&auth()), draft, 0)), Err(Error::InvalidInput(_)));
        assert!(backend.calls.borrow().is_empty());
    }

    #[test]
    fn add_combination_uses_server_copy() {
        let backend = MockBackend::online();
        let draft = NewCombination { name: "Jab".into(), moves: vec![Move::technique("Oi Zuki")], repeat_count: 3 };
        let outcome = block_on(add_combination(&backend, Some(&auth()), draft, 0)).unwrap();

        let mut state = MovementState::default();
        let saved = state.apply_saved_combination(outcome).cloned().unwrap();
        assert_eq!(saved.combination_id, "srv-1");
        assert!(!state.offline);
    }

    #[test]
    fn add_combination_falls_back_to_local_copy() {
        let backend = MockBackend::offline();
        let draft = NewCombination { name: "Jab".into(), moves: vec![Move::technique("Oi Zuki")], repeat_count: 3 };
        let outcome = block_on(add_combination(&backend, Some(&auth()), draft, 42)).unwrap();
        assert!(outcome.is_degraded());

        let mut state = MovementState::default();
        let saved = state.apply_saved_combination(outcome).cloned().unwrap();
        assert!(saved.combination_id.starts_with("local-42-"));
        assert_eq!(saved.repeat_count, 3);
        assert_eq!(state.combinations.len(), 1);
        assert!(state.offline);
        assert_eq!(backend.calls.borrow().as_slice(), ["create_combination"]);
    }

    #[test]
    fn start_rejects_empty_selection() {
        let backend = MockBackend::online();
        let state = MovementState { combinations: vec![combo("a", 1, 1)], ..Default::default() };
        assert_matches!(block_on(start_movement_session(&backend, &state, &[], 0)), Err(Error::InvalidInput(_)));
        assert_matches!(
            block_on(start_movement_session(&backend, &state, &ids(&["nope"]), 0)),
            Err(Error::InvalidInput(_))
        );
    }

    #[test]
    fn start_while_active_is_rejected() {
        let backend = MockBackend::online();
        let mut state = MovementState {
            combinations: vec![Combination {
                moves: vec![Move::direction("Step Forward")],
                ..combo("a", 0, 2)
            }],
            ..Default::default()
        };
        let moves = expand_combinations(&state.combinations, &ids(&["a"]));
        assert!(state.begin_session(session("s1", ids(&["a"]), 0), moves.clone()));

        assert_matches!(
            block_on(start_movement_session(&backend, &state, &ids(&["a"]), 5)),
            Err(Error::InvalidInput(_))
        );
        assert!(backend.calls.borrow().is_empty());

        // A second session handed straight to the state does not displace the first
        assert!(!state.begin_session(session("s2", ids(&["a"]), 5), moves));
        let ended = state.finish_session("s1", "", 10).unwrap();
        assert_eq!(ended.session.session_id, "s1");
        assert_eq!(state.counters[0].forward_count, 2);
    }

    #[test]
    fn start_offline_expands_locally() {
        let backend = MockBackend::offline();
        let mut state = MovementState { combinations: vec![combo("a", 3, 2), combo("b", 2, 1)], ..Default::default() };
        let outcome = block_on(start_movement_session(&backend, &state, &ids(&["a", "b"]), 500)).unwrap();
        assert!(outcome.is_degraded());

        let (session, moves) = outcome.into_value().unwrap();
        assert!(session.session_id.starts_with("local-"));
        state.begin_session(session, moves);

        assert_eq!(state.practice_progress, PracticeProgress { current_move_index: 0, total_moves: 8, completed_moves: 0 });
        assert_eq!(state.active_session.as_ref().unwrap().total_moves, 8);
        assert_eq!(state.session_data(510).session_time, 10);
    }

    #[test]
    fn start_online_uses_server_session_id() {
        let backend = MockBackend::online();
        let state = MovementState { combinations: vec![combo("a", 1, 4)], ..Default::default() };
        let outcome = block_on(start_movement_session(&backend, &state, &ids(&["a"]), 7)).unwrap();
        let (session, moves) = outcome.into_value().unwrap();
        assert_eq!(session.session_id, "srv-session");
        assert_eq!(session.start_time, 7);
        assert_eq!(moves.len(), 4);
    }

    #[test]
    fn load_falls_back_to_shotokan_set() {
        let backend = MockBackend::offline();
        let mut state = MovementState { loading: true, ..Default::default() };
        state.apply_loaded(block_on(load(&backend, 0)));

        assert!(state.offline);
        assert!(!state.loading);
        assert_eq!(state.combinations.len(), 3);
        assert_eq!(state.combinations[0].name, "Heian Shodan Basics");
        assert!(state.counters.is_empty());
    }

    #[test]
    fn load_uses_backend_data() {
        let backend = MockBackend { combinations: vec![combo("x", 1, 1)], ..MockBackend::online() };
        let mut state = MovementState::default();
        state.apply_loaded(block_on(load(&backend, 0)));
        assert!(!state.offline);
        assert_eq!(state.combinations.len(), 1);
    }

    #[test]
    fn session_end_is_reported_with_counters() {
        let backend = MockBackend::online();
        let mut state = MovementState { combinations: fallback_combinations(0), ..Default::default() };
        let moves = expand_combinations(&state.combinations, &ids(&["shotokan-1"]));
        state.begin_session(session("s9", ids(&["shotokan-1"]), 0), moves);

        let ended = state.finish_session("s9", "", 5).unwrap();
        assert_eq!(block_on(report_session_end(&backend, &ended)), Outcome::Live(()));
        let reported = backend.ended.borrow();
        assert_eq!(reported[0].0, "s9");
        assert_eq!(reported[0].1[0].forward_count, 2);
    }

    #[test]
    fn failed_session_report_still_leaves_state_cleared() {
        let backend = MockBackend::offline();
        let mut state = MovementState { combinations: fallback_combinations(0), ..Default::default() };
        let moves = expand_combinations(&state.combinations, &ids(&["shotokan-2"]));
        state.begin_session(session("s2", ids(&["shotokan-2"]), 0), moves);

        let ended = state.finish_session("s2", "", 5).unwrap();
        assert_matches!(block_on(report_session_end(&backend, &ended)), Outcome::Failed(_));
        assert!(!state.is_active());
    }
}
