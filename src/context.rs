//! Leptos context providers wrapping the state containers.
//!
//! Each context is `Copy` (signals and stored values only) so components can
//! capture it freely in event handlers.

use chrono::{NaiveDate, Utc};
use gloo_timers::callback::Interval;
use leptos::*;

use crate::api::HttpBackend;
use crate::auth;
use crate::config::Config;
use crate::error::Outcome;
use crate::movement::{self, MovementState};
use crate::practice::{self, PracticeState};
use crate::rewards::RewardsState;
use crate::storage;
use crate::types::{AuthSession, NewCombination, QuickPractice};
use crate::user::{self, UserState};

pub fn now() -> i64 {
    Utc::now().timestamp()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// ============ AUTH ============

#[derive(Clone, Copy)]
pub struct AuthContext {
    pub session: RwSignal<Option<AuthSession>>,
    config: StoredValue<Config>,
}

impl AuthContext {
    pub fn backend(&self) -> HttpBackend {
        let token = self.session.with_untracked(|s| s.as_ref().map(|s| s.token.clone()));
        HttpBackend::new(self.config.get_value()).with_token(token)
    }

    pub fn config(&self) -> Config {
        self.config.get_value()
    }

    pub fn user_id(&self) -> Option<String> {
        self.session.with_untracked(|s| s.as_ref().map(|s| s.user.id.clone()))
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.with(|s| s.is_some())
    }

    /// Re-validate the stored token in the background.
    pub fn restore(&self) {
        let stored = self.session.get_untracked();
        if stored.is_none() {
            return;
        }
        let backend = self.backend();
        let session = self.session;
        spawn_local(async move {
            let restored = auth::restore_session(&backend, stored).await;
            session.set(restored);
        });
    }

    pub fn sign_out(&self) {
        let backend = self.backend();
        let current = self.session.get_untracked();
        self.session.set(None);
        spawn_local(async move {
            auth::sign_out(&backend, current).await;
        });
    }
}

// ============ PRACTICE ============

#[derive(Clone, Copy)]
pub struct PracticeContext {
    pub state: RwSignal<PracticeState>,
    ticker: StoredValue<Option<Interval>>,
    tick_ms: u32,
}

/// Fill `slot` with a fresh ticker only when a session was just started and
/// none is running. Returns whether `make` was called.
pub fn install_ticker<T>(slot: &mut Option<T>, started: bool, make: impl FnOnce() -> T) -> bool {
    if !started || slot.is_some() {
        return false;
    }
    *slot = Some(make());
    true
}

impl PracticeContext {
    pub fn start(&self) {
        let started = self.state.try_update(|s| s.start_session(now())).unwrap_or(false);
        let state = self.state;
        let tick_ms = self.tick_ms;
        self.ticker.update_value(|slot| {
            install_ticker(slot, started, || Interval::new(tick_ms, move || state.update(|s| s.tick())));
        });
    }

    fn stop_ticker(&self) {
        self.ticker.set_value(None);
    }

    /// Stop the clock, score the session and report it in the background.
    pub fn end(&self, auth: AuthContext, rewards: RewardsContext) {
        self.stop_ticker();
        let Some(record) = self.state.try_update(|s| s.end_session(now())).flatten() else {
            return;
        };
        rewards.state.update(|r| r.update_reward_progress(record.points_earned));

        let state = self.state;
        let Some(user_id) = auth.user_id() else {
            state.update(|s| s.apply_streak(None, today()));
            return;
        };
        let backend = auth.backend();
        spawn_local(async move {
            practice::submit_session(&backend, &user_id, &record).await;
            let fetched = practice::fetch_streak(&backend, &user_id).await;
            state.update(|s| s.apply_streak(fetched, today()));
        });
    }

    /// Log one activity outside a timed session.
    pub fn quick_log(&self, auth: AuthContext, activity: &str, count: u32, set_error: WriteSignal<Option<String>>) {
        let Some(user_id) = auth.user_id() else {
            set_error.set(Some("Sign in to log practice".into()));
            return;
        };
        let backend = auth.backend();
        let practice = QuickPractice { user_id, activity: activity.to_string(), count };
        spawn_local(async move {
            if let Err(e) = practice::record_quick_practice(&backend, &practice).await {
                tracing::warn!("quick practice not recorded: {}", e);
                set_error.set(Some("Could not save practice. Try again later.".into()));
            }
        });
    }
}

// ============ REWARDS ============

#[derive(Clone, Copy)]
pub struct RewardsContext {
    pub state: RwSignal<RewardsState>,
}

// ============ USER ============

#[derive(Clone, Copy)]
pub struct UserContext {
    pub state: RwSignal<UserState>,
    poller: StoredValue<Option<Interval>>,
}

impl UserContext {
    pub fn refresh(&self, auth: AuthContext) {
        let Some(user_id) = auth.user_id() else { return };
        let backend = auth.backend();
        let state = self.state;
        spawn_local(async move {
            let snapshot = user::refresh_dashboard(&backend, &user_id).await;
            let progress = user::fetch_progress(&backend, &user_id).await;
            state.update(|s| {
                s.apply_dashboard(snapshot, now());
                s.apply_progress(progress);
            });
        });
    }

    pub fn load_history(&self, auth: AuthContext) {
        let Some(user_id) = auth.user_id() else { return };
        let backend = auth.backend();
        let state = self.state;
        let month = today().format("%Y-%m").to_string();
        spawn_local(async move {
            let history = user::fetch_history(&backend, &user_id).await;
            let audit = user::fetch_points_audit(&backend, &user_id).await;
            let calendar = user::fetch_calendar(&backend, &user_id, &month).await;
            state.update(|s| {
                s.history = history.into_value().unwrap_or_default();
                s.points_audit = audit.into_value().unwrap_or_default();
                s.calendar = calendar.into_value().unwrap_or_default();
            });
        });
    }

    /// Poll while enabled; turning it off drops the interval.
    pub fn set_auto_refresh(&self, auth: AuthContext, enabled: bool) {
        self.state.update(|s| s.auto_refresh = enabled);
        storage::save_auto_refresh(enabled);
        if !enabled {
            self.poller.set_value(None);
            return;
        }
        if self.poller.with_value(|p| p.is_some()) {
            return;
        }
        let ctx = *self;
        let millis = auth.config().dashboard_refresh_secs * 1000;
        let handle = Interval::new(millis, move || ctx.refresh(auth));
        self.poller.set_value(Some(handle));
    }

    pub fn stop_polling(&self) {
        self.poller.set_value(None);
    }
}

// ============ MOVEMENT ============

#[derive(Clone, Copy)]
pub struct MovementContext {
    pub state: RwSignal<MovementState>,
    /// A start request is waiting on the backend.
    pub starting: RwSignal<bool>,
}

impl MovementContext {
    pub fn load(&self, auth: AuthContext) {
        let backend = auth.backend();
        let user_id = auth.user_id();
        let state = self.state;
        state.update(|s| s.loading = true);
        spawn_local(async move {
            let outcome = movement::load(&backend, now()).await;
            let cached = user_id.as_deref().map(storage::load_local_combinations).unwrap_or_default();
            state.update(|s| {
                s.apply_loaded(outcome);
                s.merge_local(cached);
            });
        });
    }

    /// `on_saved` runs only once the combination is stored, live or locally.
    pub fn add_combination(
        &self,
        auth: AuthContext,
        draft: NewCombination,
        set_error: WriteSignal<Option<String>>,
        on_saved: impl FnOnce() + 'static,
    ) {
        let backend = auth.backend();
        let session = auth.session.get_untracked();
        let state = self.state;
        spawn_local(async move {
            match movement::add_combination(&backend, session.as_ref(), draft, now()).await {
                Ok(outcome) => {
                    if let (Outcome::Degraded(local), Some(session)) = (&outcome, &session) {
                        storage::cache_local_combination(&session.user.id, local);
                    }
                    state.update(|s| {
                        s.apply_saved_combination(outcome);
                    });
                    set_error.set(None);
                    on_saved();
                }
                Err(e) => set_error.set(Some(e.to_string())),
            }
        });
    }

    pub fn start(&self, auth: AuthContext, combination_ids: Vec<String>, set_error: WriteSignal<Option<String>>) {
        if self.starting.get_untracked() {
            return;
        }
        let backend = auth.backend();
        let state = self.state;
        let starting = self.starting;
        let snapshot = state.get_untracked();
        starting.set(true);
        spawn_local(async move {
            match movement::start_movement_session(&backend, &snapshot, &combination_ids, now()).await {
                Ok(outcome) => {
                    let offline = outcome.is_degraded();
                    if let Some((session, moves)) = outcome.into_value() {
                        tracing::info!("movement session {} started with {} moves", session.session_id, moves.len());
                        state.update(|s| {
                            if s.begin_session(session, moves) {
                                s.offline |= offline;
                            }
                        });
                    }
                    set_error.set(None);
                }
                Err(e) => set_error.set(Some(e.to_string())),
            }
            starting.set(false);
        });
    }

    pub fn end(&self, auth: AuthContext, notes: String) {
        let Some(session_id) = self.state.with_untracked(|s| s.active_session.as_ref().map(|a| a.session_id.clone())) else {
            return;
        };
        let ended = self.state.try_update(|s| s.finish_session(&session_id, &notes, now())).flatten();
        let Some(ended) = ended else { return };
        let backend = auth.backend();
        spawn_local(async move {
            movement::report_session_end(&backend, &ended).await;
        });
    }
}

/// Drop everything the previous user left in memory. The auto-refresh
/// preference is a device setting and survives.
pub fn reset_user_data(practice: PracticeContext, rewards: RewardsContext, user: UserContext, movement: MovementContext) {
    practice.stop_ticker();
    user.stop_polling();
    practice.state.set(PracticeState::default());
    rewards.state.set(RewardsState::default());
    user.state.update(|s| *s = UserState { auto_refresh: s.auto_refresh, ..UserState::default() });
    movement.state.set(MovementState::default());
    movement.starting.set(false);
}

/// Install every context for the app. Call once from the root component.
pub fn provide_app_contexts(config: Config) {
    let tick_ms = config.practice_tick_ms;
    let auth = AuthContext {
        session: create_rw_signal(storage::load_auth_session()),
        config: store_value(config),
    };
    let practice = PracticeContext {
        state: create_rw_signal(PracticeState::default()),
        ticker: store_value(None),
        tick_ms,
    };
    let rewards = RewardsContext { state: create_rw_signal(RewardsState::default()) };
    let user = UserContext {
        state: create_rw_signal(UserState { auto_refresh: storage::load_auto_refresh(), ..UserState::default() }),
        poller: store_value(None),
    };
    let movement = MovementContext {
        state: create_rw_signal(MovementState::default()),
        starting: create_rw_signal(false),
    };

    // Sign-out or a different account: nothing of the previous user stays visible
    create_effect(move |previous: Option<Option<String>>| {
        let current = auth.session.with(|s| s.as_ref().map(|s| s.user.id.clone()));
        if matches!(&previous, Some(prev) if *prev != current) {
            tracing::info!("session changed, clearing user data");
            reset_user_data(practice, rewards, user, movement);
        }
        current
    });

    on_cleanup(move || {
        practice.stop_ticker();
        user.stop_polling();
    });

    provide_context(auth);
    provide_context(practice);
    provide_context(rewards);
    provide_context(user);
    provide_context(movement);
}
