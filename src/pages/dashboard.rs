use leptos::*;
use crate::app::{format_percent, format_time};
use crate::context::{AuthContext, PracticeContext, RewardsContext};
use crate::katas;
use crate::types::{AppView, RewardStatus};

/// Heian kata offered as one-tap repetition buttons.
const QUICK_KATAS: [u32; 5] = [2, 3, 4, 5, 6];

const TECHNIQUES: [(&str, u32); 6] = [
    ("Oi Zuki", 2),
    ("Gyaku Zuki", 2),
    ("Mae Geri", 3),
    ("Mawashi Geri", 4),
    ("Age Uke", 2),
    ("Shuto Uke", 3),
];

#[component]
pub fn Dashboard(set_view: WriteSignal<AppView>) -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let practice = expect_context::<PracticeContext>();
    let rewards = expect_context::<RewardsContext>();
    let (error, set_error) = create_signal(Option::<String>::None);

    let greeting = move || {
        auth.session.with(|s| {
            s.as_ref()
                .map(|s| format!("Osu, {}!", s.user.name))
                .unwrap_or_else(|| "Osu!".to_string())
        })
    };

    let is_active = move || practice.state.with(|s| s.is_active());

    view! {
        <div class="dashboard">
            <div class="dashboard-header">
                <div class="dashboard-greeting">{greeting}</div>
                <div class="dashboard-stats">
                    <span class="stat-pill">
                        {move || format!("🔥 {} day streak", practice.state.with(|s| s.streak.current))}
                    </span>
                    <span class="stat-pill">
                        {move || format!("{} pts total", practice.state.with(|s| s.totals.points))}
                    </span>
                </div>
            </div>

            {move || error.get().map(|e| view! { <div class="error-banner">{e}</div> })}

            {move || if is_active() {
                view! { <ActiveSession /> }.into_view()
            } else {
                view! {
                    <div class="practice-idle">
                        {move || practice.state.with(|s| s.last_points).map(|p| view! {
                            <div class="last-session">{format!("Last session: +{} points", p)}</div>
                        })}
                        <button class="start-practice-btn" on:click=move |_| practice.start()>
                            "Start practice"
                        </button>
                        <div class="quick-log">
                            <div class="section-title">"Quick log"</div>
                            <button class="quick-btn" on:click=move |_| practice.quick_log(auth, "punches", 10, set_error)>
                                "+10 punches"
                            </button>
                            <button class="quick-btn" on:click=move |_| practice.quick_log(auth, "kicks", 10, set_error)>
                                "+10 kicks"
                            </button>
                            <button class="quick-btn" on:click=move |_| set_view.set(AppView::Katas)>
                                "Kata library →"
                            </button>
                        </div>
                    </div>
                }.into_view()
            }}

            <div class="rewards-panel">
                <div class="section-title">"Rewards"</div>
                {move || rewards.state.with(|r| r.next_goal().cloned()).map(|goal| view! {
                    <div class="next-goal">
                        <span class="next-goal-label">"Next goal: "</span>
                        <span class="next-goal-name">{goal.name.clone()}</span>
                        <span class="next-goal-progress">{format_percent(goal.progress)}</span>
                    </div>
                })}
                <div class="reward-list">
                    {move || rewards.state.with(|r| r.rewards.clone()).into_iter().map(|reward| {
                        let badge = match reward.status() {
                            RewardStatus::Approved => "Approved",
                            RewardStatus::Pending => "Waiting for parent",
                            RewardStatus::Unearned => "",
                        };
                        let width = format!("width: {}", format_percent(reward.progress));
                        view! {
                            <div class="reward-card">
                                <div class="reward-name">{reward.name.clone()}</div>
                                <div class="reward-points">{format!("{} pts", reward.points)}</div>
                                <div class="reward-bar"><div class="reward-bar-fill" style=width></div></div>
                                {(!badge.is_empty()).then(|| view! { <span class="reward-badge">{badge}</span> })}
                            </div>
                        }
                    }).collect_view()}
                </div>
            </div>
        </div>
    }
}

#[component]
fn ActiveSession() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let practice = expect_context::<PracticeContext>();
    let rewards = expect_context::<RewardsContext>();

    let count_of = move |name: &'static str| {
        practice.state.with(|s| s.techniques.iter().find(|t| t.name == name).map(|t| t.count).unwrap_or(0))
    };
    let reps_of = move |kata_id: u32| {
        practice.state.with(|s| s.katas.iter().find(|k| k.kata_id == kata_id).map(|k| k.repetitions).unwrap_or(0))
    };

    view! {
        <div class="practice-active">
            <div class="practice-timer">
                {move || format_time(practice.state.with(|s| s.session_timer as i64))}
            </div>
            <div class="practice-points">
                {move || format!("{} points", practice.state.with(|s| s.current_points()))}
            </div>

            <div class="counter-row">
                <button class="counter-btn" on:click=move |_| practice.state.update(|s| s.add_punches(1))>
                    <span class="counter-label">"Punch"</span>
                    <span class="counter-value">{move || practice.state.with(|s| s.punches)}</span>
                </button>
                <button class="counter-btn" on:click=move |_| practice.state.update(|s| s.add_kicks(1))>
                    <span class="counter-label">"Kick"</span>
                    <span class="counter-value">{move || practice.state.with(|s| s.kicks)}</span>
                </button>
            </div>

            <div class="section-title">"Kata"</div>
            <div class="kata-buttons">
                {QUICK_KATAS.into_iter().filter_map(|id| katas::kata_name(id).map(|name| (id, name))).map(|(id, name)| view! {
                    <button class="kata-rep-btn" on:click=move |_| practice.state.update(|s| s.add_kata_repetition(id, name))>
                        <span class="kata-rep-name">{name}</span>
                        <span class="kata-rep-count">{move || format!("×{}", reps_of(id))}</span>
                    </button>
                }).collect_view()}
            </div>

            <div class="section-title">"Techniques"</div>
            <div class="technique-list">
                {TECHNIQUES.into_iter().map(|(name, points)| view! {
                    <button class="technique-btn" on:click=move |_| practice.state.update(|s| s.add_technique(name, points))>
                        <span class="technique-name">{name}</span>
                        <span class="technique-points">{format!("{} pts", points)}</span>
                        <span class="technique-count">{move || count_of(name)}</span>
                    </button>
                }).collect_view()}
            </div>

            <button class="end-practice-btn" on:click=move |_| practice.end(auth, rewards)>
                "Finish practice"
            </button>
        </div>
    }
}
