use leptos::*;
use crate::app::{format_date, format_percent, format_time};
use crate::context::{now, AuthContext, RewardsContext, UserContext};
use crate::types::RewardStatus;

#[component]
pub fn Parent() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let user = expect_context::<UserContext>();
    let rewards = expect_context::<RewardsContext>();

    user.refresh(auth);
    user.load_history(auth);
    if user.state.with_untracked(|s| s.auto_refresh) {
        user.set_auto_refresh(auth, true);
    }
    on_cleanup(move || user.stop_polling());

    let analytics = move || user.state.with(|s| s.analytics.clone());

    view! {
        <div class="parent">
            <div class="parent-header">
                <div class="parent-title">"Parent dashboard"</div>
                {move || user.state.with(|s| s.offline).then(|| view! {
                    <span class="offline-badge">"Offline data"</span>
                })}
                <label class="auto-refresh">
                    <input
                        type="checkbox"
                        prop:checked=move || user.state.with(|s| s.auto_refresh)
                        on:change=move |ev| user.set_auto_refresh(auth, event_target_checked(&ev))
                    />
                    " Auto refresh"
                </label>
                <button class="refresh-btn" on:click=move |_| user.refresh(auth)>"Refresh"</button>
            </div>
            <div class="last-refreshed">
                {move || user.state.with(|s| s.last_refreshed).map(|ts| format!("Updated {}", format_date(ts, now()).to_lowercase()))}
            </div>

            <div class="analytics-grid">
                <div class="analytics-card">
                    <div class="analytics-value">{move || user.state.with(|s| s.progress.total_points)}</div>
                    <div class="analytics-label">"Total points"</div>
                </div>
                <div class="analytics-card">
                    <div class="analytics-value">{move || user.state.with(|s| s.progress.current_streak)}</div>
                    <div class="analytics-label">"Day streak"</div>
                </div>
                <div class="analytics-card">
                    <div class="analytics-value">{move || analytics().weekly_points}</div>
                    <div class="analytics-label">"Points this week"</div>
                </div>
                <div class="analytics-card">
                    <div class="analytics-value">{move || analytics().weekly_sessions}</div>
                    <div class="analytics-label">"Sessions this week"</div>
                </div>
                <div class="analytics-card">
                    <div class="analytics-value">{move || format_time(analytics().average_session_secs as i64)}</div>
                    <div class="analytics-label">"Average session"</div>
                </div>
                <div class="analytics-card">
                    <div class="analytics-value">{move || analytics().favorite_kata.unwrap_or_else(|| "-".to_string())}</div>
                    <div class="analytics-label">"Favorite kata"</div>
                </div>
            </div>

            <div class="section-title">"Waiting for approval"</div>
            <div class="approval-list">
                {move || {
                    let pending: Vec<_> = rewards.state.with(|r| r.pending().into_iter().cloned().collect());
                    if pending.is_empty() {
                        view! { <div class="empty">"Nothing to approve"</div> }.into_view()
                    } else {
                        pending.into_iter().map(|reward| {
                            let id = reward.id;
                            view! {
                                <div class="approval-item">
                                    <span class="approval-name">{reward.name}</span>
                                    <span class="approval-points">{format!("{} pts", reward.points)}</span>
                                    <button class="approve-btn" on:click=move |_| {
                                        if rewards.state.try_update(|r| r.approve(id)).unwrap_or(false) {
                                            tracing::info!("reward {} approved", id);
                                        }
                                    }>"Approve"</button>
                                    <button class="deny-btn" on:click=move |_| {
                                        rewards.state.update(|r| { r.deny(id); });
                                    }>"Deny"</button>
                                </div>
                            }
                        }).collect_view()
                    }
                }}
            </div>

            <div class="section-title">"All rewards"</div>
            <div class="reward-list">
                {move || rewards.state.with(|r| r.rewards.clone()).into_iter().map(|reward| {
                    let status = match reward.status() {
                        RewardStatus::Approved => "approved",
                        RewardStatus::Pending => "pending",
                        RewardStatus::Unearned => "in progress",
                    };
                    view! {
                        <div class="reward-row">
                            <span class="reward-name">{reward.name}</span>
                            <span class="reward-progress">{format_percent(reward.progress)}</span>
                            <span class="reward-status">{status}</span>
                        </div>
                    }
                }).collect_view()}
            </div>

            <div class="section-title">"Recent activity"</div>
            <div class="activity-list">
                {move || {
                    let current = now();
                    user.state.with(|s| s.recent_activity.clone()).into_iter().map(|a| view! {
                        <div class="activity-item">
                            <span class="activity-when">{format_date(a.timestamp, current)}</span>
                            <span class="activity-text">{a.description}</span>
                            {(a.points > 0).then(|| view! { <span class="activity-points">{format!("+{}", a.points)}</span> })}
                        </div>
                    }).collect_view()
                }}
            </div>

            <div class="section-title">"Practice history"</div>
            <div class="history-summary">
                {move || user.state.with(|s| format!(
                    "{} days practiced this month · {} points audited",
                    s.practiced_days(),
                    s.audited_points()
                ))}
            </div>
            <table class="history-table">
                <thead>
                    <tr><th>"Date"</th><th>"Punches"</th><th>"Kicks"</th><th>"Katas"</th><th>"Points"</th></tr>
                </thead>
                <tbody>
                    {move || user.state.with(|s| s.history.clone()).into_iter().map(|h| view! {
                        <tr>
                            <td>{h.date}</td>
                            <td>{h.punches}</td>
                            <td>{h.kicks}</td>
                            <td>{h.katas}</td>
                            <td>{h.points}</td>
                        </tr>
                    }).collect_view()}
                </tbody>
            </table>
        </div>
    }
}
