use leptos::*;
use crate::config::Config;
use crate::context::{provide_app_contexts, AuthContext};
use crate::pages::{Dashboard, Katas, Login, MovementTracker, Parent, Register};
use crate::types::{AppView, UserRole};

pub fn format_time(secs: i64) -> String {
    let mins = secs / 60;
    let s = secs % 60;
    format!("{:02}:{:02}", mins, s)
}

/// "Today", "Yesterday" or "N days ago" relative to `now` (both unix seconds, UTC days).
pub fn format_date(ts: i64, now: i64) -> String {
    let days = now.div_euclid(86400) - ts.div_euclid(86400);
    match days {
        d if d <= 0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d => format!("{} days ago", d),
    }
}

pub fn format_percent(fraction: f64) -> String {
    format!("{:.0}%", (fraction * 100.0).clamp(0.0, 100.0))
}

/// The view actually rendered. Only parents get the parent dashboard.
pub fn visible_view(requested: AppView, role: Option<UserRole>) -> AppView {
    match requested {
        AppView::Parent if role != Some(UserRole::Parent) => AppView::Dashboard,
        other => other,
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_app_contexts(Config::from_env());
    let auth = expect_context::<AuthContext>();
    auth.restore();

    let initial_view = if auth.session.get_untracked().is_some() {
        AppView::Dashboard
    } else {
        AppView::Login
    };
    let (view, set_view) = create_signal(initial_view);

    // Expired token or sign-out: back to the login screen
    create_effect(move |_| {
        if auth.session.with(|s| s.is_none()) {
            match view.get_untracked() {
                AppView::Login | AppView::Register => {}
                _ => set_view.set(AppView::Login),
            }
        }
    });

    view! {
        <div class="app">
            {move || auth.is_signed_in().then(|| view! { <NavBar view=view set_view=set_view /> })}
            {move || match visible_view(view.get(), auth.session.with(|s| s.as_ref().map(|s| s.user.role))) {
                AppView::Login => view! { <Login set_view=set_view /> }.into_view(),
                AppView::Register => view! { <Register set_view=set_view /> }.into_view(),
                AppView::Dashboard => view! { <Dashboard set_view=set_view /> }.into_view(),
                AppView::Movement => view! { <MovementTracker /> }.into_view(),
                AppView::Katas => view! { <Katas /> }.into_view(),
                AppView::Parent => view! { <Parent /> }.into_view(),
            }}
        </div>
    }
}

#[component]
fn NavBar(view: ReadSignal<AppView>, set_view: WriteSignal<AppView>) -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let is_parent = move || auth.session.with(|s| s.as_ref().map(|s| s.user.role) == Some(UserRole::Parent));

    let tab = move |target: AppView, label: &'static str| {
        let active_target = target.clone();
        view! {
            <button
                class="nav-tab"
                class:active=move || view.get() == active_target
                on:click=move |_| set_view.set(target.clone())
            >
                {label}
            </button>
        }
    };

    view! {
        <nav class="navbar">
            <div class="nav-brand">"KIAI"</div>
            <div class="nav-links">
                {tab(AppView::Dashboard, "Practice")}
                {tab(AppView::Movement, "Combos")}
                {tab(AppView::Katas, "Katas")}
                {move || is_parent().then(|| tab(AppView::Parent, "Parents"))}
            </div>
            <button class="nav-signout" on:click=move |_| auth.sign_out()>"Sign out"</button>
        </nav>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_is_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(125), "02:05");
    }

    #[test]
    fn parent_view_requires_parent_role() {
        assert_eq!(visible_view(AppView::Parent, Some(UserRole::Parent)), AppView::Parent);
        assert_eq!(visible_view(AppView::Parent, Some(UserRole::Kid)), AppView::Dashboard);
        assert_eq!(visible_view(AppView::Parent, None), AppView::Dashboard);
        assert_eq!(visible_view(AppView::Katas, Some(UserRole::Kid)), AppView::Katas);
    }

    #[test]
    fn dates_are_relative() {
        let now = 20 * 86400 + 3600;
        assert_eq!(format_date(now - 60, now), "Today");
        assert_eq!(format_date(now - 86400, now), "Yesterday");
        assert_eq!(format_date(now - 3 * 86400, now), "3 days ago");
    }
}
