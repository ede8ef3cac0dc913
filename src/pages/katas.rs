use futures::future;
use leptos::*;
use crate::app::format_date;
use crate::context::{now, AuthContext, PracticeContext};
use crate::katas;
use crate::stats::MasteryLevel;
use crate::types::{Kata, KataPractice, KataProgress};

#[component]
pub fn Katas() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let practice = expect_context::<PracticeContext>();
    let (library, set_library) = create_signal(Vec::<Kata>::new());
    let (progress, set_progress) = create_signal(Vec::<KataProgress>::new());
    let (offline, set_offline) = create_signal(false);
    let (loading, set_loading) = create_signal(true);
    let (query, set_query) = create_signal(String::new());
    let (detail, set_detail) = create_signal(Option::<Kata>::None);
    let (error, set_error) = create_signal(Option::<String>::None);
    let pdf_prefix = auth.config().kata_pdf_prefix;

    {
        let backend = auth.backend();
        let user_id = auth.user_id();
        spawn_local(async move {
            let progress_fut = async {
                match &user_id {
                    Some(id) => katas::fetch_progress(&backend, id).await.into_value().unwrap_or_default(),
                    None => Vec::new(),
                }
            };
            let (list, prog) = future::join(katas::fetch_katas(&backend), progress_fut).await;
            set_offline.set(list.is_degraded());
            set_library.set(list.into_value().unwrap_or_default());
            set_progress.set(prog);
            set_loading.set(false);
        });
    }

    let open_detail = move |id: u32| {
        let backend = auth.backend();
        spawn_local(async move {
            let outcome = katas::fetch_kata(&backend, id).await;
            if outcome.is_degraded() {
                set_offline.set(true);
            }
            set_detail.set(outcome.into_value());
        });
    };

    let record = move |kata: Kata| {
        // Count it towards a running practice session too
        practice.state.update(|s| s.add_kata_repetition(kata.id, &kata.name));

        let Some(user_id) = auth.user_id() else {
            set_error.set(Some("Sign in to track kata progress".into()));
            return;
        };
        let backend = auth.backend();
        let payload = KataPractice { user_id, kata_id: kata.id, repetitions: 1, duration_secs: 0 };
        spawn_local(async move {
            match katas::record_practice(&backend, &payload).await {
                Ok(update) => {
                    set_progress.update(|p| katas::merge_progress(p, update));
                    set_error.set(None);
                }
                Err(_) => set_error.set(Some("Could not save kata practice".into())),
            }
        });
    };

    view! {
        <div class="katas">
            <div class="katas-header">
                <div class="katas-title">"Kata library"</div>
                {move || offline.get().then(|| view! { <span class="offline-badge">"Offline data"</span> })}
            </div>

            {move || error.get().map(|e| view! { <div class="error-banner">{e}</div> })}

            <input
                type="search"
                class="katas-search"
                placeholder="Search kata"
                prop:value=query
                on:input=move |ev| set_query.set(event_target_value(&ev))
            />

            {move || detail.get().map(|kata| {
                let pdf = katas::pdf_path(&pdf_prefix, kata.id);
                view! {
                    <div class="kata-detail">
                        <button class="kata-detail-close" on:click=move |_| set_detail.set(None)>"✕"</button>
                        <div class="kata-detail-name">{kata.name.clone()}</div>
                        <div class="kata-detail-belt">{format!("{} belt", kata.belt)}</div>
                        {(kata.move_count > 0).then(|| view! {
                            <div class="kata-detail-moves">{format!("{} moves", kata.move_count)}</div>
                        })}
                        <p class="kata-detail-description">{kata.description.clone()}</p>
                        {pdf.map(|href| view! { <a class="kata-pdf" href=href target="_blank">"Open PDF"</a> })}
                        {kata.video_url.clone().map(|href| view! { <a class="kata-video" href=href target="_blank">"Watch video"</a> })}
                    </div>
                }
            })}

            <div class="kata-grid">
                {move || if loading.get() {
                    view! { <div class="loading">"Loading katas..."</div> }.into_view()
                } else {
                    let list = library.get();
                    let prog = progress.get();
                    let current = now();
                    katas::search(&list, &query.get()).into_iter().cloned().map(|kata| {
                        let entry = katas::progress_for(&prog, kata.id).cloned();
                        let pct = entry.as_ref().map(|p| p.mastery_percentage).unwrap_or(0.0);
                        let level = MasteryLevel::from_percentage(pct);
                        let id = kata.id;
                        let to_record = kata.clone();
                        view! {
                            <div class="kata-card">
                                <button class="kata-card-title" on:click=move |_| open_detail(id)>
                                    <span class="kata-number">{format!("{:02}", kata.id)}</span>
                                    <span class="kata-name">{kata.name.clone()}</span>
                                </button>
                                <div class="kata-belt">{kata.belt.clone()}</div>
                                <div class="kata-mastery">{format!("{} · {:.0}%", level.label(), pct)}</div>
                                {entry.map(|p| view! {
                                    <div class="kata-practiced">
                                        {format!("Practiced {} times", p.times_practiced)}
                                        {p.last_practiced.map(|ts| format!(", last {}", format_date(ts, current).to_lowercase()))}
                                    </div>
                                })}
                                <button class="kata-record-btn" on:click=move |_| record(to_record.clone())>
                                    "I practiced this"
                                </button>
                            </div>
                        }
                    }).collect_view()
                }}
            </div>
        </div>
    }
}
