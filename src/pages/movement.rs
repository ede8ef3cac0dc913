use gloo_timers::callback::Interval;
use leptos::*;
use crate::app::format_time;
use crate::context::{now, AuthContext, MovementContext};
use crate::movement::validate_draft;
use crate::types::{Move, MoveType, NewCombination};

#[component]
pub fn MovementTracker() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let movement = expect_context::<MovementContext>();
    let (error, set_error) = create_signal(Option::<String>::None);
    let (selected, set_selected) = create_signal(Vec::<String>::new());

    if movement.state.with_untracked(|s| s.combinations.is_empty()) {
        movement.load(auth);
    }

    let is_active = move || movement.state.with(|s| s.is_active());

    let start = move |_| {
        movement.start(auth, selected.get(), set_error);
    };

    view! {
        <div class="movement">
            <div class="movement-header">
                <div class="movement-title">"Combinations"</div>
                {move || movement.state.with(|s| s.offline).then(|| view! {
                    <span class="offline-badge">"Offline data"</span>
                })}
            </div>

            {move || error.get().map(|e| view! { <div class="error-banner">{e}</div> })}

            {move || if is_active() {
                view! { <SessionView /> }.into_view()
            } else {
                view! {
                    <div class="combo-list">
                        {move || if movement.state.with(|s| s.loading) {
                            view! { <div class="loading">"Loading combinations..."</div> }.into_view()
                        } else {
                            movement.state.with(|s| s.combinations.clone()).into_iter().map(|combo| {
                                let id = combo.combination_id.clone();
                                let checked_id = id.clone();
                                let is_local = id.starts_with("local-");
                                view! {
                                    <label class="combo-item">
                                        <input
                                            type="checkbox"
                                            prop:checked=move || selected.with(|s| s.contains(&checked_id))
                                            on:change=move |ev| {
                                                let on = event_target_checked(&ev);
                                                let id = id.clone();
                                                set_selected.update(|s| {
                                                    s.retain(|x| x != &id);
                                                    if on {
                                                        s.push(id);
                                                    }
                                                });
                                            }
                                        />
                                        <span class="combo-name">{combo.name.clone()}</span>
                                        <span class="combo-meta">
                                            {format!("{} moves × {}", combo.moves.len(), combo.repeat_count)}
                                        </span>
                                        {is_local.then(|| view! { <span class="combo-local">"not synced"</span> })}
                                    </label>
                                }
                            }).collect_view()
                        }}
                    </div>
                    <button
                        class="start-session-btn"
                        disabled=move || selected.with(|s| s.is_empty()) || movement.starting.get()
                        on:click=start
                    >
                        {move || format!("Start session ({})", selected.with(|s| s.len()))}
                    </button>
                    <ComboBuilder set_error=set_error />
                }.into_view()
            }}

            <div class="counter-list">
                <div class="section-title">"Move counters"</div>
                {move || movement.state.with(|s| s.counters.clone()).into_iter().map(|c| view! {
                    <div class="counter-item">
                        <span class="counter-name">{c.move_name}</span>
                        <span class="counter-detail">
                            {format!("→ {}  ← {}  Σ {}", c.forward_count, c.backward_count, c.total_count)}
                        </span>
                    </div>
                }).collect_view()}
            </div>
        </div>
    }
}

#[component]
fn SessionView() -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let movement = expect_context::<MovementContext>();
    let (notes, set_notes) = create_signal(String::new());
    let (clock, set_clock) = create_signal(now());

    let handle = Interval::new(1000, move || set_clock.set(now()));
    on_cleanup(move || drop(handle));

    let session_data = move || movement.state.with(|s| s.session_data(clock.get()));
    let progress = move || movement.state.with(|s| s.practice_progress);
    let all_done = move || {
        let p = progress();
        p.total_moves > 0 && p.completed_moves == p.total_moves
    };

    view! {
        <div class="session">
            <div class="session-stats">
                <span>{move || format!("{} combos", session_data().combinations)}</span>
                <span>{move || format!("{} moves", session_data().moves)}</span>
                <span class="session-time">{move || format_time(session_data().session_time)}</span>
            </div>

            <div class="current-move">
                {move || movement.state.with(|s| s.current_move().cloned()).map(|m| view! {
                    <div class="move-type">{m.move_type.label()}</div>
                    <div class="move-name">{m.name}</div>
                    <div class="move-description">{m.description}</div>
                })}
                <div class="move-position">
                    {move || {
                        let p = progress();
                        format!("{} / {}", p.current_move_index + 1, p.total_moves)
                    }}
                </div>
                <div class="move-completed">
                    {move || {
                        let p = progress();
                        format!("{} of {} done", p.completed_moves, p.total_moves)
                    }}
                </div>
            </div>

            <div class="move-nav">
                <button class="nav-btn" on:click=move |_| movement.state.update(|s| s.previous_move())>"← Prev"</button>
                <button
                    class="complete-btn"
                    disabled=all_done
                    on:click=move |_| movement.state.update(|s| { s.complete_current_move(); })
                >
                    "Done ✓"
                </button>
                <button class="nav-btn" on:click=move |_| movement.state.update(|s| s.next_move())>"Next →"</button>
            </div>

            {move || all_done().then(|| view! { <div class="session-complete">"All moves done!"</div> })}

            <textarea
                class="session-notes"
                placeholder="Notes"
                prop:value=notes
                on:input=move |ev| set_notes.set(event_target_value(&ev))
            ></textarea>

            <button class="end-session-btn" on:click=move |_| movement.end(auth, notes.get())>
                "End session"
            </button>
        </div>
    }
}

#[component]
fn ComboBuilder(set_error: WriteSignal<Option<String>>) -> impl IntoView {
    let auth = expect_context::<AuthContext>();
    let movement = expect_context::<MovementContext>();
    let (name, set_name) = create_signal(String::new());
    let (move_type, set_move_type) = create_signal(MoveType::Stance);
    let (move_name, set_move_name) = create_signal(String::new());
    let (moves, set_moves) = create_signal(Vec::<Move>::new());
    let (repeat, set_repeat) = create_signal(1u32);

    let add_move = move |_| {
        let label = move_name.get();
        if label.trim().is_empty() {
            return;
        }
        let m = match move_type.get() {
            MoveType::Stance => Move::stance(label.trim()),
            MoveType::Direction => Move::direction(label.trim()),
            MoveType::Technique => Move::technique(label.trim()),
        };
        set_moves.update(|ms| ms.push(m));
        set_move_name.set(String::new());
    };

    let save = move |_| {
        let draft = NewCombination {
            name: name.get(),
            moves: moves.get(),
            repeat_count: repeat.get(),
        };
        // Keep the draft on screen until it is actually stored
        if let Err(e) = validate_draft(&draft) {
            set_error.set(Some(e.to_string()));
            return;
        }
        movement.add_combination(auth, draft, set_error, move || {
            set_name.set(String::new());
            set_moves.set(Vec::new());
            set_repeat.set(1);
        });
    };

    view! {
        <div class="combo-builder">
            <div class="section-title">"New combination"</div>
            <input
                type="text"
                class="builder-input"
                placeholder="Name"
                prop:value=name
                on:input=move |ev| set_name.set(event_target_value(&ev))
            />
            <div class="builder-row">
                <select
                    class="builder-select"
                    on:change=move |ev| {
                        let value = event_target_value(&ev);
                        if let Some(t) = MoveType::all().into_iter().find(|t| t.label() == value) {
                            set_move_type.set(t);
                        }
                    }
                >
                    {MoveType::all().into_iter().map(|t| view! {
                        <option value=t.label() selected=move || move_type.get() == t>{t.label()}</option>
                    }).collect_view()}
                </select>
                <input
                    type="text"
                    class="builder-input"
                    placeholder="Move, e.g. Zenkutsu Dachi"
                    prop:value=move_name
                    on:input=move |ev| set_move_name.set(event_target_value(&ev))
                />
                <button class="builder-add" on:click=add_move>"+"</button>
            </div>
            <ol class="builder-moves">
                {move || moves.get().into_iter().enumerate().map(|(i, m)| view! {
                    <li class="builder-move">
                        <span>{format!("{}: {}", m.move_type.label(), m.name)}</span>
                        <button class="builder-remove" on:click=move |_| set_moves.update(|ms| { ms.remove(i); })>"✕"</button>
                    </li>
                }).collect_view()}
            </ol>
            <div class="builder-row">
                <span class="builder-label">"Repeat"</span>
                <button class="repeat-btn" on:click=move |_| set_repeat.update(|r| *r = r.saturating_sub(1).max(1))>"−"</button>
                <span class="repeat-value">{repeat}</span>
                <button class="repeat-btn" on:click=move |_| set_repeat.update(|r| *r += 1)>"+"</button>
            </div>
            <button class="builder-save" on:click=save>"Save combination"</button>
        </div>
    }
}
