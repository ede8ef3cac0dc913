use leptos::*;
use crate::auth;
use crate::context::AuthContext;
use crate::types::{AppView, UserRole};

#[component]
pub fn Login(set_view: WriteSignal<AppView>) -> impl IntoView {
    let ctx = expect_context::<AuthContext>();
    let (email, set_email) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (error, set_error) = create_signal(Option::<String>::None);
    let (loading, set_loading) = create_signal(false);

    // Returning from Google with an id_token in the URL fragment
    if let Some(credential) = current_fragment().and_then(|f| auth::credential_from_fragment(&f)) {
        clear_fragment();
        set_loading.set(true);
        let backend = ctx.backend();
        spawn_local(async move {
            match auth::sign_in_with_google(&backend, &credential).await {
                Ok(session) => {
                    ctx.session.set(Some(session));
                    set_view.set(AppView::Dashboard);
                }
                Err(e) => {
                    set_error.set(Some(e.to_string()));
                    set_loading.set(false);
                }
            }
        });
    }

    let do_login = move |_| {
        let email = email.get();
        let password = password.get();
        set_loading.set(true);
        set_error.set(None);

        let backend = ctx.backend();
        spawn_local(async move {
            match auth::sign_in(&backend, &email, &password).await {
                Ok(session) => {
                    ctx.session.set(Some(session));
                    set_view.set(AppView::Dashboard);
                }
                Err(e) => {
                    set_error.set(Some(e.to_string()));
                    set_loading.set(false);
                }
            }
        });
    };

    let google_url = ctx.config().google_client_id.map(|client_id| {
        let origin = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default();
        let redirect = String::from(js_sys::encode_uri_component(&origin));
        auth::google_sign_in_url(&client_id, &redirect, &crate::context::now().to_string())
    });

    view! {
        <div class="auth-container">
            <div class="auth-logo">"KIAI"</div>
            <div class="auth-card">
                <h2 class="auth-title">"Sign in"</h2>

                {move || error.get().map(|e| view! { <div class="auth-error">{e}</div> })}

                <input
                    type="email"
                    class="auth-input"
                    placeholder="Email"
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                    prop:value=email
                />

                <input
                    type="password"
                    class="auth-input"
                    placeholder="Password"
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                    prop:value=password
                />

                <button
                    class="auth-button"
                    on:click=do_login
                    disabled=move || loading.get()
                >
                    {move || if loading.get() { "Signing in..." } else { "Sign in" }}
                </button>

                {google_url.map(|url| view! {
                    <a class="auth-google" href=url>"Sign in with Google"</a>
                })}

                <div class="auth-switch">
                    "No account yet? "
                    <button class="auth-link" on:click=move |_| set_view.set(AppView::Register)>
                        "Create one"
                    </button>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn Register(set_view: WriteSignal<AppView>) -> impl IntoView {
    let ctx = expect_context::<AuthContext>();
    let (name, set_name) = create_signal(String::new());
    let (email, set_email) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (password2, set_password2) = create_signal(String::new());
    let (is_parent, set_is_parent) = create_signal(false);
    let (error, set_error) = create_signal(Option::<String>::None);
    let (loading, set_loading) = create_signal(false);

    let do_register = move |_| {
        let name = name.get();
        let email = email.get();
        let password = password.get();
        let password2 = password2.get();
        let role = if is_parent.get() { UserRole::Parent } else { UserRole::Kid };

        if let Err(e) = auth::validate_registration(&name, &email, &password, &password2) {
            set_error.set(Some(auth::auth_error_message(&e)));
            return;
        }

        set_loading.set(true);
        set_error.set(None);

        let backend = ctx.backend();
        spawn_local(async move {
            match auth::sign_up(&backend, &name, &email, &password, &password2, role).await {
                Ok(session) => {
                    ctx.session.set(Some(session));
                    set_view.set(AppView::Dashboard);
                }
                Err(e) => {
                    set_error.set(Some(e.to_string()));
                    set_loading.set(false);
                }
            }
        });
    };

    view! {
        <div class="auth-container">
            <div class="auth-logo">"KIAI"</div>
            <div class="auth-card">
                <h2 class="auth-title">"Create account"</h2>

                {move || error.get().map(|e| view! { <div class="auth-error">{e}</div> })}

                <input
                    type="text"
                    class="auth-input"
                    placeholder="Name"
                    on:input=move |ev| set_name.set(event_target_value(&ev))
                    prop:value=name
                />

                <input
                    type="email"
                    class="auth-input"
                    placeholder="Email"
                    on:input=move |ev| set_email.set(event_target_value(&ev))
                    prop:value=email
                />

                <input
                    type="password"
                    class="auth-input"
                    placeholder="Password"
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                    prop:value=password
                />

                <input
                    type="password"
                    class="auth-input"
                    placeholder="Confirm password"
                    on:input=move |ev| set_password2.set(event_target_value(&ev))
                    prop:value=password2
                />

                <label class="auth-check">
                    <input
                        type="checkbox"
                        on:change=move |ev| set_is_parent.set(event_target_checked(&ev))
                        prop:checked=is_parent
                    />
                    " I am a parent"
                </label>

                <button
                    class="auth-button"
                    on:click=do_register
                    disabled=move || loading.get()
                >
                    {move || if loading.get() { "Creating account..." } else { "Create account" }}
                </button>

                <div class="auth-switch">
                    "Already have an account? "
                    <button class="auth-link" on:click=move |_| set_view.set(AppView::Login)>
                        "Sign in"
                    </button>
                </div>
            </div>
        </div>
    }
}

fn current_fragment() -> Option<String> {
    web_sys::window()?.location().hash().ok()
}

fn clear_fragment() {
    if let Some(window) = web_sys::window() {
        let _ = window.location().set_hash("");
    }
}
