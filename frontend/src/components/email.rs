use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use recollector_core::EmailGateway;

use crate::api::ApiGateway;

/// Registers an address to be notified about the task's result.
#[component]
pub fn EmailForm(task_id: String) -> impl IntoView {
    let (email, set_email) = signal(String::new());
    let (status, set_status) = signal(None::<Result<String, String>>);
    let (submitting, set_submitting) = signal(false);
    let task_id = StoredValue::new(task_id);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let address = email.get_untracked().trim().to_string();
        if address.is_empty() || submitting.get_untracked() {
            return;
        }
        set_submitting.set(true);
        let task = task_id.get_value();

        spawn_local(async move {
            match ApiGateway.submit_email(&task, &address).await {
                Ok(resp) => {
                    log::info!("Registered {} for task {}", resp.email, resp.task_id);
                    set_status.set(Some(Ok(resp.message)));
                }
                Err(e) => {
                    log::error!("Failed to register email: {e}");
                    set_status.set(Some(Err(format!("이메일 등록 실패: {e}"))));
                }
            }
            set_submitting.set(false);
        });
    };

    view! {
        <form class="email-form" on:submit=on_submit>
            <input
                type="email"
                placeholder="결과를 받을 이메일 주소"
                prop:value=email
                on:input=move |ev| set_email.set(event_target_value(&ev))
            />
            <button type="submit" disabled=move || submitting.get()>
                "등록"
            </button>
            {move || {
                status.get().map(|result| match result {
                    Ok(message) => view! { <p class="email-ok">{message}</p> }.into_any(),
                    Err(message) => view! { <p class="email-error">{message}</p> }.into_any(),
                })
            }}
        </form>
    }
}
