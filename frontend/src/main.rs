mod api;
mod browser;
mod components;
mod state;

use leptos::mount::mount_to_body;
use leptos::prelude::*;
use recollector_core::api::resolve_asset_url;

use api::API_BASE;
use components::chat::EditChat;
use components::email::EmailForm;

/// Root application component.
#[component]
fn App() -> impl IntoView {
    let Some(task_id) = browser::task_id_from_query() else {
        return view! {
            <div class="app-container">
                <div class="empty-state">
                    "작업 ID가 없습니다. 주소 끝에 ?task=<작업 ID> 를 붙여주세요."
                </div>
            </div>
        }
        .into_any();
    };

    let (model_url, set_model_url) = signal(None::<String>);
    let on_model_updated = Callback::new(move |url: String| {
        set_model_url.set(Some(resolve_asset_url(API_BASE, &url)));
    });
    let title = format!("Task {task_id}");
    let email_task_id = task_id.clone();

    view! {
        <div class="app-container">
            <section class="model-panel">
                <h2>{title}</h2>
                {move || {
                    model_url.get().map(|url| {
                        view! {
                            <a class="model-link" href=url target="_blank">
                                "편집된 모델 열기"
                            </a>
                        }
                    })
                }}
                <EmailForm task_id=email_task_id />
            </section>
            <EditChat task_id=task_id on_model_updated=on_model_updated />
        </div>
    }
    .into_any()
}

fn main() {
    console_log::init_with_level(log::Level::Debug).expect("Failed to init logger");
    mount_to_body(App);
}
