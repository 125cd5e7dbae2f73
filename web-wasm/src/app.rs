//! メインアプリケーションコンポーネント

use leptos::prelude::*;
use medreport_common::{render_document, Orchestrator, PendingAttempt, Session, Variant};
use wasm_bindgen_futures::spawn_local;
use web_sys::File;

use crate::api::FetchTransport;
use crate::components::{
    error_banner::ErrorBanner,
    explanation_panel::ExplanationPanel,
    header::Header,
    result_panel::ResultPanel,
    spinner::Spinner,
    upload_area::UploadArea,
};
use crate::file_reader::read_file;

/// メインアプリケーションコンポーネント
///
/// 状態は `Session` 1つにまとめ、各表示はそこから導出する。
#[component]
pub fn App() -> impl IntoView {
    let session = RwSignal::new(Session::new());
    let (explain, set_explain) = signal(true);

    // 画像選択ハンドラ（読み込み完了順が前後しても最後の選択だけを反映）
    let on_file_selected = move |file: File| {
        let mut ticket = None;
        session.update(|s| ticket = Some(s.begin_selection()));
        let Some(ticket) = ticket else {
            return;
        };

        spawn_local(async move {
            let outcome = read_file(file).await;
            if let Err(e) = &outcome {
                gloo::console::error!(e.to_string());
            }
            session.update(|s| {
                s.finish_selection(ticket, outcome);
            });
        });
    };

    // 解析開始ハンドラ
    let on_extract = move |_| {
        let mut pending = None;
        session.update(|s| pending = s.begin_attempt());
        let Some(PendingAttempt { ticket, image }) = pending else {
            return;
        };

        let variant = Variant::from_explain_flag(explain.get_untracked());
        spawn_local(async move {
            let orchestrator = Orchestrator::new(FetchTransport::from_document(), variant);
            let outcome = orchestrator.run(Some(&image)).await;

            match &outcome {
                Err(e) => gloo::console::error!(e.to_string()),
                Ok(report) => {
                    if let Some(e) = &report.explanation_error {
                        gloo::console::warn!(e.to_string());
                    }
                }
            }

            session.update(|s| {
                s.complete(ticket, outcome);
            });
        });
    };

    let has_file = Signal::derive(move || session.with(|s| s.image().is_some()));
    let is_loading = Signal::derive(move || session.with(|s| s.is_loading()));

    view! {
        <div class="container">
            <Header />

            <main class="layout">
                <section class="panel">
                    <h2>"1. Upload Report"</h2>
                    <UploadArea
                        has_file=has_file
                        disabled=is_loading
                        on_file_selected=on_file_selected
                    />

                    {move || session.with(|s| s.preview_url().map(|url| {
                        let url = url.to_string();
                        view! {
                            <div class="preview">
                                <h3>"Report Preview:"</h3>
                                <img src=url alt="Medical report preview" />
                            </div>
                        }
                    }))}

                    <label class="explain-toggle">
                        <input
                            type="checkbox"
                            prop:checked=move || explain.get()
                            disabled=move || is_loading.get()
                            on:change=move |ev| set_explain.set(event_target_checked(&ev))
                        />
                        " Include plain-language summary"
                    </label>

                    <button
                        class="btn btn-primary"
                        disabled=move || !session.with(|s| s.can_trigger())
                        on:click=on_extract
                    >
                        {move || if is_loading.get() { "Analyzing..." } else { "2. Extract Data" }}
                    </button>
                </section>

                <section class="panel">
                    <h2>"Extracted Information"</h2>

                    <Show when=move || is_loading.get()>
                        <Spinner />
                    </Show>

                    {move || session.with(|s| s.error_message().map(|message| {
                        view! { <ErrorBanner message=message.to_string() /> }
                    }))}

                    {move || session.with(|s| s.summary_error().map(|message| {
                        view! { <ErrorBanner message=message.to_string() warning=true /> }
                    }))}

                    {move || session.with(|s| s.result().map(|result| {
                        view! { <ResultPanel blocks=render_document(result) /> }
                    }))}

                    {move || session.with(|s| s.explanation().cloned().map(|markup| {
                        view! { <ExplanationPanel markup=markup /> }
                    }))}

                    <Show when=move || {
                        session.with(|s| {
                            !s.is_loading() && s.result().is_none() && s.error_message().is_none()
                        })
                    }>
                        <p class="text-muted empty-state">"Your extracted data will appear here."</p>
                    </Show>
                </section>
            </main>
        </div>
    }
}
