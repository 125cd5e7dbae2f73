//! ヘッダーコンポーネント

use leptos::prelude::*;

#[component]
pub fn Header() -> impl IntoView {
    view! {
        <header class="header">
            <h1>"Medical Report Analyzer"</h1>
            <p class="subtitle">
                "Upload a photo or scan of a medical report to extract its contents as structured data."
            </p>
        </header>
    }
}
