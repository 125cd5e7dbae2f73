//! 解析中インジケーター

use leptos::prelude::*;

#[component]
pub fn Spinner() -> impl IntoView {
    view! {
        <div class="spinner-container" role="status">
            <div class="spinner" />
            <p class="spinner-text">"Analyzing report..."</p>
        </div>
    }
}
