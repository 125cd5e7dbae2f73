//! エラー表示

use leptos::prelude::*;

/// `warning` のときは結果表示を妨げない補助的な警告として表示する
#[component]
pub fn ErrorBanner(message: String, #[prop(optional)] warning: bool) -> impl IntoView {
    let (class, heading) = if warning {
        ("banner banner-warning", "Note")
    } else {
        ("banner banner-error", "Error")
    };

    view! {
        <div class=class role="alert">
            <strong>{heading}</strong>
            <p>{message}</p>
        </div>
    }
}
