//! アップロードエリアコンポーネント
//!
//! クリックでのファイル選択とドラッグ&ドロップに対応する。1枚のみ。

use leptos::html::Input;
use leptos::prelude::*;
use medreport_common::payload::accept_attribute;
use web_sys::{DragEvent, File, HtmlInputElement};

#[component]
pub fn UploadArea<F>(
    has_file: Signal<bool>,
    disabled: Signal<bool>,
    on_file_selected: F,
) -> impl IntoView
where
    F: Fn(File) + 'static + Clone,
{
    let (is_dragover, set_is_dragover) = signal(false);
    let input_ref: NodeRef<Input> = NodeRef::new();

    let on_change = {
        let on_file_selected = on_file_selected.clone();
        move |ev: web_sys::Event| {
            let input: HtmlInputElement = event_target(&ev);
            if let Some(file) = input.files().and_then(|files| files.get(0)) {
                on_file_selected(file);
            }
            // 同じファイルを選び直しても change が発火するように
            input.set_value("");
        }
    };

    let on_drop = {
        let on_file_selected = on_file_selected.clone();
        move |ev: DragEvent| {
            ev.prevent_default();
            set_is_dragover.set(false);

            if disabled.get_untracked() {
                return;
            }

            if let Some(file) = ev
                .data_transfer()
                .and_then(|dt| dt.files())
                .and_then(|files| files.get(0))
            {
                on_file_selected(file);
            }
        }
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        if !disabled.get_untracked() {
            set_is_dragover.set(true);
        }
    };

    let on_dragleave = move |_: DragEvent| {
        set_is_dragover.set(false);
    };

    let on_click = move |_| {
        if disabled.get_untracked() {
            return;
        }
        if let Some(input) = input_ref.get() {
            input.click();
        }
    };

    view! {
        <div
            class=move || {
                let mut classes = vec!["upload-area"];
                if is_dragover.get() {
                    classes.push("dragover");
                }
                if disabled.get() {
                    classes.push("disabled");
                }
                classes.join(" ")
            }
            on:drop=on_drop
            on:dragover=on_dragover
            on:dragleave=on_dragleave
        >
            <input
                node_ref=input_ref
                type="file"
                class="hidden"
                accept=accept_attribute()
                disabled=move || disabled.get()
                on:change=on_change
            />
            <div class="upload-icon">"📄"</div>
            <button class="btn btn-secondary" disabled=move || disabled.get() on:click=on_click>
                {move || if has_file.get() { "Change Report" } else { "Select a Report" }}
            </button>
            <p class="text-muted">"or drag and drop it here"</p>
            <p class="text-muted">"PNG, JPG, or WEBP files supported."</p>
        </div>
    }
}
