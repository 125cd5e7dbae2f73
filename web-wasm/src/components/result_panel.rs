//! 抽出結果カード
//!
//! 共通ライブラリの `render_document` が返すブロックをそのまま描画する。

use leptos::prelude::*;
use medreport_common::{Block, Entry, Line, ListItem};

#[component]
pub fn ResultPanel(blocks: Vec<Block>) -> impl IntoView {
    view! {
        <div class="result-cards">
            {blocks.into_iter().map(render_block).collect_view()}
        </div>
    }
}

fn render_block(block: Block) -> AnyView {
    match block {
        Block::Card { title, entries } => view! {
            <div class="result-card">
                <h3 class="result-card-title">{title}</h3>
                <div class="result-card-body">
                    {entries.into_iter().map(render_entry).collect_view()}
                </div>
            </div>
        }
        .into_any(),
        Block::Prose { title, text } => view! {
            <div class="result-card">
                <h3 class="result-card-title">{title}</h3>
                <p class="result-prose">{text}</p>
            </div>
        }
        .into_any(),
    }
}

fn render_entry(entry: Entry) -> AnyView {
    match entry {
        Entry::Line(line) => render_line(line),
        Entry::Group { label, lines } => view! {
            <div class="result-group">
                <p class="result-label">{label}":"</p>
                <div class="result-group-body">
                    {lines.into_iter().map(render_line).collect_view()}
                </div>
            </div>
        }
        .into_any(),
        Entry::List { label, items } => view! {
            <div class="result-list">
                <p class="result-label">{label}":"</p>
                {items.into_iter().map(render_item).collect_view()}
            </div>
        }
        .into_any(),
    }
}

fn render_item(item: ListItem) -> AnyView {
    match item {
        ListItem::Fields(lines) => view! {
            <div class="result-item">
                {lines.into_iter().map(render_line).collect_view()}
            </div>
        }
        .into_any(),
        ListItem::Text(text) => view! {
            <div class="result-item">
                <p>{text}</p>
            </div>
        }
        .into_any(),
    }
}

fn render_line(line: Line) -> AnyView {
    view! {
        <p class="result-line">
            <span class="result-label">{line.label}":"</span>
            " "
            <span class="result-value">{line.value}</span>
        </p>
    }
    .into_any()
}
