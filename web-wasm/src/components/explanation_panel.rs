//! わかりやすい説明パネル
//!
//! 許可リスト適用済みの `Markup` を要素ごとに組み立てる。
//! 生のHTML文字列を inner_html で挿入することはしない。

use leptos::prelude::*;
use medreport_common::{Markup, MarkupNode, Tag};

#[component]
pub fn ExplanationPanel(markup: Markup) -> impl IntoView {
    view! {
        <div class="explanation-panel">
            <h3>"Plain-Language Summary"</h3>
            <div class="explanation-body">
                {markup.nodes().iter().map(render_node).collect_view()}
            </div>
        </div>
    }
}

fn render_node(node: &MarkupNode) -> AnyView {
    match node {
        MarkupNode::Text(text) => text.clone().into_any(),
        MarkupNode::Element { tag, children } => {
            let inner = children.iter().map(render_node).collect_view();
            match tag {
                Tag::Ol => view! { <ol>{inner}</ol> }.into_any(),
                Tag::Ul => view! { <ul>{inner}</ul> }.into_any(),
                Tag::Li => view! { <li>{inner}</li> }.into_any(),
                Tag::Strong => view! { <strong>{inner}</strong> }.into_any(),
                Tag::B => view! { <b>{inner}</b> }.into_any(),
                Tag::Em => view! { <em>{inner}</em> }.into_any(),
                Tag::I => view! { <i>{inner}</i> }.into_any(),
                Tag::U => view! { <u>{inner}</u> }.into_any(),
                Tag::P => view! { <p>{inner}</p> }.into_any(),
                Tag::Br => view! { <br /> }.into_any(),
            }
        }
    }
}
