//! 抽出結果の汎用レンダラー
//!
//! スキーマを仮定せず、JSON文書をタイトル付きカードの並びに変換する。
//! 描画先（Leptos / 端末）に依存しない中間表現を返す純粋関数。
//!
//! - トップレベル: 配列 → 1項目のカード、オブジェクト → カード、空でない文字列 → 文章ブロック
//! - カード内: 配列 → リスト、オブジェクト → 1段だけ展開した行、スカラー → 1行
//! - 空文字列・null は "N/A"

use serde_json::{Map, Value};

use crate::types::ExtractionResult;

/// 値が空のときの表示
pub const PLACEHOLDER: &str = "N/A";

/// トップレベルのブロック
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Card { title: String, entries: Vec<Entry> },
    Prose { title: String, text: String },
}

impl Block {
    pub fn title(&self) -> &str {
        match self {
            Block::Card { title, .. } | Block::Prose { title, .. } => title,
        }
    }
}

/// カード内の1項目
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Line(Line),
    /// ネストしたオブジェクト（1段のみ展開）
    Group { label: String, lines: Vec<Line> },
    /// 配列
    List { label: String, items: Vec<ListItem> },
}

/// ラベル付きの1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub label: String,
    pub value: String,
}

/// 配列の1要素
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    Fields(Vec<Line>),
    Text(String),
}

/// キー名を表示ラベルに変換
///
/// 途中の大文字の前に空白を入れ、先頭を大文字にする。
/// `laboratoryResults` → `Laboratory Results`
pub fn format_key_label(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;

    for c in key.chars() {
        if c.is_uppercase() && prev.is_some_and(|p| !p.is_whitespace()) {
            spaced.push(' ');
        }
        spaced.push(c);
        prev = Some(c);
    }

    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// スカラー表示用の文字列化（空なら "N/A"）
///
/// それ以上展開しない入れ子の値もここで1行に潰す:
/// 配列は ", " 区切り、オブジェクトはJSON文字列。
pub fn display_value(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    };

    if text.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        text
    }
}

/// 抽出結果をブロック列に変換
///
/// ルートがオブジェクトでない場合は `{"result": <root>}` として扱う
pub fn render_document(result: &ExtractionResult) -> Vec<Block> {
    match result.value() {
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, value)| render_top_level(key, value))
            .collect(),
        other => render_top_level("result", other).into_iter().collect(),
    }
}

fn render_top_level(key: &str, value: &Value) -> Option<Block> {
    let title = format_key_label(key);

    match value {
        Value::Array(_) => Some(Block::Card {
            title,
            entries: vec![render_entry(key, value)],
        }),
        Value::Object(map) => Some(Block::Card {
            title,
            entries: map.iter().map(|(k, v)| render_entry(k, v)).collect(),
        }),
        Value::String(text) if !text.is_empty() => Some(Block::Prose {
            title,
            text: text.clone(),
        }),
        _ => None,
    }
}

fn render_entry(key: &str, value: &Value) -> Entry {
    let label = format_key_label(key);

    match value {
        Value::Array(items) => Entry::List {
            label,
            items: items.iter().map(render_list_item).collect(),
        },
        Value::Object(map) => Entry::Group {
            label,
            lines: render_lines(map),
        },
        _ => Entry::Line(Line {
            label,
            value: display_value(value),
        }),
    }
}

fn render_list_item(item: &Value) -> ListItem {
    match item {
        Value::Object(map) => ListItem::Fields(render_lines(map)),
        other => ListItem::Text(display_value(other)),
    }
}

fn render_lines(map: &Map<String, Value>) -> Vec<Line> {
    map.iter()
        .map(|(key, value)| Line {
            label: format_key_label(key),
            value: display_value(value),
        })
        .collect()
}

/// 端末向けテキスト表示
pub fn render_text(blocks: &[Block]) -> String {
    let mut out = Vec::new();

    for block in blocks {
        out.push(format!("== {} ==", block.title()));
        match block {
            Block::Prose { text, .. } => out.push(text.clone()),
            Block::Card { entries, .. } => {
                for entry in entries {
                    write_entry(entry, &mut out);
                }
            }
        }
        out.push(String::new());
    }

    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

fn write_entry(entry: &Entry, out: &mut Vec<String>) {
    match entry {
        Entry::Line(line) => out.push(format!("{}: {}", line.label, line.value)),
        Entry::Group { label, lines } => {
            out.push(format!("{}:", label));
            for line in lines {
                out.push(format!("  {}: {}", line.label, line.value));
            }
        }
        Entry::List { label, items } => {
            out.push(format!("{}:", label));
            for item in items {
                match item {
                    ListItem::Text(text) => out.push(format!("  - {}", text)),
                    ListItem::Fields(lines) if lines.is_empty() => {
                        out.push(format!("  - {}", PLACEHOLDER))
                    }
                    ListItem::Fields(lines) => {
                        for (i, line) in lines.iter().enumerate() {
                            let bullet = if i == 0 { "  - " } else { "    " };
                            out.push(format!("{}{}: {}", bullet, line.label, line.value));
                        }
                    }
                }
            }
        }
    }
}
