//! 説明文マークアップの許可リストパーサー
//!
//! Step2はHTML断片を返すが、そのまま挿入せず、許可されたタグ
//! （リスト・強調・下線・段落・改行）だけの木構造に変換してから描画する。
//! 属性はすべて破棄する。script/style 等は中身ごと捨てる。

/// 許可タグ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Ol,
    Ul,
    Li,
    Strong,
    B,
    Em,
    I,
    U,
    P,
    Br,
}

impl Tag {
    pub fn from_name(name: &str) -> Option<Self> {
        let tag = match name {
            "ol" => Tag::Ol,
            "ul" => Tag::Ul,
            "li" => Tag::Li,
            "strong" => Tag::Strong,
            "b" => Tag::B,
            "em" => Tag::Em,
            "i" => Tag::I,
            "u" => Tag::U,
            "p" => Tag::P,
            "br" => Tag::Br,
            _ => return None,
        };
        Some(tag)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tag::Ol => "ol",
            Tag::Ul => "ul",
            Tag::Li => "li",
            Tag::Strong => "strong",
            Tag::B => "b",
            Tag::Em => "em",
            Tag::I => "i",
            Tag::U => "u",
            Tag::P => "p",
            Tag::Br => "br",
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Tag::Br)
    }
}

/// 中身ごと破棄するタグ
const DROPPED_CONTENT_TAGS: &[&str] = &["script", "style", "head", "title", "iframe", "object"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element { tag: Tag, children: Vec<MarkupNode> },
    Text(String),
}

/// 許可リスト適用済みの説明文
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Markup {
    nodes: Vec<MarkupNode>,
}

impl Markup {
    /// HTML断片をパースする。失敗はしない（解釈できない部分は捨てるかテキスト扱い）
    pub fn parse(html: &str) -> Self {
        Parser::new(strip_code_fence(html)).run()
    }

    pub fn nodes(&self) -> &[MarkupNode] {
        &self.nodes
    }

    /// 表示可能なテキストを含まない
    pub fn is_empty(&self) -> bool {
        fn has_text(nodes: &[MarkupNode]) -> bool {
            nodes.iter().any(|n| match n {
                MarkupNode::Text(t) => !t.trim().is_empty(),
                MarkupNode::Element { children, .. } => has_text(children),
            })
        }
        !has_text(&self.nodes)
    }

    /// 許可タグのみでHTMLを再生成（テキストはエスケープ済み）
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_html(&self.nodes, &mut out);
        out
    }

    /// 端末表示用のプレーンテキスト（番号付き/箇条書き）
    pub fn to_text(&self) -> String {
        let mut writer = TextWriter::default();
        writer.write_nodes(&self.nodes);
        writer.flush();
        writer.lines.join("\n")
    }
}

/// ```html ... ``` の囲みを外す
fn strip_code_fence(input: &str) -> &str {
    let mut s = input.trim();
    if s.starts_with("```") {
        s = match s.find('\n') {
            Some(pos) => &s[pos + 1..],
            None => s.trim_start_matches('`'),
        };
    }
    s.trim_end().trim_end_matches("```").trim()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    root: Vec<MarkupNode>,
    stack: Vec<(Tag, Vec<MarkupNode>)>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            root: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn run(mut self) -> Markup {
        while self.pos < self.input.len() {
            let rest = &self.input[self.pos..];

            if let Some(after) = rest.strip_prefix("<!--") {
                match after.find("-->") {
                    Some(end) => self.pos += 4 + end + 3,
                    None => self.pos = self.input.len(),
                }
                continue;
            }

            if rest.starts_with('<') && starts_tag(&rest[1..]) {
                match rest.find('>') {
                    Some(end) => {
                        self.pos += end + 1;
                        self.handle_tag(&rest[1..end]);
                    }
                    None => {
                        // 閉じていないタグは捨てる
                        self.pos = self.input.len();
                    }
                }
                continue;
            }

            // 次のタグ開始までをテキストとして扱う
            let first = rest.chars().next().map_or(1, char::len_utf8);
            let text_end = rest[first..]
                .find('<')
                .map(|i| i + first)
                .unwrap_or(rest.len());
            self.push_text(&decode_entities(&rest[..text_end]));
            self.pos += text_end;
        }

        while let Some((tag, children)) = self.stack.pop() {
            self.push_node(MarkupNode::Element { tag, children });
        }

        Markup { nodes: self.root }
    }

    fn handle_tag(&mut self, raw: &str) {
        if raw.starts_with('!') || raw.starts_with('?') {
            return;
        }

        if let Some(closing) = raw.strip_prefix('/') {
            if let Some(tag) = Tag::from_name(&tag_name(closing)) {
                self.close(tag);
            }
            return;
        }

        let name = tag_name(raw);
        if DROPPED_CONTENT_TAGS.contains(&name.as_str()) {
            self.skip_until_close(&name);
            return;
        }

        let Some(tag) = Tag::from_name(&name) else {
            return;
        };

        if tag == Tag::Li && self.has_open_item() {
            self.close(Tag::Li);
        }

        if tag.is_void() || raw.trim_end().ends_with('/') {
            self.push_node(MarkupNode::Element {
                tag,
                children: Vec::new(),
            });
        } else {
            self.stack.push((tag, Vec::new()));
        }
    }

    /// 最も内側のリスト内で <li> が開いたままか
    fn has_open_item(&self) -> bool {
        self.stack
            .iter()
            .rev()
            .map(|(tag, _)| *tag)
            .find(|tag| matches!(tag, Tag::Li | Tag::Ol | Tag::Ul))
            == Some(Tag::Li)
    }

    fn skip_until_close(&mut self, name: &str) {
        let needle = format!("</{}", name);
        let rest = self.input[self.pos..].to_ascii_lowercase();
        match rest.find(&needle) {
            Some(start) => {
                let after = start + needle.len();
                self.pos += match rest[after..].find('>') {
                    Some(end) => after + end + 1,
                    None => rest.len(),
                };
            }
            None => self.pos = self.input.len(),
        }
    }

    fn close(&mut self, tag: Tag) {
        if !self.stack.iter().any(|(open, _)| *open == tag) {
            return;
        }
        while let Some((open, children)) = self.stack.pop() {
            self.push_node(MarkupNode::Element {
                tag: open,
                children,
            });
            if open == tag {
                break;
            }
        }
    }

    fn siblings(&mut self) -> &mut Vec<MarkupNode> {
        match self.stack.last_mut() {
            Some((_, children)) => children,
            None => &mut self.root,
        }
    }

    fn push_node(&mut self, node: MarkupNode) {
        self.siblings().push(node);
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let siblings = self.siblings();
        if let Some(MarkupNode::Text(prev)) = siblings.last_mut() {
            prev.push_str(text);
        } else {
            siblings.push(MarkupNode::Text(text.to_string()));
        }
    }
}

/// `<` の直後がタグらしいか（"a < 5" のような本文はテキスト扱い）
fn starts_tag(after_lt: &str) -> bool {
    after_lt
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

fn tag_name(raw: &str) -> String {
    raw.trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// 代表的な文字参照をデコード
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

fn escape_html(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

fn write_html(nodes: &[MarkupNode], out: &mut String) {
    for node in nodes {
        match node {
            MarkupNode::Text(text) => escape_html(text, out),
            MarkupNode::Element { tag, children } => {
                out.push('<');
                out.push_str(tag.name());
                out.push('>');
                if !tag.is_void() {
                    write_html(children, out);
                    out.push_str("</");
                    out.push_str(tag.name());
                    out.push('>');
                }
            }
        }
    }
}

#[derive(Default)]
struct TextWriter {
    lines: Vec<String>,
    current: String,
    indent: usize,
    list_depth: usize,
}

impl TextWriter {
    fn flush(&mut self) {
        let line = self.current.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            self.lines.push(format!("{}{}", "   ".repeat(self.indent), line));
        }
        self.current.clear();
    }

    fn write_nodes(&mut self, nodes: &[MarkupNode]) {
        for node in nodes {
            self.write_node(node);
        }
    }

    fn write_node(&mut self, node: &MarkupNode) {
        let (tag, children) = match node {
            MarkupNode::Text(text) => {
                self.current.push_str(text);
                return;
            }
            MarkupNode::Element { tag, children } => (tag, children),
        };

        match tag {
            Tag::Br => self.flush(),
            Tag::P | Tag::Li => {
                self.flush();
                self.write_nodes(children);
                self.flush();
            }
            Tag::Ol | Tag::Ul => {
                self.flush();
                let saved_indent = self.indent;
                let item_indent = self.list_depth;
                self.list_depth += 1;

                let mut number = 0;
                for child in children {
                    match child {
                        MarkupNode::Element {
                            tag: Tag::Li,
                            children: item,
                        } => {
                            number += 1;
                            self.indent = item_indent;
                            self.current = if *tag == Tag::Ol {
                                format!("{}. ", number)
                            } else {
                                "- ".to_string()
                            };
                            self.write_nodes(item);
                            self.indent = item_indent;
                            self.flush();
                        }
                        MarkupNode::Text(text) if text.trim().is_empty() => {}
                        other => {
                            self.indent = item_indent;
                            self.write_node(other);
                            self.flush();
                        }
                    }
                }

                self.list_depth -= 1;
                self.indent = saved_indent;
            }
            Tag::Strong | Tag::B | Tag::Em | Tag::I | Tag::U => self.write_nodes(children),
        }
    }
}
