//! Confluence storage format to markdown.
//!
//! Walks the element tree produced by [`parse_storage`] and writes
//! CommonMark with GitHub extensions. Structured macros map back to their
//! markdown counterparts; unknown macros keep their rich-text body.

use std::fmt::Write;

use crate::error::MarkupError;
use crate::tree::{TreeNode, parse_storage};

/// Where page links resolve to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LinkContext<'a> {
    /// Confluence base URL, if page links should become absolute links.
    pub base_url: Option<&'a str>,
    /// Space of the page being converted.
    pub space_key: &'a str,
}

/// Convert a storage-format body to markdown.
///
/// # Errors
///
/// Returns [`MarkupError::XmlParse`] when the body is not well-formed.
pub(crate) fn storage_to_markdown(storage: &str, links: LinkContext<'_>) -> Result<String, MarkupError> {
    let tree = parse_storage(storage)?;
    let mut writer = MarkdownWriter::new(links);
    writer.contents(&tree);
    Ok(writer.finish())
}

struct MarkdownWriter<'a> {
    out: String,
    links: LinkContext<'a>,
    /// Blocks inside list items are separated by single newlines.
    in_list_item: bool,
}

impl<'a> MarkdownWriter<'a> {
    fn new(links: LinkContext<'a>) -> Self {
        Self {
            out: String::new(),
            links,
            in_list_item: false,
        }
    }

    fn finish(self) -> String {
        let mut result = String::with_capacity(self.out.len());
        let mut blank_run = 0;
        for line in self.out.lines() {
            let line = line.trim_end_matches(' ');
            if line.trim().is_empty() {
                blank_run += 1;
                if blank_run > 1 {
                    continue;
                }
                result.push('\n');
            } else {
                blank_run = 0;
                result.push_str(line);
                result.push('\n');
            }
        }
        result.trim().to_owned()
    }

    /// Render a nested fragment with a fresh writer.
    fn nested(&self, node: &TreeNode) -> String {
        let mut writer = MarkdownWriter::new(self.links);
        writer.contents(node);
        writer.finish()
    }

    fn nested_item(&self, node: &TreeNode) -> String {
        let mut writer = MarkdownWriter::new(self.links);
        writer.in_list_item = true;
        writer.contents(node);
        writer.finish()
    }

    fn contents(&mut self, node: &TreeNode) {
        self.text(&node.text);
        for child in &node.children {
            self.element(child);
            self.text(&child.tail);
        }
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let mut collapsed = String::with_capacity(text.len());
        let mut last_space = self.out.is_empty() || self.out.ends_with([' ', '\n']);
        for c in text.chars() {
            if c.is_whitespace() {
                if !last_space {
                    collapsed.push(' ');
                    last_space = true;
                }
            } else {
                collapsed.push(c);
                last_space = false;
            }
        }
        self.out.push_str(&collapsed);
    }

    /// Start a new block separated by a blank line.
    fn block_break(&mut self) {
        if self.in_list_item {
            self.line_break();
            return;
        }
        trim_trailing_spaces(&mut self.out);
        if self.out.is_empty() || self.out.ends_with("\n\n") {
            return;
        }
        self.out
            .push_str(if self.out.ends_with('\n') { "\n" } else { "\n\n" });
    }

    fn line_break(&mut self) {
        trim_trailing_spaces(&mut self.out);
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    #[allow(clippy::too_many_lines)]
    fn element(&mut self, node: &TreeNode) {
        match node.tag.as_str() {
            "p" | "div" | "section" => {
                self.block_break();
                self.contents(node);
                self.block_break();
            }
            tag @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
                let level = usize::from(tag.as_bytes()[1] - b'0');
                self.block_break();
                self.out.push_str(&"#".repeat(level));
                self.out.push(' ');
                self.contents(node);
                self.block_break();
            }
            "strong" | "b" => self.wrap_inline(node, "**"),
            "em" | "i" => self.wrap_inline(node, "*"),
            "s" | "del" | "strike" => self.wrap_inline(node, "~~"),
            "code" | "tt" => {
                let code = node.raw_text();
                if !code.is_empty() {
                    write!(self.out, "`{code}`").unwrap();
                }
            }
            "a" => {
                let text = self.nested(node);
                match node.attr("href").filter(|href| !href.is_empty()) {
                    Some(href) if text.is_empty() => write!(self.out, "<{href}>").unwrap(),
                    Some(href) => write!(self.out, "[{text}]({href})").unwrap(),
                    None => self.out.push_str(&text),
                }
            }
            "br" => self.line_break(),
            "hr" => {
                self.block_break();
                self.out.push_str("---");
                self.block_break();
            }
            "ul" | "ol" => self.list(node, node.tag == "ol"),
            "ac:task-list" => self.task_list(node),
            "blockquote" => {
                let inner = self.nested(node);
                self.quote(None, &inner);
            }
            "pre" => self.fenced_code(None, &node.raw_text()),
            "table" => self.table(node),
            "ac:structured-macro" => self.structured_macro(node),
            "ac:image" => self.image(node),
            "ac:link" => self.link(node),
            "ac:emoticon" => {
                if let Some(fallback) = node.attr("ac:emoji-fallback") {
                    self.out.push_str(fallback);
                }
            }
            "time" => {
                if let Some(datetime) = node.attr("datetime") {
                    self.out.push_str(datetime);
                }
            }
            "ac:parameter" | "ac:placeholder" | "script" | "style" => {}
            _ => self.contents(node),
        }
    }

    fn wrap_inline(&mut self, node: &TreeNode, marker: &str) {
        let inner = self.nested(node);
        if inner.is_empty() {
            return;
        }
        write!(self.out, "{marker}{inner}{marker}").unwrap();
    }

    fn list(&mut self, node: &TreeNode, ordered: bool) {
        let start = node
            .attr("start")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(1);
        self.begin_list();
        let items = node.children.iter().filter(|child| child.tag == "li");
        for (offset, item) in items.enumerate() {
            let marker = if ordered {
                format!("{}. ", start + offset)
            } else {
                "- ".to_owned()
            };
            self.list_item(&marker, item);
        }
        self.end_list();
    }

    fn task_list(&mut self, node: &TreeNode) {
        self.begin_list();
        for task in node.children.iter().filter(|child| child.tag == "ac:task") {
            let complete = task
                .child("ac:task-status")
                .is_some_and(|status| status.raw_text().trim() == "complete");
            let marker = if complete { "- [x] " } else { "- [ ] " };
            match task.child("ac:task-body") {
                Some(body) => self.list_item(marker, body),
                None => self.list_item(marker, &TreeNode::default()),
            }
        }
        self.end_list();
    }

    fn begin_list(&mut self) {
        if self.in_list_item {
            self.line_break();
        } else {
            self.block_break();
        }
    }

    fn end_list(&mut self) {
        if !self.in_list_item {
            self.block_break();
        }
    }

    /// Write one item; continuation lines are indented under the marker.
    fn list_item(&mut self, marker: &str, item: &TreeNode) {
        let body = self.nested_item(item);
        let indent = " ".repeat(marker.len());
        self.line_break();
        self.out.push_str(marker);
        for (index, line) in body.lines().enumerate() {
            if index > 0 {
                self.out.push('\n');
                if !line.is_empty() {
                    self.out.push_str(&indent);
                }
            }
            self.out.push_str(line);
        }
    }

    fn quote(&mut self, alert: Option<&str>, inner: &str) {
        self.block_break();
        if let Some(alert) = alert {
            writeln!(self.out, "> [!{alert}]").unwrap();
        }
        for (index, line) in inner.lines().enumerate() {
            if index > 0 {
                self.out.push('\n');
            }
            if line.is_empty() {
                self.out.push('>');
            } else {
                write!(self.out, "> {line}").unwrap();
            }
        }
        self.block_break();
    }

    fn fenced_code(&mut self, language: Option<&str>, code: &str) {
        self.block_break();
        let fence = if code.contains("```") { "````" } else { "```" };
        write!(self.out, "{fence}{}", language.unwrap_or_default()).unwrap();
        for line in code.trim_matches('\n').lines() {
            self.out.push('\n');
            self.out.push_str(line);
        }
        self.out.push('\n');
        self.out.push_str(fence);
        self.block_break();
    }

    fn structured_macro(&mut self, node: &TreeNode) {
        let name = node.attr("ac:name").unwrap_or_default();
        match name {
            "code" | "noformat" => {
                let language = node.macro_parameter("language");
                let body = node
                    .child("ac:plain-text-body")
                    .map(TreeNode::raw_text)
                    .unwrap_or_default();
                self.fenced_code(language.as_deref(), &body);
            }
            "info" | "tip" | "note" | "warning" => {
                let alert = match name {
                    "info" => "NOTE",
                    "tip" => "TIP",
                    "note" => "IMPORTANT",
                    _ => "WARNING",
                };
                let inner = node
                    .child("ac:rich-text-body")
                    .map(|body| self.nested(body))
                    .unwrap_or_default();
                self.quote(Some(alert), &inner);
            }
            _ => {
                if let Some(body) = node.child("ac:rich-text-body") {
                    if let Some(title) = node.macro_parameter("title") {
                        self.block_break();
                        write!(self.out, "**{}**", title.trim()).unwrap();
                        self.block_break();
                    }
                    self.contents(body);
                } else if let Some(body) = node.child("ac:plain-text-body") {
                    self.fenced_code(None, &body.raw_text());
                }
            }
        }
    }

    fn image(&mut self, node: &TreeNode) {
        let alt = node.attr("ac:alt").unwrap_or_default();
        let target = node
            .child("ri:attachment")
            .and_then(|attachment| attachment.attr("ri:filename"))
            .or_else(|| node.child("ri:url").and_then(|url| url.attr("ri:value")));
        if let Some(target) = target {
            write!(self.out, "![{alt}]({})", target.replace(' ', "%20")).unwrap();
        }
    }

    fn link(&mut self, node: &TreeNode) {
        let body = node
            .child("ac:plain-text-link-body")
            .map(TreeNode::raw_text)
            .or_else(|| node.child("ac:link-body").map(|body| self.nested(body)))
            .filter(|text| !text.trim().is_empty());

        if let Some(user) = node.child("ri:user") {
            let name = user_reference(user).unwrap_or("unknown");
            write!(self.out, "@{name}").unwrap();
        } else if let Some(page) = node.child("ri:page") {
            let title = page.attr("ri:content-title").unwrap_or_default();
            let text = body.unwrap_or_else(|| title.to_owned());
            let space = page.attr("ri:space-key").unwrap_or(self.links.space_key);
            match self.links.base_url {
                Some(base) if !title.is_empty() && !space.is_empty() => write!(
                    self.out,
                    "[{text}]({base}/display/{space}/{})",
                    title.replace(' ', "+")
                )
                .unwrap(),
                _ => self.out.push_str(&text),
            }
        } else if let Some(attachment) = node.child("ri:attachment") {
            let filename = attachment.attr("ri:filename").unwrap_or_default();
            let text = body.unwrap_or_else(|| filename.to_owned());
            write!(self.out, "[{text}]({})", filename.replace(' ', "%20")).unwrap();
        } else if let Some(url) = node.child("ri:url").and_then(|url| url.attr("ri:value")) {
            let text = body.unwrap_or_else(|| url.to_owned());
            write!(self.out, "[{text}]({url})").unwrap();
        } else if let Some(text) = body {
            self.out.push_str(&text);
        }
    }

    fn table(&mut self, node: &TreeNode) {
        let mut rows: Vec<Vec<String>> = Vec::new();
        collect_rows(node, &mut |row: &TreeNode| {
            let cells = row
                .children
                .iter()
                .filter(|cell| cell.tag == "th" || cell.tag == "td")
                .map(|cell| {
                    self.nested(cell)
                        .lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ")
                        .replace('|', "\\|")
                })
                .collect();
            rows.push(cells);
        });

        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return;
        }

        self.block_break();
        for (index, row) in rows.iter().enumerate() {
            self.out.push('|');
            for column in 0..columns {
                let cell = row.get(column).map_or("", String::as_str);
                write!(self.out, " {cell} |").unwrap();
            }
            self.out.push('\n');
            if index == 0 {
                self.out.push('|');
                self.out.push_str(&" --- |".repeat(columns));
                self.out.push('\n');
            }
        }
        self.block_break();
    }
}

/// Visit `tr` elements of a table, looking through `thead`/`tbody`/`tfoot`.
fn collect_rows(node: &TreeNode, visit: &mut impl FnMut(&TreeNode)) {
    for child in &node.children {
        match child.tag.as_str() {
            "tr" => visit(child),
            "thead" | "tbody" | "tfoot" => collect_rows(child, visit),
            _ => {}
        }
    }
}

/// Most readable identifier on an `ri:user` element.
pub(crate) fn user_reference(user: &TreeNode) -> Option<&str> {
    user.attr("ri:username")
        .or_else(|| user.attr("ri:account-id"))
        .or_else(|| user.attr("ri:userkey"))
}

fn trim_trailing_spaces(out: &mut String) {
    let trimmed = out.trim_end_matches(' ').len();
    out.truncate(trimmed);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const LINKS: LinkContext<'static> = LinkContext {
        base_url: Some("https://wiki.example.com"),
        space_key: "DOC",
    };

    fn convert(storage: &str) -> String {
        storage_to_markdown(storage, LINKS).unwrap()
    }

    #[test]
    fn test_paragraphs_and_headings() {
        assert_eq!(
            convert("<h1>Title</h1><p>First   line\nwrapped</p><p>Second</p>"),
            "# Title\n\nFirst line wrapped\n\nSecond"
        );
    }

    #[test]
    fn test_inline_styles() {
        assert_eq!(
            convert("<p><strong>bold</strong>, <em>em</em>, <s>old</s> and <code>a &lt; b</code></p>"),
            "**bold**, *em*, ~~old~~ and `a < b`"
        );
    }

    #[test]
    fn test_links() {
        assert_eq!(
            convert(r#"<p>See <a href="https://example.com">the site</a>.</p>"#),
            "See [the site](https://example.com)."
        );
    }

    #[test]
    fn test_unordered_list() {
        assert_eq!(convert("<ul><li>one</li><li>two</li></ul>"), "- one\n- two");
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(
            convert("<ol><li><p>first</p><ul><li>inner</li></ul></li><li>second</li></ol>"),
            "1. first\n   - inner\n2. second"
        );
    }

    #[test]
    fn test_task_list() {
        assert_eq!(
            convert(
                "<ac:task-list><ac:task><ac:task-status>complete</ac:task-status><ac:task-body>done</ac:task-body></ac:task><ac:task><ac:task-status>incomplete</ac:task-status><ac:task-body>todo</ac:task-body></ac:task></ac:task-list>"
            ),
            "- [x] done\n- [ ] todo"
        );
    }

    #[test]
    fn test_code_macro() {
        assert_eq!(
            convert(
                r#"<ac:structured-macro ac:name="code"><ac:parameter ac:name="language">rust</ac:parameter><ac:plain-text-body><![CDATA[fn main() {
    println!("<hi>");
}]]></ac:plain-text-body></ac:structured-macro>"#
            ),
            "```rust\nfn main() {\n    println!(\"<hi>\");\n}\n```"
        );
    }

    #[test]
    fn test_info_macro() {
        assert_eq!(
            convert(
                r#"<ac:structured-macro ac:name="info"><ac:rich-text-body><p>Heads up</p></ac:rich-text-body></ac:structured-macro>"#
            ),
            "> [!NOTE]\n> Heads up"
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(
            convert("<blockquote><p>one</p><p>two</p></blockquote>"),
            "> one\n>\n> two"
        );
    }

    #[test]
    fn test_table() {
        assert_eq!(
            convert(
                "<table><tbody><tr><th>Name</th><th>Value</th></tr><tr><td>a|b</td><td><p>1</p></td></tr></tbody></table>"
            ),
            "| Name | Value |\n| --- | --- |\n| a\\|b | 1 |"
        );
    }

    #[test]
    fn test_user_link() {
        assert_eq!(
            convert(r#"<p>Ping <ac:link><ri:user ri:account-id="5b10ac8d" /></ac:link></p>"#),
            "Ping @5b10ac8d"
        );
    }

    #[test]
    fn test_page_link_uses_default_space() {
        assert_eq!(
            convert(r#"<p><ac:link><ri:page ri:content-title="Release Notes" /></ac:link></p>"#),
            "[Release Notes](https://wiki.example.com/display/DOC/Release+Notes)"
        );
    }

    #[test]
    fn test_page_link_without_base_url() {
        let links = LinkContext {
            base_url: None,
            space_key: "DOC",
        };
        let markdown = storage_to_markdown(
            r#"<ac:link><ri:page ri:content-title="Home" /><ac:plain-text-link-body><![CDATA[Start]]></ac:plain-text-link-body></ac:link>"#,
            links,
        )
        .unwrap();
        assert_eq!(markdown, "Start");
    }

    #[test]
    fn test_image_attachment() {
        assert_eq!(
            convert(r#"<ac:image ac:alt="arch"><ri:attachment ri:filename="my diagram.png" /></ac:image>"#),
            "![arch](my%20diagram.png)"
        );
    }

    #[test]
    fn test_line_break_and_rule() {
        assert_eq!(convert("<p>a<br />b</p><hr /><p>c</p>"), "a\nb\n\n---\n\nc");
    }

    #[test]
    fn test_malformed_input_is_error() {
        assert!(storage_to_markdown("<p>unclosed", LINKS).is_err());
    }
}
