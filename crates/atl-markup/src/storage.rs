//! Markdown to Confluence storage format.
//!
//! Renders pulldown-cmark events to the XHTML storage format accepted by
//! the Confluence content API:
//! - `code` macro for fenced and indented code blocks
//! - `info`/`tip`/`note`/`warning` macros for GitHub alerts
//! - `ac:image` with `ri:url` or `ri:attachment` for images
//! - `ac:task-list` for task list items

use std::fmt::Write;

use pulldown_cmark::{BlockQuoteKind, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Parser options shared by every markdown conversion.
pub(crate) fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
}

/// Convert markdown text to storage format.
pub(crate) fn markdown_to_storage(markdown: &str) -> String {
    StorageRenderer::new().render(Parser::new_ext(markdown, parser_options()))
}

/// Renders pulldown-cmark events to storage format.
struct StorageRenderer {
    output: String,
    /// Open lists; `true` for a task list.
    list_stack: Vec<bool>,
    /// Open blockquotes; `Some` holds the macro name for alerts.
    quote_stack: Vec<Option<&'static str>>,
    code: Option<CodeBuffer>,
    /// Alt text collected for the image being rendered.
    image: Option<(String, String)>,
    in_table_head: bool,
    /// Task status of the current item, set by the task marker.
    task_status: Option<bool>,
}

struct CodeBuffer {
    language: Option<String>,
    content: String,
}

impl StorageRenderer {
    fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            list_stack: Vec::new(),
            quote_stack: Vec::new(),
            code: None,
            image: None,
            in_table_head: false,
            task_status: None,
        }
    }

    fn render<'a, I>(mut self, events: I) -> String
    where
        I: Iterator<Item = Event<'a>>,
    {
        let events: Vec<Event<'a>> = events.collect();
        for (index, event) in events.iter().enumerate() {
            if let Event::Start(Tag::List(None)) = event
                && is_task_list(&events[index + 1..])
            {
                self.list_stack.push(true);
                self.output.push_str("<ac:task-list>");
                continue;
            }
            self.process_event(event.clone());
        }
        self.output
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                write!(self.output, "<code>{}</code>", escape_xml(&code)).unwrap();
            }
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(&html),
            Event::SoftBreak => self.text("\n"),
            Event::HardBreak => self.output.push_str("<br />"),
            Event::Rule => self.output.push_str("<hr />"),
            Event::TaskListMarker(checked) => {
                if self.list_stack.last() == Some(&true) {
                    self.task_status = Some(checked);
                    write!(
                        self.output,
                        "<ac:task-status>{}</ac:task-status><ac:task-body>",
                        if checked { "complete" } else { "incomplete" }
                    )
                    .unwrap();
                } else {
                    self.output.push_str(if checked { "[x] " } else { "[ ] " });
                }
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    #[allow(clippy::too_many_lines)]
    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if !self.in_task() {
                    self.output.push_str("<p>");
                }
            }
            Tag::Heading { level, .. } => {
                write!(self.output, "<h{}>", heading_level_to_num(level)).unwrap();
            }
            Tag::BlockQuote(kind) => {
                let macro_name = kind.map(alert_macro);
                self.quote_stack.push(macro_name);
                match macro_name {
                    Some(name) => write!(
                        self.output,
                        r#"<ac:structured-macro ac:name="{name}" ac:schema-version="1"><ac:rich-text-body>"#
                    )
                    .unwrap(),
                    None => self.output.push_str("<blockquote>"),
                }
            }
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeBuffer {
                    language,
                    content: String::new(),
                });
            }
            Tag::List(start) => {
                self.list_stack.push(false);
                match start {
                    Some(1) => self.output.push_str("<ol>"),
                    Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                    None => self.output.push_str("<ul>"),
                }
            }
            Tag::Item => {
                if self.list_stack.last() == Some(&true) {
                    self.output.push_str("<ac:task>");
                } else {
                    self.output.push_str("<li>");
                }
            }
            Tag::Table(_) => self.output.push_str("<table><tbody>"),
            Tag::TableHead => {
                self.in_table_head = true;
                self.output.push_str("<tr>");
            }
            Tag::TableRow => self.output.push_str("<tr>"),
            Tag::TableCell => {
                self.output
                    .push_str(if self.in_table_head { "<th>" } else { "<td>" });
            }
            Tag::Emphasis => self.output.push_str("<em>"),
            Tag::Strong => self.output.push_str("<strong>"),
            Tag::Strikethrough => self.output.push_str("<s>"),
            Tag::Superscript => self.output.push_str("<sup>"),
            Tag::Subscript => self.output.push_str("<sub>"),
            Tag::Link { dest_url, .. } => {
                write!(self.output, r#"<a href="{}">"#, escape_xml(&dest_url)).unwrap();
            }
            Tag::Image { dest_url, .. } => {
                self.image = Some((dest_url.to_string(), String::new()));
            }
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if !self.in_task() {
                    self.output.push_str("</p>");
                }
            }
            TagEnd::Heading(level) => {
                write!(self.output, "</h{}>", heading_level_to_num(level)).unwrap();
            }
            TagEnd::BlockQuote(_) => match self.quote_stack.pop().flatten() {
                Some(_) => self
                    .output
                    .push_str("</ac:rich-text-body></ac:structured-macro>"),
                None => self.output.push_str("</blockquote>"),
            },
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    code_macro(code.language.as_deref(), &code.content, &mut self.output);
                }
            }
            TagEnd::List(ordered) => {
                let task_list = self.list_stack.pop() == Some(true);
                self.output.push_str(if task_list {
                    "</ac:task-list>"
                } else if ordered {
                    "</ol>"
                } else {
                    "</ul>"
                });
            }
            TagEnd::Item => {
                if self.list_stack.last() == Some(&true) {
                    if self.task_status.take().is_some() {
                        self.output.push_str("</ac:task-body>");
                    }
                    self.output.push_str("</ac:task>");
                } else {
                    self.output.push_str("</li>");
                }
            }
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.output.push_str("</tr>");
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output
                    .push_str(if self.in_table_head { "</th>" } else { "</td>" });
            }
            TagEnd::Emphasis => self.output.push_str("</em>"),
            TagEnd::Strong => self.output.push_str("</strong>"),
            TagEnd::Strikethrough => self.output.push_str("</s>"),
            TagEnd::Superscript => self.output.push_str("</sup>"),
            TagEnd::Subscript => self.output.push_str("</sub>"),
            TagEnd::Link => self.output.push_str("</a>"),
            TagEnd::Image => {
                if let Some((src, alt)) = self.image.take() {
                    image(&src, &alt, &mut self.output);
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = self.code.as_mut() {
            code.content.push_str(text);
        } else if let Some((_, alt)) = self.image.as_mut() {
            alt.push_str(text);
        } else {
            self.output.push_str(&escape_xml(text));
        }
    }

    /// Paragraph tags are not allowed directly inside `ac:task-body`.
    fn in_task(&self) -> bool {
        self.list_stack.last() == Some(&true)
    }
}

/// Whether the list starting before `rest` has a task marker as its first item content.
fn is_task_list(rest: &[Event<'_>]) -> bool {
    let mut iter = rest.iter();
    matches!(iter.next(), Some(Event::Start(Tag::Item)))
        && match iter.next() {
            Some(Event::TaskListMarker(_)) => true,
            Some(Event::Start(Tag::Paragraph)) => {
                matches!(iter.next(), Some(Event::TaskListMarker(_)))
            }
            _ => false,
        }
}

fn alert_macro(kind: BlockQuoteKind) -> &'static str {
    match kind {
        BlockQuoteKind::Note => "info",
        BlockQuoteKind::Tip => "tip",
        BlockQuoteKind::Important => "note",
        BlockQuoteKind::Warning | BlockQuoteKind::Caution => "warning",
    }
}

fn code_macro(language: Option<&str>, content: &str, out: &mut String) {
    out.push_str(r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#);
    if let Some(language) = language {
        write!(
            out,
            r#"<ac:parameter ac:name="language">{}</ac:parameter>"#,
            escape_xml(language)
        )
        .unwrap();
    }
    // A literal `]]>` would close the CDATA section early
    let content = content
        .trim_end_matches('\n')
        .replace("]]>", "]]]]><![CDATA[>");
    write!(
        out,
        "<ac:plain-text-body><![CDATA[{content}]]></ac:plain-text-body></ac:structured-macro>"
    )
    .unwrap();
}

fn image(src: &str, alt: &str, out: &mut String) {
    out.push_str("<ac:image");
    if !alt.is_empty() {
        write!(out, r#" ac:alt="{}""#, escape_xml(alt)).unwrap();
    }
    out.push('>');
    if src.starts_with("http://") || src.starts_with("https://") {
        write!(out, r#"<ri:url ri:value="{}" />"#, escape_xml(src)).unwrap();
    } else {
        // Relative paths are treated as page attachments
        let filename = src.rsplit('/').next().unwrap_or(src);
        write!(out, r#"<ri:attachment ri:filename="{}" />"#, escape_xml(filename)).unwrap();
    }
    out.push_str("</ac:image>");
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_paragraph() {
        assert_eq!(markdown_to_storage("Hello, world!"), "<p>Hello, world!</p>");
    }

    #[test]
    fn test_heading_and_inline_styles() {
        assert_eq!(
            markdown_to_storage("## Title\n\n**bold** *em* ~~gone~~ `x<y`"),
            "<h2>Title</h2><p><strong>bold</strong> <em>em</em> <s>gone</s> <code>x&lt;y</code></p>"
        );
    }

    #[test]
    fn test_code_block() {
        let result = markdown_to_storage("```python\nprint('hello')\n```");
        assert_eq!(
            result,
            r#"<ac:structured-macro ac:name="code" ac:schema-version="1"><ac:parameter ac:name="language">python</ac:parameter><ac:plain-text-body><![CDATA[print('hello')]]></ac:plain-text-body></ac:structured-macro>"#
        );
    }

    #[test]
    fn test_code_block_with_cdata_terminator() {
        let result = markdown_to_storage("```\na]]>b\n```");
        assert!(result.contains("<![CDATA[a]]]]><![CDATA[>b]]>"));
        assert!(!result.contains(r#"ac:name="language""#));
    }

    #[test]
    fn test_plain_blockquote() {
        assert_eq!(
            markdown_to_storage("> quoted"),
            "<blockquote><p>quoted</p></blockquote>"
        );
    }

    #[test]
    fn test_alert_blockquote() {
        let result = markdown_to_storage("> [!WARNING]\n> Careful");
        assert!(result.starts_with(r#"<ac:structured-macro ac:name="warning""#));
        assert!(result.contains("<p>Careful</p>"));
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            markdown_to_storage("- a\n- b"),
            "<ul><li>a</li><li>b</li></ul>"
        );
        assert_eq!(
            markdown_to_storage("3. c"),
            r#"<ol start="3"><li>c</li></ol>"#
        );
    }

    #[test]
    fn test_task_list() {
        assert_eq!(
            markdown_to_storage("- [x] done\n- [ ] todo"),
            "<ac:task-list><ac:task><ac:task-status>complete</ac:task-status><ac:task-body>done</ac:task-body></ac:task><ac:task><ac:task-status>incomplete</ac:task-status><ac:task-body>todo</ac:task-body></ac:task></ac:task-list>"
        );
    }

    #[test]
    fn test_table() {
        assert_eq!(
            markdown_to_storage("| A | B |\n|---|---|\n| 1 | 2 |"),
            "<table><tbody><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></tbody></table>"
        );
    }

    #[test]
    fn test_link_escaped() {
        assert_eq!(
            markdown_to_storage("[docs](https://example.com/?a=1&b=2)"),
            r#"<p><a href="https://example.com/?a=1&amp;b=2">docs</a></p>"#
        );
    }

    #[test]
    fn test_images() {
        assert_eq!(
            markdown_to_storage("![diagram](./img/arch.png)"),
            r#"<p><ac:image ac:alt="diagram"><ri:attachment ri:filename="arch.png" /></ac:image></p>"#
        );
        assert!(
            markdown_to_storage("![](https://example.com/a.png)")
                .contains(r#"<ri:url ri:value="https://example.com/a.png" />"#)
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(markdown_to_storage(""), "");
    }
}
