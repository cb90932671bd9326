//! Jira wiki markup.
//!
//! [`markdown_to_jira`] renders pulldown-cmark events to wiki markup for
//! comment and description bodies. [`jira_to_markdown`] goes the other way
//! for text read back from the API, with regexes over the common subset:
//! headings, emphasis, lists, tables, links, mentions, quotes and code.

use std::fmt::Write;
use std::sync::LazyLock;

use pulldown_cmark::{BlockQuoteKind, CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};
use regex::{Captures, Regex};

use crate::storage::parser_options;

/// Convert markdown to Jira wiki markup.
pub(crate) fn markdown_to_jira(markdown: &str) -> String {
    JiraRenderer::default().render(Parser::new_ext(markdown, parser_options()))
}

#[derive(Default)]
struct JiraRenderer {
    output: String,
    /// Marker character per open list: `*` bullet, `#` numbered.
    list_stack: Vec<char>,
    /// Open links: destination and output offset of the opening bracket.
    link_stack: Vec<(String, usize)>,
    /// Open blockquotes: panel title for alerts and output offset of the opening macro.
    quote_stack: Vec<(Option<&'static str>, usize)>,
    code: Option<(Option<String>, String)>,
    image: Option<(String, String)>,
    in_table_head: bool,
}

impl JiraRenderer {
    fn render<'a, I>(mut self, events: I) -> String
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }
        self.output.trim().to_owned()
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) | Event::InlineMath(code) => {
                write!(self.output, "{{{{{code}}}}}").unwrap();
            }
            Event::DisplayMath(math) => {
                self.start_block();
                write!(self.output, "{{noformat}}\n{math}\n{{noformat}}").unwrap();
                self.end_block();
            }
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(&html),
            Event::SoftBreak => self.text("\n"),
            Event::HardBreak => self.output.push_str("\\\\\n"),
            Event::Rule => {
                self.start_block();
                self.output.push_str("----");
                self.end_block();
            }
            Event::TaskListMarker(checked) => {
                self.output.push_str(if checked { "[x] " } else { "[ ] " });
            }
            Event::FootnoteReference(name) => write!(self.output, "[{name}]").unwrap(),
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.start_block();
                write!(self.output, "h{}. ", heading_level_to_num(level)).unwrap();
            }
            Tag::BlockQuote(kind) => {
                self.start_block();
                let title = kind.map(alert_title);
                self.quote_stack.push((title, self.output.len()));
                match title {
                    Some(title) => writeln!(self.output, "{{panel:title={title}}}").unwrap(),
                    None => self.output.push_str("{quote}\n"),
                }
            }
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::List(start) => {
                if self.list_stack.is_empty() {
                    self.start_block();
                } else {
                    self.ensure_newline();
                }
                self.list_stack.push(if start.is_some() { '#' } else { '*' });
            }
            Tag::Item => {
                self.ensure_newline();
                let markers: String = self.list_stack.iter().collect();
                write!(self.output, "{markers} ").unwrap();
            }
            Tag::Table(_) => self.start_block(),
            Tag::TableHead => self.in_table_head = true,
            Tag::TableCell => {
                self.output
                    .push_str(if self.in_table_head { "||" } else { "|" });
            }
            Tag::Emphasis => self.output.push('_'),
            Tag::Strong => self.output.push('*'),
            Tag::Strikethrough => self.output.push('-'),
            Tag::Superscript => self.output.push('^'),
            Tag::Subscript => self.output.push('~'),
            Tag::Link { dest_url, .. } => {
                self.link_stack.push((dest_url.to_string(), self.output.len()));
                self.output.push('[');
            }
            Tag::Image { dest_url, .. } => {
                self.image = Some((dest_url.to_string(), String::new()));
            }
            Tag::DefinitionListTitle => {
                self.ensure_newline();
                self.output.push('*');
            }
            Tag::Paragraph
            | Tag::TableRow
            | Tag::DefinitionList
            | Tag::DefinitionListDefinition
            | Tag::FootnoteDefinition(_)
            | Tag::HtmlBlock
            | Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Table => self.end_block(),
            TagEnd::BlockQuote(_) => {
                let Some((title, start)) = self.quote_stack.pop() else {
                    return;
                };
                self.trim_trailing_newlines();
                let body_start = self.output[start..].find('\n').map_or(start, |i| start + i + 1);
                let body = &self.output[body_start..];
                if title.is_none() && !body.is_empty() && !body.contains('\n') {
                    // Single-line quotes use the short form
                    let line = format!("bq. {body}");
                    self.output.truncate(start);
                    self.output.push_str(&line);
                } else {
                    let closing = if title.is_some() { "{panel}" } else { "{quote}" };
                    write!(self.output, "\n{closing}").unwrap();
                }
                self.end_block();
            }
            TagEnd::CodeBlock => {
                if let Some((language, content)) = self.code.take() {
                    self.start_block();
                    match language {
                        Some(language) => write!(self.output, "{{code:{language}}}").unwrap(),
                        None => self.output.push_str("{code}"),
                    }
                    write!(self.output, "\n{}\n{{code}}", content.trim_end_matches('\n')).unwrap();
                    self.end_block();
                }
            }
            TagEnd::List(_) => {
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.end_block();
                }
            }
            TagEnd::Item => self.ensure_newline(),
            TagEnd::TableHead => {
                self.output.push_str("||\n");
                self.in_table_head = false;
            }
            TagEnd::TableRow => self.output.push_str("|\n"),
            TagEnd::Emphasis => self.output.push('_'),
            TagEnd::Strong => self.output.push('*'),
            TagEnd::Strikethrough => self.output.push('-'),
            TagEnd::Superscript => self.output.push('^'),
            TagEnd::Subscript => self.output.push('~'),
            TagEnd::Link => {
                if let Some((url, start)) = self.link_stack.pop() {
                    let text = &self.output[start + 1..];
                    if text.is_empty() || text == url {
                        self.output.truncate(start);
                        write!(self.output, "[{url}]").unwrap();
                    } else {
                        write!(self.output, "|{url}]").unwrap();
                    }
                }
            }
            TagEnd::Image => {
                if let Some((src, alt)) = self.image.take() {
                    if alt.is_empty() {
                        write!(self.output, "!{src}!").unwrap();
                    } else {
                        write!(self.output, "!{src}|alt={alt}!").unwrap();
                    }
                }
            }
            TagEnd::DefinitionListTitle => {
                self.output.push('*');
                self.ensure_newline();
            }
            TagEnd::DefinitionList => self.end_block(),
            TagEnd::DefinitionListDefinition => self.ensure_newline(),
            TagEnd::TableCell
            | TagEnd::FootnoteDefinition
            | TagEnd::HtmlBlock
            | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some((_, content)) = self.code.as_mut() {
            content.push_str(text);
        } else if let Some((_, alt)) = self.image.as_mut() {
            alt.push_str(text);
        } else {
            self.output.push_str(text);
        }
    }

    fn in_list(&self) -> bool {
        !self.list_stack.is_empty()
    }

    fn start_block(&mut self) {
        if self.in_list() {
            self.ensure_newline();
        }
    }

    /// Close a block: a newline inside lists, a blank line elsewhere.
    fn end_block(&mut self) {
        if self.in_list() {
            self.ensure_newline();
            return;
        }
        self.trim_trailing_newlines();
        if !self.output.is_empty() {
            self.output.push_str("\n\n");
        }
    }

    fn ensure_newline(&mut self) {
        if !self.output.is_empty() && !self.output.ends_with('\n') {
            self.output.push('\n');
        }
    }

    fn trim_trailing_newlines(&mut self) {
        let trimmed = self.output.trim_end_matches('\n').len();
        self.output.truncate(trimmed);
    }
}

fn alert_title(kind: BlockQuoteKind) -> &'static str {
    match kind {
        BlockQuoteKind::Note => "Note",
        BlockQuoteKind::Tip => "Tip",
        BlockQuoteKind::Important => "Important",
        BlockQuoteKind::Warning => "Warning",
        BlockQuoteKind::Caution => "Caution",
    }
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

macro_rules! regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($pattern).expect(concat!("invalid regex ", stringify!($name))));
    };
}

regex!(CODE_BLOCK, r"(?s)\{code(?::([^}]*))?\}\n?(.*?)\n?\{code\}");
regex!(NOFORMAT_BLOCK, r"(?s)\{noformat(?::[^}]*)?\}\n?(.*?)\n?\{noformat\}");
regex!(MONOSPACE, r"\{\{(.+?)\}\}");
regex!(QUOTE_BLOCK, r"(?s)\{quote\}\n?(.*?)\n?\{quote\}");
regex!(PANEL_BLOCK, r"(?s)\{panel(?::[^}]*)?\}\n?(.*?)\n?\{panel\}");
regex!(COLOR_SPAN, r"(?s)\{color(?::[^}]*)?\}(.*?)\{color\}");
regex!(HEADING, r"^h([1-6])\.\s+(.*)$");
regex!(BLOCKQUOTE_LINE, r"^bq\.\s+(.*)$");
regex!(RULE, r"^-{4,}\s*$");
regex!(LIST_ITEM, r"^\s*([*#-]+)\s+(.*)$");
regex!(ACCOUNT_MENTION, r"\[~accountid:([^\]]+)\]");
regex!(USER_MENTION, r"\[~([^\]]+)\]");
regex!(TITLED_LINK, r"\[([^|\]\n]+)\|([^\]\n]+)\]");
regex!(BARE_LINK, r"\[((?:https?|ftp)://[^\]|\s]+)\]");
regex!(IMAGE, r"!([^!\s|]+)(?:\|[^!\n]*)?!");
regex!(BOLD, r"(^|[^\w*])\*(\S(?:[^*\n]*\S)?)\*");
regex!(ITALIC, r"(^|[^\w_])_(\S(?:[^_\n]*\S)?)_");
regex!(STRIKE, r"(^|\s)-([^\s-](?:[^-\n]*[^\s-])?)-");
regex!(LINE_BREAK, r"\\\\\s*");

/// Protected fragments are swapped for placeholders while inline rules run.
const PLACEHOLDER: char = '\u{1}';

/// Convert Jira wiki markup to markdown.
pub(crate) fn jira_to_markdown(text: &str) -> String {
    let mut protected: Vec<String> = Vec::new();
    let mut protect = |fragment: String| {
        protected.push(fragment);
        format!("{PLACEHOLDER}{}{PLACEHOLDER}", protected.len() - 1)
    };

    let text = CODE_BLOCK.replace_all(text, |caps: &Captures| {
        let language = caps.get(1).map_or("", |m| code_language(m.as_str()));
        protect(format!("```{language}\n{}\n```", &caps[2]))
    });
    let text = NOFORMAT_BLOCK.replace_all(&text, |caps: &Captures| {
        protect(format!("```\n{}\n```", &caps[1]))
    });
    let text = MONOSPACE.replace_all(&text, |caps: &Captures| protect(format!("`{}`", &caps[1])));

    let text = QUOTE_BLOCK.replace_all(&text, |caps: &Captures| {
        caps[1]
            .lines()
            .map(|line| if line.is_empty() { ">".to_owned() } else { format!("> {line}") })
            .collect::<Vec<_>>()
            .join("\n")
    });
    let text = PANEL_BLOCK.replace_all(&text, "$1");
    let text = COLOR_SPAN.replace_all(&text, "$1");

    let text = text.lines().map(convert_line).collect::<Vec<_>>().join("\n");

    let text = ACCOUNT_MENTION.replace_all(&text, "@$1");
    let text = USER_MENTION.replace_all(&text, "@$1");
    let text = IMAGE.replace_all(&text, "![]($1)");
    let text = TITLED_LINK.replace_all(&text, "[$1]($2)");
    let text = BARE_LINK.replace_all(&text, "<$1>");
    let text = BOLD.replace_all(&text, "$1**$2**");
    let text = ITALIC.replace_all(&text, "$1*$2*");
    let text = STRIKE.replace_all(&text, "$1~~$2~~");
    let text = LINE_BREAK.replace_all(&text, "\n");

    restore(&text, &protected).trim().to_owned()
}

/// Convert block-level markup on a single line.
fn convert_line(line: &str) -> String {
    if let Some(caps) = HEADING.captures(line) {
        let level: usize = caps[1].parse().unwrap_or(1);
        return format!("{} {}", "#".repeat(level), &caps[2]);
    }
    if let Some(caps) = BLOCKQUOTE_LINE.captures(line) {
        return format!("> {}", &caps[1]);
    }
    if RULE.is_match(line) {
        return "---".to_owned();
    }
    if let Some(caps) = LIST_ITEM.captures(line) {
        let markers = &caps[1];
        let indent: usize = markers
            .chars()
            .take(markers.chars().count() - 1)
            .map(|marker| if marker == '#' { 3 } else { 2 })
            .sum();
        let bullet = if markers.ends_with('#') { "1." } else { "-" };
        return format!("{}{bullet} {}", " ".repeat(indent), &caps[2]);
    }
    if let Some(header) = line.trim().strip_prefix("||") {
        let cells: Vec<&str> = header
            .trim_end_matches("||")
            .split("||")
            .map(str::trim)
            .collect();
        return format!(
            "| {} |\n|{}",
            cells.join(" | "),
            " --- |".repeat(cells.len())
        );
    }
    if let Some(row) = line.trim().strip_prefix('|') {
        let cells: Vec<&str> = row.trim_end_matches('|').split('|').map(str::trim).collect();
        return format!("| {} |", cells.join(" | "));
    }
    line.to_owned()
}

/// Language of a `{code:...}` macro: a bare first parameter or `language=`.
fn code_language(params: &str) -> &str {
    params
        .split('|')
        .find_map(|param| match param.split_once('=') {
            Some(("language", value)) => Some(value.trim()),
            Some(_) => None,
            None => Some(param.trim()),
        })
        .unwrap_or("")
}

fn restore(text: &str, protected: &[String]) -> String {
    if protected.is_empty() {
        return text.to_owned();
    }
    let mut out = String::with_capacity(text.len());
    let mut parts = text.split(PLACEHOLDER);
    if let Some(first) = parts.next() {
        out.push_str(first);
    }
    // Odd parts are placeholder indices
    for (index, part) in parts.enumerate() {
        if index % 2 == 0
            && let Some(fragment) = part.parse::<usize>().ok().and_then(|i| protected.get(i))
        {
            out.push_str(fragment);
        } else {
            out.push_str(part);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_md_heading_and_emphasis() {
        assert_eq!(
            markdown_to_jira("# Title\n\nSome **bold** and *italic* ~~old~~ text"),
            "h1. Title\n\nSome *bold* and _italic_ -old- text"
        );
    }

    #[test]
    fn test_md_nested_bullets() {
        assert_eq!(markdown_to_jira("- a\n- b\n  - c"), "* a\n* b\n** c");
    }

    #[test]
    fn test_md_ordered_list() {
        assert_eq!(markdown_to_jira("1. one\n2. two"), "# one\n# two");
    }

    #[test]
    fn test_md_code_block() {
        assert_eq!(
            markdown_to_jira("```python\nprint(1)\n```"),
            "{code:python}\nprint(1)\n{code}"
        );
        assert_eq!(markdown_to_jira("    indented"), "{code}\nindented\n{code}");
    }

    #[test]
    fn test_md_inline_code() {
        assert_eq!(markdown_to_jira("run `make test` now"), "run {{make test}} now");
    }

    #[test]
    fn test_md_links() {
        assert_eq!(
            markdown_to_jira("[Docs](https://docs.example.com)"),
            "[Docs|https://docs.example.com]"
        );
        assert_eq!(
            markdown_to_jira("<https://docs.example.com>"),
            "[https://docs.example.com]"
        );
    }

    #[test]
    fn test_md_table() {
        assert_eq!(
            markdown_to_jira("| A | B |\n|---|---|\n| 1 | 2 |"),
            "||A||B||\n|1|2|"
        );
    }

    #[test]
    fn test_md_quote() {
        assert_eq!(markdown_to_jira("> wise words"), "bq. wise words");
        assert_eq!(
            markdown_to_jira("> first\n>\n> second"),
            "{quote}\nfirst\n\nsecond\n{quote}"
        );
    }

    #[test]
    fn test_md_alert_becomes_panel() {
        assert_eq!(
            markdown_to_jira("> [!TIP]\n> Use flags"),
            "{panel:title=Tip}\nUse flags\n{panel}"
        );
    }

    #[test]
    fn test_md_image() {
        assert_eq!(markdown_to_jira("![](shot.png)"), "!shot.png!");
    }

    #[test]
    fn test_md_plain_text_unchanged() {
        assert_eq!(markdown_to_jira("Just a comment"), "Just a comment");
    }

    #[test]
    fn test_jira_heading_and_inline() {
        assert_eq!(
            jira_to_markdown("h2. Heading\n*bold* and _it_ with {{co*de*}}"),
            "## Heading\n**bold** and *it* with `co*de*`"
        );
    }

    #[test]
    fn test_jira_mentions() {
        assert_eq!(
            jira_to_markdown("[~accountid:5b10ac8d] and [~jsmith] please check"),
            "@5b10ac8d and @jsmith please check"
        );
    }

    #[test]
    fn test_jira_links() {
        assert_eq!(
            jira_to_markdown("See [Docs|https://d.example.com] or [https://x.example.com]"),
            "See [Docs](https://d.example.com) or <https://x.example.com>"
        );
    }

    #[test]
    fn test_jira_code_block_untouched() {
        assert_eq!(
            jira_to_markdown("{code:java}\nint x = *y*;\n{code}"),
            "```java\nint x = *y*;\n```"
        );
        assert_eq!(
            jira_to_markdown("{code:title=A.java|language=java}\nA a;\n{code}"),
            "```java\nA a;\n```"
        );
    }

    #[test]
    fn test_jira_lists() {
        assert_eq!(jira_to_markdown("* a\n** b\n# c"), "- a\n  - b\n1. c");
    }

    #[test]
    fn test_jira_table() {
        assert_eq!(
            jira_to_markdown("||A||B||\n|1|2|"),
            "| A | B |\n| --- | --- |\n| 1 | 2 |"
        );
    }

    #[test]
    fn test_jira_quote() {
        assert_eq!(jira_to_markdown("{quote}\nwise\n{quote}"), "> wise");
        assert_eq!(jira_to_markdown("bq. short"), "> short");
    }

    #[test]
    fn test_jira_strikethrough_and_rule() {
        assert_eq!(jira_to_markdown("a -gone- b\n----"), "a ~~gone~~ b\n---");
    }

    #[test]
    fn test_jira_plain_text_unchanged() {
        assert_eq!(jira_to_markdown("This is a comment"), "This is a comment");
        assert_eq!(jira_to_markdown("well-known e-mail"), "well-known e-mail");
    }
}
