//! Markdown rendering with syntax highlighting

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;

/// Renders post bodies to HTML. Only used for full-post views.
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::from_config(&HighlightConfig::default())
    }

    pub fn from_config(config: &HighlightConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.theme.clone(),
            line_numbers: config.line_number,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        // Some(lang) while inside a code block
        let mut code_lang: Option<String> = None;
        let mut code = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code_lang = Some(match kind {
                        CodeBlockKind::Fenced(info) => fence_lang(&info),
                        CodeBlockKind::Indented => "text".to_string(),
                    });
                    code.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let lang = code_lang.take().unwrap_or_else(|| "text".to_string());
                    events.push(Event::Html(CowStr::from(self.highlight_code(&code, &lang))));
                }
                Event::Text(text) if code_lang.is_some() => code.push_str(&text),
                event => events.push(event),
            }
        }

        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let highlighted = self
            .theme()
            .and_then(|theme| {
                highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
            });

        match highlighted {
            Some(highlighted) if self.line_numbers => {
                with_line_numbers(&highlighted, code.lines().count(), lang)
            }
            Some(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                lang, highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang,
                html_escape(code)
            ),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Language token of a fence info string, reduced to characters that are
/// safe inside a class attribute
fn fence_lang(info: &str) -> String {
    let lang: String = info
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'))
        .collect();
    if lang.is_empty() {
        "text".to_string()
    } else {
        lang
    }
}

/// Wrap highlighted code in a two-column table with a line number gutter.
/// `lines` is the line count of the source, not of the highlighted HTML.
fn with_line_numbers(code: &str, lines: usize, lang: &str) -> String {
    let gutter = (1..=lines)
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        lang, gutter, code
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer
            .render("# Peak shaving\n\nCut the **peaks**.")
            .unwrap();
        assert!(html.contains("<h1>Peak shaving</h1>"));
        assert!(html.contains("<strong>peaks</strong>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains(r#"<figure class="highlight rust">"#));
        assert_eq!(html.matches(r#"class="line-number""#).count(), 1);
        assert!(html.contains("main"));

        let html = renderer
            .render("```python\nload = 10\npeak = 4\nprint(load - peak)\n```")
            .unwrap();
        assert_eq!(html.matches(r#"class="line-number""#).count(), 3);
        assert!(html.contains(r#"<span class="line-number">3</span>"#));
        assert!(!html.contains(r#"<span class="line-number">4</span>"#));
    }

    #[test]
    fn test_fence_info_cannot_inject_markup() {
        let renderer = MarkdownRenderer::new();
        let html = renderer
            .render("```\"><script>alert(1)</script>\nx\n```")
            .unwrap();
        assert!(!html.contains("<script>"));
        assert!(!html.contains(r#"class="highlight ""#));

        let plain = MarkdownRenderer::from_config(&HighlightConfig {
            line_number: false,
            ..Default::default()
        });
        let html = plain.render("```c++\" onclick=\"x\nint x;\n```").unwrap();
        assert!(html.contains(r#"<figure class="highlight c++">"#));
        assert!(!html.contains("onclick"));
    }

    #[test]
    fn test_fence_lang() {
        assert_eq!(fence_lang("rust"), "rust");
        assert_eq!(fence_lang("c++ title=main.cpp"), "c++");
        assert_eq!(fence_lang("objective-c"), "objective-c");
        assert_eq!(fence_lang("\"><script>"), "script");
        assert_eq!(fence_lang("\"><"), "text");
        assert_eq!(fence_lang(""), "text");
    }

    #[test]
    fn test_render_without_line_numbers() {
        let renderer = MarkdownRenderer::from_config(&HighlightConfig {
            line_number: false,
            ..Default::default()
        });
        let html = renderer.render("    indented code\n").unwrap();
        assert!(html.contains(r#"<figure class="highlight text">"#));
        assert!(!html.contains("line-number"));
    }

    #[test]
    fn test_render_table() {
        let renderer = MarkdownRenderer::new();
        let html = renderer
            .render("| kWh | cost |\n|-----|------|\n| 10 | 2 |\n")
            .unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>10</td>"));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<a href=\"x\">"), "&lt;a href=&quot;x&quot;&gt;");
    }
}
