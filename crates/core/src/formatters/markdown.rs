//! Rendered HTML to Markdown conversion.
//!
//! Conversion runs in three passes:
//!
//! 1. a streaming rewrite with `lol_html`, driven by a registry of
//!    [`RewriteRule`]s that handle platform-specific markup;
//! 2. the generic renderer (`htmd`) with ATX headings, backtick-fenced code
//!    blocks, and `-` bullets;
//! 3. a line pass that cleans heading lines and restores verbatim text that
//!    rules set aside during the rewrite.
//!
//! New rules can be registered with [`MarkupConverter::add_rule`] without
//! touching the renderer.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::LazyLock;

use lol_html::html_content::ContentType;
use lol_html::{ElementContentHandlers, HtmlRewriter, Selector, Settings, element, text};
use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::{MigrateError, Result};

/// A selector and the handlers `lol_html` runs for matching elements.
pub type RuleHandler = (Cow<'static, Selector>, ElementContentHandlers<'static>);

/// A rewrite applied to the HTML before generic rendering.
pub trait RewriteRule {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Builds fresh handlers for one conversion.
    fn handlers(&self, ctx: &RewriteContext) -> Vec<RuleHandler>;
}

const SLOT_PREFIX: &str = "VERBATIMSLOT";
const SLOT_SUFFIX: &str = "END";

/// Per-conversion state shared between rules and the final pass.
///
/// Text handed to [`RewriteContext::verbatim`] bypasses the renderer so it is
/// not subject to Markdown escaping.
#[derive(Debug, Clone, Default)]
pub struct RewriteContext {
    slots: Rc<RefCell<Vec<String>>>,
}

impl RewriteContext {
    /// Stores `text` and returns a paragraph of HTML holding its placeholder.
    pub fn verbatim(&self, text: String) -> String {
        let mut slots = self.slots.borrow_mut();
        slots.push(text);
        format!("<p>{}{}{}</p>", SLOT_PREFIX, slots.len() - 1, SLOT_SUFFIX)
    }

    fn restore(&self, mut markdown: String) -> String {
        for (index, text) in self.slots.borrow().iter().enumerate() {
            markdown = markdown.replace(&format!("{}{}{}", SLOT_PREFIX, index, SLOT_SUFFIX), text);
        }
        markdown
    }
}

/// Drops the permalink icons the platform injects into headings.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderAnchorRule;

impl RewriteRule for HeaderAnchorRule {
    fn name(&self) -> &'static str {
        "header-anchor"
    }

    fn handlers(&self, _ctx: &RewriteContext) -> Vec<RuleHandler> {
        vec![element!(r#"a[class*="header-anchor-link"]"#, |el| {
            el.remove();
            Ok(())
        })]
    }
}

/// Replaces embedded widgets with the URL they embed.
///
/// The platform renders link cards, tweets, and similar embeds as a
/// `span.zenn-embedded` wrapping an iframe whose `data-content` attribute
/// holds the percent-encoded target URL. The span becomes that URL on its own
/// line, or nothing when no such iframe is present.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedWidgetRule;

const EMBED_CONTAINER: &str = r#"span[class*="zenn-embedded"]"#;
const EMBED_DESCENDANT: &str = r#"span[class*="zenn-embedded"] *"#;

impl RewriteRule for EmbeddedWidgetRule {
    fn name(&self) -> &'static str {
        "embedded-widget"
    }

    fn handlers(&self, ctx: &RewriteContext) -> Vec<RuleHandler> {
        let iframe_seen = Rc::new(Cell::new(false));
        let reset = Rc::clone(&iframe_seen);
        let ctx = ctx.clone();

        vec![
            element!(EMBED_CONTAINER, move |el| {
                reset.set(false);
                el.remove_and_keep_content();
                Ok(())
            }),
            element!(EMBED_DESCENDANT, move |el| {
                if el.tag_name() != "iframe" || iframe_seen.get() {
                    el.remove_and_keep_content();
                    return Ok(());
                }

                iframe_seen.set(true);
                match el.get_attribute("data-content") {
                    Some(raw) => {
                        let url = decode_component(&raw);
                        el.replace(&ctx.verbatim(url), ContentType::Html);
                    }
                    None => el.remove(),
                }
                Ok(())
            }),
            text!(EMBED_CONTAINER, |t| {
                t.remove();
                Ok(())
            }),
        ]
    }
}

/// Percent-decodes a URI component, keeping the input when it is not valid UTF-8.
pub fn decode_component(raw: &str) -> String {
    percent_decode_str(raw)
        .decode_utf8()
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}

static HEADING_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").unwrap());
static EMPTY_FRAGMENT_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\]\(#[^)]+\)").unwrap());

/// Strips empty `[](#fragment)` links from ATX heading lines outside code fences.
fn clean_headings(markdown: &str) -> String {
    let mut in_fence = false;
    let mut lines = Vec::new();

    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            lines.push(line.to_string());
            continue;
        }

        match HEADING_LINE.captures(line).filter(|_| !in_fence) {
            Some(caps) => {
                let text = EMPTY_FRAGMENT_LINK.replace_all(&caps[2], "");
                lines.push(format!("{} {}", &caps[1], text.trim()));
            }
            None => lines.push(line.to_string()),
        }
    }

    lines.join("\n")
}

/// HTML to Markdown converter with platform rewrite rules.
pub struct MarkupConverter {
    rules: Vec<Box<dyn RewriteRule>>,
    #[cfg(feature = "markdown")]
    renderer: htmd::HtmlToMarkdown,
}

impl MarkupConverter {
    /// Converter with the header-anchor and embedded-widget rules.
    pub fn new() -> Self {
        Self::with_rules(vec![Box::new(HeaderAnchorRule), Box::new(EmbeddedWidgetRule)])
    }

    /// Converter with exactly the given rules.
    pub fn with_rules(rules: Vec<Box<dyn RewriteRule>>) -> Self {
        Self {
            rules,
            #[cfg(feature = "markdown")]
            renderer: build_renderer(),
        }
    }

    pub fn add_rule(&mut self, rule: impl RewriteRule + 'static) -> &mut Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Converts rendered HTML into stored Markdown.
    pub fn convert(&self, html: &str) -> Result<String> {
        let ctx = RewriteContext::default();
        let rewritten = self.rewrite(html, &ctx)?;
        let markdown = self.render(&rewritten)?;
        Ok(ctx.restore(clean_headings(&markdown)))
    }

    fn rewrite(&self, html: &str, ctx: &RewriteContext) -> Result<String> {
        let handlers: Vec<RuleHandler> = self.rules.iter().flat_map(|rule| rule.handlers(ctx)).collect();
        if handlers.is_empty() {
            return Ok(html.to_string());
        }

        let mut output = Vec::new();
        let mut rewriter = HtmlRewriter::new(
            Settings { element_content_handlers: handlers, ..Default::default() },
            |c: &[u8]| output.extend_from_slice(c),
        );

        rewriter
            .write(html.as_bytes())
            .map_err(|e| MigrateError::HtmlParseError(e.to_string()))?;
        rewriter.end().map_err(|e| MigrateError::HtmlParseError(e.to_string()))?;

        String::from_utf8(output).map_err(|e| MigrateError::HtmlParseError(e.to_string()))
    }

    #[cfg(feature = "markdown")]
    fn render(&self, html: &str) -> Result<String> {
        self.renderer
            .convert(html)
            .map_err(|e| MigrateError::HtmlParseError(e.to_string()))
    }

    /// Fallback HTML to text conversion when markdown feature is disabled
    #[cfg(not(feature = "markdown"))]
    fn render(&self, html: &str) -> Result<String> {
        let doc = scraper::Html::parse_fragment(html);
        Ok(doc.root_element().text().collect::<String>())
    }
}

impl Default for MarkupConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "markdown")]
fn build_renderer() -> htmd::HtmlToMarkdown {
    use htmd::options::{BulletListMarker, CodeBlockFence, CodeBlockStyle, HeadingStyle, Options};

    htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style"])
        .options(Options {
            heading_style: HeadingStyle::Atx,
            code_block_style: CodeBlockStyle::Fenced,
            code_block_fence: CodeBlockFence::Backticks,
            bullet_list_marker: BulletListMarker::Dash,
            ..Default::default()
        })
        .build()
}

/// Convert HTML to Markdown with the default rule set.
pub fn convert_to_markdown(html: &str) -> Result<String> {
    MarkupConverter::new().convert(html)
}

#[cfg(all(test, feature = "markdown"))]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_markdown_basic() {
        let markdown = convert_to_markdown(r#"<h1>Title</h1><p>This is a paragraph.</p>"#).unwrap();
        assert!(markdown.contains("# Title"));
        assert!(markdown.contains("This is a paragraph."));
    }

    #[test]
    fn test_header_anchor_links_removed() {
        let html = r##"<h2 id="intro"><a class="header-anchor-link" href="#intro" aria-hidden="true">#</a> Intro</h2><p>Body</p>"##;
        let markdown = convert_to_markdown(html).unwrap();
        assert!(markdown.lines().any(|l| l == "## Intro"));
        assert!(!markdown.contains("(#intro)"));
    }

    #[test]
    fn test_heading_empty_fragment_links_stripped() {
        let html = r##"<h3 id="setup">Setup<a href="#setup"></a></h3>"##;
        let markdown = convert_to_markdown(html).unwrap();
        assert!(markdown.lines().any(|l| l == "### Setup"));
        assert!(!markdown.contains("[](#setup)"));
    }

    #[test]
    fn test_clean_headings_skips_code_fences() {
        let markdown = "## Title [](#title)\n\n```sh\n# [](#keep) comment\n```";
        let cleaned = clean_headings(markdown);
        assert!(cleaned.starts_with("## Title\n"));
        assert!(cleaned.contains("# [](#keep) comment"));
    }

    #[test]
    fn test_embedded_widget_unwrapped() {
        let html = r#"<p>Intro</p><span class="embed-block zenn-embedded zenn-embedded-card"><iframe id="zenn-embedded__1" src="https://embed.zenn.studio/card#zenn-embedded__1" data-content="https%3A%2F%2Fgithub.com%2Fowner%2Fsome_repo" frameborder="0"></iframe></span><p>Outro</p>"#;
        let markdown = convert_to_markdown(html).unwrap();
        assert!(markdown.lines().any(|l| l == "https://github.com/owner/some_repo"));
        assert!(markdown.contains("Intro"));
        assert!(markdown.contains("Outro"));
        assert!(!markdown.contains("iframe"));
    }

    #[test]
    fn test_embedded_widget_without_iframe_contributes_nothing() {
        let html = r#"<p>Before</p><span class="zenn-embedded"><em>loading card</em></span><p>After</p>"#;
        let markdown = convert_to_markdown(html).unwrap();
        assert!(!markdown.contains("loading card"));
        assert!(markdown.contains("Before"));
        assert!(markdown.contains("After"));
    }

    #[test]
    fn test_embedded_iframe_without_data_content() {
        let html = r#"<span class="zenn-embedded"><iframe src="https://example.com"></iframe></span><p>Rest</p>"#;
        let markdown = convert_to_markdown(html).unwrap();
        assert!(!markdown.contains("example.com"));
        assert!(markdown.contains("Rest"));
    }

    #[test]
    fn test_code_blocks_fenced() {
        let html = r#"<pre><code class="language-rust">fn main() { println!("Hello"); }</code></pre>"#;
        let markdown = convert_to_markdown(html).unwrap();
        assert!(markdown.contains("```"));
        assert!(markdown.contains("fn main()"));
    }

    #[test]
    fn test_bullets_use_hyphen() {
        let markdown = convert_to_markdown("<ul><li>one</li><li>two</li></ul>").unwrap();
        assert!(markdown.lines().any(|l| l.trim_start().starts_with('-') && l.contains("one")));
        assert!(!markdown.contains("* one"));
    }

    #[test]
    fn test_links_preserved() {
        let markdown = convert_to_markdown(r#"<p>See <a href="https://example.com">this link</a>.</p>"#).unwrap();
        assert!(markdown.contains("[this link](https://example.com)"));
    }

    struct DropAsides;

    impl RewriteRule for DropAsides {
        fn name(&self) -> &'static str {
            "drop-asides"
        }

        fn handlers(&self, _ctx: &RewriteContext) -> Vec<RuleHandler> {
            vec![element!("aside", |el| {
                el.remove();
                Ok(())
            })]
        }
    }

    #[test]
    fn test_rule_registry_is_extensible() {
        let mut converter = MarkupConverter::new();
        converter.add_rule(DropAsides);
        assert_eq!(converter.rule_names(), vec!["header-anchor", "embedded-widget", "drop-asides"]);

        let markdown = converter.convert("<p>Kept</p><aside>Sponsored</aside>").unwrap();
        assert!(markdown.contains("Kept"));
        assert!(!markdown.contains("Sponsored"));
    }

    #[test]
    fn test_without_rules_anchor_survives() {
        let converter = MarkupConverter::with_rules(Vec::new());
        let html = r##"<p><a class="header-anchor-link" href="#x">link</a></p>"##;
        assert!(converter.convert(html).unwrap().contains("link"));
    }

    #[test]
    fn test_decode_component() {
        assert_eq!(decode_component("https%3A%2F%2Fexample.com%2Fa%20b"), "https://example.com/a b");
        assert_eq!(decode_component("plain"), "plain");
        assert_eq!(decode_component("%FF"), "%FF");
    }
}
