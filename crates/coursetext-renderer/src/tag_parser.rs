//! Plain-text formatting for quiz text with `[latex]` and `[markdown]` tags.
//!
//! Unlike the HTML pipeline, the input here is plain text: everything outside
//! an enabled tag region is HTML-escaped. Tags that are disabled are left as
//! literal text.

use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{Options, Parser, html};
use pulldown_cmark_escape::escape_html_body_text;
use regex::Regex;

use crate::math::{MathRenderer, PulldownLatex};

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(/?)(latex|markdown)\]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Latex,
    Markdown,
}

impl TagKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "latex" => Some(Self::Latex),
            "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct EnabledTags {
    latex: bool,
    markdown: bool,
}

impl EnabledTags {
    fn allows(self, kind: TagKind) -> bool {
        match kind {
            TagKind::Latex => self.latex,
            TagKind::Markdown => self.markdown,
        }
    }
}

#[derive(Debug)]
struct Region {
    kind: TagKind,
    /// Including the tags.
    outer: Range<usize>,
    inner: Range<usize>,
}

/// A tag opened while another is still open, or closed by the wrong tag.
#[derive(Debug)]
struct NestedTags;

fn find_regions(text: &str, enabled: EnabledTags) -> Result<Vec<Region>, NestedTags> {
    let mut regions = Vec::new();
    let mut open: Option<(TagKind, Range<usize>)> = None;
    for caps in TAG_RE.captures_iter(text) {
        let Some(kind) = TagKind::from_name(&caps[2]) else {
            continue;
        };
        if !enabled.allows(kind) {
            continue;
        }
        let tag = caps.get(0).map_or(0..0, |m| m.range());
        let closing = !caps[1].is_empty();
        match (open.take(), closing) {
            (None, false) => open = Some((kind, tag)),
            // Stray closing tag, kept as text.
            (None, true) => {}
            (Some((open_kind, open_tag)), true) if open_kind == kind => regions.push(Region {
                kind,
                outer: open_tag.start..tag.end,
                inner: open_tag.end..tag.start,
            }),
            (Some(_), _) => return Err(NestedTags),
        }
    }
    Ok(regions)
}

fn push_escaped(out: &mut String, text: &str) {
    // Writing to a String can't fail
    let _ = escape_html_body_text(&mut *out, text);
}

/// Render markdown, unwrapping the paragraph when the output is exactly one.
fn render_markdown(source: &str) -> String {
    let mut rendered = String::new();
    html::push_html(&mut rendered, Parser::new_ext(source, Options::empty()));
    let trimmed = rendered.trim_end_matches('\n');
    match trimmed
        .strip_prefix("<p>")
        .and_then(|rest| rest.strip_suffix("</p>"))
    {
        Some(inner) if !inner.contains("<p>") => inner.to_owned(),
        _ => rendered,
    }
}

/// Format quiz text into HTML.
///
/// Enabled `[latex]` regions become MathML (display math unless `inline`),
/// enabled `[markdown]` regions become HTML. A missing or empty input gives
/// an empty string. Text with overlapping enabled tags is returned fully
/// escaped.
pub fn format_text(latex: bool, markdown: bool, text: Option<&str>, inline: bool) -> String {
    format_text_with(&PulldownLatex, latex, markdown, text, inline)
}

pub fn format_text_with(
    renderer: &impl MathRenderer,
    latex: bool,
    markdown: bool,
    text: Option<&str>,
    inline: bool,
) -> String {
    let text = text.unwrap_or_default();
    let mut out = String::with_capacity(text.len());
    if text.is_empty() {
        return out;
    }
    let regions = match find_regions(text, EnabledTags { latex, markdown }) {
        Ok(regions) => regions,
        Err(NestedTags) => {
            tracing::debug!("overlapping tags, escaping the whole text");
            push_escaped(&mut out, text);
            return out;
        }
    };

    let mut cursor = 0;
    for region in regions {
        push_escaped(&mut out, &text[cursor..region.outer.start]);
        let content = &text[region.inner];
        match region.kind {
            TagKind::Latex => out.push_str(&renderer.render(content, !inline)),
            TagKind::Markdown => out.push_str(&render_markdown(content)),
        }
        cursor = region.outer.end;
    }
    push_escaped(&mut out, &text[cursor..]);
    out
}

/// False when enabled tags overlap or nest.
pub fn is_valid_text(latex: bool, markdown: bool, text: Option<&str>) -> bool {
    find_regions(text.unwrap_or_default(), EnabledTags { latex, markdown }).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl MathRenderer for Echo {
        fn render(&self, latex: &str, display_mode: bool) -> String {
            format!("<m display={display_mode}>{latex}</m>")
        }
    }

    fn format(latex: bool, markdown: bool, text: &str, inline: bool) -> String {
        format_text_with(&Echo, latex, markdown, Some(text), inline)
    }

    #[test]
    fn missing_or_empty_input() {
        assert_eq!(format_text(true, true, None, false), "");
        assert_eq!(format_text(true, true, Some(""), false), "");
    }

    #[test]
    fn plain_text_is_escaped() {
        assert_eq!(
            format(true, true, r#"a < b & "c" > d"#, false),
            r#"a &lt; b &amp; "c" &gt; d"#
        );
    }

    #[test]
    fn latex_regions_render_in_display_mode_unless_inline() {
        assert_eq!(
            format(true, false, "Solve [latex]x^2 < 1[/latex] now", false),
            "Solve <m display=true>x^2 < 1</m> now"
        );
        assert_eq!(
            format(true, false, "[latex]x[/latex]", true),
            "<m display=false>x</m>"
        );
    }

    #[test]
    fn disabled_tags_are_literal_text() {
        assert_eq!(
            format(false, false, "[latex]x<y[/latex]", false),
            "[latex]x&lt;y[/latex]"
        );
    }

    #[test]
    fn markdown_single_paragraph_is_unwrapped() {
        assert_eq!(
            format(false, true, "A [markdown]**bold**[/markdown] word", false),
            "A <strong>bold</strong> word"
        );
    }

    #[test]
    fn markdown_multiple_paragraphs_keep_their_tags() {
        assert_eq!(
            format(false, true, "[markdown]First\n\nSecond[/markdown]", false),
            "<p>First</p>\n<p>Second</p>\n"
        );
    }

    #[test]
    fn markdown_text_keeps_quotes_unescaped() {
        assert_eq!(
            format(false, true, r#"[markdown]# alert("xss")[/markdown]"#, false),
            "<h1>alert(\"xss\")</h1>\n"
        );
    }

    #[test]
    fn empty_markdown_region_renders_nothing() {
        assert_eq!(format(false, true, "Empty: [markdown][/markdown]", false), "Empty: ");
    }

    #[test]
    fn stray_and_unclosed_tags_stay_text() {
        let text = "a [/latex] b [latex] c";
        assert!(is_valid_text(true, true, Some(text)));
        assert_eq!(format(true, true, text, false), text);
    }

    #[test]
    fn overlapping_tags_are_invalid_and_escaped() {
        let text = "[latex]x[markdown]<y>[/markdown][/latex]";
        assert!(!is_valid_text(true, true, Some(text)));
        assert_eq!(
            format(true, true, text, false),
            "[latex]x[markdown]&lt;y&gt;[/markdown][/latex]"
        );
    }

    #[test]
    fn overlap_of_disabled_tag_is_ignored() {
        let text = "[latex]x[markdown]y[/markdown][/latex]";
        assert!(is_valid_text(true, false, Some(text)));
        assert_eq!(
            format(true, false, text, true),
            "<m display=false>x[markdown]y[/markdown]</m>"
        );
    }

    #[test]
    fn mismatched_close_is_invalid() {
        assert!(!is_valid_text(true, true, Some("[latex]x[/markdown]")));
        assert!(is_valid_text(true, false, Some("[latex]x[/markdown]")));
    }

    #[test]
    fn missing_text_is_valid() {
        assert!(is_valid_text(true, true, None));
    }
}
