//! `[latex]…[/latex]` regions rendered to MathML via pulldown-latex.

use std::sync::LazyLock;

use pulldown_cmark_escape::escape_html;
use pulldown_latex::{
    Parser, Storage, config::DisplayMode, config::RenderConfig, mathml::push_mathml,
};
use regex::{Captures, Regex};

static LATEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[latex\](.*?)\[/latex\]").unwrap());

/// Something that turns a LaTeX source string into HTML.
///
/// Implementations must not fail: bad input renders as visible error markup.
pub trait MathRenderer {
    fn render(&self, latex: &str, display_mode: bool) -> String;
}

impl<T: MathRenderer + ?Sized> MathRenderer for &T {
    fn render(&self, latex: &str, display_mode: bool) -> String {
        (**self).render(latex, display_mode)
    }
}

/// Result of attempting to render LaTeX math
pub enum MathResult {
    /// Successfully rendered MathML
    Success(String),
    /// Rendering failed; fallback HTML showing the source, plus the message
    Error { html: String, message: String },
}

/// Render LaTeX math to MathML
///
/// # Arguments
/// * `latex` - The LaTeX source string, without delimiters
/// * `display_mode` - If true, render as display math (block); if false, inline
pub fn render_math(latex: &str, display_mode: bool) -> MathResult {
    let storage = Storage::new();
    let parser = Parser::new(latex, &storage);
    let config = RenderConfig {
        display_mode: if display_mode {
            DisplayMode::Block
        } else {
            DisplayMode::Inline
        },
        ..Default::default()
    };

    let events: Vec<_> = parser.collect();
    let errors: Vec<String> = events
        .iter()
        .filter_map(|e| e.as_ref().err().map(|err| err.to_string()))
        .collect();

    if !errors.is_empty() {
        let message = errors.join("; ");
        return MathResult::Error {
            html: format_error_html(latex, &message, display_mode),
            message,
        };
    }

    let mut mathml = String::new();
    if let Err(e) = push_mathml(&mut mathml, events.into_iter(), config) {
        return MathResult::Error {
            html: format_error_html(latex, &e.to_string(), display_mode),
            message: e.to_string(),
        };
    }
    MathResult::Success(format!(
        r#"<span class="math {}">{mathml}</span>"#,
        mode_class(display_mode)
    ))
}

fn mode_class(display_mode: bool) -> &'static str {
    if display_mode {
        "math-display"
    } else {
        "math-inline"
    }
}

fn format_error_html(latex: &str, error: &str, display_mode: bool) -> String {
    let mode_class = mode_class(display_mode);
    let mut escaped_latex = String::new();
    let mut escaped_error = String::new();
    // Writing to a String can't fail
    let _ = escape_html(&mut escaped_latex, latex);
    let _ = escape_html(&mut escaped_error, error);
    format!(
        r#"<span class="math math-error {mode_class}" title="{escaped_error}"><code>{escaped_latex}</code></span>"#
    )
}

/// The pulldown-latex MathML renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulldownLatex;

impl MathRenderer for PulldownLatex {
    fn render(&self, latex: &str, display_mode: bool) -> String {
        match render_math(latex, display_mode) {
            MathResult::Success(html) => html,
            MathResult::Error { html, message } => {
                tracing::debug!(latex, %message, "latex did not render, showing source");
                html
            }
        }
    }
}

/// Output of [`convert_to_latex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatexConversion {
    /// Number of regions replaced.
    pub count: usize,
    pub converted: String,
}

/// Replace every `[latex]…[/latex]` region with inline math.
///
/// Regions are matched lazily and never span a line break. `&amp;` inside a
/// region is turned back into `&` before rendering so alignment markers
/// survive HTML-escaped input.
pub fn convert_to_latex(html: &str) -> LatexConversion {
    convert_to_latex_with(&PulldownLatex, html)
}

pub fn convert_to_latex_with(renderer: &impl MathRenderer, html: &str) -> LatexConversion {
    let mut count = 0;
    let converted = LATEX_RE.replace_all(html, |caps: &Captures| {
        count += 1;
        renderer.render(&caps[1].replace("&amp;", "&"), false)
    });
    LatexConversion {
        count,
        converted: converted.into_owned(),
    }
}
