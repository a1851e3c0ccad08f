//! Allow-list HTML sanitizing.

use coursetext_common::config::SanitizerConfig;

/// Strips anything not on an allow-list from an HTML fragment.
pub trait HtmlSanitizer {
    fn sanitize(&self, html: &str) -> String;
}

impl<T: HtmlSanitizer + ?Sized> HtmlSanitizer for &T {
    fn sanitize(&self, html: &str) -> String {
        (**self).sanitize(html)
    }
}

/// MathML Core presentation elements emitted by the math renderer.
const MATHML_TAGS: &[&str] = &[
    "math",
    "annotation",
    "semantics",
    "menclose",
    "merror",
    "mfrac",
    "mi",
    "mmultiscripts",
    "mn",
    "mo",
    "mover",
    "mpadded",
    "mphantom",
    "mprescripts",
    "mroot",
    "mrow",
    "ms",
    "mspace",
    "msqrt",
    "mstyle",
    "msub",
    "msubsup",
    "msup",
    "mtable",
    "mtd",
    "mtext",
    "mtr",
    "munder",
    "munderover",
    "none",
];

const MATHML_ATTRIBUTES: &[&str] = &[
    "accent",
    "accentunder",
    "columnalign",
    "columnlines",
    "columnspacing",
    "depth",
    "display",
    "displaystyle",
    "encoding",
    "fence",
    "form",
    "frame",
    "height",
    "largeop",
    "linethickness",
    "lspace",
    "mathbackground",
    "mathcolor",
    "mathvariant",
    "maxsize",
    "minsize",
    "movablelimits",
    "notation",
    "rowalign",
    "rowlines",
    "rowspacing",
    "rspace",
    "scriptlevel",
    "separator",
    "stretchy",
    "symmetric",
    "voffset",
    "width",
    "xmlns",
];

/// Marker attributes all start with `data-`.
const GENERIC_ATTRIBUTE_PREFIXES: &[&str] = &["data-"];
const GENERIC_ATTRIBUTES: &[&str] = &["class"];

/// [`HtmlSanitizer`] built on ammonia's default allow-list, extended with
/// MathML, `data-*` attributes and `class`.
///
/// Links keep their `rel` as written.
#[derive(Debug, Clone, Default)]
pub struct AmmoniaSanitizer {
    config: SanitizerConfig,
}

impl AmmoniaSanitizer {
    pub fn new(config: SanitizerConfig) -> Self {
        Self { config }
    }

    fn builder(&self) -> ammonia::Builder<'_> {
        let mut builder = ammonia::Builder::default();
        builder
            .add_tags(MATHML_TAGS.iter())
            .add_generic_attribute_prefixes(GENERIC_ATTRIBUTE_PREFIXES.iter())
            .add_generic_attributes(GENERIC_ATTRIBUTES.iter())
            .add_tags(self.config.extra_tags.iter())
            .add_generic_attributes(self.config.extra_attributes.iter())
            .link_rel(None);
        for tag in MATHML_TAGS {
            builder.add_tag_attributes(*tag, MATHML_ATTRIBUTES.iter());
        }
        builder
    }
}

impl HtmlSanitizer for AmmoniaSanitizer {
    fn sanitize(&self, html: &str) -> String {
        self.builder().clean(html).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize(html: &str) -> String {
        AmmoniaSanitizer::default().sanitize(html)
    }

    #[test]
    fn keeps_plain_text_verbatim() {
        assert_eq!(sanitize("a     a"), "a     a");
    }

    #[test]
    fn removes_scripts_and_handlers() {
        assert_eq!(
            sanitize(r#"<p onclick="x()">hi</p><script>alert(1)</script>"#),
            "<p>hi</p>"
        );
    }

    #[test]
    fn keeps_markers() {
        let html = r#"<span data-glossary-id="t"></span><span data-citation-id="k" data-citation-postnote="p.&nbsp;3"></span>"#;
        assert_eq!(sanitize(html), html);
    }

    #[test]
    fn keeps_mathml() {
        let html = r#"<math display="block"><mfrac><mi>a</mi><mi>b</mi></mfrac></math>"#;
        assert_eq!(sanitize(html), html);
    }

    #[test]
    fn keeps_links_and_titles() {
        let html = r#"<a href="https://example.org" title="t">x</a> <abbr title="Application">app</abbr>"#;
        assert_eq!(sanitize(html), html);
    }

    #[test]
    fn extra_tags_from_config() {
        let html = r#"<x-note aria-label="n">body</x-note>"#;
        assert_eq!(sanitize(html), "body");
        let sanitizer = AmmoniaSanitizer::new(SanitizerConfig {
            extra_tags: vec!["x-note".into()],
            extra_attributes: vec!["aria-label".into()],
        });
        assert_eq!(sanitizer.sanitize(html), html);
    }
}
