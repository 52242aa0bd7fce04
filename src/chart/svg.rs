//! Minimal SVG document builder.

/// Format a coordinate compactly: at most three decimals, no trailing zeros.
pub fn fmt_num(value: f64) -> String {
    let mut s = format!("{:.3}", value);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Escape text for use in element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Collects elements and serializes them into a standalone document.
pub struct SvgBuilder {
    elements: Vec<String>,
    width: f64,
    height: f64,
    title: Option<String>,
}

impl SvgBuilder {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            elements: Vec::new(),
            width,
            height,
            title: None,
        }
    }

    /// Accessible document title.
    pub fn title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    pub fn build(self) -> String {
        let (w, h) = (fmt_num(self.width), fmt_num(self.height));
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" font-family="sans-serif">"#
        );
        svg.push('\n');
        if let Some(title) = self.title {
            svg.push_str(&format!("  <title>{}</title>\n", escape(&title)));
        }
        for el in &self.elements {
            svg.push_str("  ");
            svg.push_str(el);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }

    /// Push a pre-rendered element.
    pub fn raw(&mut self, element: String) {
        self.elements.push(element);
    }

    pub fn open_group(&mut self, class: &str, transform: Option<String>) {
        let transform = transform
            .map(|t| format!(r#" transform="{}""#, t))
            .unwrap_or_default();
        self.elements
            .push(format!(r#"<g class="{}"{}>"#, escape(class), transform));
    }

    pub fn close_group(&mut self) {
        self.elements.push("</g>".to_string());
    }

    /// Filled path with a hover title.
    pub fn area(&mut self, class: &str, d: &str, fill: &str, title: &str) {
        self.elements.push(format!(
            r#"<path class="{}" d="{}" fill="{}"><title>{}</title></path>"#,
            escape(class),
            d,
            escape(fill),
            escape(title)
        ));
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str) {
        self.elements.push(format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            fmt_num(x),
            fmt_num(y),
            fmt_num(w),
            fmt_num(h),
            escape(fill)
        ));
    }

    /// Text element; `attrs` is appended verbatim.
    pub fn text(&mut self, x: f64, y: f64, content: &str, attrs: &str) {
        let attrs = if attrs.is_empty() {
            String::new()
        } else {
            format!(" {}", attrs)
        };
        self.elements.push(format!(
            r#"<text x="{}" y="{}"{}>{}</text>"#,
            fmt_num(x),
            fmt_num(y),
            attrs,
            escape(content)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(1.0), "1");
        assert_eq!(fmt_num(1.5), "1.5");
        assert_eq!(fmt_num(2.123456), "2.123");
        assert_eq!(fmt_num(-0.0001), "0");
        assert_eq!(fmt_num(-12.25), "-12.25");
        assert_eq!(fmt_num(300.0), "300");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_build_document() {
        let mut svg = SvgBuilder::new(100.0, 50.5);
        svg.title("Nominees & more");
        svg.open_group("legend", Some("translate(10,0)".to_string()));
        svg.rect(0.0, 0.0, 14.0, 14.0, "#4e79a7");
        svg.text(20.0, 11.0, "Asian", r#"font-size="12""#);
        svg.close_group();
        let doc = svg.build();

        assert!(doc.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 100 50.5\""));
        assert!(doc.contains("<title>Nominees &amp; more</title>"));
        assert!(doc.contains(r#"<g class="legend" transform="translate(10,0)">"#));
        assert!(doc.contains(r##"<rect x="0" y="0" width="14" height="14" fill="#4e79a7"/>"##));
        assert!(doc.contains(r#"<text x="20" y="11" font-size="12">Asian</text>"#));
        assert!(doc.trim_end().ends_with("</svg>"));
    }
}
