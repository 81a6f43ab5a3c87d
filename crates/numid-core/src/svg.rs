//! Text-to-SVG prompt and output checking.

/// Wrap a user prompt so the model answers with bare SVG markup.
pub fn svg_prompt(prompt: &str) -> String {
    format!(
        "Create a valid, standalone SVG image that matches this request. Return ONLY raw SVG markup, \
         no backticks, no explanations. Keep size responsive using width=\"100%\" and viewBox. Prompt: {prompt}"
    )
}

/// Strip a Markdown code fence from model output and return the SVG, or
/// `None` when what remains does not start with `<svg`.
pub fn extract_svg(raw: &str) -> Option<String> {
    let mut svg = raw.trim();

    if let Some(rest) = svg.strip_prefix("```") {
        svg = strip_fence_tag(rest);
    }
    if let Some(rest) = svg.strip_suffix("```") {
        svg = rest;
    }

    let svg = svg.trim();
    svg.starts_with("<svg").then(|| svg.to_owned())
}

/// Drop an `xml` / `svg` info string (any case) right after an opening fence.
fn strip_fence_tag(rest: &str) -> &str {
    match rest.get(..3) {
        Some(tag) if tag.eq_ignore_ascii_case("xml") || tag.eq_ignore_ascii_case("svg") => &rest[3..],
        _ => rest,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><circle r="4"/></svg>"#;

    #[test]
    fn bare_svg_passes() {
        assert_eq!(extract_svg(SVG).as_deref(), Some(SVG));
    }

    #[test]
    fn fenced_svg_is_unwrapped() {
        for fence in ["```svg", "```xml", "```SVG", "```"] {
            let raw = format!("{fence}\n{SVG}\n```\n");
            assert_eq!(extract_svg(&raw).as_deref(), Some(SVG), "fence {fence}");
        }
    }

    #[test]
    fn prose_is_rejected() {
        assert_eq!(extract_svg("Here is your image: <svg></svg>"), None);
        assert_eq!(extract_svg(""), None);
        assert_eq!(extract_svg("```html\n<svg></svg>\n```"), None);
    }

    #[test]
    fn prompt_embeds_request() {
        let p = svg_prompt("a red fox");
        assert!(p.ends_with("Prompt: a red fox"));
        assert!(p.contains("width=\"100%\""));
    }
}
