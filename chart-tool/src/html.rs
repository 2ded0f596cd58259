//! Self-contained HTML fragment for a figure.

use services::uuid::short_stable_id;

use crate::figure::Figure;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Class on the outer wrapper; downstream code uses it to find artifacts.
pub const WRAPPER_CLASS: &str = "finwise-chart";

/// Renders `figure` as an embeddable fragment. The element id is derived
/// from the figure JSON so identical inputs give byte-identical output.
pub fn render_fragment(figure: &Figure) -> Result<String, serde_json::Error> {
    let data = script_safe(&serde_json::to_string(&figure.data)?);
    let layout = script_safe(&serde_json::to_string(&figure.layout)?);
    let config = script_safe(&serde_json::to_string(&figure.config)?);
    let id = format!("finwise-chart-{}", short_stable_id(&format!("{data}{layout}{config}")));

    Ok(format!(
        concat!(
            "<div class=\"{class}\">",
            "<div id=\"{id}\" style=\"width:100%;height:500px;\"></div>",
            "<script src=\"{cdn}\" charset=\"utf-8\"></script>",
            "<script type=\"text/javascript\">",
            "Plotly.newPlot(\"{id}\", {data}, {layout}, {config});",
            "</script>",
            "</div>"
        ),
        class = WRAPPER_CLASS,
        id = id,
        cdn = PLOTLY_CDN,
        data = data,
        layout = layout,
        config = config,
    ))
}

/// Escapes `<` so user text can neither close the inline script nor look
/// like markup to anything scanning the fragment. In JSON, `<` only occurs
/// inside strings, where `\u003c` is equivalent.
fn script_safe(json: &str) -> String {
    json.replace('<', "\\u003c")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fig(title: &str) -> Figure {
        Figure {
            data: vec![json!({"type": "bar", "x": ["a"], "y": [1]})],
            layout: json!({"title": {"text": title}}),
            config: json!({"responsive": true}),
        }
    }

    #[test]
    fn fragment_is_wrapped_and_deterministic() {
        let a = render_fragment(&fig("Q1")).unwrap();
        let b = render_fragment(&fig("Q1")).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("<div class=\"finwise-chart\">"));
        assert!(a.contains(PLOTLY_CDN));
        assert_ne!(a, render_fragment(&fig("Q2")).unwrap());
    }

    #[test]
    fn markup_in_titles_is_escaped() {
        let html = render_fragment(&fig("</script><div>x")).unwrap();
        assert!(html.contains("\\u003c/script>\\u003cdiv>x"));
        assert_eq!(html.matches("</script>").count(), 2);
        assert_eq!(html.matches("<div").count(), 2);
    }
}
