//! Splits an answer into displayable segments.
//!
//! The orchestrator keeps chart markup inside the answer text; display code
//! uses this to pull the pieces apart again.

use serde::Serialize;

const CHART_MARKER: &str = "<div class=\"finwise-chart\"";
const IMAGE_MARKER: &str = "data:image/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum Segment {
    Text(String),
    /// A chart fragment, wrapper div included.
    Html(String),
    /// A full `data:image/...;base64,...` URI.
    Image(String),
}

pub fn split_artifacts(text: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut rest = text;

    loop {
        let chart = rest.find(CHART_MARKER);
        let image = find_image(rest);
        let next = match (chart, image) {
            (Some(c), Some(i)) => Some(c.min(i)),
            (c, i) => c.or(i),
        };
        let Some(start) = next else {
            push_text(&mut out, rest);
            break;
        };

        push_text(&mut out, &rest[..start]);
        let tail = &rest[start..];
        let len = if tail.starts_with(CHART_MARKER) {
            let len = balanced_div_len(tail);
            out.push(Segment::Html(tail[..len].to_string()));
            len
        } else {
            let len = data_uri_len(tail);
            out.push(Segment::Image(tail[..len].to_string()));
            len
        };
        rest = &tail[len..];
    }
    out
}

fn push_text(out: &mut Vec<Segment>, s: &str) {
    let t = s.trim();
    if !t.is_empty() {
        out.push(Segment::Text(t.to_string()));
    }
}

/// Length of the `<div ...>...</div>` starting at `s[0]`, nesting-aware.
/// Runs to the end of `s` if the closing tag is missing.
fn balanced_div_len(s: &str) -> usize {
    let mut depth = 0usize;
    let mut i = 0;
    while i < s.len() {
        let t = &s[i..];
        if t.starts_with("<div") {
            depth += 1;
            i += 4;
        } else if t.starts_with("</div>") {
            depth = depth.saturating_sub(1);
            i += 6;
            if depth == 0 {
                return i;
            }
        } else {
            i += t.chars().next().map_or(1, char::len_utf8);
        }
    }
    s.len()
}

fn find_image(s: &str) -> Option<usize> {
    s.match_indices(IMAGE_MARKER)
        .map(|(i, _)| i)
        .find(|&i| is_base64_uri(&s[i..]))
}

fn is_base64_uri(s: &str) -> bool {
    s.find(";base64,").is_some_and(|p| {
        s[IMAGE_MARKER.len()..p]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

fn data_uri_len(s: &str) -> usize {
    let body = s.find(";base64,").map_or(0, |p| p + ";base64,".len());
    body + s[body..]
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')))
        .unwrap_or(s.len() - body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_one_segment() {
        assert_eq!(
            split_artifacts("  Save 20% of income.  "),
            vec![Segment::Text("Save 20% of income.".into())]
        );
        assert!(split_artifacts("   ").is_empty());
    }

    #[test]
    fn chart_fragment_is_extracted_with_nested_divs() {
        let chart = "<div class=\"finwise-chart\"><div id=\"c\"></div><script>x</script></div>";
        let text = format!("Here is the chart:\n{chart}\nRent dominates.");
        assert_eq!(
            split_artifacts(&text),
            vec![
                Segment::Text("Here is the chart:".into()),
                Segment::Html(chart.into()),
                Segment::Text("Rent dominates.".into()),
            ]
        );
    }

    #[test]
    fn base64_images_are_extracted() {
        let text = "Before data:image/png;base64,iVBORw0KGgo= after";
        assert_eq!(
            split_artifacts(text),
            vec![
                Segment::Text("Before".into()),
                Segment::Image("data:image/png;base64,iVBORw0KGgo=".into()),
                Segment::Text("after".into()),
            ]
        );
    }

    #[test]
    fn mention_of_data_image_without_payload_stays_text() {
        let text = "Use a data:image/ URI to inline pictures.";
        assert_eq!(split_artifacts(text), vec![Segment::Text(text.into())]);
    }

    #[test]
    fn unterminated_chart_runs_to_end() {
        let text = "x <div class=\"finwise-chart\"><div>";
        let segs = split_artifacts(text);
        assert_eq!(segs.len(), 2);
        assert!(matches!(&segs[1], Segment::Html(h) if h.ends_with("<div>")));
    }
}
