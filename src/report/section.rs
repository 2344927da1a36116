//! Slicing the report document into named spans bounded by heading text.

/// Returns the span from the first occurrence of `start_marker` up to (but
/// not including) the first occurrence of `end_marker` after it. The start
/// marker itself is part of the span. A missing end marker extends the span
/// to the end of the document; a missing start marker yields `None`.
pub fn section<'a>(document: &'a str, start_marker: &str, end_marker: &str) -> Option<&'a str> {
    let start = document.find(start_marker)?;
    let end = document[start..]
        .find(end_marker)
        .map(|offset| start + offset)
        .unwrap_or(document.len());
    Some(&document[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "intro Recent usage row-a row-b Battery usage trailer";

    #[test]
    fn returns_span_inclusive_of_start_marker() {
        assert_eq!(
            section(DOC, "Recent usage", "Battery usage"),
            Some("Recent usage row-a row-b ")
        );
    }

    #[test]
    fn missing_start_marker_yields_none() {
        assert_eq!(section(DOC, "Battery capacity history", "Battery usage"), None);
    }

    #[test]
    fn missing_end_marker_extends_to_document_end() {
        assert_eq!(
            section(DOC, "Battery usage", "No such heading"),
            Some("Battery usage trailer")
        );
    }

    #[test]
    fn end_marker_is_only_searched_after_the_start() {
        let doc = "end start middle end";
        assert_eq!(section(doc, "start", "end"), Some("start middle "));
    }
}
