/// Tests for pagination, text wrapping and the PDF backend
#[cfg(test)]
mod tests {
    use crate::report::document::ReportDocument;
    use crate::report::layout::{Block, LayoutEngine};
    use crate::report::pdf::*;
    use crate::report::style::Theme;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    fn story(value: Value) -> Vec<Block> {
        let theme = Theme::default();
        let doc = ReportDocument::from_value(value).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 15, 30, 0).unwrap();
        LayoutEngine::new(&theme).build(&doc, now)
    }

    fn pages(value: Value) -> Vec<Page> {
        paginate(&story(value), &Theme::default())
    }

    fn all_texts(pages: &[Page]) -> Vec<String> {
        pages.iter().flat_map(|p| p.texts().map(String::from).collect::<Vec<_>>()).collect()
    }

    #[test]
    fn test_wrap_respects_width_and_newlines() {
        let lines = wrap_text("one two three four five six seven", 60.0, 10.0, false);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| text_width(l, 10.0, false) <= 60.0));
        assert_eq!(lines.join(" "), "one two three four five six seven");

        let lines = wrap_text("first\nsecond", 500.0, 10.0, false);
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn test_wrap_keeps_indentation_and_breaks_long_words() {
        let lines = wrap_text("{\n  \"a\": 1\n}", 500.0, 10.0, false);
        assert_eq!(lines, vec!["{", "  \"a\": 1", "}"]);

        let word = "x".repeat(200);
        let lines = wrap_text(&word, 100.0, 10.0, false);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_wrap_empty_text_yields_one_line() {
        assert_eq!(wrap_text("", 100.0, 10.0, false), vec![String::new()]);
    }

    #[test]
    fn test_bold_is_wider() {
        assert!(text_width("Report", 12.0, true) > text_width("Report", 12.0, false));
        assert_eq!(text_width("", 12.0, false), 0.0);
    }

    #[test]
    fn test_small_report_fits_one_page() {
        let pages = pages(json!({
            "title": "Pipeline Report",
            "commit_information": {"sha": "abc123", "branch": "main"},
            "status": "success",
        }));
        assert_eq!(pages.len(), 1);
        let texts = all_texts(&pages);
        for expected in ["Pipeline Report", "Commit Information", "Sha", "abc123", "success"] {
            assert!(texts.iter().any(|t| t == expected), "missing {:?} in {:?}", expected, texts);
        }
        assert!(texts.iter().any(|t| t.starts_with("Generated on")));
    }

    #[test]
    fn test_many_rows_spill_onto_more_pages() {
        let items: Vec<Value> = (0..120).map(|i| json!(format!("check {} passed", i))).collect();
        let pages = pages(json!({"title": "Long", "checks": items}));
        assert!(pages.len() > 1);
        assert!(pages.iter().all(|p| !p.ops.is_empty()));

        let texts = all_texts(&pages);
        assert!(texts.iter().any(|t| t == "check 0 passed"));
        assert!(texts.iter().any(|t| t == "check 119 passed"));
    }

    #[test]
    fn test_ops_stay_inside_the_page() {
        let theme = Theme::default();
        let items: Vec<Value> = (0..80).map(|i| json!({"name": format!("job{}", i), "status": "ok"})).collect();
        let pages = pages(json!({"jobs": items}));
        for page in &pages {
            for op in &page.ops {
                if let DrawOp::Text { y, .. } = op {
                    assert!(*y > 0.0 && *y < theme.page.page_height);
                }
            }
        }
    }

    fn assert_text_inside_frame(pages: &[Page], theme: &Theme) {
        let (top, bottom) = (theme.page.margin, theme.page.page_height - theme.page.margin);
        for (index, page) in pages.iter().enumerate() {
            for op in &page.ops {
                if let DrawOp::Text { y, text, .. } = op {
                    assert!(*y > top && *y <= bottom, "page {}: {:?} at y={} outside {}..{}", index, text, y, top, bottom);
                }
            }
        }
    }

    #[test]
    fn test_value_taller_than_a_page_is_split_across_pages() {
        let theme = Theme::default();
        let config: serde_json::Map<String, Value> = (0..120).map(|i| (format!("k{:03}", i), json!(i))).collect();
        let pages = pages(json!({"details": {"config": config, "status": "ok"}}));

        assert!(pages.len() > 1);
        assert_text_inside_frame(&pages, &theme);
        let texts = all_texts(&pages);
        for i in 0..120 {
            let key = format!("\"k{:03}\"", i);
            assert_eq!(texts.iter().filter(|t| t.contains(&key)).count(), 1, "{} drawn once", key);
        }
        assert!(texts.iter().any(|t| t == "ok"));
        // The label is redrawn beside every piece of the split value
        let labels = texts.iter().filter(|t| *t == "Config").count();
        assert!(labels >= 2, "Config drawn {} times", labels);
    }

    #[test]
    fn test_grid_row_taller_than_a_page_is_split_across_pages() {
        let theme = Theme::default();
        let log: Vec<String> = (0..150).map(|i| format!("step {} done", i)).collect();
        let pages = pages(json!({"jobs": [
            {"name": "build", "log": log.join("\n")},
            {"name": "test", "log": "short"},
        ]}));

        assert!(pages.len() > 1);
        assert_text_inside_frame(&pages, &theme);
        let texts = all_texts(&pages);
        for i in [0, 75, 149] {
            let line = format!("step {} done", i);
            assert_eq!(texts.iter().filter(|t| **t == line).count(), 1, "{} drawn once", line);
        }
        assert!(texts.iter().any(|t| t == "short"));
        for page in pages.iter().filter(|p| p.texts().any(|t| t.starts_with("step "))) {
            assert_eq!(page.texts().filter(|t| *t == "Log").count(), 1);
        }
    }

    #[test]
    fn test_list_of_empty_records_keeps_its_section() {
        let texts = all_texts(&pages(json!({"jobs": [{}, {}]})));
        assert!(texts.iter().any(|t| t == "Jobs"), "missing heading in {:?}", texts);
        assert!(texts.iter().any(|t| t == "{}"));
    }

    #[test]
    fn test_grid_header_repeats_on_continuation_pages() {
        let items: Vec<Value> = (0..80).map(|i| json!({"name": format!("job{}", i), "status": "ok"})).collect();
        let pages = pages(json!({"jobs": items}));
        assert!(pages.len() > 1);
        for page in &pages[..pages.len() - 1] {
            let header_count = page.texts().filter(|t| *t == "Status").count();
            assert_eq!(header_count, 1);
        }
    }

    #[test]
    fn test_merged_label_is_drawn_once_per_page_segment() {
        let lines: Vec<Value> = (0..90).map(|i| json!(format!("finding {}", i))).collect();
        let pages = pages(json!({"quality": {"findings": lines, "status": "failed"}}));
        assert!(pages.len() > 1);
        let labels: usize = pages.iter().map(|p| p.texts().filter(|t| *t == "Findings").count()).sum();
        assert_eq!(labels, pages.len());
    }

    #[test]
    fn test_value_box_has_border_and_fill() {
        let theme = Theme::default();
        let pages = pages(json!({"status": "deployed"}));
        let ops = &pages[0].ops;
        assert!(ops.iter().any(|op| matches!(op,
            DrawOp::StrokeRect { color, width, .. } if *color == theme.palette.primary && *width == 1.0)));
        assert!(ops.iter().any(|op| matches!(op, DrawOp::Text { text, bold: true, .. } if text == "deployed")));
    }

    #[test]
    fn test_pagination_is_deterministic() {
        let data = json!({"title": "T", "details": {"a": 1, "b": [1, 2]}, "list": ["x", "y"]});
        assert_eq!(pages(data.clone()), pages(data));
    }

    #[test]
    fn test_write_pdf_produces_pdf_bytes() {
        let theme = Theme::default();
        let pages = pages(json!({
            "title": "CI Report",
            "execution_details": {"start_time": "2024-01-15T10:30:00Z", "status": "success"},
            "test_results": ["Unit tests: 150/150 passed"],
        }));
        let bytes = write_pdf("CI Report", &pages, &theme).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn test_write_pdf_handles_non_latin_text() {
        let theme = Theme::default();
        let pages = pages(json!({"title": "Résumé ✓", "note": "emoji 🚀 and “quotes”"}));
        let bytes = write_pdf("Résumé", &pages, &theme).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        let texts = all_texts(&pages);
        assert!(texts.iter().any(|t| t == "Résumé ?"));
        assert!(texts.iter().any(|t| t == "emoji ? and \"quotes\""));
    }
}
