//! 解析結果の出力整形

use medreport_common::{render_document, render_text, AttemptReport};
use serde_json::json;

/// 端末表示用テキスト
pub fn format_report(report: &AttemptReport) -> String {
    let mut out = render_text(&render_document(&report.result));

    if let Some(markup) = &report.explanation {
        out.push_str("\n\n== Plain-Language Summary ==\n");
        out.push_str(&markup.to_text());
    }

    if let Some(err) = &report.explanation_error {
        out.push_str("\n\n⚠ ");
        out.push_str(&err.user_message());
    }

    out
}

/// `--format json` 用
pub fn report_json(report: &AttemptReport) -> serde_json::Value {
    json!({
        "result": report.result,
        "explanationHtml": report.explanation.as_ref().map(|m| m.to_html()),
        "summaryError": report.explanation_error.as_ref().map(|e| e.user_message()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use medreport_common::{Error, ExtractionResult, Markup};

    fn report() -> AttemptReport {
        AttemptReport {
            result: ExtractionResult::new(json!({"clinicalSummary": "Stable."})),
            explanation: None,
            explanation_error: None,
        }
    }

    #[test]
    fn test_format_report_extraction_only() {
        assert_eq!(format_report(&report()), "== Clinical Summary ==\nStable.");
    }

    #[test]
    fn test_format_report_with_explanation() {
        let mut report = report();
        report.explanation = Some(Markup::parse("<ol><li>All good</li></ol>"));
        let text = format_report(&report);
        assert!(text.ends_with("== Plain-Language Summary ==\n1. All good"));
    }

    #[test]
    fn test_format_report_with_summary_error() {
        let mut report = report();
        report.explanation_error = Some(Error::ExplanationUnavailable("empty text".into()));
        let text = format_report(&report);
        assert!(text.contains("summary could not be generated"));
    }

    #[test]
    fn test_report_json() {
        let mut report = report();
        report.explanation = Some(Markup::parse("<u>note</u>"));
        let value = report_json(&report);
        assert_eq!(value["result"]["clinicalSummary"], "Stable.");
        assert_eq!(value["explanationHtml"], "<u>note</u>");
        assert!(value["summaryError"].is_null());
    }
}
