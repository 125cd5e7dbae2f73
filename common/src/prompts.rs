//! プロンプト生成モジュール
//!
//! CLIとWeb(WASM)で共有されるプロンプト:
//! - EXTRACTION_PROMPT: Step1（画像 → 構造化JSON）用の固定プロンプト
//! - build_explanation_prompt: Step2（JSON → 患者向けHTML）用プロンプト

use crate::types::ExtractionResult;

/// 抽出対象のセクション（プロンプトに列挙される順）
pub const REPORT_SECTIONS: &[&str] = &[
    "patientInformation",
    "vitalSigns",
    "laboratoryResults",
    "radiologyFindings",
    "medications",
    "clinicalSummary",
];

/// Step1プロンプト（画像と一緒に送信）
pub const EXTRACTION_PROMPT: &str = "Thoroughly analyze the provided medical report image. \
Extract all clinically relevant information and structure it into a clean, well-organized JSON object. \
Prioritize creating logical sections like 'patientInformation', 'vitalSigns', 'laboratoryResults', \
'radiologyFindings', 'medications', and a 'clinicalSummary'. \
For list-like data such as lab results or medications, use arrays of objects. \
Ensure all values are correctly extracted and typed. \
If a section is not present in the report, omit it from the JSON.";

/// Step2プロンプト生成（説明文）
///
/// Step1の結果を整形済みJSONとして埋め込む。画像は送らない。
///
/// # Arguments
/// * `result` - Step1の抽出結果
pub fn build_explanation_prompt(result: &ExtractionResult) -> String {
    let json = result.to_pretty_json();

    format!(
        r#"You are helping a patient understand their medical report. Below is the structured data extracted from the report.

```json
{json}
```

Write a short, friendly explanation in plain language for someone without medical training.

## Output format (HTML fragment only)
- Use one numbered list (<ol>) where each <li> is a key finding from the report.
- When a finding needs more detail, add a nested bullet list (<ul>) inside that <li>.
- Wrap critical or out-of-range values in <strong>.
- Wrap advisories and things the patient should watch for in <u>.
- The last <li> must recommend discussing these results with a doctor or other qualified clinician.

## Rules
- Output only the HTML fragment. Do not include <html>, <head>, <body>, <style> or <script> tags.
- Do not use Markdown and do not wrap the answer in code fences.
- Do not invent values that are not present in the data.
- Keep each item to one or two sentences."#
    )
}
