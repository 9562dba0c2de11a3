//! Response Parser
//!
//! LLMの自由形式テキストから構造化されたSEOフィールドを抽出する

use super::prompt::PromptProfile;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 既知のフィールドラベル（リストセクションの終端判定に使用）
const FIELD_LABELS: &[&str] = &[
    "Content improvement suggestions",
    "Schema markup recommendations",
    "Local SEO recommendations",
    "Suggested headings",
    "Meta description",
    "Meta keywords",
    "Meta title",
    "Focus keyword",
    "OG description",
    "OG title",
];

/// OGタイトルの最大文字数
pub const OG_TITLE_MAX: usize = 70;
/// OGディスクリプションの最大文字数
pub const OG_DESCRIPTION_MAX: usize = 200;

/// 抽出されたSEO推奨値
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecommendations {
    pub meta_title: String,
    pub meta_description: String,
    pub focus_keyword: String,
    pub meta_keywords: String,
    pub og_title: String,
    pub og_description: String,
    pub content_suggestions: Vec<String>,
    pub suggested_headings: Vec<String>,
    pub local_seo_recommendations: Vec<String>,
    pub structured_data: Option<Value>,
}

/// LLMレスポンスパーサー
pub struct ResponseParser {
    stop_line: Regex,
    list_marker: Regex,
    item_number: Regex,
    fenced_block: Regex,
    ld_json_script: Regex,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

/// ラベルと省略可能な括弧書き（例: "(max 60 characters)"）にマッチするパターン
fn label_pattern(label: &str) -> String {
    format!(r"(?i){}(?:[ \t]*\([^)\n]*\))?", regex::escape(label))
}

/// Markdownの強調記号を除去
///
/// `__` は英数字に挟まれている場合（`snake__case` など）は値の一部として残す。
fn strip_emphasis(text: &str) -> String {
    let text = text.replace("**", "");
    let is_word = |c: Option<char>| c.is_some_and(char::is_alphanumeric);

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (pos, marker) in text.match_indices("__") {
        let before = text[..pos].chars().next_back();
        let after = text[pos + marker.len()..].chars().next();
        if is_word(before) && is_word(after) {
            continue;
        }
        out.push_str(&text[last..pos]);
        last = pos + marker.len();
    }
    out.push_str(&text[last..]);
    out
}

/// 値を囲む引用符を除去
fn strip_quotes(value: &str) -> &str {
    const PAIRS: &[(char, char)] = &[('"', '"'), ('\'', '\''), ('“', '”'), ('`', '`')];

    let value = value.trim();
    for (open, close) in PAIRS {
        if let Some(inner) = value
            .strip_prefix(*open)
            .and_then(|rest| rest.strip_suffix(*close))
        {
            return inner.trim();
        }
    }
    value
}

fn truncate_chars(value: &str, max_len: usize) -> String {
    if max_len == 0 {
        return value.to_string();
    }
    value.chars().take(max_len).collect()
}

impl ResponseParser {
    /// 新規パーサーを作成
    pub fn new() -> Self {
        let labels = FIELD_LABELS
            .iter()
            .map(|l| regex::escape(l))
            .collect::<Vec<_>>()
            .join("|");

        // 番号付き見出し・素の見出し・Markdown見出しで始まるフィールド行
        let labeled = format!(
            r"[ \t>]*(?:\d+[.)][ \t]*)?(?:{labels})(?:[ \t]*\([^)\n]*\))?[ \t]*:"
        );
        let heading = format!(r"[ \t]*#+[ \t]*(?:\d+[.)][ \t]*)?(?:{labels})");
        let stop_line = format!(r"(?i)^(?:{labeled}|{heading})");

        Self {
            stop_line: Regex::new(&stop_line).expect("field label pattern is valid"),
            list_marker: Regex::new(r"^(?:[-*•+][ \t]*|\d+[.)][ \t]+)")
                .expect("list marker pattern is valid"),
            item_number: Regex::new(r"^(\d+)[.)][ \t]")
                .expect("item number pattern is valid"),
            fenced_block: Regex::new(r"(?s)```[ \t]*([A-Za-z0-9+_\-]*)[^\n]*\n(.*?)```")
                .expect("fenced block pattern is valid"),
            ld_json_script: Regex::new(r"(?is)<script[^>]*application/ld\+json[^>]*>(.*?)</script>")
                .expect("ld+json script pattern is valid"),
        }
    }

    /// ラベルに続く1行の値を抽出
    ///
    /// 一致しない場合は空文字列。`max_len > 0` なら文字数で切り詰める。
    pub fn extract_value(&self, text: &str, label: &str, max_len: usize) -> String {
        let text = strip_emphasis(text);
        let label = label_pattern(label);

        // 最初のコロン付きの出現を優先し、なければ空白区切りで再試行
        let patterns = [
            format!(r"{label}[ \t]*:\s*(.*?)(?:\n|$)"),
            format!(r"{label}[:\s]+(.*?)(?:\n|$)"),
        ];

        for pattern in &patterns {
            let Ok(re) = Regex::new(pattern) else {
                continue;
            };
            let value = re
                .captures(&text)
                .and_then(|c| c.get(1))
                .map(|m| strip_quotes(m.as_str()))
                .unwrap_or_default();

            if !value.is_empty() {
                return truncate_chars(value, max_len);
            }
        }

        String::new()
    }

    /// ラベルに続くリストを抽出
    ///
    /// セクションは空行・次のフィールド見出し・テキスト末尾のいずれかで終わる。
    /// 見出しに見える行でも、番号が直前の項目の続き番号なら項目として扱う。
    pub fn extract_list(&self, text: &str, label: &str) -> Vec<String> {
        let text = strip_emphasis(text);
        let label = label_pattern(label);

        let patterns = [
            format!(r"{label}[ \t]*:[ \t]*"),
            format!(r"{label}[:\s]+"),
        ];

        let Some(start) = patterns.iter().find_map(|pattern| {
            Regex::new(pattern)
                .ok()
                .and_then(|re| re.find(&text))
                .map(|m| m.end())
        }) else {
            return Vec::new();
        };

        let section = text[start..].trim_start();
        let mut items: Vec<String> = Vec::new();
        let mut next_number = 1;

        for line in section.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                break;
            }

            let number = self
                .item_number
                .captures(trimmed)
                .and_then(|c| c[1].parse::<u32>().ok());
            if self.stop_line.is_match(line) && number != Some(next_number) {
                break;
            }
            if let Some(n) = number {
                next_number = n + 1;
            }

            match self.list_marker.find(trimmed) {
                Some(marker) => items.push(trimmed[marker.end()..].trim().to_string()),
                None => match items.last_mut() {
                    Some(last) => {
                        if !last.is_empty() {
                            last.push(' ');
                        }
                        last.push_str(trimmed);
                    }
                    None => items.push(trimmed.to_string()),
                },
            }
        }

        items.retain(|item| !item.is_empty());
        items
    }

    /// JSON-LD構造化データを抽出
    ///
    /// JSONとして解析できた最初のブロックを返す。
    pub fn extract_structured_data(&self, text: &str) -> Option<Value> {
        let fenced = self.fenced_block.captures_iter(text).filter_map(|c| {
            let lang = c.get(1).map_or("", |m| m.as_str()).to_ascii_lowercase();
            let body = c.get(2)?.as_str().trim();
            let is_json = matches!(lang.as_str(), "json" | "ld+json" | "jsonld" | "json-ld")
                || (lang.is_empty() && (body.starts_with('{') || body.starts_with('[')));
            is_json.then_some(body)
        });

        let scripts = self
            .ld_json_script
            .captures_iter(text)
            .filter_map(|c| c.get(1).map(|m| m.as_str().trim()));

        fenced
            .chain(scripts)
            .find_map(|body| serde_json::from_str::<Value>(body).ok())
    }

    /// レスポンス全体を解析
    pub fn parse(&self, text: &str, profile: &PromptProfile) -> ParsedRecommendations {
        let og_title = self.extract_value(text, "OG title", OG_TITLE_MAX);
        let og_title = if og_title.is_empty() {
            self.extract_value(text, "Open Graph title", OG_TITLE_MAX)
        } else {
            og_title
        };

        let og_description = self.extract_value(text, "OG description", OG_DESCRIPTION_MAX);
        let og_description = if og_description.is_empty() {
            self.extract_value(text, "Open Graph description", OG_DESCRIPTION_MAX)
        } else {
            og_description
        };

        ParsedRecommendations {
            meta_title: self.extract_value(text, "Meta title", profile.title_max),
            meta_description: self.extract_value(text, "Meta description", profile.description_max),
            focus_keyword: self.extract_value(text, "Focus keyword", 0),
            meta_keywords: self.extract_value(text, "Meta keywords", 0),
            og_title,
            og_description,
            content_suggestions: self.extract_list(text, "Content improvement suggestions"),
            suggested_headings: self.extract_list(text, "Suggested headings"),
            local_seo_recommendations: self.extract_list(text, "Local SEO recommendations"),
            structured_data: self.extract_structured_data(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE_RESPONSE: &str = r#"Here are my recommendations.

1. **Meta title (max 60 characters):** "Denver Personal Injury Lawyer | Smith & Park Law"
2. **Meta description:** Injured in Denver? Our personal injury lawyers have recovered millions for clients. Free consultation, no fee unless we win your case.
3. **Focus keyword:** Denver personal injury lawyer

4. **Content improvement suggestions:**
   - Add a FAQ section covering statute of limitations
   - Include client testimonials with case results
   - Link to the car accident and
     slip-and-fall practice pages

5. **Schema markup recommendations:** Use LegalService markup.

```json
{
  "@context": "https://schema.org",
  "@type": "LegalService",
  "name": "Smith & Park Law"
}
```

Meta keywords: personal injury, Denver lawyer, accident attorney
OG title: Denver Personal Injury Lawyers
OG description: Free consultation with Denver's trusted injury attorneys.

Suggested headings:
- What To Do After an Accident
- How Contingency Fees Work
"#;

    #[test]
    fn test_extract_value_basic() {
        let parser = ResponseParser::new();
        let text = "Meta title: Best Divorce Lawyer in Austin\nMeta description: Call today.";
        assert_eq!(
            parser.extract_value(text, "Meta title", 0),
            "Best Divorce Lawyer in Austin"
        );
        assert_eq!(parser.extract_value(text, "meta DESCRIPTION", 0), "Call today.");
    }

    #[test]
    fn test_extract_value_missing_label() {
        let parser = ResponseParser::new();
        assert_eq!(parser.extract_value("nothing here", "Focus keyword", 0), "");
    }

    #[test]
    fn test_extract_value_truncates_by_chars() {
        let parser = ResponseParser::new();
        let text = format!("Meta title: {}", "ü".repeat(80));
        let value = parser.extract_value(&text, "Meta title", 60);
        assert_eq!(value.chars().count(), 60);
    }

    #[test]
    fn test_extract_value_prefers_colon_match() {
        let parser = ResponseParser::new();
        let text = "The meta title below is optimized.\nMeta title: Tax Attorneys in Boston";
        assert_eq!(
            parser.extract_value(text, "Meta title", 0),
            "Tax Attorneys in Boston"
        );
    }

    #[test]
    fn test_extract_value_first_colon_occurrence_wins() {
        let parser = ResponseParser::new();
        let text = "**Meta title:** Estate Planning Attorneys in Tampa\n\nNote on Meta title: keep it under 60 characters";
        assert_eq!(
            parser.extract_value(text, "Meta title", 0),
            "Estate Planning Attorneys in Tampa"
        );
    }

    #[test]
    fn test_extract_value_keeps_snake_case_underscores() {
        let parser = ResponseParser::new();
        let text = "__Focus keyword:__ dui__lawyer\nMeta keywords: my__slug, __bold__ term";
        assert_eq!(parser.extract_value(text, "Focus keyword", 0), "dui__lawyer");
        assert_eq!(
            parser.extract_value(text, "Meta keywords", 0),
            "my__slug, bold term"
        );
    }

    #[test]
    fn test_extract_value_on_next_line() {
        let parser = ResponseParser::new();
        let text = "Focus keyword:\nworkers compensation attorney\n";
        assert_eq!(
            parser.extract_value(text, "Focus keyword", 0),
            "workers compensation attorney"
        );
    }

    #[test]
    fn test_extract_value_without_colon() {
        let parser = ResponseParser::new();
        assert_eq!(
            parser.extract_value("Focus keyword  bankruptcy lawyer", "Focus keyword", 0),
            "bankruptcy lawyer"
        );
    }

    #[test]
    fn test_extract_list_until_blank_line() {
        let parser = ResponseParser::new();
        let text = "Content improvement suggestions:\n- Add FAQs\n* Add testimonials\n\nOther: x";
        assert_eq!(
            parser.extract_list(text, "Content improvement suggestions"),
            vec!["Add FAQs", "Add testimonials"]
        );
    }

    #[test]
    fn test_extract_list_numbered_and_stops_at_next_field() {
        let parser = ResponseParser::new();
        let text = "Content improvement suggestions:\n1. Expand the intro\n2) Cite local statutes\n5. Schema markup recommendations: LegalService";
        assert_eq!(
            parser.extract_list(text, "Content improvement suggestions"),
            vec!["Expand the intro", "Cite local statutes"]
        );
    }

    #[test]
    fn test_extract_list_numbered_item_starting_with_label() {
        let parser = ResponseParser::new();
        let text = "Content improvement suggestions:\n1. Meta description: add a call to action\n2. Add an FAQ section";
        assert_eq!(
            parser.extract_list(text, "Content improvement suggestions"),
            vec!["Meta description: add a call to action", "Add an FAQ section"]
        );
    }

    #[test]
    fn test_extract_list_stops_at_out_of_sequence_field() {
        let parser = ResponseParser::new();
        let text = "3. Content improvement suggestions:\n   - Add an FAQ section\n4. Meta keywords: probate, wills";
        assert_eq!(
            parser.extract_list(text, "Content improvement suggestions"),
            vec!["Add an FAQ section"]
        );
    }

    #[test]
    fn test_extract_list_missing_label() {
        let parser = ResponseParser::new();
        assert!(parser.extract_list("no lists here", "Suggested headings").is_empty());
    }

    #[test]
    fn test_extract_structured_data_fenced() {
        let parser = ResponseParser::new();
        let text = "Schema:\n```json\n{\"@type\": \"Attorney\"}\n```\n";
        assert_eq!(
            parser.extract_structured_data(text),
            Some(json!({"@type": "Attorney"}))
        );
    }

    #[test]
    fn test_extract_structured_data_script_tag() {
        let parser = ResponseParser::new();
        let text = r#"<script type="application/ld+json">{"@type": "LegalService"}</script>"#;
        assert_eq!(
            parser.extract_structured_data(text),
            Some(json!({"@type": "LegalService"}))
        );
    }

    #[test]
    fn test_extract_structured_data_invalid_json() {
        let parser = ResponseParser::new();
        let text = "```json\n{ \"@type\": LegalService, }\n```";
        assert_eq!(parser.extract_structured_data(text), None);
        assert_eq!(parser.extract_structured_data("plain prose"), None);
    }

    #[test]
    fn test_extract_structured_data_skips_non_json_fences() {
        let parser = ResponseParser::new();
        let text = "```html\n<p>hi</p>\n```\n```\n{\"@type\": \"Organization\"}\n```";
        assert_eq!(
            parser.extract_structured_data(text),
            Some(json!({"@type": "Organization"}))
        );
    }

    #[test]
    fn test_parse_full_response() {
        let parser = ResponseParser::new();
        let parsed = parser.parse(SAMPLE_RESPONSE, &PromptProfile::default());

        assert_eq!(
            parsed.meta_title,
            "Denver Personal Injury Lawyer | Smith & Park Law"
        );
        assert_eq!(parsed.meta_description.chars().count(), 134);
        assert_eq!(parsed.focus_keyword, "Denver personal injury lawyer");
        assert_eq!(
            parsed.content_suggestions,
            vec![
                "Add a FAQ section covering statute of limitations",
                "Include client testimonials with case results",
                "Link to the car accident and slip-and-fall practice pages",
            ]
        );
        assert_eq!(
            parsed.meta_keywords,
            "personal injury, Denver lawyer, accident attorney"
        );
        assert_eq!(parsed.og_title, "Denver Personal Injury Lawyers");
        assert_eq!(
            parsed.og_description,
            "Free consultation with Denver's trusted injury attorneys."
        );
        assert_eq!(
            parsed.suggested_headings,
            vec!["What To Do After an Accident", "How Contingency Fees Work"]
        );
        assert!(parsed.local_seo_recommendations.is_empty());
        assert_eq!(
            parsed.structured_data.as_ref().and_then(|v| v["@type"].as_str()),
            Some("LegalService")
        );
    }

    #[test]
    fn test_parse_empty_response() {
        let parser = ResponseParser::new();
        let parsed = parser.parse("", &PromptProfile::default());
        assert_eq!(parsed, ParsedRecommendations::default());
    }
}
