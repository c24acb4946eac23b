// copyguard-core/src/domain/content/parse.rs

// Les fournisseurs renvoient rarement du JSON propre : blocs ```json, texte
// autour, puces en <li> ou en lignes "✓ ...", tags en liste CSV.

use crate::domain::content::generated::GeneratedContent;
use crate::domain::error::DomainError;
use serde_json::{Map, Value};

/// Parses a raw generator answer into `GeneratedContent`.
pub fn parse_response(raw: &str) -> Result<GeneratedContent, DomainError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| DomainError::MalformedContent("no JSON object found".to_string()))?;
    let value: Value = serde_json::from_str(json)
        .map_err(|e| DomainError::MalformedContent(format!("invalid JSON: {}", e)))?;
    from_value(&value)
}

/// Builds content from an already-decoded JSON value.
pub fn from_value(value: &Value) -> Result<GeneratedContent, DomainError> {
    let obj = value.as_object().ok_or_else(|| {
        DomainError::MalformedContent("response root is not an object".to_string())
    })?;

    let content = GeneratedContent {
        meta_title: text_field(obj, &["metaTitle", "meta_title", "title"]),
        meta_description: text_field(obj, &["metaDescription", "meta_description"]),
        bullet_points: lookup(obj, &["bulletPoints", "bullet_points", "bullets"])
            .map(bullets_from)
            .unwrap_or_default(),
        long_description: text_field(obj, &["longDescription", "long_description", "description"]),
        why_worth_it: text_field(obj, &["whyWorthIt", "why_worth_it"]),
        seo_tags: lookup(obj, &["seoTags", "seo_tags", "tags"])
            .map(tags_from)
            .unwrap_or_default(),
    };

    if content.is_empty() {
        return Err(DomainError::MalformedContent(
            "response contains none of the expected fields".to_string(),
        ));
    }
    Ok(content)
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let unfenced = strip_fences(raw);
    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    (end > start).then(|| &unfenced[start..=end])
}

fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.find("```") {
        Some(open) => {
            let after = &trimmed[open + 3..];
            let after = after.strip_prefix("json").unwrap_or(after);
            match after.find("```") {
                Some(close) => &after[..close],
                None => after,
            }
        }
        None => trimmed,
    }
}

fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k)).filter(|v| !v.is_null())
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> String {
    match lookup(obj, keys) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" "),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn bullets_from(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(clean_bullet(s)),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) if s.contains("<li") => s
            .split("<li")
            .skip(1)
            .filter_map(|chunk| {
                let inner = chunk.split_once('>')?.1;
                let inner = inner.split("</li>").next().unwrap_or(inner);
                Some(clean_bullet(&crate::domain::content::text::strip_markup(inner)))
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s.lines().map(clean_bullet).filter(|s| !s.is_empty()).collect(),
        _ => Vec::new(),
    }
}

fn clean_bullet(line: &str) -> String {
    line.trim()
        .trim_start_matches(['✓', '✔', '•', '-', '*', '–'])
        .trim()
        .to_string()
}

fn tags_from(value: &Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Value::String(s) => s.split([',', ';']).map(str::to_string).collect(),
        _ => Vec::new(),
    };
    raw.into_iter()
        .map(|t| t.trim().trim_start_matches('#').trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_parse_fenced_response() -> Result<()> {
        let raw = "Here you go:\n```json\n{\"metaTitle\": \"Socket set 25 pcs\", \"bulletPoints\": [\"✓ 25 elements\", \"CrV steel\"], \"seoTags\": \"sockets, tools, #crv\"}\n```";
        let content = parse_response(raw)?;
        assert_eq!(content.meta_title, "Socket set 25 pcs");
        assert_eq!(content.bullet_points, vec!["25 elements", "CrV steel"]);
        assert_eq!(content.seo_tags, vec!["sockets", "tools", "crv"]);
        Ok(())
    }

    #[test]
    fn test_parse_html_bullets() -> Result<()> {
        let raw = r#"{"bulletPoints": "<ul><li>First</li><li><b>Second</b></li></ul>"}"#;
        let content = parse_response(raw)?;
        assert_eq!(content.bullet_points, vec!["First", "Second"]);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_response("I cannot help with that").is_err());
        assert!(parse_response("{\"unrelated\": 1}").is_err());
    }
}
