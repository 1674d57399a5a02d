//! 指令模板：将 `{slot}` / `{slot?}` 替换为会话中的槽位值
//!
//! `{slot}` 为必需引用，缺失时报错；`{slot?}` 为可选引用，缺失时替换为空串。
//! 花括号内不是标识符的内容（如 JSON 示例 `{"tool": ...}`）原样保留。

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::session::SessionState;

/// 模板中的一个槽位引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub slot: String,
    pub optional: bool,
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)(\?)?\}").expect("placeholder pattern is valid")
    })
}

/// 列出模板引用的槽位（按出现顺序，可能重复）
pub fn placeholders(template: &str) -> Vec<Placeholder> {
    placeholder_regex()
        .captures_iter(template)
        .map(|caps| Placeholder {
            slot: caps[1].to_string(),
            optional: caps.get(2).is_some(),
        })
        .collect()
}

/// 渲染模板；必需槽位缺失时返回该槽位名
pub fn render(template: &str, session: &SessionState) -> Result<String, String> {
    if let Some(missing) = placeholders(template)
        .into_iter()
        .find(|p| !p.optional && !session.contains(&p.slot))
    {
        return Err(missing.slot);
    }

    let rendered = placeholder_regex().replace_all(template, |caps: &Captures| {
        session
            .get(&caps[1])
            .map(value_to_text)
            .unwrap_or_default()
    });
    Ok(rendered.into_owned())
}

/// 字符串原样输出，其余值输出紧凑 JSON
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_placeholders_skip_json_braces() {
        let found = placeholders(r#"Story: {current_story} Critique: {critique?} Call {"tool": "exit_loop"}"#);
        assert_eq!(
            found,
            vec![
                Placeholder { slot: "current_story".into(), optional: false },
                Placeholder { slot: "critique".into(), optional: true },
            ]
        );
    }

    #[test]
    fn test_render_substitutes_values() {
        let mut session = SessionState::new();
        session.set("blog_outline", json!("1. Intro"));
        session.set("count", json!(3));

        let out = render("Outline: {blog_outline} ({count} sections){missing?}", &session).unwrap();
        assert_eq!(out, "Outline: 1. Intro (3 sections)");
    }

    #[test]
    fn test_render_reports_missing_required_slot() {
        let session = SessionState::new();
        assert_eq!(render("Edit this: {blog_draft}", &session), Err("blog_draft".to_string()));
    }
}
