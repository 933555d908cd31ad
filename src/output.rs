use serde::Serialize;
use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("URLSHELF_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

/// How CLI commands report their results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Human }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, OutputMode::Human)
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    ok: bool,
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn success_json<T: Serialize>(command: &str, data: T) -> crate::Result<String> {
    let envelope = Envelope {
        ok: true,
        command,
        data: Some(data),
        error: None,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Single-line success envelope, for commands that emit one result per line
pub fn success_line<T: Serialize>(command: &str, data: T) -> crate::Result<String> {
    let envelope = Envelope {
        ok: true,
        command,
        data: Some(data),
        error: None,
    };
    Ok(serde_json::to_string(&envelope)?)
}

pub fn failure_json(command: &str, error: &str) -> crate::Result<String> {
    let envelope: Envelope<'_, ()> = Envelope {
        ok: false,
        command,
        data: None,
        error: Some(error.to_string()),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Print a JSON result envelope; human mode callers print their own output
pub fn emit_success<T: Serialize>(mode: OutputMode, command: &str, data: T) -> crate::Result<()> {
    if mode == OutputMode::Json {
        println!("{}", success_json(command, data)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let out = success_json("add", serde_json::json!({"id": "x"})).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["command"], "add");
        assert_eq!(value["data"]["id"], "x");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_success_line_is_one_envelope_per_line() {
        let out = success_line("watch", vec!["https://a.com", "https://b.com"]).unwrap();
        assert!(!out.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["command"], "watch");
        assert_eq!(value["data"][1], "https://b.com");
    }

    #[test]
    fn test_failure_envelope() {
        let out = failure_json("delete", "URL not found: abc").unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"], "URL not found: abc");
        assert!(value.get("data").is_none());
    }
}
