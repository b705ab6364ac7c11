use crate::http::NormalizedResponse;
use colored::*;
use serde_json::Value;

pub enum ResponseFormat {
    /// Colored title line plus indented JSON.
    Pretty,
    /// One JSON document, nothing else.
    Raw,
}

pub struct ResponseFormatter {
    format: ResponseFormat,
    color: bool,
}

impl ResponseFormatter {
    pub fn new(format: ResponseFormat) -> Self {
        Self {
            format,
            color: true,
        }
    }

    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    /// Render one labelled result, e.g. `FedEx 975082865344`.
    pub fn format(&self, label: &str, response: &NormalizedResponse) -> String {
        match self.format {
            ResponseFormat::Raw => response.to_value().to_string(),
            ResponseFormat::Pretty => {
                format!("{}\n{}", self.title(label, response), self.pretty(&response.to_value()))
            }
        }
    }

    /// Render several results as one JSON array.
    pub fn format_all(&self, responses: &[NormalizedResponse]) -> String {
        let values = Value::Array(responses.iter().map(NormalizedResponse::to_value).collect());
        match self.format {
            ResponseFormat::Raw => values.to_string(),
            ResponseFormat::Pretty => self.pretty(&values),
        }
    }

    fn title(&self, label: &str, response: &NormalizedResponse) -> String {
        let (status, kind) = match response {
            NormalizedResponse::Json(_) => ("ok", "json"),
            NormalizedResponse::Text(_) => ("ok", "text"),
            NormalizedResponse::Binary(_) => ("ok", "binary"),
            NormalizedResponse::TimedOut => ("timeout", "none"),
            NormalizedResponse::NoData => ("no data", "none"),
        };
        let line = format!("{} [{}, {}]", label, status, kind);
        if !self.color {
            return line;
        }
        match response {
            NormalizedResponse::Json(_) => line.green().bold().to_string(),
            NormalizedResponse::Text(_) | NormalizedResponse::Binary(_) => {
                line.cyan().bold().to_string()
            }
            NormalizedResponse::TimedOut => line.yellow().bold().to_string(),
            NormalizedResponse::NoData => line.red().bold().to_string(),
        }
    }

    fn pretty(&self, value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_is_single_json_document() {
        let formatter = ResponseFormatter::new(ResponseFormat::Raw);
        let out = formatter.format("UPS 1Z", &NormalizedResponse::TimedOut);
        assert_eq!(out, r#"{"Timeout":true}"#);
    }

    #[test]
    fn test_pretty_without_color() {
        let formatter = ResponseFormatter::new(ResponseFormat::Pretty).without_color();
        let out = formatter.format(
            "FedEx 975082865344",
            &NormalizedResponse::Json(json!({"successful": true})),
        );
        assert_eq!(
            out,
            "FedEx 975082865344 [ok, json]\n{\n  \"successful\": true\n}"
        );
    }

    #[test]
    fn test_format_all() {
        let formatter = ResponseFormatter::new(ResponseFormat::Raw);
        let out = formatter.format_all(&[
            NormalizedResponse::NoData,
            NormalizedResponse::Text("<html>".into()),
        ]);
        assert_eq!(out, r#"[{},{"response":"<html>"}]"#);
    }
}
