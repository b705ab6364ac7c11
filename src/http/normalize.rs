use crate::http::response::NormalizedResponse;
use flate2::read::GzDecoder;
use serde_json::Value;
use std::io::Read;
use tracing::debug;

/// Intermediate value carried through the stages.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Bytes(Vec<u8>),
    Text(String),
    Json(Value),
}

impl From<Payload> for NormalizedResponse {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Bytes(bytes) => NormalizedResponse::Binary(bytes),
            Payload::Text(text) => NormalizedResponse::Text(text),
            Payload::Json(value) => NormalizedResponse::Json(value),
        }
    }
}

/// What a stage did with its input.
#[derive(Debug)]
pub enum StageOutcome {
    Applied(Payload),
    /// The stage did not apply; the input is handed back untouched.
    Skipped(Payload, String),
}

pub trait Stage {
    fn name(&self) -> &'static str;
    fn apply(&self, input: Payload) -> StageOutcome;
}

pub struct Gunzip;

impl Stage for Gunzip {
    fn name(&self) -> &'static str {
        "gunzip"
    }

    fn apply(&self, input: Payload) -> StageOutcome {
        let Payload::Bytes(bytes) = input else {
            return StageOutcome::Skipped(input, "not raw bytes".to_string());
        };
        let mut decoded = Vec::new();
        match GzDecoder::new(bytes.as_slice()).read_to_end(&mut decoded) {
            Ok(_) => StageOutcome::Applied(Payload::Bytes(decoded)),
            Err(e) => StageOutcome::Skipped(Payload::Bytes(bytes), e.to_string()),
        }
    }
}

pub struct Utf8Decode;

impl Stage for Utf8Decode {
    fn name(&self) -> &'static str {
        "utf-8 decode"
    }

    fn apply(&self, input: Payload) -> StageOutcome {
        let Payload::Bytes(bytes) = input else {
            return StageOutcome::Skipped(input, "not raw bytes".to_string());
        };
        match String::from_utf8(bytes) {
            Ok(text) => StageOutcome::Applied(Payload::Text(text)),
            Err(e) => {
                let reason = e.utf8_error().to_string();
                StageOutcome::Skipped(Payload::Bytes(e.into_bytes()), reason)
            }
        }
    }
}

pub struct JsonParse;

impl Stage for JsonParse {
    fn name(&self) -> &'static str {
        "json parse"
    }

    fn apply(&self, input: Payload) -> StageOutcome {
        let Payload::Text(text) = input else {
            return StageOutcome::Skipped(input, "not decoded text".to_string());
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => StageOutcome::Applied(Payload::Json(value)),
            Err(e) => StageOutcome::Skipped(Payload::Text(text), e.to_string()),
        }
    }
}

/// Ordered best-effort stages. A skipped stage never stops the pipeline.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage + Send + Sync>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            stages: vec![Box::new(Gunzip), Box::new(Utf8Decode), Box::new(JsonParse)],
        }
    }
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage + Send + Sync>>) -> Self {
        Self { stages }
    }

    pub fn run(&self, raw: Vec<u8>) -> NormalizedResponse {
        let payload = self
            .stages
            .iter()
            .fold(Payload::Bytes(raw), |payload, stage| {
                match stage.apply(payload) {
                    StageOutcome::Applied(next) => {
                        debug!("Stage {} applied", stage.name());
                        next
                    }
                    StageOutcome::Skipped(unchanged, reason) => {
                        debug!("Stage {} skipped: {}", stage.name(), reason);
                        unchanged
                    }
                }
            });
        payload.into()
    }
}

/// Run the default gunzip → decode → JSON pipeline.
pub fn normalize(raw: Vec<u8>) -> NormalizedResponse {
    Pipeline::default().run(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use serde_json::json;
    use std::io::Write;

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_plain_and_gzipped_json_agree() {
        let body = br#"{"TrackPackagesResponse":{"successful":true}}"#;

        let plain = normalize(body.to_vec());
        let compressed = normalize(gzip(body));

        assert_eq!(plain, compressed);
        assert_eq!(
            plain,
            NormalizedResponse::Json(json!({"TrackPackagesResponse": {"successful": true}}))
        );
    }

    #[test]
    fn test_html_stays_text() {
        let html = "<html><input name=\"id\" value=\"1\"></html>";
        assert_eq!(
            normalize(html.as_bytes().to_vec()),
            NormalizedResponse::Text(html.to_string())
        );
        assert_eq!(
            normalize(gzip(html.as_bytes())),
            NormalizedResponse::Text(html.to_string())
        );
    }

    #[test]
    fn test_invalid_utf8_stays_binary() {
        let bytes = vec![0xff, 0xfe, 0x00, 0x41];
        assert_eq!(
            normalize(bytes.clone()),
            NormalizedResponse::Binary(bytes)
        );
    }

    #[test]
    fn test_empty_output() {
        assert_eq!(normalize(Vec::new()), NormalizedResponse::Text(String::new()));
    }

    #[test]
    fn test_stage_outcomes() {
        match Gunzip.apply(Payload::Bytes(b"plain".to_vec())) {
            StageOutcome::Skipped(Payload::Bytes(bytes), _) => assert_eq!(bytes, b"plain"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        match JsonParse.apply(Payload::Bytes(b"{}".to_vec())) {
            StageOutcome::Skipped(Payload::Bytes(_), reason) => {
                assert_eq!(reason, "not decoded text")
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_custom_pipeline() {
        let pipeline = Pipeline::new(vec![Box::new(Utf8Decode)]);
        assert_eq!(
            pipeline.run(b"[1,2]".to_vec()),
            NormalizedResponse::Text("[1,2]".to_string())
        );
    }
}
