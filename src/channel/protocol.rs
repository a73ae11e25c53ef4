//! Push channel wire format.
//!
//! Frames are JSON objects with a string `command`. The server sends
//! `preview_image` and `final_image`; the client answers a final image with
//! `final_image_ack`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ProtocolError;

const PREVIEW_IMAGE: &str = "preview_image";
const FINAL_IMAGE: &str = "final_image";
const DATA_IMAGE_PREFIX: &str = "data:image/";

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Preview { data_uri: String },
    Final(FinalImage),
}

/// A finished image and its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalImage {
    pub data_uri: String,
    pub seed: String,
    pub tags: String,
    /// False starts a new gallery session
    pub keep_gallery: bool,
    pub final_infos: Option<String>,
}

/// Frames sent back to the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Outbound {
    FinalImageAck { seed: String },
}

impl Outbound {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// `seed` arrives as a string but numbers are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedField {
    Text(String),
    Number(serde_json::Number),
}

impl SeedField {
    fn into_string(self) -> String {
        match self {
            SeedField::Text(text) => text.trim().to_string(),
            SeedField::Number(number) => number.to_string(),
        }
    }
}

/// `keep_gallery` arrives as `"True"`/`"False"` but booleans are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FlagField {
    Bool(bool),
    Text(String),
}

impl FlagField {
    fn as_bool(&self) -> bool {
        match self {
            FlagField::Bool(flag) => *flag,
            FlagField::Text(text) => !text.trim().eq_ignore_ascii_case("false"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PreviewPayload {
    base64: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FinalPayload {
    base64: Option<String>,
    seed: Option<SeedField>,
    tags: Option<String>,
    keep_gallery: Option<FlagField>,
    #[serde(default)]
    final_infos: Option<String>,
}

fn image_uri(base64: Option<String>, command: &'static str) -> Result<String, ProtocolError> {
    let base64 = base64.ok_or(ProtocolError::MissingField {
        command,
        field: "base64",
    })?;
    if !base64.starts_with(DATA_IMAGE_PREFIX) {
        return Err(ProtocolError::InvalidImageData(command));
    }
    Ok(base64.trim().to_string())
}

fn non_empty(value: Option<String>, field: &'static str) -> Result<String, ProtocolError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ProtocolError::MissingField {
            command: FINAL_IMAGE,
            field,
        }),
    }
}

/// Decode one inbound text frame.
pub fn parse_inbound(text: &str) -> Result<Inbound, ProtocolError> {
    let value: Value = serde_json::from_str(text)?;
    let command = value
        .get("command")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingCommand)?
        .to_string();

    match command.as_str() {
        PREVIEW_IMAGE => {
            let payload: PreviewPayload = serde_json::from_value(value)
                .map_err(|_| ProtocolError::InvalidImageData(PREVIEW_IMAGE))?;
            let data_uri = image_uri(payload.base64, PREVIEW_IMAGE)?;
            Ok(Inbound::Preview { data_uri })
        }
        FINAL_IMAGE => {
            let payload: FinalPayload = serde_json::from_value(value)?;
            let data_uri = image_uri(payload.base64, FINAL_IMAGE)?;
            let seed = payload
                .seed
                .map(SeedField::into_string)
                .filter(|seed| !seed.is_empty())
                .ok_or(ProtocolError::MissingField {
                    command: FINAL_IMAGE,
                    field: "seed",
                })?;
            let tags = non_empty(payload.tags, "tags")?;
            let keep_gallery = payload
                .keep_gallery
                .ok_or(ProtocolError::MissingField {
                    command: FINAL_IMAGE,
                    field: "keep_gallery",
                })?
                .as_bool();
            let final_infos = payload
                .final_infos
                .map(|infos| infos.trim().to_string())
                .filter(|infos| !infos.is_empty());

            Ok(Inbound::Final(FinalImage {
                data_uri,
                seed,
                tags,
                keep_gallery,
                final_infos,
            }))
        }
        _ => Err(ProtocolError::UnknownCommand(command)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_frame() {
        let frame = r#"{"command":"preview_image","base64":"data:image/png;base64,AAAA \n"}"#;
        assert_eq!(
            parse_inbound(frame).unwrap(),
            Inbound::Preview {
                data_uri: "data:image/png;base64,AAAA".to_string()
            }
        );
    }

    #[test]
    fn test_preview_rejects_non_image() {
        let frame = r#"{"command":"preview_image","base64":"hello"}"#;
        assert!(matches!(
            parse_inbound(frame),
            Err(ProtocolError::InvalidImageData("preview_image"))
        ));
        let frame = r#"{"command":"preview_image"}"#;
        assert!(matches!(
            parse_inbound(frame),
            Err(ProtocolError::MissingField { field: "base64", .. })
        ));
    }

    #[test]
    fn test_preview_non_string_payload() {
        let frame = r#"{"command":"preview_image","base64":5}"#;
        let err = parse_inbound(frame).unwrap_err();
        assert!(err.is_preview());
    }

    #[test]
    fn test_final_frame_string_fields() {
        let frame = r#"{"command":"final_image","base64":"data:image/webp;base64,BB",
            "seed":" 42 ","tags":"1girl, solo","keep_gallery":"False","final_infos":" [color=red]ok[/color] "}"#;
        let Inbound::Final(image) = parse_inbound(frame).unwrap() else {
            panic!("expected final image");
        };
        assert_eq!(image.seed, "42");
        assert_eq!(image.tags, "1girl, solo");
        assert!(!image.keep_gallery);
        assert_eq!(image.final_infos.as_deref(), Some("[color=red]ok[/color]"));
    }

    #[test]
    fn test_final_frame_typed_fields() {
        let frame = r#"{"command":"final_image","base64":"data:image/png;base64,CC",
            "seed":123456789,"tags":"x","keep_gallery":true}"#;
        let Inbound::Final(image) = parse_inbound(frame).unwrap() else {
            panic!("expected final image");
        };
        assert_eq!(image.seed, "123456789");
        assert!(image.keep_gallery);
        assert_eq!(image.final_infos, None);

        let frame = r#"{"command":"final_image","base64":"data:image/png;base64,CC",
            "seed":"1","tags":"x","keep_gallery":"True"}"#;
        let Inbound::Final(image) = parse_inbound(frame).unwrap() else {
            panic!("expected final image");
        };
        assert!(image.keep_gallery);
    }

    #[test]
    fn test_final_frame_missing_fields() {
        let frame = r#"{"command":"final_image","base64":"data:image/png;base64,CC","tags":"x","keep_gallery":"True"}"#;
        assert!(matches!(
            parse_inbound(frame),
            Err(ProtocolError::MissingField { field: "seed", .. })
        ));
        let frame = r#"{"command":"final_image","base64":"data:image/png;base64,CC","seed":"1","keep_gallery":"True"}"#;
        assert!(matches!(
            parse_inbound(frame),
            Err(ProtocolError::MissingField { field: "tags", .. })
        ));
        let frame = r#"{"command":"final_image","base64":"data:image/png;base64,CC","seed":"1","tags":"x"}"#;
        assert!(matches!(
            parse_inbound(frame),
            Err(ProtocolError::MissingField { field: "keep_gallery", .. })
        ));
    }

    #[test]
    fn test_command_errors() {
        assert!(matches!(parse_inbound("{"), Err(ProtocolError::InvalidJson(_))));
        assert!(matches!(
            parse_inbound(r#"{"command":5}"#),
            Err(ProtocolError::MissingCommand)
        ));
        assert!(matches!(
            parse_inbound(r#"{"base64":"x"}"#),
            Err(ProtocolError::MissingCommand)
        ));
        assert!(matches!(
            parse_inbound(r#"{"command":"reboot"}"#),
            Err(ProtocolError::UnknownCommand(c)) if c == "reboot"
        ));
    }

    #[test]
    fn test_ack_encoding() {
        let ack = Outbound::FinalImageAck {
            seed: "42".to_string(),
        };
        assert_eq!(
            ack.to_json().unwrap(),
            r#"{"command":"final_image_ack","seed":"42"}"#
        );
    }
}
