use std::io;

use payintensity_client::contracts::envelope::failure_from_error;
use payintensity_client::{ClientError, SuccessEnvelope};
use serde::Serialize;

pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    if !matches!(
        success.command.as_str(),
        "normalize" | "publish script" | "codes check"
    ) {
        return Err(io::Error::other(format!(
            "JSON output is not supported for command `{}`",
            success.command
        )));
    }
    serialize_json_pretty(success)
}

pub fn render_error_json(error: &ClientError) -> io::Result<String> {
    serialize_json_pretty(&failure_from_error(error))
}

fn serialize_json_pretty<T>(value: &T) -> io::Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use payintensity_client::{ClientError, SuccessEnvelope};
    use serde_json::{Value, json};

    use super::{render_error_json, render_success_json};

    fn success(command: &str, data: Value) -> SuccessEnvelope {
        SuccessEnvelope {
            ok: true,
            command: command.to_string(),
            version: "0.1.0".to_string(),
            data,
        }
    }

    #[test]
    fn success_json_wraps_command_data() {
        let payload = success("codes check", json!({ "unmapped": ["Atlantis"] }));
        let rendered = render_success_json(&payload);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(value["ok"], Value::Bool(true));
                assert_eq!(value["version"], Value::String("0.1.0".to_string()));
                assert_eq!(value["command"], Value::String("codes check".to_string()));
                assert_eq!(value["data"]["unmapped"][0], Value::String("Atlantis".to_string()));
            }
        }
    }

    #[test]
    fn unknown_command_is_rejected() {
        let rendered = render_success_json(&success("import", json!({})));
        assert!(rendered.is_err());
    }

    #[test]
    fn error_json_carries_code_and_data() {
        let error = ClientError::new("malformed_input", "bad cell", vec!["fix it".to_string()])
            .with_data(json!({ "row": 3 }));
        let rendered = render_error_json(&error);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(value["ok"], Value::Bool(false));
                assert_eq!(value["error"]["code"], Value::String("malformed_input".to_string()));
                assert_eq!(value["data"]["row"], json!(3));
            }
        }
    }

    #[test]
    fn error_json_omits_missing_data() {
        let error = ClientError::invalid_argument("nope");
        let rendered = render_error_json(&error);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert!(value.get("data").is_none());
            }
        }
    }
}
