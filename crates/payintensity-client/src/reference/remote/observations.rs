use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Observation {
    pub(crate) code: String,
    pub(crate) year: i32,
    pub(crate) value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ObservationPage {
    pub(crate) pages: u32,
    pub(crate) observations: Vec<Observation>,
}

pub(crate) fn parse_page(body: &str) -> Result<ObservationPage, String> {
    let parsed = serde_json::from_str::<Value>(body)
        .map_err(|error| format!("response is not JSON: {error}"))?;
    let Some(parts) = parsed.as_array() else {
        return Err("response is not a JSON array".to_string());
    };

    // `[{"message": [...]}]` is how the API answers an unknown key: no data.
    let metadata = parts.first();
    if metadata.is_some_and(|meta| meta.get("message").is_some()) {
        return Ok(ObservationPage {
            pages: 1,
            observations: Vec::new(),
        });
    }

    let pages = metadata
        .and_then(|meta| meta.get("pages"))
        .and_then(read_u32)
        .unwrap_or(1);

    let observations = parts
        .get(1)
        .and_then(Value::as_array)
        .map(|records| records.iter().filter_map(read_observation).collect())
        .unwrap_or_default();

    Ok(ObservationPage {
        pages,
        observations,
    })
}

fn read_observation(record: &Value) -> Option<Observation> {
    let code = record
        .get("countryiso3code")
        .and_then(Value::as_str)
        .filter(|code| !code.is_empty())?
        .to_string();
    let year = record
        .get("date")
        .and_then(Value::as_str)
        .and_then(|date| date.trim().parse::<i32>().ok())?;
    let value = record
        .get("value")
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite() && *value >= 0.0);
    Some(Observation { code, year, value })
}

fn read_u32(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|text| text.parse().ok()))
        .and_then(|number| u32::try_from(number).ok())
}

#[cfg(test)]
mod tests {
    use super::{ObservationPage, parse_page};

    #[test]
    fn reads_records_and_page_count() {
        let body = r#"[
            {"page":1,"pages":2,"per_page":50,"total":60},
            [
                {"countryiso3code":"ARG","date":"2024","value":46000000},
                {"countryiso3code":"ARG","date":"2023","value":null}
            ]
        ]"#;
        let page = parse_page(body);
        assert!(page.is_ok());
        if let Ok(page) = page {
            assert_eq!(page.pages, 2);
            assert_eq!(page.observations.len(), 2);
            assert_eq!(page.observations[0].code, "ARG");
            assert_eq!(page.observations[0].year, 2024);
            assert_eq!(page.observations[0].value, Some(46_000_000.0));
            assert_eq!(page.observations[1].value, None);
        }
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let page = parse_page(r#"[{"page":0,"pages":0,"total":0}, null]"#);
        assert!(page.is_ok());
        if let Ok(page) = page {
            assert!(page.observations.is_empty());
        }
    }

    #[test]
    fn api_message_for_unknown_key_reads_as_empty_page() {
        let page = parse_page(
            r#"[{"message":[{"id":"120","key":"Invalid value","value":"The provided parameter value is not valid"}]}]"#,
        );
        assert_eq!(
            page,
            Ok(ObservationPage {
                pages: 1,
                observations: Vec::new(),
            })
        );
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_page("<html>").is_err());
        assert!(parse_page(r#"{"a":1}"#).is_err());
    }
}
