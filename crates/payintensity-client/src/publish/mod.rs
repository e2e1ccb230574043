pub mod script;
pub mod splice;
pub mod tabular;

use std::fs;
use std::path::Path;

use crate::{ClientError, ClientResult};

pub fn format_metric(value: Option<f64>) -> String {
    value.map(|value| format!("{value:.2}")).unwrap_or_default()
}

pub(crate) fn write_artifact(path: &Path, content: &str) -> ClientResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|error| ClientError::output_write_failed(path, &error.to_string()))?;
    }
    fs::write(path, content).map_err(|error| ClientError::output_write_failed(path, &error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::format_metric;

    #[test]
    fn formats_with_two_decimals_or_empty() {
        assert_eq!(format_metric(Some(200.0)), "200.00");
        assert_eq!(format_metric(Some(0.0)), "0.00");
        assert_eq!(format_metric(Some(33.33)), "33.33");
        assert_eq!(format_metric(None), "");
    }
}
