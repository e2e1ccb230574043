use payintensity_client::ClientError;

pub fn render_error(error: &ClientError) -> String {
    let mut lines = vec![
        "The run stopped before finishing.".to_string(),
        String::new(),
        format!("  Error:    {}", error.code),
        format!("  Details:  {}", error.message),
    ];

    if let Some(tabular) = error
        .data
        .as_ref()
        .and_then(|data| data.get("tabular_output"))
        .and_then(|value| value.as_str())
    {
        lines.push(format!("  Written:  {tabular}"));
    }

    lines.push(String::new());
    lines.push("What to do next:".to_string());
    if error.recovery_steps.is_empty() {
        lines.push("  1. Rerun with `-v` and report the log if the error persists.".to_string());
    } else {
        for (index, step) in error.recovery_steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", index + 1));
        }
    }

    lines.join("\n")
}
