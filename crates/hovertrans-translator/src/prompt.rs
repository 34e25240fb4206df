/// Display name of a language tag, used inside prompts
pub fn language_name(code: &str) -> &str {
    match code {
        "th" => "Thai",
        "en" => "English",
        "ja" => "Japanese",
        "ko" => "Korean",
        "vi" => "Vietnamese",
        "ru" => "Russian",
        "zh" => "Chinese",
        "ar" => "Arabic",
        other => other,
    }
}

pub fn translation_prompt(text: &str, from: Option<&str>, to: &str) -> String {
    let source = from.map(|f| format!("{} ", language_name(f))).unwrap_or_default();
    format!(
        "Translate the following {}text into {}. Reply with the translation only, \
         without any extra explanation, markup or formatting:\n\n{}",
        source,
        language_name(to),
        text
    )
}

pub fn suggestion_prompt(error_message: &str) -> String {
    format!(
        "As a technical support assistant, analyse the following error message and give a \
         concise remediation suggestion (no more than 100 words):\n\n{error_message}"
    )
}
