use hovertrans_types::NodeId;

use crate::dom::Document;
use crate::markup::TOOLTIP_CLASS;
use crate::suppress::{AUX_TITLE_ATTR, TITLE_ATTR, TitleRegistry};

/// Longest text ever handed to the classifier or translator
pub const MAX_TEXT_CHARS: usize = 500;

/// Select boxes, scripts, styles and our own tooltip never trigger a hover
pub fn is_eligible(doc: &Document, id: NodeId) -> bool {
    let Some(element) = doc.get(id) else {
        return false;
    };
    if matches!(element.tag.as_str(), "SELECT" | "SCRIPT" | "STYLE") {
        return false;
    }
    !doc.ancestors(id).any(|e| e.has_class(TOOLTIP_CLASS))
}

/// The single most relevant string of an element.
///
/// First non-empty wins: captured original title, parked title, `title`,
/// `alt`, field value or placeholder for inputs, `aria-label`, own text nodes,
/// full descendant text. Trimmed and cut to [`MAX_TEXT_CHARS`].
pub fn extract_text(doc: &Document, registry: &TitleRegistry, id: NodeId) -> String {
    let Some(element) = doc.get(id) else {
        return String::new();
    };

    let non_empty = |s: Option<&str>| s.filter(|s| !s.trim().is_empty()).map(str::to_string);

    let text = non_empty(registry.get(id))
        .or_else(|| non_empty(element.attribute(AUX_TITLE_ATTR)))
        .or_else(|| non_empty(element.attribute(TITLE_ATTR)))
        .or_else(|| non_empty(element.attribute("alt")))
        .or_else(|| {
            if !element.is_input_like() {
                return None;
            }
            non_empty(element.value.as_deref()).or_else(|| non_empty(element.attribute("placeholder")))
        })
        .or_else(|| non_empty(element.attribute("aria-label")))
        .or_else(|| non_empty(Some(doc.direct_text(id).as_str())))
        .unwrap_or_else(|| doc.text_content(id));

    truncate(text.trim())
}

/// Trimmed selection text, `None` when empty or too long to translate
pub fn selection_text(text: &str) -> Option<&str> {
    let text = text.trim();
    let len = text.chars().count();
    (len > 0 && len <= MAX_TEXT_CHARS).then_some(text)
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_TEXT_CHARS).collect()
}
