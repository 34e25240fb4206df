/// Character classes used to guess the script of a piece of text
pub struct ScriptPattern {
    /// ISO 639-1 code
    pub code: &'static str,
    ranges: &'static [(char, char)],
}

impl ScriptPattern {
    pub fn matches(&self, c: char) -> bool {
        self.ranges.iter().any(|&(lo, hi)| (lo..=hi).contains(&c))
    }

    /// Score of `text`: 1 when the script appears at all, 0 otherwise
    pub fn count(&self, text: &str) -> usize {
        usize::from(text.chars().any(|c| self.matches(c)))
    }
}

/// Enumeration order decides ties
pub const SCRIPT_PATTERNS: [ScriptPattern; 8] = [
    ScriptPattern {
        code: "th",
        ranges: &[('\u{0E00}', '\u{0E7F}')],
    },
    ScriptPattern {
        code: "en",
        ranges: &[('a', 'z'), ('A', 'Z')],
    },
    ScriptPattern {
        code: "ja",
        ranges: &[('\u{3040}', '\u{309F}'), ('\u{30A0}', '\u{30FF}')],
    },
    ScriptPattern {
        code: "ko",
        ranges: &[('\u{AC00}', '\u{D7AF}'), ('\u{1100}', '\u{11FF}')],
    },
    ScriptPattern {
        code: "ru",
        ranges: &[('\u{0400}', '\u{04FF}')],
    },
    ScriptPattern {
        code: "ar",
        ranges: &[('\u{0600}', '\u{06FF}')],
    },
    ScriptPattern {
        code: "vi",
        ranges: &[('\u{1EA0}', '\u{1EF9}')],
    },
    ScriptPattern {
        code: "zh",
        ranges: &[('\u{4E00}', '\u{9FFF}'), ('\u{3400}', '\u{4DBF}')],
    },
];

/// Best-guess language tag: the pattern with the strictly greatest score,
/// so the first script present in enumeration order. `None` when nothing
/// matches.
pub fn classify(text: &str) -> Option<&'static str> {
    let mut best: Option<(&'static str, usize)> = None;

    for pattern in &SCRIPT_PATTERNS {
        let count = pattern.count(text);
        if count > best.map_or(0, |(_, n)| n) {
            best = Some((pattern.code, count));
        }
    }

    best.map(|(code, _)| code)
}
