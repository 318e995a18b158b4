// ============================================================
// Layer 4 — Field Preprocessor
// ============================================================
// Normalises a single CSV cell before the missing-value check.
//
// News feeds carry Word/HTML leftovers:
//   - Non-breaking spaces (U+00A0), zero-width spaces (U+200B)
//   - Byte order marks (U+FEFF)
//   - Embedded tabs, carriage returns and newlines
//
// Titles and descriptions are single-line fields, so every one of
// these becomes a plain space, runs of spaces collapse to one and
// the ends are trimmed. A cell that is empty afterwards counts as
// missing.

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Collapse a raw cell into a single clean line.
    pub fn clean(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last_space = true;

        for c in text.chars() {
            let c = match c {
                '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                c if c.is_control() || c.is_whitespace() => ' ',
                c => c,
            };
            if c == ' ' {
                if !last_space {
                    out.push(' ');
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }

        // At most one trailing space can survive the loop
        if out.ends_with(' ') {
            out.pop();
        }
        out
    }

    /// Clean an optional cell; blank input becomes `None`.
    pub fn field(&self, raw: Option<&str>) -> Option<String> {
        raw.map(|s| self.clean(s)).filter(|s| !s.is_empty())
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
