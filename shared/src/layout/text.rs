use super::{Size, StyledText, TextMeasurer, TextStyle};

/// Deterministic measurer: every character advances by
/// `font_size * advance_ratio`, words wrap greedily, over-long words are
/// hard-broken and `\n` starts a new line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMeasurer {
    pub advance_ratio: f64,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self { advance_ratio: 0.5 }
    }
}

impl MonospaceMeasurer {
    fn advance(&self, style: TextStyle) -> f64 {
        style.font_size * self.advance_ratio
    }

    /// Character count of every wrapped line.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn wrap_lines(&self, text: &str, style: TextStyle, max_width: f64) -> Vec<usize> {
        if text.is_empty() {
            return Vec::new();
        }

        let advance = self.advance(style);
        let max_chars = if advance > 0.0 && max_width.is_finite() {
            ((max_width / advance) + 1e-9).floor().max(1.0) as usize
        } else {
            usize::MAX
        };

        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut line = 0usize;
            for word in paragraph.split_whitespace() {
                let mut len = word.chars().count();
                if line > 0 && line + 1 + len <= max_chars {
                    line += 1 + len;
                    continue;
                }
                if line > 0 {
                    lines.push(line);
                }
                while len > max_chars {
                    lines.push(max_chars);
                    len -= max_chars;
                }
                line = len;
            }
            lines.push(line);
        }
        lines
    }

    fn size_of(&self, lines: &[usize], style: TextStyle) -> Size {
        let widest = lines.iter().copied().max().unwrap_or(0);
        Size::new(
            widest as f64 * self.advance(style),
            lines.len() as f64 * style.line_height,
        )
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &StyledText<'_>, max_width: f64) -> Size {
        let lines = self.wrap_lines(text.text, text.style, max_width);
        self.size_of(&lines, text.style)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn measure_clipped(&self, text: &StyledText<'_>, max_width: f64, max_height: f64) -> Size {
        let lines = self.wrap_lines(text.text, text.style, max_width);
        let line_height = text.style.line_height;
        let fit = if line_height > 0.0 {
            ((max_height / line_height) + 1e-9).floor().max(0.0) as usize
        } else {
            lines.len()
        };
        self.size_of(&lines[..lines.len().min(fit)], text.style)
    }

    fn fingerprint(&self) -> u64 {
        self.advance_ratio.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 10pt font at ratio 0.5 -> 5pt per char.
    const STYLE: TextStyle = TextStyle::new(10.0, 12.0);

    fn measurer() -> MonospaceMeasurer {
        MonospaceMeasurer::default()
    }

    #[test]
    fn empty_text_has_no_size() {
        let size = measurer().measure(&StyledText::new("", STYLE), 100.0);
        assert_eq!(size, Size::ZERO);
    }

    #[test]
    fn single_line_fits() {
        let size = measurer().measure(&StyledText::new("hello world", STYLE), 100.0);
        assert_eq!(size, Size::new(55.0, 12.0));
    }

    #[test]
    fn wraps_on_word_boundaries() {
        // 4 chars per line
        let lines = measurer().wrap_lines("ab cd ef", STYLE, 20.0);
        assert_eq!(lines, vec![2, 2, 2]);
        let lines = measurer().wrap_lines("a b c d", STYLE, 20.0);
        assert_eq!(lines, vec![3, 3]);
    }

    #[test]
    fn hard_breaks_long_words() {
        let lines = measurer().wrap_lines("abcdefghij", STYLE, 20.0);
        assert_eq!(lines, vec![4, 4, 2]);
    }

    #[test]
    fn newline_starts_new_line() {
        let lines = measurer().wrap_lines("one\n\ntwo", STYLE, 100.0);
        assert_eq!(lines, vec![3, 0, 3]);
    }

    #[test]
    fn fingerprint_follows_advance() {
        let wide = MonospaceMeasurer { advance_ratio: 1.0 };
        assert_eq!(measurer().fingerprint(), measurer().fingerprint());
        assert_ne!(measurer().fingerprint(), wide.fingerprint());
    }

    #[test]
    fn clipping_keeps_whole_lines() {
        let text = StyledText::new("aaaa bbbb cccc dddd", STYLE);
        let full = measurer().measure(&text, 20.0);
        let clipped = measurer().measure_clipped(&text, 20.0, 30.0);
        assert!((full.height - 48.0).abs() < f64::EPSILON);
        assert!((clipped.height - 24.0).abs() < f64::EPSILON);
    }
}
