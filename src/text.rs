//! Styled text: an ordered sequence of (text, style) runs.
//!
//! Adjacent runs with equal styles are merged on append, so two values built
//! by different call sequences but with the same final run sequence compare
//! equal and hash alike. All operations are pure; nothing here mutates a
//! shared buffer.

use crate::style::{Color, Fill};
use bitflags::bitflags;
use smartstring::alias::String as SmartString;
use std::hash::{Hash, Hasher};
use std::ops::Add;

// === Font ===

/// Slant variant of a [`Font`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FontStyle {
    /// Upright glyphs.
    #[default]
    Normal,
    /// Italic glyphs.
    Italic,
    /// Slanted upright glyphs.
    Oblique,
}

/// A font request: family, size, weight, slant.
///
/// The canvas never measures text itself; fonts travel to the text factory
/// untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    /// Family name.
    pub family: SmartString,
    /// Size in canvas units.
    pub size: f64,
    /// CSS-style weight (400 normal, 700 bold).
    pub weight: u16,
    /// Slant variant.
    pub style: FontStyle,
}

impl Font {
    /// A font with the given family at the given size, normal weight.
    pub fn new(family: &str, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
            weight: 400,
            style: FontStyle::Normal,
        }
    }

    /// Set the weight.
    pub fn weight(mut self, weight: u16) -> Self {
        self.weight = weight;
        self
    }

    /// Set the slant.
    pub fn style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }
}

impl Eq for Font {}

impl Hash for Font {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.family.hash(state);
        self.size.to_bits().hash(state);
        self.weight.hash(state);
        self.style.hash(state);
    }
}

// === Decoration ===

bitflags! {
    /// Which decoration lines are drawn through a run.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct DecorationLines: u8 {
        /// Underline.
        const UNDER = 1 << 0;
        /// Overline.
        const OVER = 1 << 1;
        /// Strike-through.
        const THROUGH = 1 << 2;
    }
}

/// Visual style of decoration lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DecorationStyle {
    /// A single solid line.
    #[default]
    Solid,
    /// Two parallel lines.
    Double,
    /// Dotted line.
    Dotted,
    /// Dashed line.
    Dashed,
    /// Wavy line.
    Wavy,
}

/// Decoration line thickness.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DecorationThickness {
    /// Let the font decide.
    #[default]
    FromFont,
    /// Absolute thickness in canvas units.
    Absolute(f64),
    /// Percentage of the font size.
    Percent(f32),
}

impl Eq for DecorationThickness {}

impl Hash for DecorationThickness {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            DecorationThickness::FromFont => 0u8.hash(state),
            DecorationThickness::Absolute(v) => {
                1u8.hash(state);
                v.to_bits().hash(state);
            }
            DecorationThickness::Percent(v) => {
                2u8.hash(state);
                v.to_bits().hash(state);
            }
        }
    }
}

/// Text decoration: line set, color, style, thickness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TextDecoration {
    /// Which lines are drawn.
    pub lines: DecorationLines,
    /// Line color, `None` to inherit the text color.
    pub color: Option<Color>,
    /// Line style.
    pub style: DecorationStyle,
    /// Line thickness.
    pub thickness: DecorationThickness,
}

impl TextDecoration {
    /// A solid underline.
    pub fn underline() -> Self {
        Self {
            lines: DecorationLines::UNDER,
            ..Default::default()
        }
    }

    /// A solid strike-through.
    pub fn strikethrough() -> Self {
        Self {
            lines: DecorationLines::THROUGH,
            ..Default::default()
        }
    }
}

// === TextStyle ===

/// The style of one text run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TextStyle {
    /// Font request, `None` for the ambient font.
    pub font: Option<Font>,
    /// Foreground fill, `None` for the ambient color.
    pub foreground: Option<Fill>,
    /// Background fill, `None` for no background.
    pub background: Option<Fill>,
    /// Decoration, `None` for undecorated text.
    pub decoration: Option<TextDecoration>,
}

impl TextStyle {
    /// The empty style: every channel inherited.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font.
    pub fn font(mut self, font: Font) -> Self {
        self.font = Some(font);
        self
    }

    /// Set the foreground fill.
    pub fn foreground(mut self, fill: impl Into<Fill>) -> Self {
        self.foreground = Some(fill.into());
        self
    }

    /// Set the background fill.
    pub fn background(mut self, fill: impl Into<Fill>) -> Self {
        self.background = Some(fill.into());
        self
    }

    /// Set the decoration.
    pub fn decoration(mut self, decoration: TextDecoration) -> Self {
        self.decoration = Some(decoration);
        self
    }
}

// === StyledText ===

/// One (text, style) run of a [`StyledText`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Run {
    text: SmartString,
    style: TextStyle,
}

impl Run {
    /// The run's text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The run's style.
    pub fn style(&self) -> &TextStyle {
        &self.style
    }
}

/// An immutable ordered sequence of styled text runs.
///
/// Always holds at least one run. Equality and hashing are structural over
/// the merged run sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyledText {
    runs: Vec<Run>,
}

impl StyledText {
    /// A single-run styled text.
    pub fn styled(text: &str, style: TextStyle) -> Self {
        Self {
            runs: vec![Run {
                text: text.into(),
                style,
            }],
        }
    }

    /// A single run with the default style.
    pub fn plain(text: &str) -> Self {
        Self::styled(text, TextStyle::default())
    }

    /// A single run with a foreground color.
    pub fn colored(text: &str, color: Color) -> Self {
        Self::styled(text, TextStyle::new().foreground(color))
    }

    /// Append a run, merging into the last run when the styles are equal.
    pub fn append(mut self, text: &str, style: TextStyle) -> Self {
        // `runs` is never empty, so the merge probe always has a target.
        let last = self.runs.len() - 1;
        if self.runs[last].style == style {
            self.runs[last].text.push_str(text);
        } else {
            self.runs.push(Run {
                text: text.into(),
                style,
            });
        }
        self
    }

    /// The concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// The merged runs in order.
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Number of merged runs.
    pub fn count(&self) -> usize {
        self.runs.len()
    }

    /// Fill the font channel of every run that has none.
    pub fn with_font(mut self, font: &Font) -> Self {
        for run in &mut self.runs {
            if run.style.font.is_none() {
                run.style.font = Some(font.clone());
            }
        }
        self
    }

    /// Fill the foreground channel of every run that has none.
    pub fn with_foreground(mut self, fill: impl Into<Fill>) -> Self {
        let fill = fill.into();
        for run in &mut self.runs {
            if run.style.foreground.is_none() {
                run.style.foreground = Some(fill.clone());
            }
        }
        self
    }

    /// Fill the background channel of every run that has none.
    pub fn with_background(mut self, fill: impl Into<Fill>) -> Self {
        let fill = fill.into();
        for run in &mut self.runs {
            if run.style.background.is_none() {
                run.style.background = Some(fill.clone());
            }
        }
        self
    }

    /// Fill the decoration channel of every run that has none.
    pub fn with_decoration(mut self, decoration: &TextDecoration) -> Self {
        for run in &mut self.runs {
            if run.style.decoration.is_none() {
                run.style.decoration = Some(decoration.clone());
            }
        }
        self
    }
}

impl Add for StyledText {
    type Output = StyledText;

    /// Concatenate two styled texts, merging equal styles at the seam.
    fn add(mut self, rhs: StyledText) -> StyledText {
        for run in rhs.runs {
            self = self.append(&run.text, run.style);
        }
        self
    }
}

impl From<&str> for StyledText {
    fn from(text: &str) -> Self {
        StyledText::plain(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_equal_styles_merge_into_one_run() {
        let red = TextStyle::new().foreground(Color::RED);
        let merged = StyledText::styled("a", red.clone()) + StyledText::styled("b", red);
        assert_eq!(merged.count(), 1);
        assert_eq!(merged.runs()[0].text(), "ab");
    }

    #[test]
    fn test_different_styles_stay_separate() {
        let combined = StyledText::colored("a", Color::RED) + StyledText::colored("b", Color::BLUE);
        assert_eq!(combined.count(), 2);
        assert_eq!(combined.text(), "ab");
    }

    #[test]
    fn test_merge_is_canonical_across_build_orders() {
        let red = TextStyle::new().foreground(Color::RED);
        let blue = TextStyle::new().foreground(Color::BLUE);

        let a = StyledText::styled("ab", red.clone()) + StyledText::styled("c", blue.clone());
        let b = StyledText::styled("a", red.clone())
            .append("b", red)
            .append("c", blue);

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_with_foreground_fills_only_missing() {
        let text = (StyledText::colored("a", Color::RED) + StyledText::plain("b"))
            .with_foreground(Color::BLUE);
        assert_eq!(
            text.runs()[0].style().foreground,
            Some(Fill::Solid(Color::RED))
        );
        assert_eq!(
            text.runs()[1].style().foreground,
            Some(Fill::Solid(Color::BLUE))
        );
    }

    #[test]
    fn test_with_font_can_merge_runs_indirectly() {
        // Same text joined after styling stays two runs when fonts differ.
        let font = Font::new("serif", 12.0);
        let styled = StyledText::plain("a").with_font(&font) + StyledText::plain("b");
        assert_eq!(styled.count(), 2);
    }

    #[test]
    fn test_text_joins_runs() {
        let t = StyledText::colored("hello ", Color::RED) + StyledText::colored("world", Color::BLUE);
        assert_eq!(t.text(), "hello world");
    }
}
