//! Highlight colors and options.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parallel::SplitOptions;
use crate::parser::{ErrorMode, ExtractOptions};

/// Minimum number of fragments before highlighting is split across workers.
pub const DEFAULT_MIN_PARALLEL_FRAGMENTS: usize = 10;

/// An RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a color, validating each component.
    pub fn new(r: f32, g: f32, b: f32) -> Result<Self> {
        for c in [r, g, b] {
            if !c.is_finite() || !(0.0..=1.0).contains(&c) {
                return Err(Error::InvalidColor(format!(
                    "component {} is outside [0, 1]",
                    c
                )));
            }
        }
        Ok(Self { r, g, b })
    }

    /// Yellow `(1, 1, 0)`.
    pub const fn yellow() -> Self {
        Self {
            r: 1.0,
            g: 1.0,
            b: 0.0,
        }
    }

    /// Parse `"r,g,b"`; extra components are ignored.
    pub fn parse(s: &str) -> Result<Self> {
        let components = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f32>()
                    .map_err(|_| Error::InvalidColor(format!("'{}' is not a number", part.trim())))
            })
            .collect::<Result<Vec<f32>>>()?;

        match components.as_slice() {
            [r, g, b, ..] => Self::new(*r, *g, *b),
            _ => Err(Error::InvalidColor(format!(
                "expected three components, got {}",
                components.len()
            ))),
        }
    }

    /// Components as an array.
    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::yellow()
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

/// Options for writing highlight annotations.
#[derive(Debug, Clone)]
pub struct HighlightOptions {
    /// Highlight color
    pub color: Color,

    /// Fill opacity of the highlight
    pub opacity: f32,

    /// Output path (default: `<stem>_highlighted.pdf` next to the source)
    pub output_path: Option<PathBuf>,

    /// Fewest fragments for which the partitioned path is used
    pub min_parallel_fragments: usize,

    /// Page-range splitting
    pub split: SplitOptions,

    /// How pages that fail to interpret are handled when text is searched
    pub error_mode: ErrorMode,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            color: Color::yellow(),
            opacity: 1.0,
            output_path: None,
            min_parallel_fragments: DEFAULT_MIN_PARALLEL_FRAGMENTS,
            split: SplitOptions::default(),
            error_mode: ErrorMode::default(),
        }
    }
}

impl HighlightOptions {
    /// Create highlight options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the highlight color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the opacity, clamped to `[0, 1]`.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self
    }

    /// Set the output path.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Set the fragment threshold for partitioned highlighting.
    pub fn with_min_parallel_fragments(mut self, count: usize) -> Self {
        self.min_parallel_fragments = count;
        self
    }

    /// Disable partitioned highlighting.
    pub fn sequential(mut self) -> Self {
        self.split = self.split.sequential();
        self
    }

    /// Replace the split options wholesale.
    pub fn with_split(mut self, split: SplitOptions) -> Self {
        self.split = split;
        self
    }

    /// Skip pages that fail to interpret instead of failing.
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Extraction options matching these highlight options.
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions::new()
            .with_split(self.split.clone())
            .with_error_mode(self.error_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse() {
        assert_eq!(Color::parse("1,1,0").unwrap(), Color::yellow());
        assert_eq!(
            Color::parse(" 0.5, 0.25 ,1 ").unwrap(),
            Color::new(0.5, 0.25, 1.0).unwrap()
        );
        assert_eq!("0,1,0".parse::<Color>().unwrap().to_array(), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_color_parse_errors() {
        assert!(matches!(Color::parse("1,0"), Err(Error::InvalidColor(_))));
        assert!(matches!(Color::parse("red"), Err(Error::InvalidColor(_))));
        assert!(matches!(Color::parse("2,0,0"), Err(Error::InvalidColor(_))));
        assert!(matches!(Color::new(f32::NAN, 0.0, 0.0), Err(Error::InvalidColor(_))));
    }

    #[test]
    fn test_color_display_round_trips() {
        let color = Color::new(0.5, 0.0, 1.0).unwrap();
        assert_eq!(Color::parse(&color.to_string()).unwrap(), color);
    }

    #[test]
    fn test_highlight_options_builder() {
        let options = HighlightOptions::new()
            .with_color(Color::new(0.0, 1.0, 0.0).unwrap())
            .with_opacity(1.5)
            .with_output_path("/tmp/out.pdf")
            .with_min_parallel_fragments(3)
            .sequential();

        assert_eq!(options.color.g, 1.0);
        assert_eq!(options.opacity, 1.0);
        assert_eq!(options.output_path, Some(PathBuf::from("/tmp/out.pdf")));
        assert_eq!(options.min_parallel_fragments, 3);
        assert!(!options.split.parallel);
        assert_eq!(options.error_mode, ErrorMode::Strict);
    }

    #[test]
    fn test_extract_options_follow_highlight_options() {
        let options = HighlightOptions::new().lenient().sequential();
        let extract = options.extract_options();
        assert_eq!(extract.error_mode, ErrorMode::Lenient);
        assert!(!extract.split.parallel);
    }
}
