//! Layout analysis: grouping positioned runs into fragments and blocks.
//!
//! Runs on the same baseline form a line; adjacent runs of one line that
//! share a font and size are merged into a single fragment; consecutive
//! lines form a block until the spacing, font size or left edge changes.

use std::cmp::Ordering;

use crate::model::{Fragment, TextBlock};

use super::content::TextRun;

/// Baseline tolerance for grouping runs into a line, as a fraction of the font size.
const LINE_TOLERANCE: f32 = 0.3;

/// Gap (fraction of the average character width) above which merged runs get a space.
const SPACE_GAP_RATIO: f32 = 0.2;

/// Baseline distance, in multiples of the font size, that ends a block.
const BLOCK_SPACING_RATIO: f32 = 1.6;

/// Font size change in points that ends a block.
const BLOCK_FONT_SIZE_DELTA: f32 = 1.0;

/// Left edge movement in points that ends a block.
const BLOCK_INDENT_DELTA: f32 = 20.0;

/// A text line: fragments on one baseline, sorted left to right.
#[derive(Debug, Clone)]
struct TextLine {
    fragments: Vec<Fragment>,
    baseline: f32,
    x: f32,
    font_size: f32,
}

impl TextLine {
    fn from_runs(mut runs: Vec<TextRun>, page_index: usize) -> Option<Self> {
        runs.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal));

        let baseline = runs.first()?.baseline;

        // Dominant font size, weighted by text length
        let total_chars: usize = runs.iter().map(|r| r.text.chars().count()).sum();
        let weighted: f32 = runs
            .iter()
            .map(|r| r.font_size * r.text.chars().count() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted / total_chars as f32
        } else {
            runs[0].font_size
        };

        let fragments = merge_runs(runs, page_index);
        let x = fragments.first()?.bbox.x0;

        Some(Self {
            fragments,
            baseline,
            x,
            font_size,
        })
    }
}

/// Group a page's runs into text blocks in reading order.
pub fn build_blocks(runs: Vec<TextRun>, page_index: usize) -> Vec<TextBlock> {
    let lines = group_runs_into_lines(runs, page_index);
    group_lines_into_blocks(lines, page_index)
}

fn group_runs_into_lines(mut runs: Vec<TextRun>, page_index: usize) -> Vec<TextLine> {
    runs.retain(|r| !r.text.trim().is_empty());
    if runs.is_empty() {
        return Vec::new();
    }

    // Top to bottom, then left to right
    runs.sort_by(|a, b| {
        a.baseline
            .partial_cmp(&b.baseline)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap_or(Ordering::Equal))
    });

    let mut lines = Vec::new();
    let mut current: Vec<TextRun> = Vec::new();
    let mut current_baseline = runs[0].baseline;

    for run in runs {
        let tolerance = run.font_size.max(1.0) * LINE_TOLERANCE;
        if current.is_empty() || (run.baseline - current_baseline).abs() <= tolerance {
            if current.is_empty() {
                current_baseline = run.baseline;
            }
            current.push(run);
        } else {
            lines.extend(TextLine::from_runs(std::mem::take(&mut current), page_index));
            current_baseline = run.baseline;
            current.push(run);
        }
    }
    lines.extend(TextLine::from_runs(current, page_index));

    lines
}

/// Merge adjacent runs of the same font into fragments.
///
/// Runs are only merged when they touch or nearly touch; a visible gap
/// larger than one character starts a new fragment.
fn merge_runs(runs: Vec<TextRun>, page_index: usize) -> Vec<Fragment> {
    let mut fragments: Vec<Fragment> = Vec::new();

    for run in runs {
        let avg_char_width = average_char_width(&run);

        if let Some(last) = fragments.last_mut() {
            let gap = run.bbox.x0 - last.bbox.x1;
            let same_style = last.font_name == run.font_name
                && (last.font_size - run.font_size).abs() < 0.01;

            if same_style && gap <= avg_char_width && gap >= -avg_char_width {
                if needs_space(&last.text, &run.text, gap, avg_char_width) {
                    last.text.push(' ');
                }
                last.text.push_str(&run.text);
                last.bbox = last.bbox.union(&run.bbox);
                continue;
            }
        }

        fragments.push(Fragment::new(
            run.text,
            run.bbox,
            run.font_name,
            run.font_size,
            page_index,
        ));
    }

    fragments
}

fn average_char_width(run: &TextRun) -> f32 {
    let char_count = run.text.chars().count();
    if char_count > 0 && run.bbox.width() > 0.0 {
        run.bbox.width() / char_count as f32
    } else {
        run.font_size * 0.5
    }
}

/// Whether to insert a space between two merged runs.
///
/// No space is added between characters of scripts written without word
/// spaces.
fn needs_space(prev: &str, curr: &str, gap: f32, avg_char_width: f32) -> bool {
    if gap <= avg_char_width * SPACE_GAP_RATIO {
        return false;
    }

    let prev_ends_with_space = prev.ends_with(' ') || prev.ends_with('\u{00A0}');
    let curr_starts_with_space = curr.starts_with(' ') || curr.starts_with('\u{00A0}');
    if prev_ends_with_space || curr_starts_with_space {
        return false;
    }

    let prev_spaceless = prev.chars().last().map(is_spaceless_script_char).unwrap_or(false);
    let curr_spaceless = curr.chars().next().map(is_spaceless_script_char).unwrap_or(false);
    !(prev_spaceless && curr_spaceless)
}

fn group_lines_into_blocks(lines: Vec<TextLine>, page_index: usize) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line) {
                blocks.push(lines_to_block(std::mem::take(&mut current), page_index));
            }
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(lines_to_block(current, page_index));
    }

    blocks
}

fn lines_to_block(lines: Vec<TextLine>, page_index: usize) -> TextBlock {
    let fragments = lines.into_iter().flat_map(|l| l.fragments).collect();
    TextBlock::new(fragments, page_index)
}

/// Determine if there should be a block break between two lines.
fn should_break_block(prev: &TextLine, curr: &TextLine) -> bool {
    let spacing = curr.baseline - prev.baseline;
    let size = prev.font_size.max(curr.font_size);
    if spacing > size * BLOCK_SPACING_RATIO {
        return true;
    }

    if (curr.font_size - prev.font_size).abs() > BLOCK_FONT_SIZE_DELTA {
        return true;
    }

    (curr.x - prev.x).abs() > BLOCK_INDENT_DELTA
}

/// Check if a character belongs to a script that doesn't use spaces between words.
///
/// Hangul is excluded: Korean separates words with spaces.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs
    (0x4E00..=0x9FFF).contains(&code)
    // Extension A
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana
    || (0x3040..=0x309F).contains(&code)
    // Katakana
    || (0x30A0..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}
