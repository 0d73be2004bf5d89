//! Inline layout and the line box model.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block."
//!
//! An inline formatting context accumulates text runs and atomic
//! inline-level boxes (inline-blocks) into line boxes, breaking lines with
//! advance widths supplied by the font collaborator. The finished IFC is
//! flushed into the box tree and painted after its stacking context's block
//! backgrounds.

use bilby_common::units::{Rect, Unit};
use bilby_dom::ElementId;

use crate::values::Rgba;

use super::box_tree::{BlockIndex, BlockRef};

/// One shaped glyph of a text run.
///
/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapedGlyph {
    /// The character this glyph renders.
    pub character: char,
    /// Horizontal advance of the glyph, in layout units.
    pub advance: Unit,
}

/// Font metrics interface for text measurement during layout.
///
/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// "CSS assumes that every font has font metrics that specify a
/// characteristic height above the baseline and a depth below it."
///
/// The handle is read-only and never calls back into the engine. Shaping
/// is the host's business; the default [`FontHandle::shape_text`] maps
/// characters to glyph advances one-to-one for hosts without a shaper.
pub trait FontHandle {
    /// The advance width of a single character's glyph.
    fn glyph_advance(&self, character: char) -> Unit;

    /// Height above the baseline.
    fn ascender(&self) -> Unit;

    /// Depth below the baseline.
    fn descender(&self) -> Unit;

    /// Shape a text run into a glyph sequence.
    fn shape_text(&self, text: &str) -> Vec<ShapedGlyph> {
        text.chars()
            .map(|character| ShapedGlyph {
                character,
                advance: self.glyph_advance(character),
            })
            .collect()
    }
}

/// Fixed-metric font for tests and hosts without real font data.
///
/// Implementation note: a proportional Latin font averages roughly 0.5×
/// the em size per glyph; the defaults approximate a 16px em.
#[derive(Debug, Clone, Copy)]
pub struct ApproximateFont {
    /// Advance used for every glyph.
    pub advance: Unit,
    /// Ascender height.
    pub ascent: Unit,
    /// Descender depth.
    pub descent: Unit,
}

impl Default for ApproximateFont {
    fn default() -> Self {
        Self {
            advance: bilby_common::units::units(8.0),
            ascent: bilby_common::units::units(12.0),
            descent: bilby_common::units::units(4.0),
        }
    }
}

impl FontHandle for ApproximateFont {
    fn glyph_advance(&self, _character: char) -> Unit {
        self.advance
    }

    fn ascender(&self) -> Unit {
        self.ascent
    }

    fn descender(&self) -> Unit {
        self.descent
    }
}

/// A contiguous run of shaped text placed on one line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// The run's text.
    pub text: String,
    /// The run's shaped glyphs.
    pub glyphs: Vec<ShapedGlyph>,
    /// The text element the run came from.
    pub element: ElementId,
    /// Foreground color, written by the cosmetic pass.
    pub color: Rgba,
}

/// The content of one placed inline fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentContent {
    /// A run of text.
    Text(TextRun),
    /// [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    /// An atomic inline-level box; the index names the subtree-proxy block
    /// holding its flow.
    InlineBlock(BlockIndex),
}

/// A fragment of inline content placed on a line.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineFragment {
    /// Position and extent, relative to the IFC container's content box.
    pub rect: Rect,
    /// Distance from the fragment's top to its baseline. Atoms sit on the
    /// baseline, so theirs equals their height.
    pub ascent: Unit,
    /// What was placed.
    pub content: FragmentContent,
}

/// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// "The rectangular area that contains the boxes that form a line is
/// called a line box."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBox {
    /// The line's bounds, relative to the IFC container's content box.
    pub bounds: Rect,
    /// Baseline position, relative to the line's top.
    pub baseline: Unit,
    /// Index of the line's first fragment.
    pub fragments_start: u32,
    /// One past the line's last fragment.
    pub fragments_end: u32,
}

/// A finished inline formatting context.
#[derive(Debug, Default)]
pub struct InlineFormattingContext {
    /// The block hosting this IFC.
    pub parent_block: Option<BlockRef>,
    /// All fragments, in placement order; line boxes index into this.
    pub fragments: Vec<InlineFragment>,
    /// The lines, top to bottom.
    pub line_boxes: Vec<LineBox>,
    /// Total content height (the bottom of the last line).
    pub content_height: Unit,
    /// Widest line advance; shrink-to-fit sizing reads this.
    pub max_line_width: Unit,
}

/// Line-building state for one IFC under construction.
///
/// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// "When the total width of the inline-level boxes on a line is less than
/// the width of the line box containing them..." — fragments accumulate at
/// `cursor_x`; crossing `available_width` at a soft wrap opportunity
/// finalizes the line and opens the next one.
#[derive(Debug)]
pub struct LineBuilder {
    fragments: Vec<InlineFragment>,
    line_boxes: Vec<LineBox>,
    /// First fragment of the current line.
    line_start: usize,
    /// Horizontal position where the next fragment lands.
    cursor_x: Unit,
    /// Top of the current line.
    line_top: Unit,
    /// Tallest ascent on the current line.
    line_ascent: Unit,
    /// Deepest descent on the current line.
    line_descent: Unit,
    /// Wrap limit.
    available_width: Unit,
    /// Widest finished line.
    max_line_width: Unit,
}

impl LineBuilder {
    /// Start building lines within `available_width`.
    #[must_use]
    pub const fn new(available_width: Unit) -> Self {
        Self {
            fragments: Vec::new(),
            line_boxes: Vec::new(),
            line_start: 0,
            cursor_x: 0,
            line_top: 0,
            line_ascent: 0,
            line_descent: 0,
            available_width,
            max_line_width: 0,
        }
    }

    /// Whether anything sits on the current line.
    #[must_use]
    pub const fn line_has_content(&self) -> bool {
        self.cursor_x > 0 || self.fragments.len() > self.line_start
    }

    /// Place a run of text, breaking at word boundaries.
    ///
    /// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    ///
    /// Whitespace collapses to single spaces; a word that exceeds the
    /// available width on a fresh line is placed anyway (no mid-word
    /// breaking).
    pub fn place_text(
        &mut self,
        element: ElementId,
        text: &str,
        font: &dyn FontHandle,
    ) -> Result<(), super::LayoutError> {
        let space_advance = font.glyph_advance(' ');
        let ascent = font.ascender();
        let descent = font.descender();

        // The run currently being accumulated on this line.
        let mut run_text = String::new();
        let mut run_glyphs: Vec<ShapedGlyph> = Vec::new();
        let mut run_start_x = self.cursor_x;
        let mut run_width: Unit = 0;

        for word in text.split_ascii_whitespace() {
            let glyphs = font.shape_text(word);
            let word_width: Unit = glyphs.iter().map(|g| g.advance).sum();
            let space = if run_text.is_empty() { 0 } else { space_advance };

            if self.cursor_x + space + word_width > self.available_width
                && self.line_has_content()
            {
                // Flush the partial run and wrap.
                self.flush_text_run(
                    element, &mut run_text, &mut run_glyphs, run_start_x, run_width, ascent,
                    descent,
                )?;
                self.finish_line();
                run_start_x = 0;
                run_width = 0;
            } else if !run_text.is_empty() {
                run_text.push(' ');
                run_glyphs.push(ShapedGlyph {
                    character: ' ',
                    advance: space_advance,
                });
                run_width += space_advance;
                self.cursor_x += space_advance;
            }

            run_text.push_str(word);
            run_glyphs.extend_from_slice(&glyphs);
            run_width += word_width;
            self.cursor_x += word_width;
        }

        self.flush_text_run(
            element, &mut run_text, &mut run_glyphs, run_start_x, run_width, ascent, descent,
        )
    }

    /// Emit the accumulated text as one fragment of the current line.
    #[allow(clippy::too_many_arguments)]
    fn flush_text_run(
        &mut self,
        element: ElementId,
        text: &mut String,
        glyphs: &mut Vec<ShapedGlyph>,
        start_x: Unit,
        width: Unit,
        ascent: Unit,
        descent: Unit,
    ) -> Result<(), super::LayoutError> {
        if text.is_empty() {
            return Ok(());
        }
        self.check_capacity()?;
        self.line_ascent = self.line_ascent.max(ascent);
        self.line_descent = self.line_descent.max(descent);
        self.fragments.push(InlineFragment {
            // Vertical placement happens when the line is finished.
            rect: Rect::new(start_x, 0, width, ascent + descent),
            ascent,
            content: FragmentContent::Text(TextRun {
                text: std::mem::take(text),
                glyphs: std::mem::take(glyphs),
                element,
                color: Rgba::BLACK,
            }),
        });
        Ok(())
    }

    /// Place an atomic inline-level box (an inline-block's margin box).
    ///
    /// [§ 10.8.1](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// The atom's baseline is its bottom margin edge.
    pub fn place_atom(
        &mut self,
        proxy: BlockIndex,
        width: Unit,
        height: Unit,
    ) -> Result<(), super::LayoutError> {
        if self.cursor_x + width > self.available_width && self.line_has_content() {
            self.finish_line();
        }
        self.check_capacity()?;
        self.line_ascent = self.line_ascent.max(height);
        self.fragments.push(InlineFragment {
            rect: Rect::new(self.cursor_x, 0, width, height),
            ascent: height,
            content: FragmentContent::InlineBlock(proxy),
        });
        self.cursor_x += width;
        Ok(())
    }

    /// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
    ///
    /// Close the current line: fix every fragment's vertical position
    /// against the line's baseline and open the next line.
    pub fn finish_line(&mut self) {
        if self.fragments.len() == self.line_start && self.cursor_x == 0 {
            return;
        }

        let baseline = self.line_ascent;
        let line_height = self.line_ascent + self.line_descent;

        // "Align the baseline of the box with the baseline of the parent
        // box" — every fragment hangs from the shared baseline.
        for fragment in &mut self.fragments[self.line_start..] {
            fragment.rect.y = self.line_top + baseline - fragment.ascent;
        }

        #[allow(clippy::cast_possible_truncation)]
        self.line_boxes.push(LineBox {
            bounds: Rect::new(0, self.line_top, self.cursor_x, line_height),
            baseline,
            fragments_start: self.line_start as u32,
            fragments_end: self.fragments.len() as u32,
        });

        self.max_line_width = self.max_line_width.max(self.cursor_x);
        self.line_top += line_height;
        self.line_start = self.fragments.len();
        self.cursor_x = 0;
        self.line_ascent = 0;
        self.line_descent = 0;
    }

    /// Close the last line and produce the finished IFC.
    #[must_use]
    pub fn finish(mut self, parent_block: BlockRef) -> InlineFormattingContext {
        self.finish_line();
        InlineFormattingContext {
            parent_block: Some(parent_block),
            content_height: self.line_top,
            max_line_width: self.max_line_width,
            fragments: self.fragments,
            line_boxes: self.line_boxes,
        }
    }

    fn check_capacity(&self) -> Result<(), super::LayoutError> {
        if self.fragments.len() >= usize::from(u16::MAX) {
            return Err(super::LayoutError::TooManyInlineBoxes);
        }
        Ok(())
    }
}
