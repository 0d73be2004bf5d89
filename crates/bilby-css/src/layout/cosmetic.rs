//! The cosmetic pass: colors, backgrounds, and border colors.
//!
//! [CSS Backgrounds and Borders Module Level 3](https://www.w3.org/TR/css-backgrounds-3/)
//!
//! A second traversal over the element tree, run after all geometry is
//! final. It resolves the cosmetic-stage computed values (text color,
//! background color/image/repeat/attachment/clip/origin/size/position,
//! border colors) and writes them into the box tree's cosmetic columns and
//! text runs. No geometry changes.

use std::collections::HashMap;

use bilby_common::units::{Rect, Size, Unit, Vector, units};
use bilby_dom::{Category, ElementId, ElementTree};

use crate::style::{Background, CascadedValueStore, StyleComputer};
use crate::values::{
    BackgroundAttachment, BackgroundBox, BackgroundImage, BackgroundPositionAxis,
    BackgroundPositionSide, BackgroundRepeat, BackgroundSize, BackgroundSizeValue, Display,
    LengthPercentage, Rgba,
};

use super::box_tree::{BlockRef, BoxOffsets, BoxTree};
use super::inline::FragmentContent;
use super::{ImageId, Images};

/// The resolved background of one block, ready to paint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackgroundPaint {
    /// [§ 3.10 'background-color'](https://www.w3.org/TR/css-backgrounds-3/#background-color)
    /// Painted over the clip area, beneath any image.
    pub color: Rgba,
    /// The background image layer, if one resolved.
    pub image: Option<ResolvedBackgroundImage>,
}

/// A background image with all placement values resolved to units.
///
/// Everything is relative to the block's border box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedBackgroundImage {
    /// The image in the host's image table.
    pub image: ImageId,
    /// Top-left of the first tile.
    pub position: Vector,
    /// One tile's extent.
    pub size: Size,
    /// Tiling along each axis.
    pub repeat: BackgroundRepeat,
    /// Scroll behavior.
    pub attachment: BackgroundAttachment,
    /// The painting area the image is clipped to.
    pub clip: Rect,
}

/// Resolved per-side border colors of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedBorderColors {
    /// Top border color.
    pub top: Rgba,
    /// Right border color.
    pub right: Rgba,
    /// Bottom border color.
    pub bottom: Rgba,
    /// Left border color.
    pub left: Rgba,
}

impl Default for ResolvedBorderColors {
    fn default() -> Self {
        Self {
            top: Rgba::TRANSPARENT,
            right: Rgba::TRANSPARENT,
            bottom: Rgba::TRANSPARENT,
            left: Rgba::TRANSPARENT,
        }
    }
}

/// Run the cosmetic pass over a laid-out box tree.
pub(crate) fn run_cosmetic(
    tree: &ElementTree,
    store: &CascadedValueStore,
    root: ElementId,
    images: &Images<'_>,
    box_tree: &mut BoxTree,
) {
    // Where each element's principal block landed.
    let mut blocks: HashMap<ElementId, BlockRef> = HashMap::new();
    for (subtree_index, subtree) in box_tree.subtrees.iter().enumerate() {
        for index in 0..subtree.len() {
            if let Some(element) = subtree.element(index) {
                #[allow(clippy::cast_possible_truncation)]
                let _ = blocks.insert(
                    element,
                    BlockRef {
                        subtree: subtree_index as u16,
                        index,
                    },
                );
            }
        }
    }

    // Computed text color per element; text runs pick theirs up afterwards.
    let mut colors: Vec<Rgba> = vec![Rgba::BLACK; tree.len()];

    let mut computer = StyleComputer::new(tree, store);
    computer.set_root_element(root);
    resolve_element(&mut computer, &blocks, &mut colors, images, box_tree, true);

    // Depth-first walk with an explicit stack; mirrors box generation.
    let mut stack: Vec<(ElementId, usize)> = vec![(root, 0)];
    while let Some(&mut (element, ref mut child_index)) = stack.last_mut() {
        let children = tree.children(element);
        if *child_index >= children.len() {
            let _ = stack.pop();
            computer.pop_element();
            continue;
        }
        let child = children[*child_index];
        *child_index += 1;

        computer.push_element(child);
        match tree.category(child) {
            Category::Text => {
                // Text has no declarations of its own; it inherits.
                colors[child.0] = computer.specified_color();
                computer.pop_element();
            }
            Category::Normal => {
                if computer.specified_box_style().display == Display::None {
                    computer.pop_element();
                    continue;
                }
                resolve_element(&mut computer, &blocks, &mut colors, images, box_tree, false);
                stack.push((child, 0));
            }
        }
    }

    // Give every text run its inherited color.
    for ifc in &mut box_tree.ifcs {
        for fragment in &mut ifc.fragments {
            if let FragmentContent::Text(run) = &mut fragment.content {
                run.color = colors
                    .get(run.element.0)
                    .copied()
                    .unwrap_or(Rgba::BLACK);
            }
        }
    }
}

/// Resolve and write one element's cosmetic values.
fn resolve_element(
    computer: &mut StyleComputer<'_>,
    blocks: &HashMap<ElementId, BlockRef>,
    colors: &mut [Rgba],
    images: &Images<'_>,
    box_tree: &mut BoxTree,
    is_root: bool,
) {
    let element = computer.current_element();

    let color = computer.specified_color();
    computer.set_computed_color(color);
    if let Some(slot) = colors.get_mut(element.0) {
        *slot = color;
    }

    let background = computer.specified_background();
    let border_colors = computer.specified_border_colors();
    computer.set_computed_background(background.clone());
    computer.set_computed_border_colors(border_colors);

    // [§ 2.11.2 The Canvas Background](https://www.w3.org/TR/css-backgrounds-3/#special-backgrounds)
    // "The background of the root element becomes the canvas background."
    if is_root {
        box_tree.canvas_background = background.color.resolve(color);
    }

    let Some(&block) = blocks.get(&element) else {
        return;
    };

    let offsets = box_tree.subtree(block.subtree).box_offsets(block.index);
    let borders = box_tree.subtree(block.subtree).borders(block.index);
    let paint = resolve_background(&background, offsets, borders, color, images);

    let resolved_borders = ResolvedBorderColors {
        top: border_colors.top.resolve(color),
        right: border_colors.right.resolve(color),
        bottom: border_colors.bottom.resolve(color),
        left: border_colors.left.resolve(color),
    };

    let subtree = box_tree.subtree_mut(block.subtree);
    subtree.set_background(block.index, paint);
    subtree.set_border_colors(block.index, resolved_borders);
}

/// Resolve all background properties of one block against its geometry.
///
/// [§ 3 Backgrounds](https://www.w3.org/TR/css-backgrounds-3/#backgrounds)
fn resolve_background(
    background: &Background,
    offsets: BoxOffsets,
    borders: super::box_tree::BorderWidths,
    current_color: Rgba,
    images: &Images<'_>,
) -> BackgroundPaint {
    let color = background.color.resolve(current_color);

    let BackgroundImage::Url(url) = &background.image else {
        return BackgroundPaint { color, image: None };
    };
    let Some(image_id) = images.id_of(url) else {
        // Unresolvable urls paint as if background-image were none.
        return BackgroundPaint { color, image: None };
    };
    let Some(data) = images.get(image_id) else {
        return BackgroundPaint { color, image: None };
    };

    // [§ 3.7 'background-origin'] — "the background positioning area".
    let positioning_area = area_of(background.origin, offsets, borders);
    // [§ 3.8 'background-clip'] — "the background painting area".
    let painting_area = area_of(background.clip, offsets, borders);

    #[allow(clippy::cast_precision_loss)]
    let intrinsic = Size::new(units(data.width() as f32), units(data.height() as f32));
    let tile = resolve_size(background.size, positioning_area.size(), intrinsic);

    // [§ 3.9 'background-position'] — "a percentage X aligns the point X%
    // across the image with the point X% across the background positioning
    // area."
    let position = Vector::new(
        positioning_area.x + resolve_axis(background.position.x, positioning_area.w, tile.w),
        positioning_area.y + resolve_axis(background.position.y, positioning_area.h, tile.h),
    );

    BackgroundPaint {
        color,
        image: Some(ResolvedBackgroundImage {
            image: image_id,
            position,
            size: tile,
            repeat: background.repeat,
            attachment: background.attachment,
            clip: painting_area,
        }),
    }
}

/// The border, padding, or content box of a block, relative to its border
/// box.
fn area_of(which: BackgroundBox, offsets: BoxOffsets, borders: super::box_tree::BorderWidths) -> Rect {
    match which {
        BackgroundBox::BorderBox => Rect::new(0, 0, offsets.border_size.w, offsets.border_size.h),
        BackgroundBox::PaddingBox => Rect::new(
            borders.left,
            borders.top,
            offsets.border_size.w - borders.left - borders.right,
            offsets.border_size.h - borders.top - borders.bottom,
        ),
        BackgroundBox::ContentBox => Rect::new(
            offsets.content_pos.x,
            offsets.content_pos.y,
            offsets.content_size.w,
            offsets.content_size.h,
        ),
    }
}

/// [§ 3.9 'background-size'](https://www.w3.org/TR/css-backgrounds-3/#background-size)
///
/// Resolve one tile's extent against the positioning area and the image's
/// intrinsic size.
fn resolve_size(size: BackgroundSize, area: Size, intrinsic: Size) -> Size {
    let (iw, ih) = (intrinsic.w.max(1), intrinsic.h.max(1));
    match size {
        // "Scale the image... to the smallest size such that both its width
        // and its height can completely cover the background positioning
        // area."
        BackgroundSize::Cover => scale_by(area, iw, ih, true),
        // "...to the largest size such that both its width and its height
        // can fit inside the background positioning area."
        BackgroundSize::Contain => scale_by(area, iw, ih, false),
        BackgroundSize::Size { width, height } => {
            let w = match width {
                BackgroundSizeValue::Auto => None,
                BackgroundSizeValue::LengthPercentage(lp) => Some(resolve_lp(lp, area.w)),
            };
            let h = match height {
                BackgroundSizeValue::Auto => None,
                BackgroundSizeValue::LengthPercentage(lp) => Some(resolve_lp(lp, area.h)),
            };
            match (w, h) {
                // "An auto value for one dimension is resolved by using the
                // image's intrinsic ratio."
                (Some(w), None) => Size::new(w, mul_ratio(w, ih, iw)),
                (None, Some(h)) => Size::new(mul_ratio(h, iw, ih), h),
                (Some(w), Some(h)) => Size::new(w, h),
                (None, None) => Size::new(iw, ih),
            }
        }
    }
}

/// Scale the intrinsic size so it covers (or fits inside) the area.
fn scale_by(area: Size, iw: Unit, ih: Unit, cover: bool) -> Size {
    #[allow(clippy::cast_precision_loss)]
    let (sx, sy) = (area.w as f32 / iw as f32, area.h as f32 / ih as f32);
    let scale = if cover { sx.max(sy) } else { sx.min(sy) };
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    Size::new(
        (iw as f32 * scale).round() as Unit,
        (ih as f32 * scale).round() as Unit,
    )
}

/// `value * numerator / denominator` without intermediate overflow.
fn mul_ratio(value: Unit, numerator: Unit, denominator: Unit) -> Unit {
    let denominator = i64::from(denominator.max(1));
    (i64::from(value) * i64::from(numerator) / denominator)
        .try_into()
        .unwrap_or(Unit::MAX)
}

/// One axis of background-position: offset of the tile within the area.
fn resolve_axis(axis: BackgroundPositionAxis, area: Unit, tile: Unit) -> Unit {
    let free = area - tile;
    let offset = match axis.offset {
        LengthPercentage::Px(px) => units(px),
        // "a percentage X aligns the point X% across the image with the
        // point X% across the background positioning area"
        LengthPercentage::Percentage(p) => {
            #[allow(clippy::cast_possible_truncation)]
            let resolved = (f64::from(free) * f64::from(p) / 100.0).round() as Unit;
            resolved
        }
    };
    match axis.side {
        BackgroundPositionSide::Start => offset,
        BackgroundPositionSide::End => free - offset,
        BackgroundPositionSide::Center => free / 2 + offset,
    }
}

/// Resolve a length-percentage against a base, in units.
fn resolve_lp(lp: LengthPercentage, base: Unit) -> Unit {
    match lp {
        LengthPercentage::Px(px) => units(px),
        LengthPercentage::Percentage(p) => {
            #[allow(clippy::cast_possible_truncation)]
            let resolved = (f64::from(base) * f64::from(p) / 100.0).round() as Unit;
            resolved
        }
    }
}
