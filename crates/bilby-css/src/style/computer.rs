//! The style computer: specified and computed values per element.
//!
//! [§ 4 Value Processing](https://www.w3.org/TR/css-cascade-4/#value-stages)
//!
//! "Each property declaration... passes through several stages: declared,
//! cascaded, specified, computed, used."
//!
//! Layout runs two passes over the element tree — box generation, then
//! cosmetics — and both query this computer. The computer keeps a stack
//! describing the current element ancestry; specified values resolve
//! `inherit`/`unset` against the parent's computed entry on that stack, and
//! each pass writes its computed results back so descendants can inherit
//! them.

use bilby_dom::{Category, ElementId, ElementTree};

use crate::values::{
    BackgroundAttachment, BackgroundBox, BackgroundImage, BackgroundPosition, BackgroundRepeat,
    BackgroundSize, BorderWidth, Color, Display, LengthPercentage, LengthPercentageAuto, MaxSize,
    Position, Rgba, ZIndex,
};

use super::cascade::CascadedValueStore;
use super::declared::{CascadedValues, Declared};

/// `display` and `position`, resolved together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxStyle {
    /// The element's display type.
    pub display: Display,
    /// The element's positioning scheme.
    pub position: Position,
}

impl BoxStyle {
    const INITIAL: Self = Self {
        display: Display::Inline,
        position: Position::Static,
    };
}

/// One axis of content sizing: preferred size plus min/max clamps.
///
/// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentSize {
    /// `width` or `height`.
    pub size: LengthPercentageAuto,
    /// `min-width` or `min-height`.
    pub min: LengthPercentage,
    /// `max-width` or `max-height`.
    pub max: MaxSize,
}

impl ContentSize {
    const INITIAL: Self = Self {
        size: LengthPercentageAuto::Auto,
        min: LengthPercentage::ZERO,
        max: MaxSize::None,
    };
}

/// The margin, border, and padding of one axis.
///
/// `start`/`end` are left/right for the horizontal edges and top/bottom for
/// the vertical edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edges {
    /// `margin-left` / `margin-top`.
    pub margin_start: LengthPercentageAuto,
    /// `margin-right` / `margin-bottom`.
    pub margin_end: LengthPercentageAuto,
    /// `border-left-width` / `border-top-width`.
    pub border_start: BorderWidth,
    /// `border-right-width` / `border-bottom-width`.
    pub border_end: BorderWidth,
    /// `padding-left` / `padding-top`.
    pub padding_start: LengthPercentage,
    /// `padding-right` / `padding-bottom`.
    pub padding_end: LengthPercentage,
}

impl Edges {
    // Border widths start at zero: border-style is out of scope, so no
    // border exists until a width is declared.
    const INITIAL: Self = Self {
        margin_start: LengthPercentageAuto::Px(0.0),
        margin_end: LengthPercentageAuto::Px(0.0),
        border_start: BorderWidth::Px(0.0),
        border_end: BorderWidth::Px(0.0),
        padding_start: LengthPercentage::ZERO,
        padding_end: LengthPercentage::ZERO,
    };
}

/// [§ 9.3.2 Box offsets](https://www.w3.org/TR/CSS2/visuren.html#position-props)
///
/// The four inset properties of a positioned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insets {
    /// `top`
    pub top: LengthPercentageAuto,
    /// `right`
    pub right: LengthPercentageAuto,
    /// `bottom`
    pub bottom: LengthPercentageAuto,
    /// `left`
    pub left: LengthPercentageAuto,
}

impl Insets {
    const INITIAL: Self = Self {
        top: LengthPercentageAuto::Auto,
        right: LengthPercentageAuto::Auto,
        bottom: LengthPercentageAuto::Auto,
        left: LengthPercentageAuto::Auto,
    };
}

/// All background properties of an element, resolved together.
///
/// [CSS Backgrounds and Borders Level 3 § 3](https://www.w3.org/TR/css-backgrounds-3/#backgrounds)
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    /// `background-color`
    pub color: Color,
    /// `background-image`
    pub image: BackgroundImage,
    /// `background-repeat`
    pub repeat: BackgroundRepeat,
    /// `background-position`
    pub position: BackgroundPosition,
    /// `background-size`
    pub size: BackgroundSize,
    /// `background-clip`
    pub clip: BackgroundBox,
    /// `background-origin`
    pub origin: BackgroundBox,
    /// `background-attachment`
    pub attachment: BackgroundAttachment,
}

impl Background {
    fn initial() -> Self {
        Self {
            color: Color::Rgba(Rgba::TRANSPARENT),
            image: BackgroundImage::None,
            repeat: BackgroundRepeat::default(),
            position: BackgroundPosition::default(),
            size: BackgroundSize::default(),
            // "Initial: border-box" / "Initial: padding-box"
            clip: BackgroundBox::BorderBox,
            origin: BackgroundBox::PaddingBox,
            attachment: BackgroundAttachment::Scroll,
        }
    }
}

/// The four border colors.
///
/// [§ 4.1 'border-color'](https://www.w3.org/TR/css-backgrounds-3/#border-color)
///
/// "Initial: currentColor"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderColors {
    /// `border-top-color`
    pub top: Color,
    /// `border-right-color`
    pub right: Color,
    /// `border-bottom-color`
    pub bottom: Color,
    /// `border-left-color`
    pub left: Color,
}

impl BorderColors {
    const INITIAL: Self = Self {
        top: Color::CurrentColor,
        right: Color::CurrentColor,
        bottom: Color::CurrentColor,
        left: Color::CurrentColor,
    };
}

/// One ancestry-stack entry: the element and the computed values the layout
/// passes have written back for it so far.
#[derive(Debug, Clone)]
struct Entry {
    element: ElementId,
    box_style: Option<BoxStyle>,
    content_width: Option<ContentSize>,
    content_height: Option<ContentSize>,
    horizontal_edges: Option<Edges>,
    vertical_edges: Option<Edges>,
    z_index: Option<ZIndex>,
    insets: Option<Insets>,
    color: Option<Rgba>,
    background: Option<Background>,
    border_colors: Option<BorderColors>,
}

impl Entry {
    fn new(element: ElementId) -> Self {
        Self {
            element,
            box_style: None,
            content_width: None,
            content_height: None,
            horizontal_edges: None,
            vertical_edges: None,
            z_index: None,
            insets: None,
            color: None,
            background: None,
            border_colors: None,
        }
    }
}

/// The style computer.
///
/// The current element is the top of the ancestry stack; layout drives the
/// stack with [`StyleComputer::push_element`] / [`StyleComputer::pop_element`]
/// as it descends and returns.
#[derive(Debug)]
pub struct StyleComputer<'a> {
    tree: &'a ElementTree,
    store: &'a CascadedValueStore,
    stack: Vec<Entry>,
    empty: CascadedValues,
}

impl<'a> StyleComputer<'a> {
    /// Create a computer over an element tree and its cascaded values.
    #[must_use]
    pub fn new(tree: &'a ElementTree, store: &'a CascadedValueStore) -> Self {
        Self {
            tree,
            store,
            stack: Vec::new(),
            empty: CascadedValues::default(),
        }
    }

    /// Reset the ancestry stack to a single root element.
    pub fn set_root_element(&mut self, element: ElementId) {
        self.stack.clear();
        self.stack.push(Entry::new(element));
    }

    /// Descend: make `element` the current element, keeping its ancestors
    /// on the stack.
    pub fn push_element(&mut self, element: ElementId) {
        self.stack.push(Entry::new(element));
    }

    /// Return to the parent element.
    pub fn pop_element(&mut self) {
        let _ = self.stack.pop();
    }

    /// Skip to a sibling: replace the current element without touching the
    /// ancestry below it.
    pub fn advance_element(&mut self, element: ElementId) {
        self.pop_element();
        self.push_element(element);
    }

    /// The current element.
    ///
    /// # Panics
    /// Panics if no element has been pushed.
    #[must_use]
    pub fn current_element(&self) -> ElementId {
        self.top().element
    }

    /// The category of the current element.
    #[must_use]
    pub fn element_category(&self) -> Category {
        self.tree.category(self.current_element())
    }

    fn top(&self) -> &Entry {
        self.stack.last().expect("style computer has no current element")
    }

    fn top_mut(&mut self) -> &mut Entry {
        self.stack
            .last_mut()
            .expect("style computer has no current element")
    }

    fn parent(&self) -> Option<&Entry> {
        self.stack.len().checked_sub(2).map(|i| &self.stack[i])
    }

    fn cascaded(&self) -> &CascadedValues {
        self.store
            .get(self.current_element())
            .unwrap_or(&self.empty)
    }

    // Specified values: box-generation stage ------------------------------

    /// Specified `display`/`position` of the current element.
    #[must_use]
    pub fn specified_box_style(&self) -> BoxStyle {
        let cascaded = self.cascaded();
        let parent = self.parent().and_then(|e| e.box_style);
        BoxStyle {
            display: resolve(
                &cascaded.important.display,
                &cascaded.normal.display,
                BoxStyle::INITIAL.display,
                parent.map(|p| p.display),
                false,
            ),
            position: resolve(
                &cascaded.important.position,
                &cascaded.normal.position,
                BoxStyle::INITIAL.position,
                parent.map(|p| p.position),
                false,
            ),
        }
    }

    /// Specified `width`/`min-width`/`max-width`.
    #[must_use]
    pub fn specified_content_width(&self) -> ContentSize {
        let cascaded = self.cascaded();
        let parent = self.parent().and_then(|e| e.content_width);
        ContentSize {
            size: resolve(
                &cascaded.important.width,
                &cascaded.normal.width,
                ContentSize::INITIAL.size,
                parent.map(|p| p.size),
                false,
            ),
            min: resolve(
                &cascaded.important.min_width,
                &cascaded.normal.min_width,
                ContentSize::INITIAL.min,
                parent.map(|p| p.min),
                false,
            ),
            max: resolve(
                &cascaded.important.max_width,
                &cascaded.normal.max_width,
                ContentSize::INITIAL.max,
                parent.map(|p| p.max),
                false,
            ),
        }
    }

    /// Specified `height`/`min-height`/`max-height`.
    #[must_use]
    pub fn specified_content_height(&self) -> ContentSize {
        let cascaded = self.cascaded();
        let parent = self.parent().and_then(|e| e.content_height);
        ContentSize {
            size: resolve(
                &cascaded.important.height,
                &cascaded.normal.height,
                ContentSize::INITIAL.size,
                parent.map(|p| p.size),
                false,
            ),
            min: resolve(
                &cascaded.important.min_height,
                &cascaded.normal.min_height,
                ContentSize::INITIAL.min,
                parent.map(|p| p.min),
                false,
            ),
            max: resolve(
                &cascaded.important.max_height,
                &cascaded.normal.max_height,
                ContentSize::INITIAL.max,
                parent.map(|p| p.max),
                false,
            ),
        }
    }

    /// Specified left/right margin, border width, and padding.
    #[must_use]
    pub fn specified_horizontal_edges(&self) -> Edges {
        let cascaded = self.cascaded();
        let parent = self.parent().and_then(|e| e.horizontal_edges);
        Edges {
            margin_start: resolve(
                &cascaded.important.margin_left,
                &cascaded.normal.margin_left,
                Edges::INITIAL.margin_start,
                parent.map(|p| p.margin_start),
                false,
            ),
            margin_end: resolve(
                &cascaded.important.margin_right,
                &cascaded.normal.margin_right,
                Edges::INITIAL.margin_end,
                parent.map(|p| p.margin_end),
                false,
            ),
            border_start: resolve(
                &cascaded.important.border_left_width,
                &cascaded.normal.border_left_width,
                Edges::INITIAL.border_start,
                parent.map(|p| p.border_start),
                false,
            ),
            border_end: resolve(
                &cascaded.important.border_right_width,
                &cascaded.normal.border_right_width,
                Edges::INITIAL.border_end,
                parent.map(|p| p.border_end),
                false,
            ),
            padding_start: resolve(
                &cascaded.important.padding_left,
                &cascaded.normal.padding_left,
                Edges::INITIAL.padding_start,
                parent.map(|p| p.padding_start),
                false,
            ),
            padding_end: resolve(
                &cascaded.important.padding_right,
                &cascaded.normal.padding_right,
                Edges::INITIAL.padding_end,
                parent.map(|p| p.padding_end),
                false,
            ),
        }
    }

    /// Specified top/bottom margin, border width, and padding.
    #[must_use]
    pub fn specified_vertical_edges(&self) -> Edges {
        let cascaded = self.cascaded();
        let parent = self.parent().and_then(|e| e.vertical_edges);
        Edges {
            margin_start: resolve(
                &cascaded.important.margin_top,
                &cascaded.normal.margin_top,
                Edges::INITIAL.margin_start,
                parent.map(|p| p.margin_start),
                false,
            ),
            margin_end: resolve(
                &cascaded.important.margin_bottom,
                &cascaded.normal.margin_bottom,
                Edges::INITIAL.margin_end,
                parent.map(|p| p.margin_end),
                false,
            ),
            border_start: resolve(
                &cascaded.important.border_top_width,
                &cascaded.normal.border_top_width,
                Edges::INITIAL.border_start,
                parent.map(|p| p.border_start),
                false,
            ),
            border_end: resolve(
                &cascaded.important.border_bottom_width,
                &cascaded.normal.border_bottom_width,
                Edges::INITIAL.border_end,
                parent.map(|p| p.border_end),
                false,
            ),
            padding_start: resolve(
                &cascaded.important.padding_top,
                &cascaded.normal.padding_top,
                Edges::INITIAL.padding_start,
                parent.map(|p| p.padding_start),
                false,
            ),
            padding_end: resolve(
                &cascaded.important.padding_bottom,
                &cascaded.normal.padding_bottom,
                Edges::INITIAL.padding_end,
                parent.map(|p| p.padding_end),
                false,
            ),
        }
    }

    /// Specified `z-index`.
    #[must_use]
    pub fn specified_z_index(&self) -> ZIndex {
        let cascaded = self.cascaded();
        resolve(
            &cascaded.important.z_index,
            &cascaded.normal.z_index,
            ZIndex::Auto,
            self.parent().and_then(|e| e.z_index),
            false,
        )
    }

    /// Specified `top`/`right`/`bottom`/`left`.
    #[must_use]
    pub fn specified_insets(&self) -> Insets {
        let cascaded = self.cascaded();
        let parent = self.parent().and_then(|e| e.insets);
        Insets {
            top: resolve(
                &cascaded.important.inset_top,
                &cascaded.normal.inset_top,
                Insets::INITIAL.top,
                parent.map(|p| p.top),
                false,
            ),
            right: resolve(
                &cascaded.important.inset_right,
                &cascaded.normal.inset_right,
                Insets::INITIAL.right,
                parent.map(|p| p.right),
                false,
            ),
            bottom: resolve(
                &cascaded.important.inset_bottom,
                &cascaded.normal.inset_bottom,
                Insets::INITIAL.bottom,
                parent.map(|p| p.bottom),
                false,
            ),
            left: resolve(
                &cascaded.important.inset_left,
                &cascaded.normal.inset_left,
                Insets::INITIAL.left,
                parent.map(|p| p.left),
                false,
            ),
        }
    }

    // Specified values: cosmetic stage ------------------------------------

    /// Computed `color` of the current element.
    ///
    /// [§ 3.1 'color'](https://www.w3.org/TR/css-color-4/#the-color-property)
    ///
    /// "Inherited: yes". `currentColor` on `color` itself computes to the
    /// inherited value.
    #[must_use]
    pub fn specified_color(&self) -> Rgba {
        let cascaded = self.cascaded();
        let inherited = self
            .parent()
            .and_then(|e| e.color)
            .unwrap_or(Rgba::BLACK);
        let declared = cascaded
            .important
            .color
            .as_ref()
            .or(cascaded.normal.color.as_ref());
        match declared {
            None | Some(Declared::Inherit | Declared::Unset) => inherited,
            Some(Declared::Initial) => Rgba::BLACK,
            Some(Declared::Value(Color::Rgba(c))) => *c,
            Some(Declared::Value(Color::CurrentColor)) => inherited,
        }
    }

    /// Specified background of the current element.
    #[must_use]
    pub fn specified_background(&self) -> Background {
        let cascaded = self.cascaded();
        let parent = self.parent().and_then(|e| e.background.clone());
        let initial = Background::initial();
        Background {
            color: resolve(
                &cascaded.important.background_color,
                &cascaded.normal.background_color,
                initial.color,
                parent.as_ref().map(|p| p.color),
                false,
            ),
            image: resolve(
                &cascaded.important.background_image,
                &cascaded.normal.background_image,
                initial.image.clone(),
                parent.as_ref().map(|p| p.image.clone()),
                false,
            ),
            repeat: resolve(
                &cascaded.important.background_repeat,
                &cascaded.normal.background_repeat,
                initial.repeat,
                parent.as_ref().map(|p| p.repeat),
                false,
            ),
            position: resolve(
                &cascaded.important.background_position,
                &cascaded.normal.background_position,
                initial.position,
                parent.as_ref().map(|p| p.position),
                false,
            ),
            size: resolve(
                &cascaded.important.background_size,
                &cascaded.normal.background_size,
                initial.size,
                parent.as_ref().map(|p| p.size),
                false,
            ),
            clip: resolve(
                &cascaded.important.background_clip,
                &cascaded.normal.background_clip,
                initial.clip,
                parent.as_ref().map(|p| p.clip),
                false,
            ),
            origin: resolve(
                &cascaded.important.background_origin,
                &cascaded.normal.background_origin,
                initial.origin,
                parent.as_ref().map(|p| p.origin),
                false,
            ),
            attachment: resolve(
                &cascaded.important.background_attachment,
                &cascaded.normal.background_attachment,
                initial.attachment,
                parent.as_ref().map(|p| p.attachment),
                false,
            ),
        }
    }

    /// Specified border colors of the current element.
    #[must_use]
    pub fn specified_border_colors(&self) -> BorderColors {
        let cascaded = self.cascaded();
        let parent = self.parent().and_then(|e| e.border_colors);
        BorderColors {
            top: resolve(
                &cascaded.important.border_top_color,
                &cascaded.normal.border_top_color,
                BorderColors::INITIAL.top,
                parent.map(|p| p.top),
                false,
            ),
            right: resolve(
                &cascaded.important.border_right_color,
                &cascaded.normal.border_right_color,
                BorderColors::INITIAL.right,
                parent.map(|p| p.right),
                false,
            ),
            bottom: resolve(
                &cascaded.important.border_bottom_color,
                &cascaded.normal.border_bottom_color,
                BorderColors::INITIAL.bottom,
                parent.map(|p| p.bottom),
                false,
            ),
            left: resolve(
                &cascaded.important.border_left_color,
                &cascaded.normal.border_left_color,
                BorderColors::INITIAL.left,
                parent.map(|p| p.left),
                false,
            ),
        }
    }

    // Computed values ------------------------------------------------------

    /// Record the computed `display`/`position` for the current element.
    pub fn set_computed_box_style(&mut self, value: BoxStyle) {
        self.top_mut().box_style = Some(value);
    }

    /// Record the computed width sizing for the current element.
    pub fn set_computed_content_width(&mut self, value: ContentSize) {
        self.top_mut().content_width = Some(value);
    }

    /// Record the computed height sizing for the current element.
    pub fn set_computed_content_height(&mut self, value: ContentSize) {
        self.top_mut().content_height = Some(value);
    }

    /// Record the computed horizontal edges for the current element.
    pub fn set_computed_horizontal_edges(&mut self, value: Edges) {
        self.top_mut().horizontal_edges = Some(value);
    }

    /// Record the computed vertical edges for the current element.
    pub fn set_computed_vertical_edges(&mut self, value: Edges) {
        self.top_mut().vertical_edges = Some(value);
    }

    /// Record the computed `z-index` for the current element.
    pub fn set_computed_z_index(&mut self, value: ZIndex) {
        self.top_mut().z_index = Some(value);
    }

    /// Record the computed insets for the current element.
    pub fn set_computed_insets(&mut self, value: Insets) {
        self.top_mut().insets = Some(value);
    }

    /// Record the computed `color` for the current element; descendants
    /// inherit it.
    pub fn set_computed_color(&mut self, value: Rgba) {
        self.top_mut().color = Some(value);
    }

    /// Record the computed background for the current element.
    pub fn set_computed_background(&mut self, value: Background) {
        self.top_mut().background = Some(value);
    }

    /// Record the computed border colors for the current element.
    pub fn set_computed_border_colors(&mut self, value: BorderColors) {
        self.top_mut().border_colors = Some(value);
    }
}

/// [§ 4.3 Specified Values](https://www.w3.org/TR/css-cascade-4/#specified) /
/// [§ 7.3 Explicit Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting-keywords)
///
/// Resolve one property: the important declaration wins over the normal
/// one; CSS-wide keywords and absent declarations resolve against the
/// initial value and the parent's computed value.
fn resolve<T: Clone>(
    important: &Option<Declared<T>>,
    normal: &Option<Declared<T>>,
    initial: T,
    parent: Option<T>,
    inherited_by_default: bool,
) -> T {
    let declared = important.as_ref().or(normal.as_ref());
    match declared {
        Some(Declared::Value(v)) => v.clone(),
        Some(Declared::Initial) => initial,
        Some(Declared::Inherit) => parent.unwrap_or(initial),
        Some(Declared::Unset) | None => {
            if inherited_by_default {
                parent.unwrap_or(initial)
            } else {
                initial
            }
        }
    }
}
