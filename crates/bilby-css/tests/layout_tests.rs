//! Integration tests for flow layout, stacking contexts, and the cosmetic
//! pass.

use bilby_common::image::ImageData;
use bilby_common::units::{Size, units};
use bilby_css::layout::{
    ApproximateFont, BlockType, BoxTree, FragmentContent, Images, NamedImage, do_layout,
};
use bilby_css::parser::parse_stylesheet;
use bilby_css::style::{CascadedValueStore, Declared, apply_stylesheet};
use bilby_css::stylesheet::{Environment, build_stylesheet};
use bilby_css::values::{
    BackgroundImage, BackgroundSize, BorderWidth, Color, Display, LengthPercentage,
    LengthPercentageAuto, Position, Rgba, ZIndex,
};
use bilby_dom::{ElementId, ElementTree};

fn viewport() -> Size {
    Size::new(units(400.0), units(400.0))
}

fn layout(tree: &ElementTree, store: &CascadedValueStore, root: ElementId) -> BoxTree {
    let font = ApproximateFont::default();
    do_layout(tree, store, root, &font, &Images::none(), viewport()).expect("layout succeeds")
}

fn make_block(store: &mut CascadedValueStore, element: ElementId) {
    store.entry_mut(element).normal.display = Some(Declared::Value(Display::Block));
}

fn set_width(store: &mut CascadedValueStore, element: ElementId, px: f32) {
    store.entry_mut(element).normal.width =
        Some(Declared::Value(LengthPercentageAuto::Px(px)));
}

fn set_height(store: &mut CascadedValueStore, element: ElementId, px: f32) {
    store.entry_mut(element).normal.height =
        Some(Declared::Value(LengthPercentageAuto::Px(px)));
}

/// Verify the box-tree skip invariant in every subtree:
/// `skip[i] = 1 + sum(skip[children(i)])`.
fn assert_box_skip_invariants(box_tree: &BoxTree) {
    for subtree in &box_tree.subtrees {
        for i in 0..subtree.len() {
            let skip = subtree.skip(i);
            assert!(skip >= 1);
            let children_total: u16 = subtree.children(i).map(|c| subtree.skip(c)).sum();
            assert_eq!(
                skip,
                1 + children_total,
                "skip of block {i} must cover exactly its children"
            );
        }
        if !subtree.is_empty() {
            assert_eq!(subtree.skip(0), subtree.len());
        }
    }
}

/// Verify that every stacking context's children are non-decreasing in
/// z-index.
fn assert_sc_order_invariant(box_tree: &BoxTree) {
    let sc = &box_tree.sc_tree;
    for position in 0..sc.len() {
        let mut previous = i32::MIN;
        for child in sc.children(position) {
            assert!(
                sc.z_index(child) >= previous,
                "sc-tree children must be non-decreasing in z-index"
            );
            previous = sc.z_index(child);
        }
    }
}

// ─── minimal block (E1) ─────────────────────────────────────────────────

#[test]
fn test_minimal_block() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);
    set_width(&mut store, root, 100.0);
    set_height(&mut store, root, 50.0);

    let box_tree = layout(&tree, &store, root);

    assert_eq!(box_tree.subtrees.len(), 1);
    let subtree = box_tree.subtree(0);
    assert_eq!(subtree.len(), 2);
    assert_eq!(subtree.skip(0), 2);
    assert_eq!(subtree.skip(1), 1);

    // The initial containing block is viewport sized.
    let icb = subtree.box_offsets(0);
    assert_eq!(icb.border_size, Size::new(units(400.0), units(400.0)));
    assert_eq!(icb.content_size, Size::new(units(400.0), units(400.0)));

    // The root block takes its declared size.
    let root_box = subtree.box_offsets(1);
    assert_eq!(root_box.border_size, Size::new(units(100.0), units(50.0)));
    assert_eq!(root_box.border_pos.x, 0);
    assert_eq!(root_box.border_pos.y, 0);

    // One stacking context: the root context, owned by the ICB.
    assert_eq!(box_tree.sc_tree.len(), 1);
    assert_eq!(box_tree.sc_tree.z_index(0), 0);
    assert_eq!(box_tree.sc_tree.block(0).subtree, 0);
    assert_eq!(box_tree.sc_tree.block(0).index, 0);

    assert_box_skip_invariants(&box_tree);
}

// ─── nested inline-blocks (E2) ──────────────────────────────────────────

#[test]
fn test_nested_inline_blocks() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let widths = [350.0, 100.0, 50.0, 25.0];
    let mut parent = root;
    for (i, &w) in widths.iter().enumerate() {
        let inline_block = tree.alloc_element(format!("ib{i}"));
        let text = tree.alloc_text(format!("text {i}"));
        tree.append_child(parent, inline_block);
        tree.append_child(inline_block, text);
        parent = inline_block;
    }

    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);
    let mut element = tree.children(root)[0];
    for &w in &widths {
        store.entry_mut(element).normal.display =
            Some(Declared::Value(Display::InlineBlock));
        set_width(&mut store, element, w);
        store.entry_mut(element).normal.padding_left =
            Some(Declared::Value(LengthPercentage::Px(10.0)));
        element = match tree.children(element).iter().find(|&&c| tree.text(c).is_none()) {
            Some(&next) => next,
            None => break,
        };
    }

    let box_tree = layout(&tree, &store, root);

    // One subtree per inline-block, plus the initial one.
    assert_eq!(box_tree.subtrees.len(), 5);

    // Each inline-block subtree is reached through a proxy block.
    let proxies = box_tree
        .subtrees
        .iter()
        .flat_map(|s| (0..s.len()).map(move |i| s.block_type(i)))
        .filter(|t| matches!(t, BlockType::SubtreeProxy(_)))
        .count();
    assert_eq!(proxies, 4);

    // Four stacking contexts beside the root one, all siblings of the
    // root context rather than descendants of each other.
    let sc = &box_tree.sc_tree;
    assert_eq!(sc.len(), 5);
    assert_eq!(sc.children(0).count(), 4);
    for child in sc.children(0) {
        assert_eq!(sc.skip(child), 1);
        assert_ne!(sc.block(child).subtree, 0, "context owns a nested subtree");
    }

    // Text runs ended up inside each inline-block's flow.
    let text_bearing_ifcs = box_tree
        .ifcs
        .iter()
        .filter(|ifc| {
            ifc.fragments
                .iter()
                .any(|f| matches!(f.content, FragmentContent::Text(_)))
        })
        .count();
    assert_eq!(text_bearing_ifcs, 4);

    assert_box_skip_invariants(&box_tree);
    assert_sc_order_invariant(&box_tree);
}

// ─── z-index ordering (E3) ──────────────────────────────────────────────

#[test]
fn test_z_index_sibling_order() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);

    // Five block children: static, z=6, z=-2, z:auto, z=-5.
    let z_values: [Option<Option<i32>>; 5] =
        [None, Some(Some(6)), Some(Some(-2)), Some(None), Some(Some(-5))];
    for (i, z) in z_values.iter().enumerate() {
        let child = tree.alloc_element(format!("c{i}"));
        tree.append_child(root, child);
        make_block(&mut store, child);
        set_height(&mut store, child, 10.0);
        if let Some(z) = z {
            store.entry_mut(child).normal.position =
                Some(Declared::Value(Position::Relative));
            if let Some(value) = z {
                store.entry_mut(child).normal.z_index =
                    Some(Declared::Value(ZIndex::Integer(*value)));
            }
        }
    }

    let box_tree = layout(&tree, &store, root);
    let sc = &box_tree.sc_tree;

    // Root context plus one per positioned child; the static child
    // creates none, the z:auto child stacks at level 0.
    assert_eq!(sc.len(), 5);
    let child_z: Vec<i32> = sc.children(0).map(|p| sc.z_index(p)).collect();
    assert_eq!(child_z, vec![-5, -2, 0, 6]);

    assert_sc_order_invariant(&box_tree);
    assert_box_skip_invariants(&box_tree);
}

#[test]
fn test_equal_z_index_keeps_document_order() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);

    let mut children = Vec::new();
    for i in 0..3 {
        let child = tree.alloc_element(format!("c{i}"));
        tree.append_child(root, child);
        make_block(&mut store, child);
        set_height(&mut store, child, 10.0);
        store.entry_mut(child).normal.position = Some(Declared::Value(Position::Relative));
        store.entry_mut(child).normal.z_index =
            Some(Declared::Value(ZIndex::Integer(1)));
        children.push(child);
    }

    let box_tree = layout(&tree, &store, root);
    let sc = &box_tree.sc_tree;

    // Equal z-index: insertion (document) order is preserved, so the
    // owning blocks appear top to bottom.
    let blocks: Vec<u16> = sc.children(0).map(|p| sc.block(p).index).collect();
    let mut sorted = blocks.clone();
    sorted.sort_unstable();
    assert_eq!(blocks, sorted, "document order preserved among equal z");
}

// ─── block flow geometry ────────────────────────────────────────────────

#[test]
fn test_blocks_stack_vertically() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let a = tree.alloc_element("a");
    let b = tree.alloc_element("b");
    tree.append_child(root, a);
    tree.append_child(root, b);

    let mut store = CascadedValueStore::new();
    for el in [root, a, b] {
        make_block(&mut store, el);
    }
    set_height(&mut store, a, 30.0);
    set_height(&mut store, b, 20.0);

    let box_tree = layout(&tree, &store, root);
    let subtree = box_tree.subtree(0);
    // blocks: 0 icb, 1 root, 2 a, 3 b
    assert_eq!(subtree.len(), 4);
    assert_eq!(subtree.box_offsets(2).border_pos.y, 0);
    assert_eq!(subtree.box_offsets(3).border_pos.y, units(30.0));
    // The root's auto height is the sum of its children.
    assert_eq!(subtree.box_offsets(1).content_size.h, units(50.0));
}

#[test]
fn test_auto_margins_center_a_definite_width_block() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let child = tree.alloc_element("child");
    tree.append_child(root, child);

    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);
    make_block(&mut store, child);
    set_width(&mut store, child, 100.0);
    store.entry_mut(child).normal.margin_left = Some(Declared::Value(LengthPercentageAuto::Auto));
    store.entry_mut(child).normal.margin_right = Some(Declared::Value(LengthPercentageAuto::Auto));

    let box_tree = layout(&tree, &store, root);
    let subtree = box_tree.subtree(0);
    let child_box = subtree.box_offsets(2);
    // (400 - 100) / 2 on each side.
    assert_eq!(child_box.border_pos.x, units(150.0));
    assert_eq!(subtree.margins(2).left, units(150.0));
    assert_eq!(subtree.margins(2).right, units(150.0));
}

#[test]
fn test_negative_margins_are_not_clamped() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let child = tree.alloc_element("child");
    tree.append_child(root, child);

    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);
    make_block(&mut store, child);
    set_width(&mut store, child, 100.0);
    set_height(&mut store, child, 10.0);
    store.entry_mut(child).normal.margin_left =
        Some(Declared::Value(LengthPercentageAuto::Px(-25.0)));

    let box_tree = layout(&tree, &store, root);
    let subtree = box_tree.subtree(0);
    assert_eq!(subtree.box_offsets(2).border_pos.x, units(-25.0));
    assert_eq!(subtree.margins(2).left, units(-25.0));
}

#[test]
fn test_min_max_clamp_used_width_and_height() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);
    set_width(&mut store, root, 500.0);
    store.entry_mut(root).normal.max_width = Some(Declared::Value(
        bilby_css::values::MaxSize::LengthPercentage(LengthPercentage::Px(120.0)),
    ));
    set_height(&mut store, root, 5.0);
    store.entry_mut(root).normal.min_height =
        Some(Declared::Value(LengthPercentage::Px(40.0)));

    let box_tree = layout(&tree, &store, root);
    let root_box = box_tree.subtree(0).box_offsets(1);
    assert_eq!(root_box.content_size.w, units(120.0));
    assert_eq!(root_box.content_size.h, units(40.0));
}

#[test]
fn test_relative_position_offsets_after_flow() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let child = tree.alloc_element("child");
    tree.append_child(root, child);

    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);
    make_block(&mut store, child);
    set_width(&mut store, child, 50.0);
    set_height(&mut store, child, 50.0);
    store.entry_mut(child).normal.position = Some(Declared::Value(Position::Relative));
    store.entry_mut(child).normal.inset_left =
        Some(Declared::Value(LengthPercentageAuto::Px(10.0)));
    store.entry_mut(child).normal.inset_top =
        Some(Declared::Value(LengthPercentageAuto::Px(5.0)));

    let box_tree = layout(&tree, &store, root);
    let child_box = box_tree.subtree(0).box_offsets(2);
    assert_eq!(child_box.border_pos.x, units(10.0));
    assert_eq!(child_box.border_pos.y, units(5.0));
}

#[test]
fn test_display_none_generates_no_boxes() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let hidden = tree.alloc_element("hidden");
    tree.append_child(root, hidden);

    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);
    store.entry_mut(hidden).normal.display = Some(Declared::Value(Display::None));

    let box_tree = layout(&tree, &store, root);
    assert_eq!(box_tree.subtree(0).len(), 2); // icb + root only
}

#[test]
fn test_root_inline_is_blockified() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let mut store = CascadedValueStore::new();
    store.entry_mut(root).normal.display = Some(Declared::Value(Display::Inline));
    set_height(&mut store, root, 10.0);

    let box_tree = layout(&tree, &store, root);
    // The root generated a real block, not an inline run.
    assert_eq!(box_tree.subtree(0).len(), 2);
    assert_eq!(
        box_tree.subtree(0).box_offsets(1).content_size.h,
        units(10.0)
    );
}

// ─── inline layout ──────────────────────────────────────────────────────

#[test]
fn test_text_produces_an_ifc_with_line_boxes() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let text = tree.alloc_text("hello world");
    tree.append_child(root, text);

    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);

    let box_tree = layout(&tree, &store, root);
    assert_eq!(box_tree.ifcs.len(), 1);
    let ifc = &box_tree.ifcs[0];
    assert_eq!(ifc.line_boxes.len(), 1);
    assert_eq!(ifc.fragments.len(), 1);
    // 11 glyphs at the approximate 8px advance.
    assert_eq!(ifc.max_line_width, units(11.0 * 8.0));
    // One line of ascent + descent.
    assert_eq!(ifc.content_height, units(16.0));
    // The root's auto height includes the line.
    assert_eq!(
        box_tree.subtree(0).box_offsets(1).content_size.h,
        units(16.0)
    );
}

#[test]
fn test_text_wraps_at_the_available_width() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let text = tree.alloc_text("aa bb");
    tree.append_child(root, text);

    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);
    set_width(&mut store, root, 30.0); // "aa" = 16px, "aa bb" = 40px

    let box_tree = layout(&tree, &store, root);
    let ifc = &box_tree.ifcs[0];
    assert_eq!(ifc.line_boxes.len(), 2);
    assert_eq!(ifc.fragments.len(), 2);
    assert_eq!(ifc.content_height, units(32.0));
}

#[test]
fn test_root_text_node_lays_out_against_the_viewport() {
    let mut tree = ElementTree::new();
    let text = tree.alloc_text("standalone");
    let store = CascadedValueStore::new();

    let box_tree = layout(&tree, &store, text);
    assert_eq!(box_tree.ifcs.len(), 1);
    assert_eq!(box_tree.ifcs[0].fragments.len(), 1);
}

// ─── cosmetics (E6 and friends) ─────────────────────────────────────────

#[test]
fn test_border_colors_survive_the_pipeline_byte_exact() {
    let css = "root { display: block; \
               border-top-width: 1px; border-right-width: 2px; \
               border-bottom-width: 3px; border-left-width: 4px; \
               border-top-color: #01020304; border-right-color: #05060708; \
               border-bottom-color: #090a0b0c; border-left-color: #0d0e0f10; }";
    let parsed = parse_stylesheet(css);
    let mut env = Environment::new();
    let sheet = build_stylesheet(&parsed, &mut env);

    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let mut store = CascadedValueStore::new();
    apply_stylesheet(&tree, &sheet, &mut store);

    let box_tree = layout(&tree, &store, root);
    let subtree = box_tree.subtree(0);

    let borders = subtree.borders(1);
    assert_eq!(borders.top, units(1.0));
    assert_eq!(borders.right, units(2.0));
    assert_eq!(borders.bottom, units(3.0));
    assert_eq!(borders.left, units(4.0));

    let colors = subtree.border_colors(1);
    assert_eq!(colors.top, Rgba::rgba(0x01, 0x02, 0x03, 0x04));
    assert_eq!(colors.right, Rgba::rgba(0x05, 0x06, 0x07, 0x08));
    assert_eq!(colors.bottom, Rgba::rgba(0x09, 0x0a, 0x0b, 0x0c));
    assert_eq!(colors.left, Rgba::rgba(0x0d, 0x0e, 0x0f, 0x10));
}

#[test]
fn test_border_color_defaults_to_current_color() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);
    store.entry_mut(root).normal.color =
        Some(Declared::Value(Color::Rgba(Rgba::rgb(10, 20, 30))));
    store.entry_mut(root).normal.border_top_width =
        Some(Declared::Value(BorderWidth::Px(1.0)));

    let box_tree = layout(&tree, &store, root);
    assert_eq!(
        box_tree.subtree(0).border_colors(1).top,
        Rgba::rgb(10, 20, 30)
    );
}

#[test]
fn test_background_color_and_canvas_propagation() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);
    store.entry_mut(root).normal.background_color =
        Some(Declared::Value(Color::Rgba(Rgba::rgb(0xf5, 0xf5, 0xf5))));

    let box_tree = layout(&tree, &store, root);
    assert_eq!(
        box_tree.subtree(0).background(1).color,
        Rgba::rgb(0xf5, 0xf5, 0xf5)
    );
    // "The background of the root element becomes the canvas background."
    assert_eq!(box_tree.canvas_background, Rgba::rgb(0xf5, 0xf5, 0xf5));
}

#[test]
fn test_text_runs_inherit_color() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let text = tree.alloc_text("colored");
    tree.append_child(root, text);

    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);
    store.entry_mut(root).normal.color =
        Some(Declared::Value(Color::Rgba(Rgba::rgb(0x20, 0x40, 0x60))));

    let box_tree = layout(&tree, &store, root);
    let FragmentContent::Text(run) = &box_tree.ifcs[0].fragments[0].content else {
        panic!("expected a text fragment");
    };
    assert_eq!(run.color, Rgba::rgb(0x20, 0x40, 0x60));
}

#[test]
fn test_background_image_resolves_against_the_image_table() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);
    set_width(&mut store, root, 100.0);
    set_height(&mut store, root, 50.0);
    store.entry_mut(root).normal.background_image = Some(Declared::Value(
        BackgroundImage::Url("cat.png".to_owned()),
    ));
    store.entry_mut(root).normal.background_size =
        Some(Declared::Value(BackgroundSize::Cover));

    let images = [NamedImage {
        url: "cat.png".to_owned(),
        data: ImageData::with_size(10, 10),
    }];

    let font = ApproximateFont::default();
    let box_tree = do_layout(
        &tree,
        &store,
        root,
        &font,
        &Images::new(&images),
        viewport(),
    )
    .expect("layout succeeds");

    let paint = box_tree.subtree(0).background(1);
    let image = paint.image.expect("image resolved");
    assert_eq!(image.image, 0);
    // Cover: a 10x10 image scales up until it covers the 100x50 area.
    assert_eq!(image.size, Size::new(units(100.0), units(100.0)));
}

#[test]
fn test_unknown_background_url_paints_no_image() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);
    store.entry_mut(root).normal.background_image = Some(Declared::Value(
        BackgroundImage::Url("missing.png".to_owned()),
    ));

    let box_tree = layout(&tree, &store, root);
    assert!(box_tree.subtree(0).background(1).image.is_none());
}

// ─── idempotence ────────────────────────────────────────────────────────

#[test]
fn test_layout_is_deterministic() {
    let mut tree = ElementTree::new();
    let root = tree.alloc_element("root");
    let a = tree.alloc_element("a");
    let text = tree.alloc_text("deterministic layout");
    tree.append_child(root, a);
    tree.append_child(a, text);

    let mut store = CascadedValueStore::new();
    make_block(&mut store, root);
    make_block(&mut store, a);
    store.entry_mut(a).normal.position = Some(Declared::Value(Position::Relative));
    store.entry_mut(a).normal.z_index = Some(Declared::Value(ZIndex::Integer(3)));

    let first = layout(&tree, &store, root);
    let second = layout(&tree, &store, root);
    assert_eq!(format!("{first:?}"), format!("{second:?}"));
}
