//! Property-based tests for transforms, styled text, and the box fast path.
//!
//! Uses proptest to find edge cases automatically through randomized
//! testing.

use boxel::prelude::*;
use proptest::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

// ============================================================================
// AffineTransform Property Tests
// ============================================================================

proptest! {
    /// T * T.inverse() maps any point back to itself (within tolerance).
    #[test]
    fn transform_inverse_round_trips(
        tx in -100.0f64..100.0,
        ty in -100.0f64..100.0,
        sx in 0.1f64..10.0,
        sy in 0.1f64..10.0,
        angle in -3.0f64..3.0,
        px in -50.0f64..50.0,
        py in -50.0f64..50.0,
    ) {
        let t = AffineTransform::IDENTITY
            .translate(tx, ty)
            .scale_xy(sx, sy)
            .rotate(angle);
        let inverse = t.inverse().expect("non-degenerate by construction");

        let p = Point::new(px, py);
        let round_tripped = inverse.apply(t.apply(p));
        prop_assert!((round_tripped.x - p.x).abs() < 1e-6);
        prop_assert!((round_tripped.y - p.y).abs() < 1e-6);

        let composed = t * inverse;
        let mapped = composed.apply(p);
        prop_assert!((mapped.x - p.x).abs() < 1e-6);
        prop_assert!((mapped.y - p.y).abs() < 1e-6);
    }

    /// Composition order matches sequential application.
    #[test]
    fn transform_composition_is_application_order(
        tx in -50.0f64..50.0,
        angle in -3.0f64..3.0,
        px in -50.0f64..50.0,
        py in -50.0f64..50.0,
    ) {
        let a = AffineTransform::translation(tx, 0.0);
        let b = AffineTransform::rotation(angle);
        let p = Point::new(px, py);

        // (a * b) applies b first, then a.
        let composed = (a * b).apply(p);
        let sequential = a.apply(b.apply(p));
        prop_assert!((composed.x - sequential.x).abs() < 1e-9);
        prop_assert!((composed.y - sequential.y).abs() < 1e-9);
    }

    /// Translation round-trips exactly through component accessors.
    #[test]
    fn transform_translation_components(
        tx in -1000.0f64..1000.0,
        ty in -1000.0f64..1000.0,
    ) {
        let t = AffineTransform::translation(tx, ty);
        prop_assert_eq!(t.translate_x(), tx);
        prop_assert_eq!(t.translate_y(), ty);
        prop_assert_eq!(t.scale_x(), 1.0);
        prop_assert_eq!(t.scale_y(), 1.0);
    }
}

// ============================================================================
// StyledText Property Tests
// ============================================================================

fn arb_style() -> impl Strategy<Value = TextStyle> {
    prop_oneof![
        Just(TextStyle::new()),
        Just(TextStyle::new().foreground(Color::RED)),
        Just(TextStyle::new().foreground(Color::BLUE)),
        Just(TextStyle::new().background(Color::GREEN)),
    ]
}

proptest! {
    /// Merging is canonical: chunked concatenation and run-at-a-time
    /// appends of the same (text, style) sequence build equal values.
    #[test]
    fn styled_text_merge_is_canonical(
        pieces in prop::collection::vec(("[a-z]{1,4}", arb_style()), 1..12),
        split in 0usize..12,
    ) {
        let sequential = pieces
            .iter()
            .skip(1)
            .fold(
                StyledText::styled(&pieces[0].0, pieces[0].1.clone()),
                |acc, (text, style)| acc.append(text, style.clone()),
            );

        let split = split.min(pieces.len() - 1);
        let chunked = if split == 0 {
            sequential.clone()
        } else {
            let left = pieces[..split]
                .iter()
                .skip(1)
                .fold(
                    StyledText::styled(&pieces[0].0, pieces[0].1.clone()),
                    |acc, (text, style)| acc.append(text, style.clone()),
                );
            let right = pieces[split..]
                .iter()
                .skip(1)
                .fold(
                    StyledText::styled(&pieces[split].0, pieces[split].1.clone()),
                    |acc, (text, style)| acc.append(text, style.clone()),
                );
            left + right
        };

        prop_assert_eq!(&sequential, &chunked);
        prop_assert_eq!(hash_of(&sequential), hash_of(&chunked));
    }

    /// No two adjacent runs ever share a style, and the joined text is
    /// preserved.
    #[test]
    fn styled_text_runs_are_maximal(
        pieces in prop::collection::vec(("[a-z]{1,4}", arb_style()), 1..12),
    ) {
        let text = pieces
            .iter()
            .skip(1)
            .fold(
                StyledText::styled(&pieces[0].0, pieces[0].1.clone()),
                |acc, (t, style)| acc.append(t, style.clone()),
            );

        let expected: String = pieces.iter().map(|(t, _)| t.as_str()).collect();
        prop_assert_eq!(text.text(), expected);

        for window in text.runs().windows(2) {
            prop_assert_ne!(window[0].style(), window[1].style());
        }
    }
}

// ============================================================================
// Canvas Fast-Path Property Tests
// ============================================================================

proptest! {
    /// The half-pixel rule: a sub-pixel dimension doubles and gains a 0.5
    /// scale; the other axis is untouched.
    #[test]
    fn half_pixel_compensation_holds(
        width in 0.01f64..50.0,
        height in 0.01f64..50.0,
    ) {
        let mut canvas = Canvas::new(Size::new(100.0, 100.0));
        canvas.rect(Rect::new(0.0, 0.0, width, height), &Fill::solid(Color::RED));

        let node = canvas.tree().children(canvas.render_parent())[0];
        let style = canvas.tree().style(node);
        let size = style.size.expect("size always set");
        let transform = style.transform.expect("transform always set");

        if height < 1.0 {
            prop_assert_eq!(size.height, height * 2.0);
            prop_assert_eq!(transform.scale_y(), 0.5);
        } else {
            prop_assert_eq!(size.height, height);
            prop_assert_eq!(transform.scale_y(), 1.0);
        }

        if width < 1.0 {
            prop_assert_eq!(size.width, width * 2.0);
            prop_assert_eq!(transform.scale_x(), 0.5);
        } else {
            prop_assert_eq!(size.width, width);
            prop_assert_eq!(transform.scale_x(), 1.0);
        }
    }

    /// A solid fill draws a box node iff it is visible; invisible fills
    /// leave the tree untouched.
    #[test]
    fn solid_fill_visibility_gates_drawing(opacity in 0.0f32..1.0) {
        let mut canvas = Canvas::new(Size::new(100.0, 100.0));
        let color = Color::RED.with_opacity(opacity);
        canvas.rect(Rect::new(0.0, 0.0, 10.0, 10.0), &Fill::solid(color));

        let drawn = canvas.tree().num_children(canvas.render_parent());
        if opacity > 0.0 {
            prop_assert_eq!(drawn, 1);
            let node = canvas.tree().children(canvas.render_parent())[0];
            prop_assert_eq!(canvas.tree().kind(node), ElementKind::Box);
        } else {
            prop_assert_eq!(drawn, 0);
        }
    }

    /// Re-rendering a random rect sequence is structurally idempotent.
    #[test]
    fn random_frames_reuse_all_nodes(
        rects in prop::collection::vec(
            (0.0f64..90.0, 0.0f64..90.0, 1.0f64..10.0, 1.0f64..10.0),
            1..20,
        ),
    ) {
        let mut canvas = Canvas::new(Size::new(100.0, 100.0));

        let draw = |c: &mut Canvas, rects: &[(f64, f64, f64, f64)]| {
            for (x, y, w, h) in rects {
                c.rect(Rect::new(*x, *y, *w, *h), &Fill::solid(Color::GREEN));
            }
        };

        canvas.clear();
        draw(&mut canvas, &rects);
        canvas.flush();
        let first: Vec<NodeId> = canvas.tree().children(canvas.render_parent()).to_vec();
        let arena = canvas.tree().len();

        canvas.clear();
        draw(&mut canvas, &rects);
        canvas.flush();

        prop_assert_eq!(canvas.tree().children(canvas.render_parent()), &first[..]);
        prop_assert_eq!(canvas.tree().len(), arena);
    }
}
