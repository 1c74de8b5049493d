use bitlane::markup::{Element, MarkupNode};
use bitlane::{
    Config, DiagramOptions, FieldSpec, LayoutConfig, RegisterLayout, ShortfallPolicy, Theme,
    compute_layout, compute_segments, render_diagram, serialize,
};
use proptest::prelude::*;

/// Field widths plus a lane geometry wide enough to hold them.
fn register_and_options() -> impl Strategy<Value = (Vec<u32>, u32, u32)> {
    (prop::collection::vec(1u32..40, 1..24), 1u32..17).prop_flat_map(|(widths, bits_per_lane)| {
        let used: u32 = widths.iter().sum();
        let min_lanes = used.div_ceil(bits_per_lane);
        (Just(widths), Just(bits_per_lane), min_lanes..min_lanes + 3)
    })
}

fn build(widths: &[u32]) -> RegisterLayout {
    let fields = widths
        .iter()
        .enumerate()
        .map(|(i, bits)| {
            if i % 3 == 2 {
                FieldSpec::reserved(*bits).with_style(1)
            } else {
                FieldSpec::named(format!("F{i}"), *bits)
            }
        })
        .collect();
    RegisterLayout::new(fields).unwrap()
}

fn tag_names(node: &MarkupNode) -> Vec<String> {
    node.elements().iter().map(|el| el.tag.clone()).collect()
}

fn markup_tree() -> impl Strategy<Value = MarkupNode> {
    let leaf = prop_oneof![
        "[a-z<>&\"' ]{0,8}".prop_map(MarkupNode::Text),
        "[a-z]{1,6}".prop_map(|tag| MarkupNode::Element(Element::new(tag).attr("k", "v<&>"))),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        ("[a-z]{1,6}", prop::collection::vec(inner, 0..4)).prop_map(|(tag, children)| {
            let mut el = Element::new(tag);
            for child in children {
                el.push(child);
            }
            MarkupNode::Element(el)
        })
    })
}

proptest! {
    #[test]
    fn segments_cover_each_field_exactly((widths, bits_per_lane, lanes) in register_and_options()) {
        let reg = build(&widths);
        let options = DiagramOptions::new(bits_per_lane * lanes, lanes).unwrap();
        let segments = compute_segments(&reg, &options, ShortfallPolicy::Pad).unwrap();

        // Segments tile the whole diagram in order, with no gap or overlap.
        let mut cursor = 0u64;
        for seg in &segments {
            prop_assert_eq!(seg.global_offset, cursor);
            prop_assert!(seg.bit_width_in_lane >= 1);
            prop_assert!(seg.bit_offset_in_lane + seg.bit_width_in_lane <= bits_per_lane);
            prop_assert_eq!(
                seg.global_offset,
                u64::from(seg.lane_index) * u64::from(bits_per_lane) + u64::from(seg.bit_offset_in_lane)
            );
            cursor += u64::from(seg.bit_width_in_lane);
        }
        prop_assert_eq!(cursor, u64::from(options.total_bits));

        let mut offset = 0u64;
        for (index, bits) in widths.iter().enumerate() {
            let own: Vec<_> = segments.iter().filter(|s| s.field_index == Some(index)).collect();
            let covered: u64 = own.iter().map(|s| u64::from(s.bit_width_in_lane)).sum();
            prop_assert_eq!(covered, u64::from(*bits));
            prop_assert_eq!(own[0].global_offset, offset);

            // ceil((o mod L + bits) / L) segments per field.
            let expected = (offset % u64::from(bits_per_lane) + u64::from(*bits))
                .div_ceil(u64::from(bits_per_lane));
            prop_assert_eq!(own.len() as u64, expected);
            prop_assert!(own.iter().all(|s| s.label == own[0].label && s.style == own[0].style));
            offset += u64::from(*bits);
        }
    }

    #[test]
    fn rect_width_recovers_bit_count((widths, bits_per_lane, lanes) in register_and_options()) {
        let reg = build(&widths);
        let options = DiagramOptions::new(bits_per_lane * lanes, lanes).unwrap().with_font_size(10.0);
        let layout = compute_layout(&reg, &options, &Theme::classic(), &LayoutConfig::default()).unwrap();
        for seg in &layout.segments {
            let bits = (seg.rect.width / layout.cell_width).round() as u32;
            prop_assert_eq!(bits, seg.segment.bit_width_in_lane);
            prop_assert_eq!(seg.ticks.len() as u32, seg.segment.bit_width_in_lane - 1);
        }
    }

    #[test]
    fn overflow_is_always_rejected(widths in prop::collection::vec(1u32..40, 1..12)) {
        let reg = build(&widths);
        let used: u32 = widths.iter().sum();
        let total = used - 1;
        prop_assume!(total > 0);
        let options = DiagramOptions::new(total, 1).unwrap();
        prop_assert!(compute_segments(&reg, &options, ShortfallPolicy::Pad).is_err());
    }

    #[test]
    fn rendering_twice_is_identical((widths, bits_per_lane, lanes) in register_and_options()) {
        let reg = build(&widths);
        let options = DiagramOptions::new(bits_per_lane * lanes, lanes).unwrap().with_label_offset(62);
        let config = Config::default();
        prop_assert_eq!(
            render_diagram(&reg, &options, &config).unwrap(),
            render_diagram(&reg, &options, &config).unwrap()
        );
    }

    #[test]
    fn serialized_tags_balance(tree in markup_tree()) {
        let text = serialize::to_string(&tree);
        let mut stack: Vec<String> = Vec::new();
        let mut opened = Vec::new();
        let mut rest = text.as_str();
        while let Some(start) = rest.find('<') {
            let end = rest[start..].find('>').map(|i| start + i).unwrap();
            let tag = &rest[start + 1..end];
            if let Some(name) = tag.strip_prefix('/') {
                let top = stack.pop();
                prop_assert_eq!(top.as_deref(), Some(name));
            } else {
                let name = tag.split(' ').next().unwrap().trim_end_matches('/').to_string();
                opened.push(name.clone());
                if !tag.ends_with('/') {
                    stack.push(name);
                }
            }
            rest = &rest[end + 1..];
        }
        prop_assert!(stack.is_empty());
        prop_assert_eq!(opened, tag_names(&tree));
    }
}
