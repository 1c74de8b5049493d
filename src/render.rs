use crate::layout::{LabelOrientation, LabelPlacement, Layout, SegmentLayout};
use crate::markup::{Element, MarkupNode, num};
use crate::serialize;
use crate::theme::{FieldStyle, Theme};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const HATCH_ID: &str = "bitlane-hatch";
const HATCH_SPACING: f32 = 6.0;

pub fn render_svg(layout: &Layout, theme: &Theme) -> String {
    serialize::to_string(&build_markup(layout, theme))
}

/// Builds the drawing tree for a computed layout.
///
/// Children of the root are the optional `defs` and background, then one
/// group per lane. Each lane group holds the lane label followed by every
/// segment in bit order as `rect`, tick `line`s, and an optional `text`.
pub fn build_markup(layout: &Layout, theme: &Theme) -> MarkupNode {
    let mut svg = Element::new("svg")
        .attr("xmlns", SVG_NS)
        .attr("width", num(layout.width))
        .attr("height", num(layout.height))
        .attr(
            "viewBox",
            format!("0 0 {} {}", num(layout.width), num(layout.height)),
        );

    if layout.uses_hatching() {
        svg.push(hatch_defs(theme));
    }

    if theme.background != "none" {
        svg.push(
            Element::new("rect")
                .attr("x", 0)
                .attr("y", 0)
                .attr("width", num(layout.width))
                .attr("height", num(layout.height))
                .attr("fill", &theme.background),
        );
    }

    for lane in &layout.lanes {
        let mut group = Element::new("g")
            .attr("class", "lane")
            .attr("data-lane", lane.index);
        group.push(text_element(&lane.label, theme, &theme.lane_label_color));
        for segment in layout.segments_in_lane(lane.index) {
            push_segment(&mut group, segment, layout, theme);
        }
        svg.push(group);
    }

    svg.into()
}

fn hatch_defs(theme: &Theme) -> Element {
    let line = Element::new("line")
        .attr("x1", 0)
        .attr("y1", 0)
        .attr("x2", 0)
        .attr("y2", num(HATCH_SPACING))
        .attr("stroke", &theme.hatch_color)
        .attr("stroke-width", 2);
    let pattern = Element::new("pattern")
        .attr("id", HATCH_ID)
        .attr("patternUnits", "userSpaceOnUse")
        .attr("width", num(HATCH_SPACING))
        .attr("height", num(HATCH_SPACING))
        .attr("patternTransform", "rotate(45)")
        .child(line);
    Element::new("defs").child(pattern)
}

fn fill_for(style: &FieldStyle) -> String {
    if style.hatched {
        format!("url(#{HATCH_ID})")
    } else {
        style.fill.clone().unwrap_or_else(|| "none".to_string())
    }
}

fn push_segment(group: &mut Element, seg: &SegmentLayout, layout: &Layout, theme: &Theme) {
    let rect = &seg.rect;
    let mut outline = Element::new("rect")
        .attr("x", num(rect.x))
        .attr("y", num(rect.y))
        .attr("width", num(rect.width))
        .attr("height", num(rect.height))
        .attr("fill", fill_for(&seg.style))
        .attr("stroke", &theme.stroke_color)
        .attr("stroke-width", num(theme.stroke_width));
    if seg.segment.is_implicit_padding() {
        outline.set_attr("class", "padding");
    }
    group.push(outline);

    let top = rect.y;
    let bottom = rect.y + rect.height;
    for x in &seg.ticks {
        for (y1, y2) in [
            (top, top + layout.tick_length),
            (bottom - layout.tick_length, bottom),
        ] {
            group.push(
                Element::new("line")
                    .attr("x1", num(*x))
                    .attr("y1", num(y1))
                    .attr("x2", num(*x))
                    .attr("y2", num(y2))
                    .attr("stroke", &theme.tick_color)
                    .attr("stroke-width", num(theme.stroke_width)),
            );
        }
    }

    if let Some(label) = &seg.label {
        group.push(text_element(label, theme, &theme.text_color));
    }
}

fn text_element(label: &LabelPlacement, theme: &Theme, fill: &str) -> Element {
    let mut text = Element::new("text")
        .attr("x", num(label.x))
        .attr("y", num(label.y))
        .attr("font-family", &theme.font_family)
        .attr("font-size", num(label.font_size))
        .attr("font-weight", &theme.font_weight)
        .attr("fill", fill)
        .attr("text-anchor", "middle")
        .attr("dominant-baseline", "central");
    if label.orientation == LabelOrientation::Vertical {
        text.set_attr(
            "transform",
            format!("rotate(-90 {} {})", num(label.x), num(label.y)),
        );
    }
    text.text(label.text.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DiagramOptions, LayoutConfig};
    use crate::ir::{FieldSpec, RegisterLayout};
    use crate::layout::compute_layout;

    fn layout_for(fields: Vec<FieldSpec>, options: DiagramOptions) -> Layout {
        let reg = RegisterLayout::new(fields).unwrap();
        compute_layout(&reg, &options, &Theme::classic(), &LayoutConfig::default()).unwrap()
    }

    fn lane_groups(tree: &MarkupNode) -> Vec<&Element> {
        tree.as_element()
            .unwrap()
            .children
            .iter()
            .filter_map(MarkupNode::as_element)
            .filter(|el| el.tag == "g")
            .collect()
    }

    #[test]
    fn render_svg_basic() {
        let layout = layout_for(
            vec![FieldSpec::named("CRC16", 16)],
            DiagramOptions::new(16, 2).unwrap().with_label_offset(62),
        );
        let svg = render_svg(&layout, &Theme::classic());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches(">CRC16</text>").count(), 2);
        assert!(svg.contains(">62-69</text>"));
        assert!(svg.contains(">70-77</text>"));
    }

    #[test]
    fn lane_children_follow_bit_order() {
        let layout = layout_for(
            vec![
                FieldSpec::named("A", 2),
                FieldSpec::reserved(2),
                FieldSpec::named("B", 4),
            ],
            DiagramOptions::new(8, 1).unwrap(),
        );
        let tree = build_markup(&layout, &Theme::classic());
        let groups = lane_groups(&tree);
        assert_eq!(groups.len(), 1);
        let sequence: Vec<String> = groups[0]
            .children
            .iter()
            .filter_map(MarkupNode::as_element)
            .map(|el| match el.tag.as_str() {
                "text" => format!("text:{}", el.text_content()),
                other => other.to_string(),
            })
            .collect();
        assert_eq!(
            sequence,
            vec![
                "text:0-7", "rect", "line", "line", "text:A", "rect", "line", "line", "rect",
                "line", "line", "line", "line", "line", "line", "text:B",
            ]
        );
    }

    #[test]
    fn hatch_pattern_only_when_used() {
        let plain = layout_for(
            vec![FieldSpec::named("A", 8)],
            DiagramOptions::new(8, 1).unwrap(),
        );
        let tree = build_markup(&plain, &Theme::classic());
        assert!(tree.elements().iter().all(|el| el.tag != "defs"));

        let reserved = layout_for(
            vec![FieldSpec::reserved(8).with_style(1)],
            DiagramOptions::new(8, 1).unwrap(),
        );
        let tree = build_markup(&reserved, &Theme::classic());
        let rect = tree
            .elements()
            .into_iter()
            .find(|el| el.tag == "rect")
            .unwrap();
        assert_eq!(rect.get_attr("fill"), Some("url(#bitlane-hatch)"));
        assert!(tree.elements().iter().any(|el| el.tag == "pattern"));
    }

    #[test]
    fn vertical_labels_are_rotated_about_their_anchor() {
        let reg =
            RegisterLayout::new(vec![FieldSpec::named("BEATJUMP_FWD", 1), FieldSpec::reserved(7)])
                .unwrap();
        let options = DiagramOptions::new(8, 1).unwrap().with_font_size(10.0);
        let config = LayoutConfig {
            row_height_em: 12.0,
            ..LayoutConfig::default()
        };
        let layout = compute_layout(&reg, &options, &Theme::classic(), &config).unwrap();
        let tree = build_markup(&layout, &Theme::classic());
        let label = tree
            .elements()
            .into_iter()
            .find(|el| el.tag == "text" && el.text_content() == "BEATJUMP_FWD")
            .unwrap();
        let (x, y) = (label.get_attr("x").unwrap(), label.get_attr("y").unwrap());
        assert_eq!(
            label.get_attr("transform"),
            Some(format!("rotate(-90 {x} {y})").as_str())
        );
    }

    #[test]
    fn background_rect_follows_theme() {
        let layout = layout_for(
            vec![FieldSpec::named("A", 8)],
            DiagramOptions::new(8, 1).unwrap(),
        );
        let tree = build_markup(&layout, &Theme::mono());
        let first = tree.as_element().unwrap().children[0].as_element().unwrap();
        assert_eq!(first.tag, "rect");
        assert_eq!(first.get_attr("fill"), Some("#FFFFFF"));
    }
}
