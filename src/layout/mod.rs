mod text;
pub(crate) mod types;
pub use types::*;

use text::place_label;

use crate::config::{DiagramOptions, LayoutConfig, ShortfallPolicy};
use crate::error::{DiagramError, FieldSpecError};
use crate::ir::{RegisterLayout, StyleCode};
use crate::theme::Theme;

/// Splits every field of `register` into per-lane segments.
///
/// Options are validated before anything else. A field that would run past
/// `total_bits` is an error; a shortfall is handled according to `shortfall`.
pub fn compute_segments(
    register: &RegisterLayout,
    options: &DiagramOptions,
    shortfall: ShortfallPolicy,
) -> Result<Vec<Segment>, DiagramError> {
    let bits_per_lane = u64::from(options.validate()?);
    let total = u64::from(options.total_bits);

    let mut segments = Vec::with_capacity(register.len());
    let mut offset = 0u64;
    for (index, field) in register.fields().iter().enumerate() {
        if field.bits == 0 {
            return Err(FieldSpecError::NonPositiveWidth {
                index,
                name: field.name.clone(),
            }
            .into());
        }
        let end = offset + u64::from(field.bits);
        if end > total {
            return Err(FieldSpecError::Overflow {
                index,
                name: field.name.clone(),
                used: end,
                total: options.total_bits,
            }
            .into());
        }
        split_range(
            Some(index),
            offset..end,
            field.name.as_deref(),
            field.style,
            bits_per_lane,
            &mut segments,
        );
        offset = end;
    }

    if offset < total {
        match shortfall {
            ShortfallPolicy::Pad => {
                tracing::debug!(used = offset, total, "padding unassigned bits");
                split_range(None, offset..total, None, None, bits_per_lane, &mut segments);
            }
            ShortfallPolicy::Reject => {
                return Err(FieldSpecError::Shortfall {
                    used: offset,
                    total: options.total_bits,
                }
                .into());
            }
        }
    }

    Ok(segments)
}

fn split_range(
    field_index: Option<usize>,
    range: std::ops::Range<u64>,
    label: Option<&str>,
    style: Option<StyleCode>,
    bits_per_lane: u64,
    out: &mut Vec<Segment>,
) {
    let mut cursor = range.start;
    while cursor < range.end {
        let lane = cursor / bits_per_lane;
        let stop = range.end.min((lane + 1) * bits_per_lane);
        // Lane and in-lane values are bounded by total_bits, which is a u32.
        out.push(Segment {
            field_index,
            lane_index: lane as u32,
            bit_offset_in_lane: (cursor % bits_per_lane) as u32,
            bit_width_in_lane: (stop - cursor) as u32,
            global_offset: cursor,
            label: label.map(str::to_string),
            style,
        });
        cursor = stop;
    }
}

/// Computes the complete pixel geometry of one diagram.
pub fn compute_layout(
    register: &RegisterLayout,
    options: &DiagramOptions,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<Layout, DiagramError> {
    let segments = compute_segments(register, options, config.shortfall)?;
    let bits_per_lane = options.total_bits / options.lane_count;

    let font_size = options.font_size;
    let margin = options.margin;
    let cell_width = font_size * config.cell_width_em;
    let row_height = font_size * config.row_height_em;

    let segments: Vec<SegmentLayout> = segments
        .into_iter()
        .map(|segment| {
            let rect = Rect {
                x: segment.bit_offset_in_lane as f32 * cell_width + margin.left,
                y: segment.lane_index as f32 * row_height + margin.top,
                width: segment.bit_width_in_lane as f32 * cell_width,
                height: row_height,
            };
            let style = theme.field_style(segment.style, segment.is_reserved());
            let label = segment
                .label
                .as_deref()
                .map(|text| place_label(text, &rect, font_size, theme, config));
            let ticks = (1..segment.bit_width_in_lane)
                .map(|bit| rect.x + bit as f32 * cell_width)
                .collect();
            SegmentLayout {
                segment,
                rect,
                style,
                label,
                ticks,
            }
        })
        .collect();

    let lane_font_size = font_size * config.lane_label_font_scale;
    let lanes = (0..options.lane_count)
        .map(|index| {
            let first_bit =
                u64::from(options.label_offset) + u64::from(index) * u64::from(bits_per_lane);
            let last_bit = first_bit + u64::from(bits_per_lane) - 1;
            let y = index as f32 * row_height + margin.top;
            LaneLayout {
                index,
                first_bit,
                last_bit,
                y,
                height: row_height,
                label: LabelPlacement {
                    text: format!("{first_bit}-{last_bit}"),
                    x: margin.left / 2.0,
                    y: y + row_height / 2.0,
                    font_size: lane_font_size,
                    orientation: LabelOrientation::Vertical,
                },
            }
        })
        .collect();

    let layout = Layout {
        lanes,
        segments,
        bits_per_lane,
        cell_width,
        row_height,
        tick_length: row_height * config.tick_ratio,
        font_size,
        margin,
        width: margin.left * 2.0 + bits_per_lane as f32 * cell_width,
        height: margin.top * 2.0 + options.lane_count as f32 * row_height,
    };
    tracing::debug!(
        lanes = options.lane_count,
        bits_per_lane,
        segments = layout.segments.len(),
        width = layout.width,
        height = layout.height,
        "computed bit-field layout"
    );
    Ok(layout)
}
