use crate::layout::{LabelOrientation, Layout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub bits_per_lane: u32,
    pub cell_width: f32,
    pub row_height: f32,
    pub lanes: Vec<LaneDump>,
    pub segments: Vec<SegmentDump>,
}

#[derive(Debug, Serialize)]
pub struct LaneDump {
    pub index: u32,
    pub first_bit: u64,
    pub last_bit: u64,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct SegmentDump {
    pub field_index: Option<usize>,
    pub lane: u32,
    pub bit_offset: u32,
    pub bit_width: u32,
    pub global_offset: u64,
    pub label: Option<String>,
    pub style: Option<u8>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub fill: Option<String>,
    pub hatched: bool,
    pub label_orientation: Option<String>,
    pub label_font_size: Option<f32>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let lanes = layout
            .lanes
            .iter()
            .map(|lane| LaneDump {
                index: lane.index,
                first_bit: lane.first_bit,
                last_bit: lane.last_bit,
                y: lane.y,
            })
            .collect();

        let segments = layout
            .segments
            .iter()
            .map(|seg| SegmentDump {
                field_index: seg.segment.field_index,
                lane: seg.segment.lane_index,
                bit_offset: seg.segment.bit_offset_in_lane,
                bit_width: seg.segment.bit_width_in_lane,
                global_offset: seg.segment.global_offset,
                label: seg.segment.label.clone(),
                style: seg.segment.style.map(|code| code.0),
                x: seg.rect.x,
                y: seg.rect.y,
                width: seg.rect.width,
                height: seg.rect.height,
                fill: seg.style.fill.clone(),
                hatched: seg.style.hatched,
                label_orientation: seg.label.as_ref().map(|label| match label.orientation {
                    LabelOrientation::Horizontal => "horizontal".to_string(),
                    LabelOrientation::Vertical => "vertical".to_string(),
                }),
                label_font_size: seg.label.as_ref().map(|label| label.font_size),
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            bits_per_lane: layout.bits_per_lane,
            cell_width: layout.cell_width,
            row_height: layout.row_height,
            lanes,
            segments,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
