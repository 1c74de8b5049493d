use crate::config::Margin;
use crate::ir::StyleCode;
use crate::theme::FieldStyle;

/// The part of one field that falls inside a single lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Index into the register layout; `None` for implicit padding.
    pub field_index: Option<usize>,
    pub lane_index: u32,
    pub bit_offset_in_lane: u32,
    pub bit_width_in_lane: u32,
    /// Offset of the segment's first bit from the start of the diagram.
    pub global_offset: u64,
    pub label: Option<String>,
    pub style: Option<StyleCode>,
}

impl Segment {
    pub fn is_reserved(&self) -> bool {
        self.label.is_none()
    }

    pub fn is_implicit_padding(&self) -> bool {
        self.field_index.is_none()
    }

    pub fn global_range(&self) -> std::ops::Range<u64> {
        self.global_offset..self.global_offset + u64::from(self.bit_width_in_lane)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOrientation {
    Horizontal,
    /// Rotated -90 degrees, reading bottom to top.
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelPlacement {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub orientation: LabelOrientation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentLayout {
    pub segment: Segment,
    pub rect: Rect,
    pub style: FieldStyle,
    pub label: Option<LabelPlacement>,
    /// X coordinates of interior bit boundaries.
    pub ticks: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaneLayout {
    pub index: u32,
    pub first_bit: u64,
    pub last_bit: u64,
    pub y: f32,
    pub height: f32,
    pub label: LabelPlacement,
}

/// Fully resolved geometry of one diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub lanes: Vec<LaneLayout>,
    /// Ordered by lane, then by bit offset within the lane.
    pub segments: Vec<SegmentLayout>,
    pub bits_per_lane: u32,
    pub cell_width: f32,
    pub row_height: f32,
    pub tick_length: f32,
    pub font_size: f32,
    pub margin: Margin,
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn segments_in_lane(&self, lane: u32) -> impl Iterator<Item = &SegmentLayout> {
        self.segments
            .iter()
            .filter(move |seg| seg.segment.lane_index == lane)
    }

    pub fn uses_hatching(&self) -> bool {
        self.segments.iter().any(|seg| seg.style.hatched)
    }
}
