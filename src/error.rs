use thiserror::Error;

/// A field list that cannot be laid out. Fatal to the diagram being rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldSpecError {
    #[error("field #{index} ({}) has a non-positive bit width", display_name(.name))]
    NonPositiveWidth { index: usize, name: Option<String> },

    #[error(
        "field #{index} ({}) ends at bit {used} but the diagram is only {total} bits wide",
        display_name(.name)
    )]
    Overflow {
        index: usize,
        name: Option<String>,
        used: u64,
        total: u32,
    },

    #[error(
        "field #{index} ({}) has bit width {value}, expected a whole number of bits",
        display_name(.name)
    )]
    InvalidWidth {
        index: usize,
        name: Option<String>,
        value: String,
    },

    #[error("field #{index} ({}) has style {value}, expected 0-255", display_name(.name))]
    InvalidStyle {
        index: usize,
        name: Option<String>,
        value: String,
    },

    #[error("fields cover {used} of {total} bits and implicit padding is disabled")]
    Shortfall { used: u64, total: u32 },
}

/// Diagram options that do not describe a drawable grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("lane count must be at least 1")]
    ZeroLanes,

    #[error("total bit width must be at least 1")]
    ZeroTotalBits,

    #[error("{total_bits} bits cannot be split evenly across {lane_count} lanes")]
    IndivisibleLanes { total_bits: u32, lane_count: u32 },

    #[error("font size must be a positive finite number, got {0}")]
    InvalidFontSize(f32),

    #[error("margins must be non-negative finite numbers, got left={left} top={top}")]
    InvalidMargin { left: f32, top: f32 },

    #[error("option {option} must be a non-negative whole number below 2^32, got {value}")]
    InvalidOption { option: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagramError {
    #[error(transparent)]
    FieldSpec(#[from] FieldSpecError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Storage failure at the document boundary.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {identity}: {source}")]
    Io {
        identity: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to rasterize {identity}: {message}")]
    Rasterize { identity: String, message: String },
}

impl WriteError {
    pub fn identity(&self) -> &str {
        match self {
            WriteError::Io { identity, .. } | WriteError::Rasterize { identity, .. } => identity,
        }
    }
}

fn display_name(name: &Option<String>) -> &str {
    name.as_deref().unwrap_or("reserved")
}
