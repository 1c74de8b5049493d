pub mod batch;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod markup;
pub mod render;
pub mod serialize;
pub mod text_metrics;
pub mod theme;
pub mod writer;

pub use batch::{BatchFailure, BatchReport, DiagramJob, render_batch};
pub use config::{
    Config, DiagramOptions, LayoutConfig, Margin, ShortfallPolicy, load_config, load_diagram_set,
    parse_diagram_set,
};
pub use error::{ConfigurationError, DiagramError, FieldSpecError, WriteError};
pub use ir::{FieldSpec, RegisterLayout, StyleCode};
pub use layout::{Layout, Segment, compute_layout, compute_segments};
pub use markup::{Element, MarkupNode};
pub use render::{build_markup, render_svg};
pub use theme::{FieldStyle, Theme};
pub use writer::{DocumentWriter, FsWriter, MemoryWriter, RenderedDocument};

#[cfg(feature = "cli")]
pub use cli::run;

/// Lays out and serializes one diagram.
pub fn render_diagram(
    register: &RegisterLayout,
    options: &DiagramOptions,
    config: &Config,
) -> Result<String, DiagramError> {
    let layout = compute_layout(register, options, &config.theme, &config.layout)?;
    Ok(render_svg(&layout, &config.theme))
}
