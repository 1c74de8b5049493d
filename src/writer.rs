use crate::config::RenderConfig;
use crate::error::WriteError;
use std::path::{Path, PathBuf};

/// A serialized diagram and the name it should be stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub identity: String,
    pub content: String,
}

/// Storage boundary for rendered documents.
pub trait DocumentWriter {
    fn write(&mut self, document: &RenderedDocument) -> Result<(), WriteError>;
}

/// Writes each document into a directory, named by its identity. Identities
/// ending in `.png` are rasterized when the `png` feature is enabled.
#[derive(Debug, Clone)]
pub struct FsWriter {
    root: PathBuf,
    render: RenderConfig,
}

impl FsWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            render: RenderConfig::default(),
        }
    }

    pub fn with_render_config(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    pub fn path_for(&self, identity: &str) -> PathBuf {
        self.root.join(identity)
    }
}

impl DocumentWriter for FsWriter {
    fn write(&mut self, document: &RenderedDocument) -> Result<(), WriteError> {
        let path = self.path_for(&document.identity);
        let io_error = |source| WriteError::Io {
            identity: document.identity.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let is_png = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if is_png {
            write_output_png(&document.content, &path, &self.render).map_err(|err| {
                WriteError::Rasterize {
                    identity: document.identity.clone(),
                    message: format!("{err:#}"),
                }
            })
        } else {
            write_output_svg(&document.content, &path).map_err(io_error)
        }
    }
}

/// Keeps documents in memory, in write order.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    pub documents: Vec<RenderedDocument>,
}

impl MemoryWriter {
    pub fn get(&self, identity: &str) -> Option<&RenderedDocument> {
        self.documents.iter().find(|doc| doc.identity == identity)
    }
}

impl DocumentWriter for MemoryWriter {
    fn write(&mut self, document: &RenderedDocument) -> Result<(), WriteError> {
        self.documents.push(document.clone());
        Ok(())
    }
}

pub fn write_output_svg(svg: &str, output: &Path) -> std::io::Result<()> {
    std::fs::write(output, svg)
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> anyhow::Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let scale = if render_cfg.scale > 0.0 {
        render_cfg.scale
    } else {
        1.0
    };
    let size = tree
        .size()
        .to_int_size()
        .scale_by(scale)
        .ok_or_else(|| anyhow::anyhow!("invalid output size at scale {scale}"))?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("failed to allocate {}x{} pixmap", size.width(), size.height()))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> anyhow::Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}
