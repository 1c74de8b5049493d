use crate::config::{Config, DiagramOptions};
use crate::error::{DiagramError, WriteError};
use crate::ir::{FieldSpec, RegisterLayout};
use crate::layout::{Layout, compute_layout};
use crate::render::render_svg;
use crate::writer::{DocumentWriter, RenderedDocument};

/// One diagram to render: raw fields, their geometry, and where to store it.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramJob {
    pub identity: String,
    pub fields: Vec<FieldSpec>,
    pub options: DiagramOptions,
    /// Set when the source data could not be read exactly; the job then
    /// fails with this error instead of rendering.
    pub input_error: Option<DiagramError>,
}

impl DiagramJob {
    pub fn new(identity: impl Into<String>, fields: Vec<FieldSpec>, options: DiagramOptions) -> Self {
        Self {
            identity: identity.into(),
            fields,
            options,
            input_error: None,
        }
    }

    pub fn layout(&self, config: &Config) -> Result<Layout, DiagramError> {
        if let Some(err) = &self.input_error {
            return Err(err.clone());
        }
        self.options.validate()?;
        let register = RegisterLayout::new(self.fields.clone())?;
        compute_layout(&register, &self.options, &config.theme, &config.layout)
    }

    pub fn render(&self, config: &Config) -> Result<RenderedDocument, DiagramError> {
        let layout = self.layout(config)?;
        Ok(RenderedDocument {
            identity: self.identity.clone(),
            content: render_svg(&layout, &config.theme),
        })
    }
}

#[derive(Debug)]
pub enum BatchFailure {
    Render(DiagramError),
    Write(WriteError),
}

impl std::fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchFailure::Render(err) => write!(f, "render failed: {err}"),
            BatchFailure::Write(err) => write!(f, "{err}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<String>,
    pub failed: Vec<(String, BatchFailure)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Renders and writes every job. A failing job is logged and recorded; it
/// never stops the remaining jobs.
pub fn render_batch(
    jobs: &[DiagramJob],
    config: &Config,
    writer: &mut dyn DocumentWriter,
) -> BatchReport {
    let mut report = BatchReport::default();
    for job in jobs {
        let document = match job.render(config) {
            Ok(document) => document,
            Err(err) => {
                tracing::error!(identity = %job.identity, error = %err, "diagram rejected");
                report
                    .failed
                    .push((job.identity.clone(), BatchFailure::Render(err)));
                continue;
            }
        };
        match writer.write(&document) {
            Ok(()) => {
                tracing::info!(identity = %job.identity, bytes = document.content.len(), "wrote diagram");
                report.written.push(job.identity.clone());
            }
            Err(err) => {
                tracing::error!(identity = %job.identity, error = %err, "failed to write diagram");
                report
                    .failed
                    .push((job.identity.clone(), BatchFailure::Write(err)));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::MemoryWriter;

    fn job(identity: &str, fields: Vec<FieldSpec>, total: u32, lanes: u32) -> DiagramJob {
        DiagramJob::new(
            identity,
            fields,
            DiagramOptions {
                total_bits: total,
                lane_count: lanes,
                ..DiagramOptions::new(8, 1).unwrap()
            },
        )
    }

    struct FailingFor {
        identity: &'static str,
        inner: MemoryWriter,
    }

    impl DocumentWriter for FailingFor {
        fn write(&mut self, document: &RenderedDocument) -> Result<(), WriteError> {
            if document.identity == self.identity {
                return Err(WriteError::Io {
                    identity: document.identity.clone(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.write(document)
        }
    }

    #[test]
    fn write_failure_does_not_stop_siblings() {
        let jobs = vec![
            job("a.svg", vec![FieldSpec::named("A", 8)], 8, 1),
            job("b.svg", vec![FieldSpec::named("B", 8)], 8, 1),
            job("c.svg", vec![FieldSpec::named("C", 8)], 8, 1),
        ];
        let mut writer = FailingFor {
            identity: "b.svg",
            inner: MemoryWriter::default(),
        };
        let report = render_batch(&jobs, &Config::default(), &mut writer);
        assert_eq!(report.written, vec!["a.svg", "c.svg"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "b.svg");
        assert!(matches!(report.failed[0].1, BatchFailure::Write(_)));
        assert!(!report.is_success());
    }

    #[test]
    fn rejected_diagram_produces_no_document() {
        let jobs = vec![
            job("zero.svg", vec![FieldSpec::named("X", 0)], 8, 1),
            job("lanes.svg", vec![FieldSpec::named("Y", 8)], 8, 3),
            job("ok.svg", vec![FieldSpec::named("Z", 8)], 8, 1),
        ];
        let mut writer = MemoryWriter::default();
        let report = render_batch(&jobs, &Config::default(), &mut writer);
        assert_eq!(report.written, vec!["ok.svg"]);
        assert_eq!(writer.documents.len(), 1);
        assert!(writer.get("zero.svg").is_none());
        let failed: Vec<&str> = report.failed.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(failed, vec!["zero.svg", "lanes.svg"]);
        assert!(report.failed[1].1.to_string().contains("3 lanes"));
    }
}
