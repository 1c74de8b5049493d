use crate::batch::DiagramJob;
use crate::error::{ConfigurationError, DiagramError, FieldSpecError};
use crate::ir::{FieldSpec, StyleCode};
use crate::theme::{FieldStyle, Theme};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_FONT_SIZE: f32 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub left: f32,
    pub top: f32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            left: 16.0,
            top: 10.0,
        }
    }
}

/// Geometry of one diagram: how many bits it spans and how they wrap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagramOptions {
    pub font_size: f32,
    pub margin: Margin,
    /// Bit index printed for the first bit of the first lane.
    pub label_offset: u32,
    pub lane_count: u32,
    pub total_bits: u32,
}

impl DiagramOptions {
    pub fn new(total_bits: u32, lane_count: u32) -> Result<Self, ConfigurationError> {
        let options = Self {
            font_size: DEFAULT_FONT_SIZE,
            margin: Margin::default(),
            label_offset: 0,
            lane_count,
            total_bits,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn with_label_offset(mut self, label_offset: u32) -> Self {
        self.label_offset = label_offset;
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_margin(mut self, left: f32, top: f32) -> Self {
        self.margin = Margin { left, top };
        self
    }

    /// Checks the options and returns the number of bits per lane.
    pub fn validate(&self) -> Result<u32, ConfigurationError> {
        if self.lane_count == 0 {
            return Err(ConfigurationError::ZeroLanes);
        }
        if self.total_bits == 0 {
            return Err(ConfigurationError::ZeroTotalBits);
        }
        if self.total_bits % self.lane_count != 0 {
            return Err(ConfigurationError::IndivisibleLanes {
                total_bits: self.total_bits,
                lane_count: self.lane_count,
            });
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(ConfigurationError::InvalidFontSize(self.font_size));
        }
        let Margin { left, top } = self.margin;
        if !left.is_finite() || !top.is_finite() || left < 0.0 || top < 0.0 {
            return Err(ConfigurationError::InvalidMargin { left, top });
        }
        Ok(self.total_bits / self.lane_count)
    }
}

/// What to do when the fields cover fewer bits than the diagram declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortfallPolicy {
    /// Append one implicit reserved field covering the remaining bits.
    #[default]
    Pad,
    /// Treat any shortfall as a field specification error.
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Cell width per bit, in multiples of the font size.
    pub cell_width_em: f32,
    /// Lane height, in multiples of the font size.
    pub row_height_em: f32,
    pub label_padding: f32,
    pub min_label_font_size: f32,
    /// Bit tick length as a fraction of the lane height.
    pub tick_ratio: f32,
    pub lane_label_font_scale: f32,
    /// Use the built-in glyph width table instead of system fonts. Keeps
    /// output identical across machines.
    pub fast_text_metrics: bool,
    pub shortfall: ShortfallPolicy,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_width_em: 8.0,
            row_height_em: 8.0,
            label_padding: 4.0,
            min_label_font_size: 6.0,
            tick_ratio: 0.125,
            lane_label_font_scale: 0.9,
            fast_text_metrics: true,
            shortfall: ShortfallPolicy::Pad,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Zoom applied when rasterizing to PNG.
    pub scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_weight: Option<String>,
    text_color: Option<String>,
    stroke_color: Option<String>,
    stroke_width: Option<f32>,
    tick_color: Option<String>,
    lane_label_color: Option<String>,
    hatch_color: Option<String>,
    background: Option<String>,
    reserved: Option<FieldStyle>,
    palette: Option<BTreeMap<StyleCode, FieldStyle>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    cell_width_em: Option<f32>,
    row_height_em: Option<f32>,
    label_padding: Option<f32>,
    min_label_font_size: Option<f32>,
    tick_ratio: Option<f32>,
    lane_label_font_scale: Option<f32>,
    fast_text_metrics: Option<bool>,
    shortfall: Option<ShortfallPolicy>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    scale: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("parsing config {}", path.display()))
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    let mut config = Config::default();

    match parsed.theme.as_deref() {
        None | Some("classic") | Some("default") => {}
        Some("mono") => config.theme = Theme::mono(),
        Some(other) => anyhow::bail!("unknown theme {other:?}"),
    }

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font_family {
            theme.font_family = v;
        }
        if let Some(v) = vars.font_weight {
            theme.font_weight = v;
        }
        if let Some(v) = vars.text_color {
            theme.text_color = v;
        }
        if let Some(v) = vars.stroke_color {
            theme.stroke_color = v;
        }
        if let Some(v) = vars.stroke_width {
            theme.stroke_width = v;
        }
        if let Some(v) = vars.tick_color {
            theme.tick_color = v;
        }
        if let Some(v) = vars.lane_label_color {
            theme.lane_label_color = v;
        }
        if let Some(v) = vars.hatch_color {
            theme.hatch_color = v;
        }
        if let Some(v) = vars.background {
            theme.background = v;
        }
        if let Some(v) = vars.reserved {
            theme.reserved = v;
        }
        if let Some(palette) = vars.palette {
            theme.palette.extend(palette);
        }
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.cell_width_em {
            target.cell_width_em = v;
        }
        if let Some(v) = layout.row_height_em {
            target.row_height_em = v;
        }
        if let Some(v) = layout.label_padding {
            target.label_padding = v;
        }
        if let Some(v) = layout.min_label_font_size {
            target.min_label_font_size = v;
        }
        if let Some(v) = layout.tick_ratio {
            target.tick_ratio = v;
        }
        if let Some(v) = layout.lane_label_font_scale {
            target.lane_label_font_scale = v;
        }
        if let Some(v) = layout.fast_text_metrics {
            target.fast_text_metrics = v;
        }
        if let Some(v) = layout.shortfall {
            target.shortfall = v;
        }
    }

    if let Some(render) = parsed.render
        && let Some(scale) = render.scale
    {
        config.render.scale = scale;
    }

    Ok(config)
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct MarginFile {
    left: Option<f32>,
    top: Option<f32>,
}

// Counts are read as f64 and checked by hand: json5 casts a number straight
// into an integer target, truncating fractions and saturating out-of-range
// values without complaint.

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct LabelFile {
    left: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsFile {
    #[serde(alias = "fontsize")]
    font_size: Option<f32>,
    margin: Option<MarginFile>,
    label_offset: Option<f64>,
    label: Option<LabelFile>,
    lanes: Option<f64>,
    bits: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    label_offset: Option<u32>,
    lanes: Option<u32>,
    bits: Option<u32>,
}

impl OptionsFile {
    fn counts(&self) -> Result<Counts, ConfigurationError> {
        let label_offset = self
            .label_offset
            .or_else(|| self.label.and_then(|label| label.left));
        Ok(Counts {
            label_offset: count_option("labelOffset", label_offset)?,
            lanes: count_option("lanes", self.lanes)?,
            bits: count_option("bits", self.bits)?,
        })
    }
}

fn exact_u32(value: f64) -> Option<u32> {
    let whole = value.is_finite() && value.fract() == 0.0;
    (whole && (0.0..=f64::from(u32::MAX)).contains(&value)).then_some(value as u32)
}

fn count_option(option: &'static str, value: Option<f64>) -> Result<Option<u32>, ConfigurationError> {
    value
        .map(|raw| {
            exact_u32(raw).ok_or(ConfigurationError::InvalidOption {
                option,
                value: raw.to_string(),
            })
        })
        .transpose()
}

#[derive(Debug, Deserialize)]
struct FieldFile {
    #[serde(default)]
    name: Option<String>,
    bits: f64,
    #[serde(default, alias = "type")]
    style: Option<f64>,
}

impl FieldFile {
    fn into_spec(self, index: usize) -> Result<FieldSpec, FieldSpecError> {
        let bits = match exact_u32(self.bits) {
            Some(bits) if bits > 0 => bits,
            _ if self.bits <= 0.0 => {
                return Err(FieldSpecError::NonPositiveWidth {
                    index,
                    name: self.name,
                });
            }
            _ => {
                return Err(FieldSpecError::InvalidWidth {
                    index,
                    name: self.name,
                    value: self.bits.to_string(),
                });
            }
        };
        let style = match self.style {
            None => None,
            Some(raw) => match exact_u32(raw).and_then(|code| u8::try_from(code).ok()) {
                Some(code) => Some(StyleCode(code)),
                None => {
                    return Err(FieldSpecError::InvalidStyle {
                        index,
                        name: self.name,
                        value: raw.to_string(),
                    });
                }
            },
        };
        Ok(FieldSpec {
            name: self.name,
            bits,
            style,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DiagramFile {
    output: String,
    #[serde(default)]
    options: OptionsFile,
    fields: Vec<FieldFile>,
}

#[derive(Debug, Deserialize)]
struct DiagramSetFile {
    #[serde(default)]
    defaults: OptionsFile,
    diagrams: Vec<DiagramFile>,
}

/// A batch of independent diagrams loaded from a data file.
#[derive(Debug, Clone, Default)]
pub struct DiagramSet {
    pub jobs: Vec<DiagramJob>,
}

pub fn load_diagram_set(path: &Path) -> anyhow::Result<DiagramSet> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading diagram set {}", path.display()))?;
    parse_diagram_set(&contents).with_context(|| format!("parsing diagram set {}", path.display()))
}

/// Parses a JSON5 diagram set.
///
/// Only a malformed document or bad `defaults` fail the whole set. A diagram
/// whose own numbers cannot be read exactly still becomes a job, carrying the
/// error in [`DiagramJob::input_error`], so one bad diagram cannot hide the
/// others. Input errors are reported before option validation, options before
/// field layout.
pub fn parse_diagram_set(contents: &str) -> anyhow::Result<DiagramSet> {
    let parsed: DiagramSetFile = json5::from_str(contents)?;
    let defaults = parsed.defaults;
    let default_counts = defaults.counts().context("invalid diagram defaults")?;
    let jobs = parsed
        .diagrams
        .into_iter()
        .map(|diagram| diagram_job(diagram, &defaults, default_counts))
        .collect();
    Ok(DiagramSet { jobs })
}

fn diagram_job(diagram: DiagramFile, defaults: &OptionsFile, default_counts: Counts) -> DiagramJob {
    let own = diagram.options;
    let (counts, option_error) = match own.counts() {
        Ok(counts) => (counts, None),
        Err(err) => (Counts::default(), Some(err)),
    };

    let mut fields = Vec::with_capacity(diagram.fields.len());
    let mut field_error = None;
    for (index, raw) in diagram.fields.into_iter().enumerate() {
        match raw.into_spec(index) {
            Ok(field) => fields.push(field),
            Err(err) => {
                field_error.get_or_insert(err);
            }
        }
    }

    let field_bits: u64 = fields.iter().map(|f| u64::from(f.bits)).sum();
    let total_bits = counts
        .bits
        .or(default_counts.bits)
        .or_else(|| u32::try_from(field_bits).ok());
    let option_error = option_error.or_else(|| {
        total_bits.is_none().then(|| ConfigurationError::InvalidOption {
            option: "bits",
            value: field_bits.to_string(),
        })
    });
    let total_bits = total_bits.unwrap_or(0);
    let margin_default = Margin::default();
    let margin_of = |file: Option<MarginFile>| file.unwrap_or_default();
    let (own_margin, default_margin) = (margin_of(own.margin), margin_of(defaults.margin));
    let options = DiagramOptions {
        font_size: own
            .font_size
            .or(defaults.font_size)
            .unwrap_or(DEFAULT_FONT_SIZE),
        margin: Margin {
            left: own_margin
                .left
                .or(default_margin.left)
                .unwrap_or(margin_default.left),
            top: own_margin
                .top
                .or(default_margin.top)
                .unwrap_or(margin_default.top),
        },
        label_offset: counts
            .label_offset
            .or(default_counts.label_offset)
            .unwrap_or(0),
        lane_count: counts.lanes.or(default_counts.lanes).unwrap_or(1),
        total_bits,
    };

    DiagramJob {
        input_error: option_error
            .map(DiagramError::from)
            .or_else(|| field_error.map(DiagramError::from)),
        ..DiagramJob::new(diagram.output, fields, options)
    }
}
