//! Configuration types for Markdown-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Page geometry lives in a separate
//! [`PageLayout`] value handed to the renderer, and the stylesheet constants
//! live in [`Theme`]; neither is process-wide state.
//!
//! Defaults differ per rendering backend: the Chromium print path renders at
//! 70 % scale with the roomier [`Theme::standard`], the wkhtmltopdf path at
//! 50 % zoom with the denser [`Theme::compact`].

use crate::error::Md2PdfError;
use crate::progress::ProgressCallback;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Margin applied to all four page edges unless overridden.
pub const DEFAULT_MARGIN: Length = Length {
    value: 0.2,
    unit: LengthUnit::Cm,
};

/// Scale accepted by Chromium's print-to-PDF; wkhtmltopdf is held to the same.
pub const SCALE_RANGE: std::ops::RangeInclusive<f64> = 0.1..=2.0;

/// Configuration for a Markdown-to-PDF conversion.
///
/// Built via [`ConversionConfig::builder()`], [`ConversionConfig::for_backend`]
/// or [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use md2pdf::{BackendKind, ConversionConfig};
///
/// let config = ConversionConfig::builder()
///     .backend(BackendKind::Wkhtmltopdf)
///     .scale(0.6)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering engine used for the HTML → PDF step.
    pub backend: BackendKind,

    /// Page format, uniform margin and content scale.
    pub layout: PageLayout,

    /// Stylesheet constants embedded in the assembled HTML document.
    pub theme: Theme,

    /// Explicit output path. If None, derived from the input path.
    pub output: Option<PathBuf>,

    /// Chrome/Chromium executable. If None, chromiumoxide auto-detects one.
    pub browser_executable: Option<PathBuf>,

    /// Launch Chromium with its sandbox enabled. Default: true.
    ///
    /// Containers running as root usually need this off.
    pub sandbox: bool,

    /// wkhtmltopdf executable name or path. Default: `wkhtmltopdf` (PATH lookup).
    pub wkhtmltopdf_path: PathBuf,

    /// Upper bound on the render step in seconds. Default: None (wait forever).
    pub render_timeout_secs: Option<u64>,

    /// Stage events for progress reporting.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self::for_backend(BackendKind::default())
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("backend", &self.backend)
            .field("layout", &self.layout)
            .field("theme", &self.theme.name)
            .field("output", &self.output)
            .field("browser_executable", &self.browser_executable)
            .field("sandbox", &self.sandbox)
            .field("wkhtmltopdf_path", &self.wkhtmltopdf_path)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder seeded with the default backend's settings.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults tuned for a specific backend (scale and theme differ).
    pub fn for_backend(backend: BackendKind) -> Self {
        let (scale, theme) = match backend {
            BackendKind::Chromium => (0.7, Theme::standard()),
            BackendKind::Wkhtmltopdf => (0.5, Theme::compact()),
        };
        Self {
            backend,
            layout: PageLayout {
                format: PageFormat::A4,
                margin: DEFAULT_MARGIN,
                scale,
            },
            theme,
            output: None,
            browser_executable: None,
            sandbox: true,
            wkhtmltopdf_path: PathBuf::from("wkhtmltopdf"),
            render_timeout_secs: None,
            progress_callback: None,
        }
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ConversionConfigBuilder {
    /// Switch backend and reset scale and theme to that backend's defaults.
    ///
    /// Call this before `scale`/`theme` if you want to override them.
    pub fn backend(mut self, backend: BackendKind) -> Self {
        let defaults = ConversionConfig::for_backend(backend);
        self.config.backend = backend;
        self.config.layout.scale = defaults.layout.scale;
        self.config.theme = defaults.theme;
        self
    }

    pub fn format(mut self, format: PageFormat) -> Self {
        self.config.layout.format = format;
        self
    }

    pub fn margin(mut self, margin: Length) -> Self {
        self.config.layout.margin = margin;
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.config.layout.scale = scale;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.config.theme = theme;
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = Some(path.into());
        self
    }

    pub fn browser_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.browser_executable = Some(path.into());
        self
    }

    pub fn sandbox(mut self, v: bool) -> Self {
        self.config.sandbox = v;
        self
    }

    pub fn wkhtmltopdf_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.wkhtmltopdf_path = path.into();
        self
    }

    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = Some(secs.max(1));
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2PdfError> {
        self.config.layout.validate()?;
        #[cfg(not(feature = "chromium"))]
        if self.config.backend == BackendKind::Chromium {
            return Err(Md2PdfError::InvalidConfig(
                "the chromium backend was not compiled in (enable the `chromium` feature)".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Backend ──────────────────────────────────────────────────────────────

/// Which engine turns the assembled HTML into a PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Headless Chromium driven over the DevTools protocol.
    Chromium,
    /// The standalone `wkhtmltopdf` executable.
    Wkhtmltopdf,
}

impl Default for BackendKind {
    fn default() -> Self {
        if cfg!(feature = "chromium") {
            BackendKind::Chromium
        } else {
            BackendKind::Wkhtmltopdf
        }
    }
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Chromium => "chromium",
            BackendKind::Wkhtmltopdf => "wkhtmltopdf",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Page geometry ────────────────────────────────────────────────────────

/// Page format, uniform margin and content scale handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub format: PageFormat,
    /// Applied identically to all four edges.
    pub margin: Length,
    /// Content shrink/enlarge factor; 1.0 is 100 %.
    pub scale: f64,
}

impl PageLayout {
    pub fn validate(&self) -> Result<(), Md2PdfError> {
        if !SCALE_RANGE.contains(&self.scale) {
            return Err(Md2PdfError::InvalidConfig(format!(
                "scale must be {}–{}, got {}",
                SCALE_RANGE.start(),
                SCALE_RANGE.end(),
                self.scale
            )));
        }
        if !(self.margin.value.is_finite() && self.margin.value >= 0.0) {
            return Err(Md2PdfError::InvalidConfig(format!(
                "margin must be a non-negative length, got {}",
                self.margin
            )));
        }
        let (width, height) = self.format.size_inches();
        let margin = self.margin.to_inches();
        if margin * 2.0 >= width.min(height) {
            return Err(Md2PdfError::InvalidConfig(format!(
                "margin {} leaves no printable area on {}",
                self.margin,
                self.format.name()
            )));
        }
        Ok(())
    }
}

/// Paper sizes understood by both backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageFormat {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl PageFormat {
    /// Name as accepted by wkhtmltopdf's `--page-size`.
    pub fn name(self) -> &'static str {
        match self {
            PageFormat::A3 => "A3",
            PageFormat::A4 => "A4",
            PageFormat::A5 => "A5",
            PageFormat::Letter => "Letter",
            PageFormat::Legal => "Legal",
            PageFormat::Tabloid => "Tabloid",
        }
    }

    /// (width, height) in inches, portrait.
    pub fn size_inches(self) -> (f64, f64) {
        match self {
            PageFormat::A3 => (11.7, 16.54),
            PageFormat::A4 => (8.27, 11.7),
            PageFormat::A5 => (5.83, 8.27),
            PageFormat::Letter => (8.5, 11.0),
            PageFormat::Legal => (8.5, 14.0),
            PageFormat::Tabloid => (11.0, 17.0),
        }
    }
}

impl FromStr for PageFormat {
    type Err = Md2PdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a3" => Ok(PageFormat::A3),
            "a4" => Ok(PageFormat::A4),
            "a5" => Ok(PageFormat::A5),
            "letter" => Ok(PageFormat::Letter),
            "legal" => Ok(PageFormat::Legal),
            "tabloid" => Ok(PageFormat::Tabloid),
            other => Err(Md2PdfError::InvalidConfig(format!(
                "unknown page format '{other}' (expected a3, a4, a5, letter, legal or tabloid)"
            ))),
        }
    }
}

/// CSS units accepted for margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Mm,
    Cm,
    In,
    /// CSS pixels, 96 per inch.
    Px,
}

impl LengthUnit {
    fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Mm => "mm",
            LengthUnit::Cm => "cm",
            LengthUnit::In => "in",
            LengthUnit::Px => "px",
        }
    }
}

/// A physical length such as `0.2cm`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Length {
    pub fn new(value: f64, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    pub fn to_inches(self) -> f64 {
        match self.unit {
            LengthUnit::Mm => self.value / 25.4,
            LengthUnit::Cm => self.value / 2.54,
            LengthUnit::In => self.value,
            LengthUnit::Px => self.value / 96.0,
        }
    }

    pub fn to_mm(self) -> f64 {
        self.to_inches() * 25.4
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

static LENGTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?|\.\d+)\s*(mm|cm|in|px)?\s*$").expect("valid regex")
});

impl FromStr for Length {
    type Err = Md2PdfError;

    /// Parse `0.2cm`, `2mm`, `0.5in`, `12px`; a bare number means pixels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            Md2PdfError::InvalidConfig(format!(
                "invalid length '{s}' (expected e.g. 0.2cm, 2mm, 0.5in or 12px)"
            ))
        };
        let caps = LENGTH_RE.captures(s).ok_or_else(invalid)?;
        let value: f64 = caps[1].parse().map_err(|_| invalid())?;
        let unit = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
            Some(u) if u == "mm" => LengthUnit::Mm,
            Some(u) if u == "cm" => LengthUnit::Cm,
            Some(u) if u == "in" => LengthUnit::In,
            _ => LengthUnit::Px,
        };
        Ok(Length { value, unit })
    }
}

// ── Theme ────────────────────────────────────────────────────────────────

/// Stylesheet constants that differ between the two looks.
///
/// Colors and the rules for blockquotes, code, tables, links and horizontal
/// rules are shared and live in the stylesheet template itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub name: &'static str,
    pub body_padding_px: u32,
    pub line_height: f32,
    pub max_content_width_px: u32,
    /// Root font size; None inherits the engine default.
    pub font_size_px: Option<u32>,
    pub heading_margin_top_px: u32,
    pub heading_margin_bottom_px: u32,
    pub h1_font_size_em: f32,
    pub h1_border_px: u32,
    pub h1_padding_bottom_px: u32,
    pub h2_font_size_em: f32,
    pub paragraph_margin_bottom_px: u32,
    pub list_margin_bottom_px: u32,
}

impl Theme {
    /// Roomy layout for the Chromium print path.
    pub fn standard() -> Self {
        Self {
            name: "standard",
            body_padding_px: 20,
            line_height: 1.6,
            max_content_width_px: 1000,
            font_size_px: None,
            heading_margin_top_px: 15,
            heading_margin_bottom_px: 5,
            h1_font_size_em: 2.0,
            h1_border_px: 3,
            h1_padding_bottom_px: 5,
            h2_font_size_em: 1.5,
            paragraph_margin_bottom_px: 10,
            list_margin_bottom_px: 15,
        }
    }

    /// Dense layout for wkhtmltopdf, which renders at a smaller zoom.
    pub fn compact() -> Self {
        Self {
            name: "compact",
            body_padding_px: 5,
            line_height: 1.3,
            max_content_width_px: 800,
            font_size_px: Some(10),
            heading_margin_top_px: 5,
            heading_margin_bottom_px: 5,
            h1_font_size_em: 1.5,
            h1_border_px: 1,
            h1_padding_bottom_px: 2,
            h2_font_size_em: 1.3,
            paragraph_margin_bottom_px: 5,
            list_margin_bottom_px: 10,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::standard()
    }
}

impl FromStr for Theme {
    type Err = Md2PdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Theme::standard()),
            "compact" => Ok(Theme::compact()),
            other => Err(Md2PdfError::InvalidConfig(format!(
                "unknown theme '{other}' (expected standard or compact)"
            ))),
        }
    }
}
