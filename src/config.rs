//! Engine configuration.

use std::fmt;

/// Unit used when reporting uploaded file sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeUnit {
    /// Raw byte count
    Bytes,
    /// Multiples of 1024 bytes
    #[default]
    Kibibytes,
    /// Multiples of 1024 * 1024 bytes
    Mebibytes,
}

impl SizeUnit {
    /// Number of bytes in one unit.
    pub fn bytes_per_unit(self) -> u64 {
        match self {
            SizeUnit::Bytes => 1,
            SizeUnit::Kibibytes => 1024,
            SizeUnit::Mebibytes => 1024 * 1024,
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeUnit::Bytes => write!(f, "bytes"),
            SizeUnit::Kibibytes => write!(f, "KiB"),
            SizeUnit::Mebibytes => write!(f, "MiB"),
        }
    }
}

/// Tunables shared by the binder, validator and upload handler.
///
/// Built once at startup next to the schema registry and never changed
/// afterwards.
///
/// # Examples
///
/// ```
/// use binding_core::{EngineConfig, SizeUnit};
///
/// let config = EngineConfig::default()
///     .with_size_unit(SizeUnit::Bytes)
///     .with_max_errors(10);
///
/// assert_eq!(config.size_unit(), SizeUnit::Bytes);
/// assert_eq!(config.max_errors(), Some(10));
/// assert!(config.convert_underscores());
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    size_unit: SizeUnit,
    convert_underscores: bool,
    max_errors: Option<usize>,
}

impl EngineConfig {
    /// Sets the unit uploaded file sizes are reported in.
    pub fn with_size_unit(mut self, unit: SizeUnit) -> Self {
        self.size_unit = unit;
        self
    }

    /// Controls whether header fields named `user_agent` read `user-agent`.
    pub fn with_convert_underscores(mut self, convert: bool) -> Self {
        self.convert_underscores = convert;
        self
    }

    /// Caps the number of errors kept in one report.
    ///
    /// Validation still visits every field; only the report is truncated.
    ///
    /// # Panics
    ///
    /// Panics if `max` is 0.
    pub fn with_max_errors(mut self, max: usize) -> Self {
        assert!(max > 0, "max_errors must be greater than 0");
        self.max_errors = Some(max);
        self
    }

    /// Unit for uploaded file sizes.
    pub fn size_unit(&self) -> SizeUnit {
        self.size_unit
    }

    /// Whether underscores in header field names become hyphens.
    pub fn convert_underscores(&self) -> bool {
        self.convert_underscores
    }

    /// Upper bound on errors per report, if any.
    pub fn max_errors(&self) -> Option<usize> {
        self.max_errors
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            size_unit: SizeUnit::Kibibytes,
            convert_underscores: true,
            max_errors: None,
        }
    }
}
