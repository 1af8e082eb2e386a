pub const DEFAULT_LOW_THRESHOLD: f64 = 1.0;
pub const DEFAULT_MEDIUM_THRESHOLD: f64 = 2.0;
pub const DEFAULT_HIGH_THRESHOLD: f64 = 3.0;

/// Number of display classes in an impact raster style.
pub const STYLE_CLASS_COUNT: usize = 8;

/// Transparency (percent) applied to every impact style class.
pub const STYLE_TRANSPARENCY: u8 = 30;

/// White through green/yellow/orange to red. Index 0 is the lowest class.
pub const IMPACT_COLOURS: [&str; STYLE_CLASS_COUNT] = [
    "#FFFFFF", "#38A800", "#79C900", "#CEED00", "#FFCC00", "#FF6600", "#FF0000", "#7A0000",
];

/// Class indices that carry a severity word in their legend label.
pub const LOW_CLASS_INDEX: usize = 1;
pub const MEDIUM_CLASS_INDEX: usize = 4;
pub const HIGH_CLASS_INDEX: usize = 7;

pub const THOUSAND_SEPARATOR: char = ',';
pub const DECIMAL_SEPARATOR: char = '.';

pub const RASTER_STYLE_TYPE: &str = "rasterStyle";
