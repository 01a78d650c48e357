use once_cell::sync::Lazy;
use std::sync::Arc;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
pub enum ColorSpaceFamily {
    DeviceGray,
    #[strum(serialize = "DeviceRGB")]
    DeviceRgb,
    #[strum(serialize = "DeviceCMYK")]
    DeviceCmyk,
    CalGray,
    #[strum(serialize = "CalRGB")]
    CalRgb,
    Lab,
    #[strum(serialize = "ICCBased")]
    IccBased,
    Indexed,
    Separation,
    DeviceN,
    Pattern,
}

/// Loaded color space. Conversion to device colors is done by devices, the
/// interpreter only needs the family and channel count.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSpace {
    family: ColorSpaceFamily,
    n: usize,
    base: Option<Arc<ColorSpace>>,
}

impl ColorSpace {
    pub fn new(family: ColorSpaceFamily, n: usize) -> Self {
        Self {
            family,
            n,
            base: None,
        }
    }

    /// `Pattern` color space, `base` is the underlying color space of
    /// uncolored patterns, as in `[/Pattern /DeviceRGB]`.
    pub fn pattern(base: Option<Arc<ColorSpace>>) -> Self {
        Self {
            family: ColorSpaceFamily::Pattern,
            n: base.as_ref().map_or(0, |b| b.n()),
            base,
        }
    }

    pub fn family(&self) -> ColorSpaceFamily {
        self.family
    }

    /// Number of color components.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Underlying color space of a `Pattern` color space.
    pub fn base(&self) -> Option<&Arc<ColorSpace>> {
        self.base.as_ref()
    }

    pub fn is_lab(&self) -> bool {
        self.family == ColorSpaceFamily::Lab
    }
}

static DEVICE_GRAY: Lazy<Arc<ColorSpace>> =
    Lazy::new(|| Arc::new(ColorSpace::new(ColorSpaceFamily::DeviceGray, 1)));
static DEVICE_RGB: Lazy<Arc<ColorSpace>> =
    Lazy::new(|| Arc::new(ColorSpace::new(ColorSpaceFamily::DeviceRgb, 3)));
static DEVICE_CMYK: Lazy<Arc<ColorSpace>> =
    Lazy::new(|| Arc::new(ColorSpace::new(ColorSpaceFamily::DeviceCmyk, 4)));

pub fn device_gray() -> Arc<ColorSpace> {
    Arc::clone(&DEVICE_GRAY)
}

pub fn device_rgb() -> Arc<ColorSpace> {
    Arc::clone(&DEVICE_RGB)
}

pub fn device_cmyk() -> Arc<ColorSpace> {
    Arc::clone(&DEVICE_CMYK)
}
