//! Named resources of content streams, and loaders building values from them.
use crate::{
    error::{InterpretError, InterpretResult},
    graphics::{
        color_space::ColorSpace,
        pattern::{Image, Pattern, Shading, XObject},
    },
    object::{name, Dictionary, Object, Resolver},
    ocg::OcgConfig,
    text::Font,
};
use anyhow::Result as AnyResult;
use std::sync::Arc;
use strum::{AsRefStr, Display};

/// Categories of resource dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum ResourceKind {
    ColorSpace,
    Font,
    XObject,
    Pattern,
    Shading,
    ExtGState,
    Properties,
}

/// Builds resource values from objects. Implementations may cache by
/// object identity, the interpreter may ask for the same object many times.
///
/// `obj` is the resolved resource object.
pub trait ResourceLoader: Resolver {
    /// A `[/Pattern base]` array loads as `ColorSpace::pattern` with its base.
    fn load_colorspace(&self, obj: &Object) -> AnyResult<Arc<ColorSpace>>;

    fn load_font(&self, obj: &Object) -> AnyResult<Arc<dyn Font>>;

    fn load_image(&self, obj: &Object) -> AnyResult<Arc<Image>>;

    /// Build inline image from its dictionary and raw data, `resources` is
    /// used to resolve named color space.
    fn load_inline_image(
        &self,
        dict: &Dictionary,
        data: &[u8],
        resources: &Dictionary,
    ) -> AnyResult<Arc<Image>>;

    fn load_shading(&self, obj: &Object) -> AnyResult<Arc<Shading>>;

    fn load_pattern(&self, obj: &Object) -> AnyResult<Arc<Pattern>>;

    fn load_xobject(&self, obj: &Object) -> AnyResult<Arc<XObject>>;

    /// Optional content configuration of the document, None if the document
    /// has no optional content.
    fn ocg_config(&self) -> Option<&OcgConfig> {
        None
    }
}

/// Find resource `key` of `kind`, returns the resolved object.
pub fn lookup<'a, R: Resolver + ?Sized>(
    resolver: &'a R,
    resources: &'a Dictionary,
    kind: ResourceKind,
    key: &str,
) -> InterpretResult<&'a Object> {
    let dict = resolver
        .get_dict(resources, kind.as_ref())
        .ok_or(InterpretError::MissingResourceDict(kind))?;
    match resolver.get(dict, key) {
        Object::Null => Err(InterpretError::ResourceNotFound {
            kind,
            name: name(key),
        }),
        o => Ok(o),
    }
}
