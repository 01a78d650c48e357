//! Entry points running a page, its annotations, glyph procedures and other
//! free standing content streams.
use crate::{
    device::Device,
    error::InterpretResult,
    graphics::{
        pattern::XObject,
        trans::{transform_rect, UserRect, UserToDeviceSpace, UserToUserSpace},
        BlendMode,
    },
    interpreter::Interpreter,
    object::{Dictionary, Object},
    ocg::OcgEvaluator,
    option::{InterpretOption, InterpretOptionBuilder, Usage},
    resources::ResourceLoader,
};
use bitflags::bitflags;
use log::warn;
use std::sync::Arc;

bitflags! {
    /// Annotation flags, `F` entry of annotation dictionary.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AnnotationFlags: u32 {
        const INVISIBLE = 1;
        const HIDDEN = 1 << 1;
        const PRINT = 1 << 2;
        const NO_VIEW = 1 << 5;
    }
}

/// Annotation with its loaded normal appearance.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub flags: AnnotationFlags,
    /// None if the annotation has no appearance stream.
    pub appearance: Option<Arc<XObject>>,
    /// Maps appearance bbox to annotation `Rect`.
    pub matrix: UserToUserSpace,
    /// `OC` entry, Null if not exist.
    pub oc: Object,
}

impl Annotation {
    /// Annotation is not drawn for `usage` because of its flags.
    pub fn is_skipped(&self, usage: Usage) -> bool {
        let flags = self.flags;
        if flags.intersects(AnnotationFlags::INVISIBLE | AnnotationFlags::HIDDEN) {
            return true;
        }
        match usage {
            Usage::Print => !flags.contains(AnnotationFlags::PRINT),
            Usage::View => flags.contains(AnnotationFlags::NO_VIEW),
            Usage::Export => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub media_box: UserRect,
    pub resources: Dictionary,
    /// Stream or array of streams.
    pub contents: Object,
    /// Page has a transparency group, painted inside an isolated device group.
    pub transparency: bool,
    pub annotations: Vec<Annotation>,
}

/// Run page content and annotations for viewing.
pub fn run_page(
    device: &mut dyn Device,
    loader: &dyn ResourceLoader,
    page: &Page,
    ctm: UserToDeviceSpace,
) -> InterpretResult<()> {
    run_page_with_usage(device, loader, page, ctm, Usage::View)
}

/// Run page content and annotations for `usage`.
///
/// Failure of an annotation is logged, the rest of the page is still drawn.
pub fn run_page_with_usage(
    device: &mut dyn Device,
    loader: &dyn ResourceLoader,
    page: &Page,
    ctm: UserToDeviceSpace,
    usage: Usage,
) -> InterpretResult<()> {
    let option = InterpretOptionBuilder::new().usage(usage).build();
    if page.transparency {
        let bbox = transform_rect(&ctm, &page.media_box);
        device.begin_group(&bbox, true, false, BlendMode::Normal, 1.0);
    }

    let r = run_content(device, loader, &page.resources, &page.contents, ctm, option.clone());
    if r.is_ok() {
        run_annotations(device, loader, page, ctm, &option);
    }

    if page.transparency {
        device.end_group();
    }
    r
}

fn run_annotations(
    device: &mut dyn Device,
    loader: &dyn ResourceLoader,
    page: &Page,
    ctm: UserToDeviceSpace,
    option: &InterpretOption,
) {
    let evaluator = OcgEvaluator::new(loader, loader.ocg_config(), option.usage);
    for (i, annot) in page.annotations.iter().enumerate() {
        if annot.is_skipped(option.usage) || evaluator.is_hidden(&annot.oc) {
            continue;
        }
        let Some(appearance) = &annot.appearance else {
            continue;
        };

        let mut interp = Interpreter::new(device, loader, ctm, option.clone());
        if let Err(e) = interp.run_xobject(&page.resources, appearance, annot.matrix) {
            warn!("cannot draw appearance of annotation #{}: {}", i, e);
        }
    }
}

/// Run `contents` in a fresh graphics state. Graphics states left open by
/// the stream are restored before return.
pub fn run_content(
    device: &mut dyn Device,
    loader: &dyn ResourceLoader,
    resources: &Dictionary,
    contents: &Object,
    ctm: UserToDeviceSpace,
    option: InterpretOption,
) -> InterpretResult<()> {
    let mut interp = Interpreter::new(device, loader, ctm, option);
    interp.run_contents(resources, contents)
}

/// Run decoded glyph procedure of a Type 3 font.
pub fn run_glyph(
    device: &mut dyn Device,
    loader: &dyn ResourceLoader,
    resources: &Dictionary,
    contents: &[u8],
    ctm: UserToDeviceSpace,
) {
    let mut interp = Interpreter::new(device, loader, ctm, InterpretOption::default());
    interp.run_buffer(resources, contents);
}
