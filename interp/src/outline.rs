//! Document outline (bookmarks) tree.
use crate::object::{Dictionary, Object, ObjectId, Resolver};
use ahash::HashSet;
use log::warn;
use std::fmt::{Display, Write};

/// Target of an outline item.
#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    /// `Dest`, explicit destination array or named destination.
    Dest(Object),
    /// `A`, action dictionary.
    Action(Dictionary),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outline {
    pub title: Option<String>,
    /// Count of visible descendants, negative if the item is closed.
    pub count: i32,
    pub link: Option<Link>,
    pub children: Vec<Outline>,
}

/// Load outline items of `catalog`, empty if the document has no outline.
///
/// Items already visited are skipped, breaking cycles in malformed files.
pub fn load_outline<R: Resolver + ?Sized>(resolver: &R, catalog: &Dictionary) -> Vec<Outline> {
    let Some(root) = resolver.get_dict(catalog, "Outlines") else {
        return vec![];
    };
    let mut visited = HashSet::default();
    load_items(resolver, root.get_or_null("First"), &mut visited)
}

fn load_items<R: Resolver + ?Sized>(
    resolver: &R,
    first: &Object,
    visited: &mut HashSet<ObjectId>,
) -> Vec<Outline> {
    let mut r = vec![];
    let mut next = first;
    loop {
        if let Some(id) = next.as_reference() {
            if !visited.insert(id) {
                warn!("outline item {:?} visited twice, stop", id);
                break;
            }
        }
        let Ok(d) = resolver.resolve(next).as_dict() else {
            break;
        };

        r.push(Outline {
            title: match resolver.get(d, "Title").as_string() {
                Ok(s) => Some(decode_text_string(s)),
                Err(_) => None,
            },
            count: resolver.get(d, "Count").as_int().unwrap_or_default(),
            link: load_link(resolver, d),
            children: load_items(resolver, d.get_or_null("First"), visited),
        });
        next = d.get_or_null("Next");
    }
    r
}

fn load_link<R: Resolver + ?Sized>(resolver: &R, d: &Dictionary) -> Option<Link> {
    match resolver.get(d, "Dest") {
        Object::Null => resolver.get_dict(d, "A").cloned().map(Link::Action),
        dest => Some(Link::Dest(dest.clone())),
    }
}

/// PDFDocEncoding chars of 0x18..=0x1F.
const PDF_DOC_LOW: [char; 8] = [
    '\u{02D8}', '\u{02C7}', '\u{02C6}', '\u{02D9}', '\u{02DD}', '\u{02DB}', '\u{02DA}', '\u{02DC}',
];

/// PDFDocEncoding chars of 0x80..=0xA0.
const PDF_DOC_HIGH: [char; 33] = [
    '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}', '\u{2044}',
    '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}', '\u{201D}', '\u{2018}',
    '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}', '\u{0141}', '\u{0152}', '\u{0160}',
    '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}', '\u{0153}', '\u{0161}', '\u{017E}', '\u{FFFD}',
    '\u{20AC}',
];

fn pdf_doc_char(b: u8) -> char {
    match b {
        0x18..=0x1F => PDF_DOC_LOW[usize::from(b - 0x18)],
        0x80..=0xA0 => PDF_DOC_HIGH[usize::from(b - 0x80)],
        _ => char::from(b),
    }
}

/// Decode PDF text string, UTF-16BE or UTF-8 if starts with BOM, otherwise
/// PDFDocEncoding.
pub fn decode_text_string(s: &[u8]) -> String {
    if let Some(utf16) = s.strip_prefix(b"\xFE\xFF") {
        encoding_rs::UTF_16BE
            .decode_without_bom_handling(utf16)
            .0
            .into_owned()
    } else if let Some(utf8) = s.strip_prefix(b"\xEF\xBB\xBF") {
        encoding_rs::UTF_8
            .decode_without_bom_handling(utf8)
            .0
            .into_owned()
    } else {
        s.iter().copied().map(pdf_doc_char).collect()
    }
}

impl Outline {
    fn fmt_level(&self, f: &mut std::fmt::Formatter<'_>, level: usize) -> std::fmt::Result {
        for _ in 0..level {
            f.write_char(' ')?;
        }
        match &self.title {
            Some(title) => write!(f, "{} ", title)?,
            None => f.write_str("<NULL> ")?,
        }
        match &self.link {
            Some(Link::Dest(dest)) => writeln!(f, "{:?}", dest)?,
            Some(Link::Action(a)) => match a.get_name("S") {
                Some(s) => writeln!(f, "/{}", s)?,
                None => writeln!(f, "<action>")?,
            },
            None => writeln!(f, "<NULL>")?,
        }
        for child in &self.children {
            child.fmt_level(f, level + 2)?;
        }
        Ok(())
    }
}

impl Display for Outline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_level(f, 0)
    }
}

#[cfg(test)]
mod tests;
