use super::*;
use crate::{object::ObjectTable, test_utils::dict};
use test_case::test_case;

fn id(n: u32) -> ObjectId {
    ObjectId::new_u32(n, 0).unwrap()
}

fn title(s: &[u8]) -> Object {
    Object::String(s.to_vec())
}

fn catalog() -> Dictionary {
    dict([("Outlines", id(1).into())])
}

/// Root 1 with items 2 and 3, item 2 has child 4.
fn objects() -> ObjectTable {
    let mut t = ObjectTable::new();
    t.insert(id(1), dict([("First", id(2).into()), ("Count", 3.into())]));
    t.insert(
        id(2),
        dict([
            ("Title", title(b"Chapter 1")),
            ("Count", (-1).into()),
            ("First", id(4).into()),
            ("Next", id(3).into()),
            ("Dest", Object::Array(vec![id(10).into(), "Fit".into()])),
        ]),
    );
    t.insert(
        id(3),
        dict([
            ("Title", title(b"\xFE\xFF\x00C\x00h\x00 \x00\x32")),
            ("A", dict([("S", "URI".into())]).into()),
        ]),
    );
    t.insert(id(4), dict([("Title", title(b"Section 1.1"))]));
    t
}

#[test]
fn load_tree() {
    let outline = load_outline(&objects(), &catalog());
    assert_eq!(outline.len(), 2);
    let first = &outline[0];
    assert_eq!(first.title.as_deref(), Some("Chapter 1"));
    assert_eq!(first.count, -1);
    assert!(matches!(first.link, Some(Link::Dest(Object::Array(_)))));
    assert_eq!(first.children.len(), 1);
    assert_eq!(first.children[0].title.as_deref(), Some("Section 1.1"));
    assert_eq!(first.children[0].link, None);

    let second = &outline[1];
    assert_eq!(second.title.as_deref(), Some("Ch 2"));
    assert!(matches!(second.link, Some(Link::Action(_))));
    assert!(second.children.is_empty());
}

#[test]
fn no_outline() {
    assert!(load_outline(&objects(), &Dictionary::new()).is_empty());
    let mut t = objects();
    t.insert(id(1), Dictionary::new());
    assert!(load_outline(&t, &catalog()).is_empty());
}

#[test_log::test]
fn cycle_is_cut() {
    let mut t = objects();
    // 4 points back to its parent as sibling, 3 to the first item
    t.insert(
        id(4),
        dict([("Title", title(b"Section 1.1")), ("Next", id(2).into())]),
    );
    t.insert(
        id(3),
        dict([("Title", title(b"Chapter 2")), ("Next", id(2).into())]),
    );
    let outline = load_outline(&t, &catalog());
    assert_eq!(outline.len(), 2);
    assert_eq!(outline[0].children.len(), 1);
}

#[test]
fn display_tree() {
    let outline = load_outline(&objects(), &catalog());
    let s: String = outline.iter().map(|o| o.to_string()).collect();
    assert_eq!(
        s,
        "Chapter 1 Array([Reference(ObjectId { id: 10, generation: 0 }), Name(\"Fit\")])\n  \
         Section 1.1 <NULL>\nCh 2 /URI\n"
    );
}

#[test_case(b"abc" => "abc"; "ascii")]
#[test_case(b"\x80\x84\xA0" => "\u{2022}\u{2014}\u{20AC}"; "pdf doc encoding")]
#[test_case(b"\x18\xE9" => "\u{02D8}\u{E9}"; "low table and latin1")]
#[test_case(b"\xFE\xFF\x4E\x2D" => "\u{4E2D}"; "utf16")]
#[test_case(b"\xEF\xBB\xBFa\xC3\xA9" => "a\u{E9}"; "utf8")]
fn text_string(s: &[u8]) -> String {
    decode_text_string(s)
}
