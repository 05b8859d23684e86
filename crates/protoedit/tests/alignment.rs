//! Views created before a sequence of edits must keep agreeing with a fresh
//! parse of the edited buffer.

mod common;

use common::{DOC, DocProto, SectionProto};
use proptest::prelude::*;
use prost::Message as _;
use protoedit::{CheckOptions, Field, Journal, Value};

#[derive(Debug, Clone)]
enum Op {
    /// Writes one of the string fields, through its view or the message.
    Put { tag: u32, text: String, via_view: bool },
    Erase(u32),
    Title(String),
    Blob(Vec<u8>),
}

fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-z]{0,12}",
        1 => "[a-z]{120,200}",
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (1u32..=4, text(), any::<bool>())
            .prop_map(|(tag, text, via_view)| Op::Put { tag, text, via_view }),
        2 => (1u32..=4).prop_map(Op::Erase),
        2 => text().prop_map(Op::Title),
        1 => prop::collection::vec(any::<u8>(), 0..160).prop_map(Op::Blob),
    ]
}

struct Model {
    texts: [Option<String>; 4],
    title: String,
    blobs: Vec<Vec<u8>>,
}

impl Model {
    fn to_proto(&self) -> DocProto {
        let [a, b, c, d] = self.texts.clone();
        DocProto {
            a,
            b,
            c,
            d,
            section: Some(SectionProto {
                title: Some(self.title.clone()),
                count: None,
            }),
            blobs: self.blobs.clone(),
            items: Vec::new(),
        }
    }
}

fn string(text: &str) -> Value<'static> {
    Value::String(text.to_owned().into())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn prop_views_follow_edits(
        initial in prop::collection::vec(text(), 4),
        title in text(),
        ops in prop::collection::vec(op(), 1..24),
    ) {
        let journal = Journal::empty();
        let mut doc = protoedit::Message::new(&journal, &DOC);
        for (tag, text) in (1u32..).zip(&initial) {
            doc.put(tag, &string(text)).unwrap();
        }
        doc.create_within(5).unwrap().put(1, &string(&title)).unwrap();

        let mut model = Model {
            texts: std::array::from_fn(|i| Some(initial[i].clone())),
            title,
            blobs: Vec::new(),
        };
        // (tag, view, still refers to a live occurrence)
        let mut views: Vec<(u32, Field<'_, '_>, bool)> = (1u32..=4)
            .map(|tag| (tag, Field::from_cursor(&doc.cursor(tag)).unwrap(), true))
            .collect();
        let section = doc.create_within(5).unwrap();
        let mut title_view = Field::create_nested(&mut doc, &[5, 1]).unwrap();
        let mut blob_views = Vec::new();

        for op in ops {
            match op {
                Op::Put { tag, text, via_view } => {
                    let slot = (tag - 1) as usize;
                    let live = views.iter().position(|(t, _, alive)| *t == tag && *alive);
                    match live {
                        Some(i) if via_view => views[i].1.put(&string(&text)).unwrap(),
                        Some(_) => doc.put(tag, &string(&text)).unwrap(),
                        None => {
                            let mut view = Field::create(&mut doc, tag).unwrap();
                            view.put(&string(&text)).unwrap();
                            views.push((tag, view, true));
                        }
                    }
                    model.texts[slot] = Some(text);
                }
                Op::Erase(tag) => {
                    doc.erase(tag).unwrap();
                    for (t, _, alive) in views.iter_mut() {
                        if *t == tag {
                            *alive = false;
                        }
                    }
                    model.texts[(tag - 1) as usize] = None;
                }
                Op::Title(text) => {
                    doc.create_within(5).unwrap().put(1, &string(&text)).unwrap();
                    model.title = text;
                }
                Op::Blob(bytes) => {
                    let mut view = Field::create(&mut doc, 6).unwrap();
                    view.put(&Value::Bytes(bytes.clone().into())).unwrap();
                    blob_views.push((view, bytes.clone()));
                    model.blobs.push(bytes);
                }
            }

            for (tag, view, alive) in views.iter_mut() {
                if *alive {
                    let expected = model.texts[(*tag - 1) as usize].as_deref().unwrap();
                    prop_assert_eq!(view.get().unwrap(), string(expected));
                } else {
                    prop_assert!(view.get().is_err());
                    prop_assert!(!view.is_valid());
                }
            }
            prop_assert_eq!(title_view.get().unwrap(), string(&model.title));
            prop_assert_eq!(section.get(1).unwrap(), string(&model.title));
            for (view, bytes) in blob_views.iter_mut() {
                prop_assert_eq!(view.get().unwrap(), Value::Bytes(bytes.clone().into()));
            }

            for tag in 1u32..=4 {
                let expected = &model.texts[(tag - 1) as usize];
                prop_assert_eq!(doc.has(tag).unwrap(), expected.is_some());
                if let Some(text) = expected {
                    prop_assert_eq!(doc.get(tag).unwrap(), string(text));
                }
            }
            prop_assert_eq!(doc.check(&CheckOptions::strict()), Ok(()));
            let decoded = DocProto::decode(journal.to_vec().as_slice()).unwrap();
            prop_assert_eq!(decoded, model.to_proto());
        }
    }

    #[test]
    fn prop_erase_is_idempotent(
        initial in prop::collection::vec(text(), 4),
        tag in 1u32..=4,
    ) {
        let journal = Journal::empty();
        let mut doc = protoedit::Message::new(&journal, &DOC);
        for (tag, text) in (1u32..).zip(&initial) {
            doc.put(tag, &string(text)).unwrap();
        }

        doc.erase(tag).unwrap();
        let once = journal.to_vec();
        let version = journal.version();
        doc.erase(tag).unwrap();
        prop_assert_eq!(journal.to_vec(), once.clone());
        prop_assert_eq!(journal.version(), version);

        let decoded = DocProto::decode(once.as_slice()).unwrap();
        for other in 1u32..=4 {
            let expected = (other != tag).then(|| initial[(other - 1) as usize].as_str());
            prop_assert_eq!(decoded.text(other), expected);
        }
    }
}

#[test]
fn test_view_survives_widening_of_enclosing_prefix() {
    let journal = Journal::empty();
    let mut doc = protoedit::Message::new(&journal, &DOC);
    let mut section = doc.create_within(5).unwrap();
    section.put(2, &Value::Uint64(3)).unwrap();
    let mut count = Field::from_cursor(&section.cursor(2)).unwrap();
    doc.put(6, &Value::Bytes(b"tail".as_slice().into())).unwrap();

    // Title grows the section past 127 bytes: its prefix takes two bytes
    let long = "x".repeat(150);
    section.put(1, &string(&long)).unwrap();
    assert_eq!(count.get().unwrap(), Value::Uint64(3));
    assert_eq!(doc.get(6).unwrap(), Value::Bytes(b"tail".as_slice().into()));

    let bytes = journal.to_vec();
    // section tag, two-byte length 155 = 3 + 150 + 2
    assert_eq!(&bytes[..3], b"\x2a\x9b\x01");
    let decoded = DocProto::decode(bytes.as_slice()).unwrap();
    assert_eq!(
        decoded.section,
        Some(SectionProto {
            title: Some(long),
            count: Some(3),
        })
    );

    // Shrinking back restores the one-byte prefix
    section.put(1, &string("")).unwrap();
    count.put(&Value::Uint64(4)).unwrap();
    assert_eq!(journal.to_vec(), b"\x2a\x04\x0a\x00\x10\x04\x32\x04tail");
}

#[test]
fn test_views_across_journal_versions() {
    let journal = Journal::new(b"\x0a\x01a\x12\x01b").unwrap();
    let doc = protoedit::Message::new(&journal, &DOC);
    let mut b = Field::from_cursor(&doc.cursor(2)).unwrap();
    let mut a = Field::from_cursor(&doc.cursor(1)).unwrap();
    assert_eq!(a.part().version(), 0);

    a.put(&string("longer")).unwrap();
    a.put(&string("")).unwrap();
    assert_eq!(journal.version(), 2);
    // b has not been touched since version 0 and replays both entries
    assert_eq!(b.part().version(), 0);
    assert_eq!(b.get().unwrap(), string("b"));
    assert_eq!(b.part().version(), 2);
    assert_eq!((b.part().start(), b.part().end()), (4, 5));
}

#[test]
fn test_held_submessage_after_prefix_narrowing() {
    let journal = Journal::empty();
    let mut doc = protoedit::Message::new(&journal, &DOC);
    doc.create_within(5).unwrap().put(1, &string(&"t".repeat(130))).unwrap();
    let section = doc.create_within(5).unwrap();

    doc.create_within(5).unwrap().put(1, &string("wk")).unwrap();
    assert_eq!(journal.to_vec(), b"\x2a\x04\x0a\x02wk");
    assert_eq!(section.get(1).unwrap(), string("wk"));
    assert!(section.has(1).unwrap());
    assert!(section.matches(1, &string("wk")).unwrap());
    assert_eq!(section.check(&CheckOptions::strict()), Ok(()));
    assert_eq!(section.raw().unwrap(), b"\x0a\x02wk");
}
