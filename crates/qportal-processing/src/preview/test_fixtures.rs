//! PDF builders shared by the preview tests.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// A text PDF with `pages` pages. Each page reads "Page N body". Pages
/// inherit a Letter MediaBox from the page tree, except every third page
/// which overrides it with a landscape box.
pub(crate) fn text_pdf(pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for n in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("Page {} body", n))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let encoded = content.encode().unwrap_or_default();
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        if n % 3 == 0 {
            page.set("MediaBox", letter_box(true));
        }
        kids.push(doc.add_object(page).into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => i64::from(pages),
            "Resources" => resources_id,
            "MediaBox" => letter_box(false),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// `text_pdf(pages)` where the first page carries a `SeparationInfo` entry
/// leading into a chain of `links` indirect dictionaries. The chain is far
/// deeper than the page importer follows; text extraction never looks at it.
pub(crate) fn deeply_linked_pdf(pages: u32, links: usize) -> Vec<u8> {
    let mut doc = Document::load_mem(&text_pdf(pages)).unwrap();

    let mut next = doc.add_object(dictionary! { "Depth" => 0 });
    for depth in 1..links {
        next = doc.add_object(dictionary! {
            "Depth" => depth as i64,
            "Next" => next,
        });
    }

    let first_page = *doc.get_pages().values().next().unwrap();
    doc.get_dictionary_mut(first_page)
        .unwrap()
        .set("SeparationInfo", next);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Three pages under a two-level page tree. The root sets `Rotate 90` and a
/// `CropBox`; an intermediate node holding pages 1 and 2 overrides `Rotate`
/// with 180; page 3 sits directly under the root with its own `Rotate 270`.
pub(crate) fn rotated_tree_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let root_id = doc.new_object_id();
    let middle_id = doc.new_object_id();

    let page = |doc: &mut Document, parent: ObjectId, label: &str| -> ObjectId {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(label)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap_or_default(),
        ));
        doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => parent,
            "Contents" => content_id,
        })
    };

    let first = page(&mut doc, middle_id, "First");
    let second = page(&mut doc, middle_id, "Second");
    let third = page(&mut doc, root_id, "Third");
    doc.get_dictionary_mut(third).unwrap().set("Rotate", 270);

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let crop_box: Vec<Object> = vec![
        Object::Integer(36),
        Object::Integer(36),
        Object::Integer(576),
        Object::Integer(756),
    ];

    doc.objects.insert(
        middle_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Parent" => root_id,
            "Kids" => vec![Object::Reference(first), Object::Reference(second)],
            "Count" => 2,
            "Rotate" => 180,
        }),
    );
    doc.objects.insert(
        root_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(middle_id), Object::Reference(third)],
            "Count" => 3,
            "Rotate" => 90,
            "CropBox" => crop_box,
            "MediaBox" => letter_box(false),
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => root_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Effective value of `key` on every page of `bytes`, walking up the page
/// tree. References are resolved.
pub(crate) fn inherited_values(bytes: &[u8], key: &[u8]) -> Vec<Option<Object>> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|page_id| {
            let mut current = doc.get_dictionary(*page_id).ok();
            while let Some(node) = current {
                if let Ok(value) = node.get(key) {
                    return Some(match value {
                        Object::Reference(id) => doc.get_object(*id).unwrap().clone(),
                        other => other.clone(),
                    });
                }
                current = node
                    .get(b"Parent")
                    .and_then(Object::as_reference)
                    .ok()
                    .and_then(|id| doc.get_dictionary(id).ok());
            }
            None
        })
        .collect()
}

fn letter_box(landscape: bool) -> Vec<Object> {
    let (w, h) = if landscape { (792, 612) } else { (612, 792) };
    vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(w),
        Object::Integer(h),
    ]
}

/// Effective MediaBox of every page of `bytes`, resolving inheritance.
pub(crate) fn page_media_boxes(bytes: &[u8]) -> Vec<[f32; 4]> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|page_id| media_box_of(&doc, *page_id))
        .collect()
}

fn media_box_of(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let mut current = doc.get_dictionary(page_id).unwrap();
    loop {
        if let Ok(media_box) = current.get(b"MediaBox") {
            let array = match media_box {
                Object::Reference(id) => doc.get_object(*id).unwrap().as_array().unwrap(),
                other => other.as_array().unwrap(),
            };
            let mut out = [0.0f32; 4];
            for (slot, value) in out.iter_mut().zip(array) {
                *slot = match value {
                    Object::Integer(i) => *i as f32,
                    Object::Real(r) => *r,
                    _ => 0.0,
                };
            }
            return out;
        }
        let parent = current.get(b"Parent").and_then(Object::as_reference).unwrap();
        current = doc.get_dictionary(parent).unwrap();
    }
}
