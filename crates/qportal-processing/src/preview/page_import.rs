//! Page import strategy.
//!
//! Copies the object graph of the first N pages into a fresh document. Page
//! content, resources, fonts and images are carried over byte for byte, so the
//! result renders exactly like the source. Inherited page attributes are
//! resolved onto each copied page so sizes and rotation survive the new tree.
//!
//! Only objects reachable from the kept pages are copied. Annotations,
//! outlines and references to pages outside the preview are dropped, so no
//! content of later pages ends up in the output.

use std::collections::BTreeMap;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

use super::error::PreviewError;
use super::source::SourceFile;
use super::RenderedPreview;

/// Attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Page entries that are not carried into the preview.
const DROPPED_PAGE_KEYS: [&[u8]; 6] = [
    b"Parent",
    b"Annots",
    b"B",
    b"StructParents",
    b"Thumb",
    b"PieceInfo",
];

/// US Letter, the conventional default when no MediaBox is present anywhere.
const DEFAULT_MEDIA_BOX: [i64; 4] = [0, 0, 612, 792];

const MAX_IMPORT_DEPTH: usize = 256;
const MAX_TREE_DEPTH: usize = 64;

pub(crate) fn import_pages(
    source: &SourceFile,
    page_count: u32,
) -> Result<RenderedPreview, PreviewError> {
    let document = Document::load_mem(&source.bytes)?;
    if document.is_encrypted() {
        return Err(PreviewError::MalformedSource(
            "encrypted documents cannot be imported".to_string(),
        ));
    }

    let pages = document.get_pages();
    let total_pages = pages.len() as u32;
    if total_pages == 0 {
        return Err(PreviewError::EmptyDocument);
    }
    let pages_to_extract = page_count.clamp(1, total_pages);

    let kept: Vec<ObjectId> = pages
        .values()
        .take(pages_to_extract as usize)
        .copied()
        .collect();

    let mut importer = PageImporter::new(&document);
    let pages_id = importer.target.new_object_id();

    // Allocate ids for kept pages up front so references between them resolve
    // and references to any other page do not.
    for page_id in &kept {
        let new_id = importer.target.new_object_id();
        importer.imported.insert(*page_id, new_id);
    }

    let mut kids = Vec::with_capacity(kept.len());
    for page_id in &kept {
        kids.push(Object::Reference(importer.import_page(*page_id, pages_id)?));
    }

    let mut target = importer.finish();
    target.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => i64::from(pages_to_extract),
        }),
    );
    let catalog_id = target.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    target.trailer.set("Root", catalog_id);

    target.compress();
    let mut bytes = Vec::new();
    target
        .save_to(&mut bytes)
        .map_err(|e| PreviewError::OutputWriteFailure(format!("Failed to serialize PDF: {}", e)))?;

    tracing::debug!(
        total_pages,
        pages_extracted = pages_to_extract,
        objects_copied = target.objects.len(),
        "Imported source pages"
    );

    Ok(RenderedPreview {
        bytes,
        pages: pages_to_extract,
        total_pages,
    })
}

struct PageImporter<'a> {
    source: &'a Document,
    target: Document,
    /// Source object id -> target object id
    imported: BTreeMap<ObjectId, ObjectId>,
}

impl<'a> PageImporter<'a> {
    fn new(source: &'a Document) -> Self {
        Self {
            source,
            target: Document::with_version(source.version.clone()),
            imported: BTreeMap::new(),
        }
    }

    fn finish(self) -> Document {
        self.target
    }

    /// Copy one page under `parent_id`. The page's target id must already be
    /// allocated in `imported`.
    fn import_page(&mut self, page_id: ObjectId, parent_id: ObjectId) -> Result<ObjectId, PreviewError> {
        let source = self.source;
        let new_id = *self.imported.get(&page_id).ok_or_else(|| {
            PreviewError::MalformedSource("page id was not allocated".to_string())
        })?;
        let page = source.get_dictionary(page_id)?;

        let mut copy = Dictionary::new();
        for (key, value) in page.iter() {
            if DROPPED_PAGE_KEYS.contains(&key.as_slice()) {
                continue;
            }
            copy.set(key.clone(), self.import(value, 0)?);
        }

        for key in INHERITABLE_KEYS {
            if copy.has(key) {
                continue;
            }
            if let Some(value) = self.inherited_attribute(page, key) {
                copy.set(key.to_vec(), self.import(&value, 0)?);
            }
        }

        if !copy.has(b"MediaBox") {
            copy.set(
                "MediaBox",
                DEFAULT_MEDIA_BOX
                    .iter()
                    .map(|v| Object::Integer(*v))
                    .collect::<Vec<_>>(),
            );
        }
        copy.set("Type", "Page");
        copy.set("Parent", parent_id);

        self.target.objects.insert(new_id, Object::Dictionary(copy));
        Ok(new_id)
    }

    fn inherited_attribute(&self, page: &Dictionary, key: &[u8]) -> Option<Object> {
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        for _ in 0..MAX_TREE_DEPTH {
            let node = self.source.get_dictionary(parent?).ok()?;
            if let Ok(value) = node.get(key) {
                return Some(value.clone());
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }
        None
    }

    fn import(&mut self, object: &Object, depth: usize) -> Result<Object, PreviewError> {
        if depth > MAX_IMPORT_DEPTH {
            return Err(PreviewError::MalformedSource(
                "object graph nested too deeply".to_string(),
            ));
        }

        Ok(match object {
            Object::Reference(id) => Object::Reference(self.import_reference(*id, depth + 1)?),
            Object::Array(items) => {
                let mut copied = Vec::with_capacity(items.len());
                for item in items {
                    copied.push(self.import(item, depth + 1)?);
                }
                Object::Array(copied)
            }
            Object::Dictionary(dict) => Object::Dictionary(self.import_dictionary(dict, depth + 1)?),
            Object::Stream(stream) => {
                let mut copied = stream.clone();
                copied.dict = self.import_dictionary(&stream.dict, depth + 1)?;
                Object::Stream(copied)
            }
            other => other.clone(),
        })
    }

    fn import_dictionary(&mut self, dict: &Dictionary, depth: usize) -> Result<Dictionary, PreviewError> {
        let mut copied = Dictionary::new();
        for (key, value) in dict.iter() {
            copied.set(key.clone(), self.import(value, depth)?);
        }
        Ok(copied)
    }

    fn import_reference(&mut self, id: ObjectId, depth: usize) -> Result<ObjectId, PreviewError> {
        if let Some(new_id) = self.imported.get(&id) {
            return Ok(*new_id);
        }

        let new_id = self.target.new_object_id();
        self.imported.insert(id, new_id);

        let source = self.source;
        let copied = match source.get_object(id) {
            // Pages that are not part of the preview, and the page tree itself,
            // are never copied.
            Ok(object) if is_page_tree_node(object) => Object::Null,
            Ok(object) => self.import(object, depth)?,
            // Dangling references read as null.
            Err(_) => Object::Null,
        };
        self.target.objects.insert(new_id, copied);
        Ok(new_id)
    }
}

fn is_page_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => dict
            .get(b"Type")
            .and_then(Object::as_name)
            .map(|name| name == b"Page" || name == b"Pages")
            .unwrap_or(false),
        _ => false,
    }
}
