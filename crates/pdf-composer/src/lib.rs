//! PDF composition utilities for assembling per-slide captures.
//!
//! This crate provides low-level PDF manipulation using lopdf:
//! - Deep object copying with cycle detection
//! - Merging single-page slide documents into one multi-page document
//! - Building a synthetic placeholder page when no capture exists

mod error;
mod placeholder;

pub use error::ComposerError;
pub use placeholder::placeholder_page;

use lopdf::{Document, Object, ObjectId};
use std::collections::HashMap;

/// Page attributes a page may inherit from its ancestors in the page tree.
/// They are written onto copied pages so each page keeps its own geometry
/// once it is detached from the source tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guards against malformed page trees with `Parent` cycles.
const MAX_TREE_DEPTH: usize = 64;

/// A helper struct to manage the state of copying objects between documents.
struct ObjectCopier<'a> {
    source_doc: &'a Document,
    target_doc: &'a mut Document,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source_doc: &'a Document, target_doc: &'a mut Document) -> Self {
        Self { source_doc, target_doc, id_map: HashMap::new() }
    }

    /// Deep copies an object from the source document to the target document,
    /// copying every referenced object exactly once.
    fn copy_object(&mut self, source_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }

        // Reserve the target id before recursing so reference cycles
        // (Page -> Annots -> /P -> Page) resolve to the reserved id.
        let new_id = self.target_doc.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);

        let obj = self.source_doc.get_object(source_id)?.clone();
        let new_obj = self.remap_references(obj)?;
        self.replace(new_id, new_obj)?;

        Ok(new_id)
    }

    /// Copies a page dictionary detached from its source page tree.
    ///
    /// `Parent` is dropped (the caller re-parents the page) and inherited
    /// attributes are materialised so the page keeps its exact MediaBox.
    fn copy_page(&mut self, page_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        let mut page = self.source_doc.get_object(page_id)?.as_dict()?.clone();
        for key in INHERITABLE_KEYS {
            if !page.has(key)
                && let Some(value) = inherited_attribute(self.source_doc, page_id, key)?
            {
                page.set(key, value);
            }
        }
        page.remove(b"Parent");

        let new_id = self.target_doc.add_object(Object::Null);
        self.id_map.insert(page_id, new_id);

        let new_obj = self.remap_references(Object::Dictionary(page))?;
        self.replace(new_id, new_obj)?;
        Ok(new_id)
    }

    fn replace(&mut self, id: ObjectId, obj: Object) -> Result<(), lopdf::Error> {
        match self.target_doc.objects.get_mut(&id) {
            Some(target_obj) => {
                *target_obj = obj;
                Ok(())
            }
            None => Err(lopdf::Error::ObjectNotFound(id)),
        }
    }

    /// Traverses an object and replaces any `Object::Reference` with a new ID
    /// from the target document by recursively calling `copy_object`.
    fn remap_references(&mut self, obj: Object) -> Result<Object, lopdf::Error> {
        match obj {
            Object::Reference(id) => {
                let new_id = self.copy_object(id)?;
                Ok(Object::Reference(new_id))
            }
            Object::Array(arr) => {
                let new_arr = arr
                    .into_iter()
                    .map(|o| self.remap_references(o))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Object::Array(new_arr))
            }
            Object::Dictionary(mut dict) => {
                for (_, value) in dict.iter_mut() {
                    *value = self.remap_references(value.clone())?;
                }
                Ok(Object::Dictionary(dict))
            }
            Object::Stream(mut stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    *value = self.remap_references(value.clone())?;
                }
                Ok(Object::Stream(stream))
            }
            _ => Ok(obj),
        }
    }
}

/// Walks up the page tree looking for an inheritable attribute.
fn inherited_attribute(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<Object>, lopdf::Error> {
    let mut current = doc.get_object(page_id)?.as_dict()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Ok(Some(value.clone()));
        }
        let Ok(parent) = current.get(b"Parent").and_then(Object::as_reference) else {
            return Ok(None);
        };
        current = doc.get_object(parent)?.as_dict()?;
    }
    Ok(None)
}

/// Appends every page of `source` to the end of `target`, in page order.
///
/// Pages are deep-copied with fresh object IDs and attached directly under
/// the target's root `Pages` node. Page geometry is copied verbatim; nothing
/// is re-scaled.
pub fn append_document(target: &mut Document, source: &Document) -> Result<usize, ComposerError> {
    let source_pages = source.get_pages();
    if source_pages.is_empty() {
        return Ok(0);
    }

    let mut copier = ObjectCopier::new(source, target);
    let mut copied_page_ids = Vec::with_capacity(source_pages.len());

    // BTreeMap iteration is already in page-number order.
    for (_, page_id) in source_pages {
        copied_page_ids.push(copier.copy_page(page_id)?);
    }

    let root_id = target.trailer.get(b"Root")?.as_reference()?;
    let pages_id = target.get_object(root_id)?.as_dict()?.get(b"Pages")?.as_reference()?;
    let pages_dict = target.get_object_mut(pages_id)?.as_dict_mut()?;

    let mut kids = pages_dict.get(b"Kids")?.as_array()?.clone();
    let original_count = pages_dict.get(b"Count")?.as_i64()?;
    kids.extend(copied_page_ids.iter().map(|id| Object::Reference(*id)));

    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Count", original_count + copied_page_ids.len() as i64);

    for page_id in &copied_page_ids {
        if let Ok(Object::Dictionary(page_dict)) = target.get_object_mut(*page_id) {
            page_dict.set("Parent", Object::Reference(pages_id));
        }
    }

    Ok(copied_page_ids.len())
}

/// Merges single-page PDF buffers, in order, into one multi-page PDF.
///
/// A single buffer is returned unchanged, byte for byte: there is nothing to
/// merge and re-serialising would only perturb the capture.
pub fn merge_pages(pages: &[Vec<u8>]) -> Result<Vec<u8>, ComposerError> {
    match pages {
        [] => Err(ComposerError::Empty),
        [only] => Ok(only.clone()),
        [first, rest @ ..] => {
            let mut target = load_single_page(first, 0)?;
            for (offset, bytes) in rest.iter().enumerate() {
                let source = load_single_page(bytes, offset + 1)?;
                append_document(&mut target, &source)?;
            }

            let actual = target.get_pages().len();
            if actual != pages.len() {
                return Err(ComposerError::PageCountMismatch { expected: pages.len(), actual });
            }

            let mut out = Vec::new();
            target.save_to(&mut out)?;
            log::debug!("Merged {} slide pages into {} bytes", pages.len(), out.len());
            Ok(out)
        }
    }
}

fn load_single_page(bytes: &[u8], index: usize) -> Result<Document, ComposerError> {
    let doc = Document::load_mem(bytes)?;
    let pages = doc.get_pages().len();
    if pages != 1 {
        return Err(ComposerError::NotSinglePage { index, pages });
    }
    Ok(doc)
}

/// Reads the MediaBox of every page, in page order, resolving inheritance.
pub fn page_sizes(bytes: &[u8]) -> Result<Vec<(f32, f32)>, ComposerError> {
    let doc = Document::load_mem(bytes)?;
    let mut sizes = Vec::new();
    for (_, page_id) in doc.get_pages() {
        let media_box = inherited_attribute(&doc, page_id, b"MediaBox")?
            .ok_or_else(|| ComposerError::Other(format!("Page {:?} has no MediaBox", page_id)))?;
        let coords = media_box
            .as_array()?
            .iter()
            .map(|o| o.as_float().or_else(|_| o.as_i64().map(|i| i as f32)))
            .collect::<Result<Vec<f32>, _>>()?;
        if coords.len() != 4 {
            return Err(ComposerError::Other(format!("Malformed MediaBox on page {:?}", page_id)));
        }
        sizes.push((coords[2] - coords[0], coords[3] - coords[1]));
    }
    Ok(sizes)
}
