//! Merging selected pages of several documents into one new PDF.

use std::collections::BTreeMap;

use lopdf::{dictionary, Document, Object, ObjectId};

use crate::{LayoutDocument, PdfError};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

const MAX_TREE_DEPTH: usize = 32;

/// Collects pages from any number of source documents, in the order they
/// are added, and writes them out as a single document.
#[derive(Debug, Default)]
pub struct PageRangeWriter {
    objects: BTreeMap<ObjectId, Object>,
    kids: Vec<ObjectId>,
    max_id: u32,
}

impl PageRangeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages collected so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append the 0-based `pages` of `source`, in the given order.
    ///
    /// Fails without modifying the writer when an index is out of range.
    pub fn add(&mut self, source: &LayoutDocument, pages: &[usize]) -> Result<usize, PdfError> {
        if pages.is_empty() {
            return Ok(0);
        }

        let count = source.page_count();
        if let Some(&index) = pages.iter().find(|&&i| i >= count) {
            return Err(PdfError::PageOutOfRange { index, count });
        }

        // Renumber so objects from different sources never collide.
        let mut doc = source.raw_doc().clone();
        doc.renumber_objects_with(self.max_id + 1);
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let selected: Vec<ObjectId> = pages
            .iter()
            .filter_map(|&i| page_ids.get(i).copied())
            .collect();

        for &id in &selected {
            let inherited: Vec<(&[u8], Object)> = INHERITABLE
                .iter()
                .filter_map(|key| inherited_value(&doc, id, key).map(|v| (*key, v)))
                .collect();
            let dict = doc
                .get_object_mut(id)
                .and_then(Object::as_dict_mut)
                .map_err(|e| PdfError::Write(format!("page {:?}: {}", id, e)))?;
            for (key, value) in inherited {
                dict.set(key.to_vec(), value);
            }
        }

        log::debug!(
            "collected {} page(s), object ids {}..={}",
            selected.len(),
            self.max_id + 1,
            doc.max_id
        );

        self.max_id = self.max_id.max(doc.max_id);
        self.objects.extend(doc.objects);
        let added = selected.len();
        self.kids.extend(selected);
        Ok(added)
    }

    /// Build the merged document and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>, PdfError> {
        if self.kids.is_empty() {
            return Err(PdfError::Write("no pages selected".to_string()));
        }

        let mut doc = Document::with_version("1.5");
        doc.objects = self.objects;
        doc.max_id = self.max_id;
        let pages_id = doc.new_object_id();

        for &kid in &self.kids {
            if let Ok(dict) = doc.get_object_mut(kid).and_then(Object::as_dict_mut) {
                dict.set("Parent", pages_id);
            }
        }

        let kids: Vec<Object> = self.kids.iter().map(|&id| Object::Reference(id)).collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(self.kids.len() as i64),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let pruned = doc.prune_objects();
        log::debug!("pruned {} unreferenced objects", pruned.len());
        doc.compress();

        let mut buf = Vec::new();
        doc.save_to(&mut buf)
            .map_err(|e| PdfError::Write(e.to_string()))?;
        Ok(buf)
    }
}

/// The value a page inherits for `key`, or `None` when the page defines it
/// itself or no ancestor does.
fn inherited_value(doc: &Document, page: ObjectId, key: &[u8]) -> Option<Object> {
    let page_dict = doc.get_object(page).ok()?.as_dict().ok()?;
    if page_dict.has(key) {
        return None;
    }
    let mut current = page_dict;
    for _ in 0..MAX_TREE_DEPTH {
        let parent_id = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_object(parent_id).ok()?.as_dict().ok()?;
        if let Ok(value) = current.get(key) {
            return Some(value.clone());
        }
    }
    None
}
