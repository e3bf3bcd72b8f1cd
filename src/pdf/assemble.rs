//! Document reconstruction
//!
//! Every transformation that produces a PDF builds its output the same way:
//! selected pages of one or more source documents are carried into a fresh
//! document with a new page tree and catalog. Outputs are therefore always
//! independent of their sources — nothing is mutated in place.

use std::collections::BTreeMap;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

use super::{PdfError, Result};

/// Page-tree attributes children may inherit from ancestor nodes. They are
/// materialized onto each carried page so pages survive leaving their tree.
const INHERITED_KEYS: [&[u8]; 4] = [b"MediaBox", b"Resources", b"Rotate", b"CropBox"];

/// Parent-chain walks give up past this depth; real page trees are shallow.
const MAX_PARENT_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy)]
pub enum PageSelection {
    All,
    /// A single 1-based page number
    Single(u32),
}

pub struct SourcePart {
    pub doc: Document,
    pub pages: PageSelection,
}

impl SourcePart {
    pub fn all(doc: Document) -> Self {
        Self {
            doc,
            pages: PageSelection::All,
        }
    }

    pub fn single(doc: Document, page_number: u32) -> Self {
        Self {
            doc,
            pages: PageSelection::Single(page_number),
        }
    }
}

/// Build a new document from the selected pages of each part, in order.
///
/// Sources are renumbered into disjoint id ranges, their non-structural
/// objects carried over, and a fresh Pages/Catalog pair installed. Unreferenced
/// carry-overs (old catalogs, unselected page content, encryption dictionaries)
/// are pruned before the document is compressed.
pub fn assemble(parts: Vec<SourcePart>) -> Result<Document> {
    let mut max_id = 1u32;
    let mut page_entries: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut carried: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for part in parts {
        let mut doc = part.doc;
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        // get_pages is keyed by 1-based page number, so iteration follows
        // true page order rather than object-id order.
        for (page_number, page_id) in doc.get_pages() {
            if let PageSelection::Single(only) = part.pages {
                if page_number != only {
                    continue;
                }
            }
            let mut dict = doc
                .get_object(page_id)
                .and_then(Object::as_dict)
                .map_err(|e| PdfError::Assemble(format!("failed to read page dictionary: {e}")))?
                .clone();
            for key in INHERITED_KEYS {
                if dict.get(key).is_err() {
                    if let Some(value) = resolve_inherited(&doc, page_id, key)? {
                        dict.set(key, value);
                    }
                }
            }
            page_entries.push((page_id, dict));
        }

        carried.extend(doc.objects);
    }

    let mut document = Document::with_version("1.5");
    for (id, object) in carried {
        match object_type(&object) {
            Some("Catalog") | Some("Pages") | Some("Page") | Some("Outlines") | Some("Outline") => {}
            _ => {
                document.objects.insert(id, object);
            }
        }
    }

    let pages_id: ObjectId = (max_id, 0);
    let catalog_id: ObjectId = (max_id + 1, 0);

    let kids: Vec<Object> = page_entries
        .iter()
        .map(|(id, _)| Object::Reference(*id))
        .collect();
    let count = page_entries.len() as i64;

    for (page_id, mut dict) in page_entries {
        dict.set("Parent", Object::Reference(pages_id));
        document.objects.insert(page_id, Object::Dictionary(dict));
    }

    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    document.objects.insert(
        catalog_id,
        Object::Dictionary(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        }),
    );
    document.trailer.set("Root", catalog_id);
    document.max_id = catalog_id.0;

    document.prune_objects();
    document.renumber_objects();
    document.compress();

    Ok(document)
}

/// Look up `key` on a page dictionary, walking /Parent links.
fn resolve_inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
    let mut current_id = page_id;
    for _ in 0..MAX_PARENT_DEPTH {
        let dict = doc
            .get_object(current_id)
            .and_then(Object::as_dict)
            .map_err(|e| PdfError::Assemble(format!("failed to read page-tree node: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value.clone()));
        }

        match dict.get(b"Parent") {
            Ok(parent) => {
                current_id = parent
                    .as_reference()
                    .map_err(|e| PdfError::Assemble(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

fn object_type(object: &Object) -> Option<&str> {
    object
        .as_dict()
        .ok()
        .and_then(|dict| dict.get(b"Type").ok())
        .and_then(|obj| obj.as_name().ok())
        .and_then(|name| std::str::from_utf8(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::ops::test_support::pdf_with_pages;
    use crate::pdf::PdfHandle;

    fn load(bytes: &[u8]) -> Document {
        Document::load_mem(bytes).unwrap()
    }

    fn save(mut doc: Document) -> Vec<u8> {
        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn concatenates_in_given_order() {
        let parts = vec![
            SourcePart::all(load(&pdf_with_pages(2))),
            SourcePart::all(load(&pdf_with_pages(3))),
        ];
        let merged = save(assemble(parts).unwrap());
        assert_eq!(PdfHandle::open(&merged).unwrap().page_count(), 5);
    }

    #[test]
    fn selects_a_single_page() {
        let part = SourcePart::single(load(&pdf_with_pages(4)), 3);
        let single = save(assemble(vec![part]).unwrap());
        assert_eq!(PdfHandle::open(&single).unwrap().page_count(), 1);
    }

    #[test]
    fn empty_selection_yields_zero_pages() {
        let part = SourcePart::all(load(&pdf_with_pages(0)));
        let empty = save(assemble(vec![part]).unwrap());
        assert_eq!(PdfHandle::open(&empty).unwrap().page_count(), 0);
    }

    #[test]
    fn inherited_media_box_is_materialized() {
        // Page without its own MediaBox, inheriting from the Pages node
        let mut doc = Document::with_version("1.5");
        let pages_id: ObjectId = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::from(page_id)],
                "Count" => 1_i64,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let rebuilt = assemble(vec![SourcePart::all(doc)]).unwrap();
        let pages = rebuilt.get_pages();
        let (_, page_id) = pages.iter().next().unwrap();
        let dict = rebuilt.get_object(*page_id).unwrap().as_dict().unwrap();
        assert!(dict.get(b"MediaBox").is_ok());
    }
}
