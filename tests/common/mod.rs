//! Shared fixtures: minimal PDFs assembled with lopdf.

// Each integration target uses a different slice of these helpers.
#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

pub struct FixtureDoc {
    pub doc: Document,
    pub catalog_id: ObjectId,
    pub page_id: ObjectId,
}

/// Catalog, page tree, and one empty page.
pub fn empty_document() -> FixtureDoc {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    FixtureDoc {
        doc,
        catalog_id,
        page_id,
    }
}

pub fn save(fixture: FixtureDoc) -> Vec<u8> {
    let mut doc = fixture.doc;
    let mut out = Vec::new();
    doc.save_to(&mut out).expect("failed to save fixture");
    out
}

pub fn set_catalog_entry(fixture: &mut FixtureDoc, key: &str, value: Object) {
    let catalog = fixture
        .doc
        .get_object_mut(fixture.catalog_id)
        .expect("fixture catalog")
        .as_dict_mut()
        .expect("fixture catalog dictionary");
    catalog.set(key.as_bytes().to_vec(), value);
}

pub fn add_link_annotation(fixture: &mut FixtureDoc, action: Dictionary) -> ObjectId {
    let annot_id = fixture.doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![10.into(), 10.into(), 200.into(), 24.into()],
        "A" => Object::Dictionary(action),
    });
    push_annotation(fixture, annot_id);
    annot_id
}

pub fn add_widget_annotation(fixture: &mut FixtureDoc) -> ObjectId {
    let annot_id = fixture.doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "Rect" => vec![10.into(), 40.into(), 200.into(), 54.into()],
        "FT" => "Tx",
        "T" => Object::string_literal("field1"),
    });
    push_annotation(fixture, annot_id);
    annot_id
}

/// Attach an XFA form whose XML body is `xml`.
pub fn add_xfa_form(fixture: &mut FixtureDoc, xml: &[u8]) -> ObjectId {
    let xfa_id = fixture.doc.add_object(Object::Stream(Stream::new(
        dictionary! { "Subtype" => "XML" },
        xml.to_vec(),
    )));
    set_catalog_entry(
        fixture,
        "AcroForm",
        Object::Dictionary(dictionary! {
            "Fields" => Object::Array(vec![]),
            "XFA" => xfa_id,
        }),
    );
    xfa_id
}

fn push_annotation(fixture: &mut FixtureDoc, annot_id: ObjectId) {
    let page = fixture
        .doc
        .get_object_mut(fixture.page_id)
        .expect("fixture page")
        .as_dict_mut()
        .expect("fixture page dictionary");
    let has_array = matches!(page.get(b"Annots"), Ok(Object::Array(_)));
    if has_array {
        if let Ok(Object::Array(items)) = page.get_mut(b"Annots") {
            items.push(annot_id.into());
        }
    } else {
        page.set("Annots", vec![Object::Reference(annot_id)]);
    }
}

/// Surviving annotation entries on the fixture page of a saved document.
pub fn page_annotations(bytes: &[u8]) -> Vec<Object> {
    let doc = Document::load_mem(bytes).expect("reload sanitized output");
    let page_id = *doc.get_pages().values().next().expect("one page");
    let page = doc
        .get_object(page_id)
        .and_then(|page| page.as_dict())
        .expect("page dictionary");
    match page.get(b"Annots") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(Object::Reference(id)) => doc
            .get_object(*id)
            .and_then(|annots| annots.as_array())
            .map(|annots| annots.clone())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}
