//! Structural sanitizer.
//!
//! Operates on the parsed object graph: catalog keys, page annotation
//! arrays, and form trees. Mutations are attempted independently — a bad
//! annotation never aborts its page and a bad page never aborts the
//! document. Only a parse or save failure propagates, at which point the
//! orchestrator falls back to the byte-level pass.

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, instrument, warn};

use crate::{
    config::{SanitizeOptions, LINK_ACTION_NAMES},
    error::{Result, StructureError},
    report::SanitizeReport,
};

const EXTERNAL_SCHEMES: [&str; 3] = ["http://", "https://", "ftp://"];

enum AnnotationVerdict {
    Keep,
    DropLink,
    DropWidget,
}

/// Object-graph pass over a parsed PDF.
pub struct StructureCleaner;

impl StructureCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Parse, mutate, and reserialize the document.
    #[instrument(skip(self, bytes, options), fields(len = bytes.len()))]
    pub fn sanitize(
        &self,
        bytes: &[u8],
        options: &SanitizeOptions,
    ) -> Result<(Vec<u8>, SanitizeReport)> {
        let mut doc =
            Document::load_mem(bytes).map_err(|err| StructureError::Parse(err.to_string()))?;
        let mut report = SanitizeReport::new();

        self.clean_catalog(&mut doc, options, &mut report);
        self.clean_pages(&mut doc, options, &mut report);

        let mut out = Vec::with_capacity(bytes.len());
        doc.save_to(&mut out)
            .map_err(|err| StructureError::Save(err.to_string()))?;

        debug!(items = report.items.len(), "structural pass complete");
        Ok((out, report))
    }

    fn clean_catalog(
        &self,
        doc: &mut Document,
        options: &SanitizeOptions,
        report: &mut SanitizeReport,
    ) {
        let root_id = match doc.trailer.get(b"Root").and_then(|root| root.as_reference()) {
            Ok(id) => id,
            Err(err) => {
                warn!(%err, "no catalog reference in trailer");
                return;
            }
        };

        if self.should_remove_open_action(doc, root_id, options) {
            if let Some(catalog) = catalog_mut(doc, root_id) {
                if catalog.remove(b"OpenAction").is_some() {
                    report.push("Removed OpenAction");
                }
            }
        }

        if let Some(catalog) = catalog_mut(doc, root_id) {
            if catalog.remove(b"AA").is_some() {
                report.push("Removed document additional actions");
            }
        }

        if options.remove_javascript {
            self.remove_javascript_names(doc, root_id, report);
        }

        if options.remove_forms {
            if let Some(catalog) = catalog_mut(doc, root_id) {
                if catalog.remove(b"AcroForm").is_some() {
                    report.push("Removed AcroForm dictionary");
                }
            }
        }
    }

    fn should_remove_open_action(
        &self,
        doc: &Document,
        root_id: ObjectId,
        options: &SanitizeOptions,
    ) -> bool {
        let Some(catalog) = catalog_ref(doc, root_id) else {
            return false;
        };
        let Ok(action) = catalog.get(b"OpenAction") else {
            return false;
        };
        match action {
            // An indirect action cannot be classified without walking the
            // graph; remove it whenever any relevant option is set.
            Object::Reference(_) => options.remove_links || options.remove_javascript,
            Object::Dictionary(dict) => match dict.get(b"S").and_then(|s| s.as_name_str()) {
                Ok("JavaScript") => options.remove_javascript,
                Ok(name) if LINK_ACTION_NAMES.contains(&name) => options.remove_links,
                _ => false,
            },
            // A bare destination array is plain in-document navigation.
            _ => false,
        }
    }

    /// Delete the `Names/JavaScript` sub-entry, following the `/Names`
    /// value through one level of indirection if needed.
    fn remove_javascript_names(
        &self,
        doc: &mut Document,
        root_id: ObjectId,
        report: &mut SanitizeReport,
    ) {
        let names_ref = catalog_ref(doc, root_id)
            .and_then(|catalog| catalog.get(b"Names").ok())
            .and_then(|names| names.as_reference().ok());

        let removed = if let Some(names_id) = names_ref {
            doc.get_object_mut(names_id)
                .ok()
                .and_then(|names| names.as_dict_mut().ok())
                .and_then(|names| names.remove(b"JavaScript"))
                .is_some()
        } else {
            catalog_mut(doc, root_id)
                .and_then(|catalog| catalog.get_mut(b"Names").ok())
                .and_then(|names| names.as_dict_mut().ok())
                .and_then(|names| names.remove(b"JavaScript"))
                .is_some()
        };

        if removed {
            report.push("Removed JavaScript name tree");
        }
    }

    fn clean_pages(
        &self,
        doc: &mut Document,
        options: &SanitizeOptions,
        report: &mut SanitizeReport,
    ) {
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let mut page_actions = 0usize;
        let mut links_removed = 0usize;
        let mut widgets_removed = 0usize;

        for page_id in page_ids {
            if let Err(err) = self.clean_page(
                doc,
                page_id,
                options,
                &mut page_actions,
                &mut links_removed,
                &mut widgets_removed,
            ) {
                warn!(?page_id, %err, "skipping page");
            }
        }

        if page_actions > 0 {
            report.push("Removed page additional actions");
        }
        report.push_count("Removed", "external link annotation", links_removed);
        report.push_count("Removed", "form widget annotation", widgets_removed);
    }

    fn clean_page(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        options: &SanitizeOptions,
        page_actions: &mut usize,
        links_removed: &mut usize,
        widgets_removed: &mut usize,
    ) -> Result<()> {
        {
            let page = doc.get_object_mut(page_id).and_then(|page| page.as_dict_mut())?;
            if page.remove(b"AA").is_some() {
                *page_actions += 1;
            }
        }

        // `/Annots` may be an inline array or a reference to one.
        let page = doc.get_object(page_id).and_then(|page| page.as_dict())?;
        let (annots_id, entries) = match page.get(b"Annots") {
            Ok(Object::Array(entries)) => (None, entries.clone()),
            Ok(Object::Reference(id)) => {
                let id = *id;
                match doc.get_object(id).and_then(|annots| annots.as_array()) {
                    Ok(entries) => (Some(id), entries.clone()),
                    Err(err) => {
                        warn!(?page_id, %err, "unreadable annotation array");
                        return Ok(());
                    }
                }
            }
            _ => return Ok(()),
        };

        let total = entries.len();
        let mut kept = Vec::with_capacity(total);
        for entry in entries {
            match self.classify_annotation(doc, &entry, options) {
                Ok(AnnotationVerdict::Keep) => kept.push(entry),
                Ok(AnnotationVerdict::DropLink) => *links_removed += 1,
                Ok(AnnotationVerdict::DropWidget) => *widgets_removed += 1,
                Err(err) => {
                    // Never widen a classification failure into a removal.
                    warn!(%err, "keeping unclassifiable annotation");
                    kept.push(entry);
                }
            }
        }

        if kept.len() == total {
            return Ok(());
        }

        // Surviving entries keep their original objects; only the array
        // itself is rebuilt, in place when it is indirect.
        if let Some(annots_id) = annots_id {
            if let Ok(annots) = doc.get_object_mut(annots_id) {
                *annots = Object::Array(kept);
            }
        } else {
            let page = doc.get_object_mut(page_id).and_then(|page| page.as_dict_mut())?;
            page.set("Annots", Object::Array(kept));
        }
        Ok(())
    }

    fn classify_annotation(
        &self,
        doc: &Document,
        entry: &Object,
        options: &SanitizeOptions,
    ) -> Result<AnnotationVerdict> {
        let annot = match entry {
            Object::Reference(id) => doc.get_object(*id).and_then(|annot| annot.as_dict())?,
            Object::Dictionary(annot) => annot,
            _ => {
                return Err(StructureError::Parse(
                    "annotation entry is not a dictionary".into(),
                )
                .into())
            }
        };

        match annot.get(b"Subtype").and_then(|subtype| subtype.as_name_str()) {
            Ok("Link") if options.remove_links => {
                if self.link_is_dangerous(doc, annot) {
                    Ok(AnnotationVerdict::DropLink)
                } else {
                    Ok(AnnotationVerdict::Keep)
                }
            }
            Ok("Widget") if options.remove_forms => Ok(AnnotationVerdict::DropWidget),
            _ => Ok(AnnotationVerdict::Keep),
        }
    }

    fn link_is_dangerous(&self, doc: &Document, annot: &Dictionary) -> bool {
        let action = match annot.get(b"A") {
            Ok(Object::Reference(id)) => {
                match doc.get_object(*id).and_then(|action| action.as_dict()) {
                    Ok(action) => action,
                    Err(_) => return false,
                }
            }
            Ok(Object::Dictionary(action)) => action,
            _ => return false,
        };

        match action.get(b"S").and_then(|s| s.as_name_str()) {
            Ok(name) if LINK_ACTION_NAMES.contains(&name) => true,
            // Internal navigation is fine unless the destination itself
            // spells out an external scheme.
            Ok("GoTo") => match action.get(b"D") {
                Ok(dest) => destination_is_external(dest),
                Err(_) => false,
            },
            _ => false,
        }
    }
}

impl Default for StructureCleaner {
    fn default() -> Self {
        Self::new()
    }
}

fn catalog_ref(doc: &Document, root_id: ObjectId) -> Option<&Dictionary> {
    doc.get_object(root_id).ok().and_then(|root| root.as_dict().ok())
}

fn catalog_mut(doc: &mut Document, root_id: ObjectId) -> Option<&mut Dictionary> {
    doc.get_object_mut(root_id)
        .ok()
        .and_then(|root| root.as_dict_mut().ok())
}

fn destination_is_external(dest: &Object) -> bool {
    let mut text = String::new();
    collect_strings(dest, &mut text);
    EXTERNAL_SCHEMES.iter().any(|scheme| text.contains(scheme))
}

/// Shallow stringification of a destination: strings and names flatten,
/// containers recurse, references stay opaque.
fn collect_strings(object: &Object, out: &mut String) {
    match object {
        Object::String(bytes, _) => out.push_str(&String::from_utf8_lossy(bytes)),
        Object::Name(name) => out.push_str(&String::from_utf8_lossy(name)),
        Object::Array(items) => {
            for item in items {
                collect_strings(item, out);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter() {
                collect_strings(value, out);
            }
        }
        _ => {}
    }
}
