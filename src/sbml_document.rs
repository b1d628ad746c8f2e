//! Lossless SBML document model backed by a `quick-xml` event stream.
//!
//! The document keeps every event it read, so saving reproduces the input
//! byte-for-byte except for start tags whose attributes were changed. Only
//! the parts the annotator needs are indexed: the `<model>` element and the
//! `fbc:geneProduct` entries of `fbc:listOfGeneProducts`.

use crate::error::{AnnotateError, AnnotateResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use std::path::Path;
use tracing::{debug, info};

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// One `fbc:geneProduct` element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneProduct {
    pub id: Option<String>,
    pub label: Option<String>,
    pub name: Option<String>,
    /// Raw `<annotation>...</annotation>` text of the element, if any.
    pub annotation: Option<String>,
    event_index: usize,
}

impl GeneProduct {
    fn from_start(start: &BytesStart<'_>, event_index: usize) -> AnnotateResult<Self> {
        let mut gene_product = Self {
            event_index,
            ..Self::default()
        };
        for attr in start.attributes() {
            let attr = attr?;
            if is_namespace_declaration(attr.key) {
                continue;
            }
            let value = Some(attr.unescape_value()?.into_owned());
            match attr.key.local_name().as_ref() {
                b"id" => gene_product.id = value,
                b"label" => gene_product.label = value,
                b"name" => gene_product.name = value,
                _ => {}
            }
        }
        Ok(gene_product)
    }

    /// Best available display handle for log messages.
    pub fn display_id(&self) -> &str {
        self.id
            .as_deref()
            .or(self.label.as_deref())
            .unwrap_or("<unnamed>")
    }
}

#[derive(Clone, Debug)]
pub struct SbmlDocument {
    events: Vec<Event<'static>>,
    gene_products: Vec<GeneProduct>,
    model_event: usize,
    byte_order_mark: bool,
}

impl SbmlDocument {
    pub fn from_file<P: AsRef<Path>>(path: P) -> AnnotateResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| AnnotateError::io(path.display().to_string(), e))?;
        let doc = Self::from_xml_text(&text)?;
        info!(
            path = %path.display(),
            gene_products = doc.gene_products.len(),
            "loaded SBML document"
        );
        Ok(doc)
    }

    pub fn from_xml_text(text: &str) -> AnnotateResult<Self> {
        // Reader offsets do not count a leading BOM.
        let (body, byte_order_mark) = match text.strip_prefix(BYTE_ORDER_MARK) {
            Some(body) => (body, true),
            None => (text, false),
        };
        let mut reader = Reader::from_str(body);
        let mut events = vec![];
        let mut gene_products: Vec<GeneProduct> = vec![];
        let mut model_event = None;
        let mut has_gene_product_list = false;
        let mut open: Vec<Vec<u8>> = vec![];
        let mut annotation_start: Option<usize> = None;

        loop {
            let offset = reader.buffer_position() as usize;
            let event = reader.read_event()?;
            match &event {
                Event::Eof => break,
                Event::Start(start) | Event::Empty(start) => {
                    let local = start.local_name().as_ref().to_vec();
                    match local.as_slice() {
                        b"model" if model_event.is_none() => model_event = Some(events.len()),
                        b"listOfGeneProducts" if parent_is(&open, b"model") => {
                            has_gene_product_list = true
                        }
                        b"geneProduct" if parent_is(&open, b"listOfGeneProducts") => {
                            gene_products.push(GeneProduct::from_start(start, events.len())?)
                        }
                        b"annotation"
                            if parent_is(&open, b"geneProduct")
                                && matches!(event, Event::Start(_)) =>
                        {
                            annotation_start = Some(offset)
                        }
                        _ => {}
                    }
                    if matches!(event, Event::Start(_)) {
                        open.push(local);
                    }
                }
                Event::End(end) => {
                    let closes_gene_product_annotation = end.local_name().as_ref()
                        == b"annotation"
                        && open.len() >= 2
                        && open[open.len() - 2].as_slice() == b"geneProduct";
                    if closes_gene_product_annotation {
                        if let (Some(begin), Some(gene_product)) =
                            (annotation_start.take(), gene_products.last_mut())
                        {
                            let finish = reader.buffer_position() as usize;
                            let annotation = body.get(begin..finish).ok_or_else(|| {
                                AnnotateError::Xml(format!(
                                    "annotation span {begin}..{finish} is not valid UTF-8 text"
                                ))
                            })?;
                            gene_product.annotation = Some(annotation.to_string());
                        }
                    }
                    open.pop();
                }
                _ => {}
            }
            events.push(event.into_owned());
        }

        let model_event = model_event.ok_or(AnnotateError::MissingModel)?;
        if !has_gene_product_list {
            return Err(AnnotateError::MissingGeneProducts);
        }
        Ok(Self {
            events,
            gene_products,
            model_event,
            byte_order_mark,
        })
    }

    pub fn gene_products(&self) -> &[GeneProduct] {
        &self.gene_products
    }

    /// Sets `fbc:name` on the gene product at `index`, replacing any existing name.
    pub fn set_gene_product_name(&mut self, index: usize, name: &str) -> AnnotateResult<()> {
        let count = self.gene_products.len();
        let gene_product = self
            .gene_products
            .get_mut(index)
            .ok_or(AnnotateError::GeneProductIndex { index, count })?;
        let event = &mut self.events[gene_product.event_index];
        let default_key = match start_of(event).and_then(|start| start.name().prefix()) {
            Some(prefix) => format!("{}:name", String::from_utf8_lossy(prefix.as_ref())),
            None => "name".to_string(),
        };
        set_attribute(
            event,
            |key| key.local_name().as_ref() == b"name",
            &default_key,
            name,
        )?;
        debug!(gene_product = gene_product.display_id(), name, "set gene product name");
        gene_product.name = Some(name.to_string());
        Ok(())
    }

    pub fn model_name(&self) -> Option<String> {
        let start = start_of(&self.events[self.model_event])?;
        let attr = start.try_get_attribute("name").ok().flatten()?;
        attr.unescape_value().ok().map(|value| value.into_owned())
    }

    pub fn set_model_name(&mut self, name: &str) -> AnnotateResult<()> {
        set_attribute(
            &mut self.events[self.model_event],
            |key| key.as_ref() == b"name",
            "name",
            name,
        )
    }

    pub fn to_xml_string(&self) -> AnnotateResult<String> {
        let mut out = Vec::new();
        if self.byte_order_mark {
            out.extend_from_slice(BYTE_ORDER_MARK.to_string().as_bytes());
        }
        let mut writer = Writer::new(out);
        for event in &self.events {
            writer
                .write_event(event.borrow())
                .map_err(|e| AnnotateError::Xml(e.to_string()))?;
        }
        String::from_utf8(writer.into_inner()).map_err(|e| AnnotateError::Xml(e.to_string()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> AnnotateResult<()> {
        let path = path.as_ref();
        let xml = self.to_xml_string()?;
        std::fs::write(path, xml).map_err(|e| AnnotateError::io(path.display().to_string(), e))?;
        info!(path = %path.display(), "wrote SBML document");
        Ok(())
    }
}

fn parent_is(open: &[Vec<u8>], local_name: &[u8]) -> bool {
    open.last().is_some_and(|parent| parent.as_slice() == local_name)
}

fn is_namespace_declaration(key: QName<'_>) -> bool {
    key.as_ref() == b"xmlns" || key.prefix().is_some_and(|p| p.as_ref() == b"xmlns")
}

fn start_of<'a>(event: &'a Event<'static>) -> Option<&'a BytesStart<'static>> {
    match event {
        Event::Start(start) | Event::Empty(start) => Some(start),
        _ => None,
    }
}

/// Rewrites the start tag held by `event`, replacing the first attribute
/// accepted by `matches` or appending `default_key` when none is present.
fn set_attribute<F>(
    event: &mut Event<'static>,
    matches: F,
    default_key: &str,
    value: &str,
) -> AnnotateResult<()>
where
    F: Fn(QName<'_>) -> bool,
{
    let start = start_of(event)
        .ok_or_else(|| AnnotateError::Xml("attribute target is not an element".to_string()))?;
    let qname = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| AnnotateError::Xml(e.to_string()))?
        .to_string();
    let mut updated = BytesStart::new(qname);
    let mut replaced = false;
    for attr in start.attributes() {
        let attr = attr?;
        if !replaced && !is_namespace_declaration(attr.key) && matches(attr.key) {
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| AnnotateError::Xml(e.to_string()))?;
            updated.push_attribute((key, value));
            replaced = true;
        } else if attr.value.contains(&b'"') {
            // Only legal inside single quotes; re-escape for double-quoted output.
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| AnnotateError::Xml(e.to_string()))?;
            let unescaped = attr.unescape_value()?;
            updated.push_attribute((key, unescaped.as_ref()));
        } else {
            updated.push_attribute(attr);
        }
    }
    if !replaced {
        updated.push_attribute((default_key, value));
    }
    *event = match event {
        Event::Empty(_) => Event::Empty(updated),
        _ => Event::Start(updated),
    };
    Ok(())
}
