use super::{DocumentParser, ParseConfig};
use crate::error::MedibotError;
use crate::map_err;
use std::{fmt::Write, time::Instant};
use tracing::debug;

/// Parses PDFs into per-page text.
///
/// Configuration:
/// * `filters`: Line based, i.e. lines matching a filter will be skipped.
///
/// Bare page number lines are always skipped.
#[derive(Debug, Default)]
pub struct PdfParser {
    config: ParseConfig,
}

impl PdfParser {
    pub fn new(config: ParseConfig) -> Self {
        Self { config }
    }
}

impl DocumentParser for PdfParser {
    fn parse(&self, input: &[u8]) -> Result<Vec<String>, MedibotError> {
        let _start = Instant::now();

        let input = map_err!(lopdf::Document::load_mem(input));

        let mut pages = vec![];

        for (page_num, _) in input
            .page_iter()
            .enumerate()
            .map(|(page_num, oid)| (page_num as u32 + 1, oid))
        {
            let text = map_err!(input.extract_text(&[page_num]));

            let mut out = String::new();

            'lines: for line in text.lines() {
                let line = line.trim();

                // Skip page numbers in output.
                if line == page_num.to_string() {
                    continue;
                }

                for filter in self.config.filters.iter() {
                    if filter.is_match(line) {
                        continue 'lines;
                    }
                }

                let _ = writeln!(out, "{line}");
            }

            pages.push(out);
        }

        debug!(
            "Finished processing PDF, {} page(s), took {}ms",
            pages.len(),
            Instant::now().duration_since(_start).as_millis()
        );

        Ok(pages)
    }
}

/// Build an in-memory PDF with one text line per page.
#[cfg(test)]
pub(crate) fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = vec![];

    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 36.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encodes content stream"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("writes the document");
    buffer
}
