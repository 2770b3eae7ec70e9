//! PDF serialization of laid-out pages with `pdf-writer`.
//!
//! Base-14 Type1 fonts with WinAnsiEncoding, so nothing is embedded. One content stream
//! per page; text runs are absolutely positioned and rules are stroked paths.
//! The writer is total: any page list, including an empty one, gives a valid file.

use std::collections::BTreeMap;

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::layout::{Page, PageGeometry};
use crate::output::winansi;

pub const PDF_MAGIC: &[u8] = b"%PDF";

const PRODUCER: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

/// Allocates indirect object ids in order.
struct RefAlloc(i32);

impl RefAlloc {
    fn next(&mut self) -> Ref {
        self.0 += 1;
        Ref::new(self.0)
    }
}

/// Serializes pages to PDF bytes. `title` goes into the document info dictionary.
pub fn write_pdf(pages: &[Page], geometry: &PageGeometry, title: &str) -> Vec<u8> {
    let blank;
    let pages = if pages.is_empty() {
        blank = [Page::new(1)];
        &blank[..]
    } else {
        pages
    };

    let mut alloc = RefAlloc(0);
    let catalog_id = alloc.next();
    let page_tree_id = alloc.next();
    let info_id = alloc.next();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr(PRODUCER));

    // One font object per face actually used, named F1, F2, ... in face-name order.
    let mut fonts: BTreeMap<&'static str, (String, Ref)> = pages
        .iter()
        .flat_map(|p| p.lines.iter())
        .flat_map(|l| l.runs.iter())
        .map(|r| (r.font.base_font_name(), (String::new(), Ref::new(1))))
        .collect();
    for (i, (face, slot)) in fonts.iter_mut().enumerate() {
        *slot = (format!("F{}", i + 1), alloc.next());
        pdf.type1_font(slot.1)
            .base_font(Name(face.as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    let mut page_ids = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = alloc.next();
        let content_id = alloc.next();
        page_ids.push(page_id);

        let mut content = Content::new();
        for line in &page.lines {
            let baseline = geometry.height - line.y;
            for run in line.runs.iter().filter(|r| !r.text.is_empty()) {
                let bytes = winansi::encode(&run.text);
                content.begin_text();
                let resource = fonts
                    .get(run.font.base_font_name())
                    .map_or(&b"F1"[..], |(name, _)| name.as_bytes());
                content.set_font(Name(resource), run.font.size);
                content.next_line(run.x, baseline);
                content.show(Str(&bytes));
                content.end_text();
            }
        }
        for rule in &page.rules {
            let y = geometry.height - rule.y;
            content.set_line_width(rule.thickness);
            content.move_to(rule.x_start, y);
            content.line_to(rule.x_end, y);
            content.stroke();
        }
        pdf.stream(content_id, &content.finish());

        let mut page_writer = pdf.page(page_id);
        page_writer
            .media_box(Rect::new(0.0, 0.0, geometry.width, geometry.height))
            .parent(page_tree_id)
            .contents(content_id);
        {
            let mut resources = page_writer.resources();
            let mut font_dict = resources.fonts();
            for (name, id) in fonts.values() {
                font_dict.pair(Name(name.as_bytes()), *id);
            }
            font_dict.finish();
        }
        page_writer.finish();
    }

    let count = page_ids.len() as i32;
    pdf.pages(page_tree_id).kids(page_ids).count(count);

    pdf.finish()
}
