//! Content-stream interpretation.
//!
//! Implements the subset of the PDF imaging model that table detection
//! needs: the text-positioning operators with their matrices, and painted
//! path segments. Simple-font string decoding only (Latin-1, plus
//! UTF-16BE when BOM-prefixed); image-only or exotic-encoding documents
//! end up with no spans and fall through to the OCR-needed path upstream.

#![allow(dead_code)]

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use super::{PageContent, RuleLine, TextSpan};

/// Average glyph advance as a fraction of the font size. Good enough for
/// clustering; cell assignment only needs span centres, not exact widths.
const AVG_GLYPH_ADVANCE: f64 = 0.5;

/// US Letter fallback when no MediaBox is resolvable.
const DEFAULT_PAGE_SIZE: (f64, f64) = (612.0, 792.0);

/// Interprets one page's content stream into spans and rules.
///
/// Decode failures yield an empty page; the strategies treat it like a
/// blank page and the caller keeps going.
pub fn interpret_page(doc: &Document, number: u32, page_id: ObjectId) -> PageContent {
    let (width, height) = media_box(doc, page_id).unwrap_or(DEFAULT_PAGE_SIZE);

    let mut page = PageContent {
        number,
        width,
        height,
        spans: Vec::new(),
        rules: Vec::new(),
    };

    let data = match doc.get_page_content(page_id) {
        Ok(data) => data,
        Err(err) => {
            debug!("page {}: unreadable content stream: {}", number, err);
            return page;
        }
    };
    let content = match Content::decode(&data) {
        Ok(content) => content,
        Err(err) => {
            debug!("page {}: undecodable content stream: {}", number, err);
            return page;
        }
    };

    let mut interp = Interpreter::default();
    for op in &content.operations {
        interp.apply(&op.operator, &op.operands, &mut page);
    }
    page
}

/// Resolves the page's MediaBox, following the Pages-tree Parent chain
/// for inherited boxes.
fn media_box(doc: &Document, page_id: ObjectId) -> Option<(f64, f64)> {
    let mut dict = doc.get_dictionary(page_id).ok()?;
    loop {
        if let Ok(obj) = dict.get(b"MediaBox") {
            let arr = resolve(doc, obj)?.as_array().ok()?.clone();
            if arr.len() == 4 {
                let v: Vec<f64> = arr.iter().filter_map(number).collect();
                if v.len() == 4 {
                    return Some(((v[2] - v[0]).abs(), (v[3] - v[1]).abs()));
                }
            }
            return None;
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent).ok()?;
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// 2D affine matrix `[a b c d e f]` as used by Tm.
type Matrix = [f64; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn translated(m: Matrix, tx: f64, ty: f64) -> Matrix {
    // [1 0 0 1 tx ty] x m
    [
        m[0],
        m[1],
        m[2],
        m[3],
        tx * m[0] + ty * m[2] + m[4],
        tx * m[1] + ty * m[3] + m[5],
    ]
}

/// Minimal graphics interpreter: text matrices, current path, pen.
struct Interpreter {
    text_matrix: Matrix,
    line_matrix: Matrix,
    leading: f64,
    font_size: f64,
    /// Pen position within the current text object, advanced by shows.
    pen: (f64, f64),
    /// Path segments accumulated since the last paint/clear.
    segments: Vec<((f64, f64), (f64, f64))>,
    current_point: Option<(f64, f64)>,
    subpath_start: Option<(f64, f64)>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self {
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            leading: 0.0,
            font_size: 0.0,
            pen: (0.0, 0.0),
            segments: Vec::new(),
            current_point: None,
            subpath_start: None,
        }
    }
}

impl Interpreter {
    fn apply(&mut self, operator: &str, operands: &[Object], page: &mut PageContent) {
        match operator {
            // --- text object & positioning ---
            "BT" => {
                self.text_matrix = IDENTITY;
                self.line_matrix = IDENTITY;
                self.sync_pen();
            }
            "ET" => {}
            "Tf" => {
                if let Some(size) = operands.get(1).and_then(number) {
                    self.font_size = size;
                }
            }
            "TL" => {
                if let Some(l) = operands.first().and_then(number) {
                    self.leading = l;
                }
            }
            "Td" => {
                let tx = operands.first().and_then(number).unwrap_or(0.0);
                let ty = operands.get(1).and_then(number).unwrap_or(0.0);
                self.offset_line(tx, ty);
            }
            "TD" => {
                let tx = operands.first().and_then(number).unwrap_or(0.0);
                let ty = operands.get(1).and_then(number).unwrap_or(0.0);
                self.leading = -ty;
                self.offset_line(tx, ty);
            }
            "Tm" => {
                let v: Vec<f64> = operands.iter().filter_map(number).collect();
                if v.len() == 6 {
                    self.text_matrix = [v[0], v[1], v[2], v[3], v[4], v[5]];
                    self.line_matrix = self.text_matrix;
                    self.sync_pen();
                }
            }
            "T*" => self.offset_line(0.0, -self.leading),

            // --- text showing ---
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes, page);
                }
            }
            "'" => {
                self.offset_line(0.0, -self.leading);
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes, page);
                }
            }
            "\"" => {
                self.offset_line(0.0, -self.leading);
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    self.show(bytes, page);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => self.show(bytes, page),
                            other => {
                                if let Some(adj) = number(other) {
                                    // Kerning: thousandths of em, negative
                                    // values move the pen rightward.
                                    self.pen.0 -= adj / 1000.0 * self.font_size;
                                }
                            }
                        }
                    }
                }
            }

            // --- path construction ---
            "m" => {
                let p = self.point(operands, 0);
                self.current_point = p;
                self.subpath_start = p;
            }
            "l" => {
                let p = self.point(operands, 0);
                if let (Some(from), Some(to)) = (self.current_point, p) {
                    self.segments.push((from, to));
                }
                self.current_point = p;
            }
            "re" => {
                let v: Vec<f64> = operands.iter().filter_map(number).collect();
                if v.len() == 4 {
                    let (x, y, w, h) = (v[0], v[1], v[2], v[3]);
                    self.segments.push(((x, y), (x + w, y)));
                    self.segments.push(((x + w, y), (x + w, y + h)));
                    self.segments.push(((x + w, y + h), (x, y + h)));
                    self.segments.push(((x, y + h), (x, y)));
                    self.current_point = Some((x, y));
                    self.subpath_start = Some((x, y));
                }
            }
            "c" => self.current_point = self.point(operands, 4),
            "v" | "y" => self.current_point = self.point(operands, 2),
            "h" => {
                if let (Some(from), Some(to)) = (self.current_point, self.subpath_start) {
                    self.segments.push((from, to));
                }
                self.current_point = self.subpath_start;
            }

            // --- path painting ---
            "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => self.flush_path(page),
            "n" => self.clear_path(),

            _ => {}
        }
    }

    fn point(&self, operands: &[Object], at: usize) -> Option<(f64, f64)> {
        let x = operands.get(at).and_then(number)?;
        let y = operands.get(at + 1).and_then(number)?;
        Some((x, y))
    }

    fn offset_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = translated(self.line_matrix, tx, ty);
        self.text_matrix = self.line_matrix;
        self.sync_pen();
    }

    fn sync_pen(&mut self) {
        self.pen = (self.text_matrix[4], self.text_matrix[5]);
    }

    fn show(&mut self, bytes: &[u8], page: &mut PageContent) {
        let text = decode_pdf_string(bytes);
        if text.is_empty() {
            return;
        }
        let width = text.chars().count() as f64 * self.font_size * AVG_GLYPH_ADVANCE;
        if !text.trim().is_empty() {
            page.spans.push(TextSpan {
                text,
                x: self.pen.0,
                y: self.pen.1,
                width,
            });
        }
        self.pen.0 += width;
    }

    fn flush_path(&mut self, page: &mut PageContent) {
        for ((x0, y0), (x1, y1)) in self.segments.drain(..) {
            let rule = RuleLine { x0, y0, x1, y1 };
            if (rule.is_horizontal() || rule.is_vertical()) && rule.length() > 1.0 {
                page.rules.push(rule);
            }
        }
        self.current_point = None;
        self.subpath_start = None;
    }

    fn clear_path(&mut self) {
        self.segments.clear();
        self.current_point = None;
        self.subpath_start = None;
    }
}

/// Decodes a PDF string: UTF-16BE when BOM-prefixed, Latin-1 otherwise.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;

    fn run(ops: Vec<Operation>) -> PageContent {
        let mut page = PageContent {
            number: 1,
            width: 612.0,
            height: 792.0,
            spans: Vec::new(),
            rules: Vec::new(),
        };
        let mut interp = Interpreter::default();
        for op in &ops {
            interp.apply(&op.operator, &op.operands, &mut page);
        }
        page
    }

    #[test]
    fn test_td_positions_text() {
        let page = run(vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![100.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal("Country")]),
            Operation::new("ET", vec![]),
        ]);

        assert_eq!(page.spans.len(), 1);
        let span = &page.spans[0];
        assert_eq!(span.text, "Country");
        assert!((span.x - 100.0).abs() < 0.01);
        assert!((span.y - 700.0).abs() < 0.01);
        assert!(span.width > 0.0);
    }

    #[test]
    fn test_successive_td_accumulates() {
        let page = run(vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new("Td", vec![50.into(), 600.into()]),
            Operation::new("Tj", vec![Object::string_literal("a")]),
            Operation::new("Td", vec![0.into(), (-20).into()]),
            Operation::new("Tj", vec![Object::string_literal("b")]),
            Operation::new("ET", vec![]),
        ]);

        assert_eq!(page.spans.len(), 2);
        assert!((page.spans[1].x - 50.0).abs() < 0.01);
        assert!((page.spans[1].y - 580.0).abs() < 0.01);
    }

    #[test]
    fn test_tm_sets_absolute_position() {
        let page = run(vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    222.into(),
                    333.into(),
                ],
            ),
            Operation::new("Tj", vec![Object::string_literal("x")]),
            Operation::new("ET", vec![]),
        ]);

        assert!((page.spans[0].x - 222.0).abs() < 0.01);
        assert!((page.spans[0].y - 333.0).abs() < 0.01);
    }

    #[test]
    fn test_stroked_rect_yields_four_rules() {
        let page = run(vec![
            Operation::new("re", vec![10.into(), 10.into(), 100.into(), 50.into()]),
            Operation::new("S", vec![]),
        ]);

        assert_eq!(page.rules.len(), 4);
        assert_eq!(page.rules.iter().filter(|r| r.is_horizontal()).count(), 2);
        assert_eq!(page.rules.iter().filter(|r| r.is_vertical()).count(), 2);
    }

    #[test]
    fn test_moveto_lineto_stroke() {
        let page = run(vec![
            Operation::new("m", vec![10.into(), 700.into()]),
            Operation::new("l", vec![500.into(), 700.into()]),
            Operation::new("S", vec![]),
        ]);

        assert_eq!(page.rules.len(), 1);
        assert!(page.rules[0].is_horizontal());
    }

    #[test]
    fn test_unpainted_path_discarded() {
        let page = run(vec![
            Operation::new("re", vec![0.into(), 0.into(), 612.into(), 792.into()]),
            Operation::new("n", vec![]),
        ]);
        assert!(page.rules.is_empty());
    }

    #[test]
    fn test_diagonal_segments_filtered() {
        let page = run(vec![
            Operation::new("m", vec![0.into(), 0.into()]),
            Operation::new("l", vec![100.into(), 100.into()]),
            Operation::new("S", vec![]),
        ]);
        assert!(page.rules.is_empty());
    }

    #[test]
    fn test_decode_latin1_and_utf16() {
        assert_eq!(decode_pdf_string(b"Price"), "Price");
        assert_eq!(decode_pdf_string(&[0xE9]), "é");

        let utf16 = [0xFE, 0xFF, 0x00, 0x41, 0x20, 0xAC];
        assert_eq!(decode_pdf_string(&utf16), "A€");
    }

    #[test]
    fn test_whitespace_only_show_ignored() {
        let page = run(vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new("Td", vec![10.into(), 10.into()]),
            Operation::new("Tj", vec![Object::string_literal("   ")]),
            Operation::new("ET", vec![]),
        ]);
        assert!(page.spans.is_empty());
    }
}
