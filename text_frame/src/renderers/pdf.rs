// Copyright 2026 the Text Frame Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single-page vector surface.
//!
//! [`PdfPage`] records what is drawn into it. The recording can be written out as a
//! PDF document or replayed into another surface, the way a PDF page is drawn into a
//! graphics context.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::kurbo::{Affine, BezPath, PathEl, Point, Size, Vec2};
use crate::math::{apply_linear, length_scale};
use crate::peniko::Color;
use crate::surface::{Surface, SurfaceKind, SurfaceShadow};

/// A recorded page command.
///
/// Geometry is kept in page space: y-up points with the origin at the bottom left.
#[derive(Clone, Debug, PartialEq)]
pub enum PageCommand {
    /// Fill `path` transformed by `transform` into page space.
    Fill {
        /// The path in the user space it was drawn in.
        path: BezPath,
        /// User space to page space at the time of the fill.
        transform: Affine,
        /// Fill color.
        color: Color,
    },
    /// Start a shadow scope.
    BeginShadow {
        /// Offset in page space.
        offset: Vec2,
        /// Blur radius in page space.
        blur: f64,
        /// Shadow color.
        color: Color,
    },
    /// End the current shadow scope.
    EndShadow,
}

/// A vector page of a fixed size in points.
///
/// The default user space is y-down with its origin at the top left of the page, so the
/// base transform is `[1, 0, 0, -1, 0, height]`.
#[derive(Clone, Debug)]
pub struct PdfPage {
    size: Size,
    base: Affine,
    transform: Affine,
    commands: Vec<PageCommand>,
}

impl PdfPage {
    /// Creates an empty page.
    pub fn new(size: Size) -> Self {
        let base = Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, size.height]);
        Self {
            size,
            base,
            transform: base,
            commands: Vec::new(),
        }
    }

    /// The media box size in points.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Everything drawn so far, in order.
    pub fn commands(&self) -> &[PageCommand] {
        &self.commands
    }

    /// Replays the page into `target`, mapping page space through the target's current
    /// transform.
    ///
    /// The target's transform is left as it was found.
    pub fn draw_into(&self, target: &mut dyn Surface) {
        let page_to_target = target.transform();
        let target_base = target
            .base_transform()
            .filter(|base| base.determinant() != 0.0)
            .unwrap_or(Affine::IDENTITY);
        let base_linear = linear(target_base);
        let base_scale = length_scale(&target_base);

        for command in &self.commands {
            match command {
                PageCommand::Fill {
                    path,
                    transform,
                    color,
                } => {
                    target.set_transform(page_to_target * *transform);
                    target.fill_path(path, *color);
                }
                PageCommand::BeginShadow {
                    offset,
                    blur,
                    color,
                } => {
                    let device = apply_linear(&page_to_target, *offset);
                    target.begin_shadow(SurfaceShadow {
                        offset: apply_linear(&base_linear.inverse(), device),
                        blur: blur * length_scale(&page_to_target) / base_scale,
                        color: *color,
                    });
                }
                PageCommand::EndShadow => target.end_shadow(),
            }
        }
        target.set_transform(page_to_target);
    }

    /// Writes the page as a single-page PDF document.
    ///
    /// Shadows are written as unblurred copies of their fills at the shadow offset.
    pub fn to_pdf(&self) -> Vec<u8> {
        let mut alphas = AlphaStates::default();
        let content = self.content_stream(&mut alphas);

        let mut writer = PdfWriter::new();
        writer.object(1, "<< /Type /Catalog /Pages 2 0 R >>");
        writer.object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
        let mut page = String::from("<< /Type /Page /Parent 2 0 R /MediaBox [0 0 ");
        push_number(&mut page, self.size.width);
        page.push(' ');
        push_number(&mut page, self.size.height);
        page.push_str("] /Contents 4 0 R /Resources << ");
        if !alphas.is_empty() {
            page.push_str("/ExtGState << ");
            for (index, _) in alphas.iter() {
                let _ = write!(page, "/GS{index} {} 0 R ", 5 + index);
            }
            page.push_str(">> ");
        }
        page.push_str(">> >>");
        writer.object(3, &page);
        writer.stream(4, content.as_bytes());
        for (index, alpha) in alphas.iter() {
            let mut state = String::from("<< /Type /ExtGState /ca ");
            push_number(&mut state, f64::from(alpha) / 255.0);
            state.push_str(" >>");
            writer.object(5 + index, &state);
        }
        writer.finish(1)
    }

    fn content_stream(&self, alphas: &mut AlphaStates) -> String {
        let mut out = String::new();
        let mut shadow: Option<(Vec2, Color)> = None;
        let mut shadowed: Vec<(&BezPath, Affine, Color)> = Vec::new();

        for command in &self.commands {
            match command {
                PageCommand::Fill {
                    path,
                    transform,
                    color,
                } => {
                    if shadow.is_some() {
                        shadowed.push((path, *transform, *color));
                    } else {
                        write_fill(&mut out, alphas, path, *transform, *color);
                    }
                }
                PageCommand::BeginShadow { offset, color, .. } => {
                    shadow = Some((*offset, *color));
                }
                PageCommand::EndShadow => {
                    if let Some((offset, shadow_color)) = shadow.take() {
                        let to_shadow = Affine::translate(offset);
                        for (path, transform, color) in &shadowed {
                            let color = shadow_color.multiply_alpha(color.components[3]);
                            write_fill(&mut out, alphas, path, to_shadow * *transform, color);
                        }
                        for (path, transform, color) in shadowed.drain(..) {
                            write_fill(&mut out, alphas, path, transform, color);
                        }
                    }
                }
            }
        }
        for (path, transform, color) in shadowed {
            write_fill(&mut out, alphas, path, transform, color);
        }
        out
    }
}

impl Surface for PdfPage {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Vector
    }

    fn transform(&self) -> Affine {
        self.transform
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn base_transform(&self) -> Option<Affine> {
        Some(self.base)
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.commands.push(PageCommand::Fill {
            path: path.clone(),
            transform: self.transform,
            color,
        });
    }

    fn begin_shadow(&mut self, shadow: SurfaceShadow) {
        self.commands.push(PageCommand::BeginShadow {
            offset: apply_linear(&self.base, shadow.offset),
            blur: shadow.blur * length_scale(&self.base),
            color: shadow.color,
        });
    }

    fn end_shadow(&mut self) {
        self.commands.push(PageCommand::EndShadow);
    }
}

fn linear(transform: Affine) -> Affine {
    let [a, b, c, d, _, _] = transform.as_coeffs();
    Affine::new([a, b, c, d, 0.0, 0.0])
}

/// Distinct fill opacities, each backed by one graphics state object.
#[derive(Debug, Default)]
struct AlphaStates {
    indices: BTreeMap<u8, usize>,
}

impl AlphaStates {
    fn index(&mut self, alpha: u8) -> usize {
        let next = self.indices.len();
        *self.indices.entry(alpha).or_insert(next)
    }

    fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// `(index, alpha)` pairs in index order.
    fn iter(&self) -> impl Iterator<Item = (usize, u8)> {
        let mut pairs: Vec<_> = self.indices.iter().map(|(a, i)| (*i, *a)).collect();
        pairs.sort_unstable();
        pairs.into_iter()
    }
}

fn write_fill(
    out: &mut String,
    alphas: &mut AlphaStates,
    path: &BezPath,
    transform: Affine,
    color: Color,
) {
    let [r, g, b, a] = color.components;
    if a <= 0.0 {
        return;
    }
    out.push_str("q ");
    #[expect(
        clippy::cast_possible_truncation,
        reason = "alpha is clamped to 0..=255"
    )]
    let alpha = (f64::from(a).clamp(0.0, 1.0) * 255.0).round() as u8;
    if alpha < 255 {
        let _ = write!(out, "/GS{} gs ", alphas.index(alpha));
    }
    for coeff in transform.as_coeffs() {
        push_number(out, coeff);
        out.push(' ');
    }
    out.push_str("cm ");
    for channel in [r, g, b] {
        push_number(out, f64::from(channel).clamp(0.0, 1.0));
        out.push(' ');
    }
    out.push_str("rg\n");
    write_path(out, path);
    out.push_str("f Q\n");
}

fn write_path(out: &mut String, path: &BezPath) {
    let mut current = Point::ZERO;
    let mut start = Point::ZERO;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                push_points(out, &[p], "m");
                current = p;
                start = p;
            }
            PathEl::LineTo(p) => {
                push_points(out, &[p], "l");
                current = p;
            }
            PathEl::QuadTo(p1, p2) => {
                let c1 = current + (p1 - current) * (2.0 / 3.0);
                let c2 = p2 + (p1 - p2) * (2.0 / 3.0);
                push_points(out, &[c1, c2, p2], "c");
                current = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                push_points(out, &[p1, p2, p3], "c");
                current = p3;
            }
            PathEl::ClosePath => {
                out.push_str("h\n");
                current = start;
            }
        }
    }
}

fn push_points(out: &mut String, points: &[Point], op: &str) {
    for p in points {
        push_number(out, p.x);
        out.push(' ');
        push_number(out, p.y);
        out.push(' ');
    }
    out.push_str(op);
    out.push('\n');
}

/// Writes `value` with at most four decimals and no trailing zeros.
fn push_number(out: &mut String, value: f64) {
    let value = if value.is_finite() { value } else { 0.0 };
    let formatted = format!("{value:.4}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    out.push_str(if trimmed == "-0" { "0" } else { trimmed });
}

/// Serializes numbered objects and the cross-reference table.
#[derive(Debug)]
struct PdfWriter {
    buf: Vec<u8>,
    offsets: BTreeMap<usize, usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = b"%PDF-1.4\n".to_vec();
        // Binary marker so transfer tools treat the file as binary.
        buf.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: BTreeMap::new(),
        }
    }

    fn object(&mut self, id: usize, body: &str) {
        self.offsets.insert(id, self.buf.len());
        self.buf
            .extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
    }

    fn stream(&mut self, id: usize, data: &[u8]) {
        self.offsets.insert(id, self.buf.len());
        self.buf.extend_from_slice(
            format!("{id} 0 obj\n<< /Length {} >>\nstream\n", data.len()).as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self, root: usize) -> Vec<u8> {
        let xref = self.buf.len();
        let count = self.offsets.len() + 1;
        let mut table = format!("xref\n0 {count}\n0000000000 65535 f \n");
        for offset in self.offsets.values() {
            let _ = writeln!(table, "{offset:010} 00000 n ");
        }
        let _ = write!(
            table,
            "trailer\n<< /Size {count} /Root {root} 0 R >>\nstartxref\n{xref}\n%%EOF\n"
        );
        self.buf.extend_from_slice(table.as_bytes());
        self.buf
    }
}
