//! Lyon-based vector draw calls.
//!
//! Drawing commands are tessellated on the CPU into a flat triangle-list
//! vertex buffer which the page uploads and draws as-is. The buffer is rebuilt
//! from scratch every frame.
//!
//! # Usage
//!
//! ```ignore
//! // In your Game::render():
//! ctx.vectors.fill_rect(Vec2::ZERO, 360.0, 640.0, VectorColor::hex(0x1a1a1a));
//! ctx.vectors.fill_rounded_rect(Vec2::new(40.0, 500.0), Vec2::new(66.0, 80.0), 12.0, VectorColor::hex(0x4ade80));
//! ctx.vectors.stroke_dashed_line(Vec2::new(120.0, 0.0), Vec2::new(120.0, 640.0), 20.0, 16.0, 4.0, VectorColor::WHITE);
//! ```

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use lyon::math::{point, Box2D, Point};
use lyon::path::builder::BorderRadii;
use lyon::path::{Path, Winding};
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, FillVertexConstructor,
    StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor, TessellationError,
    VertexBuffers,
};

const TOLERANCE: f32 = 0.5;

/// One vertex of the shared buffer: position then straight RGBA.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct VectorVertex {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl VectorVertex {
    pub const FLOATS: usize = 6;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    fn at(position: Point, color: VectorColor) -> Self {
        Self {
            x: position.x,
            y: position.y,
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        }
    }
}

/// RGBA, each channel in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl VectorColor {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Opaque color from a `0xRRGGBB` value, as written in CSS.
    pub fn hex(rgb: u32) -> Self {
        let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl Default for VectorColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Flat-colored vertex constructor shared by fills and strokes.
struct Paint(VectorColor);

impl FillVertexConstructor<VectorVertex> for Paint {
    fn new_vertex(&mut self, vertex: FillVertex) -> VectorVertex {
        VectorVertex::at(vertex.position(), self.0)
    }
}

impl StrokeVertexConstructor<VectorVertex> for Paint {
    fn new_vertex(&mut self, vertex: StrokeVertex) -> VectorVertex {
        VectorVertex::at(vertex.position(), self.0)
    }
}

/// Per-frame triangle list plus the tessellators that feed it.
pub struct VectorState {
    fill_tess: FillTessellator,
    stroke_tess: StrokeTessellator,
    scratch: VertexBuffers<VectorVertex, u32>,
    buffer: Vec<f32>,
}

impl VectorState {
    pub fn new() -> Self {
        Self::with_capacity(16384)
    }

    pub fn with_capacity(max_vertices: usize) -> Self {
        Self {
            fill_tess: FillTessellator::new(),
            stroke_tess: StrokeTessellator::new(),
            scratch: VertexBuffers::new(),
            buffer: Vec::with_capacity(max_vertices * VectorVertex::FLOATS),
        }
    }

    /// Drop last frame's triangles.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn vertex_count(&self) -> usize {
        self.buffer.len() / VectorVertex::FLOATS
    }

    /// `vertex_count() * 6` floats, triangle-list order.
    pub fn as_floats(&self) -> &[f32] {
        &self.buffer
    }

    pub fn buffer_ptr(&self) -> *const f32 {
        self.buffer.as_ptr()
    }

    /// Fill an axis-aligned rectangle with its top-left corner at `pos`.
    pub fn fill_rect(&mut self, pos: Vec2, width: f32, height: f32, color: VectorColor) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let mut builder = Path::builder();
        builder.add_rectangle(&corners(pos, Vec2::new(width, height)), Winding::Positive);
        self.fill_path(&builder.build(), color);
    }

    /// Fill a rectangle with rounded corners. The radius is clamped to half
    /// the shorter side.
    pub fn fill_rounded_rect(&mut self, pos: Vec2, size: Vec2, radius: f32, color: VectorColor) {
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        let radius = radius.clamp(0.0, size.x.min(size.y) / 2.0);

        let mut builder = Path::builder();
        builder.add_rounded_rectangle(&corners(pos, size), &BorderRadii::new(radius), Winding::Positive);
        self.fill_path(&builder.build(), color);
    }

    /// Stroke a straight dashed line from `from` to `to`.
    ///
    /// Dashes start at `from`; the last dash is cut at `to`. All dashes are
    /// tessellated together as one multi-segment path.
    pub fn stroke_dashed_line(
        &mut self,
        from: Vec2,
        to: Vec2,
        dash: f32,
        gap: f32,
        width: f32,
        color: VectorColor,
    ) {
        let length = from.distance(to);
        if length <= 0.0 || dash <= 0.0 {
            return;
        }
        let dir = (to - from) / length;
        let period = dash + gap.max(0.0);

        let mut builder = Path::builder();
        let mut start = 0.0;
        while start < length {
            let a = from + dir * start;
            let b = from + dir * (start + dash).min(length);
            builder.begin(point(a.x, a.y));
            builder.line_to(point(b.x, b.y));
            builder.end(false);
            start += period;
        }
        self.stroke_path(&builder.build(), width, color);
    }

    pub fn fill_path(&mut self, path: &Path, color: VectorColor) {
        let result = self.fill_tess.tessellate_path(
            path,
            &FillOptions::tolerance(TOLERANCE),
            &mut BuffersBuilder::new(&mut self.scratch, Paint(color)),
        );
        match result {
            Ok(()) => self.flush(),
            Err(e) => self.discard("fill", e),
        }
    }

    pub fn stroke_path(&mut self, path: &Path, width: f32, color: VectorColor) {
        let result = self.stroke_tess.tessellate_path(
            path,
            &StrokeOptions::tolerance(TOLERANCE).with_line_width(width),
            &mut BuffersBuilder::new(&mut self.scratch, Paint(color)),
        );
        match result {
            Ok(()) => self.flush(),
            Err(e) => self.discard("stroke", e),
        }
    }

    /// Expand indexed scratch geometry into the flat buffer.
    fn flush(&mut self) {
        let VertexBuffers { vertices, indices } = &mut self.scratch;
        for &i in indices.iter() {
            let v = &vertices[i as usize];
            self.buffer.extend_from_slice(&[v.x, v.y, v.r, v.g, v.b, v.a]);
        }
        vertices.clear();
        indices.clear();
    }

    fn discard(&mut self, pass: &str, error: TessellationError) {
        log::warn!("vector: {} tessellation failed: {:?}", pass, error);
        self.scratch.vertices.clear();
        self.scratch.indices.clear();
    }
}

impl Default for VectorState {
    fn default() -> Self {
        Self::new()
    }
}

fn corners(pos: Vec2, size: Vec2) -> Box2D {
    Box2D::new(point(pos.x, pos.y), point(pos.x + size.x, pos.y + size.y))
}
