//! Solid and outlined shape emitters.
//!
//! Positions are in the current transform's space; every emitter bakes the
//! matrix into vertices immediately, so later state changes never move
//! geometry that was already pushed.

use glam::{Affine2, Vec2};

use super::{Batcher, FILL_WEIGHTS, NO_UV};
use crate::color::Color;
use crate::coords::angle::{angle_diff, DOWN, LEFT, RIGHT, TAU, UP};
use crate::coords::{CornerRadii, Rect};
use crate::gfx::{Subtexture, TextureRef};

impl Batcher {
    // ── lines ─────────────────────────────────────────────────────────────

    pub fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color) {
        self.line_gradient(from, to, thickness, color, color);
    }

    /// Thick line as a single quad. Zero-length lines emit nothing.
    pub fn line_gradient(&mut self, from: Vec2, to: Vec2, thickness: f32, from_color: Color, to_color: Color) {
        let Some(dir) = (to - from).try_normalize() else {
            return;
        };
        let perp = Vec2::new(dir.y, -dir.x) * (thickness * 0.5);

        self.push_quad_geometry(
            [from + perp, to + perp, to - perp, from - perp],
            NO_UV,
            [from_color, to_color, to_color, from_color],
            FILL_WEIGHTS,
        );
    }

    /// Quadratic bezier approximated by `steps` line segments.
    pub fn bezier_quad_line(&mut self, from: Vec2, b: Vec2, to: Vec2, steps: u32, thickness: f32, color: Color) {
        let mut prev = from;
        for i in 1..=steps {
            let next = bezier_quad(from, b, to, i as f32 / steps as f32);
            self.line(prev, next, thickness, color);
            prev = next;
        }
    }

    /// Cubic bezier approximated by `steps` line segments.
    pub fn bezier_cubic_line(
        &mut self,
        from: Vec2,
        b: Vec2,
        c: Vec2,
        to: Vec2,
        steps: u32,
        thickness: f32,
        color: Color,
    ) {
        let mut prev = from;
        for i in 1..=steps {
            let next = bezier_cubic(from, b, c, to, i as f32 / steps as f32);
            self.line(prev, next, thickness, color);
            prev = next;
        }
    }

    // ── triangles ─────────────────────────────────────────────────────────

    pub fn tri(&mut self, p0: Vec2, p1: Vec2, p2: Vec2, color: Color) {
        self.push_tri_geometry([p0, p1, p2], [Vec2::ZERO; 3], [color; 3], FILL_WEIGHTS);
    }

    pub fn tri_colors(&mut self, p0: Vec2, p1: Vec2, p2: Vec2, c0: Color, c1: Color, c2: Color) {
        self.push_tri_geometry([p0, p1, p2], [Vec2::ZERO; 3], [c0, c1, c2], FILL_WEIGHTS);
    }

    /// Textured triangle sampling whatever texture is currently set.
    pub fn tri_tex(&mut self, pos: [Vec2; 3], uv: [Vec2; 3], color: Color) {
        let weights = self.tex_weights();
        self.push_tri_geometry(pos, uv, [color; 3], weights);
    }

    pub fn tri_tex_colors(&mut self, pos: [Vec2; 3], uv: [Vec2; 3], col: [Color; 3]) {
        let weights = self.tex_weights();
        self.push_tri_geometry(pos, uv, col, weights);
    }

    /// Mitered triangle outline of thickness `t`, inset assuming clockwise
    /// winding.
    pub fn tri_line(&mut self, a: Vec2, b: Vec2, c: Vec2, t: f32, color: Color) {
        let Some(off_ab) = inward_offset(a, b, t) else { return };
        let Some(off_bc) = inward_offset(b, c, t) else { return };
        let Some(off_ca) = inward_offset(c, a, t) else { return };

        let aa = miter(c + off_ca, a + off_ca, a + off_ab, b + off_ab).unwrap_or(a + off_ab);
        let bb = miter(a + off_ab, b + off_ab, b + off_bc, c + off_bc).unwrap_or(b + off_bc);
        let cc = miter(b + off_bc, c + off_bc, c + off_ca, a + off_ca).unwrap_or(c + off_ca);

        self.quad(a, b, bb, aa, color);
        self.quad(b, c, cc, bb, color);
        self.quad(c, a, aa, cc, color);
    }

    // ── quads ─────────────────────────────────────────────────────────────

    pub fn quad(&mut self, p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, color: Color) {
        self.push_quad_geometry([p0, p1, p2, p3], NO_UV, [color; 4], FILL_WEIGHTS);
    }

    pub fn quad_colors(&mut self, pos: [Vec2; 4], col: [Color; 4]) {
        self.push_quad_geometry(pos, NO_UV, col, FILL_WEIGHTS);
    }

    /// Textured quad sampling whatever texture is currently set.
    pub fn quad_tex(&mut self, pos: [Vec2; 4], uv: [Vec2; 4], color: Color) {
        let weights = self.tex_weights();
        self.push_quad_geometry(pos, uv, [color; 4], weights);
    }

    pub fn quad_tex_colors(&mut self, pos: [Vec2; 4], uv: [Vec2; 4], col: [Color; 4]) {
        let weights = self.tex_weights();
        self.push_quad_geometry(pos, uv, col, weights);
    }

    /// Mitered quad outline of thickness `t`, inset assuming clockwise
    /// winding.
    pub fn quad_line(&mut self, a: Vec2, b: Vec2, c: Vec2, d: Vec2, t: f32, color: Color) {
        let Some(off_ab) = inward_offset(a, b, t) else { return };
        let Some(off_bc) = inward_offset(b, c, t) else { return };
        let Some(off_cd) = inward_offset(c, d, t) else { return };
        let Some(off_da) = inward_offset(d, a, t) else { return };

        let aa = miter(d + off_da, a + off_da, a + off_ab, b + off_ab).unwrap_or(a + off_ab);
        let bb = miter(a + off_ab, b + off_ab, b + off_bc, c + off_bc).unwrap_or(b + off_bc);
        let cc = miter(b + off_bc, c + off_bc, c + off_cd, d + off_cd).unwrap_or(c + off_cd);
        let dd = miter(c + off_cd, d + off_cd, d + off_da, a + off_da).unwrap_or(d + off_da);

        self.quad(a, b, bb, aa, color);
        self.quad(b, c, cc, bb, color);
        self.quad(c, d, dd, cc, color);
        self.quad(d, a, aa, dd, color);
    }

    // ── rectangles ────────────────────────────────────────────────────────

    pub fn rect(&mut self, rect: Rect, color: Color) {
        self.push_quad_geometry(
            [rect.top_left(), rect.top_right(), rect.bottom_right(), rect.bottom_left()],
            NO_UV,
            [color; 4],
            FILL_WEIGHTS,
        );
    }

    /// Rectangle outline of thickness `t` inset into the rectangle. Fills
    /// solid once the opposing strips would overlap (either extent <= 2t).
    pub fn rect_line(&mut self, rect: Rect, t: f32, color: Color) {
        if t <= 0.0 {
            return;
        }
        if rect.size.x <= t * 2.0 || rect.size.y <= t * 2.0 {
            self.rect(rect, color);
            return;
        }

        let (x0, y0) = (rect.origin.x, rect.origin.y);
        let (x1, y1) = (x0 + rect.size.x, y0 + rect.size.y);

        self.rect(Rect::new(x0, y0, rect.size.x, t), color);
        self.rect(Rect::new(x0, y1 - t, rect.size.x, t), color);
        self.rect(Rect::new(x0, y0 + t, t, rect.size.y - t * 2.0), color);
        self.rect(Rect::new(x1 - t, y0 + t, t, rect.size.y - t * 2.0), color);
    }

    pub fn rect_rounded(&mut self, rect: Rect, radius: f32, steps: u32, color: Color) {
        self.rect_rounded_corners(rect, CornerRadii::all(radius), [steps; 4], color);
    }

    /// Rounded rectangle as four quarter-circle fans plus five quads. Radii
    /// clamp to half the short side; all-zero radii degrade to [`rect`].
    ///
    /// [`rect`]: Batcher::rect
    pub fn rect_rounded_corners(&mut self, rect: Rect, radii: CornerRadii, steps: [u32; 4], color: Color) {
        let radii = radii.clamped((rect.size.min_element() * 0.5).max(0.0));
        if radii.is_zero() {
            self.rect(rect, color);
            return;
        }

        let CornerRadii { top_left: a, top_right: b, bottom_right: c, bottom_left: d } = radii;
        let (x0, y0) = (rect.origin.x, rect.origin.y);
        let (x1, y1) = (x0 + rect.size.x, y0 + rect.size.y);

        self.semi_circle(Vec2::new(x0 + a, y0 + a), UP, LEFT, a, steps[0], color);
        self.semi_circle(Vec2::new(x1 - b, y0 + b), UP, RIGHT, b, steps[1], color);
        self.semi_circle(Vec2::new(x1 - c, y1 - c), DOWN, RIGHT, c, steps[2], color);
        self.semi_circle(Vec2::new(x0 + d, y1 - d), DOWN, LEFT, d, steps[3], color);

        // Trapezoid strips between the corner arcs, then the center.
        self.quad(
            Vec2::new(x0 + a, y0),
            Vec2::new(x1 - b, y0),
            Vec2::new(x1 - b, y0 + b),
            Vec2::new(x0 + a, y0 + a),
            color,
        );
        self.quad(
            Vec2::new(x0, y0 + a),
            Vec2::new(x0 + a, y0 + a),
            Vec2::new(x0 + d, y1 - d),
            Vec2::new(x0, y1 - d),
            color,
        );
        self.quad(
            Vec2::new(x1 - b, y0 + b),
            Vec2::new(x1, y0 + b),
            Vec2::new(x1, y1 - c),
            Vec2::new(x1 - c, y1 - c),
            color,
        );
        self.quad(
            Vec2::new(x0 + d, y1 - d),
            Vec2::new(x1 - c, y1 - c),
            Vec2::new(x1 - c, y1),
            Vec2::new(x0 + d, y1),
            color,
        );
        self.quad(
            Vec2::new(x0 + a, y0 + a),
            Vec2::new(x1 - b, y0 + b),
            Vec2::new(x1 - c, y1 - c),
            Vec2::new(x0 + d, y1 - d),
            color,
        );
    }

    pub fn rect_rounded_line(&mut self, rect: Rect, radius: f32, steps: u32, t: f32, color: Color) {
        self.rect_rounded_corners_line(rect, CornerRadii::all(radius), [steps; 4], t, color);
    }

    /// Rounded rectangle outline: four quarter rings plus four edge quads.
    /// All-zero radii degrade to [`rect_line`](Batcher::rect_line).
    pub fn rect_rounded_corners_line(
        &mut self,
        rect: Rect,
        radii: CornerRadii,
        steps: [u32; 4],
        t: f32,
        color: Color,
    ) {
        if t <= 0.0 {
            return;
        }
        let radii = radii.clamped((rect.size.min_element() * 0.5).max(0.0));
        if radii.is_zero() {
            self.rect_line(rect, t, color);
            return;
        }

        let CornerRadii { top_left: a, top_right: b, bottom_right: c, bottom_left: d } = radii;
        let (x0, y0) = (rect.origin.x, rect.origin.y);
        let (x1, y1) = (x0 + rect.size.x, y0 + rect.size.y);

        self.semi_circle_line(Vec2::new(x0 + a, y0 + a), UP, LEFT, a, steps[0], t, color);
        self.semi_circle_line(Vec2::new(x1 - b, y0 + b), UP, RIGHT, b, steps[1], t, color);
        self.semi_circle_line(Vec2::new(x1 - c, y1 - c), DOWN, RIGHT, c, steps[2], t, color);
        self.semi_circle_line(Vec2::new(x0 + d, y1 - d), DOWN, LEFT, d, steps[3], t, color);

        // Straight segments only where the adjacent arcs do not meet.
        if rect.size.x > a + b {
            self.rect(Rect::new(x0 + a, y0, rect.size.x - a - b, t), color);
        }
        if rect.size.y > a + d {
            self.rect(Rect::new(x0, y0 + a, t, rect.size.y - a - d), color);
        }
        if rect.size.y > b + c {
            self.rect(Rect::new(x1 - t, y0 + b, t, rect.size.y - b - c), color);
        }
        if rect.size.x > d + c {
            self.rect(Rect::new(x0 + d, y1 - t, rect.size.x - d - c, t), color);
        }
    }

    // ── circles ───────────────────────────────────────────────────────────

    /// Triangle fan from `start_radians` to `end_radians` along the shortest
    /// signed sweep. Zero steps emit nothing.
    pub fn semi_circle(&mut self, center: Vec2, start_radians: f32, end_radians: f32, radius: f32, steps: u32, color: Color) {
        self.semi_circle_gradient(center, start_radians, end_radians, radius, steps, color, color);
    }

    pub fn semi_circle_gradient(
        &mut self,
        center: Vec2,
        start_radians: f32,
        end_radians: f32,
        radius: f32,
        steps: u32,
        center_color: Color,
        edge_color: Color,
    ) {
        let diff = angle_diff(start_radians, end_radians);
        for i in 0..steps {
            let a0 = start_radians + diff * (i as f32 / steps as f32);
            let a1 = start_radians + diff * ((i + 1) as f32 / steps as f32);
            self.tri_colors(
                center,
                center + Vec2::from_angle(a0) * radius,
                center + Vec2::from_angle(a1) * radius,
                center_color,
                edge_color,
                edge_color,
            );
        }
    }

    /// Arc ring of thickness `t`; degrades to a solid fan once `t` reaches
    /// the radius.
    pub fn semi_circle_line(
        &mut self,
        center: Vec2,
        start_radians: f32,
        end_radians: f32,
        radius: f32,
        steps: u32,
        t: f32,
        color: Color,
    ) {
        if t >= radius {
            self.semi_circle(center, start_radians, end_radians, radius, steps, color);
            return;
        }

        let diff = angle_diff(start_radians, end_radians);
        let inner = radius - t;
        for i in 0..steps {
            let a0 = start_radians + diff * (i as f32 / steps as f32);
            let a1 = start_radians + diff * ((i + 1) as f32 / steps as f32);
            let d0 = Vec2::from_angle(a0);
            let d1 = Vec2::from_angle(a1);
            self.quad(
                center + d0 * inner,
                center + d0 * radius,
                center + d1 * radius,
                center + d1 * inner,
                color,
            );
        }
    }

    /// Full-circle fan starting at angle zero (`center + (radius, 0)`).
    pub fn circle(&mut self, center: Vec2, radius: f32, steps: u32, color: Color) {
        self.circle_gradient(center, radius, steps, color, color);
    }

    pub fn circle_gradient(&mut self, center: Vec2, radius: f32, steps: u32, center_color: Color, outer_color: Color) {
        let mut last = center + Vec2::new(radius, 0.0);
        for i in 1..=steps {
            let next = center + Vec2::from_angle((i as f32 / steps as f32) * TAU) * radius;
            self.tri_colors(center, last, next, center_color, outer_color, outer_color);
            last = next;
        }
    }

    /// Circle ring of thickness `t`; degrades to a solid fan once `t`
    /// reaches the radius.
    pub fn circle_line(&mut self, center: Vec2, radius: f32, t: f32, steps: u32, color: Color) {
        if t >= radius {
            self.circle(center, radius, steps, color);
            return;
        }

        let inner = radius - t;
        let mut last_outer = center + Vec2::new(radius, 0.0);
        let mut last_inner = center + Vec2::new(inner, 0.0);
        for i in 1..=steps {
            let dir = Vec2::from_angle((i as f32 / steps as f32) * TAU);
            let next_outer = center + dir * radius;
            let next_inner = center + dir * inner;
            self.quad(last_inner, last_outer, next_outer, next_inner, color);
            last_outer = next_outer;
            last_inner = next_inner;
        }
    }

    // ── arrows ────────────────────────────────────────────────────────────

    /// Equilateral arrow head with its tip at `point`, pointing along
    /// `radians`, with edges of length `side_len`.
    pub fn arrow_head(&mut self, point: Vec2, radians: f32, side_len: f32, color: Color) {
        let dir = Vec2::from_angle(radians);
        let perp = Vec2::new(dir.y, -dir.x);
        let base = point - dir * (side_len * 0.866_025_4);
        let half = side_len * 0.5;

        self.tri(point, base + perp * half, base - perp * half, color);
    }

    /// Arrow head pointing from `from` toward `point`.
    pub fn arrow_head_to(&mut self, point: Vec2, from: Vec2, side_len: f32, color: Color) {
        let delta = point - from;
        if delta == Vec2::ZERO {
            return;
        }
        self.arrow_head(point, delta.y.atan2(delta.x), side_len, color);
    }

    // ── textures ──────────────────────────────────────────────────────────

    /// Full texture at `pos`, one pixel per unit.
    pub fn tex(&mut self, texture: &TextureRef, pos: Vec2, color: Color) {
        self.set_texture(Some(texture.clone()));

        let size = Vec2::new(texture.width() as f32, texture.height() as f32);
        let weights = self.tex_weights();
        self.push_quad_geometry(
            [pos, pos + Vec2::new(size.x, 0.0), pos + size, pos + Vec2::new(0.0, size.y)],
            [Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::ONE, Vec2::new(0.0, 1.0)],
            [color; 4],
            weights,
        );
    }

    /// Full texture with origin/scale/rotation applied around `pos`.
    pub fn tex_at(&mut self, texture: &TextureRef, pos: Vec2, origin: Vec2, scale: Vec2, rotation: f32, color: Color) {
        self.push_matrix(placement(pos, origin, scale, rotation));
        self.tex(texture, Vec2::ZERO, color);
        self.pop_matrix();
    }

    /// Pixel sub-rectangle of a texture with origin/scale/rotation applied.
    pub fn tex_clip(
        &mut self,
        texture: &TextureRef,
        clip: Rect,
        pos: Vec2,
        origin: Vec2,
        scale: Vec2,
        rotation: f32,
        color: Color,
    ) {
        self.push_matrix(placement(pos, origin, scale, rotation));
        self.set_texture(Some(texture.clone()));

        let inv = Vec2::new(1.0 / texture.width() as f32, 1.0 / texture.height() as f32);
        let uv_min = clip.min() * inv;
        let uv_max = clip.max() * inv;
        let weights = self.tex_weights();
        self.push_quad_geometry(
            [
                Vec2::ZERO,
                Vec2::new(clip.size.x, 0.0),
                clip.size,
                Vec2::new(0.0, clip.size.y),
            ],
            [uv_min, Vec2::new(uv_max.x, uv_min.y), uv_max, Vec2::new(uv_min.x, uv_max.y)],
            [color; 4],
            weights,
        );

        self.pop_matrix();
    }

    /// Subtexture at `pos` using its pre-baked draw and UV quads. A
    /// subtexture without a texture falls back to an untextured fill quad.
    pub fn subtex(&mut self, sub: &Subtexture, pos: Vec2, color: Color) {
        let pos = [
            pos + sub.draw_coords[0],
            pos + sub.draw_coords[1],
            pos + sub.draw_coords[2],
            pos + sub.draw_coords[3],
        ];

        match &sub.texture {
            Some(texture) => {
                self.set_texture(Some(texture.clone()));
                let weights = self.tex_weights();
                self.push_quad_geometry(pos, sub.tex_coords, [color; 4], weights);
            }
            None => {
                self.push_quad_geometry(pos, NO_UV, [color; 4], FILL_WEIGHTS);
            }
        }
    }

    pub fn subtex_at(&mut self, sub: &Subtexture, pos: Vec2, origin: Vec2, scale: Vec2, rotation: f32, color: Color) {
        self.push_matrix(placement(pos, origin, scale, rotation));
        self.subtex(sub, Vec2::ZERO, color);
        self.pop_matrix();
    }

    /// Clips the subtexture in its local space, then draws the remainder.
    pub fn subtex_clip(
        &mut self,
        sub: &Subtexture,
        clip: Rect,
        pos: Vec2,
        origin: Vec2,
        scale: Vec2,
        rotation: f32,
        color: Color,
    ) {
        let cropped = sub.crop(clip);
        self.subtex_at(&cropped, pos, origin, scale, rotation, color);
    }
}

/// Placement transform: translate to `pos`, rotate, scale, with `origin`
/// pulled back to the local zero.
#[inline]
fn placement(pos: Vec2, origin: Vec2, scale: Vec2, rotation: f32) -> Affine2 {
    Affine2::from_scale_angle_translation(scale, rotation, pos) * Affine2::from_translation(-origin)
}

/// Unit inward normal of edge `a -> b` scaled by `t`, for clockwise winding
/// in +Y-down space. `None` when the edge is degenerate.
#[inline]
fn inward_offset(a: Vec2, b: Vec2, t: f32) -> Option<Vec2> {
    let dir = (b - a).try_normalize()?;
    Some(Vec2::new(-dir.y, dir.x) * t)
}

/// Intersection of the infinite lines `p0 -> p1` and `p2 -> p3`.
///
/// `None` when the lines are parallel; callers fall back to the offset
/// corner so near-degenerate outlines stay finite.
#[inline]
fn miter(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Option<Vec2> {
    let aa = p1 - p0;
    let bb = p3 - p2;
    let cc = p2 - p0;

    let denom = aa.y * bb.x - aa.x * bb.y;
    if denom.abs() <= f32::EPSILON {
        return None;
    }

    let t = (bb.x * cc.y - bb.y * cc.x) / denom;
    Some(p0 + aa * t)
}

#[inline]
fn bezier_quad(a: Vec2, b: Vec2, c: Vec2, t: f32) -> Vec2 {
    a.lerp(b, t).lerp(b.lerp(c, t), t)
}

#[inline]
fn bezier_cubic(a: Vec2, b: Vec2, c: Vec2, d: Vec2, t: f32) -> Vec2 {
    let ab = a.lerp(b, t);
    let bc = b.lerp(c, t);
    let cd = c.lerp(d, t);
    ab.lerp(bc, t).lerp(bc.lerp(cd, t), t)
}
