use glam::{Affine2, Mat4, Vec2};

use super::{Batcher, ColorMode};
use crate::color::Color;
use crate::coords::Rect;
use crate::font::{Glyph, SpriteFont, TextAlign};
use crate::gfx::{
    BatchDefaults, BlendMode, MaterialRef, ParamMaterial, RendererFeatures, Subtexture,
    TextureRef, TextureSampler,
};
use crate::testing::{RecordingDevice, RecordingMesh, StubTarget, StubTexture};

const WHITE: Color = Color::WHITE;

fn harness() -> (RecordingDevice, BatchDefaults<RecordingMesh>) {
    let material: MaterialRef = ParamMaterial::new().into_ref();
    let mut device = RecordingDevice::new(320, 240);
    device.default_material = Some(material.clone());
    (device, BatchDefaults::new(RecordingMesh::default(), material))
}

fn flipped() -> Batcher {
    Batcher::with_features(RendererFeatures { origin_bottom_left: true })
}

// ── accumulation ──────────────────────────────────────────────────────────

#[test]
fn rect_emits_one_quad() {
    let mut b = Batcher::new();
    b.rect(Rect::new(0.0, 0.0, 4.0, 4.0), WHITE);

    assert_eq!(b.vertices.len(), 4);
    assert_eq!(b.indices.len(), 6);
    assert_eq!(b.batch.elements, 2);
    assert!(b.batches.is_empty());
}

#[test]
fn quads_share_the_vertex_stream() {
    let mut b = Batcher::new();
    b.rect(Rect::new(0.0, 0.0, 4.0, 4.0), WHITE);
    b.rect(Rect::new(8.0, 0.0, 4.0, 4.0), WHITE);

    assert_eq!(b.vertices.len(), 8);
    assert_eq!(b.indices.as_slice(), &[0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    assert_eq!(b.batch.elements, 4);
    assert!(b.batches.is_empty());
}

#[test]
fn solid_geometry_uses_the_fill_weight() {
    let mut b = Batcher::new();
    b.rect(Rect::new(0.0, 0.0, 1.0, 1.0), WHITE);

    assert_eq!(b.vertices.as_slice()[0].weights, [0, 0, 255, 0]);
}

#[test]
fn matrix_bakes_into_vertices_at_emission() {
    let mut b = Batcher::new();
    b.push_matrix(Affine2::from_translation(Vec2::new(10.0, 5.0)));
    b.rect(Rect::new(0.0, 0.0, 2.0, 2.0), WHITE);
    b.pop_matrix();
    b.rect(Rect::new(0.0, 0.0, 2.0, 2.0), WHITE);

    let v = b.vertices.as_slice();
    assert_eq!(v[0].pos, [10.0, 5.0]);
    // Popping never moves what was already pushed.
    assert_eq!(v[4].pos, [0.0, 0.0]);
}

#[test]
fn nested_push_matrix_composes_child_first() {
    let mut b = Batcher::new();
    b.push_matrix(Affine2::from_translation(Vec2::new(10.0, 0.0)));
    b.push_matrix(Affine2::from_scale(Vec2::splat(2.0)));
    b.rect(Rect::new(1.0, 1.0, 1.0, 1.0), WHITE);

    assert_eq!(b.vertices.as_slice()[0].pos, [12.0, 2.0]);
}

#[test]
fn push_matrix_absolute_ignores_the_current_transform() {
    let mut b = Batcher::new();
    b.push_matrix(Affine2::from_translation(Vec2::new(10.0, 0.0)));
    b.push_matrix_absolute(Affine2::IDENTITY);
    b.rect(Rect::new(1.0, 1.0, 1.0, 1.0), WHITE);
    b.pop_matrix();

    assert_eq!(b.vertices.as_slice()[0].pos, [1.0, 1.0]);
    assert_eq!(b.matrix(), Affine2::from_translation(Vec2::new(10.0, 0.0)));
}

// ── lines ─────────────────────────────────────────────────────────────────

#[test]
fn degenerate_line_emits_nothing() {
    let mut b = Batcher::new();
    b.line(Vec2::new(3.0, 3.0), Vec2::new(3.0, 3.0), 2.0, WHITE);

    assert_eq!(b.vertices.len(), 0);
    assert_eq!(b.batch.elements, 0);
}

#[test]
fn line_offsets_perpendicular_to_direction() {
    let mut b = Batcher::new();
    b.line(Vec2::ZERO, Vec2::new(10.0, 0.0), 2.0, WHITE);

    let v = b.vertices.as_slice();
    assert_eq!(v[0].pos, [0.0, -1.0]);
    assert_eq!(v[1].pos, [10.0, -1.0]);
    assert_eq!(v[2].pos, [10.0, 1.0]);
    assert_eq!(v[3].pos, [0.0, 1.0]);
}

#[test]
fn bezier_quad_line_emits_one_quad_per_step() {
    let mut b = Batcher::new();
    b.bezier_quad_line(Vec2::ZERO, Vec2::new(5.0, 10.0), Vec2::new(10.0, 0.0), 4, 1.0, WHITE);

    assert_eq!(b.batch.elements, 8);
}

#[test]
fn bezier_cubic_line_ends_on_the_destination() {
    let mut b = Batcher::new();
    b.bezier_cubic_line(
        Vec2::ZERO,
        Vec2::new(0.0, 10.0),
        Vec2::new(10.0, 10.0),
        Vec2::new(10.0, 0.0),
        2,
        2.0,
        WHITE,
    );

    // Last quad's second corner sits on the endpoint's offset.
    let v = b.vertices.as_slice();
    assert_eq!(b.batch.elements, 4);
    let end = Vec2::new(v[5].pos[0], v[5].pos[1]);
    assert!((end - Vec2::new(10.0, 0.0)).length() <= 1.0 + 1e-4);
}

// ── splitting ─────────────────────────────────────────────────────────────

#[test]
fn texture_change_after_geometry_splits() {
    let texture = StubTexture::shared(8, 8);
    let mut b = Batcher::new();
    b.rect(Rect::new(0.0, 0.0, 4.0, 4.0), WHITE);
    b.tex(&texture, Vec2::ZERO, WHITE);

    assert_eq!(b.batches.len(), 1);
    assert_eq!(b.batches[0].offset, 0);
    assert_eq!(b.batches[0].elements, 2);
    assert!(b.batches[0].texture.is_none());
    assert_eq!(b.batch.offset, 2);
    assert_eq!(b.batch.elements, 2);
    assert!(b.batch.texture.is_some());
}

#[test]
fn texture_change_before_geometry_does_not_split() {
    let texture = StubTexture::shared(8, 8);
    let mut b = Batcher::new();
    b.set_texture(Some(texture.clone()));
    b.tex(&texture, Vec2::ZERO, WHITE);

    assert!(b.batches.is_empty());
}

#[test]
fn setting_the_same_texture_is_a_noop() {
    let texture = StubTexture::shared(8, 8);
    let mut b = Batcher::new();
    b.tex(&texture, Vec2::ZERO, WHITE);
    b.set_texture(Some(texture.clone()));
    b.tex(&texture, Vec2::ZERO, WHITE);

    assert!(b.batches.is_empty());
    assert_eq!(b.batch.elements, 4);
}

#[test]
fn distinct_textures_of_equal_size_still_split() {
    // Identity is by reference, not by contents.
    let a = StubTexture::shared(8, 8);
    let b_tex = StubTexture::shared(8, 8);
    let mut b = Batcher::new();
    b.tex(&a, Vec2::ZERO, WHITE);
    b.tex(&b_tex, Vec2::ZERO, WHITE);

    assert_eq!(b.batches.len(), 1);
}

#[test]
fn sampler_change_splits_and_keeps_the_flip() {
    let rt = StubTexture::shared_render_target(8, 8);
    let mut b = flipped();
    b.tex(&rt, Vec2::ZERO, WHITE);
    assert!(b.batch.flip_vertically);

    b.set_sampler(TextureSampler::nearest());
    assert_eq!(b.batches.len(), 1);
    assert!(b.batch.flip_vertically);
}

#[test]
fn blend_change_splits_only_with_geometry() {
    let mut b = Batcher::new();
    b.push_blend(BlendMode::ADDITIVE);
    assert!(b.batches.is_empty());

    b.rect(Rect::new(0.0, 0.0, 1.0, 1.0), WHITE);
    b.pop_blend();
    assert_eq!(b.batches.len(), 1);
    assert_eq!(b.batches[0].blend, BlendMode::ADDITIVE);
    assert_eq!(b.batch.blend, BlendMode::NORMAL);
}

#[test]
fn pushing_the_active_blend_does_not_split() {
    let mut b = Batcher::new();
    b.rect(Rect::new(0.0, 0.0, 1.0, 1.0), WHITE);
    b.push_blend(BlendMode::NORMAL);
    b.pop_blend();

    assert!(b.batches.is_empty());
}

#[test]
fn scissor_push_pop_restores_and_splits() {
    let clip = Rect::new(0.0, 0.0, 16.0, 16.0);
    let mut b = Batcher::new();
    b.rect(Rect::new(0.0, 0.0, 4.0, 4.0), WHITE);
    b.push_scissor(Some(clip));
    b.rect(Rect::new(0.0, 0.0, 4.0, 4.0), WHITE);
    assert_eq!(b.scissor(), Some(clip));
    b.pop_scissor();

    assert_eq!(b.batches.len(), 2);
    assert_eq!(b.batches[0].scissor, None);
    assert_eq!(b.batches[1].scissor, Some(clip));
    assert_eq!(b.scissor(), None);
}

#[test]
fn layer_change_splits() {
    let mut b = Batcher::new();
    b.rect(Rect::new(0.0, 0.0, 1.0, 1.0), WHITE);
    b.push_layer(5);
    b.rect(Rect::new(0.0, 0.0, 1.0, 1.0), WHITE);
    b.pop_layer();

    assert_eq!(b.batches.len(), 2);
    assert_eq!(b.batches[0].layer, 0);
    assert_eq!(b.batches[1].layer, 5);
    assert_eq!(b.layer(), 0);
}

#[test]
fn material_change_splits_by_reference() {
    let custom: MaterialRef = ParamMaterial::new().into_ref();
    let mut b = Batcher::new();
    b.rect(Rect::new(0.0, 0.0, 1.0, 1.0), WHITE);
    b.push_material(Some(custom.clone()));
    b.rect(Rect::new(0.0, 0.0, 1.0, 1.0), WHITE);
    b.pop_material();

    assert_eq!(b.batches.len(), 2);
    assert!(b.batches[0].material.is_none());
    assert!(b.batches[1].material.is_some());
    assert!(b.material().is_none());
}

#[test]
fn pop_returns_the_value_that_was_active() {
    let clip = Rect::new(0.0, 0.0, 16.0, 16.0);
    let custom: MaterialRef = ParamMaterial::new().into_ref();
    let mut b = Batcher::new();

    b.push_blend(BlendMode::ADDITIVE);
    assert_eq!(b.pop_blend(), BlendMode::ADDITIVE);
    assert_eq!(b.blend(), BlendMode::NORMAL);

    b.push_scissor(Some(clip));
    assert_eq!(b.pop_scissor(), Some(clip));
    assert_eq!(b.scissor(), None);

    b.push_layer(7);
    assert_eq!(b.pop_layer(), 7);

    b.push_color_mode(ColorMode::Wash);
    assert_eq!(b.pop_color_mode(), ColorMode::Wash);

    b.push_material(Some(custom.clone()));
    let popped = b.pop_material().unwrap();
    assert!(std::rc::Rc::ptr_eq(&popped, &custom));
    assert!(b.material().is_none());
}

#[test]
fn successor_batch_inherits_unrelated_state() {
    let texture = StubTexture::shared(8, 8);
    let mut b = Batcher::new();
    b.push_blend(BlendMode::ADDITIVE);
    b.push_layer(3);
    b.rect(Rect::new(0.0, 0.0, 1.0, 1.0), WHITE);
    b.tex(&texture, Vec2::ZERO, WHITE);

    assert_eq!(b.batch.blend, BlendMode::ADDITIVE);
    assert_eq!(b.batch.layer, 3);
}

#[test]
fn offsets_stay_contiguous_across_splits() {
    let a = StubTexture::shared(8, 8);
    let c = StubTexture::shared(8, 8);
    let mut b = Batcher::new();
    b.rect(Rect::new(0.0, 0.0, 1.0, 1.0), WHITE);
    b.tex(&a, Vec2::ZERO, WHITE);
    b.tex(&a, Vec2::ZERO, WHITE);
    b.tex(&c, Vec2::ZERO, WHITE);

    assert_eq!(b.batches[0].offset, 0);
    assert_eq!(b.batches[0].elements, 2);
    assert_eq!(b.batches[1].offset, 2);
    assert_eq!(b.batches[1].elements, 4);
    assert_eq!(b.batch.offset, 6);
    assert_eq!(b.batch.elements, 2);
    assert_eq!(b.triangle_count(), 8);
}

// ── color mode ────────────────────────────────────────────────────────────

#[test]
fn wash_mode_moves_the_texture_weight() {
    let texture = StubTexture::shared(8, 8);
    let mut b = Batcher::new();
    b.set_texture(Some(texture));
    b.push_color_mode(ColorMode::Wash);
    b.quad_tex(
        [Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::ONE, Vec2::new(0.0, 1.0)],
        [Vec2::ZERO; 4],
        WHITE,
    );
    b.pop_color_mode();
    b.quad_tex(
        [Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::ONE, Vec2::new(0.0, 1.0)],
        [Vec2::ZERO; 4],
        WHITE,
    );

    let v = b.vertices.as_slice();
    assert_eq!(v[0].weights, [0, 255, 0, 0]);
    assert_eq!(v[4].weights, [255, 0, 0, 0]);
    assert_eq!(b.color_mode(), ColorMode::Normal);
}

#[test]
fn color_mode_never_splits_the_batch() {
    let texture = StubTexture::shared(8, 8);
    let mut b = Batcher::new();
    b.tex(&texture, Vec2::ZERO, WHITE);
    b.push_color_mode(ColorMode::Wash);
    b.tex(&texture, Vec2::ZERO, WHITE);
    b.pop_color_mode();

    assert!(b.batches.is_empty());
}

// ── render target flip ────────────────────────────────────────────────────

#[test]
fn render_target_flips_v_when_origin_is_bottom_left() {
    let rt = StubTexture::shared_render_target(8, 8);
    let mut b = flipped();
    b.tex(&rt, Vec2::ZERO, WHITE);

    let v = b.vertices.as_slice();
    assert_eq!(v[0].uv, [0.0, 1.0]);
    assert_eq!(v[2].uv, [1.0, 0.0]);
}

#[test]
fn regular_textures_never_flip() {
    let texture = StubTexture::shared(8, 8);
    let mut b = flipped();
    b.tex(&texture, Vec2::ZERO, WHITE);
    assert_eq!(b.vertices.as_slice()[0].uv, [0.0, 0.0]);

    let rt = StubTexture::shared_render_target(8, 8);
    let mut b = Batcher::new();
    b.tex(&rt, Vec2::ZERO, WHITE);
    assert_eq!(b.vertices.as_slice()[0].uv, [0.0, 0.0]);
}

// ── shapes ────────────────────────────────────────────────────────────────

#[test]
fn circle_fan_starts_at_angle_zero() {
    let mut b = Batcher::new();
    b.circle(Vec2::new(10.0, 10.0), 5.0, 8, WHITE);

    assert_eq!(b.batch.elements, 8);
    let v = b.vertices.as_slice();
    assert_eq!(v[0].pos, [10.0, 10.0]);
    assert_eq!(v[1].pos, [15.0, 10.0]);
}

#[test]
fn zero_steps_emit_nothing() {
    let mut b = Batcher::new();
    b.circle(Vec2::ZERO, 5.0, 0, WHITE);
    b.semi_circle(Vec2::ZERO, 0.0, 1.0, 5.0, 0, WHITE);
    b.bezier_quad_line(Vec2::ZERO, Vec2::ONE, Vec2::new(2.0, 0.0), 0, 1.0, WHITE);

    assert_eq!(b.vertices.len(), 0);
}

#[test]
fn circle_line_thick_stroke_degrades_to_a_fan() {
    let mut b = Batcher::new();
    b.circle_line(Vec2::ZERO, 4.0, 4.0, 6, WHITE);
    // Fan triangles, not ring quads.
    assert_eq!(b.batch.elements, 6);
}

#[test]
fn semi_circle_line_ring_emits_quads() {
    let mut b = Batcher::new();
    b.semi_circle_line(Vec2::ZERO, 0.0, std::f32::consts::PI, 10.0, 4, 2.0, WHITE);
    assert_eq!(b.batch.elements, 8);
}

#[test]
fn rect_line_emits_four_edges() {
    let mut b = Batcher::new();
    b.rect_line(Rect::new(0.0, 0.0, 10.0, 10.0), 1.0, WHITE);
    assert_eq!(b.batch.elements, 8);
}

#[test]
fn rect_line_fills_solid_when_too_small() {
    let mut b = Batcher::new();
    b.rect_line(Rect::new(0.0, 0.0, 4.0, 10.0), 2.0, WHITE);
    assert_eq!(b.batch.elements, 2);
}

#[test]
fn rect_rounded_zero_radius_matches_rect() {
    let rect = Rect::new(1.0, 2.0, 10.0, 8.0);

    let mut rounded = Batcher::new();
    rounded.rect_rounded(rect, 0.0, 6, WHITE);
    let mut plain = Batcher::new();
    plain.rect(rect, WHITE);

    assert_eq!(rounded.vertices.as_slice(), plain.vertices.as_slice());
    assert_eq!(rounded.indices.as_slice(), plain.indices.as_slice());
}

#[test]
fn rect_rounded_emits_fans_and_strips() {
    let mut b = Batcher::new();
    b.rect_rounded(Rect::new(0.0, 0.0, 20.0, 20.0), 2.0, 3, WHITE);
    // Four fans of 3 triangles plus five quads.
    assert_eq!(b.batch.elements, 4 * 3 + 10);
}

#[test]
fn rect_rounded_radii_clamp_to_half_extent() {
    let mut clamped = Batcher::new();
    clamped.rect_rounded(Rect::new(0.0, 0.0, 10.0, 10.0), 50.0, 4, WHITE);
    let mut exact = Batcher::new();
    exact.rect_rounded(Rect::new(0.0, 0.0, 10.0, 10.0), 5.0, 4, WHITE);

    assert_eq!(clamped.vertices.as_slice(), exact.vertices.as_slice());
}

#[test]
fn fully_round_outline_emits_only_the_rings() {
    let mut b = Batcher::new();
    // Radii meet in the middle of every side, so no straight segments.
    b.rect_rounded_line(Rect::new(0.0, 0.0, 10.0, 10.0), 5.0, 4, 2.0, WHITE);
    assert_eq!(b.batch.elements, 4 * 4 * 2);
}

#[test]
fn rect_rounded_line_emits_rings_and_edges() {
    let mut b = Batcher::new();
    b.rect_rounded_line(Rect::new(0.0, 0.0, 20.0, 20.0), 3.0, 4, 1.0, WHITE);
    // Four quarter rings of 4 quads plus four straight edges.
    assert_eq!(b.batch.elements, 4 * 4 * 2 + 4 * 2);
}

#[test]
fn rect_rounded_line_zero_radius_degrades_to_rect_line() {
    let rect = Rect::new(0.0, 0.0, 10.0, 10.0);

    let mut rounded = Batcher::new();
    rounded.rect_rounded_line(rect, 0.0, 4, 1.0, WHITE);
    let mut plain = Batcher::new();
    plain.rect_line(rect, 1.0, WHITE);

    assert_eq!(rounded.vertices.as_slice(), plain.vertices.as_slice());
}

#[test]
fn quad_line_miters_inner_corners() {
    let mut b = Batcher::new();
    b.quad_line(
        Vec2::new(0.0, 0.0),
        Vec2::new(10.0, 0.0),
        Vec2::new(10.0, 10.0),
        Vec2::new(0.0, 10.0),
        2.0,
        WHITE,
    );

    assert_eq!(b.batch.elements, 8);
    let v = b.vertices.as_slice();
    // Top edge quad runs from the outer corners to the mitered inner ring.
    assert_eq!(v[2].pos, [8.0, 2.0]);
    assert_eq!(v[3].pos, [2.0, 2.0]);
}

#[test]
fn tri_line_emits_three_edges() {
    let mut b = Batcher::new();
    b.tri_line(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(5.0, 10.0), 1.0, WHITE);
    assert_eq!(b.batch.elements, 6);
}

#[test]
fn degenerate_outline_emits_nothing() {
    let mut b = Batcher::new();
    b.tri_line(Vec2::ZERO, Vec2::ZERO, Vec2::new(5.0, 5.0), 1.0, WHITE);
    assert_eq!(b.vertices.len(), 0);
}

#[test]
fn arrow_head_points_along_direction() {
    let mut b = Batcher::new();
    b.arrow_head(Vec2::new(10.0, 0.0), 0.0, 4.0, WHITE);

    assert_eq!(b.batch.elements, 1);
    assert_eq!(b.vertices.as_slice()[0].pos, [10.0, 0.0]);
}

// ── textures ──────────────────────────────────────────────────────────────

#[test]
fn tex_covers_the_texture_with_unit_uv() {
    let texture = StubTexture::shared(16, 8);
    let mut b = Batcher::new();
    b.tex(&texture, Vec2::new(2.0, 3.0), WHITE);

    let v = b.vertices.as_slice();
    assert_eq!(v[0].pos, [2.0, 3.0]);
    assert_eq!(v[2].pos, [18.0, 11.0]);
    assert_eq!(v[0].uv, [0.0, 0.0]);
    assert_eq!(v[2].uv, [1.0, 1.0]);
    assert_eq!(v[0].weights, [255, 0, 0, 0]);
}

#[test]
fn tex_clip_normalizes_uv_by_texture_size() {
    let texture = StubTexture::shared(64, 64);
    let mut b = Batcher::new();
    b.tex_clip(
        &texture,
        Rect::new(16.0, 16.0, 32.0, 32.0),
        Vec2::new(5.0, 5.0),
        Vec2::ZERO,
        Vec2::ONE,
        0.0,
        WHITE,
    );

    let v = b.vertices.as_slice();
    assert_eq!(v[0].pos, [5.0, 5.0]);
    assert_eq!(v[0].uv, [0.25, 0.25]);
    assert_eq!(v[2].uv, [0.75, 0.75]);
}

#[test]
fn tex_at_applies_origin_scale_rotation() {
    let texture = StubTexture::shared(8, 8);
    let mut b = Batcher::new();
    b.tex_at(&texture, Vec2::new(10.0, 10.0), Vec2::new(4.0, 4.0), Vec2::splat(2.0), 0.0, WHITE);

    // Center of the texture lands on pos; scale doubles the extents.
    let v = b.vertices.as_slice();
    assert_eq!(v[0].pos, [2.0, 2.0]);
    assert_eq!(v[2].pos, [18.0, 18.0]);
}

#[test]
fn subtex_without_texture_falls_back_to_fill() {
    let sub = Subtexture::new(None, Rect::new(0.0, 0.0, 8.0, 8.0), Rect::new(0.0, 0.0, 8.0, 8.0));
    let mut b = Batcher::new();
    b.subtex(&sub, Vec2::ZERO, WHITE);

    assert!(b.batch.texture.is_none());
    assert_eq!(b.vertices.as_slice()[0].weights, [0, 0, 255, 0]);
}

#[test]
fn subtex_offsets_trimmed_frames() {
    let texture = StubTexture::shared(64, 64);
    let sub = Subtexture::new(
        Some(texture),
        Rect::new(0.0, 0.0, 20.0, 20.0),
        Rect::new(-2.0, -3.0, 24.0, 26.0),
    );
    let mut b = Batcher::new();
    b.subtex(&sub, Vec2::new(100.0, 100.0), WHITE);

    assert_eq!(b.vertices.as_slice()[0].pos, [102.0, 103.0]);
}

// ── text ──────────────────────────────────────────────────────────────────

fn glyph_font() -> (SpriteFont, TextureRef) {
    let atlas = StubTexture::shared(64, 64);
    let mut font = SpriteFont::new(16.0, 12.0, 4.0, 2.0);
    font.set_glyph('a', Glyph {
        advance: 8.0,
        offset: Vec2::new(1.0, 2.0),
        subtexture: Some(Subtexture::new(
            Some(atlas.clone()),
            Rect::new(0.0, 0.0, 6.0, 8.0),
            Rect::new(0.0, 0.0, 6.0, 8.0),
        )),
    });
    font.set_glyph('b', Glyph {
        advance: 9.0,
        offset: Vec2::new(0.0, 1.0),
        subtexture: Some(Subtexture::new(
            Some(atlas.clone()),
            Rect::new(8.0, 0.0, 6.0, 8.0),
            Rect::new(0.0, 0.0, 6.0, 8.0),
        )),
    });
    font.set_kerning('a', 'b', -2.0);
    (font, atlas)
}

#[test]
fn text_places_glyphs_on_the_first_baseline() {
    let (font, _atlas) = glyph_font();
    let mut b = Batcher::new();
    b.text(&font, "ab", Vec2::ZERO, WHITE);

    let v = b.vertices.as_slice();
    // Top-left alignment starts the cursor one font height down.
    assert_eq!(v[0].pos, [1.0, 18.0]);
    // Kerning nudges the drawn quad: 8 - 2 = 6.
    assert_eq!(v[4].pos, [6.0, 17.0]);
    assert!(b.batches.is_empty());
}

#[test]
fn kerning_never_accumulates_into_the_cursor() {
    let (font, _atlas) = glyph_font();
    let mut b = Batcher::new();
    b.text(&font, "aba", Vec2::ZERO, WHITE);

    let v = b.vertices.as_slice();
    // 'b' draws kerned, but the cursor stays on the advance sum, so the
    // trailing 'a' sits at 8 + 9 (+ its own offset).
    assert_eq!(v[4].pos, [6.0, 17.0]);
    assert_eq!(v[8].pos, [18.0, 18.0]);
}

#[test]
fn kerning_is_not_applied_at_line_start() {
    let (font, _atlas) = glyph_font();
    let mut b = Batcher::new();
    b.text(&font, "a\nb", Vec2::ZERO, WHITE);

    let v = b.vertices.as_slice();
    assert_eq!(v[4].pos, [0.0, 35.0]);
}

#[test]
fn newline_resets_the_cursor_and_advances_a_line() {
    let (font, _atlas) = glyph_font();
    let mut b = Batcher::new();
    b.text(&font, "a\na", Vec2::ZERO, WHITE);

    let v = b.vertices.as_slice();
    assert_eq!(v[0].pos, [1.0, 18.0]);
    // line_height = (12 + 4) + 2 = 18.
    assert_eq!(v[4].pos, [1.0, 36.0]);
}

#[test]
fn right_alignment_shifts_each_line_by_its_width() {
    let (font, _atlas) = glyph_font();
    let mut b = Batcher::new();
    b.text_aligned(&font, "ab", Vec2::ZERO, TextAlign::TOP_RIGHT, 16.0, WHITE);

    // width_of_line("ab") = 17, no kerning in measurement.
    assert_eq!(b.vertices.as_slice()[0].pos, [-16.0, 18.0]);
}

#[test]
fn size_rescales_the_whole_run() {
    let (font, _atlas) = glyph_font();
    let mut b = Batcher::new();
    b.text_aligned(&font, "a", Vec2::ZERO, TextAlign::TOP_LEFT, 32.0, WHITE);

    assert_eq!(b.vertices.as_slice()[0].pos, [2.0, 36.0]);
}

#[test]
fn unknown_characters_take_no_space() {
    let (font, _atlas) = glyph_font();
    let mut b = Batcher::new();
    b.text(&font, "a?b", Vec2::ZERO, WHITE);

    let v = b.vertices.as_slice();
    assert_eq!(b.vertices.len(), 8);
    // No kerning pair ('?', 'b'), cursor sits at 'a' advance.
    assert_eq!(v[4].pos, [8.0, 17.0]);
}

#[test]
fn empty_text_emits_nothing() {
    let (font, _atlas) = glyph_font();
    let mut b = Batcher::new();
    b.text(&font, "", Vec2::ZERO, WHITE);

    assert_eq!(b.vertices.len(), 0);
    assert!(b.matrix_stack.is_empty());
}

#[test]
fn glyphs_share_one_batch() {
    let (font, _atlas) = glyph_font();
    let mut b = Batcher::new();
    b.text(&font, "ab\nba", Vec2::ZERO, WHITE);

    assert!(b.batches.is_empty());
    assert_eq!(b.batch.elements, 8);
}

// ── render ────────────────────────────────────────────────────────────────

#[test]
fn render_with_nothing_accumulated_is_a_noop() {
    let (mut device, mut defaults) = harness();
    let mut b = Batcher::new();
    b.render(&mut device, &mut defaults, None);

    assert!(device.draws.is_empty());
    assert_eq!(defaults.mesh.vertex_uploads, 0);
}

#[test]
fn render_uploads_once_and_draws_in_order() {
    let texture = StubTexture::shared(8, 8);
    let (mut device, mut defaults) = harness();
    let mut b = Batcher::new();
    b.rect(Rect::new(0.0, 0.0, 4.0, 4.0), WHITE);
    b.tex(&texture, Vec2::ZERO, WHITE);
    b.render(&mut device, &mut defaults, None);

    assert_eq!(defaults.mesh.vertex_uploads, 1);
    assert_eq!(defaults.mesh.index_uploads, 1);
    assert_eq!(defaults.mesh.vertices.len(), 8);

    assert_eq!(device.draws.len(), 2);
    assert_eq!(device.draws[0].index_start, 0);
    assert_eq!(device.draws[0].index_count, 6);
    assert!(device.draws[0].texture.is_none());
    assert_eq!(device.draws[1].index_start, 6);
    assert_eq!(device.draws[1].index_count, 6);
    assert!(device.draws[1].texture.is_some());
}

#[test]
fn default_material_binds_when_no_override_is_pushed() {
    let custom: MaterialRef = ParamMaterial::new().into_ref();
    let (mut device, mut defaults) = harness();
    let mut b = Batcher::new();
    b.rect(Rect::new(0.0, 0.0, 4.0, 4.0), WHITE);
    b.push_material(Some(custom.clone()));
    b.rect(Rect::new(0.0, 0.0, 4.0, 4.0), WHITE);
    b.pop_material();
    b.render(&mut device, &mut defaults, None);

    assert_eq!(device.draws.len(), 2);
    assert!(device.draws[0].used_default_material);
    assert!(!device.draws[1].used_default_material);
    // The override received the projection too.
    assert!(custom.borrow().uniform("u_matrix").is_some());
}

#[test]
fn default_projection_is_backbuffer_ortho() {
    let (mut device, mut defaults) = harness();
    let mut b = Batcher::new();
    b.rect(Rect::new(0.0, 0.0, 4.0, 4.0), WHITE);
    b.render(&mut device, &mut defaults, None);

    let expected = Mat4::orthographic_rh(0.0, 320.0, 240.0, 0.0, 0.01, 1000.0).to_cols_array();
    assert_eq!(device.draws[0].matrix.as_deref(), Some(expected.as_slice()));
    assert!(!device.draws[0].offscreen);
}

#[test]
fn offscreen_target_drives_the_projection_size() {
    let target = StubTarget::shared(64, 32);
    let (mut device, mut defaults) = harness();
    let mut b = Batcher::new();
    b.rect(Rect::new(0.0, 0.0, 4.0, 4.0), WHITE);
    b.render(&mut device, &mut defaults, Some(&target));

    let expected = Mat4::orthographic_rh(0.0, 64.0, 32.0, 0.0, 0.01, 1000.0).to_cols_array();
    assert_eq!(device.draws[0].matrix.as_deref(), Some(expected.as_slice()));
    assert!(device.draws[0].offscreen);
}

#[test]
fn render_with_passes_the_projection_through() {
    let (mut device, mut defaults) = harness();
    let mut b = Batcher::new();
    b.rect(Rect::new(0.0, 0.0, 4.0, 4.0), WHITE);
    let projection = Mat4::orthographic_rh(0.0, 100.0, 50.0, 0.0, 0.01, 1000.0);
    b.render_with(&mut device, &mut defaults, None, projection);

    assert_eq!(device.draws[0].matrix.as_deref(), Some(projection.to_cols_array().as_slice()));
}

#[test]
fn custom_matrix_uniform_name_is_respected() {
    let (mut device, mut defaults) = harness();
    let mut b = Batcher::new();
    b.matrix_uniform = "u_projection".to_owned();
    b.rect(Rect::new(0.0, 0.0, 4.0, 4.0), WHITE);
    b.render(&mut device, &mut defaults, None);

    assert!(device.draws[0].matrix.is_none());
    assert!(defaults.material.borrow().uniform("u_projection").is_some());
}

#[test]
fn scissor_and_blend_carry_into_the_pass() {
    let clip = Rect::new(1.0, 2.0, 3.0, 4.0);
    let (mut device, mut defaults) = harness();
    let mut b = Batcher::new();
    b.push_scissor(Some(clip));
    b.push_blend(BlendMode::SCREEN);
    b.rect(Rect::new(0.0, 0.0, 4.0, 4.0), WHITE);
    b.render(&mut device, &mut defaults, None);

    assert_eq!(device.draws[0].scissor, Some(clip));
    assert_eq!(device.draws[0].blend, BlendMode::SCREEN);
}

#[test]
fn sampler_state_reaches_the_material() {
    let texture = StubTexture::shared(8, 8);
    let (mut device, mut defaults) = harness();
    let mut b = Batcher::new();
    b.set_sampler(TextureSampler::nearest());
    b.tex(&texture, Vec2::ZERO, WHITE);
    b.render(&mut device, &mut defaults, None);

    assert_eq!(device.draws[0].sampler, TextureSampler::nearest());
}

#[test]
fn render_keeps_geometry_until_cleared() {
    let (mut device, mut defaults) = harness();
    let mut b = Batcher::new();
    b.rect(Rect::new(0.0, 0.0, 4.0, 4.0), WHITE);
    b.render(&mut device, &mut defaults, None);
    b.render(&mut device, &mut defaults, None);

    assert_eq!(device.draws.len(), 2);
}

#[test]
fn clear_resets_state_and_geometry() {
    let texture = StubTexture::shared(8, 8);
    let (mut device, mut defaults) = harness();
    let mut b = Batcher::new();
    b.push_matrix(Affine2::from_translation(Vec2::ONE));
    b.push_blend(BlendMode::ADDITIVE);
    b.push_layer(2);
    b.push_color_mode(ColorMode::Wash);
    b.tex(&texture, Vec2::ZERO, WHITE);
    b.clear();

    assert_eq!(b.vertices.len(), 0);
    assert_eq!(b.indices.len(), 0);
    assert_eq!(b.triangle_count(), 0);
    assert_eq!(b.matrix(), Affine2::IDENTITY);
    assert_eq!(b.blend(), BlendMode::NORMAL);
    assert_eq!(b.layer(), 0);
    assert_eq!(b.color_mode(), ColorMode::Normal);
    assert!(b.batch.texture.is_none());

    b.render(&mut device, &mut defaults, None);
    assert!(device.draws.is_empty());
}
