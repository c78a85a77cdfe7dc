use std::f32::consts::TAU;

use glam::Vec3;

use super::{recolor, VisualEffect};
use crate::{
    geometry::{CatmullRomCurve3, Geometry, TubeParameters},
    props::normalize_sample,
    scene::{Color, GeometryStore, Material, Mesh, SceneNode},
    EffectType, VisualizerProps,
};

const HALF_SPAN: f32 = 100.0;
const BASE_AMPLITUDE: f32 = 10.0;
const LEVEL_AMPLITUDE: f32 = 40.0;
const RIPPLE: f32 = 10.0;
const WAVES: f32 = 2.0;
const TUBE_RADIUS: f32 = 1.5;
const RADIAL_SEGMENTS: usize = 6;
/// Frames per second the beat-locked phase step assumes.
const FRAME_RATE: f32 = 60.0;

/// A ribbon-like tube following a travelling sine wave whose phase is
/// locked to the tempo and whose height follows the overall level.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flow;

impl Flow {
    /// Phase advance for one frame: one full wave per beat at unit speed.
    pub fn phase_step(props: &VisualizerProps) -> f32 {
        TAU * props.movement_speed * props.bpm / 60.0 / FRAME_RATE
    }

    fn path(props: &VisualizerProps, phase: f32, amplitude: f32) -> Vec<Vec3> {
        let detail = props.detail_level;
        let last = detail.saturating_sub(1).max(1) as f32;
        (0..detail)
            .map(|i| {
                let t = i as f32 / last;
                let angle = t * WAVES * TAU + phase;
                let ripple = normalize_sample(props.sample_for(i, detail)) * RIPPLE * props.color_intensity;
                Vec3::new(
                    t * 2.0 * HALF_SPAN - HALF_SPAN,
                    angle.sin() * amplitude + ripple,
                    angle.cos() * amplitude * 0.25,
                )
            })
            .collect()
    }

    fn tube(points: Vec<Vec3>, detail_level: usize) -> Geometry {
        TubeParameters::new(
            CatmullRomCurve3::new(points),
            detail_level * 2,
            TUBE_RADIUS,
            RADIAL_SEGMENTS,
        )
        .build()
    }
}

impl VisualEffect for Flow {
    fn kind(&self) -> EffectType {
        EffectType::Flow
    }

    fn create(&self, props: &VisualizerProps, store: &mut GeometryStore) -> SceneNode {
        let points = Self::path(props, 0.0, BASE_AMPLITUDE);
        let mut node = SceneNode::new("flow");
        node.add(Mesh::new(
            "flow-tube",
            store,
            Self::tube(points, props.detail_level),
            Material::wireframe(Color::WHITE),
        ));
        node
    }

    fn update(&self, node: &mut SceneNode, props: &VisualizerProps, store: &mut GeometryStore) {
        if !node.has_renderable() {
            return;
        }
        if props.is_animating {
            node.phase = (node.phase + Self::phase_step(props)).rem_euclid(TAU);
        }

        let amplitude = BASE_AMPLITUDE + props.mean_level() * LEVEL_AMPLITUDE * props.color_intensity;
        let geometry = Self::tube(Self::path(props, node.phase, amplitude), props.detail_level);

        let Some(mesh) = node.first_mesh_mut() else {
            return;
        };
        mesh.replace_geometry(store, geometry);
        recolor(mesh, props);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_support::props;

    #[test]
    fn phase_advances_one_wave_per_beat() {
        let mut frame = props(EffectType::Flow, 8, vec![128]);
        frame.bpm = 60.0;
        frame.movement_speed = 1.0;
        assert!((Flow::phase_step(&frame) * FRAME_RATE - TAU).abs() < 1e-4);
    }

    #[test]
    fn phase_step_at_default_tempo() {
        let frame = props(EffectType::Flow, 8, vec![128]);
        assert!((Flow::phase_step(&frame) - TAU * 2.0 / 60.0).abs() < 1e-6);
        assert!((Flow::phase_step(&frame) - 0.209_44).abs() < 1e-4);

        let mut store = GeometryStore::new();
        let mut animating = frame.clone();
        animating.is_animating = true;
        let mut node = Flow.create(&animating, &mut store);
        Flow.update(&mut node, &animating, &mut store);
        assert!((node.phase - Flow::phase_step(&animating)).abs() < 1e-6);
    }

    #[test]
    fn phase_holds_when_not_animating() {
        let mut store = GeometryStore::new();
        let mut frame = props(EffectType::Flow, 8, vec![128]);
        let mut node = Flow.create(&frame, &mut store);

        Flow.update(&mut node, &frame, &mut store);
        assert_eq!(node.phase, 0.0);

        frame.is_animating = true;
        Flow.update(&mut node, &frame, &mut store);
        assert!(node.phase > 0.0);
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn louder_frames_raise_the_wave() {
        let quiet = props(EffectType::Flow, 16, vec![0]);
        let loud = props(EffectType::Flow, 16, vec![255]);
        let peak = |frame: &VisualizerProps| {
            let amplitude = BASE_AMPLITUDE + frame.mean_level() * LEVEL_AMPLITUDE;
            Flow::path(frame, 0.0, amplitude)
                .iter()
                .map(|p| p.y.abs())
                .fold(0.0f32, f32::max)
        };
        assert!(peak(&loud) > peak(&quiet));
    }
}
