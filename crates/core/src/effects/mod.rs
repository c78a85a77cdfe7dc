//! Audio-reactive effects. Each one builds a [`SceneNode`] from the first
//! frame it sees and reshapes that node on every later frame.

mod bars;
mod circle;
mod flow;
mod fractal;
mod grid;
mod particles;
mod ripple;
mod spectrum;
mod terrain;
mod waveform;

use std::f32::consts::TAU;

use glam::Vec3;

use crate::{
    scene::{GeometryStore, Mesh, SceneNode},
    EffectType, VisualizerProps,
};

pub use bars::Bars;
pub use circle::Circle;
pub use flow::Flow;
pub use fractal::Fractal;
pub use grid::Grid;
pub use particles::Particles;
pub use ripple::Ripple;
pub use spectrum::Spectrum;
pub use terrain::Terrain;
pub use waveform::Waveform;

/// Turns per-frame audio data into a shape inside a scene node.
///
/// `create` is called once per activation and must read the current
/// `detail_level` rather than anything cached. `update` runs every frame on
/// the node `create` returned; it does nothing when the node has no meshes,
/// and any geometry it replaces is released through the store before the
/// call returns.
pub trait VisualEffect {
    fn kind(&self) -> EffectType;

    fn create(&self, props: &VisualizerProps, store: &mut GeometryStore) -> SceneNode;

    fn update(&self, node: &mut SceneNode, props: &VisualizerProps, store: &mut GeometryStore);
}

/// The effect implementing `kind`.
pub fn effect_for(kind: EffectType) -> &'static dyn VisualEffect {
    match kind {
        EffectType::Waveform => &Waveform,
        EffectType::Bars => &Bars,
        EffectType::Circle => &Circle,
        EffectType::Particles => &Particles,
        EffectType::Spectrum => &Spectrum,
        EffectType::Terrain => &Terrain,
        EffectType::Grid => &Grid,
        EffectType::Flow => &Flow,
        EffectType::Ripple => &Ripple,
        EffectType::Fractal => &Fractal,
    }
}

/// Full saturation, mid lightness at the frame's hue.
fn recolor(mesh: &mut Mesh, props: &VisualizerProps) {
    mesh.material.color.set_hsl(props.hue(), 1.0, 0.5);
}

/// `count` points evenly spaced on a circle in the XY plane.
fn ring_points(count: usize, radius: f32) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * TAU;
            Vec3::new(angle.cos() * radius, angle.sin() * radius, 0.0)
        })
        .collect()
}

/// Sample value scaled onto `[0, 1]`.
fn level(sample: u8) -> f32 {
    f32::from(sample) / 255.0
}
