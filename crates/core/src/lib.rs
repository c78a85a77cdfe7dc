//! Core library for Soundmesh.
//!
//! Effects turn one frame of audio bytes into mesh geometry inside a scene
//! node and keep reshaping that node frame after frame. The crate carries the
//! small retained-mode layer those effects need (curves, tube and primitive
//! builders, materials, a geometry store with explicit release) together with
//! the host-side pieces: frame analysis, effect selection and a render graph
//! that tallies what would be drawn.

pub mod analysis;
pub mod config;
pub mod effects;
pub mod error;
pub mod geometry;
pub mod props;
pub mod registry;
pub mod render;
pub mod scene;

pub use analysis::{AnalysisEngine, AnalysisFrame, AnalysisSummary};
pub use config::{AppConfig, AudioConfig, DataSource, VisualiserConfig};
pub use effects::{effect_for, VisualEffect};
pub use error::{Result, VisualiserError};
pub use props::{EffectType, VisualizerProps};
pub use registry::{EffectRegistry, FrameAction};
pub use render::{FrameStats, NodeId, RenderGraph};
pub use scene::{GeometryStore, Mesh, SceneNode};
