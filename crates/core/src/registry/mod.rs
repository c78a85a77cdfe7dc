use crate::{
    effects::effect_for,
    render::{NodeId, RenderGraph},
    EffectType, Result, VisualizerProps,
};

/// The effect currently on screen and the node it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEffect {
    pub kind: EffectType,
    pub node: NodeId,
}

/// Outcome of feeding one frame to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAction {
    /// A new effect was created (first frame or a switch).
    Activated(EffectType),
    /// The active effect reshaped its node.
    Updated(EffectType),
}

/// Selects the active effect from each frame's `effect_type` and keeps the
/// render graph holding exactly that effect's node.
#[derive(Debug, Default)]
pub struct EffectRegistry {
    active: Option<ActiveEffect>,
    frames: u64,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<EffectType> {
        self.active.map(|active| active.kind)
    }

    pub fn active_node(&self) -> Option<NodeId> {
        self.active.map(|active| active.node)
    }

    /// Frames handled since the registry was created.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Validates `props` and either updates the active effect or swaps to the
    /// requested one. On a swap the old node is disposed before the new one
    /// is created.
    pub fn frame(&mut self, graph: &mut RenderGraph, props: &VisualizerProps) -> Result<FrameAction> {
        props.validate()?;
        self.frames += 1;

        if let Some(active) = self.active {
            if active.kind == props.effect_type {
                if let Some((node, store)) = graph.node_parts_mut(active.node) {
                    tracing::trace!(effect = %active.kind, frame = self.frames, "updating effect");
                    effect_for(active.kind).update(node, props, store);
                    return Ok(FrameAction::Updated(active.kind));
                }
                tracing::warn!(effect = %active.kind, node = %active.node, "active node missing, recreating");
                self.active = None;
            }
        }

        self.activate(graph, props);
        Ok(FrameAction::Activated(props.effect_type))
    }

    /// Disposes the active node, leaving nothing on screen.
    pub fn deactivate(&mut self, graph: &mut RenderGraph) {
        if let Some(active) = self.active.take() {
            tracing::debug!(effect = %active.kind, node = %active.node, "deactivating effect");
            graph.dispose(active.node);
        }
    }

    fn activate(&mut self, graph: &mut RenderGraph, props: &VisualizerProps) {
        let previous = self.active();
        self.deactivate(graph);

        let node = effect_for(props.effect_type).create(props, graph.store_mut());
        let id = graph.attach(node);
        tracing::debug!(
            effect = %props.effect_type,
            previous = ?previous,
            detail = props.detail_level,
            node = %id,
            "activated effect"
        );
        self.active = Some(ActiveEffect {
            kind: props.effect_type,
            node: id,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VisualiserError;

    fn props(effect_type: EffectType) -> VisualizerProps {
        VisualizerProps {
            effect_type,
            detail_level: 8,
            movement_speed: 1.0,
            color_intensity: 1.0,
            bpm: 120.0,
            audio_data: (0..32).map(|i| (i * 8) as u8).collect(),
            is_animating: true,
        }
    }

    #[test]
    fn first_frame_activates_then_updates() {
        let mut graph = RenderGraph::new();
        let mut registry = EffectRegistry::new();

        let first = registry.frame(&mut graph, &props(EffectType::Waveform)).unwrap();
        assert_eq!(first, FrameAction::Activated(EffectType::Waveform));

        let second = registry.frame(&mut graph, &props(EffectType::Waveform)).unwrap();
        assert_eq!(second, FrameAction::Updated(EffectType::Waveform));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.store().live_count(), 1);
        assert_eq!(registry.frames(), 2);
    }

    #[test]
    fn switching_disposes_the_previous_node_first() {
        let mut graph = RenderGraph::new();
        let mut registry = EffectRegistry::new();

        registry.frame(&mut graph, &props(EffectType::Waveform)).unwrap();
        registry.frame(&mut graph, &props(EffectType::Waveform)).unwrap();
        let old_node = registry.active_node().unwrap();
        let old_geometry: Vec<_> = graph.node(old_node).unwrap().geometry_ids().collect();

        let action = registry.frame(&mut graph, &props(EffectType::Bars)).unwrap();
        assert_eq!(action, FrameAction::Activated(EffectType::Bars));

        assert!(graph.node(old_node).is_none());
        assert!(old_geometry.iter().all(|id| !graph.store().contains(*id)));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.store().live_count(), 8);
        assert_eq!(registry.active(), Some(EffectType::Bars));
    }

    #[test]
    fn cycling_every_effect_never_leaks() {
        let mut graph = RenderGraph::new();
        let mut registry = EffectRegistry::new();

        for kind in EffectType::ALL.iter().chain(EffectType::ALL.iter()) {
            for _ in 0..3 {
                registry.frame(&mut graph, &props(*kind)).unwrap();
            }
            let node = graph.node(registry.active_node().unwrap()).unwrap();
            assert_eq!(graph.store().live_count(), node.children.len());
            graph.draw().unwrap();
        }

        registry.deactivate(&mut graph);
        assert_eq!(graph.store().live_count(), 0);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(registry.active(), None);
    }

    #[test]
    fn invalid_props_are_rejected_before_touching_the_scene() {
        let mut graph = RenderGraph::new();
        let mut registry = EffectRegistry::new();
        let mut frame = props(EffectType::Circle);
        frame.detail_level = 1;

        let err = registry.frame(&mut graph, &frame).unwrap_err();
        assert!(matches!(err, VisualiserError::InvalidProps(_)));
        assert_eq!(graph.node_count(), 0);
        assert_eq!(registry.frames(), 0);
    }

    #[test]
    fn recreates_when_the_host_removed_the_node() {
        let mut graph = RenderGraph::new();
        let mut registry = EffectRegistry::new();
        registry.frame(&mut graph, &props(EffectType::Spectrum)).unwrap();
        let node = registry.active_node().unwrap();
        graph.dispose(node);

        let action = registry.frame(&mut graph, &props(EffectType::Spectrum)).unwrap();
        assert_eq!(action, FrameAction::Activated(EffectType::Spectrum));
        assert_eq!(graph.store().live_count(), 1);
    }
}
