use crate::graph::node::{GraphNode, RenderCtx};

/// Scale a node's output by a fixed level.
pub struct Gain<N> {
    pub signal: N,
    pub level: f32,
}

impl<N> Gain<N> {
    pub fn new(signal: N, level: f32) -> Self {
        Self {
            signal,
            level: level.max(0.0),
        }
    }
}

impl<N: GraphNode> GraphNode for Gain<N> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.signal.render_block(out, ctx);
        for sample in out.iter_mut() {
            *sample *= self.level;
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.signal.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.signal.note_off(ctx);
    }

    fn reset(&mut self) {
        self.signal.reset();
    }

    fn get_envelope_level(&self) -> Option<f32> {
        self.signal.get_envelope_level()
    }

    fn is_active(&self) -> bool {
        self.signal.is_active()
    }
}
