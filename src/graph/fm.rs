use crate::{
    dsp::{envelope::Envelope, fm::FmOperator},
    graph::node::{GraphNode, RenderCtx},
};

/// Two-operator FM source whose modulation index follows its own envelope.
///
/// `peak_index` is the index at the top of the index envelope. The node
/// produces no amplitude shaping of its own; pair it with `.amplify()`.
pub struct FmNode {
    op: FmOperator,
    peak_index: f32,
    index_env: Envelope,
}

impl FmNode {
    pub fn new(harmonicity: f32, peak_index: f32, index_env: Envelope) -> Self {
        Self {
            op: FmOperator::new(harmonicity),
            peak_index: peak_index.max(0.0),
            index_env,
        }
    }
}

impl GraphNode for FmNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            self.index_env.next_sample(ctx);
            let index = self.peak_index * self.index_env.level();
            *sample = self.op.next_sample(ctx.frequency, ctx.sample_rate, index);
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.op.reset();
        self.index_env.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.index_env.note_off(ctx);
    }

    fn reset(&mut self) {
        self.op.reset();
        self.index_env.reset();
    }
}
