use crate::graph::{amplify::Amplify, gain::Gain, node::GraphNode};

pub trait NodeExt: GraphNode + Sized {
    fn amplify<M>(self, modulator: M) -> Amplify<Self, M> {
        Amplify::new(self, modulator)
    }

    fn gain(self, level: f32) -> Gain<Self> {
        Gain::new(self, level)
    }
}

impl<T: GraphNode> NodeExt for T {}
