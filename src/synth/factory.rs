use crate::graph::node::GraphNode;

/// Builds identical voice graphs for a `PolySynth` pool.
///
/// Any `Fn() -> impl GraphNode` is a factory, so a voice preset function
/// such as `voices::handpan` can be passed directly.
pub trait VoiceFactory: Send {
    type Voice: GraphNode;

    fn create_voice(&self) -> Self::Voice;
}

impl<F, T> VoiceFactory for F
where
    F: Fn() -> T + Send,
    T: GraphNode,
{
    type Voice = T;

    fn create_voice(&self) -> Self::Voice {
        self()
    }
}

/// Wrap a factory so its voices are boxed for dynamic dispatch.
pub fn boxed<F>(factory: F) -> impl VoiceFactory<Voice = Box<dyn GraphNode>>
where
    F: VoiceFactory,
    F::Voice: 'static,
{
    move || -> Box<dyn GraphNode> { Box::new(factory.create_voice()) }
}
