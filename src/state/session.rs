/// Identifier handed out per submitted request.
pub type GenerationId = u64;

/// The growing text of the current generation.
///
/// Only increments tagged with the current generation are appended; late
/// increments from an abandoned stream are dropped.
#[derive(Debug, Default)]
pub struct AccumulatedResponse {
    generation: Option<GenerationId>,
    text: String,
    dropped_stale: usize,
}

impl AccumulatedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the buffer and makes `generation` the only accepted source.
    pub fn reset(&mut self, generation: GenerationId) {
        self.generation = Some(generation);
        self.text.clear();
    }

    /// Empties the buffer without starting a new generation.
    pub fn clear(&mut self) {
        self.generation = None;
        self.text.clear();
    }

    /// Appends `increment` if it belongs to the current generation.
    pub fn append(&mut self, generation: GenerationId, increment: &str) -> bool {
        if self.generation != Some(generation) {
            self.dropped_stale += 1;
            log::debug!("dropping stale increment generation={generation}");
            return false;
        }
        self.text.push_str(increment);
        true
    }

    pub fn is_current(&self, generation: GenerationId) -> bool {
        self.generation == Some(generation)
    }

    pub fn generation(&self) -> Option<GenerationId> {
        self.generation
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn dropped_stale(&self) -> usize {
        self.dropped_stale
    }
}
