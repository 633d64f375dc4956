//! Block store: the single source of truth for the canvas document.
//!
//! [`BlockStore`] owns the ordered block collection, the known-components
//! index used by search, and the plot map. Every other component mutates the
//! document through the operations here, so the three collections never
//! drift apart.
//!
//! Operations referencing a missing id are absorbed: they return `false`
//! and change nothing.

use std::collections::HashMap;

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::config::PlacementConfig;
use crate::model::{Block, BlockId, BlockKind, BlockOutput, BlockPatch, Language};

/// Prefix a stored plot payload needs before it can be used as an image source.
pub const PLOT_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Searchable summary of a live block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSummary {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
}

/// Ordered, id-indexed block collection plus its derived indexes.
#[derive(Debug)]
pub struct BlockStore {
    /// Insertion order is paint order.
    blocks: IndexMap<BlockId, Block>,
    components: Vec<ComponentSummary>,
    /// Base64 PNG payloads keyed by owning block.
    plots: HashMap<BlockId, String>,
    next_id: u64,
    placement: PlacementConfig,
    rng: StdRng,
}

impl Default for BlockStore {
    fn default() -> Self {
        Self::new(PlacementConfig::default())
    }
}

impl BlockStore {
    /// Create an empty store with entropy-seeded default placement.
    pub fn new(placement: PlacementConfig) -> Self {
        Self::with_rng(placement, StdRng::from_entropy())
    }

    /// Create an empty store whose random placement is reproducible.
    pub fn with_seed(placement: PlacementConfig, seed: u64) -> Self {
        Self::with_rng(placement, StdRng::seed_from_u64(seed))
    }

    fn with_rng(placement: PlacementConfig, rng: StdRng) -> Self {
        Self {
            blocks: IndexMap::new(),
            components: Vec::new(),
            plots: HashMap::new(),
            next_id: 1,
            placement,
            rng,
        }
    }

    // ────────────────────────────────────────────────────────────────────
    // Mutations
    // ────────────────────────────────────────────────────────────────────

    /// Append a new block and return its freshly allocated id.
    ///
    /// Unset fields default to a `code` block in JavaScript with empty
    /// content and output, placed at a random point of the placement range.
    pub fn create(&mut self, initial: BlockPatch) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;

        let x = match initial.x {
            Some(x) => x,
            None => self.random_coordinate(self.placement.max_x),
        };
        let y = match initial.y {
            Some(y) => y,
            None => self.random_coordinate(self.placement.max_y),
        };
        let block = Block {
            id,
            kind: initial.kind.unwrap_or_default(),
            language: initial.language.unwrap_or(Language::JavaScript),
            content: initial.content.unwrap_or_default(),
            x,
            y,
            output: initial.output.unwrap_or_default(),
        };

        debug!(block_id = %id, kind = %block.kind, x, y, "block created");
        self.components.push(ComponentSummary {
            id,
            kind: block.kind.clone(),
        });
        self.blocks.insert(id, block);
        id
    }

    /// Merge `patch` into the block with `id`. Returns `false` if absent.
    pub fn update(&mut self, id: BlockId, patch: BlockPatch) -> bool {
        let Some(block) = self.blocks.get_mut(&id) else {
            debug!(block_id = %id, "update ignored: no such block");
            return false;
        };
        let new_kind = patch.kind.clone();
        block.apply(patch);
        if let Some(kind) = new_kind {
            if let Some(summary) = self.components.iter_mut().find(|c| c.id == id) {
                summary.kind = kind;
            }
        }
        true
    }

    /// Set the absolute position of a block.
    pub fn move_block(&mut self, id: BlockId, x: f64, y: f64) -> bool {
        self.update(id, BlockPatch::new().position(x, y))
    }

    pub fn set_content(&mut self, id: BlockId, content: impl Into<String>) -> bool {
        self.update(id, BlockPatch::new().content(content))
    }

    pub fn set_language(&mut self, id: BlockId, language: Language) -> bool {
        self.update(id, BlockPatch::new().language(language))
    }

    pub fn set_output(&mut self, id: BlockId, output: impl Into<BlockOutput>) -> bool {
        self.update(id, BlockPatch::new().output(output))
    }

    /// Insert or replace the plot for an existing block.
    pub fn set_plot(&mut self, id: BlockId, payload: impl Into<String>) -> bool {
        if !self.blocks.contains_key(&id) {
            return false;
        }
        self.plots.insert(id, payload.into());
        true
    }

    /// Delete a block together with its index entry and plot.
    pub fn remove(&mut self, id: BlockId) -> bool {
        if self.blocks.shift_remove(&id).is_none() {
            debug!(block_id = %id, "remove ignored: no such block");
            return false;
        }
        self.components.retain(|c| c.id != id);
        self.plots.remove(&id);
        debug!(block_id = %id, "block removed");
        true
    }

    // ────────────────────────────────────────────────────────────────────
    // Reads
    // ────────────────────────────────────────────────────────────────────

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks in insertion (paint) order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    pub fn ids(&self) -> Vec<BlockId> {
        self.blocks.keys().copied().collect()
    }

    /// Live block summaries in creation order.
    pub fn components(&self) -> &[ComponentSummary] {
        &self.components
    }

    /// Raw base64 plot payload of a block, if it has one.
    pub fn plot(&self, id: BlockId) -> Option<&str> {
        self.plots.get(&id).map(String::as_str)
    }

    /// Plot payload as a `data:` URI ready for an image element.
    pub fn plot_data_uri(&self, id: BlockId) -> Option<String> {
        self.plot(id)
            .map(|payload| format!("{PLOT_DATA_URI_PREFIX}{payload}"))
    }

    pub fn plot_count(&self) -> usize {
        self.plots.len()
    }

    fn random_coordinate(&mut self, max: f64) -> f64 {
        if max > 0.0 {
            self.rng.gen_range(0.0..max)
        } else {
            0.0
        }
    }
}
