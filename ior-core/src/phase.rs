use serde::{Deserialize, Serialize};

/// Kind of block, and of every trial inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Bandit,
    Probe,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Bandit => "bandit",
            BlockType::Probe => "probe",
        }
    }
}

/// Where a session is. Blocks are numbered from 1 and indexed into a block
/// plan built at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Welcome,
    Block {
        number: usize,
        block_type: BlockType,
    },
    Debrief,
}

impl SessionPhase {
    /// A bandit block precedes every probe block when bandit blocks run.
    pub fn plan(blocks_per_experiment: usize, run_bandit_blocks: bool) -> Vec<BlockType> {
        (0..blocks_per_experiment)
            .flat_map(|_| {
                let bandit = run_bandit_blocks.then_some(BlockType::Bandit);
                bandit.into_iter().chain(std::iter::once(BlockType::Probe))
            })
            .collect()
    }

    pub fn next(&self, plan: &[BlockType]) -> Option<Self> {
        let next_index = match self {
            SessionPhase::Welcome => 0,
            SessionPhase::Block { number, .. } => *number,
            SessionPhase::Debrief => return None,
        };
        Some(match plan.get(next_index) {
            Some(&block_type) => SessionPhase::Block {
                number: next_index + 1,
                block_type,
            },
            None => SessionPhase::Debrief,
        })
    }

    pub fn block_type(&self) -> Option<BlockType> {
        match self {
            SessionPhase::Block { block_type, .. } => Some(*block_type),
            _ => None,
        }
    }
}
