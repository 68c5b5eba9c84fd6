use crate::{blocks::BlockDetails, Epoch, Root};
use blake2::{
    digest::{Update, VariableOutput},
    Blake2bVar,
};
use once_cell::sync::Lazy;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WorkVersion {
    Unspecified,
    Work1,
}

/// Difficulty thresholds a proof of work nonce must clear, by epoch and
/// block subtype
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkThresholds {
    pub epoch_1: u64,
    pub epoch_2: u64,
    pub epoch_2_receive: u64,

    /// Automatically calculated. The base threshold for work generation.
    pub base: u64,

    /// Automatically calculated. The lowest threshold a stored block can
    /// carry.
    pub entry: u64,
}

static PUBLISH_FULL: Lazy<WorkThresholds> = Lazy::new(|| {
    WorkThresholds::new(
        0xffffffc000000000,
        0xfffffff800000000, // 8x higher than epoch_1
        0xfffffe0000000000, // 8x lower than epoch_1
    )
});

static PUBLISH_BETA: Lazy<WorkThresholds> = Lazy::new(|| {
    WorkThresholds::new(
        0xfffff00000000000, // 64x lower than publish_full.epoch_1
        0xffffe00000000000, // 2x lower than epoch_1
        0xffff000000000000, // 16x lower than epoch_1
    )
});

static PUBLISH_DEV: Lazy<WorkThresholds> = Lazy::new(|| {
    WorkThresholds::new(
        0xfe00000000000000, // very low for tests
        0xffc0000000000000, // 8x higher than epoch_1
        0xf000000000000000, // 8x lower than epoch_1
    )
});

pub static WORK_THRESHOLDS_STUB: Lazy<WorkThresholds> =
    Lazy::new(|| WorkThresholds::publish_dev().clone());

impl WorkThresholds {
    pub fn publish_full() -> &'static WorkThresholds {
        &PUBLISH_FULL
    }

    pub fn publish_beta() -> &'static WorkThresholds {
        &PUBLISH_BETA
    }

    pub fn publish_dev() -> &'static WorkThresholds {
        &PUBLISH_DEV
    }

    pub fn new(epoch_1: u64, epoch_2: u64, epoch_2_receive: u64) -> Self {
        Self {
            epoch_1,
            epoch_2,
            epoch_2_receive,
            base: std::cmp::max(epoch_1, epoch_2),
            entry: std::cmp::min(epoch_1, epoch_2_receive),
        }
    }

    pub fn threshold(&self, details: &BlockDetails) -> u64 {
        match details.epoch {
            Epoch::Epoch2 => {
                if details.is_receive || details.is_epoch {
                    self.epoch_2_receive
                } else {
                    self.epoch_2
                }
            }
            Epoch::Epoch0 | Epoch::Epoch1 => self.epoch_1,
            _ => 0,
        }
    }

    pub fn threshold_base(&self) -> u64 {
        self.base
    }

    pub fn threshold_entry(&self) -> u64 {
        self.entry
    }

    pub fn value(&self, root: &Root, work: u64) -> u64 {
        let mut buffer = [0u8; 8];
        let mut blake = Blake2bVar::new(buffer.len()).unwrap();
        blake.update(&work.to_le_bytes());
        blake.update(root.as_bytes());
        blake.finalize_variable(&mut buffer).unwrap();
        u64::from_le_bytes(buffer)
    }

    pub fn difficulty(&self, root: &Root, work: u64) -> u64 {
        self.value(root, work)
    }

    /// The weakest check: is the work good enough for the block to enter
    /// the node at all
    pub fn validate_entry(&self, root: &Root, work: u64) -> bool {
        self.value(root, work) >= self.threshold_entry()
    }

    pub fn is_valid_pow(&self, root: &Root, work: u64, details: &BlockDetails) -> bool {
        self.value(root, work) >= self.threshold(details)
    }
}

/// Brute force work generator, only suitable for the dev network thresholds
pub struct WorkPool {
    thresholds: WorkThresholds,
}

impl WorkPool {
    pub fn new(thresholds: WorkThresholds) -> Self {
        Self { thresholds }
    }

    pub fn generate(&self, root: Root, difficulty: u64) -> Option<u64> {
        let mut work = rand::random::<u64>();
        loop {
            if self.thresholds.value(&root, work) >= difficulty {
                return Some(work);
            }
            work = work.wrapping_add(1);
        }
    }

    pub fn generate_dev2(&self, root: Root) -> Option<u64> {
        self.generate(root, self.thresholds.threshold_base())
    }
}

pub static DEV_WORK_POOL: Lazy<WorkPool> =
    Lazy::new(|| WorkPool::new(WorkThresholds::publish_dev().clone()));
