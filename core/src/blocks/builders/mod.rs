mod legacy_change_block_builder;
pub use legacy_change_block_builder::LegacyChangeBlockBuilder;

mod legacy_open_block_builder;
pub use legacy_open_block_builder::LegacyOpenBlockBuilder;

mod legacy_receive_block_builder;
pub use legacy_receive_block_builder::LegacyReceiveBlockBuilder;

mod legacy_send_block_builder;
pub use legacy_send_block_builder::LegacySendBlockBuilder;

mod state_block_builder;
pub use state_block_builder::StateBlockBuilder;

/// Entry point for building test blocks of every kind
pub struct BlockBuilder {}

impl BlockBuilder {
    pub fn legacy_open() -> LegacyOpenBlockBuilder {
        LegacyOpenBlockBuilder::new()
    }

    pub fn legacy_receive() -> LegacyReceiveBlockBuilder {
        LegacyReceiveBlockBuilder::new()
    }

    pub fn legacy_send() -> LegacySendBlockBuilder {
        LegacySendBlockBuilder::new()
    }

    pub fn legacy_change() -> LegacyChangeBlockBuilder {
        LegacyChangeBlockBuilder::new()
    }

    pub fn state() -> StateBlockBuilder {
        StateBlockBuilder::new()
    }
}
