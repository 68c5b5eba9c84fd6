use rsbtcnew_core::{
    utils::{Deserialize, Serialize, Stream, StreamAdapter},
    Account, Amount,
};
use std::collections::HashMap;

/// Parses a bootstrap weight blob: a big endian u128 block count the blob
/// was generated at, followed by `account || weight` tuples until the end
/// of the input
pub fn deserialize_bootstrap_weights(
    bytes: &[u8],
) -> anyhow::Result<(u64, HashMap<Account, Amount>)> {
    let mut stream = StreamAdapter::new(bytes);
    let mut max_blocks_bytes = [0u8; 16];
    stream.read_bytes(&mut max_blocks_bytes, 16)?;
    let max_blocks = u128::from_be_bytes(max_blocks_bytes) as u64;

    let mut weights = HashMap::new();
    while stream.bytes_left() >= Account::serialized_size() + Amount::serialized_size() {
        let account = Account::deserialize(&mut stream)?;
        let weight = Amount::deserialize(&mut stream)?;
        weights.insert(account, weight);
    }
    if stream.bytes_left() != 0 {
        bail!("malformed bootstrap weights");
    }
    Ok((max_blocks, weights))
}
