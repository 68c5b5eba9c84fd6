use crate::utils::{Deserialize, Serialize, Stream};

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    bytes: [u8; 64],
}

impl Default for Signature {
    fn default() -> Self {
        Self::new()
    }
}

impl Signature {
    pub fn new() -> Self {
        Self { bytes: [0; 64] }
    }

    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self { bytes }
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        match bytes.try_into() {
            Ok(value) => Some(Self { bytes: value }),
            Err(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.bytes
    }

    pub fn is_zero(&self) -> bool {
        self.bytes == [0; 64]
    }

    pub fn encode_hex(&self) -> String {
        hex::encode_upper(self.bytes)
    }

    pub fn decode_hex(s: impl AsRef<str>) -> anyhow::Result<Self> {
        let bytes = hex::decode(s.as_ref())?;
        Self::from_slice(&bytes).ok_or_else(|| anyhow!("invalid signature length"))
    }

    pub const fn serialized_size() -> usize {
        64
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode_hex())
    }
}

impl Serialize for Signature {
    fn serialized_size() -> usize {
        64
    }

    fn serialize(&self, stream: &mut dyn Stream) -> anyhow::Result<()> {
        stream.write_bytes(&self.bytes)
    }
}

impl Deserialize for Signature {
    type Target = Self;

    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<Self> {
        let mut bytes = [0u8; 64];
        stream.read_bytes(&mut bytes, 64)?;
        Ok(Self { bytes })
    }
}
