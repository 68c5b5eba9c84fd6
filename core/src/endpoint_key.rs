use crate::utils::{Deserialize, Serialize, Stream};

/// Key of the peer table
#[derive(Default, PartialEq, Eq, Debug, Clone, Hash, PartialOrd, Ord)]
pub struct EndpointKey {
    /// The ipv6 address in network byte order
    address: [u8; 16],

    /// The port in host byte order
    port: u16,
}

impl EndpointKey {
    /// address in network byte order, port in host byte order
    pub fn new(address: [u8; 16], port: u16) -> Self {
        Self { address, port }
    }

    pub fn create_test_instance() -> Self {
        EndpointKey::new([1; 16], 123)
    }

    pub fn to_bytes(&self) -> [u8; 18] {
        let mut buffer = [0; 18];
        buffer[..16].copy_from_slice(&self.address);
        buffer[16..].copy_from_slice(&self.port.to_be_bytes());
        buffer
    }

    pub fn from_bytes(bytes: [u8; 18]) -> Self {
        let mut address = [0; 16];
        address.copy_from_slice(&bytes[..16]);
        let port = u16::from_be_bytes(bytes[16..].try_into().unwrap());
        Self { address, port }
    }
}

impl Serialize for EndpointKey {
    fn serialized_size() -> usize {
        18
    }

    fn serialize(&self, stream: &mut dyn Stream) -> anyhow::Result<()> {
        stream.write_bytes(&self.address)?;
        stream.write_bytes(&self.port.to_be_bytes())
    }
}

impl Deserialize for EndpointKey {
    type Target = Self;
    fn deserialize(stream: &mut dyn Stream) -> anyhow::Result<EndpointKey> {
        let mut result = EndpointKey {
            address: Default::default(),
            port: 0,
        };
        stream.read_bytes(&mut result.address, 16)?;
        let mut buffer = [0; 2];
        stream.read_bytes(&mut buffer, 2)?;
        result.port = u16::from_be_bytes(buffer);
        Ok(result)
    }
}
