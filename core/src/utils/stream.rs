use anyhow::Result;

pub trait Stream {
    fn write_u8(&mut self, value: u8) -> Result<()>;
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;
    fn read_u8(&mut self) -> Result<u8>;
    fn read_bytes(&mut self, buffer: &mut [u8], len: usize) -> Result<()>;
    fn bytes_left(&self) -> usize;

    fn write_u32_be(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    fn write_u64_be(&mut self, value: u64) -> Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    fn write_u64_le(&mut self, value: u64) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    fn read_u32_be(&mut self) -> Result<u32> {
        let mut buffer = [0u8; 4];
        self.read_bytes(&mut buffer, 4)?;
        Ok(u32::from_be_bytes(buffer))
    }

    fn read_u64_be(&mut self) -> Result<u64> {
        let mut buffer = [0u8; 8];
        self.read_bytes(&mut buffer, 8)?;
        Ok(u64::from_be_bytes(buffer))
    }

    fn read_u64_le(&mut self) -> Result<u64> {
        let mut buffer = [0u8; 8];
        self.read_bytes(&mut buffer, 8)?;
        Ok(u64::from_le_bytes(buffer))
    }
}

/// A growable in-memory stream for serializing and deserializing
pub struct MemoryStream {
    bytes: Vec<u8>,
    read_index: usize,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            read_index: 0,
        }
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes.len()
    }

    pub fn byte_at(&self, i: usize) -> u8 {
        self.bytes[i]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl Default for MemoryStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Stream for MemoryStream {
    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.bytes.push(value);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    fn read_u8(&mut self) -> Result<u8> {
        let result = self
            .bytes
            .get(self.read_index)
            .copied()
            .ok_or_else(|| anyhow!("no more bytes to read"))?;
        self.read_index += 1;
        Ok(result)
    }

    fn read_bytes(&mut self, buffer: &mut [u8], len: usize) -> Result<()> {
        if self.read_index + len > self.bytes.len() {
            bail!("not enough bytes to read");
        }
        buffer[..len].copy_from_slice(&self.bytes[self.read_index..self.read_index + len]);
        self.read_index += len;
        Ok(())
    }

    fn bytes_left(&self) -> usize {
        self.bytes.len() - self.read_index
    }
}

/// A read-only stream over a borrowed byte slice
pub struct StreamAdapter<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> StreamAdapter<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.position..]
    }
}

impl<'a> Stream for StreamAdapter<'a> {
    fn write_u8(&mut self, _value: u8) -> Result<()> {
        bail!("not supported");
    }

    fn write_bytes(&mut self, _bytes: &[u8]) -> Result<()> {
        bail!("not supported");
    }

    fn read_u8(&mut self) -> Result<u8> {
        let result = self
            .bytes
            .get(self.position)
            .copied()
            .ok_or_else(|| anyhow!("no more bytes to read"))?;
        self.position += 1;
        Ok(result)
    }

    fn read_bytes(&mut self, buffer: &mut [u8], len: usize) -> Result<()> {
        if self.position + len > self.bytes.len() {
            bail!("not enough bytes to read");
        }
        buffer[..len].copy_from_slice(&self.bytes[self.position..self.position + len]);
        self.position += len;
        Ok(())
    }

    fn bytes_left(&self) -> usize {
        self.bytes.len() - self.position
    }
}
