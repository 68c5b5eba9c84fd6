use crate::{PublicKey, Signature};
use ed25519_dalek_blake2b::ed25519::signature::Signature as _;
use rand::RngExt;

u256_struct!(RawKey);

pub struct KeyPair {
    keypair: ed25519_dalek_blake2b::Keypair,
}

impl Default for KeyPair {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self::from_priv_key_bytes(&self.keypair.secret.to_bytes()).unwrap()
    }
}

impl KeyPair {
    pub fn new() -> Self {
        let mut seed = [0u8; 32];
        rand::rng().fill(&mut seed[..]);
        Self::from_priv_key_bytes(&seed).unwrap()
    }

    pub fn zero() -> Self {
        Self::from_priv_key_bytes(&[0u8; 32]).unwrap()
    }

    pub fn from_priv_key_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let secret = ed25519_dalek_blake2b::SecretKey::from_bytes(bytes)
            .map_err(|_| anyhow!("could not load secret key"))?;
        let public = ed25519_dalek_blake2b::PublicKey::from(&secret);
        Ok(Self {
            keypair: ed25519_dalek_blake2b::Keypair { secret, public },
        })
    }

    pub fn from_priv_key_hex(s: impl AsRef<str>) -> anyhow::Result<Self> {
        let raw = RawKey::decode_hex(s)?;
        Self::from_priv_key_bytes(raw.as_bytes())
    }

    pub fn private_key(&self) -> RawKey {
        RawKey::from_bytes(self.keypair.secret.to_bytes())
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_bytes(self.keypair.public.to_bytes())
    }
}

impl From<u64> for KeyPair {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self::from_priv_key_bytes(&bytes).unwrap()
    }
}

pub fn sign_message(private_key: &RawKey, public_key: &PublicKey, data: &[u8]) -> Signature {
    let secret = ed25519_dalek_blake2b::SecretKey::from_bytes(private_key.as_bytes()).unwrap();
    let public = ed25519_dalek_blake2b::PublicKey::from_bytes(public_key.as_bytes()).unwrap();
    let expanded = ed25519_dalek_blake2b::ExpandedSecretKey::from(&secret);
    let signature = expanded.sign(data, &public);
    Signature::from_bytes(signature.to_bytes())
}

pub fn validate_message(
    public_key: &PublicKey,
    message: &[u8],
    signature: &Signature,
) -> anyhow::Result<()> {
    let public = ed25519_dalek_blake2b::PublicKey::from_bytes(public_key.as_bytes())
        .map_err(|_| anyhow!("could not read public key"))?;
    let signature = ed25519_dalek_blake2b::Signature::from_bytes(signature.as_bytes())
        .map_err(|_| anyhow!("invalid signature bytes"))?;
    public
        .verify_strict(message, &signature)
        .map_err(|_| anyhow!("could not verify message"))?;
    Ok(())
}
