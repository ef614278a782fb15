//! # Hierarchical Deterministic Keys
//!
//! BIP-39 mnemonic words are stretched into a 64-byte seed (with an optional
//! passphrase), the seed becomes a BIP-32 master key, and account keys are
//! children of the master along a derivation path. The default path
//! `m/44'/818'/0'/0` is the BIP-44 external chain for coin type 818; the
//! n-th wallet address is child `n` of that node.
//!
//! Errors from this module never include the mnemonic words, not even the
//! one word that failed to parse.

use std::fmt;
use std::str::FromStr;

use bip32::{ChildNumber, DerivationPath, XPrv};
use bip39::Mnemonic;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::crypto::PrivateKey;
use crate::error::{Result, ThorError};
use crate::identity::Address;

/// A node in the derivation tree, holding its private key and chain code.
#[derive(Clone)]
pub struct HdKey {
    xprv: XPrv,
}

impl HdKey {
    /// Expand mnemonic words into the node at `path`.
    ///
    /// Word case is ignored. Fails with `IllegalArgument` on an unknown word,
    /// a bad checksum or word count, or an unparsable path.
    pub fn from_mnemonic(words: &[&str], path: &str, passphrase: Option<&str>) -> Result<Self> {
        let seed = mnemonic_to_seed(words, passphrase)?;
        let path = parse_path(path)?;
        let xprv = XPrv::derive_from_path(seed, &path)
            .map_err(|_| ThorError::illegal("path", "derivation failed for the given path"))?;
        Ok(Self { xprv })
    }

    /// Master node for a raw seed.
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        let xprv = XPrv::new(seed)
            .map_err(|_| ThorError::illegal("seed", "seed must be 16 to 64 bytes"))?;
        Ok(Self { xprv })
    }

    /// Non-hardened child `index` of this node.
    pub fn derive_child(&self, index: u32) -> Result<Self> {
        let child = ChildNumber::new(index, false)
            .map_err(|_| ThorError::illegal("index", format!("{index} is out of range")))?;
        let xprv = self
            .xprv
            .derive_child(child)
            .map_err(|_| ThorError::illegal("index", format!("cannot derive child {index}")))?;
        Ok(Self { xprv })
    }

    /// Apply `path` relative to this node. `"m/0/1"` means child 0, then its
    /// child 1.
    pub fn derive(&self, path: &str) -> Result<Self> {
        let path = parse_path(path)?;
        let mut xprv = self.xprv.clone();
        for child in path.iter() {
            xprv = xprv
                .derive_child(child)
                .map_err(|_| ThorError::illegal("path", "derivation failed for the given path"))?;
        }
        Ok(Self { xprv })
    }

    /// The node's signing key.
    pub fn private_key(&self) -> Result<PrivateKey> {
        Ok(PrivateKey::from_bytes(&self.xprv.to_bytes())?)
    }

    /// Compressed (33-byte) public key.
    pub fn public_key(&self) -> Vec<u8> {
        self.xprv.public_key().to_bytes().to_vec()
    }

    /// Address controlled by this node.
    pub fn address(&self) -> Address {
        let point = self.xprv.private_key().verifying_key().to_encoded_point(false);
        Address::of_uncompressed(point.as_bytes())
    }
}

impl fmt::Debug for HdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HdKey(depth={}, <redacted>)", self.xprv.attrs().depth)
    }
}

// ---------------------------------------------------------------------------
// Mnemonics
// ---------------------------------------------------------------------------

/// Generate a fresh English mnemonic of 12, 15, 18, 21 or 24 words.
pub fn generate_mnemonic(word_count: usize) -> Result<Vec<String>> {
    if !matches!(word_count, 12 | 15 | 18 | 21 | 24) {
        return Err(ThorError::illegal(
            "word_count",
            format!("{word_count} is not one of 12, 15, 18, 21, 24"),
        ));
    }
    let mut entropy = vec![0u8; word_count * 4 / 3];
    OsRng.fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy(&entropy)
        .map_err(|_| ThorError::illegal("word_count", "entropy rejected"))?;
    Ok(mnemonic.to_string().split(' ').map(str::to_owned).collect())
}

/// BIP-39 seed for `words` and an optional passphrase.
pub fn mnemonic_to_seed(words: &[&str], passphrase: Option<&str>) -> Result<[u8; 64]> {
    let phrase = words.join(" ").to_lowercase();
    let mnemonic = Mnemonic::parse_normalized(&phrase)
        .map_err(|_| ThorError::illegal("mnemonic", "invalid mnemonic words"))?;
    Ok(mnemonic.to_seed(passphrase.unwrap_or("")))
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `true` for `m` followed by three segments that may be hardened, then one
/// or two plain segments, e.g. `m/44'/818'/0'/0` or `m/44'/818'/0'/0/3`.
pub fn is_derivation_path_valid(path: &str) -> bool {
    let mut segments = path.split('/');
    if segments.next() != Some("m") {
        return false;
    }
    let segments: Vec<&str> = segments.collect();
    if !(4..=5).contains(&segments.len()) {
        return false;
    }
    segments.iter().enumerate().all(|(i, segment)| {
        let digits = if i < 3 {
            segment.strip_suffix('\'').unwrap_or(segment)
        } else {
            segment
        };
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    })
}

fn parse_path(path: &str) -> Result<DerivationPath> {
    DerivationPath::from_str(path)
        .map_err(|_| ThorError::illegal("path", format!("`{path}` is not a derivation path")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_DERIVATION_PATH;

    const WORDS: &str =
        "ignore empty bird silly journey junior ripple have guard waste between tenant";

    const ADDRESSES: [&str; 5] = [
        "0x339Fb3C438606519E2C75bbf531fb43a0F449A70",
        "0x5677099D06Bc72f9da1113aFA5e022feEc424c8E",
        "0x86231b5CDCBfE751B9DdCD4Bd981fC0A48afe921",
        "0xd6f184944335f26Ea59dbB603E38e2d434220fcD",
        "0x2AC1a0AeCd5C80Fb5524348130ab7cf92670470A",
    ];

    fn words() -> Vec<&'static str> {
        WORDS.split(' ').collect()
    }

    #[test]
    fn derives_known_address_sequence() {
        let root = HdKey::from_mnemonic(&words(), DEFAULT_DERIVATION_PATH, None).unwrap();
        for (i, expected) in ADDRESSES.iter().enumerate() {
            let child = root.derive_child(i as u32).unwrap();
            assert_eq!(child.address().to_string(), *expected);
            let key = child.private_key().unwrap();
            assert_eq!(key.public_key(true), child.public_key());
        }
    }

    #[test]
    fn word_case_is_ignored() {
        let upper: Vec<String> = words().iter().map(|w| w.to_uppercase()).collect();
        let upper: Vec<&str> = upper.iter().map(String::as_str).collect();
        let a = HdKey::from_mnemonic(&words(), DEFAULT_DERIVATION_PATH, None).unwrap();
        let b = HdKey::from_mnemonic(&upper, DEFAULT_DERIVATION_PATH, None).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn invalid_words_do_not_leak() {
        let wrong = "denial pet squirrel other broom bar gas better priority spoil cross";
        let words: Vec<&str> = wrong.split(' ').collect();
        let err = HdKey::from_mnemonic(&words, DEFAULT_DERIVATION_PATH, None).unwrap_err();
        assert!(matches!(err, ThorError::IllegalArgument { field: "mnemonic", .. }));
        let message = err.to_string();
        for word in words {
            assert!(!message.split(' ').any(|part| part == word));
        }
    }

    #[test]
    fn invalid_path_is_rejected() {
        let err = HdKey::from_mnemonic(&words(), "0/1/4/2/4/h", None).unwrap_err();
        assert!(matches!(err, ThorError::IllegalArgument { field: "path", .. }));
    }

    #[test]
    fn passphrase_changes_the_seed() {
        let words: Vec<&str> = std::iter::repeat("abandon")
            .take(11)
            .chain(std::iter::once("about"))
            .collect();
        let seed = mnemonic_to_seed(&words, Some("TREZOR")).unwrap();
        assert_eq!(hex::encode(&seed[..8]), "c55257c360c07c72");
        assert_ne!(mnemonic_to_seed(&words, None).unwrap(), seed);
    }

    #[test]
    fn generated_mnemonics_round_trip() {
        for count in [12, 15, 18, 21, 24] {
            let generated = generate_mnemonic(count).unwrap();
            assert_eq!(generated.len(), count);
            let refs: Vec<&str> = generated.iter().map(String::as_str).collect();
            let node = HdKey::from_mnemonic(&refs, DEFAULT_DERIVATION_PATH, None).unwrap();
            assert!(node.private_key().is_ok());
        }
        assert!(generate_mnemonic(13).is_err());
    }

    #[test]
    fn path_validation() {
        for ok in [
            DEFAULT_DERIVATION_PATH,
            "m/0/1/2/3/4",
            "m/0'/1'/2'/3/4",
            "m/44'/60'/0'/0/0",
            "m/44'/60'/0'/0",
            "m/0/1/2/3",
        ] {
            assert!(is_derivation_path_valid(ok), "{ok}");
        }
        for bad in [
            "a",
            "m/0/b",
            "incorrect",
            "inco/rre/01/ct",
            "0/1/4/2/4/h",
            "1/0/1",
            "m/0'/1'/2/3'/4'",
        ] {
            assert!(!is_derivation_path_valid(bad), "{bad}");
        }
    }

    #[test]
    fn debug_hides_key_material() {
        let node = HdKey::from_mnemonic(&words(), DEFAULT_DERIVATION_PATH, None).unwrap();
        assert_eq!(format!("{node:?}"), "HdKey(depth=4, <redacted>)");
    }
}
