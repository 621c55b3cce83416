pub mod aead;
pub mod canonical;
pub mod cbc;
pub mod engine;
pub mod error;
pub mod frame;
pub mod generate;
pub mod mac;
pub mod rsa_oaep;
pub mod signing;
pub mod tag;
pub mod types;
pub mod wrap;

pub use canonical::canonical_json;
pub use engine::{open, seal};
pub use error::CryptoError;
pub use generate::{generate_key, random_bytes};
pub use mac::MacHash;
pub use signing::SignatureScheme;
pub use tag::TamperSeal;
pub use types::{
    Algorithm, AlgorithmFamily, AEAD_NONCE_LENGTH, AEAD_TAG_LENGTH, MASTER_KEY_LENGTH,
    WRAPPED_KEY_MIN_LENGTH,
};
pub use wrap::MasterKeyWrapper;
