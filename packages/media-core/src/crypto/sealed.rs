use std::fmt;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use super::SymmetricCipher;
use crate::config::LogConfig;
use crate::errors::CryptoError;

/// PBKDF2-HMAC-SHA256 の既定の繰り返し回数
pub const DEFAULT_ITERATIONS: u32 = 600_000;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// パスフレーズから導出した鍵で AES-256-GCM 暗号化を行う
///
/// 暗号化のたびにランダムな 96bit ノンスを生成し、暗号文の先頭に付ける
/// （`nonce || ciphertext || tag`）。改ざんされた暗号文は復号エラーになる。
pub struct SealedCipher {
    key: [u8; KEY_LEN],
    log: LogConfig,
}

impl SealedCipher {
    pub fn new(passphrase: &str, salt: &[u8]) -> Result<Self, CryptoError> {
        Self::with_iterations(passphrase, salt, DEFAULT_ITERATIONS)
    }

    pub fn with_iterations(
        passphrase: &str,
        salt: &[u8],
        iterations: u32,
    ) -> Result<Self, CryptoError> {
        if salt.is_empty() {
            return Err(CryptoError::KeyDerivation("salt must not be empty".to_string()));
        }
        if iterations == 0 {
            return Err(CryptoError::KeyDerivation(
                "iteration count must be positive".to_string(),
            ));
        }

        let mut key = [0u8; KEY_LEN];
        pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, iterations, &mut key);

        Ok(Self {
            key,
            log: LogConfig::default(),
        })
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    fn cipher(&self) -> Result<Aes256Gcm, CryptoError> {
        Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| CryptoError::KeyDerivation(format!("invalid key length: {e}")))
    }
}

impl SymmetricCipher for SealedCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher()?
            .encrypt(&nonce, plaintext)
            .map_err(|e| CryptoError::Encrypt(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(nonce.as_slice());
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if ciphertext.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::Truncated {
                len: ciphertext.len(),
            });
        }

        let (nonce, body) = ciphertext.split_at(NONCE_LEN);
        self.cipher()?
            .decrypt(Nonce::from_slice(nonce), body)
            .map_err(|_| CryptoError::Decrypt("authentication failed".to_string()))
    }

    fn log_config(&self) -> &LogConfig {
        &self.log
    }
}

impl Drop for SealedCipher {
    fn drop(&mut self) {
        self.key.fill(0);
    }
}

impl fmt::Debug for SealedCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedCipher")
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}
