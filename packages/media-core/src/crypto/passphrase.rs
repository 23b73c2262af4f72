use std::fmt;

use aes::Aes256;
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;

use super::SymmetricCipher;
use crate::config::LogConfig;
use crate::errors::CryptoError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const ITERATION_COUNT: u32 = 1000;
const KEY_LEN: usize = 256 / 8;
const IV_LEN: usize = 128 / 8;
/// PBKDF2 の出力長（384bit = 鍵 || IV）
const DERIVED_LEN: usize = KEY_LEN + IV_LEN;
const BLOCK_LEN: usize = 16;

/// パスフレーズとソルトから導出した鍵で AES-256-CBC (PKCS#5) 暗号化を行う
///
/// 鍵と IV は PBKDF2-HMAC-SHA1 (1000 回) の 48 バイト出力を分割して得る。
/// 生成時に一度だけ導出し、以後は変更しない。
///
/// IV がパスフレーズとソルトから決まるため、同じ平文は常に同じ暗号文になる。
/// 認証タグも持たないため、改ざんは検出できない（壊れた暗号文が
/// そのまま別の平文に復号されることがある）。既存データとの互換性が
/// 不要であれば [`SealedCipher`](super::SealedCipher) を使うこと。
pub struct PassphraseCipher {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
    log: LogConfig,
}

impl PassphraseCipher {
    pub fn new(passphrase: &str, salt: &[u8]) -> Result<Self, CryptoError> {
        if salt.is_empty() {
            return Err(CryptoError::KeyDerivation("salt must not be empty".to_string()));
        }

        let mut derived = [0u8; DERIVED_LEN];
        pbkdf2_hmac::<Sha1>(passphrase.as_bytes(), salt, ITERATION_COUNT, &mut derived);

        let mut key = [0u8; KEY_LEN];
        let mut iv = [0u8; IV_LEN];
        key.copy_from_slice(&derived[..KEY_LEN]);
        iv.copy_from_slice(&derived[KEY_LEN..]);
        derived.fill(0);

        Ok(Self {
            key,
            iv,
            log: LogConfig::default(),
        })
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}

impl SymmetricCipher for PassphraseCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);
        Ok(ciphertext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CryptoError::Truncated {
                len: ciphertext.len(),
            });
        }

        Aes256CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|e| CryptoError::Decrypt(format!("bad padding: {e}")))
    }

    fn log_config(&self) -> &LogConfig {
        &self.log
    }
}

impl Drop for PassphraseCipher {
    fn drop(&mut self) {
        self.key.fill(0);
        self.iv.fill(0);
    }
}

impl fmt::Debug for PassphraseCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassphraseCipher")
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}
