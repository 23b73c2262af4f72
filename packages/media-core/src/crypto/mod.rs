pub mod passphrase;
pub mod sealed;

use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::config::LogConfig;
use crate::errors::{CryptoError, MediaError};
use crate::storage::ObjectStore;

pub use passphrase::PassphraseCipher;
pub use sealed::SealedCipher;

/// 対称暗号の共通インターフェース
///
/// 文字列・Base64・ファイル向けの補助メソッドは `encrypt` / `decrypt` の上に組み立てられる。
/// Base64 は改行なしの標準アルファベット（パディングあり）。
pub trait SymmetricCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    fn log_config(&self) -> &LogConfig;

    /// UTF-8 文字列を暗号化する
    fn encrypt_string(&self, text: &str) -> Result<Vec<u8>, CryptoError> {
        self.encrypt(text.as_bytes())
    }

    /// 復号結果を UTF-8 文字列として返す
    fn decrypt_string(&self, ciphertext: &[u8]) -> Result<String, CryptoError> {
        Ok(String::from_utf8(self.decrypt(ciphertext)?)?)
    }

    /// 文字列を暗号化して Base64 テキストにする
    fn encrypt_encode_string(&self, text: &str) -> Result<String, CryptoError> {
        Ok(STANDARD.encode(self.encrypt_string(text)?))
    }

    /// Base64 テキストをデコードして文字列に復号する
    fn decode_decrypt_string(&self, encoded: &str) -> Result<String, CryptoError> {
        let ciphertext = STANDARD.decode(encoded.trim())?;
        self.decrypt_string(&ciphertext)
    }

    /// ストアのファイル全体を暗号化して Base64 テキストにする
    fn encrypt_encode_file<S: ObjectStore + ?Sized>(
        &self,
        store: &S,
        key: &str,
    ) -> Result<String, MediaError> {
        let data = store.read_object(key)?;
        Ok(STANDARD.encode(self.encrypt(&data)?))
    }

    /// Base64 テキストを復号してストアのファイルに書き込み、そのパスを返す
    fn decode_decrypt_file<S: ObjectStore + ?Sized>(
        &self,
        store: &S,
        encoded: &str,
        key: &str,
    ) -> Result<PathBuf, MediaError> {
        let ciphertext = STANDARD.decode(encoded.trim()).map_err(CryptoError::from)?;
        let plaintext = self.decrypt(&ciphertext)?;
        Ok(store.write_object(key, &plaintext)?)
    }

    fn encrypt_encode_string_or_none(&self, text: &str) -> Option<String> {
        self.encrypt_encode_string(text)
            .map_err(|e| MediaError::from(e).report(self.log_config(), "encrypt_encode_string"))
            .ok()
    }

    fn decrypt_string_or_none(&self, ciphertext: &[u8]) -> Option<String> {
        self.decrypt_string(ciphertext)
            .map_err(|e| MediaError::from(e).report(self.log_config(), "decrypt_string"))
            .ok()
    }

    fn decode_decrypt_string_or_none(&self, encoded: &str) -> Option<String> {
        self.decode_decrypt_string(encoded)
            .map_err(|e| MediaError::from(e).report(self.log_config(), "decode_decrypt_string"))
            .ok()
    }

    fn encrypt_encode_file_or_none<S: ObjectStore + ?Sized>(
        &self,
        store: &S,
        key: &str,
    ) -> Option<String> {
        self.encrypt_encode_file(store, key)
            .map_err(|e| e.report(self.log_config(), &format!("encrypt_encode_file({key})")))
            .ok()
    }

    fn decode_decrypt_file_or_none<S: ObjectStore + ?Sized>(
        &self,
        store: &S,
        encoded: &str,
        key: &str,
    ) -> Option<PathBuf> {
        self.decode_decrypt_file(store, encoded, key)
            .map_err(|e| e.report(self.log_config(), &format!("decode_decrypt_file({key})")))
            .ok()
    }
}
