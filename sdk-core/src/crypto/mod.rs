//! Cryptographic primitives for Tessera

pub mod aead;
pub mod digest;
pub mod kdf;
pub mod keys;
pub mod mac;
pub mod sig;

use crate::error::{CryptoError, Result};

/// Fill buffer with cryptographically secure random bytes from the OS.
///
/// There is no fallback generator: if the OS source fails the error is
/// returned as [`CryptoError::EntropyUnavailable`].
pub fn fill(buf: &mut [u8]) -> Result<()> {
    if buf.is_empty() {
        return Ok(());
    }
    getrandom::getrandom(buf).map_err(|e| {
        tracing::error!(code = e.code().get(), "OS entropy source failed");
        CryptoError::EntropyUnavailable
    })
}

/// Generate a fixed-size array of random bytes
pub fn random_array<const N: usize>() -> Result<[u8; N]> {
    let mut out = [0u8; N];
    fill(&mut out)?;
    Ok(out)
}

/// Run `f` under a DEBUG-level subscriber and return what it logged
#[cfg(test)]
pub(crate) fn capture_logs<F: FnOnce()>(f: F) -> String {
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8_lossy(&bytes).into_owned()
}
