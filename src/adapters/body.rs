use std::hint::black_box;

use crate::family::Direction;
use crate::payload::PayloadSource;
use crate::{BenchError, Encryption, Result, TimedBody};

enum Mode {
    RoundTrip,
    Encrypt,
    /// Ciphertext produced while preparing the trial, one entry per chunk.
    Decrypt(Vec<Vec<u8>>),
}

/// Timed body shared by every cipher family.
///
/// With no chunk size the whole payload is one message; otherwise the payload is fed to the
/// cipher in chunks of that size, each an independent message.
pub struct CipherBody {
    cipher: Box<dyn Encryption>,
    chunk_size: Option<usize>,
    mode: Mode,
}

impl CipherBody {
    /// Readies one trial. For [`Direction::Reverse`] the payload is encrypted here, untimed.
    pub fn prepare(
        cipher: Box<dyn Encryption>,
        chunk_size: Option<usize>,
        direction: Direction,
        payload: &PayloadSource,
    ) -> Result<Self> {
        let mode = match direction {
            Direction::Full => Mode::RoundTrip,
            Direction::Forward => Mode::Encrypt,
            Direction::Reverse => Mode::Decrypt(encrypt_payload(cipher.as_ref(), chunk_size, payload)?),
        };
        Ok(Self {
            cipher,
            chunk_size,
            mode,
        })
    }
}

impl TimedBody for CipherBody {
    fn run(&mut self, payload: &PayloadSource) -> Result<()> {
        let cipher = self.cipher.as_ref();
        match (&self.mode, self.chunk_size) {
            (Mode::RoundTrip, None) => round_trip(cipher, &payload.read_all()?),
            (Mode::RoundTrip, Some(size)) => {
                payload.for_each_chunk(size, |chunk| round_trip(cipher, chunk))
            }
            (Mode::Encrypt, None) => {
                black_box(cipher.encrypt(&payload.read_all()?)?);
                Ok(())
            }
            (Mode::Encrypt, Some(size)) => payload.for_each_chunk(size, |chunk| {
                black_box(cipher.encrypt(chunk)?);
                Ok(())
            }),
            (Mode::Decrypt(ciphertext), _) => {
                for block in ciphertext {
                    black_box(cipher.decrypt(block)?);
                }
                Ok(())
            }
        }
    }
}

fn encrypt_payload(
    cipher: &dyn Encryption,
    chunk_size: Option<usize>,
    payload: &PayloadSource,
) -> Result<Vec<Vec<u8>>> {
    match chunk_size {
        None => Ok(vec![cipher.encrypt(&payload.read_all()?)?]),
        Some(size) => {
            let mut blocks = Vec::new();
            payload.for_each_chunk(size, |chunk| {
                blocks.push(cipher.encrypt(chunk)?);
                Ok(())
            })?;
            Ok(blocks)
        }
    }
}

fn round_trip(cipher: &dyn Encryption, plaintext: &[u8]) -> Result<()> {
    let ciphertext = cipher.encrypt(plaintext)?;
    let recovered = cipher.decrypt(&ciphertext)?;
    if recovered != plaintext {
        return Err(BenchError::TrialFailure(
            "decrypted output differs from the input".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// XOR "cipher" that counts calls and can be told to corrupt decryption.
    struct Xor {
        encryptions: Rc<Cell<usize>>,
        decryptions: Rc<Cell<usize>>,
        corrupt: bool,
    }

    impl Encryption for Xor {
        fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
            self.encryptions.set(self.encryptions.get() + 1);
            Ok(data.iter().map(|b| b ^ 0xaa).collect())
        }

        fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
            self.decryptions.set(self.decryptions.get() + 1);
            let mut out: Vec<u8> = data.iter().map(|b| b ^ 0xaa).collect();
            if self.corrupt {
                out.push(0);
            }
            Ok(out)
        }
    }

    fn xor(corrupt: bool) -> (Box<Xor>, Rc<Cell<usize>>, Rc<Cell<usize>>) {
        let enc = Rc::new(Cell::new(0));
        let dec = Rc::new(Cell::new(0));
        let cipher = Box::new(Xor {
            encryptions: Rc::clone(&enc),
            decryptions: Rc::clone(&dec),
            corrupt,
        });
        (cipher, enc, dec)
    }

    #[test]
    fn chunked_round_trip_touches_every_chunk() {
        let payload = PayloadSource::memory(vec![1u8; 300]);
        let (cipher, enc, dec) = xor(false);
        let mut body = CipherBody::prepare(cipher, Some(126), Direction::Full, &payload).unwrap();
        body.run(&payload).unwrap();
        assert_eq!((enc.get(), dec.get()), (3, 3));
    }

    #[test]
    fn reverse_encrypts_while_preparing() {
        let payload = PayloadSource::memory(vec![9u8; 252]);
        let (cipher, enc, dec) = xor(false);
        let mut body = CipherBody::prepare(cipher, Some(126), Direction::Reverse, &payload).unwrap();
        assert_eq!((enc.get(), dec.get()), (2, 0));
        body.run(&payload).unwrap();
        assert_eq!((enc.get(), dec.get()), (2, 2));
    }

    #[test]
    fn forward_never_decrypts() {
        let payload = PayloadSource::memory(b"whole message".to_vec());
        let (cipher, enc, dec) = xor(false);
        let mut body = CipherBody::prepare(cipher, None, Direction::Forward, &payload).unwrap();
        body.run(&payload).unwrap();
        assert_eq!((enc.get(), dec.get()), (1, 0));
    }

    #[test]
    fn mismatched_round_trip_fails_the_trial() {
        let payload = PayloadSource::memory(b"abc".to_vec());
        let (cipher, _, _) = xor(true);
        let mut body = CipherBody::prepare(cipher, None, Direction::Full, &payload).unwrap();
        assert!(matches!(body.run(&payload), Err(BenchError::TrialFailure(_))));
    }
}
