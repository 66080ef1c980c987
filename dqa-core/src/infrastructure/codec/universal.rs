// dqa-core/src/infrastructure/codec/universal.rs

use std::io::{self, Read};

/// Normalizes line endings while reading: `\r\n` and lone `\r` both become `\n`.
///
/// Spreadsheet exports from old Mac tooling end rows with a bare carriage
/// return, which a CSV reader would otherwise see as one giant row.
pub struct UniversalReader<R> {
    inner: R,
    after_cr: bool,
}

impl<R: Read> UniversalReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            after_cr: false,
        }
    }
}

impl<R: Read> Read for UniversalReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let n = self.inner.read(buf)?;
            if n == 0 {
                return Ok(0);
            }

            let mut out = 0;
            for i in 0..n {
                let byte = buf[i];
                match byte {
                    b'\r' => {
                        buf[out] = b'\n';
                        out += 1;
                        self.after_cr = true;
                    }
                    b'\n' if self.after_cr => {
                        self.after_cr = false;
                    }
                    _ => {
                        buf[out] = byte;
                        out += 1;
                        self.after_cr = false;
                    }
                }
            }

            // A chunk holding only the `\n` of a split `\r\n` yields nothing.
            if out > 0 {
                return Ok(out);
            }
        }
    }
}
