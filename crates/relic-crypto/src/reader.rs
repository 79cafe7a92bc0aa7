use std::io::{self, Read};

use crate::hasher::{ContentHasher, DigestAlgorithm};

/// Digests computed over one stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigestSummary {
    /// Number of bytes that passed through the reader.
    pub size: u64,
    digests: Vec<(DigestAlgorithm, String)>,
}

impl DigestSummary {
    /// Hex digest for `algorithm`, if it was requested.
    pub fn get(&self, algorithm: DigestAlgorithm) -> Option<&str> {
        self.digests
            .iter()
            .find(|(alg, _)| *alg == algorithm)
            .map(|(_, hex)| hex.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (DigestAlgorithm, &str)> {
        self.digests.iter().map(|(alg, hex)| (*alg, hex.as_str()))
    }
}

/// A [`Read`] adapter that digests bytes as they are read.
///
/// Used to validate declared checksums against the bytes actually written to
/// storage without buffering content in memory.
pub struct DigestingReader<R> {
    inner: R,
    hashers: Vec<ContentHasher>,
    size: u64,
}

impl<R: Read> DigestingReader<R> {
    /// Wrap `inner`, computing one digest per distinct algorithm.
    pub fn new(inner: R, algorithms: &[DigestAlgorithm]) -> Self {
        let mut hashers: Vec<ContentHasher> = Vec::with_capacity(algorithms.len());
        for alg in algorithms {
            if !hashers.iter().any(|h| h.algorithm() == *alg) {
                hashers.push(ContentHasher::new(*alg));
            }
        }
        Self {
            inner,
            hashers,
            size: 0,
        }
    }

    /// Bytes read so far.
    pub fn bytes_read(&self) -> u64 {
        self.size
    }

    /// Finish hashing and return the digests.
    pub fn finish(self) -> DigestSummary {
        DigestSummary {
            size: self.size,
            digests: self
                .hashers
                .into_iter()
                .map(|h| (h.algorithm(), h.finalize_hex()))
                .collect(),
        }
    }
}

impl<R: Read> Read for DigestingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        for hasher in &mut self.hashers {
            hasher.update(&buf[..n]);
        }
        self.size += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digests_while_reading() {
        let data = b"the quick brown fox".to_vec();
        let mut reader = DigestingReader::new(
            data.as_slice(),
            &[DigestAlgorithm::Md5, DigestAlgorithm::Sha512],
        );
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
        assert_eq!(reader.bytes_read(), data.len() as u64);

        let summary = reader.finish();
        assert_eq!(summary.size, data.len() as u64);
        assert_eq!(
            summary.get(DigestAlgorithm::Md5).unwrap(),
            ContentHasher::digest_hex(DigestAlgorithm::Md5, &data)
        );
        assert_eq!(
            summary.get(DigestAlgorithm::Sha512).unwrap(),
            ContentHasher::digest_hex(DigestAlgorithm::Sha512, &data)
        );
        assert!(summary.get(DigestAlgorithm::Sha1).is_none());
    }

    #[test]
    fn duplicate_algorithms_are_collapsed() {
        let reader = DigestingReader::new(
            &b""[..],
            &[DigestAlgorithm::Sha256, DigestAlgorithm::Sha256],
        );
        assert_eq!(reader.finish().iter().count(), 1);
    }

    #[test]
    fn empty_stream() {
        let reader = DigestingReader::new(&b""[..], &[DigestAlgorithm::Md5]);
        let summary = reader.finish();
        assert_eq!(summary.size, 0);
        assert_eq!(
            summary.get(DigestAlgorithm::Md5),
            Some("d41d8cd98f00b204e9800998ecf8427e")
        );
    }
}
