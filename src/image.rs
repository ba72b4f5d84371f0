use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::LoadError;
use crate::runtime::MEMORY_MAX;

/// An assembled program: an origin address and the words placed from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    origin: u16,
    words: Vec<u16>,
}

impl Image {
    /// Read an image file of big-endian words.
    pub fn read(path: impl AsRef<Path>) -> Result<Image, LoadError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), "read image");
        Image::from_bytes(&bytes)
    }

    /// Decode big-endian words. The first word is the origin.
    pub fn from_bytes(bytes: &[u8]) -> Result<Image, LoadError> {
        if bytes.len() % 2 != 0 {
            return Err(LoadError::Unaligned { len: bytes.len() });
        }
        let words: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|word| u16::from_be_bytes([word[0], word[1]]))
            .collect();
        Image::from_words(&words)
    }

    /// Origin first, then the program.
    pub fn from_words(raw: &[u16]) -> Result<Image, LoadError> {
        let (&origin, words) = raw.split_first().ok_or(LoadError::Empty)?;
        if origin as usize + words.len() > MEMORY_MAX {
            return Err(LoadError::TooLong {
                origin,
                len: words.len(),
            });
        }
        Ok(Image {
            origin,
            words: words.to_vec(),
        })
    }

    pub fn origin(&self) -> u16 {
        self.origin
    }

    pub fn words(&self) -> &[u16] {
        &self.words
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn big_endian_words() {
        let image = Image::from_bytes(&[0x30, 0x00, 0xf0, 0x25, 0x00, 0x48]).unwrap();
        assert_eq!(image.origin(), 0x3000);
        assert_eq!(image.words(), &[0xf025, 0x0048]);
    }

    #[test]
    fn origin_only() {
        let image = Image::from_bytes(&[0x40, 0x00]).unwrap();
        assert_eq!(image.origin(), 0x4000);
        assert!(image.words().is_empty());
    }

    #[test]
    fn rejects_bad_images() {
        assert!(matches!(Image::from_bytes(&[]), Err(LoadError::Empty)));
        assert!(matches!(
            Image::from_bytes(&[0x30, 0x00, 0xf0]),
            Err(LoadError::Unaligned { len: 3 })
        ));
        assert!(matches!(
            Image::from_words(&[0xfffe, 1, 2, 3]),
            Err(LoadError::TooLong {
                origin: 0xfffe,
                len: 3
            })
        ));
        // Last word at 0xffff
        assert!(Image::from_words(&[0xfffe, 1, 2]).is_ok());
    }

    #[test]
    fn missing_file() {
        let err = Image::read("does/not/exist.obj").unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }
}
