use std::io;

use byteorder::{LittleEndian, ReadBytesExt};

use super::SerializationError;

/// Extends [`Read`] with methods for reading Okapi wire types.
///
/// [`Read`]: https://doc.rust-lang.org/std/io/trait.Read.html
pub trait ReadOkapiExt: io::Read {
    /// Read a Bitcoin-style compact size field.
    ///
    /// The encoding must be canonical: a value below the threshold for its
    /// width is rejected.
    #[inline]
    fn read_compactsize(&mut self) -> Result<u64, SerializationError> {
        let flag_byte = self.read_u8()?;
        match flag_byte {
            n @ 0x00..=0xfc => Ok(n as u64),
            0xfd => {
                let n = self.read_u16::<LittleEndian>()?;
                if n < 0xfd {
                    return Err(SerializationError::Parse("non-canonical compactsize"));
                }
                Ok(n as u64)
            }
            0xfe => {
                let n = self.read_u32::<LittleEndian>()?;
                if n < 0x1_0000 {
                    return Err(SerializationError::Parse("non-canonical compactsize"));
                }
                Ok(n as u64)
            }
            0xff => {
                let n = self.read_u64::<LittleEndian>()?;
                if n < 0x1_0000_0000 {
                    return Err(SerializationError::Parse("non-canonical compactsize"));
                }
                Ok(n)
            }
        }
    }

    /// Convenience method to read a `[u8; 32]`.
    #[inline]
    fn read_32_bytes(&mut self) -> io::Result<[u8; 32]> {
        let mut bytes = [0; 32];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

/// Mark all types implementing `Read` as implementing the extension.
impl<R: io::Read + ?Sized> ReadOkapiExt for R {}
