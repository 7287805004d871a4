use crate::error::{Error, Result};

/// Big-endian cursor over class file bytes.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn read_u1(&mut self) -> Result<u8> {
        let b = *self.bytes.get(self.pos).ok_or(Error::UnexpectedEof)?;
        self.pos += 1;
        Ok(b)
    }

    pub(crate) fn read_u2(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub(crate) fn read_u4(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(Error::UnexpectedEof)?;
        let slice = self.bytes.get(self.pos..end).ok_or(Error::UnexpectedEof)?;
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub(crate) fn ensure_empty(&self) -> Result<()> {
        if self.pos == self.bytes.len() {
            Ok(())
        } else {
            Err(Error::Other("trailing bytes"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_values() {
        let mut reader = Reader::new(&[0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x34, 0x07]);
        assert_eq!(reader.read_u4().unwrap(), 0xCAFEBABE);
        assert_eq!(reader.read_u2().unwrap(), 52);
        assert_eq!(reader.read_u1().unwrap(), 7);
        reader.ensure_empty().unwrap();
    }

    #[test]
    fn reports_eof_instead_of_panicking() {
        let mut reader = Reader::new(&[0x01]);
        assert!(matches!(reader.read_u2(), Err(Error::UnexpectedEof)));
        assert!(matches!(reader.skip(usize::MAX), Err(Error::UnexpectedEof)));
    }
}
