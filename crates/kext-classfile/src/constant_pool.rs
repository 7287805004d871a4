use crate::error::{Error, Result};
use crate::reader::Reader;

/// Constant pool entries.
///
/// Only the entries the header reader dereferences keep their payload; the
/// rest are recorded by kind so index validation and error messages still
/// work.
#[derive(Debug, Clone)]
pub(crate) enum CpInfo {
    Utf8(String),
    Class { name_index: u16 },
    /// Second slot of a `Long`/`Double` entry.
    Unusable,
    Other(&'static str),
}

impl CpInfo {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            CpInfo::Utf8(_) => "Utf8",
            CpInfo::Class { .. } => "Class",
            CpInfo::Unusable => "Unusable",
            CpInfo::Other(kind) => kind,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ConstantPool {
    // Index 0 is never valid; it is stored as `Unusable` to keep indices 1-based.
    entries: Vec<CpInfo>,
}

impl ConstantPool {
    pub(crate) fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count.max(1));
        entries.push(CpInfo::Unusable);

        while entries.len() < count {
            let tag = reader.read_u1()?;
            let (info, wide) = match tag {
                1 => {
                    let len = reader.read_u2()? as usize;
                    let bytes = reader.read_bytes(len)?;
                    (CpInfo::Utf8(decode_modified_utf8(bytes)?), false)
                }
                3 => {
                    reader.skip(4)?;
                    (CpInfo::Other("Integer"), false)
                }
                4 => {
                    reader.skip(4)?;
                    (CpInfo::Other("Float"), false)
                }
                5 => {
                    reader.skip(8)?;
                    (CpInfo::Other("Long"), true)
                }
                6 => {
                    reader.skip(8)?;
                    (CpInfo::Other("Double"), true)
                }
                7 => (
                    CpInfo::Class {
                        name_index: reader.read_u2()?,
                    },
                    false,
                ),
                8 => {
                    reader.skip(2)?;
                    (CpInfo::Other("String"), false)
                }
                9 | 10 | 11 | 12 => {
                    reader.skip(4)?;
                    (CpInfo::Other("Ref"), false)
                }
                15 => {
                    reader.skip(3)?;
                    (CpInfo::Other("MethodHandle"), false)
                }
                16 => {
                    reader.skip(2)?;
                    (CpInfo::Other("MethodType"), false)
                }
                17 | 18 => {
                    reader.skip(4)?;
                    (CpInfo::Other("Dynamic"), false)
                }
                19 | 20 => {
                    reader.skip(2)?;
                    (CpInfo::Other("ModuleOrPackage"), false)
                }
                other => return Err(Error::InvalidConstantPoolTag(other)),
            };
            entries.push(info);
            if wide {
                entries.push(CpInfo::Unusable);
            }
        }

        Ok(Self { entries })
    }

    pub(crate) fn get(&self, index: u16) -> Result<&CpInfo> {
        match self.entries.get(index as usize) {
            Some(CpInfo::Unusable) | None => Err(Error::InvalidConstantPoolIndex(index)),
            Some(info) => Ok(info),
        }
    }

    pub(crate) fn get_utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            CpInfo::Utf8(s) => Ok(s),
            other => Err(Error::ConstantPoolTypeMismatch {
                index,
                expected: "Utf8",
                found: other.kind(),
            }),
        }
    }

    /// Internal name (`java/util/Map$Entry`) of a `Class` entry.
    pub(crate) fn get_class_name(&self, index: u16) -> Result<String> {
        match self.get(index)? {
            CpInfo::Class { name_index } => Ok(self.get_utf8(*name_index)?.to_string()),
            other => Err(Error::ConstantPoolTypeMismatch {
                index,
                expected: "Class",
                found: other.kind(),
            }),
        }
    }
}

/// Decodes the JVM's "modified UTF-8" (CESU-8 surrogates, two-byte NUL).
fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Ok(s.to_string());
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i] as u16;
        if b0 & 0x80 == 0 {
            units.push(b0);
            i += 1;
        } else if b0 & 0xE0 == 0xC0 {
            let b1 = *bytes.get(i + 1).ok_or(Error::InvalidModifiedUtf8)? as u16;
            units.push(((b0 & 0x1F) << 6) | (b1 & 0x3F));
            i += 2;
        } else if b0 & 0xF0 == 0xE0 {
            let b1 = *bytes.get(i + 1).ok_or(Error::InvalidModifiedUtf8)? as u16;
            let b2 = *bytes.get(i + 2).ok_or(Error::InvalidModifiedUtf8)? as u16;
            units.push(((b0 & 0x0F) << 12) | ((b1 & 0x3F) << 6) | (b2 & 0x3F));
            i += 3;
        } else {
            return Err(Error::InvalidModifiedUtf8);
        }
    }

    String::from_utf16(&units).map_err(|_| Error::InvalidModifiedUtf8)
}
