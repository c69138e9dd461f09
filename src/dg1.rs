//! Data group 1: the machine readable zone.
//!
//! DG1 is `61 L 5F1F L <MRZ>`. The MRZ is 88 characters for passports (TD3,
//! two lines of 44) and 90 characters for identity cards (TD1, three lines
//! of 30).
//!
//! Identity cards without an MRZ based DG1 (eID) derive a fixed 108 byte
//! DG1 from the TBS certificate of their signing certificate, see
//! [`eid_dg1`].

use alloc::string::{String, ToString};
use der::TagNumber;
use log::trace;

use crate::encoding::strip_application_tag;
use crate::errors::{Error, Result};

/// Tag of the MRZ data object inside DG1.
const MRZ_TAG: [u8; 2] = [0x5F, 0x1F];

/// Length of an eID DG1.
pub const EID_DG1_LEN: usize = 108;

/// Layout of an MRZ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MrzFormat {
    /// Identity card, 3 × 30 characters.
    Td1,
    /// Passport, 2 × 44 characters.
    Td3,
}

impl MrzFormat {
    /// Number of characters.
    pub fn len(&self) -> usize {
        match self {
            MrzFormat::Td1 => 90,
            MrzFormat::Td3 => 88,
        }
    }

    fn from_len(len: usize) -> Option<Self> {
        match len {
            90 => Some(MrzFormat::Td1),
            88 => Some(MrzFormat::Td3),
            _ => None,
        }
    }
}

/// A machine readable zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mrz {
    format: MrzFormat,
    text: String,
}

impl Mrz {
    /// Validates the character set and length of an MRZ.
    pub fn parse(text: &str) -> Result<Self> {
        let format = MrzFormat::from_len(text.len())
            .ok_or_else(|| Error::malformed(format!("MRZ of {} characters", text.len())))?;
        if !text
            .bytes()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == b'<')
        {
            return Err(Error::malformed("MRZ contains invalid characters"));
        }
        Ok(Self {
            format,
            text: text.to_string(),
        })
    }

    /// TD1 or TD3.
    pub fn format(&self) -> MrzFormat {
        self.format
    }

    /// The raw characters.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    fn field(&self, start: usize, end: usize) -> &str {
        &self.text[start..end]
    }

    /// Document code, e.g. `P<` or `ID`.
    pub fn document_code(&self) -> &str {
        self.field(0, 2)
    }

    /// Issuing state or organization.
    pub fn issuing_state(&self) -> String {
        clean(self.field(2, 5))
    }

    /// Document number without filler.
    pub fn document_number(&self) -> String {
        match self.format {
            MrzFormat::Td1 => clean(self.field(5, 14)),
            MrzFormat::Td3 => clean(self.field(44, 53)),
        }
    }

    /// Date of birth, `YYMMDD`.
    pub fn birth_date(&self) -> &str {
        match self.format {
            MrzFormat::Td1 => self.field(30, 36),
            MrzFormat::Td3 => self.field(57, 63),
        }
    }

    /// Sex, `M`, `F` or `<`.
    pub fn sex(&self) -> &str {
        match self.format {
            MrzFormat::Td1 => self.field(37, 38),
            MrzFormat::Td3 => self.field(64, 65),
        }
    }

    /// Date of expiry, `YYMMDD`.
    pub fn expiry_date(&self) -> &str {
        match self.format {
            MrzFormat::Td1 => self.field(38, 44),
            MrzFormat::Td3 => self.field(65, 71),
        }
    }

    /// Nationality.
    pub fn nationality(&self) -> String {
        match self.format {
            MrzFormat::Td1 => clean(self.field(45, 48)),
            MrzFormat::Td3 => clean(self.field(54, 57)),
        }
    }

    fn name_field(&self) -> &str {
        match self.format {
            MrzFormat::Td1 => self.field(60, 90),
            MrzFormat::Td3 => self.field(5, 44),
        }
    }

    /// Primary identifier (surname).
    pub fn primary_identifier(&self) -> String {
        let name = self.name_field();
        let primary = name.split("<<").next().unwrap_or_default();
        clean(primary)
    }

    /// Secondary identifier (given names).
    pub fn secondary_identifier(&self) -> String {
        let name = self.name_field();
        match name.find("<<") {
            Some(at) => clean(&name[at + 2..]),
            None => String::new(),
        }
    }

    /// Whether every check digit matches.
    pub fn check_digits_valid(&self) -> bool {
        let t = &self.text;
        let checks: [(&str, u8); 4] = match self.format {
            MrzFormat::Td1 => [
                (&t[5..14], t.as_bytes()[14]),
                (&t[30..36], t.as_bytes()[36]),
                (&t[38..44], t.as_bytes()[44]),
                ("", b'0'),
            ],
            MrzFormat::Td3 => [
                (&t[44..53], t.as_bytes()[53]),
                (&t[57..63], t.as_bytes()[63]),
                (&t[65..71], t.as_bytes()[71]),
                (&t[72..86], t.as_bytes()[86]),
            ],
        };
        let fields_ok = checks
            .iter()
            .all(|(field, digit)| check_digit(field) == digit.wrapping_sub(b'0'));

        let composite_ok = match self.format {
            MrzFormat::Td1 => {
                let composite: String = [&t[5..30], &t[30..37], &t[38..45], &t[48..59]].concat();
                check_digit(&composite) == t.as_bytes()[59].wrapping_sub(b'0')
            }
            MrzFormat::Td3 => {
                let composite: String = [&t[44..54], &t[57..64], &t[65..87]].concat();
                check_digit(&composite) == t.as_bytes()[87].wrapping_sub(b'0')
            }
        };
        fields_ok && composite_ok
    }
}

fn clean(field: &str) -> String {
    field
        .split('<')
        .filter(|part| !part.is_empty())
        .collect::<alloc::vec::Vec<_>>()
        .join(" ")
}

/// ICAO 9303 check digit: weights 7, 3, 1 over the character values.
pub fn check_digit(field: &str) -> u8 {
    const WEIGHTS: [u32; 3] = [7, 3, 1];
    let sum: u32 = field
        .bytes()
        .enumerate()
        .map(|(i, c)| {
            let value = match c {
                b'0'..=b'9' => u32::from(c - b'0'),
                b'A'..=b'Z' => u32::from(c - b'A') + 10,
                _ => 0,
            };
            value * WEIGHTS[i % 3]
        })
        .sum();
    (sum % 10) as u8
}

/// Decoded data group 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dg1 {
    mrz: Mrz,
}

impl Dg1 {
    /// Parses DG1, with or without the `0x61` wrapper.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let inner = strip_application_tag(bytes, TagNumber::N1)?;
        let value = read_mrz_object(inner)?;
        let text = core::str::from_utf8(value)
            .map_err(|_| Error::malformed("MRZ is not ASCII"))?;
        let mrz = Mrz::parse(text)?;
        trace!("DG1 carries a {:?} MRZ", mrz.format());
        Ok(Self { mrz })
    }

    /// The MRZ.
    pub fn mrz(&self) -> &Mrz {
        &self.mrz
    }
}

/// Value of the `5F1F` data object. DER cannot express two byte tags.
fn read_mrz_object(bytes: &[u8]) -> Result<&[u8]> {
    if !bytes.starts_with(&MRZ_TAG) {
        return Err(Error::malformed("DG1 does not hold an MRZ data object"));
    }
    let rest = &bytes[MRZ_TAG.len()..];
    let (len, header) = match rest.first() {
        Some(&n) if n < 0x80 => (usize::from(n), 1),
        Some(0x81) => (usize::from(*rest.get(1).unwrap_or(&0)), 2),
        _ => return Err(Error::malformed("unsupported MRZ length encoding")),
    };
    rest.get(header..header + len).ok_or(Error::InputTooShort {
        min: MRZ_TAG.len() + header + len,
        len: bytes.len(),
    })
}

struct TbsReader<'a> {
    tbs: &'a [u8],
}

impl TbsReader<'_> {
    fn at(&self, index: usize) -> Result<usize> {
        self.tbs
            .get(index)
            .map(|&b| usize::from(b))
            .ok_or(Error::InputTooShort {
                min: index + 1,
                len: self.tbs.len(),
            })
    }

    /// Length prefixed string at `offset`, laid out as 30 bytes plus the
    /// length in the last byte.
    fn short_string(&self, offset: usize) -> Result<([u8; 31], usize)> {
        let mut out = [0u8; 31];
        let len = self.at(offset)?;
        for (i, slot) in out.iter_mut().take(30).enumerate() {
            if i < len {
                *slot = self.at(offset + 1 + i)? as u8;
            }
        }
        out[30] = len as u8;
        Ok((out, len))
    }
}

/// DG1 of an eID card, taken from fixed positions of the TBS certificate of
/// its signing certificate.
///
/// Layout: country (2), notBefore (13), notAfter (13), a zero byte, given
/// name (31), surname (31), common name (18).
pub fn eid_dg1(tbs: &[u8]) -> Result<[u8; EID_DG1_LEN]> {
    let r = TbsReader { tbs };

    let mut offset = 28;
    offset += r.at(offset)? + 1;
    offset += r.at(offset + 1)? + 2;

    let validity_len = r.at(offset + 3)?;
    let mut validity = [[0u8; 16]; 2];
    for i in 0..16 {
        if i < validity_len {
            validity[0][i] = r.at(offset + 4 + i)? as u8;
            validity[1][i] = r.at(offset + 6 + validity_len + i)? as u8;
        }
    }
    validity[0][15] = validity_len as u8;
    validity[1][15] = validity_len as u8;
    offset += r.at(offset + 1)? + 2;

    let country = [r.at(offset + 13)? as u8, r.at(offset + 14)? as u8];

    offset += r.at(offset + 3)? + 4;
    offset += r.at(offset + 1)? + 2;
    offset += 7 + r.at(offset + 5)?;

    let (given_name, len) = r.short_string(offset)?;
    offset += len + 1;
    offset += 7 + r.at(offset + 5)?;

    let (surname, len) = r.short_string(offset)?;
    offset += len + 1;
    offset += 7 + r.at(offset + 5)?;

    let (common_name, _) = r.short_string(offset)?;

    let mut dg1 = [0u8; EID_DG1_LEN];
    dg1[..2].copy_from_slice(&country);
    dg1[2..15].copy_from_slice(&validity[0][..13]);
    dg1[15..28].copy_from_slice(&validity[1][..13]);
    dg1[28..59].copy_from_slice(&given_name);
    dg1[59..90].copy_from_slice(&surname);
    dg1[90..].copy_from_slice(&common_name[..18]);
    Ok(dg1)
}
