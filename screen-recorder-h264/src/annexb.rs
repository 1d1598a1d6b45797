//! Annex-B byte stream helpers.

/// H.264 NAL unit types the muxer cares about.
pub const NAL_IDR_SLICE: u8 = 5;
pub const NAL_SPS: u8 = 7;
pub const NAL_PPS: u8 = 8;

/// NAL unit type from the first header byte.
pub fn nal_type(nal: &[u8]) -> Option<u8> {
    nal.first().map(|header| header & 0x1F)
}

/// Split an Annex-B stream on its 3- or 4-byte start codes.
///
/// Returned units exclude the start codes. Trailing zero bytes of a unit
/// (`trailing_zero_8bits` padding, or the leading zero of a 4-byte start
/// code) are removed. Bytes before the first start code and empty units are
/// ignored.
pub fn split_nal_units(data: &[u8]) -> Vec<&[u8]> {
    let mut units = Vec::new();
    let mut start: Option<usize> = None;
    let mut i = 0;

    while i + 3 <= data.len() {
        if data[i] == 0 && data[i + 1] == 0 && data[i + 2] == 1 {
            if let Some(s) = start {
                push_unit(&mut units, &data[s..i]);
            }
            i += 3;
            start = Some(i);
        } else {
            i += 1;
        }
    }

    if let Some(s) = start {
        push_unit(&mut units, &data[s..]);
    }
    units
}

fn push_unit<'a>(units: &mut Vec<&'a [u8]>, unit: &'a [u8]) {
    // A 4-byte start code leaves its leading zero on the previous unit.
    let mut end = unit.len();
    while end > 0 && unit[end - 1] == 0 {
        end -= 1;
    }
    if end > 0 {
        units.push(&unit[..end]);
    }
}

/// Concatenate NAL units with 4-byte big-endian length prefixes.
pub fn to_length_prefixed<'a>(units: impl IntoIterator<Item = &'a [u8]>) -> Vec<u8> {
    let mut out = Vec::new();
    for unit in units {
        out.extend_from_slice(&(unit.len() as u32).to_be_bytes());
        out.extend_from_slice(unit);
    }
    out
}
