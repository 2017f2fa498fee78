use super::bytes::{ByteReader, ByteWriter};
use burrow_dns_domain::name::MAX_NAME_WIRE_LEN;
use burrow_dns_domain::{DomainError, DomainName};

const POINTER_MASK: u8 = 0xC0;
const MAX_POINTER_TARGET: usize = 0x3FFF;

/// The one-entry compression table: the first name written into the
/// message, as forward-order length-prefixed labels (no terminal zero),
/// plus its offset from the header. Reset for every message.
pub(super) struct CompressionSlot {
    name: Vec<u8>,
    offset: usize,
}

impl CompressionSlot {
    pub(super) fn empty() -> Self {
        Self {
            name: Vec::new(),
            offset: 0,
        }
    }

    fn is_occupied(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Forward-order length-prefixed labels without the terminal zero.
fn wire_label_bytes(name: &DomainName) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(name.wire_len() - 1);
    for label in name.wire_labels() {
        bytes.push(label.len() as u8);
        bytes.extend_from_slice(label);
    }
    bytes
}

/// Byte offsets at which each label starts within `wire`.
fn label_offsets(wire: &[u8]) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut pos = 0;
    while pos < wire.len() {
        offsets.push(pos);
        pos += 1 + wire[pos] as usize;
    }
    offsets
}

/// Longest run of trailing labels shared by `new` and `stored`. Returns
/// the prefix length to emit from `new` and the offset of the shared
/// suffix within `stored`.
fn longest_common_suffix(new: &[u8], stored: &[u8]) -> Option<(usize, usize)> {
    let new_offsets = label_offsets(new);
    let stored_offsets = label_offsets(stored);

    let mut shared = 0;
    for k in 1..=new_offsets.len().min(stored_offsets.len()) {
        let a = new_offsets[new_offsets.len() - k];
        let b = stored_offsets[stored_offsets.len() - k];
        if new[a..] == stored[b..] {
            shared = k;
        } else {
            break;
        }
    }
    if shared == 0 {
        return None;
    }
    Some((
        new_offsets[new_offsets.len() - shared],
        stored_offsets[stored_offsets.len() - shared],
    ))
}

/// Writes `name`, reusing the slot's suffix via a pointer when possible.
/// The first name written claims the slot instead.
pub(super) fn write_name(w: &mut ByteWriter, name: &DomainName, slot: &mut CompressionSlot) {
    let wire = wire_label_bytes(name);

    if slot.is_occupied() {
        if let Some((prefix_len, suffix_offset)) = longest_common_suffix(&wire, &slot.name) {
            let target = slot.offset + suffix_offset;
            if target <= MAX_POINTER_TARGET {
                w.write_slice(&wire[..prefix_len]);
                w.write_u16(0xC000 | target as u16);
                return;
            }
        }
    } else {
        slot.name = wire.clone();
        slot.offset = w.len();
    }

    w.write_slice(&wire);
    w.write_u8(0);
}

/// Reads a name from the cursor. A length byte with the top two bits set,
/// together with the next byte, is a 14-bit offset from the header; the
/// cursor advances exactly two bytes past the first pointer and decoding
/// continues at the target. Pointers must point strictly backwards and may
/// not revisit an offset.
pub(super) fn read_name(r: &mut ByteReader<'_>) -> Result<DomainName, DomainError> {
    let mut labels: Vec<Vec<u8>> = Vec::new();
    let mut visited: Vec<usize> = Vec::new();
    let mut cursor = r.pos();
    let mut jumped = false;
    let mut wire_len = 1usize;

    loop {
        let len = r.byte_at(cursor)?;
        if len & POINTER_MASK == POINTER_MASK {
            let lo = r.byte_at(cursor + 1)?;
            let target = (((len & !POINTER_MASK) as usize) << 8) | lo as usize;
            if !jumped {
                r.set_pos(cursor + 2)?;
                jumped = true;
            }
            if target >= cursor || visited.contains(&target) {
                return Err(DomainError::FormatError(format!(
                    "bad compression pointer to offset {}",
                    target
                )));
            }
            visited.push(target);
            cursor = target;
            continue;
        }
        if len & POINTER_MASK != 0 {
            return Err(DomainError::FormatError(format!(
                "bad label length byte {:#04x}",
                len
            )));
        }
        if len == 0 {
            if !jumped {
                r.set_pos(cursor + 1)?;
            }
            break;
        }

        let len = len as usize;
        wire_len += 1 + len;
        if wire_len > MAX_NAME_WIRE_LEN {
            return Err(DomainError::FormatError(format!(
                "name longer than {} bytes",
                MAX_NAME_WIRE_LEN
            )));
        }
        labels.push(r.slice_at(cursor + 1, len)?.to_vec());
        cursor += 1 + len;
    }

    DomainName::from_wire_labels(labels)
}
