//! Script chunk parsing and push-data encoding.
//!
//! A chunk is either a bare opcode or a data push carrying its bytes.
//! Classification works on chunks; serialization works on raw bytes.

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes (1-75 bytes) this is the length.
    pub op: u8,
    /// The pushed bytes, if this chunk is a push of one or more bytes.
    pub data: Option<Vec<u8>>,
}

impl ScriptChunk {
    /// Check whether this chunk only places data on the stack.
    ///
    /// True for data pushes, `OP_0`, `OP_1NEGATE`, `OP_RESERVED` and
    /// `OP_1`..=`OP_16`.
    pub fn is_push(&self) -> bool {
        self.op <= OP_16
    }

    /// The stack item this chunk pushes, if it is a push.
    ///
    /// Small-integer opcodes yield their minimal number encoding.
    pub fn stack_item(&self) -> Option<Vec<u8>> {
        if let Some(ref data) = self.data {
            return Some(data.clone());
        }
        match self.op {
            OP_0 => Some(Vec::new()),
            OP_1NEGATE => Some(vec![0x81]),
            OP_1..=OP_16 => Some(vec![self.op - OP_1 + 1]),
            _ => None,
        }
    }

    /// Render this chunk as an ASM token.
    pub fn to_asm_string(&self) -> String {
        match self.data {
            Some(ref data) => hex::encode(data),
            None => opcode_to_string(self.op),
        }
    }
}

/// Decode raw script bytes into chunks.
///
/// Fails with [`ScriptError::DataTooSmall`] if a push claims more bytes
/// than remain.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let op = bytes[pos];
        pos += 1;

        let len = match op {
            OP_DATA_1..=OP_DATA_75 => op as usize,
            OP_PUSHDATA1 => read_len(bytes, &mut pos, 1)?,
            OP_PUSHDATA2 => read_len(bytes, &mut pos, 2)?,
            OP_PUSHDATA4 => read_len(bytes, &mut pos, 4)?,
            _ => {
                chunks.push(ScriptChunk { op, data: None });
                continue;
            }
        };

        if bytes.len() - pos < len {
            return Err(ScriptError::DataTooSmall);
        }
        let data = bytes[pos..pos + len].to_vec();
        pos += len;
        chunks.push(ScriptChunk { op, data: Some(data) });
    }

    Ok(chunks)
}

/// Read a little-endian push length of `width` bytes.
fn read_len(bytes: &[u8], pos: &mut usize, width: usize) -> Result<usize, ScriptError> {
    if bytes.len() - *pos < width {
        return Err(ScriptError::DataTooSmall);
    }
    let mut buf = [0u8; 4];
    buf[..width].copy_from_slice(&bytes[*pos..*pos + width]);
    *pos += width;
    Ok(u32::from_le_bytes(buf) as usize)
}

/// Compute the minimal push prefix for a payload of `data_len` bytes.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    if data_len <= OP_DATA_75 as usize {
        Ok(vec![data_len as u8])
    } else if data_len <= 0xff {
        Ok(vec![OP_PUSHDATA1, data_len as u8])
    } else if data_len <= 0xffff {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        Ok(buf)
    } else if data_len <= 0xffff_ffff {
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&(data_len as u32).to_le_bytes());
        Ok(buf)
    } else {
        Err(ScriptError::DataTooBig)
    }
}
