//! @acp:module "Attribute Lists"
//! @acp:summary "Bounded decoder for comma-separated S-57 enumerated lists"
//! @acp:domain symbology
//! @acp:layer parse

/// Maximum number of codes kept from one attribute list
pub const LIST_CAPACITY: usize = 16;

/// @acp:summary "Fixed-capacity list of enumerated attribute codes"
///
/// S-57 list attributes (`COLOUR`, `CATLIT`, `RESTRN`, ...) hold small
/// integers. Values outside `1..=255` and non-numeric fields are skipped;
/// codes past [`LIST_CAPACITY`] are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeList {
    codes: [u8; LIST_CAPACITY],
    len: usize,
}

impl Default for CodeList {
    fn default() -> Self {
        Self {
            codes: [0; LIST_CAPACITY],
            len: 0,
        }
    }
}

impl CodeList {
    pub fn parse(raw: &str) -> Self {
        let mut list = CodeList::default();
        let mut acc: u32 = 0;
        let mut digits = 0usize;
        let mut valid = true;

        for byte in raw.bytes().chain(std::iter::once(b',')) {
            match byte {
                b'0'..=b'9' => {
                    acc = acc.saturating_mul(10).saturating_add((byte - b'0') as u32);
                    digits += 1;
                }
                b',' => {
                    if valid && digits > 0 && (1..=255).contains(&acc) {
                        if list.len == LIST_CAPACITY {
                            tracing::debug!("Attribute list truncated at {} codes: {}", LIST_CAPACITY, raw);
                            break;
                        }
                        list.codes[list.len] = acc as u8;
                        list.len += 1;
                    }
                    acc = 0;
                    digits = 0;
                    valid = true;
                }
                b' ' | b'\t' => {}
                _ => valid = false,
            }
        }

        list
    }

    pub fn from_codes(codes: &[u8]) -> Self {
        let mut list = CodeList::default();
        for &code in codes.iter().take(LIST_CAPACITY) {
            list.codes[list.len] = code;
            list.len += 1;
        }
        list
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.codes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn first(&self) -> Option<u8> {
        self.as_slice().first().copied()
    }

    pub fn contains(&self, code: u8) -> bool {
        self.as_slice().contains(&code)
    }

    pub fn contains_any(&self, codes: &[u8]) -> bool {
        codes.iter().any(|c| self.contains(*c))
    }

    /// Same set of codes, ignoring order and repeats
    pub fn same_set(&self, codes: &[u8]) -> bool {
        self.as_slice().iter().all(|c| codes.contains(c)) && codes.iter().all(|c| self.contains(*c))
    }
}
