//! Table of known VISCA command and reply signatures.
//!
//! Signatures are compared from payload offset 1, i.e. without the SOP byte,
//! since the SOP only encodes sender/receiver addresses. `total_length` counts
//! the bytes between SOP and terminator, parameters included.
//!
//! Order matters: classification is first match among entries of the right
//! length, so entries are kept in the order the device documentation lists them.
use std::fmt;

/// Whether a signature is sent by the controller or by the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternKind {
    Command,
    Reply,
}

/// One known signature.
#[derive(Debug)]
pub struct PatternEntry {
    pub prefix: &'static [u8],
    pub total_length: usize,
    pub comparable_length: usize,
    pub name: &'static str,
    pub kind: PatternKind,
}

impl PatternEntry {
    const fn new(
        prefix: &'static [u8],
        total_length: usize,
        comparable_length: usize,
        name: &'static str,
        kind: PatternKind,
    ) -> Self {
        Self {
            prefix,
            total_length,
            comparable_length,
            name,
            kind,
        }
    }

    const fn command(
        prefix: &'static [u8],
        total: usize,
        compared: usize,
        name: &'static str,
    ) -> Self {
        Self::new(prefix, total, compared, name, PatternKind::Command)
    }

    const fn reply(
        prefix: &'static [u8],
        total: usize,
        compared: usize,
        name: &'static str,
    ) -> Self {
        Self::new(prefix, total, compared, name, PatternKind::Reply)
    }

    /// Framed size (SOP + body + terminator) a packet needs to match this entry.
    pub fn framed_length(&self) -> usize {
        self.total_length + 2
    }

    /// The bytes actually compared, parameters excluded.
    pub fn signature(&self) -> &'static [u8] {
        &self.prefix[..self.comparable_length]
    }
}

/// Stable index into [PATTERNS].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PatternId(pub usize);

impl PatternId {
    pub fn entry(self) -> &'static PatternEntry {
        &PATTERNS[self.0]
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub fn kind(self) -> PatternKind {
        self.entry().kind
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display marker for packets matching no entry.
pub const UNKNOWN_NAME: &str = "??";

pub static PATTERNS: [PatternEntry; 37] = [
    PatternEntry::command(&[0x01, 0x00, 0x01], 3, 3, "CMD: IfClear"),
    // on=0x02 off=0x03
    PatternEntry::command(&[0x01, 0x04, 0x00], 4, 3, "CMD: Power"),
    // stop, tele(2p) or wide(3p) with speed p
    PatternEntry::command(&[0x01, 0x04, 0x07], 4, 3, "CMD: Zoom"),
    PatternEntry::command(&[0x01, 0x04, 0x08], 4, 3, "CMD: Focus"),
    PatternEntry::command(&[0x01, 0x04, 0x0B], 4, 3, "CMD: Iris"),
    PatternEntry::command(&[0x01, 0x04, 0x10, 0x05], 4, 4, "CMD: WBTrigger"),
    PatternEntry::command(&[0x01, 0x04, 0x18, 0x01], 4, 4, "CMD: FocusTrigger"),
    PatternEntry::command(&[0x01, 0x04, 0x35], 4, 3, "CMD: WB"),
    PatternEntry::command(&[0x01, 0x04, 0x36, 0x00], 4, 4, "CMD: DZoom"),
    PatternEntry::command(&[0x01, 0x04, 0x38], 4, 3, "CMD: FocusMode"),
    PatternEntry::command(&[0x01, 0x04, 0x39], 4, 3, "CMD: AE"),
    // four position nibbles
    PatternEntry::command(&[0x01, 0x04, 0x47], 7, 3, "CMD: ZoomDirect"),
    PatternEntry::command(&[0x01, 0x04, 0x62], 4, 3, "CMD: Freeze"),
    // only the "off" form is known, the trailing 0x03 is not compared
    PatternEntry::command(&[0x01, 0x04, 0x74, 0x03], 4, 3, "CMD: Title"),
    PatternEntry::command(&[0x09, 0x04, 0x00], 3, 3, "CMD: PowerInq"),
    PatternEntry::command(&[0x09, 0x04, 0x38], 3, 3, "CMD: FocusModeInq"),
    PatternEntry::command(&[0x09, 0x04, 0x48], 3, 3, "CMD: FocusPositionInq"),
    PatternEntry::command(&[0x09, 0x04, 0x39], 3, 3, "CMD: AEModeInq"),
    PatternEntry::command(&[0x09, 0x04, 0x47], 3, 3, "CMD: ZoomPosInq"),
    PatternEntry::command(&[0x09, 0x04, 0x4B], 3, 3, "CMD: IrisPosInq"),
    PatternEntry::command(&[0x09, 0x04, 0x62], 3, 3, "CMD: FreezeModeInq"),
    // usually broadcast with SOP 0x88
    PatternEntry::command(&[0x30, 0x01], 2, 2, "CMD: SetAdress"),
    // direction: 0=stop 1=left 2=right
    PatternEntry::command(&[0x77, 0x01], 3, 2, "CMD: EXT_Turn"),
    PatternEntry::command(&[0x77, 0x02], 2, 2, "CMD: EXT_Pairing"),
    PatternEntry::reply(&[0x30, 0x02], 2, 2, "RPL: Address"),
    PatternEntry::reply(&[0x40], 1, 1, "RPL: Ack"),
    PatternEntry::reply(&[0x41], 1, 1, "RPL: Ack Sock1"),
    PatternEntry::reply(&[0x42], 1, 1, "RPL: Ack Sock2"),
    // 0x50 is shared by three reply shapes, only the length tells them apart
    PatternEntry::reply(&[0x50], 5, 1, "RPL: Word"),
    PatternEntry::reply(&[0x50], 2, 1, "RPL: Byte"),
    PatternEntry::reply(&[0x50], 1, 1, "RPL: Done"),
    PatternEntry::reply(&[0x51], 1, 1, "RPL: Done Sock1"),
    PatternEntry::reply(&[0x52], 1, 1, "RPL: Done Sock2"),
    PatternEntry::reply(&[0x61, 0x41], 2, 2, "RPL: Not Executable"),
    PatternEntry::reply(&[0x62, 0x41], 2, 2, "RPL: Not Executable Sock2"),
    // must stay behind the "not executable" entries of the same length
    PatternEntry::reply(&[0x61], 2, 1, "RPL: **ERROR**"),
    PatternEntry::reply(&[0x62], 2, 1, "RPL: **ERROR** Sock2"),
];

/// Looks an entry up by its display name.
#[cfg(test)]
pub fn find_by_name(name: &str) -> Option<PatternId> {
    PATTERNS.iter().position(|p| p.name == name).map(PatternId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparable_length_never_exceeds_prefix() {
        for entry in PATTERNS.iter() {
            assert!(entry.comparable_length <= entry.prefix.len(), "{}", entry.name);
            assert!(entry.comparable_length <= entry.total_length, "{}", entry.name);
        }
    }

    #[test]
    fn names_are_unique() {
        for (index, entry) in PATTERNS.iter().enumerate() {
            assert_eq!(find_by_name(entry.name), Some(PatternId(index)));
        }
    }

    #[test]
    fn commands_precede_replies() {
        let first_reply = PATTERNS
            .iter()
            .position(|p| p.kind == PatternKind::Reply)
            .unwrap();
        assert!(PATTERNS[first_reply..].iter().all(|p| p.kind == PatternKind::Reply));
    }
}
