// epg-ingest/src/aribb24.rs

//! ARIB STD-B24 8-unit character code to UTF-8.
//!
//! Covers what EIT text fields use in practice: Kanji (via JIS X 0208),
//! alphanumeric, hiragana, katakana, JIS X 0201 katakana and the common
//! programme marks from the additional symbol rows. Mosaic and DRCS glyphs
//! are dropped; display control functions are skipped with their parameters.

use encoding_rs::EUC_JP;

const ESC: u8 = 0x1B;
const LS0: u8 = 0x0F;
const LS1: u8 = 0x0E;
const SS2: u8 = 0x19;
const SS3: u8 = 0x1D;
const APR: u8 = 0x0D;
const PAPF: u8 = 0x16;
const APS: u8 = 0x1C;
const SP: u8 = 0x20;
const DEL: u8 = 0x7F;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Charset {
    Kanji,
    JisKanjiPlane1,
    JisKanjiPlane2,
    Symbols,
    Alphanumeric,
    Hiragana,
    Katakana,
    JisX0201Katakana,
    Mosaic,
    Drcs { width: usize },
}

impl Charset {
    fn one_byte(final_byte: u8) -> Self {
        match final_byte {
            0x4A | 0x36 => Charset::Alphanumeric,
            0x30 | 0x37 => Charset::Hiragana,
            0x31 | 0x38 => Charset::Katakana,
            0x49 => Charset::JisX0201Katakana,
            _ => Charset::Mosaic,
        }
    }

    fn two_byte(final_byte: u8) -> Self {
        match final_byte {
            0x42 => Charset::Kanji,
            0x39 => Charset::JisKanjiPlane1,
            0x3A => Charset::JisKanjiPlane2,
            0x3B => Charset::Symbols,
            _ => Charset::Drcs { width: 2 },
        }
    }

    fn width(&self) -> usize {
        match self {
            Charset::Kanji | Charset::JisKanjiPlane1 | Charset::JisKanjiPlane2 | Charset::Symbols => 2,
            Charset::Drcs { width } => *width,
            _ => 1,
        }
    }
}

struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
    g: [Charset; 4],
    gl: usize,
    gr: usize,
    single_shift: Option<usize>,
    out: String,
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            g: [
                Charset::Kanji,
                Charset::Alphanumeric,
                Charset::Hiragana,
                Charset::Katakana,
            ],
            gl: 0,
            gr: 2,
            single_shift: None,
            out: String::with_capacity(data.len() * 2),
        }
    }

    fn next(&mut self) -> Option<u8> {
        let b = self.data.get(self.pos).copied();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.data.len());
    }

    fn run(mut self) -> String {
        while let Some(b) = self.next() {
            match b {
                ESC => self.escape(),
                LS0 => self.gl = 0,
                LS1 => self.gl = 1,
                SS2 => self.single_shift = Some(2),
                SS3 => self.single_shift = Some(3),
                APR => self.out.push('\n'),
                PAPF => self.skip(1),
                APS => self.skip(2),
                SP | 0xA0 => self.out.push(' '),
                DEL | 0xFF => {}
                0x21..=0x7E => {
                    let set = self.single_shift.take().unwrap_or(self.gl);
                    self.character(self.g[set], b);
                }
                0xA1..=0xFE => {
                    let set = self.single_shift.take().unwrap_or(self.gr);
                    self.character(self.g[set], b & 0x7F);
                }
                0x80..=0x9F => self.control(b),
                _ => {}
            }
        }
        self.out
    }

    fn escape(&mut self) {
        let Some(b) = self.next() else { return };
        match b {
            // 2-byte G set designation
            0x24 => {
                let Some(b2) = self.next() else { return };
                match b2 {
                    0x28..=0x2B => {
                        let Some(b3) = self.next() else { return };
                        let set = if b3 == SP {
                            self.skip(1);
                            Charset::Drcs { width: 2 }
                        } else {
                            Charset::two_byte(b3)
                        };
                        self.g[(b2 - 0x28) as usize] = set;
                    }
                    _ => self.g[0] = Charset::two_byte(b2),
                }
            }
            // 1-byte G set designation
            0x28..=0x2B => {
                let Some(b2) = self.next() else { return };
                let set = if b2 == SP {
                    self.skip(1);
                    Charset::Drcs { width: 1 }
                } else {
                    Charset::one_byte(b2)
                };
                self.g[(b - 0x28) as usize] = set;
            }
            0x6E => self.gl = 2,
            0x6F => self.gl = 3,
            0x7E => self.gr = 1,
            0x7D => self.gr = 2,
            0x7C => self.gr = 3,
            _ => {}
        }
    }

    fn control(&mut self, b: u8) {
        match b {
            // SZX, FLC, POL, WMM, HLC, RPC
            0x8B | 0x91 | 0x93 | 0x94 | 0x97 | 0x98 => self.skip(1),
            // COL, CDC
            0x90 | 0x92 => {
                if self.data.get(self.pos) == Some(&SP) {
                    self.skip(2);
                } else {
                    self.skip(1);
                }
            }
            // TIME
            0x9D => self.skip(2),
            // MACRO, terminated by MACRO 0x4F
            0x95 => {
                while let Some(m) = self.next() {
                    if m == 0x95 && self.data.get(self.pos) == Some(&0x4F) {
                        self.skip(1);
                        break;
                    }
                }
            }
            // CSI, terminated by a final byte
            0x9B => {
                while let Some(c) = self.next() {
                    if (0x40..=0x7E).contains(&c) {
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    fn character(&mut self, set: Charset, b1: u8) {
        if set.width() == 2 {
            let Some(b2) = self.next() else { return };
            let b2 = b2 & 0x7F;
            match set {
                Charset::Kanji | Charset::JisKanjiPlane1 => self.kanji(b1, b2),
                Charset::Symbols => {
                    if let Some(s) = additional_symbol(b1, b2) {
                        self.out.push_str(s);
                    }
                }
                _ => {}
            }
            return;
        }

        match set {
            Charset::Alphanumeric => self.out.push(match b1 {
                0x5C => '¥',
                0x7E => '‾',
                _ => b1 as char,
            }),
            Charset::Hiragana => {
                if let Some(c) = kana(b1, 0x3041, 0x73, "ゝゞー。「」、・") {
                    self.out.push(c);
                }
            }
            Charset::Katakana => {
                if let Some(c) = kana(b1, 0x30A1, 0x76, "ヽヾー。「」、・") {
                    self.out.push(c);
                }
            }
            Charset::JisX0201Katakana => {
                if (0x21..=0x5F).contains(&b1) {
                    if let Some(c) = char::from_u32(0xFF61 + (b1 - 0x21) as u32) {
                        self.out.push(c);
                    }
                }
            }
            _ => {}
        }
    }

    fn kanji(&mut self, b1: u8, b2: u8) {
        if (0x7A..=0x7E).contains(&b1) {
            if let Some(s) = additional_symbol(b1, b2) {
                self.out.push_str(s);
            }
            return;
        }
        let pair = [b1 | 0x80, b2 | 0x80];
        let (text, _) = EUC_JP.decode_without_bom_handling(&pair);
        self.out.extend(text.chars().filter(|c| *c != '\u{FFFD}'));
    }
}

/// Map a hiragana/katakana set byte: a contiguous run starting at `base`
/// up to `last`, then the shared punctuation at 0x77-0x7E.
fn kana(b: u8, base: u32, last: u8, tail: &str) -> Option<char> {
    match b {
        0x21..=0x7E if b <= last => char::from_u32(base + (b - 0x21) as u32),
        0x77..=0x7E => tail.chars().nth((b - 0x77) as usize),
        _ => None,
    }
}

/// Programme marks from additional symbol row 90.
fn additional_symbol(b1: u8, b2: u8) -> Option<&'static str> {
    if b1 != 0x7A {
        return None;
    }
    let s = match b2 {
        0x50 => "[HV]",
        0x51 => "[SD]",
        0x52 => "[P]",
        0x53 => "[W]",
        0x54 => "[MV]",
        0x55 => "[手]",
        0x56 => "[字]",
        0x57 => "[双]",
        0x58 => "[デ]",
        0x59 => "[S]",
        0x5A => "[二]",
        0x5B => "[多]",
        0x5C => "[解]",
        0x5D => "[SS]",
        0x5E => "[B]",
        0x5F => "[N]",
        0x62 => "[天]",
        0x63 => "[交]",
        0x64 => "[映]",
        0x65 => "[無]",
        0x66 => "[料]",
        0x6A => "[前]",
        0x6B => "[後]",
        0x6C => "[再]",
        0x6D => "[新]",
        0x6E => "[初]",
        0x6F => "[終]",
        0x70 => "[生]",
        0x71 => "[販]",
        0x72 => "[声]",
        0x73 => "[吹]",
        0x74 => "[PPV]",
        _ => return None,
    };
    Some(s)
}

/// Decode an ARIB STD-B24 byte string into UTF-8 text.
///
/// Never fails: undecodable bytes are dropped.
pub fn decode_arib_string(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    Decoder::new(bytes).run()
}
