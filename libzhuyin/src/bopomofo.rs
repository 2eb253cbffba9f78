/*!
Bopomofo syllable encoding - `libzhuyin/src/bopomofo.rs`

Every syllable is packed into a single `char`:

```text
code = consonant << 9 | medial << 7 | rhyme << 3 | tone
```

with consonants ㄅ..ㄙ numbered 1..=21, medials ㄧㄨㄩ 1..=3, rhymes
ㄚ..ㄦ 1..=13 and tones ˉˊˇˋ˙ 1..=5 (0 means "absent"). The largest code is
0x2BED, so every code is a valid scalar value.

Symbols are grouped into syllables left to right. A symbol starts a new
syllable when the current one already carries a tone, or:
- by default, when its class does not come after the previous symbol's class
  (consonant < medial < rhyme < tone);
- in reorder mode, when the slot for its class is already filled, so
  "ㄠㄏ" still groups as ㄏㄠ.

The compact encoding drops the tone of every syllable that has another
component, so one dictionary key covers all tone variants. The lossless
encoding keeps it. Characters that are not Bopomofo pass through both
unchanged.

Tones typed by the user still narrow a lookup: a phrase stored with its
lossless reading only fits when every typed tone agrees with the reading
(see [`tones_fit`]). A syllable typed without a tone fits any tone. A stored
syllable without a tone mark reads as first tone, as Zhuyin writes it.

Only 'ˉ' marks the first tone by default. [`BopomofoCodec::with_space_tone`]
also lets a space typed after pending symbols mark it; a space with nothing
pending is always an ordinary key.
*/

use composer_core::SyllableCodec;
use phf::phf_map;

/// Position of a symbol inside a syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolClass {
    Consonant,
    Medial,
    Rhyme,
    Tone,
}

static CONSONANTS: phf::Map<char, u32> = phf_map! {
    'ㄅ' => 1, 'ㄆ' => 2, 'ㄇ' => 3, 'ㄈ' => 4,
    'ㄉ' => 5, 'ㄊ' => 6, 'ㄋ' => 7, 'ㄌ' => 8,
    'ㄍ' => 9, 'ㄎ' => 10, 'ㄏ' => 11,
    'ㄐ' => 12, 'ㄑ' => 13, 'ㄒ' => 14,
    'ㄓ' => 15, 'ㄔ' => 16, 'ㄕ' => 17, 'ㄖ' => 18,
    'ㄗ' => 19, 'ㄘ' => 20, 'ㄙ' => 21,
};

static MEDIALS: phf::Map<char, u32> = phf_map! {
    'ㄧ' => 1, 'ㄨ' => 2, 'ㄩ' => 3,
};

static RHYMES: phf::Map<char, u32> = phf_map! {
    'ㄚ' => 1, 'ㄛ' => 2, 'ㄜ' => 3, 'ㄝ' => 4,
    'ㄞ' => 5, 'ㄟ' => 6, 'ㄠ' => 7, 'ㄡ' => 8,
    'ㄢ' => 9, 'ㄣ' => 10, 'ㄤ' => 11, 'ㄥ' => 12,
    'ㄦ' => 13,
};

static TONES: phf::Map<char, u32> = phf_map! {
    'ˉ' => 1, 'ˊ' => 2, 'ˇ' => 3, 'ˋ' => 4, '˙' => 5,
};

const CONSONANT_SYMBOLS: [char; 21] = [
    'ㄅ', 'ㄆ', 'ㄇ', 'ㄈ', 'ㄉ', 'ㄊ', 'ㄋ', 'ㄌ', 'ㄍ', 'ㄎ', 'ㄏ', 'ㄐ', 'ㄑ', 'ㄒ', 'ㄓ',
    'ㄔ', 'ㄕ', 'ㄖ', 'ㄗ', 'ㄘ', 'ㄙ',
];
const MEDIAL_SYMBOLS: [char; 3] = ['ㄧ', 'ㄨ', 'ㄩ'];
const RHYME_SYMBOLS: [char; 13] = [
    'ㄚ', 'ㄛ', 'ㄜ', 'ㄝ', 'ㄞ', 'ㄟ', 'ㄠ', 'ㄡ', 'ㄢ', 'ㄣ', 'ㄤ', 'ㄥ', 'ㄦ',
];
const TONE_SYMBOLS: [char; 5] = ['ˉ', 'ˊ', 'ˇ', 'ˋ', '˙'];

/// Class and 1-based index of a Bopomofo symbol.
pub fn symbol_class(ch: char) -> Option<(SymbolClass, u32)> {
    if let Some(&v) = CONSONANTS.get(&ch) {
        Some((SymbolClass::Consonant, v))
    } else if let Some(&v) = MEDIALS.get(&ch) {
        Some((SymbolClass::Medial, v))
    } else if let Some(&v) = RHYMES.get(&ch) {
        Some((SymbolClass::Rhyme, v))
    } else {
        TONES.get(&ch).map(|&v| (SymbolClass::Tone, v))
    }
}

pub fn is_bopomofo_symbol(ch: char) -> bool {
    symbol_class(ch).is_some()
}

/// One syllable, component by component. 0 marks an empty slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Syllable {
    pub consonant: u32,
    pub medial: u32,
    pub rhyme: u32,
    pub tone: u32,
}

impl Syllable {
    pub fn is_empty(&self) -> bool {
        self.code() == 0
    }

    pub fn get(&self, class: SymbolClass) -> u32 {
        match class {
            SymbolClass::Consonant => self.consonant,
            SymbolClass::Medial => self.medial,
            SymbolClass::Rhyme => self.rhyme,
            SymbolClass::Tone => self.tone,
        }
    }

    pub fn set(&mut self, class: SymbolClass, value: u32) {
        match class {
            SymbolClass::Consonant => self.consonant = value,
            SymbolClass::Medial => self.medial = value,
            SymbolClass::Rhyme => self.rhyme = value,
            SymbolClass::Tone => self.tone = value,
        }
    }

    pub fn code(&self) -> u32 {
        self.consonant << 9 | self.medial << 7 | self.rhyme << 3 | self.tone
    }

    /// Unpack a code; `None` when a field is out of range or the code is 0.
    pub fn from_code(code: u32) -> Option<Self> {
        let syllable = Syllable {
            consonant: code >> 9,
            medial: (code >> 7) & 0b11,
            rhyme: (code >> 3) & 0b1111,
            tone: code & 0b111,
        };
        let in_range = code != 0
            && syllable.consonant <= 21
            && syllable.rhyme <= 13
            && syllable.tone <= 5;
        in_range.then_some(syllable)
    }

    /// The syllable with its tone dropped, unless the tone is all it has.
    pub fn compact(self) -> Self {
        if self.consonant | self.medial | self.rhyme == 0 {
            self
        } else {
            Syllable { tone: 0, ..self }
        }
    }

    // Dictionary readings leave the first tone unmarked.
    fn stored_tone(&self) -> u32 {
        self.tone.max(1)
    }

    pub fn to_char(&self) -> char {
        char::from_u32(self.code()).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    /// Symbols in consonant, medial, rhyme, tone order.
    pub fn symbols(&self) -> String {
        let mut out = String::new();
        let slots: [(u32, &[char]); 4] = [
            (self.consonant, &CONSONANT_SYMBOLS),
            (self.medial, &MEDIAL_SYMBOLS),
            (self.rhyme, &RHYME_SYMBOLS),
            (self.tone, &TONE_SYMBOLS),
        ];
        for (value, table) in slots {
            if value > 0 {
                if let Some(&ch) = table.get(value as usize - 1) {
                    out.push(ch);
                }
            }
        }
        out
    }
}

/// How to group and pack symbols.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Group by free slot instead of by symbol order.
    pub reorder: bool,
    /// Keep tones on every syllable.
    pub lossless: bool,
}

/// Split `symbols` into syllables. Non-Bopomofo characters come back as `Err`.
pub fn syllables(symbols: &str, reorder: bool) -> Vec<Result<Syllable, char>> {
    let mut out = Vec::new();
    let mut current = Syllable::default();
    let mut last: Option<SymbolClass> = None;

    for ch in symbols.chars() {
        let Some((class, value)) = symbol_class(ch) else {
            if !current.is_empty() {
                out.push(Ok(current));
            }
            current = Syllable::default();
            last = None;
            out.push(Err(ch));
            continue;
        };

        let starts_new = current.tone != 0
            || if reorder {
                current.get(class) != 0
            } else {
                last.map_or(false, |prev| class <= prev)
            };
        if starts_new && !current.is_empty() {
            out.push(Ok(current));
            current = Syllable::default();
        }

        current.set(class, value);
        last = Some(class);
    }

    if !current.is_empty() {
        out.push(Ok(current));
    }
    out
}

/// Encode with explicit options.
pub fn encode_with(symbols: &str, options: EncodeOptions) -> String {
    syllables(symbols, options.reorder)
        .into_iter()
        .map(|s| match s {
            Ok(syllable) if options.lossless => syllable.to_char(),
            Ok(syllable) => syllable.compact().to_char(),
            Err(ch) => ch,
        })
        .collect()
}

/// Compact encoding: one char per syllable, tones folded.
pub fn encode(symbols: &str) -> String {
    encode_with(symbols, EncodeOptions::default())
}

/// Lossless encoding: one char per syllable, tones kept.
pub fn encode_lossless(symbols: &str) -> String {
    encode_with(
        symbols,
        EncodeOptions {
            reorder: false,
            lossless: true,
        },
    )
}

/// Whether every tone in the lossless `typed` syllables agrees with the
/// lossless `reading` of a stored phrase. Toneless typed syllables fit any
/// tone and an unmarked stored syllable reads as first tone. Readings of a
/// different length, or chars that are not syllable codes, always fit.
pub fn tones_fit(typed: &str, reading: &str) -> bool {
    if typed.chars().count() != reading.chars().count() {
        return true;
    }
    typed.chars().zip(reading.chars()).all(|(t, r)| {
        match (Syllable::from_code(t as u32), Syllable::from_code(r as u32)) {
            (Some(t), Some(r)) => t.tone == 0 || t.tone == r.stored_tone(),
            _ => true,
        }
    })
}

/// Render encoded syllables as Bopomofo. Chars that are not syllable codes
/// are copied as they are.
pub fn decode(encoded: &str) -> String {
    let mut out = String::new();
    for ch in encoded.chars() {
        match Syllable::from_code(ch as u32) {
            Some(syllable) => out.push_str(&syllable.symbols()),
            None => out.push(ch),
        }
    }
    out
}

/// Rewrite `symbols` with every syllable in canonical order.
pub fn reorder(symbols: &str) -> String {
    decode(&encode_with(
        symbols,
        EncodeOptions {
            reorder: true,
            lossless: true,
        },
    ))
}

/// [`SyllableCodec`] over the Bopomofo encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BopomofoCodec {
    space_tone: bool,
}

impl BopomofoCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a space typed after pending symbols as the first tone 'ˉ'.
    pub fn with_space_tone(mut self, enabled: bool) -> Self {
        self.space_tone = enabled;
        self
    }

    pub fn space_tone(&self) -> bool {
        self.space_tone
    }
}

impl SyllableCodec for BopomofoCodec {
    fn is_symbol(&self, ch: char) -> bool {
        is_bopomofo_symbol(ch)
    }

    fn encode(&self, symbols: &str) -> String {
        encode(symbols)
    }

    fn encode_lossless(&self, symbols: &str) -> String {
        encode_lossless(symbols)
    }

    fn decode(&self, encoded: &str) -> String {
        decode(encoded)
    }

    fn reorder(&self, symbols: &str) -> String {
        reorder(symbols)
    }

    fn pending_symbol(&self, ch: char) -> Option<char> {
        (self.space_tone && ch == ' ').then_some('ˉ')
    }

    fn reading_matches(&self, typed: &str, reading: &str) -> bool {
        tones_fit(typed, reading)
    }
}
