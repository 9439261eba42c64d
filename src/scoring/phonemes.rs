// Grapheme-to-sound tables for phoneme breakdowns
//
// Alphabetic languages are segmented greedily, two-character graphemes
// before single characters. Korean is segmented per Hangul syllable and
// Japanese per kana (with small ya/yu/yo folded into the preceding kana).

use serde::{Deserialize, Serialize};

pub const UNKNOWN_SOUND: &str = "Unknown sound";

/// Language whose tables drive the breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    Korean,
    Japanese,
}

impl Language {
    /// Parse `en`, `en-US`, `korean`, ...; anything unknown is English
    pub fn from_code(code: &str) -> Self {
        let lowered = code.trim().to_ascii_lowercase();
        let primary = lowered.split(['-', '_']).next().unwrap_or_default();
        match primary {
            "es" | "spanish" => Language::Spanish,
            "fr" | "french" => Language::French,
            "ko" | "korean" => Language::Korean,
            "ja" | "japanese" => Language::Japanese,
            _ => Language::English,
        }
    }

    /// Recognition locale used when the caller gives none
    pub fn default_locale(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Spanish => "es-ES",
            Language::French => "fr-FR",
            Language::Korean => "ko-KR",
            Language::Japanese => "ja-JP",
        }
    }
}

/// One sound unit of a target word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phoneme {
    pub sound: String,
    pub description: String,
}

impl Phoneme {
    fn new(sound: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            sound: sound.into(),
            description: description.into(),
        }
    }

    fn unknown(sound: impl Into<String>) -> Self {
        Self::new(sound, UNKNOWN_SOUND)
    }
}

const ENGLISH: &[(&str, &str)] = &[
    ("th", "Dental fricative, tongue between the teeth (think, this)"),
    ("sh", "Voiceless postalveolar fricative (ship)"),
    ("ch", "Voiceless postalveolar affricate (church)"),
    ("ph", "Voiceless labiodental fricative, same as f (phone)"),
    ("wh", "Labial approximant (what)"),
    ("ng", "Velar nasal, back of tongue to soft palate (sing)"),
    ("ck", "Voiceless velar stop (back)"),
    ("qu", "k followed by w (queen)"),
    ("ee", "Long close front vowel (see)"),
    ("ea", "Long close front vowel (eat)"),
    ("oo", "Close back rounded vowel (food)"),
    ("ai", "Diphthong a-ee (rain)"),
    ("ay", "Diphthong a-ee (day)"),
    ("oa", "Diphthong o-oo (boat)"),
    ("ou", "Diphthong a-oo (out)"),
    ("ow", "Diphthong a-oo or o-oo (cow, snow)"),
    ("oi", "Diphthong o-ee (coin)"),
    ("oy", "Diphthong o-ee (boy)"),
    ("er", "R-coloured central vowel (her)"),
    ("ir", "R-coloured central vowel (bird)"),
    ("ur", "R-coloured central vowel (turn)"),
    ("ar", "Open back vowel with r (car)"),
    ("or", "Mid back rounded vowel with r (for)"),
    ("a", "Open front vowel (cat)"),
    ("b", "Voiced bilabial stop (bat)"),
    ("c", "Voiceless velar stop, or s before e/i (cat, city)"),
    ("d", "Voiced alveolar stop (dog)"),
    ("e", "Mid front vowel (bed)"),
    ("f", "Voiceless labiodental fricative (fish)"),
    ("g", "Voiced velar stop (go)"),
    ("h", "Voiceless glottal fricative (hat)"),
    ("i", "Near-close front vowel (sit)"),
    ("j", "Voiced postalveolar affricate (jam)"),
    ("k", "Voiceless velar stop (kite)"),
    ("l", "Alveolar lateral approximant (leg)"),
    ("m", "Bilabial nasal (man)"),
    ("n", "Alveolar nasal (net)"),
    ("o", "Open-mid back rounded vowel (hot)"),
    ("p", "Voiceless bilabial stop (pen)"),
    ("q", "Voiceless velar stop (Qatar)"),
    ("r", "Alveolar approximant (red)"),
    ("s", "Voiceless alveolar fricative (sun)"),
    ("t", "Voiceless alveolar stop (top)"),
    ("u", "Open-mid central vowel (cup)"),
    ("v", "Voiced labiodental fricative (van)"),
    ("w", "Labial-velar approximant (wet)"),
    ("x", "k followed by s (box)"),
    ("y", "Palatal approximant or vowel (yes, happy)"),
    ("z", "Voiced alveolar fricative (zoo)"),
    ("'", "Contraction, not pronounced"),
];

const SPANISH: &[(&str, &str)] = &[
    ("ch", "Voiceless postalveolar affricate (chico)"),
    ("ll", "Palatal approximant (llave)"),
    ("rr", "Alveolar trill, several tongue taps (perro)"),
    ("qu", "Voiceless velar stop, u is silent (queso)"),
    ("gu", "Voiced velar stop before e/i (guerra)"),
    ("a", "Open central vowel (casa)"),
    ("á", "Stressed open central vowel (está)"),
    ("b", "Voiced bilabial stop or approximant (boca)"),
    ("c", "k, or th/s before e/i (casa, cena)"),
    ("d", "Voiced dental stop, softer between vowels (dedo)"),
    ("e", "Mid front vowel (mesa)"),
    ("é", "Stressed mid front vowel (café)"),
    ("f", "Voiceless labiodental fricative (fuego)"),
    ("g", "Voiced velar stop, or throaty h before e/i (gato, gente)"),
    ("h", "Silent (hola)"),
    ("i", "Close front vowel (sí)"),
    ("í", "Stressed close front vowel (aquí)"),
    ("j", "Voiceless velar fricative (jamón)"),
    ("k", "Voiceless velar stop (kilo)"),
    ("l", "Alveolar lateral (luna)"),
    ("m", "Bilabial nasal (mamá)"),
    ("n", "Alveolar nasal (noche)"),
    ("ñ", "Palatal nasal, like ny (niño)"),
    ("o", "Mid back rounded vowel (todo)"),
    ("ó", "Stressed mid back rounded vowel (canción)"),
    ("p", "Unaspirated bilabial stop (pan)"),
    ("r", "Alveolar tap (pero)"),
    ("s", "Voiceless alveolar fricative (sol)"),
    ("t", "Unaspirated dental stop (tomate)"),
    ("u", "Close back rounded vowel (uno)"),
    ("ú", "Stressed close back rounded vowel (menú)"),
    ("ü", "Pronounced u after g (pingüino)"),
    ("v", "Same as b (vaca)"),
    ("x", "ks, or h in some names (examen, México)"),
    ("y", "Palatal approximant, or i alone (yo, y)"),
    ("z", "th in Spain, s in Latin America (zapato)"),
];

const FRENCH: &[(&str, &str)] = &[
    ("ou", "Close back rounded vowel (vous)"),
    ("oi", "w followed by a (moi)"),
    ("ai", "Open-mid front vowel (lait)"),
    ("au", "Close-mid back rounded vowel (chaud)"),
    ("eu", "Rounded front vowel (deux)"),
    ("an", "Nasal open vowel (dans)"),
    ("en", "Nasal open vowel (enfant)"),
    ("on", "Nasal back vowel (bon)"),
    ("in", "Nasal front vowel (vin)"),
    ("un", "Nasal front vowel (un)"),
    ("ch", "Voiceless postalveolar fricative (chat)"),
    ("gn", "Palatal nasal (montagne)"),
    ("qu", "Voiceless velar stop (qui)"),
    ("ll", "l, or y after i (belle, fille)"),
    ("a", "Open front vowel (ami)"),
    ("à", "Open front vowel (là)"),
    ("â", "Open vowel (pâte)"),
    ("b", "Voiced bilabial stop (bon)"),
    ("c", "k, or s before e/i (café, ici)"),
    ("ç", "Voiceless alveolar fricative (ça)"),
    ("d", "Voiced dental stop (deux)"),
    ("e", "Schwa or silent (le)"),
    ("é", "Close-mid front vowel (été)"),
    ("è", "Open-mid front vowel (père)"),
    ("ê", "Open-mid front vowel (tête)"),
    ("f", "Voiceless labiodental fricative (fille)"),
    ("g", "Voiced velar stop, or zh before e/i (gare, rouge)"),
    ("h", "Silent (homme)"),
    ("i", "Close front vowel (lit)"),
    ("î", "Close front vowel (île)"),
    ("j", "Voiced postalveolar fricative (je)"),
    ("k", "Voiceless velar stop (kilo)"),
    ("l", "Alveolar lateral (lune)"),
    ("m", "Bilabial nasal (mer)"),
    ("n", "Alveolar nasal (non)"),
    ("o", "Mid back rounded vowel (mot)"),
    ("ô", "Close-mid back rounded vowel (hôtel)"),
    ("p", "Unaspirated bilabial stop (pain)"),
    ("r", "Uvular fricative, back of the throat (rouge)"),
    ("s", "Voiceless alveolar fricative, z between vowels (sel, rose)"),
    ("t", "Unaspirated dental stop (tu)"),
    ("u", "Close front rounded vowel, lips rounded for oo (tu)"),
    ("û", "Close front rounded vowel (sûr)"),
    ("v", "Voiced labiodental fricative (vin)"),
    ("w", "Labial-velar approximant (wagon)"),
    ("x", "ks, or silent at the end (taxi, deux)"),
    ("y", "Close front vowel (stylo)"),
    ("z", "Voiced alveolar fricative (zéro)"),
];

const HANGUL_INITIALS: [&str; 19] = [
    "g", "kk", "n", "d", "tt", "r", "m", "b", "pp", "s", "ss", "", "j", "jj", "ch", "k", "t", "p", "h",
];

const HANGUL_MEDIALS: [&str; 21] = [
    "a", "ae", "ya", "yae", "eo", "e", "yeo", "ye", "o", "wa", "wae", "oe", "yo", "u", "wo", "we", "wi",
    "yu", "eu", "ui", "i",
];

const HANGUL_FINALS: [&str; 28] = [
    "", "k", "k", "k", "n", "n", "n", "t", "l", "k", "m", "l", "l", "l", "p", "l", "m", "p", "p", "t",
    "t", "ng", "t", "t", "k", "t", "p", "t",
];

const HANGUL_BASE: u32 = 0xAC00;
const HANGUL_LAST: u32 = 0xD7A3;

const KANA: &[(&str, &str)] = &[
    ("きゃ", "kya"), ("きゅ", "kyu"), ("きょ", "kyo"), ("しゃ", "sha"), ("しゅ", "shu"), ("しょ", "sho"),
    ("ちゃ", "cha"), ("ちゅ", "chu"), ("ちょ", "cho"), ("にゃ", "nya"), ("にゅ", "nyu"), ("にょ", "nyo"),
    ("ひゃ", "hya"), ("ひゅ", "hyu"), ("ひょ", "hyo"), ("みゃ", "mya"), ("みゅ", "myu"), ("みょ", "myo"),
    ("りゃ", "rya"), ("りゅ", "ryu"), ("りょ", "ryo"), ("ぎゃ", "gya"), ("ぎゅ", "gyu"), ("ぎょ", "gyo"),
    ("じゃ", "ja"), ("じゅ", "ju"), ("じょ", "jo"), ("びゃ", "bya"), ("びゅ", "byu"), ("びょ", "byo"),
    ("ぴゃ", "pya"), ("ぴゅ", "pyu"), ("ぴょ", "pyo"),
    ("あ", "a"), ("い", "i"), ("う", "u"), ("え", "e"), ("お", "o"),
    ("か", "ka"), ("き", "ki"), ("く", "ku"), ("け", "ke"), ("こ", "ko"),
    ("さ", "sa"), ("し", "shi"), ("す", "su"), ("せ", "se"), ("そ", "so"),
    ("た", "ta"), ("ち", "chi"), ("つ", "tsu"), ("て", "te"), ("と", "to"),
    ("な", "na"), ("に", "ni"), ("ぬ", "nu"), ("ね", "ne"), ("の", "no"),
    ("は", "ha"), ("ひ", "hi"), ("ふ", "fu"), ("へ", "he"), ("ほ", "ho"),
    ("ま", "ma"), ("み", "mi"), ("む", "mu"), ("め", "me"), ("も", "mo"),
    ("や", "ya"), ("ゆ", "yu"), ("よ", "yo"),
    ("ら", "ra"), ("り", "ri"), ("る", "ru"), ("れ", "re"), ("ろ", "ro"),
    ("わ", "wa"), ("を", "wo"), ("ん", "n"),
    ("が", "ga"), ("ぎ", "gi"), ("ぐ", "gu"), ("げ", "ge"), ("ご", "go"),
    ("ざ", "za"), ("じ", "ji"), ("ず", "zu"), ("ぜ", "ze"), ("ぞ", "zo"),
    ("だ", "da"), ("ぢ", "ji"), ("づ", "zu"), ("で", "de"), ("ど", "do"),
    ("ば", "ba"), ("び", "bi"), ("ぶ", "bu"), ("べ", "be"), ("ぼ", "bo"),
    ("ぱ", "pa"), ("ぴ", "pi"), ("ぷ", "pu"), ("ぺ", "pe"), ("ぽ", "po"),
    ("っ", "Pause before the next consonant (doubled consonant)"),
    ("ー", "Lengthen the previous vowel"),
];

fn lookup(table: &'static [(&'static str, &'static str)], grapheme: &str) -> Option<&'static str> {
    table.iter().find(|(g, _)| *g == grapheme).map(|(_, d)| *d)
}

fn table_for(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::Spanish => SPANISH,
        Language::French => FRENCH,
        Language::English | Language::Korean | Language::Japanese => ENGLISH,
    }
}

/// Break a normalized word into sound units
pub fn segment(word: &str, language: Language) -> Vec<Phoneme> {
    let chars: Vec<char> = word.chars().collect();
    let table = table_for(language);
    let mut phonemes = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(phoneme) = hangul_syllable(c) {
            phonemes.push(phoneme);
            i += 1;
            continue;
        }

        if let Some(kana) = to_hiragana(c) {
            let next = chars.get(i + 1).and_then(|&n| to_hiragana(n));
            if let Some(next) = next.filter(|n| matches!(n, 'ゃ' | 'ゅ' | 'ょ')) {
                let pair: String = [kana, next].iter().collect();
                if let Some(romaji) = lookup(KANA, &pair) {
                    phonemes.push(kana_phoneme(&chars[i..i + 2], romaji));
                    i += 2;
                    continue;
                }
            }
            let single = kana.to_string();
            phonemes.push(match lookup(KANA, &single) {
                Some(romaji) => kana_phoneme(&chars[i..i + 1], romaji),
                None => Phoneme::unknown(c.to_string()),
            });
            i += 1;
            continue;
        }

        // Longest match first
        if i + 1 < chars.len() {
            let pair: String = chars[i..i + 2].iter().collect();
            if let Some(description) = lookup(table, &pair) {
                phonemes.push(Phoneme::new(pair, description));
                i += 2;
                continue;
            }
        }

        let single = c.to_string();
        phonemes.push(match lookup(table, &single) {
            Some(description) => Phoneme::new(single, description),
            None => Phoneme::unknown(single),
        });
        i += 1;
    }

    phonemes
}

fn hangul_syllable(c: char) -> Option<Phoneme> {
    let code = c as u32;
    if !(HANGUL_BASE..=HANGUL_LAST).contains(&code) {
        return None;
    }

    let index = (code - HANGUL_BASE) as usize;
    let initial = HANGUL_INITIALS[index / 588];
    let medial = HANGUL_MEDIALS[(index % 588) / 28];
    let last = HANGUL_FINALS[index % 28];
    let romanized = format!("{}{}{}", initial, medial, last);

    let mut parts = Vec::new();
    if !initial.is_empty() {
        parts.push(initial);
    }
    parts.push(medial);
    if !last.is_empty() {
        parts.push(last);
    }

    Some(Phoneme::new(
        c.to_string(),
        format!("Syllable '{}' ({})", romanized, parts.join(" + ")),
    ))
}

/// Map katakana to hiragana; hiragana and the long-vowel mark pass through
fn to_hiragana(c: char) -> Option<char> {
    match c as u32 {
        0x3041..=0x3096 => Some(c),
        0x30A1..=0x30F6 => char::from_u32(c as u32 - 0x60),
        0x30FC => Some(c),
        _ => None,
    }
}

fn kana_phoneme(original: &[char], romaji: &str) -> Phoneme {
    let sound: String = original.iter().collect();
    if romaji.chars().all(|c| c.is_ascii_lowercase()) {
        Phoneme::new(sound, format!("Syllable '{}'", romaji))
    } else {
        Phoneme::new(sound, romaji)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sounds(word: &str, language: Language) -> Vec<String> {
        segment(word, language).into_iter().map(|p| p.sound).collect()
    }

    #[test]
    fn test_single_letters() {
        assert_eq!(sounds("cat", Language::English), vec!["c", "a", "t"]);
    }

    #[test]
    fn test_digraphs_before_letters() {
        assert_eq!(sounds("think", Language::English), vec!["th", "i", "n", "k"]);
        assert_eq!(sounds("sing", Language::English), vec!["s", "i", "ng"]);
        assert_eq!(sounds("ship", Language::English), vec!["sh", "i", "p"]);
        assert_eq!(sounds("perro", Language::Spanish), vec!["p", "e", "rr", "o"]);
        assert_eq!(sounds("llave", Language::Spanish), vec!["ll", "a", "v", "e"]);
    }

    #[test]
    fn test_unknown_characters() {
        let phonemes = segment("a1", Language::English);
        assert_eq!(phonemes.len(), 2);
        assert_eq!(phonemes[1].sound, "1");
        assert_eq!(phonemes[1].description, UNKNOWN_SOUND);
    }

    #[test]
    fn test_hangul_per_syllable() {
        let phonemes = segment("한국", Language::Korean);
        assert_eq!(phonemes.len(), 2);
        assert_eq!(phonemes[0].sound, "한");
        assert!(phonemes[0].description.contains("'han'"));
        assert!(phonemes[1].description.contains("'guk'"));
    }

    #[test]
    fn test_kana_per_syllable() {
        assert_eq!(sounds("ありがとう", Language::Japanese), vec!["あ", "り", "が", "と", "う"]);
        assert_eq!(sounds("きょう", Language::Japanese), vec!["きょ", "う"]);

        let katakana = segment("カメラ", Language::Japanese);
        assert_eq!(katakana.len(), 3);
        assert!(katakana[0].description.contains("'ka'"));
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("en-US"), Language::English);
        assert_eq!(Language::from_code("ko-KR"), Language::Korean);
        assert_eq!(Language::from_code("ja"), Language::Japanese);
        assert_eq!(Language::from_code("es_MX"), Language::Spanish);
        assert_eq!(Language::from_code("klingon"), Language::English);
        assert_eq!(Language::default(), Language::English);
    }
}
