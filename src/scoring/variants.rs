// Accepted renderings of common words
//
// Recognizers often return contractions without apostrophes, phonetic
// spellings, or digits for number words. A transcript word listed here for
// a target word counts as a match even when edit distance says otherwise.

/// Known variants for a (lowercased) target word
pub fn variants_for(word: &str) -> &'static [&'static str] {
    match word {
        "don't" => &["dont", "dun", "don"],
        "can't" => &["cant", "can", "cannot", "kant"],
        "won't" => &["wont", "wun"],
        "it's" => &["its", "is"],
        "i'm" => &["im", "am"],
        "you're" => &["youre", "your", "yer"],
        "they're" => &["theyre", "their", "there"],
        "we're" => &["were"],
        "that's" => &["thats"],
        "what's" => &["whats", "wats"],
        "let's" => &["lets"],
        "isn't" => &["isnt"],
        "doesn't" => &["doesnt", "dunno"],
        "didn't" => &["didnt"],
        "going" => &["gonna", "goin"],
        "want" => &["wanna", "wan"],
        "got" => &["gotta", "gat"],
        "you" => &["ya", "u", "yu", "yeah"],
        "your" => &["yer", "you're", "ur"],
        "are" => &["r", "ar"],
        "to" => &["too", "two", "2"],
        "too" => &["to", "two"],
        "two" => &["to", "too", "2"],
        "for" => &["four", "4", "fer"],
        "four" => &["for", "4"],
        "one" => &["won", "1"],
        "three" => &["3", "tree", "free"],
        "five" => &["5"],
        "eight" => &["ate", "8"],
        "the" => &["da", "tha", "duh", "a"],
        "this" => &["dis", "thiss"],
        "that" => &["dat"],
        "them" => &["dem", "em"],
        "there" => &["their", "they're", "dere"],
        "their" => &["there", "they're"],
        "think" => &["tink", "fink"],
        "thank" => &["tank", "fank"],
        "thanks" => &["tanks", "thx", "fanks"],
        "hello" => &["hallo", "helo", "hullo"],
        "okay" => &["ok", "o.k"],
        "ok" => &["okay"],
        "because" => &["cause", "cuz", "coz"],
        "really" => &["rly", "realy"],
        "water" => &["wader", "watter"],
        "very" => &["berry", "vary"],
        "right" => &["write", "rite", "light"],
        "write" => &["right", "rite"],
        "light" => &["right", "lite"],
        "rice" => &["lice"],
        "hear" => &["here"],
        "here" => &["hear"],
        "know" => &["no"],
        "no" => &["know"],
        "see" => &["sea", "c"],
        "sea" => &["see"],
        "by" => &["buy", "bye"],
        "buy" => &["by", "bye"],
        "would" => &["wood"],
        "wood" => &["would"],
        "weather" => &["whether"],
        "whether" => &["weather"],
        _ => &[],
    }
}

/// Whether `candidate` is a known variant of `target`
pub fn is_variant(target: &str, candidate: &str) -> bool {
    variants_for(target).contains(&candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contractions() {
        assert!(is_variant("don't", "dont"));
        assert!(is_variant("don't", "dun"));
        assert!(!is_variant("dont", "don't"));
    }

    #[test]
    fn test_unknown_word_has_no_variants() {
        assert!(variants_for("xylophone").is_empty());
        assert!(!is_variant("xylophone", "xylofone"));
    }
}
