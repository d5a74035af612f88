use std::borrow::Cow;

use crate::lexicon::{THE_CONSONANT, THE_VOWEL};
use crate::sources::is_silence;
use crate::{CorpusError, Lexicon, Sentence, SILENCE, WORD_BOUNDARY};

/// Convert normalised text into a word-boundary delimited phone string.
///
/// The result starts with `<w>` and every word or pause is followed by one.
/// Consecutive silences collapse into a single `<sil> <w>`.
///
/// Every non-silence token must be in the dictionary; sentences are filtered
/// for this before they get here.
pub fn phonemise<L: Lexicon + ?Sized>(normalised: &str, lexicon: &L) -> Result<String, CorpusError> {
    let silence_pair = format!("{SILENCE} {WORD_BOUNDARY} ");
    let tokens: Vec<&str> = normalised.split_whitespace().collect();

    let mut phonemised = format!("{WORD_BOUNDARY} ");
    for (i, token) in tokens.iter().enumerate() {
        if !is_silence(token) {
            let key = lookup_key(&tokens, i);
            let phones = lexicon
                .lookup(&key)
                .ok_or_else(|| CorpusError::OutOfVocabulary(token.to_string()))?;
            phonemised.push_str(phones);
            phonemised.push(' ');
            phonemised.push_str(WORD_BOUNDARY);
            phonemised.push(' ');
        } else if !phonemised.ends_with(&silence_pair) {
            phonemised.push_str(&silence_pair);
        }
    }

    phonemised.truncate(phonemised.trim_end().len());
    Ok(phonemised)
}

/// Fill in the `phonemised` field of a sentence.
pub fn phonemise_sentence<L: Lexicon + ?Sized>(
    sentence: &mut Sentence,
    lexicon: &L,
) -> Result<(), CorpusError> {
    sentence.phonemised = Some(phonemise(&sentence.normalised, lexicon)?);
    Ok(())
}

/// The dictionary key for the token at `index`.
///
/// "the" followed by another token resolves to a context key chosen by
/// whether the next token starts with a vowel letter.
pub fn lookup_key<'a>(tokens: &[&'a str], index: usize) -> Cow<'a, str> {
    let token = tokens[index];
    if !token.eq_ignore_ascii_case("the") {
        return Cow::Borrowed(token);
    }
    match tokens.get(index + 1) {
        Some(next) if starts_with_vowel(next) => Cow::Borrowed(THE_VOWEL),
        Some(_) => Cow::Borrowed(THE_CONSONANT),
        None => Cow::Borrowed(token),
    }
}

fn starts_with_vowel(word: &str) -> bool {
    word.chars()
        .next()
        .is_some_and(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
}

#[cfg(test)]
mod tests {
    use super::{lookup_key, phonemise, phonemise_sentence};
    use crate::lexicon::CmuDictionary;
    use crate::{CorpusError, Sentence};

    fn dictionary() -> CmuDictionary {
        CmuDictionary::parse(
            "CAT  K AE1 T\nDOG  D AO1 G\nAPPLE  AE1 P AH0 L\nTHE_VOWEL  DH IY0\nTHE_CONSONANT  DH AH0\n",
        )
        .unwrap()
    }

    #[test]
    fn single_word() {
        assert_eq!(phonemise("cat", &dictionary()).unwrap(), "<w> K AE1 T <w>");
    }

    #[test]
    fn the_depends_on_following_word() {
        let dict = dictionary();
        assert_eq!(
            phonemise("the apple", &dict).unwrap(),
            "<w> DH IY0 <w> AE1 P AH0 L <w>"
        );
        assert_eq!(
            phonemise("The dog", &dict).unwrap(),
            "<w> DH AH0 <w> D AO1 G <w>"
        );
    }

    #[test]
    fn sentence_final_the_uses_plain_lookup() {
        assert_eq!(lookup_key(&["the", "Apple"], 0), "THE_VOWEL");
        assert_eq!(lookup_key(&["the", "<sil>"], 0), "THE_CONSONANT");
        assert_eq!(lookup_key(&["cat", "the"], 1), "the");
        assert_eq!(lookup_key(&["cat", "the"], 0), "cat");
    }

    #[test]
    fn consecutive_silences_collapse() {
        let dict = dictionary();
        let one = phonemise("cat <sil> dog <sil>", &dict).unwrap();
        let many = phonemise("cat <sil> <sil> <sil> dog <sil> <sil>", &dict).unwrap();
        assert_eq!(one, "<w> K AE1 T <w> <sil> <w> D AO1 G <w> <sil> <w>");
        assert_eq!(one, many);
    }

    #[test]
    fn silence_only_is_never_empty() {
        let dict = dictionary();
        assert_eq!(phonemise("<sil> <sil>", &dict).unwrap(), "<w> <sil> <w>");
        assert_eq!(phonemise("", &dict).unwrap(), "<w>");
    }

    #[test]
    fn unknown_word_is_an_error() {
        let err = phonemise("cat yak", &dictionary()).unwrap_err();
        assert!(matches!(err, CorpusError::OutOfVocabulary(word) if word == "yak"));
    }

    #[test]
    fn fills_sentence_field() {
        let mut sentence = Sentence::new("cat", "cat");
        phonemise_sentence(&mut sentence, &dictionary()).unwrap();
        assert_eq!(sentence.phonemised.as_deref(), Some("<w> K AE1 T <w>"));
    }
}
