/// Word-level tokenizer for English lyrics and prose.
///
/// Splits on whitespace, peels punctuation off the edges of each chunk,
/// breaks intra-word dashes into their own token and splits clitics
/// ("n't", "'s", "'ll", ...) off the word they attach to. Case is preserved;
/// callers lowercase beforehand when they need to.

/// Splits raw text into lexical tokens.
pub trait Tokenize {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Clitics split off the end of a word, longest first.
const CLITICS: [&str; 7] = ["n't", "'ll", "'re", "'ve", "'s", "'m", "'d"];

const DASHES: [char; 3] = ['-', '–', '—'];

/// Rule-based English tokenizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishTokenizer;

impl Tokenize for EnglishTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        for chunk in text.split_whitespace() {
            split_chunk(chunk, &mut tokens);
        }
        tokens
    }
}

fn is_prefix_punct(c: char) -> bool {
    matches!(
        c,
        '"' | '\'' | '‘' | '’' | '“' | '(' | '[' | '{' | '¿' | '¡' | '`'
    )
}

fn is_suffix_punct(c: char) -> bool {
    matches!(
        c,
        '"' | '\'' | '’' | '”' | ')' | ']' | '}' | ',' | '.' | '!' | '?' | ';' | ':' | '…'
    )
}

fn straighten(s: &str) -> String {
    s.replace(['‘', '’'], "'")
}

fn split_chunk(chunk: &str, out: &mut Vec<String>) {
    // A chunk that is exactly a clitic ("'s", "n't") stays whole
    if CLITICS.contains(&straighten(chunk).to_lowercase().as_str()) {
        out.push(chunk.to_string());
        return;
    }

    let mut rest = chunk;

    while let Some(c) = rest.chars().next() {
        if !is_prefix_punct(c) || rest.len() == c.len_utf8() {
            break;
        }
        out.push(c.to_string());
        rest = &rest[c.len_utf8()..];
    }

    let mut suffixes = Vec::new();
    while let Some(c) = rest.chars().next_back() {
        if rest.len() == c.len_utf8() {
            break;
        }
        if rest.ends_with("...") && rest.len() > 3 {
            suffixes.push("...".to_string());
            rest = &rest[..rest.len() - 3];
            continue;
        }
        if !is_suffix_punct(c) {
            break;
        }
        suffixes.push(c.to_string());
        rest = &rest[..rest.len() - c.len_utf8()];
    }

    split_infixes(rest, out);
    out.extend(suffixes.into_iter().rev());
}

/// Split on dashes sitting between two word characters.
fn split_infixes(word: &str, out: &mut Vec<String>) {
    let chars: Vec<(usize, char)> = word.char_indices().collect();
    let mut start = 0;

    for (i, &(pos, c)) in chars.iter().enumerate() {
        let between_words = i > 0
            && i + 1 < chars.len()
            && chars[i - 1].1.is_alphanumeric()
            && chars[i + 1].1.is_alphanumeric();
        if DASHES.contains(&c) && between_words {
            split_clitic(&word[start..pos], out);
            out.push(c.to_string());
            start = pos + c.len_utf8();
        }
    }

    split_clitic(&word[start..], out);
}

fn split_clitic(word: &str, out: &mut Vec<String>) {
    if word.is_empty() {
        return;
    }

    let lowered = straighten(word).to_lowercase();
    for clitic in CLITICS {
        if lowered.len() > clitic.len() && lowered.ends_with(clitic) {
            // curly apostrophes are multi-byte, so split on char counts
            let keep = word.chars().count() - clitic.chars().count();
            let split_at = word
                .char_indices()
                .nth(keep)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            out.push(word[..split_at].to_string());
            out.push(word[split_at..].to_string());
            return;
        }
    }

    out.push(word.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(text: &str) -> Vec<String> {
        EnglishTokenizer.tokenize(text)
    }

    #[test]
    fn test_basic_tokenize() {
        let tokens = tokenize("Hello, World! This is a test.");
        assert_eq!(tokens, vec!["Hello", ",", "World", "!", "This", "is", "a", "test", "."]);
    }

    #[test]
    fn test_contractions_split() {
        let tokens = tokenize("i'm won't can't");
        assert_eq!(tokens, vec!["i", "'m", "wo", "n't", "ca", "n't"]);
    }

    #[test]
    fn test_all_clitics() {
        let tokens = tokenize("you'd we'll they're we've it's wasn't");
        assert_eq!(
            tokens,
            vec!["you", "'d", "we", "'ll", "they", "'re", "we", "'ve", "it", "'s", "was", "n't"]
        );
    }

    #[test]
    fn test_curly_apostrophes() {
        let tokens = tokenize("i’d don’t");
        assert_eq!(tokens, vec!["i", "’d", "do", "n’t"]);
    }

    #[test]
    fn test_elisions() {
        let tokens = tokenize("and 'cause we're freakin' cool");
        assert_eq!(
            tokens,
            vec!["and", "'", "cause", "we", "'re", "freakin", "'", "cool"]
        );
    }

    #[test]
    fn test_standalone_clitic_kept() {
        assert_eq!(tokenize("'s"), vec!["'s"]);
        assert_eq!(tokenize("'"), vec!["'"]);
    }

    #[test]
    fn test_dashes() {
        assert_eq!(tokenize("hyphenated-phrase"), vec!["hyphenated", "-", "phrase"]);
        assert_eq!(tokenize("wait - what"), vec!["wait", "-", "what"]);
        assert_eq!(tokenize("-start"), vec!["-start"]);
    }

    #[test]
    fn test_brackets_and_ellipsis() {
        assert_eq!(tokenize("(oh...)"), vec!["(", "oh", "...", ")"]);
        assert_eq!(tokenize("\"yes,\" she said"), vec!["\"", "yes", ",", "\"", "she", "said"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t ").is_empty());
    }

    #[test]
    fn test_numbers() {
        assert_eq!(tokenize("verse 1 is ."), vec!["verse", "1", "is", "."]);
    }
}
