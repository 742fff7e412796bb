/// Joins tokens back into English text.
///
/// Tokens are separated by single spaces, except that:
/// - closing punctuation and clitics ("'ll", "n't", ...) attach to the
///   token before them,
/// - the token after an opening bracket attaches to the bracket,
/// - straight quotes alternate between opening (attach right) and closing
///   (attach left), counted separately for `"` and `'`. A single quote
///   after a word ending in "s" is read as a possessive and attaches left.

/// Joins a token sequence into readable text.
pub trait Detokenize {
    fn detokenize(&self, tokens: &[String]) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishDetokenizer;

const CLITICS: [&str; 8] = ["'s", "'m", "'d", "'ll", "'re", "'ve", "n't", "'t"];

fn is_closing(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| matches!(c, ',' | '.' | ';' | ':' | '!' | '?' | '%' | ')' | ']' | '}' | '…'))
}

fn is_opening(token: &str) -> bool {
    matches!(token, "(" | "[" | "{" | "¿" | "¡" | "“")
}

fn is_clitic(token: &str) -> bool {
    CLITICS.contains(&token.replace('’', "'").to_lowercase().as_str())
}

impl Detokenize for EnglishDetokenizer {
    fn detokenize(&self, tokens: &[String]) -> String {
        let mut text = String::new();
        let mut attach_next = true;
        let mut double_quotes = 0usize;
        let mut single_quotes = 0usize;
        let mut prev: &str = "";

        for token in tokens {
            let token = token.as_str();
            let (attach_left, opens) = match token {
                "\"" => {
                    double_quotes += 1;
                    let opens = double_quotes % 2 == 1;
                    (!opens, opens)
                }
                "'" if single_quotes % 2 == 0 && prev.ends_with('s') => (true, false),
                "'" => {
                    single_quotes += 1;
                    let opens = single_quotes % 2 == 1;
                    (!opens, opens)
                }
                _ => (is_closing(token) || is_clitic(token), is_opening(token)),
            };

            if !(attach_left || attach_next) {
                text.push(' ');
            }
            text.push_str(token);

            attach_next = opens;
            prev = token;
        }

        text
    }
}
