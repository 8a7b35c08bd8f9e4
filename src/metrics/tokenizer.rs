//! Word tokenizers for BLEU scoring.

use regex::Regex;

/// Splits text into word tokens.
pub trait WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String>;

    fn name(&self) -> &'static str;
}

/// Splits on Unicode whitespace only.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl WordTokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}

/// Penn Treebank word tokenizer.
///
/// Splits off punctuation, brackets and quotes, separates clitics such as
/// `n't` and `'s`, and breaks a handful of fused contractions (`cannot`,
/// `gonna`). Rules run as ordered regex substitutions, then the result is split
/// on whitespace.
#[derive(Debug, Clone)]
pub struct TreebankTokenizer {
    starting_quotes: Vec<(Regex, &'static str)>,
    punctuation: Vec<(Regex, &'static str)>,
    brackets: (Regex, &'static str),
    double_dashes: (Regex, &'static str),
    ending_quotes: Vec<(Regex, &'static str)>,
    contractions: Vec<Regex>,
}

fn rule(pattern: &str, replacement: &'static str) -> (Regex, &'static str) {
    // Patterns are fixed literals below; a failure here is a programming error.
    (
        Regex::new(pattern).unwrap_or_else(|e| panic!("invalid tokenizer rule {pattern}: {e}")),
        replacement,
    )
}

impl TreebankTokenizer {
    pub fn new() -> Self {
        let starting_quotes = vec![
            rule(r#"^""#, "``"),
            rule(r"(``)", " ${1} "),
            rule(r#"([ (\[{<])("|'')"#, "${1} `` "),
        ];

        let punctuation = vec![
            rule(r"([:,])([^\d])", " ${1} ${2}"),
            rule(r"([:,])(\n?)$", " ${1} ${2}"),
            rule(r"\.\.\.", " ... "),
            rule(r"[;@#$%&]", " ${0} "),
            rule(r#"([^.])(\.)([\])}>"']*)\s*$"#, "${1} ${2}${3} "),
            rule(r"[?!]", " ${0} "),
            rule(r"([^'])' ", "${1} ' "),
        ];

        let brackets = rule(r"[\]\[(){}<>]", " ${0} ");
        let double_dashes = rule(r"--", " -- ");

        let ending_quotes = vec![
            rule(r#"""#, " '' "),
            rule(r"(\S)('')", "${1} ${2} "),
            rule(r"([^' ])('[sS]|'[mM]|'[dD]|') ", "${1} ${2} "),
            rule(r"([^' ])('ll|'LL|'re|'RE|'ve|'VE|n't|N'T) ", "${1} ${2} "),
        ];

        let contractions = [
            r"(?i)\b(can)(not)\b",
            r"(?i)\b(d)('ye)\b",
            r"(?i)\b(gim)(me)\b",
            r"(?i)\b(gon)(na)\b",
            r"(?i)\b(got)(ta)\b",
            r"(?i)\b(lem)(me)\b",
            r"(?i)\b(more)('n)\b",
            r"(?i)\b(wan)(na)\s",
            r"(?i) ('t)(is)\b",
            r"(?i) ('t)(was)\b",
        ]
        .iter()
        .map(|p| rule(p, "").0)
        .collect();

        Self {
            starting_quotes,
            punctuation,
            brackets,
            double_dashes,
            ending_quotes,
            contractions,
        }
    }
}

impl Default for TreebankTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

fn apply(text: String, rules: &[(Regex, &'static str)]) -> String {
    rules.iter().fold(text, |acc, (re, rep)| {
        re.replace_all(&acc, *rep).into_owned()
    })
}

impl WordTokenizer for TreebankTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut text = apply(text.to_string(), &self.starting_quotes);
        text = apply(text, &self.punctuation);
        text = apply(text, std::slice::from_ref(&self.brackets));
        text = apply(text, std::slice::from_ref(&self.double_dashes));

        text = format!(" {text} ");
        text = apply(text, &self.ending_quotes);
        for re in &self.contractions {
            text = re.replace_all(&text, " ${1} ${2} ").into_owned();
        }

        text.split_whitespace().map(str::to_string).collect()
    }

    fn name(&self) -> &'static str {
        "treebank"
    }
}
