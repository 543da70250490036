/// Split a command line into space-delimited tokens.
///
/// Splits strictly on the single-space character: runs of spaces and a
/// leading/trailing space all yield empty tokens, so the number of tokens
/// is always one plus the number of spaces. No quoting, no escaping. The
/// empty line yields a single empty token.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split(' ').map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_yields_one_empty_token() {
        assert_eq!(tokenize(""), vec![""]);
    }

    #[test]
    fn single_token() {
        assert_eq!(tokenize("quit"), vec!["quit"]);
    }

    #[test]
    fn token_count_is_spaces_plus_one() {
        let tokens = tokenize("run /bin/echo hi");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens, vec!["run", "/bin/echo", "hi"]);
    }

    #[test]
    fn leading_and_trailing_spaces_yield_empty_tokens() {
        assert_eq!(tokenize(" out 0"), vec!["", "out", "0"]);
        assert_eq!(tokenize("out 0 "), vec!["out", "0", ""]);
    }

    #[test]
    fn run_of_spaces_yields_empty_tokens_between() {
        assert_eq!(tokenize("out  0"), vec!["out", "", "0"]);
    }
}
