//! Program source: comment stripping and tokenizing

/// Remove parenthesised comments from a line.
///
/// Repeatedly looks at the first bracket on the line. A `)` seen before any
/// `(` is stray and only that character is dropped. A `(` whose depth count
/// returns to zero takes the whole span with it, nested brackets included;
/// an unclosed `(` is dropped on its own and the text after it is kept.
/// Removing a span does not insert whitespace, so `1(x)2` becomes `12`.
pub fn strip_comments(line: &str) -> String {
    let mut chars: Vec<char> = line.chars().collect();

    while let Some(first) = chars.iter().position(|&c| c == '(' || c == ')') {
        if chars[first] == ')' {
            chars.remove(first);
            continue;
        }
        match matching_close(&chars, first) {
            Some(close) => {
                chars.drain(first..=close);
            }
            None => {
                chars.remove(first);
            }
        }
    }

    chars.into_iter().collect()
}

fn matching_close(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &c) in chars.iter().enumerate().skip(open) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip every line and split the result on whitespace, in order
pub fn tokenize<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .flat_map(|line| {
            strip_comments(line.as_ref())
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_simple() {
        assert_eq!(strip_comments("1 2 + ( add them )"), "1 2 + ");
        assert_eq!(strip_comments("no comments here"), "no comments here");
        assert_eq!(strip_comments(""), "");
    }

    #[test]
    fn test_strip_nested() {
        assert_eq!(strip_comments("a (b (c) d) e"), "a  e");
        assert_eq!(strip_comments("(outer (inner))x"), "x");
    }

    #[test]
    fn test_strip_joins_neighbours() {
        assert_eq!(strip_comments("1(x)2"), "12");
    }

    #[test]
    fn test_strip_unclosed_open() {
        // The first '(' never closes, so only it goes; "(b)" then closes
        assert_eq!(strip_comments("a ((b) c"), "a  c");
        assert_eq!(strip_comments("dup ( trailing"), "dup  trailing");
    }

    #[test]
    fn test_strip_stray_close() {
        assert_eq!(strip_comments("a (b) c) d"), "a  c d");
        assert_eq!(strip_comments("x ) y ( z"), "x  y  z");
    }

    #[test]
    fn test_tokenize() {
        let lines = vec![": play ( -- )", "  move! ( step )", ";"];
        assert_eq!(tokenize(&lines), vec![":", "play", "move!", ";"]);
    }
}
