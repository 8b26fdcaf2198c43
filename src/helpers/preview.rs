const HEAD_CHARS: usize = 20;
const TAIL_CHARS: usize = 5;

/// Shortened form of a bearer token that is safe to put in logs.
pub fn token_preview(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= HEAD_CHARS + TAIL_CHARS {
        return "*".repeat(chars.len().min(8));
    }
    let head: String = chars[..HEAD_CHARS].iter().collect();
    let tail: String = chars[chars.len() - TAIL_CHARS..].iter().collect();
    format!("{head}...{tail}")
}
