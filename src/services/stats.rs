//! # 텍스트 통계 서비스
//!
//! 문서 본문으로부터 단어 수, 글자 수, 줄 수, 바이트 크기를 계산합니다.
//! 저장할 때마다 본문에서 다시 계산되며, 통계 값을 따로 수정하는 경로는 없습니다.
//!
//! 이 모듈의 함수들:
//! - `compute_stats()`: 네 가지 통계를 한 번에 계산
//! - `count_words()`: 유니코드 문자/숫자 연속 구간의 개수
//! - `count_chars()`: UTF-16 코드 유닛 개수
//! - `count_lines()`: `\n`으로 구분된 줄 수
//! - `size_bytes()`: UTF-8 바이트 길이
//!
//! 모든 함수는 순수 함수이며 실패하지 않습니다.

use crate::models::DocumentStats;

/// 본문의 통계를 한 번에 계산합니다.
///
/// # 예시
/// ```
/// let stats = notara::services::compute_stats("Hello world!");
/// assert_eq!(stats.word_count, 2);
/// assert_eq!(stats.char_count, 12);
/// assert_eq!(stats.line_count, 1);
/// assert_eq!(stats.size_bytes, 12);
/// ```
pub fn compute_stats(text: &str) -> DocumentStats {
    // usize → i64 캐스팅: SQLite의 INTEGER는 i64에 매핑됩니다.
    DocumentStats {
        word_count: count_words(text) as i64,
        char_count: count_chars(text) as i64,
        line_count: count_lines(text) as i64,
        size_bytes: size_bytes(text) as i64,
    }
}

/// 텍스트의 단어 수를 계산합니다.
///
/// 유니코드 문자(letter)나 숫자(digit)가 연속된 최대 구간 하나를 단어 하나로 셉니다.
/// 공백뿐 아니라 구두점도 구분자이므로 축약형(`don't`)과
/// 하이픈 복합어(`well-known`)는 각각 두 단어가 됩니다.
pub fn count_words(text: &str) -> usize {
    // .split(): 클로저가 true를 반환하는 문자마다 자릅니다.
    // 구분자가 연속되면 빈 조각이 생기므로 filter로 걸러냅니다.
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .count()
}

/// 텍스트의 글자 수를 UTF-16 코드 유닛 단위로 계산합니다.
///
/// 브라우저 에디터의 문자열 길이와 같은 기준입니다.
/// BMP 밖의 문자(이모지 등)는 2로 셉니다.
pub fn count_chars(text: &str) -> usize {
    text.encode_utf16().count()
}

/// `\n`으로 구분된 줄 수를 계산합니다.
///
/// 빈 문자열도 1줄이며, 끝에 붙은 줄바꿈 하나는 새 줄로 세지 않습니다.
pub fn count_lines(text: &str) -> usize {
    let lines = text.split('\n').count();
    if lines > 1 && text.ends_with('\n') {
        lines - 1
    } else {
        lines
    }
}

/// UTF-8로 인코딩했을 때의 바이트 길이입니다.
pub fn size_bytes(text: &str) -> usize {
    // Rust의 str은 항상 UTF-8이므로 len()이 곧 바이트 수입니다.
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text() {
        let stats = compute_stats("");
        assert_eq!(
            stats,
            DocumentStats {
                word_count: 0,
                char_count: 0,
                line_count: 1,
                size_bytes: 0,
            }
        );
    }

    #[test]
    fn simple_sentence() {
        let stats = compute_stats("Hello world!");
        assert_eq!(stats.word_count, 2);
        assert_eq!(stats.char_count, 12);
        assert_eq!(stats.line_count, 1);
        assert_eq!(stats.size_bytes, 12);
    }

    #[test]
    fn trailing_newline_is_not_a_line() {
        assert_eq!(count_lines("line1\nline2\n"), 2);
        assert_eq!(count_lines("line1\nline2"), 2);
        assert_eq!(count_lines("\n"), 1);
        assert_eq!(count_lines("a\n\n"), 2);
    }

    #[test]
    fn contractions_and_hyphens_split() {
        assert_eq!(count_words("don't"), 2);
        assert_eq!(count_words("a well-known fact"), 4);
        assert_eq!(count_words("  ...  "), 0);
    }

    #[test]
    fn unicode_words_and_lengths() {
        // 한글 두 단어, 바이트는 글자당 3
        assert_eq!(count_words("안녕 세상"), 2);
        assert_eq!(count_chars("안녕"), 2);
        assert_eq!(size_bytes("안녕"), 6);

        // 이모지는 UTF-16 서로게이트 쌍
        assert_eq!(count_chars("😀"), 2);
        assert_eq!(size_bytes("😀"), 4);
        assert_eq!(count_words("😀"), 0);
    }

    #[test]
    fn digits_count_as_words() {
        assert_eq!(count_words("version 2 of 10"), 4);
    }
}
