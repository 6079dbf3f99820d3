//! Maps a translated full text back onto the original time-coded segments.
//!
//! There is no word alignment from the services, so each segment gets a slice of the
//! translation proportional to its share of the original characters, extended forward
//! to the next sentence terminator. Timing is copied untouched.

use crate::transcription::TimedSegment;

const TERMINATORS: &[char] = &['.', '!', '?', '。', '，'];

pub fn realign(original_segments: &[TimedSegment], translated_text: &str) -> Vec<TimedSegment> {
    let translated: Vec<char> = translated_text.chars().collect();
    let total = translated.len();

    let original_len: usize = original_segments
        .iter()
        .map(|segment| segment.text.chars().count())
        .sum();
    let ratio = if original_len == 0 {
        1.0
    } else {
        total as f64 / original_len as f64
    };

    let last_index = original_segments.len().saturating_sub(1);
    let mut cursor = 0;

    original_segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            let target_len = (segment.text.chars().count() as f64 * ratio).round() as usize;

            let end = if index == last_index {
                // Whatever is left belongs to the final cue
                total
            } else if target_len == 0 {
                cursor
            } else {
                let mut end = (cursor + target_len).min(total);
                while end < total && !TERMINATORS.contains(&translated[end - 1]) {
                    end += 1;
                }
                end
            };

            let text: String = translated[cursor..end].iter().collect();
            cursor = end;
            segment.with_text(text.trim())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(texts: &[&str]) -> Vec<TimedSegment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| TimedSegment::new(i as f64 * 2.0, i as f64 * 2.0 + 1.5, *text))
            .collect()
    }

    fn texts(segments: &[TimedSegment]) -> Vec<&str> {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_preserves_timing_and_count() {
        let original = segments(&["Hello there.", "How are you?", "Fine, thanks."]);
        let translated = "Bonjour. Comment allez-vous ? Bien, merci.";

        let result = realign(&original, translated);

        assert_eq!(result.len(), original.len());
        for (before, after) in original.iter().zip(&result) {
            assert_eq!(before.start, after.start);
            assert_eq!(before.end, after.end);
        }
    }

    #[test]
    fn test_cuts_at_sentence_terminators() {
        let original = segments(&["Hello there.", "How are you?", "Fine, thanks."]);
        let translated = "Hola amigos. Como estas? Bien, merci.";

        let result = realign(&original, translated);

        assert_eq!(texts(&result), vec!["Hola amigos.", "Como estas?", "Bien, merci."]);
    }

    #[test]
    fn test_every_character_assigned_once_in_order() {
        let original = segments(&["one two three", "four", "five six seven eight", "nine ten"]);
        let translated = "un deux trois. quatre! cinq six sept huit? neuf dix";

        let result = realign(&original, translated);
        let rebuilt: String = result.iter().map(|s| s.text.replace(' ', "")).collect();

        assert_eq!(rebuilt, translated.replace(' ', ""));
    }

    #[test]
    fn test_trailing_segments_empty_when_text_runs_out() {
        let original = segments(&["A short line", "b", "c", "d"]);
        let translated = "Une phrase sans fin";

        let result = realign(&original, translated);

        assert_eq!(texts(&result), vec!["Une phrase sans fin", "", "", ""]);
        assert_eq!(result[3].start, 6.0);
    }

    #[test]
    fn test_empty_original_segments() {
        let original = segments(&["", "", ""]);
        let result = realign(&original, "Texte.");

        assert_eq!(texts(&result), vec!["", "", "Texte."]);
        assert!(realign(&[], "anything").is_empty());
    }

    #[test]
    fn test_cjk_terminators_and_multibyte() {
        let original = segments(&["Good morning.", "See you later."]);
        let translated = "早上好。回头见。";

        let result = realign(&original, translated);

        assert_eq!(texts(&result), vec!["早上好。", "回头见。"]);
    }
}
