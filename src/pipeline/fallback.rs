//! Fixed values substituted when a stage cannot produce output.
//!
//! None of these are derived from the complaint text.

/// Category assigned when no classification is available.
pub const MANUAL_REVIEW_CATEGORY: &str = "MANUAL_REVIEW";

pub const FAIL_CLOSED_URGENCY: &str = "HIGH";
pub const DEFAULT_TRIAGE_URGENCY: &str = "MEDIUM";

/// Stored in place of masked text when masking could not be guaranteed.
pub const MASKING_SENTINEL: &str = "[MASKING_ERROR - İçerik korumalı]";

pub const MASKING_UNAVAILABLE_ACTION: &str = "Manuel inceleme gerekli: Maskeleme servisi hatası";
pub const MASKING_EMPTY_ACTION: &str = "Manuel inceleme gerekli: Boş maskeleme yanıtı";
pub const FAIL_CLOSED_REPLY: &str = "Şikayetiniz alındı. Manuel inceleme için yönlendirildi.";

pub const GENERATION_FALLBACK_ACTION: &str =
    "Sistem Hatası: AI yanıt üretemedi. Manuel inceleme gerekli.";
pub const GENERATION_FALLBACK_REPLY: &str =
    "Şikayetiniz alındı. En kısa sürede size dönüş yapılacaktır.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_looks_like_a_placeholder() {
        assert!(MASKING_SENTINEL.starts_with('['));
        assert!(MASKING_SENTINEL.ends_with(']'));
    }

    #[test]
    fn fail_closed_actions_differ_by_cause() {
        assert_ne!(MASKING_UNAVAILABLE_ACTION, MASKING_EMPTY_ACTION);
        assert_ne!(FAIL_CLOSED_REPLY, GENERATION_FALLBACK_REPLY);
    }
}
