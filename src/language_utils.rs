use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Subtitle stream tags come in both ISO 639-1 (2-letter) and ISO 639-2
/// (3-letter) flavors, and muxers are not consistent about which. These
/// helpers normalize and compare codes so that "en", "eng" and "English"
/// all select the same track.
/// Normalize a language code to an isolang Language, accepting 639-1,
/// 639-3 and the common 639-2/B aliases
pub fn parse_language_code(code: &str) -> Option<Language> {
    let normalized = code.trim().to_lowercase();

    match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(&normalized).or_else(|| {
            // 639-2/B codes that differ from 639-2/T
            let part2t = match normalized.as_str() {
                "fre" => "fra",
                "ger" => "deu",
                "dut" => "nld",
                "gre" => "ell",
                "chi" => "zho",
                "cze" => "ces",
                "ice" => "isl",
                "alb" => "sqi",
                "arm" => "hye",
                "baq" => "eus",
                "bur" => "mya",
                "per" => "fas",
                "geo" => "kat",
                "may" => "msa",
                "mac" => "mkd",
                "rum" => "ron",
                "slo" => "slk",
                "wel" => "cym",
                _ => return None,
            };
            Language::from_639_3(part2t)
        }),
        _ => None,
    }
}

/// Check whether two language codes refer to the same language
pub fn language_codes_match(a: &str, b: &str) -> bool {
    if a.trim().eq_ignore_ascii_case(b.trim()) {
        return true;
    }

    match (parse_language_code(a), parse_language_code(b)) {
        (Some(lang_a), Some(lang_b)) => lang_a == lang_b,
        _ => false,
    }
}

/// English name for a language code, for log and title matching
pub fn language_name(code: &str) -> Option<&'static str> {
    parse_language_code(code).map(|lang| lang.to_name())
}
