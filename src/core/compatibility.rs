//! Static personality-type compatibility table.

/// All sixteen recognised personality codes
pub const PERSONALITY_TYPES: [&str; 16] = [
    "INFP", "ENFP", "INFJ", "ENFJ", "INTJ", "ENTJ", "INTP", "ENTP",
    "ISFP", "ESFP", "ISTP", "ESTP", "ISFJ", "ESFJ", "ISTJ", "ESTJ",
];

/// Preferred counterpart codes for `code`, in preference order
///
/// Unknown codes have no compatible set.
pub fn compatible_types(code: &str) -> &'static [&'static str] {
    match code {
        "INFP" => &["ENFJ", "ENTJ"],
        "ENFP" => &["INFJ", "INTJ"],
        "INFJ" => &["ENFP", "ENTP"],
        "ENFJ" => &["INFP", "ISFP"],
        "INTJ" => &["ENFP", "ENTP"],
        "ENTJ" => &["INFP", "INTP"],
        "INTP" => &["ENTJ", "ISTJ"],
        "ENTP" => &["INFJ", "INTJ"],
        "ISFP" => &["ESFJ", "ESTJ", "ESTP"],
        "ESFP" => &["ISFJ", "ISTJ"],
        "ISTP" => &["ESFJ", "ESTJ"],
        "ESTP" => &["ISFJ", "ISTJ"],
        "ISFJ" => &["ESFP", "ESTP"],
        "ESFJ" => &["ISFP", "ISTP"],
        "ISTJ" => &["ESFP", "ESTP"],
        "ESTJ" => &["ISFP", "ISTP"],
        _ => &[],
    }
}

/// Whether `other` is in the preferred set of `code`
///
/// Directional: `is_compatible("ISFP", "ESTP")` holds but not the reverse.
#[inline]
pub fn is_compatible(code: &str, other: &str) -> bool {
    compatible_types(code).iter().any(|candidate| *candidate == other)
}

pub fn is_known_type(code: &str) -> bool {
    PERSONALITY_TYPES.iter().any(|known| *known == code)
}
