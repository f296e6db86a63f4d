//! Amount-in-words ("terbilang") in Indonesian.
//!
//! Short-scale grouping by thousands (ribu, juta, miliar, triliun). Exactly
//! one of the thousands group is "seribu", not "satu ribu"; the same elision
//! applies to "sepuluh", "sebelas" and "seratus".

const UNITS: [&str; 10] = [
    "", "satu", "dua", "tiga", "empat", "lima", "enam", "tujuh", "delapan", "sembilan",
];

const SCALES: [(u64, &str); 4] = [
    (1_000_000_000_000, "triliun"),
    (1_000_000_000, "miliar"),
    (1_000_000, "juta"),
    (1_000, "ribu"),
];

/// Indonesian words for `amount`, lowercase, single-spaced.
pub fn terbilang(amount: u64) -> String {
    if amount == 0 {
        return "nol".to_string();
    }
    let mut words = Vec::new();
    push_words(amount, &mut words);
    words.join(" ")
}

/// Title-cased words followed by the currency, as printed on vouchers:
/// `Lima Ratus Ribu Rupiah`.
pub fn terbilang_rupiah(amount: u64) -> String {
    format!("{} Rupiah", title_case(&terbilang(amount)))
}

fn push_words(amount: u64, words: &mut Vec<&'static str>) {
    let mut rest = amount;
    for (scale, name) in SCALES {
        let group = rest / scale;
        rest %= scale;
        if group == 0 {
            continue;
        }
        if scale == 1_000 && group == 1 {
            words.push("seribu");
            continue;
        }
        // Groups above a trillion recurse, e.g. "seribu triliun".
        push_words(group, words);
        words.push(name);
    }
    push_hundreds(rest, words);
}

fn push_hundreds(amount: u64, words: &mut Vec<&'static str>) {
    let hundreds = amount / 100;
    let tens = amount % 100;

    match hundreds {
        0 => {}
        1 => words.push("seratus"),
        h => {
            words.push(UNITS[h as usize]);
            words.push("ratus");
        }
    }

    match tens {
        0 => {}
        1..=9 => words.push(UNITS[tens as usize]),
        10 => words.push("sepuluh"),
        11 => words.push("sebelas"),
        12..=19 => {
            words.push(UNITS[(tens - 10) as usize]);
            words.push("belas");
        }
        _ => {
            words.push(UNITS[(tens / 10) as usize]);
            words.push("puluh");
            if tens % 10 != 0 {
                words.push(UNITS[(tens % 10) as usize]);
            }
        }
    }
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(terbilang(0), "nol");
    }

    #[test]
    fn test_units_and_teens() {
        assert_eq!(terbilang(7), "tujuh");
        assert_eq!(terbilang(10), "sepuluh");
        assert_eq!(terbilang(11), "sebelas");
        assert_eq!(terbilang(15), "lima belas");
        assert_eq!(terbilang(19), "sembilan belas");
        assert_eq!(terbilang(20), "dua puluh");
        assert_eq!(terbilang(99), "sembilan puluh sembilan");
    }

    #[test]
    fn test_hundreds() {
        assert_eq!(terbilang(100), "seratus");
        assert_eq!(terbilang(111), "seratus sebelas");
        assert_eq!(terbilang(250), "dua ratus lima puluh");
    }

    #[test]
    fn test_thousand_elision() {
        assert_eq!(terbilang(1_000), "seribu");
        assert_eq!(terbilang(1_001), "seribu satu");
        assert_eq!(terbilang(2_000), "dua ribu");
        assert_eq!(terbilang(11_000), "sebelas ribu");
        assert_eq!(terbilang(101_000), "seratus satu ribu");
    }

    #[test]
    fn test_group_boundaries() {
        assert_eq!(terbilang(1_000_000), "satu juta");
        assert_eq!(terbilang(1_000_000_000), "satu miliar");
        assert_eq!(terbilang(1_000_000_000_000), "satu triliun");
        assert_eq!(terbilang(1_001_000), "satu juta seribu");
        assert_eq!(terbilang(1_000_000_000_000_000), "seribu triliun");
    }

    #[test]
    fn test_composite_amount() {
        assert_eq!(
            terbilang(1_234_567),
            "satu juta dua ratus tiga puluh empat ribu lima ratus enam puluh tujuh"
        );
        assert_eq!(terbilang(500_000), "lima ratus ribu");
    }

    #[test]
    fn test_rupiah_suffix() {
        assert_eq!(terbilang_rupiah(500_000), "Lima Ratus Ribu Rupiah");
        assert_eq!(terbilang_rupiah(0), "Nol Rupiah");
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(terbilang(987_654_321), terbilang(987_654_321));
    }

    #[test]
    fn test_u64_max_does_not_panic() {
        assert!(terbilang(u64::MAX).ends_with("lima belas"));
    }
}
