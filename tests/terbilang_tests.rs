#[cfg(test)]
mod terbilang_tests {
    use jurnal_voucher_server::voucher::{terbilang, terbilang_rupiah};

    #[test]
    fn test_reference_values() {
        assert_eq!(terbilang(0), "nol");
        assert_eq!(terbilang(1_000), "seribu");
        assert_eq!(terbilang(500_000), "lima ratus ribu");
        assert_eq!(terbilang(2_500_750), "dua juta lima ratus ribu tujuh ratus lima puluh");
    }

    #[test]
    fn test_words_are_single_spaced() {
        for amount in [1u64, 12, 101, 1_010, 110_011, 7_000_000_017, 42_000_000_000_000] {
            let words = terbilang(amount);
            assert!(!words.contains("  "), "double space in {:?}", words);
            assert_eq!(words.trim(), words);
        }
    }

    #[test]
    fn test_same_amount_same_words() {
        for amount in [0u64, 999, 1_000_001, u64::MAX] {
            assert_eq!(terbilang(amount), terbilang(amount));
        }
    }

    #[test]
    fn test_voucher_words_line() {
        assert_eq!(terbilang_rupiah(1_000), "Seribu Rupiah");
        assert_eq!(
            terbilang_rupiah(15_250),
            "Lima Belas Ribu Dua Ratus Lima Puluh Rupiah"
        );
    }
}
