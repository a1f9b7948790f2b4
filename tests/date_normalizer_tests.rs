use chrono::Datelike;

use time_manager_bot::utils::dates::{normalize, DateError};
use time_manager_bot::utils::jalali::{gregorian_to_jalali, jalali_month_days};

#[test]
fn test_concrete_scenarios() {
    assert_eq!(normalize("2026.12.30").map(|d| d.to_string()), Ok("30.12.2026".into()));
    assert_eq!(normalize("1405.10.20").map(|d| d.to_string()), Ok("10.01.2027".into()));
    assert_eq!(normalize("20-10-1600"), Err(DateError::AmbiguousYear(1600)));
}

#[test]
fn test_jalali_round_trip_over_full_years() {
    // Every valid Jalali date in a span covering both leap and common years
    // must come back unchanged when the canonical Gregorian form is mapped
    // through the inverse conversion.
    for jy in [1398, 1399, 1400, 1403, 1404, 1499] {
        for jm in 1..=12u32 {
            for jd in 1..=jalali_month_days(jy, jm) {
                let canonical = match normalize(&format!("{jy}.{jm}.{jd}")) {
                    Ok(date) => date,
                    Err(e) => panic!("{jy}.{jm}.{jd} should normalize: {e}"),
                };
                let naive = canonical.as_naive();
                assert_eq!(
                    gregorian_to_jalali(naive.year(), naive.month(), naive.day()),
                    (jy, jm, jd),
                    "round trip failed for {jy}.{jm}.{jd}"
                );
            }
        }
    }
}

#[test]
fn test_ambiguous_band_is_rejected_inclusive() {
    for year in [1500, 1501, 1666, 1899, 1900] {
        for raw in [format!("{year}.6.15"), format!("15/6/{year}"), format!("15 6 {year}")] {
            assert_eq!(
                normalize(&raw),
                Err(DateError::AmbiguousYear(year)),
                "{raw} should be ambiguous"
            );
        }
    }
}

#[test]
fn test_digit_scripts_and_separators_are_equivalent() {
    let reference = normalize("1405.10.20");
    assert!(reference.is_ok());
    for raw in [
        "۱۴۰۵/۱۰/۲۰",
        "۱۴۰۵.۱۰.۲۰",
        "١٤٠٥,١٠,٢٠",
        "1405 10 20",
        "1405--10--20",
        "۱۴۰۵-10-٢٠",
    ] {
        assert_eq!(normalize(raw), reference, "{raw}");
    }
}

#[test]
fn test_no_jalali_date_survives_normalization() {
    // Whatever calendar the user typed in, the canonical form always parses
    // as a Gregorian date with a year above the rejected band.
    for raw in ["1405.10.20", "2026.12.30", "۱۴۰۰/۱/۱", "1.1.2025"] {
        let canonical = match normalize(raw) {
            Ok(date) => date,
            Err(e) => panic!("{raw} should normalize: {e}"),
        };
        assert!(canonical.as_naive().year() > 1900, "{raw} -> {canonical}");
    }
}
