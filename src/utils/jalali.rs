//! Civil conversion between the Jalali (Persian solar) and Gregorian
//! calendars, using the 33-year leap cycle day-count algorithm.
//!
//! Conversions are exact for the year range this crate accepts as Jalali
//! input (roughly 1000..1500); outside that band behavior is unspecified.

const GREGORIAN_MONTH_DAYS: [i64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const JALALI_MONTH_DAYS: [i64; 12] = [31, 31, 31, 31, 31, 31, 30, 30, 30, 30, 30, 29];

/// Whether `year` is a leap year in the Jalali calendar (Esfand has 30 days).
pub fn is_jalali_leap_year(year: i32) -> bool {
    let cycle_pos = (i64::from(year) - 979).rem_euclid(33);
    cycle_pos % 4 == 0 && cycle_pos != 32
}

fn is_gregorian_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in Jalali month `month` (1-12) of `year`.
pub fn jalali_month_days(year: i32, month: u32) -> u32 {
    match month {
        1..=6 => 31,
        7..=11 => 30,
        12 if is_jalali_leap_year(year) => 30,
        _ => 29,
    }
}

/// Whether `(year, month, day)` names a real Jalali calendar date.
pub fn is_valid_jalali_date(year: i32, month: u32, day: u32) -> bool {
    (1..=12).contains(&month) && day >= 1 && day <= jalali_month_days(year, month)
}

/// Converts a valid Jalali date to the equivalent Gregorian `(year, month, day)`.
pub fn jalali_to_gregorian(jy: i32, jm: u32, jd: u32) -> (i32, u32, u32) {
    let ry = i64::from(jy) - 979;
    let mut day_no = 365 * ry + (ry / 33) * 8 + ((ry % 33) + 3) / 4;
    for days in JALALI_MONTH_DAYS.iter().take(jm as usize - 1) {
        day_no += days;
    }
    day_no += i64::from(jd) - 1;

    // Days since 1600-01-01 in the Gregorian calendar.
    let mut g_day_no = day_no + 79;

    let mut gy = 1600 + 400 * (g_day_no / 146097);
    g_day_no %= 146097;

    let mut leap = true;
    if g_day_no >= 36525 {
        g_day_no -= 1;
        gy += 100 * (g_day_no / 36524);
        g_day_no %= 36524;
        if g_day_no >= 365 {
            g_day_no += 1;
        } else {
            leap = false;
        }
    }

    gy += 4 * (g_day_no / 1461);
    g_day_no %= 1461;
    if g_day_no >= 366 {
        leap = false;
        g_day_no -= 1;
        gy += g_day_no / 365;
        g_day_no %= 365;
    }

    let mut gm = 0usize;
    while gm < 12 {
        let mut month_len = GREGORIAN_MONTH_DAYS[gm];
        if gm == 1 && leap {
            month_len += 1;
        }
        if g_day_no < month_len {
            break;
        }
        g_day_no -= month_len;
        gm += 1;
    }

    (gy as i32, gm as u32 + 1, g_day_no as u32 + 1)
}

/// Converts a valid Gregorian date to the equivalent Jalali `(year, month, day)`.
pub fn gregorian_to_jalali(gy: i32, gm: u32, gd: u32) -> (i32, u32, u32) {
    let ry = i64::from(gy) - 1600;
    let mut g_day_no = 365 * ry + (ry + 3) / 4 - (ry + 99) / 100 + (ry + 399) / 400;
    for days in GREGORIAN_MONTH_DAYS.iter().take(gm as usize - 1) {
        g_day_no += days;
    }
    if gm > 2 && is_gregorian_leap_year(gy) {
        g_day_no += 1;
    }
    g_day_no += i64::from(gd) - 1;

    let mut j_day_no = g_day_no - 79;

    // 12053 days per 33-year cycle; 1461 days per 4-year sub-cycle.
    let cycles = j_day_no / 12053;
    j_day_no %= 12053;

    let mut jy = 979 + 33 * cycles + 4 * (j_day_no / 1461);
    j_day_no %= 1461;
    if j_day_no >= 366 {
        jy += (j_day_no - 1) / 365;
        j_day_no = (j_day_no - 1) % 365;
    }

    let mut jm = 0usize;
    while jm < 11 && j_day_no >= JALALI_MONTH_DAYS[jm] {
        j_day_no -= JALALI_MONTH_DAYS[jm];
        jm += 1;
    }

    (jy as i32, jm as u32 + 1, j_day_no as u32 + 1)
}
