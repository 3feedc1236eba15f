use chrono::NaiveDate;

/// Pull a calendar date out of an object key's file name, e.g.,
///
/// ```text
/// daily/nepse_2024-09-15.csv  ->  2024-09-15
/// daily/20240915.csv          ->  2024-09-15
/// ```
///
/// `YYYY-MM-DD`, `YYYY_MM_DD`, `YYYY.MM.DD` & `YYYYMMDD` are recognised; the
/// first valid one, reading left to right, is returned. Directories are ignored.
pub fn date_from_key(key: &str) -> Option<NaiveDate> {
    let name = key.rsplit('/').next().unwrap_or(key).as_bytes();
    (0..name.len()).find_map(|i| date_at(name, i))
}

fn date_at(name: &[u8], i: usize) -> Option<NaiveDate> {
    // a date has to start its own run of digits
    if i > 0 && name[i - 1].is_ascii_digit() {
        return None;
    }
    let rest = &name[i..];

    // YYYY-MM-DD, YYYY_MM_DD, YYYY.MM.DD
    if rest.len() >= 10
        && digits(&rest[0..4])
        && matches!(rest[4], b'-' | b'_' | b'.')
        && rest[7] == rest[4]
        && digits(&rest[5..7])
        && digits(&rest[8..10])
        && !rest.get(10).is_some_and(u8::is_ascii_digit)
    {
        if let Some(date) = ymd(&rest[0..4], &rest[5..7], &rest[8..10]) {
            return Some(date);
        }
    }

    // YYYYMMDD, exactly eight digits
    let run = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if run == 8 {
        return ymd(&rest[0..4], &rest[4..6], &rest[6..8]);
    }

    None
}

fn digits(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_digit)
}

fn ymd(year: &[u8], month: &[u8], day: &[u8]) -> Option<NaiveDate> {
    let num = |bytes: &[u8]| std::str::from_utf8(bytes).ok()?.parse::<u32>().ok();
    NaiveDate::from_ymd_opt(num(year)? as i32, num(month)?, num(day)?)
}
