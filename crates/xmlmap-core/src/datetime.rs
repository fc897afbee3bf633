//! Date-time parsing: best-effort for unhinted values, exact-match for
//! values carrying a custom date pattern such as `yyyy-MM-dd HH:mm`.

use chrono::format::Parsed;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

const DATE_TIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%d %B %Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
];

const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%A, %d %B %Y",
    "%A, %B %d, %Y",
];

/// Parse a date-time without a pattern, trying the common invariant
/// layouts in turn. Offsets are normalized to UTC; date-only input yields
/// midnight.
pub fn parse_general(raw: &str) -> Option<NaiveDateTime> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.naive_utc());
    }
    for layout in DATE_TIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(dt);
        }
    }
    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(text, layout) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Parse `raw` so that it matches `pattern` exactly.
///
/// The pattern uses custom date-format letters (`yyyy`, `MM`, `dd`, `HH`,
/// `mm`, `ss`, `fff`, `tt`, `zzz`, ...). Characters that are not format
/// letters match literally, whitespace included; `'...'`, `"..."` and `\x`
/// force literals. Numeric fields take exactly their width of digits
/// (one or two for single-letter fields) and never skip whitespace.
///
/// Missing month and day default to 1 and missing time parts to zero; a
/// pattern without a year yields `None`. Two-digit years pivot at 2049.
pub fn parse_exact(raw: &str, pattern: &str) -> Option<NaiveDateTime> {
    let mut parsed = Parsed::new();
    let mut seen = Seen::default();
    let mut rest = raw;
    for token in tokenize(pattern) {
        rest = match_token(&token, rest, &mut parsed, &mut seen)?;
    }
    if !rest.is_empty() {
        return None;
    }
    resolve(parsed, &seen)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Numeric {
    ShortYear,
    Year,
    Month,
    Day,
    Hour,
    Hour12,
    Minute,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OffsetStyle {
    /// `z` and `zz`: signed hours.
    Hours { min: usize },
    /// `zzz`: `+hh:mm`.
    HoursMinutes,
    /// `K`: `Z`, `+hh:mm`, or nothing.
    Iso,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Literal(char),
    Number { field: Numeric, min: usize, max: usize },
    Fraction { min: usize, max: usize },
    MonthName { abbreviated: bool },
    DayName { abbreviated: bool },
    Meridiem { abbreviated: bool },
    Offset(OffsetStyle),
}

#[derive(Debug, Default)]
struct Seen {
    year: bool,
    month: bool,
    day: bool,
    hour: bool,
    hour12: bool,
    minute: bool,
    meridiem: bool,
}

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("Sunday", Weekday::Sun),
    ("Monday", Weekday::Mon),
    ("Tuesday", Weekday::Tue),
    ("Wednesday", Weekday::Wed),
    ("Thursday", Weekday::Thu),
    ("Friday", Weekday::Fri),
    ("Saturday", Weekday::Sat),
];

fn tokenize(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let run = chars[i..].iter().take_while(|&&next| next == c).count();
        let number = |field, run: usize| Token::Number {
            field,
            min: run.min(2),
            max: 2,
        };
        match c {
            'y' => tokens.push(match run {
                1 | 2 => Token::Number {
                    field: Numeric::ShortYear,
                    min: run,
                    max: 2,
                },
                _ => Token::Number {
                    field: Numeric::Year,
                    min: run.min(4),
                    max: 4,
                },
            }),
            'M' => tokens.push(match run {
                1 | 2 => number(Numeric::Month, run),
                _ => Token::MonthName {
                    abbreviated: run == 3,
                },
            }),
            'd' => tokens.push(match run {
                1 | 2 => number(Numeric::Day, run),
                _ => Token::DayName {
                    abbreviated: run == 3,
                },
            }),
            'H' => tokens.push(number(Numeric::Hour, run)),
            'h' => tokens.push(number(Numeric::Hour12, run)),
            'm' => tokens.push(number(Numeric::Minute, run)),
            's' => tokens.push(number(Numeric::Second, run)),
            'f' => tokens.push(Token::Fraction {
                min: run.min(9),
                max: run.min(9),
            }),
            'F' => tokens.push(Token::Fraction {
                min: 0,
                max: run.min(9),
            }),
            't' => tokens.push(Token::Meridiem {
                abbreviated: run == 1,
            }),
            'z' => tokens.push(Token::Offset(match run {
                1 | 2 => OffsetStyle::Hours { min: run },
                _ => OffsetStyle::HoursMinutes,
            })),
            'K' => tokens.push(Token::Offset(OffsetStyle::Iso)),
            // Era designator: nothing to match in the invariant calendar.
            'g' => {}
            '\'' | '"' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&next| next == c)
                    .map_or(chars.len(), |offset| i + 1 + offset);
                tokens.extend(chars[i + 1..close].iter().map(|&literal| Token::Literal(literal)));
                i = close + 1;
                continue;
            }
            '\\' => {
                if let Some(&literal) = chars.get(i + 1) {
                    tokens.push(Token::Literal(literal));
                }
                i += 2;
                continue;
            }
            // `%x` marks a lone single-letter specifier.
            '%' => {
                i += 1;
                continue;
            }
            _ => {
                tokens.push(Token::Literal(c));
                i += 1;
                continue;
            }
        }
        i += run;
    }
    tokens
}

fn match_token<'a>(
    token: &Token,
    rest: &'a str,
    parsed: &mut Parsed,
    seen: &mut Seen,
) -> Option<&'a str> {
    match *token {
        Token::Literal(c) => rest.strip_prefix(c),
        Token::Number { field, min, max } => {
            let (value, rest) = take_digits(rest, min, max)?;
            set_numeric(parsed, seen, field, value)?;
            Some(rest)
        }
        Token::Fraction { min, max } => {
            let len = digit_run(rest, max);
            if len < min {
                return None;
            }
            if len > 0 {
                let nanos: i64 = format!("{:0<9}", &rest[..len]).parse().ok()?;
                parsed.set_nanosecond(nanos).ok()?;
            }
            Some(&rest[len..])
        }
        Token::MonthName { abbreviated } => {
            let (index, len) = take_name(rest, MONTHS.iter().copied(), abbreviated)?;
            seen.month = true;
            parsed.set_month(index as i64 + 1).ok()?;
            Some(&rest[len..])
        }
        Token::DayName { abbreviated } => {
            let (index, len) =
                take_name(rest, WEEKDAYS.iter().map(|(name, _)| *name), abbreviated)?;
            parsed.set_weekday(WEEKDAYS[index].1).ok()?;
            Some(&rest[len..])
        }
        Token::Meridiem { abbreviated } => {
            let len = if abbreviated { 1 } else { 2 };
            let marker = rest.get(..len)?;
            let is_pm = if marker.eq_ignore_ascii_case(&"PM"[..len]) {
                true
            } else if marker.eq_ignore_ascii_case(&"AM"[..len]) {
                false
            } else {
                return None;
            };
            seen.meridiem = true;
            parsed.set_ampm(is_pm).ok()?;
            Some(&rest[len..])
        }
        Token::Offset(style) => {
            let (seconds, rest) = take_offset(rest, style)?;
            if let Some(seconds) = seconds {
                parsed.set_offset(seconds).ok()?;
            }
            Some(rest)
        }
    }
}

fn set_numeric(parsed: &mut Parsed, seen: &mut Seen, field: Numeric, value: i64) -> Option<()> {
    let result = match field {
        Numeric::ShortYear => {
            seen.year = true;
            parsed.set_year(if value < 50 { 2000 + value } else { 1900 + value })
        }
        Numeric::Year => {
            seen.year = true;
            parsed.set_year(value)
        }
        Numeric::Month => {
            seen.month = true;
            parsed.set_month(value)
        }
        Numeric::Day => {
            seen.day = true;
            parsed.set_day(value)
        }
        Numeric::Hour => {
            seen.hour = true;
            parsed.set_hour(value)
        }
        Numeric::Hour12 => {
            seen.hour = true;
            seen.hour12 = true;
            parsed.set_hour12(value)
        }
        Numeric::Minute => {
            seen.minute = true;
            parsed.set_minute(value)
        }
        Numeric::Second => parsed.set_second(value),
    };
    result.ok()
}

fn resolve(mut parsed: Parsed, seen: &Seen) -> Option<NaiveDateTime> {
    if !seen.year {
        return None;
    }
    if !seen.month {
        parsed.set_month(1).ok()?;
    }
    if !seen.day {
        parsed.set_day(1).ok()?;
    }
    if !seen.hour {
        if seen.meridiem {
            parsed.set_hour12(12).ok()?;
        } else {
            parsed.set_hour(0).ok()?;
        }
    }
    if seen.hour12 && !seen.meridiem {
        parsed.set_ampm(false).ok()?;
    }
    if !seen.minute {
        parsed.set_minute(0).ok()?;
    }
    let local = parsed
        .to_naive_date()
        .ok()?
        .and_time(parsed.to_naive_time().ok()?);
    match parsed.to_fixed_offset() {
        Ok(offset) => {
            local.checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
        }
        Err(_) => Some(local),
    }
}

/// Length of the ASCII digit run at the start of `text`, capped at `max`.
fn digit_run(text: &str, max: usize) -> usize {
    text.bytes().take(max).take_while(u8::is_ascii_digit).count()
}

fn take_digits(text: &str, min: usize, max: usize) -> Option<(i64, &str)> {
    let len = digit_run(text, max);
    if len == 0 || len < min {
        return None;
    }
    let value = text[..len].parse().ok()?;
    Some((value, &text[len..]))
}

/// Case-insensitive match of a full or three-letter name. Returns the
/// index of the name and the matched byte length.
fn take_name<'n>(
    text: &str,
    names: impl Iterator<Item = &'n str>,
    abbreviated: bool,
) -> Option<(usize, usize)> {
    names.enumerate().find_map(|(index, name)| {
        let expected = if abbreviated { name.get(..3)? } else { name };
        let candidate = text.get(..expected.len())?;
        candidate
            .eq_ignore_ascii_case(expected)
            .then_some((index, expected.len()))
    })
}

fn take_offset(text: &str, style: OffsetStyle) -> Option<(Option<i64>, &str)> {
    if style == OffsetStyle::Iso {
        if let Some(rest) = text.strip_prefix('Z') {
            return Some((Some(0), rest));
        }
        if !text.starts_with(&['+', '-'][..]) {
            return Some((None, text));
        }
    }
    let (sign, rest) = match text.chars().next()? {
        '+' => (1, &text[1..]),
        '-' => (-1, &text[1..]),
        _ => return None,
    };
    let (hours, minutes, rest) = match style {
        OffsetStyle::Hours { min } => {
            let (hours, rest) = take_digits(rest, min, 2)?;
            (hours, 0, rest)
        }
        OffsetStyle::HoursMinutes | OffsetStyle::Iso => {
            let (hours, rest) = take_digits(rest, 2, 2)?;
            let rest = rest.strip_prefix(':')?;
            let (minutes, rest) = take_digits(rest, 2, 2)?;
            (hours, minutes, rest)
        }
    };
    if minutes >= 60 {
        return None;
    }
    Some((Some(sign * (hours * 3600 + minutes * 60)), rest))
}
