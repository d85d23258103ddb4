//! Wire-format construction.
//!
//! Everything in this module is pure: a measurement plus client configuration goes in, exactly one
//! formatted line comes out. No I/O, no shared state, and no locale-aware formatting anywhere --
//! the decimal separator is always `.` regardless of process locale, which is why numeric
//! rendering is built on `itoa`/`ryu` rather than any general-purpose number formatter.

use std::fmt::Write as _;

use crate::event::Event;
use crate::service_check::ServiceCheck;
use crate::tags;

/// The supported metric kinds and their wire tokens.
#[derive(Clone, Copy)]
pub(crate) enum MetricKind {
    Counter,
    Gauge,
    Histogram,
    Distribution,
    Timer,
    Set,
}

impl MetricKind {
    pub(crate) const fn token(self) -> &'static str {
        match self {
            MetricKind::Counter => "c",
            MetricKind::Gauge => "g",
            MetricKind::Histogram => "h",
            MetricKind::Distribution => "d",
            MetricKind::Timer => "ms",
            MetricKind::Set => "s",
        }
    }
}

/// Appends a signed integer value in plain decimal.
pub(crate) fn push_i64(buf: &mut String, value: i64) {
    let mut writer = itoa::Buffer::new();
    buf.push_str(writer.format(value));
}

/// Appends a floating-point value.
///
/// Rendering rules: integral values carry no fractional part (`423.0` renders as `423`), at most
/// six fractional digits are kept (half-up rounding, trailing zeros stripped), and NaN renders as
/// the literal token `NaN`.
pub(crate) fn push_f64(buf: &mut String, value: f64) {
    let mut writer = ryu::Buffer::new();
    let shortest = writer.format(value);

    if !value.is_finite() {
        buf.push_str(shortest);
        return;
    }

    // ryu switches to exponent notation outside its plain-decimal range; the wire format is
    // plain decimal only, so re-render in fixed notation and strip the excess.
    if shortest.contains('e') {
        let fixed = format!("{value:.6}");
        buf.push_str(fixed.trim_end_matches('0').trim_end_matches('.'));
        return;
    }

    if let Some(integral) = shortest.strip_suffix(".0") {
        buf.push_str(integral);
        return;
    }

    match shortest.split_once('.') {
        Some((int_part, frac)) if frac.len() > 6 => push_rounded(buf, int_part, frac),
        _ => buf.push_str(shortest),
    }
}

/// Rounds a decimal fraction to six digits, half-up, carrying into the integer part when the
/// fraction overflows (e.g. `0.9999996` rounds to `1`).
fn push_rounded(buf: &mut String, int_part: &str, frac: &str) {
    let mut digits: Vec<u8> = frac.as_bytes()[..6].to_vec();
    let mut carry = frac.as_bytes()[6] >= b'5';
    if carry {
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
    }

    if carry {
        let (sign, int_digits) = match int_part.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", int_part),
        };
        let mut int_digits: Vec<u8> = int_digits.as_bytes().to_vec();
        let mut int_carry = true;
        for digit in int_digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                int_carry = false;
                break;
            }
        }
        if int_carry {
            int_digits.insert(0, b'1');
        }
        buf.push_str(sign);
        for digit in int_digits {
            buf.push(char::from(digit));
        }
    } else {
        buf.push_str(int_part);
    }

    while digits.last() == Some(&b'0') {
        digits.pop();
    }
    if !digits.is_empty() {
        buf.push('.');
        for digit in digits {
            buf.push(char::from(digit));
        }
    }
}

/// Builds a metric line: `[prefix.]name:value|kind[|@rate][|#tags]`.
///
/// The sample-rate clause is emitted whenever `sample_rate` is present, even at the neutral rate
/// of 1.0, and always with exactly six fixed fractional digits. Omitting the argument omits the
/// clause entirely.
pub(crate) fn metric_line<F>(
    prefix: &str,
    name: &str,
    kind: MetricKind,
    sample_rate: Option<f64>,
    sticky_tags: &[String],
    call_tags: &[&str],
    write_value: F,
) -> String
where
    F: FnOnce(&mut String),
{
    let mut line = String::with_capacity(64);
    line.push_str(prefix);
    line.push_str(name);
    line.push(':');
    write_value(&mut line);
    line.push('|');
    line.push_str(kind.token());
    if let Some(rate) = sample_rate {
        let _ = write!(line, "|@{rate:.6}");
    }
    tags::push_tag_clause(&mut line, sticky_tags, call_tags);
    line
}

/// Replaces newlines with the literal `\n` escape; no other characters are altered.
fn escape_newlines(text: &str) -> String {
    text.replace('\n', "\\n")
}

/// Escapes a service-check message: newlines and literal colons, the latter because `:` doubles
/// as the field delimiter introducing the message.
fn escape_check_message(message: &str) -> String {
    message.replace('\n', "\\n").replace(':', "\\:")
}

/// Builds an event line:
/// `_e{<titleLen>,<textLen>}:<prefix.title>|<escapedText>` followed by the optional fields in
/// fixed order and the tag clause last.
///
/// The length fields are character counts of the prefixed title and of the text after escaping.
pub(crate) fn event_line(
    prefix: &str,
    event: &Event,
    sticky_tags: &[String],
    call_tags: &[&str],
) -> String {
    let escaped_text = escape_newlines(event.text());
    let title_len = prefix.chars().count() + event.title().chars().count();
    let text_len = escaped_text.chars().count();

    let mut line = String::with_capacity(64);
    let _ = write!(line, "_e{{{title_len},{text_len}}}:");
    line.push_str(prefix);
    line.push_str(event.title());
    line.push('|');
    line.push_str(&escaped_text);

    if let Some(timestamp) = event.timestamp() {
        let _ = write!(line, "|d:{timestamp}");
    }
    if let Some(hostname) = event.hostname() {
        let _ = write!(line, "|h:{hostname}");
    }
    if let Some(key) = event.aggregation_key() {
        let _ = write!(line, "|k:{key}");
    }
    if let Some(priority) = event.priority() {
        let _ = write!(line, "|p:{}", priority.token());
    }
    if let Some(alert_type) = event.alert_type() {
        let _ = write!(line, "|t:{}", alert_type.token());
    }
    tags::push_tag_clause(&mut line, sticky_tags, call_tags);
    line
}

/// Builds a service-check line: `_sc|<name>|<status>` followed by the optional timestamp,
/// hostname, tag clause, and escaped message, the message always last.
///
/// Unlike metric names and event titles, service-check names are never prefixed.
pub(crate) fn service_check_line(check: &ServiceCheck, sticky_tags: &[String]) -> String {
    let mut line = String::with_capacity(64);
    let _ = write!(line, "_sc|{}|{}", check.name(), check.status().code());

    if let Some(timestamp) = check.timestamp() {
        let _ = write!(line, "|d:{timestamp}");
    }
    if let Some(hostname) = check.hostname() {
        let _ = write!(line, "|h:{hostname}");
    }
    tags::push_tag_clause(&mut line, sticky_tags, check.tags());
    if let Some(message) = check.message() {
        let _ = write!(line, "|m:{}", escape_check_message(message));
    }
    line
}

#[cfg(test)]
mod tests {
    use proptest::collection::vec as arb_vec;
    use proptest::prelude::*;

    use crate::event::{AlertType, Event, Priority};
    use crate::service_check::{CheckStatus, ServiceCheck};

    use super::{event_line, metric_line, push_f64, push_i64, service_check_line, MetricKind};

    fn render_f64(value: f64) -> String {
        let mut buf = String::new();
        push_f64(&mut buf, value);
        buf
    }

    #[test]
    fn float_rendering() {
        // Cases are defined as: input value, expected rendering.
        let cases = [
            (0.423, "0.423"),
            (423.0, "423"),
            (-423.0, "-423"),
            (-0.5, "-0.5"),
            (123.456_789_012_345_68, "123.456789"),
            (123_456_789_012_345.67, "123456789012345.67"),
            (0.999_999_6, "1"),
            (-0.999_999_6, "-1"),
            (0.000_03, "0.00003"),
            (f64::NAN, "NaN"),
        ];

        for (value, expected) in cases {
            assert_eq!(render_f64(value), expected, "value: {value}");
        }
    }

    #[test]
    fn integer_rendering_preserves_sign() {
        let mut buf = String::new();
        push_i64(&mut buf, -1);
        assert_eq!(buf, "-1");
    }

    fn counter_line(prefix: &str, rate: Option<f64>, sticky: &[String], tags: &[&str]) -> String {
        metric_line(prefix, "mycount", MetricKind::Counter, rate, sticky, tags, |buf| {
            push_i64(buf, 24);
        })
    }

    #[test]
    fn counter() {
        assert_eq!(counter_line("my.prefix.", None, &[], &[]), "my.prefix.mycount:24|c");
    }

    #[test]
    fn counter_without_prefix() {
        assert_eq!(counter_line("", None, &[], &[]), "mycount:24|c");
    }

    #[test]
    fn counter_with_tags() {
        assert_eq!(
            counter_line("my.prefix.", None, &[], &["foo:bar", "baz"]),
            "my.prefix.mycount:24|c|#baz,foo:bar"
        );
    }

    #[test]
    fn explicit_neutral_sample_rate_is_rendered() {
        assert_eq!(
            counter_line("my.prefix.", Some(1.0), &[], &["foo:bar", "baz"]),
            "my.prefix.mycount:24|c|@1.000000|#baz,foo:bar"
        );
    }

    #[test]
    fn fractional_sample_rate_keeps_six_digits() {
        assert_eq!(counter_line("my.prefix.", Some(0.5), &[], &[]), "my.prefix.mycount:24|c|@0.500000");
    }

    #[test]
    fn sticky_and_call_tags_compose() {
        let sticky = vec!["instance:foo".to_string(), "app:bar".to_string()];
        let line = metric_line("my.prefix.", "value", MetricKind::Gauge, None, &sticky, &["baz"], |buf| {
            push_i64(buf, 423);
        });
        assert_eq!(line, "my.prefix.value:423|g|#app:bar,instance:foo,baz");
    }

    #[test]
    fn kind_tokens() {
        let cases = [
            (MetricKind::Counter, "c"),
            (MetricKind::Gauge, "g"),
            (MetricKind::Histogram, "h"),
            (MetricKind::Distribution, "d"),
            (MetricKind::Timer, "ms"),
            (MetricKind::Set, "s"),
        ];

        for (kind, token) in cases {
            assert_eq!(kind.token(), token);
        }
    }

    #[test]
    fn nan_gauge() {
        let line = metric_line("my.prefix.", "mygauge", MetricKind::Gauge, None, &[], &[], |buf| {
            push_f64(buf, f64::NAN);
        });
        assert_eq!(line, "my.prefix.mygauge:NaN|g");
    }

    #[test]
    fn full_event() {
        let event = Event::builder("title1", "text1\nline2")
            .with_timestamp(1_234_567)
            .with_hostname("host1")
            .with_aggregation_key("key1")
            .with_priority(Priority::Low)
            .with_alert_type(AlertType::Error)
            .build();

        assert_eq!(
            event_line("my.prefix.", &event, &[], &[]),
            "_e{16,12}:my.prefix.title1|text1\\nline2|d:1234567|h:host1|k:key1|p:low|t:error"
        );
    }

    #[test]
    fn partial_event() {
        let event = Event::builder("title1", "text1").with_timestamp(1_234_567).build();

        assert_eq!(event_line("my.prefix.", &event, &[], &[]), "_e{16,5}:my.prefix.title1|text1|d:1234567");
    }

    #[test]
    fn event_with_call_tags() {
        let event = Event::builder("title1", "text1").with_timestamp(1_234_567).build();

        assert_eq!(
            event_line("my.prefix.", &event, &[], &["foo:bar", "baz"]),
            "_e{16,5}:my.prefix.title1|text1|d:1234567|#baz,foo:bar"
        );
    }

    #[test]
    fn event_without_prefix() {
        let event = Event::builder("title1", "text1")
            .with_timestamp(1_234_567)
            .with_hostname("host1")
            .with_aggregation_key("key1")
            .with_priority(Priority::Low)
            .with_alert_type(AlertType::Error)
            .build();

        assert_eq!(
            event_line("", &event, &[], &["foo:bar", "baz"]),
            "_e{6,5}:title1|text1|d:1234567|h:host1|k:key1|p:low|t:error|#baz,foo:bar"
        );
    }

    #[test]
    fn full_service_check() {
        let check = ServiceCheck::builder("my_check.name", CheckStatus::Warning)
            .with_timestamp(1_420_740_000)
            .with_hostname("i-abcd1234")
            .with_tags(&["key1:val1", "key2:val2"])
            .with_message("\u{266c} \u{2020}\u{f8}U \n\u{2020}\u{f8}U \u{a5}\u{ba}u|m: T0\u{b5} \u{266a}")
            .build();

        assert_eq!(
            service_check_line(&check, &[]),
            "_sc|my_check.name|1|d:1420740000|h:i-abcd1234|#key2:val2,key1:val1|m:\u{266c} \u{2020}\u{f8}U \\n\u{2020}\u{f8}U \u{a5}\u{ba}u|m\\: T0\u{b5} \u{266a}"
        );
    }

    #[test]
    fn minimal_service_check() {
        let check = ServiceCheck::builder("fine", CheckStatus::Ok).build();
        assert_eq!(service_check_line(&check, &[]), "_sc|fine|0");
    }

    #[test]
    fn status_codes() {
        let cases = [
            (CheckStatus::Ok, 0),
            (CheckStatus::Warning, 1),
            (CheckStatus::Critical, 2),
            (CheckStatus::Unknown, 3),
        ];

        for (status, code) in cases {
            assert_eq!(status.code(), code);
        }
    }

    fn arb_tag() -> impl Strategy<Value = String> {
        "[a-z]{2,8}(:[a-z0-9]{1,8})?"
    }

    proptest! {
        #[test]
        fn rendered_floats_stay_close_and_locale_free(value in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
            let rendered = render_f64(value);

            // Always a plain `.`-separated decimal, never grouped, never exponent form.
            prop_assert!(!rendered.contains(','));
            prop_assert!(!rendered.contains('e'));

            // Parsing back stays within the six-fractional-digit rounding error.
            let parsed: f64 = rendered.parse().unwrap();
            prop_assert!(parsed == value || (parsed - value).abs() <= 5e-7);
        }

        #[test]
        fn metric_lines_are_single_and_well_formed(
            name in "[a-zA-Z][a-zA-Z0-9_.]{0,31}",
            value in any::<i64>(),
            sticky in arb_vec(arb_tag(), 0..4),
            call in arb_vec(arb_tag(), 0..4),
        ) {
            let call_refs: Vec<&str> = call.iter().map(String::as_str).collect();
            let line = metric_line("my.prefix.", &name, MetricKind::Counter, None, &sticky, &call_refs, |buf| {
                push_i64(buf, value);
            });

            prop_assert!(!line.contains('\n'));

            let (name_and_value, rest) = line.split_once('|').unwrap();
            let (full_name, rendered_value) = name_and_value.split_once(':').unwrap();
            prop_assert_eq!(full_name, format!("my.prefix.{}", name));
            prop_assert_eq!(rendered_value.parse::<i64>().unwrap(), value);
            prop_assert!(rest.starts_with('c'));
        }
    }
}
