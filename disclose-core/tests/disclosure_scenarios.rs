// disclose-core/tests/disclosure_scenarios.rs
use anyhow::Result;
use test_log::test; // Captures `log` output per test

use disclose_core::{
    headless_scan, unwrap_soft_breaks, ByteBuffer, DfaEngine, DisclosureEngine, PatternConfig,
    PatternDefinition,
};

fn default_definition(name: &str) -> PatternDefinition {
    PatternConfig::load_default_patterns()
        .unwrap()
        .get(name)
        .cloned()
        .unwrap_or_else(|| panic!("default pattern {name} is missing"))
}

/// Asserts that `revealed` holds `input[start..start + expected.len()]` and
/// zero everywhere else.
fn assert_reveals_only(revealed: &[u8], capacity: usize, start: usize, expected: &[u8]) {
    assert_eq!(revealed.len(), capacity);
    assert_eq!(&revealed[start..start + expected.len()], expected);
    assert!(revealed[..start].iter().all(|&b| b == 0), "bytes before the span leaked");
    assert!(
        revealed[start + expected.len()..].iter().all(|&b| b == 0),
        "bytes after the span leaked"
    );
}

#[test]
fn test_from_header_lowercase() -> Result<()> {
    let input = b"from:PayLah! Alerts <paylah.alert@dbs.com>\r\nto:tes";
    let engine = DfaEngine::from_definition(&default_definition("from_email"))?;
    let outcome = engine.scan(input)?;

    assert_eq!(outcome.match_count, 1);
    assert!(outcome.satisfies_policy());
    let email = outcome.reveal("email").expect("email group");
    let start = input.iter().position(|&b| b == b'<').unwrap() + 1;
    assert_reveals_only(&email.bytes, engine.compiled_pattern().capacity, start, b"paylah.alert@dbs.com");
    Ok(())
}

#[test]
fn test_from_header_capitalized_with_space() -> Result<()> {
    let input = b"From: PayLah! Alerts <paylah.alert@dbs.com>\r\nto:te";
    let outcome = headless_scan(&default_definition("from_email"), input)?;
    assert_eq!(outcome.match_count, 1);
    assert_eq!(outcome.reveal("email").unwrap().revealed_text(), "paylah.alert@dbs.com");
    Ok(())
}

#[test]
fn test_from_header_without_opening_bracket_does_not_match() -> Result<()> {
    let input = b"from:PayLah! Alerts >paylah.alert@dbs.com>\r\nto:tes";
    let outcome = headless_scan(&default_definition("from_email"), input)?;
    assert_eq!(outcome.match_count, 0);
    assert!(!outcome.satisfies_policy());
    assert!(outcome.reveal("email").unwrap().bytes.iter().all(|&b| b == 0));
    Ok(())
}

#[test]
fn test_unwrap_soft_break_pads_tail() -> Result<()> {
    let buffer = ByteBuffer::from_input(b"abcd=\r\nefg", 10)?;
    let unwrapped = unwrap_soft_breaks(&buffer);
    assert_eq!(unwrapped.as_bytes(), b"abcdefg\0\0\0");
    Ok(())
}

#[test]
fn test_two_captures_from_one_pass() -> Result<()> {
    let def = PatternDefinition::new("pair", r"amount:(?<amount>[0-9]+) id:(?<id>[a-z]+);").with_capacity(32);
    let input = b"amount:250 id:xyz;";
    let outcome = headless_scan(&def, input)?;

    assert_eq!(outcome.match_count, 1);
    assert_eq!(outcome.reveals.len(), 2);
    assert_reveals_only(&outcome.reveal("amount").unwrap().bytes, 32, 7, b"250");
    assert_reveals_only(&outcome.reveal("id").unwrap().bytes, 32, 14, b"xyz");
    Ok(())
}

#[test]
fn test_venmo_amount_byte_for_byte() -> Result<()> {
    let input = b"eeeee eeeee $2,500.00\r\nmime";
    let def = default_definition("venmo_amount").with_capacity(input.len());
    let outcome = headless_scan(&def, input)?;

    assert_eq!(outcome.match_count, 1);
    let amount = &outcome.reveal("amount").unwrap().bytes;
    let mut expected = vec![0u8; 13];
    expected.extend_from_slice(b"2,500.00");
    expected.extend_from_slice(&[0; 6]);
    assert_eq!(amount, &expected);
    Ok(())
}

#[test]
fn test_venmo_amount_without_dollar_sign() -> Result<()> {
    let input = b"eeeee eeeee D2,500.00\r\nmime";
    let outcome = headless_scan(&default_definition("venmo_amount"), input)?;
    assert_eq!(outcome.match_count, 0);
    Ok(())
}

#[test]
fn test_paylah_amount() -> Result<()> {
    let input = b"\r\n<td>Amount:</td>\r\n<td>SGD300.00</td>\r\n</tr>\r\n";
    let outcome = headless_scan(&default_definition("paylah_amount"), input)?;
    assert_eq!(outcome.match_count, 1);
    let amount = outcome.reveal("amount").unwrap();
    assert_eq!(amount.revealed_text(), "300.00");
    assert_eq!(amount.spans.len(), 1);
    Ok(())
}

#[test]
fn test_venmo_payee_id_across_soft_breaks() -> Result<()> {
    let input: &[u8] = b"= 3D\"ht=\r\ntps://venmo.com/code?user_id=3D274432553155354535&actor_id=3D1168869611798565=\r\n289664>>>>";
    let outcome = headless_scan(&default_definition("venmo_payee_id"), input)?;
    assert_eq!(outcome.match_count, 1);
    let payee = outcome.reveal("payee_id").unwrap();
    assert_eq!(payee.revealed_text(), "274432553155354535");
    assert_eq!(payee.spans.len(), 1);
    Ok(())
}

#[test]
fn test_dkim_body_hash() -> Result<()> {
    let input: &[u8] = b"\r\ndkim-signature:v=1; a=rsa-sha256; c=relaxed/relaxed; d=dbs.com; s=selector1; bh=C9JrSSzQ+HxrQ6y65Bb/5BE511a00wfrddEQySR9PLI=; b=";
    let outcome = headless_scan(&default_definition("dkim_body_hash"), input)?;
    assert_eq!(outcome.match_count, 1);
    assert_eq!(
        outcome.reveal("body_hash").unwrap().revealed_text(),
        "C9JrSSzQ+HxrQ6y65Bb/5BE511a00wfrddEQySR9PLI="
    );
    Ok(())
}

#[test]
fn test_dkim_body_hash_needs_header_line_start() -> Result<()> {
    let input: &[u8] = b"\n\rdkim-signature:v=1; a=rsa-sha256; bh=C9JrSSzQ+HxrQ6y65Bb/5BE511a00wfrddEQySR9PLI=; b=";
    let outcome = headless_scan(&default_definition("dkim_body_hash"), input)?;
    assert_eq!(outcome.match_count, 0);
    Ok(())
}

#[test]
fn test_signals_shape() -> Result<()> {
    let input = b"eeeee eeeee $2,500.00\r\nmime";
    let def = default_definition("venmo_amount").with_capacity(input.len());
    let outcome = headless_scan(&def, input)?;
    let value = serde_json::to_value(outcome.signals())?;
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 2);
    assert_eq!(array[0], 1);
    assert_eq!(array[1].as_array().unwrap().len(), input.len());
    assert_eq!(array[1][13], u64::from(b'2'));
    Ok(())
}

#[test]
fn test_dollars_and_cents_from_one_pass() -> Result<()> {
    let pattern = r"(?<dollars>[0-9]+)\.(?<cents>[0-9][0-9])";
    let input = b"total 12.34\r\n";

    let anchored = PatternDefinition::new("money", pattern).with_capacity(16).with_anchored(true);
    let outcome = headless_scan(&anchored, b"12.34\r\n")?;
    assert_eq!(outcome.match_count, 1);
    assert_reveals_only(&outcome.reveal("dollars").unwrap().bytes, 16, 0, b"12");
    assert_reveals_only(&outcome.reveal("cents").unwrap().bytes, 16, 3, b"34");

    // Searching, a second attempt starts on the cents digits, so those
    // positions belong to both groups.
    let search = PatternDefinition::new("money", pattern).with_capacity(16);
    let outcome = headless_scan(&search, input)?;
    assert_eq!(outcome.match_count, 1);
    assert_reveals_only(&outcome.reveal("cents").unwrap().bytes, 16, 9, b"34");
    assert_eq!(outcome.reveal("dollars").unwrap().spans, vec![6..8, 9..11]);
    Ok(())
}

#[test]
fn test_user_and_host_from_one_pass() -> Result<()> {
    let pattern = r"(?<user>[a-z]+)@(?<host>[a-z]+)\.com";

    let anchored = PatternDefinition::new("address", pattern).with_capacity(32).with_anchored(true);
    let outcome = headless_scan(&anchored, b"joe@mail.com\r\n")?;
    assert_eq!(outcome.match_count, 1);
    assert_reveals_only(&outcome.reveal("user").unwrap().bytes, 32, 0, b"joe");
    assert_reveals_only(&outcome.reveal("host").unwrap().bytes, 32, 4, b"mail");

    let search = PatternDefinition::new("address", pattern).with_capacity(32);
    let outcome = headless_scan(&search, b"to:joe@mail.com\r\n")?;
    assert_eq!(outcome.match_count, 1);
    assert_reveals_only(&outcome.reveal("host").unwrap().bytes, 32, 7, b"mail");
    assert!(outcome.reveal("user").unwrap().spans.contains(&(3..6)));
    Ok(())
}

#[test]
fn test_venmo_timestamp() -> Result<()> {
    let input = b"xftkly; d=venmo.com; t=1698260687; h=Fro";
    let def = default_definition("venmo_timestamp");
    let outcome = headless_scan(&def, input)?;
    assert_eq!(outcome.match_count, 1);
    assert!(outcome.satisfies_policy());
    let start = b"xftkly; d=venmo.com; t=".len();
    assert_reveals_only(&outcome.reveal("timestamp").unwrap().bytes, def.max_bytes, start, b"1698260687");
    Ok(())
}

#[test]
fn test_venmo_timestamp_needs_lowercase_domain_tag() -> Result<()> {
    let input = b"xftkly; D=venmo.com; t=1698260687; h=Fro";
    let outcome = headless_scan(&default_definition("venmo_timestamp"), input)?;
    assert_eq!(outcome.match_count, 0);
    assert!(!outcome.satisfies_policy());
    Ok(())
}

#[test]
fn test_venmo_payer_id_accepts_on_every_digit() -> Result<()> {
    let input: &[u8] = b"= 3D\"ht=\r\ntps://venmo.com/code?user_id=3D274432553155354535&actor_id=3D1168869611798565=\r\n289664>>>>";
    let engine = DfaEngine::from_definition(&default_definition("venmo_payer_id"))?;
    let outcome = engine.scan(input)?;
    assert_eq!(outcome.match_count, 1);
    assert_eq!(outcome.reveal("payer_id").unwrap().revealed_text(), "274432553155354535");

    // One rising edge, but the automaton sits in an accepting state on each
    // of the 18 digits.
    let trace = engine.trace(&engine.prepare(input)?)?;
    let pattern = engine.compiled_pattern();
    let accepting = trace.as_slice().iter().filter(|&&s| pattern.is_accepting(s)).count();
    assert_eq!(accepting, 18);
    Ok(())
}

#[test]
fn test_venmo_payer_id_rejects_mangled_link() -> Result<()> {
    let input: &[u8] = b"= 3D\"ht=\r\ntps://venmo.com/code?user_id=3DD74432553155354535&actor_id=3DD168869611798565=\r\n289664>>>>";
    let outcome = headless_scan(&default_definition("venmo_payer_id"), input)?;
    assert_eq!(outcome.match_count, 0);
    Ok(())
}

#[test]
fn test_hdfc_date() -> Result<()> {
    let input = b"\r\ndate:Sat, 14 Oct 2023 22:09:12 +0530\r\n";
    let def = default_definition("hdfc_date");
    let outcome = headless_scan(&def, input)?;
    assert_eq!(outcome.match_count, 1);
    assert_reveals_only(
        &outcome.reveal("date").unwrap().bytes,
        def.max_bytes,
        b"\r\ndate:".len(),
        b"Sat, 14 Oct 2023 22:09:12 +0530",
    );
    Ok(())
}

#[test]
fn test_hdfc_date_needs_date_header() -> Result<()> {
    let input = b"\r\ndape:Sat, 14 Oct 2023 22:09:12 +0530\r\n";
    let outcome = headless_scan(&default_definition("hdfc_date"), input)?;
    assert_eq!(outcome.match_count, 0);
    Ok(())
}
