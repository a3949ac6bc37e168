//! Configuration defaults and validation

use clap::Parser;
use ffx::categories::Collection;
use ffx::config::{from_args, CliArgs, Output};
use ffx::theme::Theme;
use ffx::time_range::TimeRange;

fn parse(args: &[&str]) -> anyhow::Result<ffx::Config> {
    let mut argv = vec!["ffx"];
    argv.extend_from_slice(args);
    from_args(CliArgs::try_parse_from(argv)?)
}

#[test]
fn explicit_flags_are_applied() {
    let cfg = parse(&[
        "--api-url",
        "https://firefly.example.com/",
        "--namespace",
        "ns1",
        "--collection",
        "operations",
        "--range",
        "7d",
        "--buckets",
        "48",
        "--theme",
        "amber",
        "--output",
        "json",
        "--refresh-secs",
        "30",
    ])
    .unwrap();

    assert_eq!(cfg.api_url, "https://firefly.example.com");
    assert_eq!(cfg.namespace, "ns1");
    assert_eq!(cfg.collection, Collection::Operations);
    assert_eq!(cfg.range, TimeRange::Last7Days);
    assert_eq!(cfg.buckets, 48);
    assert_eq!(cfg.theme, Theme::AmberCrt);
    assert_eq!(cfg.output, Output::Json);
    assert_eq!(cfg.refresh_secs, Some(30));
}

#[test]
fn out_of_range_values_are_rejected() {
    assert!(parse(&["--buckets", "0"]).is_err());
    assert!(parse(&["--buckets", "101"]).is_err());
    assert!(parse(&["--rpc-timeout-ms", "10"]).is_err());
    assert!(parse(&["--rpc-retries", "11"]).is_err());
    assert!(parse(&["--refresh-secs", "1"]).is_err());
}

#[test]
fn bad_urls_and_enums_are_rejected() {
    assert!(parse(&["--api-url", "ftp://nope"]).is_err());
    assert!(parse(&["--api-url", ""]).is_err());
    assert!(parse(&["--collection", "wallets"]).is_err());
    assert!(parse(&["--range", "2y"]).is_err());
    assert!(parse(&["--output", "xml"]).is_err());
    assert!(parse(&["--namespace", " "]).is_err());
}
