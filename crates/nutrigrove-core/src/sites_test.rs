use std::path::Path;

use chrono::NaiveDate;

use super::*;

fn site(key: &str) -> SiteConfig {
    SiteConfig {
        key: key.to_string(),
        name: "The Grove".to_string(),
        url_template: "https://example.edu/menu/location/the-grove/".to_string(),
        requires_date: true,
        requires_meal_type: true,
        api_based: false,
        table: "cleaned_data".to_string(),
        layout: SectionLayoutConfig::Auto,
        probe_path: None,
        stealth: true,
        challenge_handling: true,
    }
}

fn file(sites: Vec<SiteConfig>) -> SitesFile {
    SitesFile { sites }
}

#[test]
fn build_url_appends_date_and_meal() {
    let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
    assert_eq!(
        site("grove").build_url(date, MealType::Lunch),
        "https://example.edu/menu/location/the-grove/2025-03-05/lunch"
    );
}

#[test]
fn build_url_respects_flags() {
    let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
    let mut s = site("grove");
    s.requires_meal_type = false;
    assert_eq!(
        s.build_url(date, MealType::Dinner),
        "https://example.edu/menu/location/the-grove/2025-03-05"
    );
    s.requires_date = false;
    assert_eq!(
        s.build_url(date, MealType::Dinner),
        "https://example.edu/menu/location/the-grove"
    );
}

#[test]
fn validate_accepts_valid_sites() {
    let mut probed = site("probed");
    probed.layout = SectionLayoutConfig::Probed;
    probed.probe_path = Some("//main/div[{index}]/table".to_string());
    assert!(validate_sites(&file(vec![site("grove"), probed])).is_ok());
}

#[test]
fn validate_rejects_empty_key() {
    let err = validate_sites(&file(vec![site("  ")])).unwrap_err();
    assert!(err.to_string().contains("site key must be non-empty"));
}

#[test]
fn validate_rejects_duplicate_key_case_insensitively() {
    let err = validate_sites(&file(vec![site("grove"), site("Grove")])).unwrap_err();
    assert!(err.to_string().contains("duplicate site key"));
}

#[test]
fn validate_rejects_empty_name_and_url() {
    let mut nameless = site("grove");
    nameless.name = String::new();
    let err = validate_sites(&file(vec![nameless])).unwrap_err();
    assert!(err.to_string().contains("empty name"));

    let mut urlless = site("grove");
    urlless.url_template = " ".to_string();
    let err = validate_sites(&file(vec![urlless])).unwrap_err();
    assert!(err.to_string().contains("empty url_template"));
}

#[test]
fn validate_rejects_probed_layout_without_path() {
    let mut s = site("grove");
    s.layout = SectionLayoutConfig::Probed;
    let err = validate_sites(&file(vec![s])).unwrap_err();
    assert!(err.to_string().contains("no probe_path"));
}

#[test]
fn validate_rejects_probe_path_without_index() {
    let mut s = site("grove");
    s.probe_path = Some("//main/div[1]/table".to_string());
    let err = validate_sites(&file(vec![s])).unwrap_err();
    assert!(err.to_string().contains("{index}"));
}

#[test]
fn parse_sites_applies_defaults() {
    let yaml = r"
sites:
  - key: grove
    name: The Grove
    url_template: https://example.edu/menu
    table: cleaned_data
";
    let parsed = parse_sites(yaml).expect("minimal site should parse");
    let s = &parsed.sites[0];
    assert!(!s.requires_date);
    assert!(!s.api_based);
    assert_eq!(s.layout, SectionLayoutConfig::Auto);
    assert!(s.stealth);
    assert!(s.challenge_handling);
}

#[test]
fn parse_sites_rejects_unknown_layout() {
    let yaml = r"
sites:
  - key: grove
    name: The Grove
    url_template: https://example.edu/menu
    table: cleaned_data
    layout: grid
";
    assert!(matches!(
        parse_sites(yaml),
        Err(ConfigError::SitesFileParse(_))
    ));
}

#[test]
fn select_filters_in_config_order() {
    let sites = file(vec![site("a"), site("b"), site("c")]);
    let picked = sites
        .select(&["c".to_string(), "a".to_string()])
        .unwrap()
        .into_iter()
        .map(|s| s.key.as_str())
        .collect::<Vec<_>>();
    assert_eq!(picked, vec!["a", "c"]);
    assert_eq!(sites.select(&[]).unwrap().len(), 3);
}

#[test]
fn select_rejects_unknown_key() {
    let sites = file(vec![site("a")]);
    assert!(matches!(
        sites.select(&["zzz".to_string()]),
        Err(ConfigError::UnknownSite(ref k)) if k == "zzz"
    ));
}

#[test]
fn load_sites_missing_file_is_io_error() {
    let result = load_sites(Path::new("/definitely/not/here/sites.yaml"));
    assert!(matches!(result, Err(ConfigError::SitesFileIo { .. })));
}

#[test]
fn load_sites_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("sites.yaml");
    assert!(
        path.exists(),
        "sites.yaml missing at {path:?}; required for this test"
    );
    let sites_file = load_sites(&path).expect("failed to load sites.yaml");
    assert!(
        sites_file.sites.iter().any(|s| !s.api_based),
        "sites.yaml should contain at least one browser-scraped site"
    );
}

#[test]
fn layout_display() {
    assert_eq!(SectionLayoutConfig::Tables.to_string(), "tables");
    assert_eq!(SectionLayoutConfig::Probed.to_string(), "probed");
    assert_eq!(SectionLayoutConfig::Auto.to_string(), "auto");
}
