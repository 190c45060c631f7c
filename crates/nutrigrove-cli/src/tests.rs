use super::*;

#[test]
fn parses_scrape_with_defaults() {
    let cli = Cli::try_parse_from(["nutrigrove-cli", "scrape"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Scrape {
            date: None,
            workers: None,
            output: None,
            weekend_policy: None,
            no_upload: false,
            ..
        }
    ));
}

#[test]
fn parses_scrape_with_everything() {
    let cli = Cli::try_parse_from([
        "nutrigrove-cli",
        "scrape",
        "2025-03-08",
        "--site",
        "umassd",
        "--site",
        "wpi",
        "--workers",
        "2",
        "--output",
        "/tmp/menus",
        "--weekend-policy",
        "skip-brunch",
        "--no-upload",
    ])
    .expect("expected valid cli args");

    let Commands::Scrape {
        date,
        sites,
        workers,
        output,
        weekend_policy,
        no_upload,
    } = cli.command
    else {
        panic!("expected scrape command");
    };
    assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 8));
    assert_eq!(sites, vec!["umassd", "wpi"]);
    assert_eq!(workers, Some(2));
    assert_eq!(output, Some(PathBuf::from("/tmp/menus")));
    assert_eq!(weekend_policy, Some(WeekendPolicy::SkipBrunch));
    assert!(no_upload);
}

#[test]
fn rejects_malformed_date() {
    assert!(Cli::try_parse_from(["nutrigrove-cli", "scrape", "03/08/2025"]).is_err());
}

#[test]
fn rejects_unknown_weekend_policy() {
    assert!(
        Cli::try_parse_from(["nutrigrove-cli", "scrape", "--weekend-policy", "brunch-only"])
            .is_err()
    );
}

#[test]
fn parses_normalize_command() {
    let cli = Cli::try_parse_from([
        "nutrigrove-cli",
        "normalize",
        "--input",
        "data/scraped/umassd/food_items_lunch.json",
        "--meal",
        "lunch",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Normalize {
            meal: Some(MealType::Lunch),
            ..
        }
    ));
}

#[test]
fn normalize_requires_input() {
    assert!(Cli::try_parse_from(["nutrigrove-cli", "normalize"]).is_err());
}

#[test]
fn parses_sites_command() {
    let cli = Cli::try_parse_from(["nutrigrove-cli", "sites"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Sites));
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["nutrigrove-cli"]).is_err());
}

#[test]
fn scrape_args_fall_back_to_config() {
    let config = nutrigrove_core::load_app_config_from_env().unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
    let cli = Cli::try_parse_from(["nutrigrove-cli", "scrape"]).unwrap();

    let args = cli.command.into_scrape_args(&config, today).unwrap();

    assert_eq!(args.date, today);
    assert_eq!(args.workers, config.max_workers);
    assert_eq!(args.output, config.output_dir);
    assert_eq!(args.weekend_policy, config.weekend_policy);
    assert!(args.upload);
    assert!(args.sites.is_empty());
}

#[test]
fn non_scrape_commands_have_no_scrape_args() {
    let config = nutrigrove_core::load_app_config_from_env().unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
    assert!(Commands::Sites.into_scrape_args(&config, today).is_none());
}
