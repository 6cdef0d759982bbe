// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use runtime::ApiRuntime;
use shelf_app::{
    AppCommand, AppState, BlockListRenderer, BookApi, LoadCycle, Location, drive,
};
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `shelf --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    let log_path = logging::init(&config)?;

    let document = options.url.as_deref().unwrap_or_else(|| config.base_url());
    let location = Location::parse(document).with_context(|| {
        format!("parse document URL {document:?}; pass --url http://host:port/?i=<page>")
    })?;
    let client = shelf_api::Client::new(document, config.timeout()?).with_context(|| {
        format!(
            "invalid server settings in {}; fix [server].base_url/timeout or --url",
            options.config_path.display()
        )
    })?;
    tracing::info!(
        url = location.as_str(),
        log = %log_path.display(),
        "shelf starting"
    );

    if let Some(title) = &options.lookup {
        print!("{}", lookup_text(&client, title)?);
        return Ok(());
    }

    if options.check_only {
        let pages = client
            .load_page_count()
            .with_context(|| format!("check server {}", client.base_url()))?;
        println!("{pages} pages at {}", client.base_url());
        return Ok(());
    }

    if options.dump {
        print!("{}", dump_text(&client, location)?);
        return Ok(());
    }

    let mut state = AppState::new(location);
    let mut runtime = ApiRuntime::new(client);
    shelf_tui::run_app(&mut state, &mut runtime)?;
    tracing::info!(url = state.location.as_str(), "shelf exiting");
    println!("{}", state.location.as_str());
    Ok(())
}

/// Runs one load cycle on the calling thread and returns the rendered blocks
/// followed by the final document URL.
fn dump_text<A: BookApi + ?Sized>(api: &A, location: Location) -> Result<String> {
    let mut state = AppState::new(location);
    let mut renderer = BlockListRenderer::default();
    let events = state.dispatch(AppCommand::Start);
    drive(&mut state, api, &mut renderer, events);

    if state.cycle == LoadCycle::Failed {
        let reason = state.status_line.as_deref().unwrap_or("load failed");
        bail!("{reason}");
    }

    let mut text = renderer.to_text();
    if !text.is_empty() {
        text.push('\n');
    }
    text.push_str(state.location.as_str());
    text.push('\n');
    Ok(text)
}

fn lookup_text<A: BookApi + ?Sized>(api: &A, title: &str) -> Result<String> {
    let book = api
        .lookup(title)
        .with_context(|| format!("look up {title:?}"))?;
    Ok(match book {
        Some(book) => format!("title: {}\npages: {}\n", book.title, book.pages),
        None => format!("no book titled {title:?}\n"),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    url: Option<String>,
    lookup: Option<String>,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    dump: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        url: None,
        lookup: None,
        print_config_path: false,
        print_example: false,
        check_only: false,
        dump: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--url" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--url requires a document URL"))?;
                options.url = Some(value.as_ref().to_owned());
            }
            "--lookup" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--lookup requires a book title"))?;
                options.lookup = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--dump" => {
                options.dump = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("shelf");
    println!("  --config <path>          Use a specific config path");
    println!("  --url <url>              Open this document URL (page index in ?i=)");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and fetch the page count");
    println!("  --dump                   Load one page, print it and the final URL");
    println!("  --lookup <title>         Print a single book by title");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, dump_text, lookup_text, parse_cli_args};
    use anyhow::Result;
    use shelf_app::Location;
    use shelf_testkit::{ApiCall, Endpoint, FakeShelf, server_error};
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/shelf-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                url: None,
                lookup: None,
                print_config_path: false,
                print_example: false,
                check_only: false,
                dump: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_reads_url_and_lookup_values() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--url",
                "http://localhost:3000/?i=4",
                "--lookup",
                "title-7",
            ],
            default_options_path(),
        )?;
        assert_eq!(options.url.as_deref(), Some("http://localhost:3000/?i=4"));
        assert_eq!(options.lookup.as_deref(), Some("title-7"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        for (flag, expected) in [
            ("--config", "--config requires a file path"),
            ("--url", "--url requires a document URL"),
            ("--lookup", "--lookup requires a book title"),
        ] {
            let error = parse_cli_args(vec![flag], default_options_path())
                .expect_err("missing value should fail");
            assert!(error.to_string().contains(expected));
        }
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_check_and_dump_flags() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--print-config-path",
                "--print-example-config",
                "--check",
                "--dump",
            ],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(options.dump);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }

    #[test]
    fn dump_prints_blocks_and_clamped_url() -> Result<()> {
        let shelf = FakeShelf::seeded(12);
        let text = dump_text(&shelf, Location::parse("http://localhost:3000/?i=9")?)?;
        assert_eq!(
            text,
            "title: title-11\npages: 11\n\ntitle: title-12\npages: 12\n\nhttp://localhost:3000/?i=2\n"
        );
        assert_eq!(shelf.calls(), vec![ApiCall::PageCount, ApiCall::Page(2)]);
        Ok(())
    }

    #[test]
    fn dump_of_empty_shelf_prints_only_url() -> Result<()> {
        let shelf = FakeShelf::default();
        let text = dump_text(&shelf, Location::parse("http://localhost:3000/")?)?;
        assert_eq!(text, "http://localhost:3000/\n");
        Ok(())
    }

    #[test]
    fn dump_surfaces_load_failure() -> Result<()> {
        let shelf = FakeShelf::seeded(3);
        shelf.fail_next(Endpoint::PageCount, server_error());
        let error = dump_text(&shelf, Location::parse("http://localhost:3000/")?)
            .expect_err("failed count should fail the dump");
        assert!(error.to_string().contains("page count failed"));
        Ok(())
    }

    #[test]
    fn lookup_formats_found_and_missing_books() -> Result<()> {
        let shelf = FakeShelf::seeded(3);
        assert_eq!(lookup_text(&shelf, "title-2")?, "title: title-2\npages: 2\n");
        assert_eq!(
            lookup_text(&shelf, "title-9")?,
            "no book titled \"title-9\"\n"
        );
        Ok(())
    }
}
