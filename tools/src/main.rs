//! kapusta-report: headless front end for the loan-request report.
//!
//! Usage:
//!   kapusta-report report   [--json data.json] [--sql myRequest.sql] [--aliases "amount=Сумма"]
//!   kapusta-report fetch    [--url https://...] [--param rating_min=50] [--insecure | --verify-tls]
//!   kapusta-report calc     --amount 500 --rate 700 --period 30
//!   kapusta-report settings
//!   kapusta-report --ipc-mode

use anyhow::{bail, Result};
use kapusta_core::{
    calculator::{estimate_yield_from_text, YieldEstimate},
    config::{ApiParams, SettingsStore},
    fetch::{HttpFetcher, TlsVerification},
    query::ReportTable,
    session::ReportSession,
    types::{ParamMap, Scalar},
};
use std::env;
use std::io::{self, BufRead, Write};

/// TLS posture used when no settings file records one.
const STARTUP_TLS: TlsVerification = TlsVerification::Verify;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Refresh,
    Fetch,
    SetJsonPath { path: String },
    SetBaseUrl { url: String },
    SetAliases { aliases: String },
    SetParams { params: ParamMap },
    SetTls { verify: bool },
    Calc {
        amount: String,
        rate: String,
        period: String,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    columns: Vec<String>,
    titles: Vec<String>,
    rows: Vec<Vec<String>>,
    status: String,
    cached_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    calculator: Option<CalcState>,
}

#[derive(serde::Serialize)]
struct CalcState {
    income_with_commission: String,
    income_without_commission: String,
    annual_yield: String,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let mode = args
        .get(1)
        .map(String::as_str)
        .filter(|a| !a.starts_with("--"))
        .unwrap_or("report");

    let settings = match flag_value(&args, "--settings") {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::in_working_dir()?,
    };
    let mut session = ReportSession::load(settings, STARTUP_TLS);
    if let Some(sql) = flag_value(&args, "--sql") {
        session = session.with_sql_path(sql);
    }

    if ipc_mode {
        return run_ipc_loop(&mut session);
    }

    match mode {
        "report" => {
            apply_overrides(&mut session, &args)?;
            if !session.has_data() {
                println!("No JSON file at {}. Pass --json or run `fetch` first.", session.config.json_path);
                return Ok(());
            }
            let table = session.refresh()?.clone();
            print_table(&table, &session.column_titles());
            println!("rows: {}", table.row_count());
        }
        "fetch" => {
            apply_overrides(&mut session, &args)?;
            let fetcher = HttpFetcher::new(session.config.tls)?;
            let fetched = session.fetch_and_refresh(&fetcher)?;
            if let Some(table) = session.last_table() {
                print_table(table, &session.column_titles());
            }
            println!("fetched rows: {fetched}");
        }
        "calc" => {
            let estimate = estimate_yield_from_text(
                flag_value(&args, "--amount").unwrap_or("500"),
                flag_value(&args, "--rate").unwrap_or("700"),
                flag_value(&args, "--period").unwrap_or("30"),
            );
            print_calc(&estimate);
        }
        "settings" => {
            let config = &session.config;
            println!("=== SETTINGS ===");
            println!("  json_path:    {}", config.json_path);
            println!("  sql_path:     {}", session.sql_path().display());
            println!("  api_base_url: {}", config.api_base_url);
            println!("  verify_tls:   {}", config.tls.verifies());
            println!("  aliases:      {}", config.aliases);
            for (key, value) in config.api_params.to_params() {
                println!("  {key:<16}{value}");
            }
        }
        other => bail!("Unknown mode: {other} (expected report, fetch, calc or settings)"),
    }
    Ok(())
}

fn run_ipc_loop(session: &mut ReportSession) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        if matches!(cmd, IpcCommand::Quit) {
            break;
        }
        let state = handle_command(session, cmd);
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

/// Apply one command. Failures are reported in the state and leave the
/// last good table in place.
fn handle_command(session: &mut ReportSession, cmd: IpcCommand) -> UiState {
    let mut calculator = None;
    let outcome: Result<String> = match cmd {
        IpcCommand::GetState | IpcCommand::Quit => Ok(String::new()),
        IpcCommand::Refresh => session
            .refresh()
            .map(|t| format!("rows: {}", t.row_count()))
            .map_err(Into::into),
        IpcCommand::Fetch => HttpFetcher::new(session.config.tls)
            .and_then(|fetcher| session.fetch_and_refresh(&fetcher))
            .map(|n| format!("fetched rows: {n}"))
            .map_err(Into::into),
        IpcCommand::SetJsonPath { path } => session
            .set_json_path(&path)
            .map(|_| String::new())
            .map_err(Into::into),
        IpcCommand::SetBaseUrl { url } => session
            .set_base_url(&url)
            .map(|_| String::new())
            .map_err(Into::into),
        IpcCommand::SetAliases { aliases } => session
            .set_aliases(&aliases)
            .map(|_| String::new())
            .map_err(Into::into),
        IpcCommand::SetParams { params } => session
            .set_api_params(ApiParams::from_params(&params))
            .map(|_| String::new())
            .map_err(Into::into),
        IpcCommand::SetTls { verify } => session
            .set_tls(TlsVerification::from_verify_flag(verify))
            .map(|_| String::new())
            .map_err(Into::into),
        IpcCommand::Calc { amount, rate, period } => {
            let (gross, net, annual) =
                estimate_yield_from_text(&amount, &rate, &period).display_values();
            calculator = Some(CalcState {
                income_with_commission: gross,
                income_without_commission: net,
                annual_yield: annual,
            });
            Ok(String::new())
        }
    };

    let (status, error) = match outcome {
        Ok(status) => (status, None),
        Err(e) => {
            log::warn!("command failed: {e:#}");
            (String::new(), Some(e.to_string()))
        }
    };
    build_ui_state(session, status, error, calculator)
}

fn build_ui_state(
    session: &ReportSession,
    status: String,
    error: Option<String>,
    calculator: Option<CalcState>,
) -> UiState {
    let (columns, rows): (Vec<String>, Vec<Vec<String>>) = match session.last_table() {
        Some(t) => (
            t.columns.clone(),
            t.rows.iter().map(|r| r.iter().map(display_scalar).collect()).collect(),
        ),
        None => (Vec::new(), Vec::new()),
    };
    UiState {
        columns,
        titles: session.column_titles(),
        rows,
        status,
        cached_items: session.cached_item_count(),
        error,
        calculator,
    }
}

fn apply_overrides(session: &mut ReportSession, args: &[String]) -> Result<()> {
    if let Some(path) = flag_value(args, "--json") {
        session.set_json_path(path)?;
    }
    if let Some(url) = flag_value(args, "--url") {
        session.set_base_url(url)?;
    }
    if let Some(aliases) = flag_value(args, "--aliases") {
        session.set_aliases(aliases)?;
    }
    if args.iter().any(|a| a == "--insecure") {
        session.set_tls(TlsVerification::Skip)?;
    } else if args.iter().any(|a| a == "--verify-tls") {
        session.set_tls(TlsVerification::Verify)?;
    }

    let overrides: Vec<(&str, &str)> = args
        .windows(2)
        .filter(|w| w[0] == "--param")
        .filter_map(|w| w[1].split_once('='))
        .collect();
    if !overrides.is_empty() {
        let mut params = session.config.api_params.to_params();
        for (key, value) in overrides {
            params.insert(key.trim().to_string(), value.trim().to_string());
        }
        session.set_api_params(ApiParams::from_params(&params))?;
    }
    Ok(())
}

fn print_table(table: &ReportTable, titles: &[String]) {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|r| r.iter().map(display_scalar).collect())
        .collect();

    let mut widths: Vec<usize> = titles.iter().map(|t| t.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{v:<w$}", w = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    };
    println!("{}", line(titles));
    println!(
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    );
    for row in &cells {
        println!("{}", line(row));
    }
}

fn print_calc(estimate: &YieldEstimate) {
    let (gross, net, annual) = estimate.display_values();
    println!("=== CALCULATOR ===");
    println!("  income with commission:    {gross}");
    println!("  income without commission: {net}");
    println!("  annual yield (net):        {annual}");
}

/// Null renders as an empty cell.
fn display_scalar(value: &Scalar) -> String {
    match value {
        Scalar::Null => String::new(),
        Scalar::Integer(i) => i.to_string(),
        Scalar::Real(f) => f.to_string(),
        Scalar::Text(s) => s.clone(),
        Scalar::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
