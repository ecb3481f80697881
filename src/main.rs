use clap::{CommandFactory, Parser};
use colored::*;
use std::process;
use std::sync::Arc;
use tokio::sync::mpsc;
use url::Url;

use passlens::{
    parse_custom_headers, read_lines, AnalysisBackend, AnalysisClient, AuditEngine, AuditOutcome,
    RemoteBackend, ResultAggregator,
};

#[derive(Parser, Debug)]
#[command(
    name = "PASSLENS",
    author = "passlens",
    version,
    about = "Password Exposure Auditor",
    override_usage = "passlens <password>  <options>",
    after_help = "\x1b[1;36mEXAMPLES:\x1b[0m
  Local audit:                    passlens 'Tr0ub4dor&3'
  AI-assisted audit:              passlens 'Tr0ub4dor&3' --endpoint https://host/api/password/analyze
  Audit a list:                   passlens -l passwords.txt
  Force local heuristics:         passlens 'Tr0ub4dor&3' --endpoint https://host/api --offline
  Through a proxy (Burp):         passlens 'secret' --endpoint https://host/api --proxy http://127.0.0.1:8080
  Custom headers:                 passlens 'secret' --endpoint https://host/api -H \"Authorization: Bearer TOKEN\"
  Verbose pipeline logging:       passlens 'secret' -v
  Full combo:                     passlens -l passwords.txt --endpoint https://host/api -t 4 --timeout 15 -o audit.json"
)]
pub struct Args {
    #[arg(required_unless_present = "list")]
    pub password: Option<String>,

    #[arg(short = 't', long, default_value_t = 8, help = "Number of concurrent analysis requests")]
    pub threads: usize,

    #[arg(long, default_value_t = 10, help = "Request timeout in seconds")]
    pub timeout: u64,

    #[arg(short = 'v', long, default_value_t = false, help = "Show pipeline debug logging (Verbose Mode)")]
    pub verbose: bool,

    #[arg(short = 'o', long, default_value = "audit_results.json", help = "Output file path for results")]
    pub output: String,

    #[arg(long, help = "Remote analysis endpoint (e.g. https://host/api/password/analyze)")]
    pub endpoint: Option<String>,

    #[arg(long, default_value_t = false, help = "Skip the remote service and audit with local heuristics only")]
    pub offline: bool,

    #[arg(long, help = "Proxy URL (e.g. http://127.0.0.1:8080)")]
    pub proxy: Option<String>,

    #[arg(short = 'H', long = "header", help = "Custom header (e.g. \"Authorization: Bearer TOKEN\")")]
    pub headers: Vec<String>,

    #[arg(short = 'l', long = "list", help = "File containing passwords to audit (one per line)")]
    pub list: Option<String>,
}

#[tokio::main]
async fn main() {
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    print_banner();

    let mut subjects: Vec<String> = Vec::new();

    if let Some(ref list_path) = args.list {
        match read_lines(list_path) {
            Ok(lines) => {
                println!(
                    "{}",
                    format!("[+] Loaded {} password(s) from {}", lines.len(), list_path)
                        .green()
                        .bold()
                );
                subjects.extend(lines);
            }
            Err(e) => {
                eprintln!("{}", format!("[!] Failed to read '{}': {}", list_path, e).red());
                process::exit(1);
            }
        }
    }

    if let Some(ref password) = args.password {
        subjects.push(password.clone());
    }

    if subjects.is_empty() {
        eprintln!("{}", "[!] No passwords specified. Provide one or use -l <file>.".red());
        let mut cmd = Args::command();
        cmd.print_help().unwrap();
        process::exit(1);
    }

    let endpoint = validate_endpoint(&args);

    if let Some(ref proxy) = args.proxy {
        if Url::parse(proxy).is_err() {
            eprintln!("{}", format!("[!] Invalid proxy URL: {}", proxy).red());
            process::exit(1);
        }
    }

    print_audit_config(&args, endpoint.as_ref(), subjects.len());

    let backend: Option<Arc<dyn AnalysisBackend>> = endpoint.map(|endpoint| {
        let custom_headers = parse_custom_headers(&args.headers);
        let client = AnalysisClient::new(args.timeout, args.proxy.as_deref(), &custom_headers);
        Arc::new(RemoteBackend::new(endpoint, client)) as Arc<dyn AnalysisBackend>
    });

    match &backend {
        Some(backend) => println!(
            "\n{}",
            format!("[*] Auditing via {}...", backend.name()).bright_cyan().bold()
        ),
        None => println!("\n{}", "[*] Auditing with local heuristics...".bright_cyan().bold()),
    }

    let engine = AuditEngine::new(backend, args.threads);
    let (result_tx, result_rx) = mpsc::channel::<AuditOutcome>(100);
    let expected = subjects.len();
    let output_path = args.output.clone();

    let (_, results) = tokio::join!(
        engine.run(subjects, result_tx),
        ResultAggregator::run(result_rx, &output_path, expected)
    );

    ResultAggregator::print_summary_report(&results);
}

/// Resolves the endpoint to use, exiting on an unparseable URL.
/// Offline mode always wins.
fn validate_endpoint(args: &Args) -> Option<Url> {
    if args.offline {
        return None;
    }
    let raw = args.endpoint.as_ref()?;
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(e) => {
            eprintln!("{}", format!("[!] Invalid endpoint URL '{}': {}", raw, e).red());
            process::exit(1);
        }
    }
}

/// Prints the PASSLENS ASCII banner.
fn print_banner() {
    let banner = r#"
    :::::::::     :::      ::::::::   ::::::::  :::        :::::::::: ::::    :::  ::::::::
    :+:    :+:  :+: :+:   :+:    :+: :+:    :+: :+:        :+:        :+:+:   :+: :+:    :+:
    +:+    +:+ +:+   +:+  +:+        +:+        +:+        +:+        :+:+:+  +:+ +:+
    +#++:++#+ +#++:++#++: +#++:++#++ +#++:++#++ +#+        +#++:++#   +#+ +:+ +#+ +#++:++#++
    +#+       +#+     +#+        +#+        +#+ +#+        +#+        +#+  +#+#+#        +#+
    #+#       #+#     #+# #+#    #+# #+#    #+# #+#        #+#        #+#   #+#+# #+#    #+#
    ###       ###     ###  ########   ########  ########## ########## ###    ####  ########
    "#;
    println!("{}", banner.bright_cyan().bold());
    println!("{}", "──────────────────────────────────────────────────".dimmed());
}

/// Prints the audit configuration summary.
fn print_audit_config(args: &Args, endpoint: Option<&Url>, subject_count: usize) {
    let mode_label = match endpoint {
        Some(_) => "AI-assisted (remote + fallback)",
        None => "Local heuristics only",
    };
    let verbose_label = if args.verbose { "ON" } else { "OFF" };

    println!("{}", format!("[+] Subjects:   {}", subject_count).green().bold());
    println!("{}", format!("[+] Mode:       {}", mode_label).magenta().bold());
    if let Some(endpoint) = endpoint {
        println!("{}", format!("[+] Endpoint:   {}", endpoint).blue());
    }
    println!("{}", format!("[+] Threads:    {}", args.threads).blue());
    println!("{}", format!("[+] Timeout:    {}s", args.timeout).blue());
    println!("{}", format!("[+] Output:     {}", args.output).blue());
    println!("{}", format!("[+] Verbose:    {}", verbose_label).magenta());
    if let Some(ref proxy) = args.proxy {
        println!("{}", format!("[+] Proxy:      {}", proxy).yellow());
    }
    if !args.headers.is_empty() {
        println!("{}", format!("[+] Headers:    {} custom", args.headers.len()).yellow());
    }
    println!("{}", "──────────────────────────────────────────────────".dimmed());
}
