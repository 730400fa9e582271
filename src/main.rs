// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! urlfetch CLI
//!
//! Opens a URL through the fetch stream adapter and prints the result.

use std::env;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use urlfetch::{
    ApiTransport, DirectTransport, HttpApiProxy, OpenMode, RequestMethod, StreamContext,
    StreamContextOptions, UrlFetchConfig, WrapperRegistry,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("urlfetch=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "fetch" | "headers" => {
            if args.len() < 3 {
                eprintln!("Usage: urlfetch {} <url> [OPTIONS]", args[1]);
                return ExitCode::from(1);
            }
            let invocation = match Invocation::parse(&args[2], &args[3..]) {
                Ok(invocation) => invocation,
                Err(e) => {
                    eprintln!("{}", e);
                    return ExitCode::from(1);
                }
            };
            run(invocation, args[1] == "headers").await
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("urlfetch {}", urlfetch::VERSION);
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"urlfetch - Open URLs through the urlfetch service

USAGE:
    urlfetch <COMMAND> [OPTIONS]

COMMANDS:
    fetch <url>     Fetch a URL and write the body to stdout
    headers <url>   Fetch a URL and print the response headers
    help            Show this help message
    version         Show version information

OPTIONS:
    -X <method>     Request method (default GET)
    -H <header>     Request header "Key: Value", repeatable
    -d <data>       Request body, sent verbatim
    -A <agent>      User agent
    -t <seconds>    Deadline in seconds
    --direct        Fetch locally instead of calling the API endpoint

ENVIRONMENT:
    API_HOST, API_PORT, URLFETCH_RPC_PATH, URLFETCH_DEFAULT_DEADLINE,
    URLFETCH_MAX_REDIRECTS, URLFETCH_TICKET
    RUST_LOG        Log filter (default urlfetch=info)

EXAMPLES:
    urlfetch fetch http://www.google.com -t 5
    urlfetch fetch http://example.com/form -X POST \
        -H "Content-type: application/x-www-form-urlencoded" -d "a=1&b=2"
"#
    );
}

struct Invocation {
    url: String,
    options: StreamContextOptions,
    direct: bool,
}

impl Invocation {
    fn parse(url: &str, rest: &[String]) -> Result<Self, String> {
        let mut options = StreamContextOptions::new();
        let mut headers: Vec<String> = Vec::new();
        let mut direct = false;

        let mut iter = rest.iter();
        while let Some(flag) = iter.next() {
            let mut value = || {
                iter.next()
                    .cloned()
                    .ok_or_else(|| format!("Missing value for {}", flag))
            };
            match flag.as_str() {
                "-X" => {
                    let method: RequestMethod = value()?.parse().map_err(|e| format!("{}", e))?;
                    options = options.method(method);
                }
                "-H" => headers.push(value()?),
                "-d" => options = options.content(value()?),
                "-A" => options = options.user_agent(value()?),
                "-t" => {
                    let raw = value()?;
                    let secs: f64 = raw
                        .parse()
                        .map_err(|_| format!("Invalid deadline: {}", raw))?;
                    options = options.timeout(secs);
                }
                "--direct" => direct = true,
                other => return Err(format!("Unknown option: {}", other)),
            }
        }

        if !headers.is_empty() {
            options = options.header_lines(headers);
        }

        Ok(Self {
            url: url.to_string(),
            options,
            direct,
        })
    }
}

async fn run(invocation: Invocation, headers_only: bool) -> ExitCode {
    let config = match UrlFetchConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };

    let transport: Arc<dyn ApiTransport> = if invocation.direct {
        Arc::new(DirectTransport::with_config(config))
    } else {
        match HttpApiProxy::with_config(config) {
            Ok(proxy) => Arc::new(proxy),
            Err(e) => {
                eprintln!("Failed to create API proxy: {}", e);
                return ExitCode::from(1);
            }
        }
    };

    let registry = WrapperRegistry::with_urlfetch(transport);
    let context = StreamContext::http(invocation.options);

    let stream = match registry
        .open(&invocation.url, OpenMode::read(), &context)
        .await
    {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("Failed to open {}: {}", invocation.url, e);
            return ExitCode::from(1);
        }
    };

    if headers_only {
        for line in stream.response_header_lines() {
            println!("{}", line);
        }
        return ExitCode::SUCCESS;
    }

    let status = stream.status();
    let body = stream.into_bytes();
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout.write_all(&body).and_then(|_| stdout.flush()) {
        eprintln!("Failed to write body: {}", e);
        return ExitCode::from(1);
    }

    if (200..400).contains(&status) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}
