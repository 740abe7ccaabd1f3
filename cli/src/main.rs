//! fxconv
//!
//! Terminal front end for the currency converter: one-shot conversions, the
//! known currency list, and an interactive session.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod command;
mod config;
mod session;

use command::{Command, HELP};
use config::CliConfig;
use fxconv_common::{Currency, SystemClock};
use fxconv_converter::{accepts_input, validate, Action, AmountError, Converter};
use fxconv_fx::{FloatRatesProvider, RateEngine};
use session::Session;

/// fxconv CLI
#[derive(Parser, Debug)]
#[command(name = "fxconv")]
#[command(about = "Currency converter backed by daily FloatRates feeds")]
struct Args {
    /// Rate feed root URL
    #[arg(long, global = true)]
    rates_url: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Convert one amount and exit
    Convert {
        /// Amount to convert
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Base currency
        #[arg(short, long)]
        from: Option<String>,

        /// Target currency
        #[arg(short, long)]
        to: Option<String>,
    },

    /// List currencies known to the feed
    Currencies {
        /// Base currency whose feed is queried
        #[arg(short, long)]
        base: Option<String>,
    },

    /// Interactive session (default)
    Interactive,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = CliConfig::from_env()?;
    if let Some(url) = args.rates_url {
        config.rates_url = url;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    config.log_json |= args.log_json;

    // Initialize logging
    let stderr_plain = (!config.log_json)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let stderr_json = config
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(stderr_plain)
        .with(stderr_json)
        .init();

    match args.command.unwrap_or(Mode::Interactive) {
        Mode::Convert { amount, from, to } => {
            if let Some(from) = from {
                config.default_base = from;
            }
            if let Some(to) = to {
                config.default_target = to;
            }
            let mut session = build_session(&config)?;
            convert_once(&mut session, amount).await
        }
        Mode::Currencies { base } => {
            if let Some(base) = base {
                config.default_base = base;
            }
            let mut session = build_session(&config)?;
            list_currencies(&mut session).await
        }
        Mode::Interactive => {
            let mut session = build_session(&config)?;
            interactive(&mut session).await
        }
    }
}

fn build_session(config: &CliConfig) -> anyhow::Result<Session> {
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("{}", e));
    }

    let provider = FloatRatesProvider::new(config.provider_config())?;
    info!(rates_url = %config.rates_url, "Rate provider ready");

    Ok(Session::new(
        Converter::new(config.converter_config()),
        RateEngine::new(Arc::new(provider)),
        Arc::new(SystemClock),
    ))
}

async fn convert_once(session: &mut Session, amount: String) -> anyhow::Result<()> {
    let pair = session.converter().state().pair();
    if pair.is_identity() {
        anyhow::bail!("Base and target currencies must differ");
    }

    session.dispatch(Action::Init);
    session.settle().await;

    if let Some(e) = session.converter().visible_error() {
        anyhow::bail!("{}", e);
    }
    for code in [&pair.base, &pair.target] {
        if !session.converter().is_selectable(code) {
            anyhow::bail!("Unknown currency: {}", code);
        }
    }

    if !accepts_input(&amount) {
        let e = validate(&amount).unwrap_or(AmountError::NotANumber);
        anyhow::bail!("{}", e);
    }
    session.dispatch(Action::SetAmount(amount));
    if let Some(e) = session.converter().amount_error() {
        anyhow::bail!("{}", e);
    }

    session.dispatch(Action::Convert);
    session.settle().await;

    match session.converter().summary() {
        Some(summary) => {
            println!("{}", summary);
            Ok(())
        }
        None => match session.converter().visible_error() {
            Some(e) => anyhow::bail!("{}", e),
            None => anyhow::bail!("Nothing to convert"),
        },
    }
}

async fn list_currencies(session: &mut Session) -> anyhow::Result<()> {
    session.dispatch(Action::Init);
    session.settle().await;

    let converter = session.converter();
    if let Some(e) = converter.visible_error() {
        anyhow::bail!("{}", e);
    }

    let base = &converter.state().base_currency;
    let table = converter.store().rates_for(base);
    for code in converter.currency_codes() {
        let name = table
            .and_then(|table| table.get(code))
            .and_then(|entry| entry.name.as_deref())
            .unwrap_or("");
        println!("{:<4} {}", code, name);
    }
    Ok(())
}

async fn interactive(session: &mut Session) -> anyhow::Result<()> {
    info!("Running in interactive mode");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    session.dispatch(Action::Init);
    println!("{}", HELP);
    println!("{}", session.render());

    loop {
        tokio::select! {
            Some(completion) = session.next_completion(), if session.has_pending() => {
                let base = session.apply_completion(completion);
                println!("Rates for {} updated", base);
                println!("{}", session.render());
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{}", HELP),
                    Ok(Command::Show) => println!("{}", session.render()),
                    Ok(Command::Currencies) => {
                        let codes: Vec<&str> = session
                            .converter()
                            .currency_codes()
                            .iter()
                            .map(Currency::code)
                            .collect();
                        if codes.is_empty() {
                            println!("No currencies loaded yet");
                        } else {
                            println!("{}", codes.join(" "));
                        }
                    }
                    Ok(Command::Base(code)) | Ok(Command::Target(code))
                        if !session.converter().is_selectable(&code) =>
                    {
                        println!("Unknown currency: {}", code);
                    }
                    Ok(Command::Amount(text)) if !accepts_input(&text) => {
                        println!("Amount input rejected: {:?}", text);
                    }
                    Ok(command) => {
                        if let Some(action) = command.into_action() {
                            session.dispatch(action);
                        }
                        println!("{}", session.render());
                    }
                    Err(command::CommandError::Empty) => {}
                    Err(e) => println!("{} (try `help`)", e),
                }
            }
        }
    }

    info!("Session ended");
    Ok(())
}
