use clap::Parser;
use futorder::defines::*;
use futorder::error::ConfigError;
use futorder::impls::mark_price_of;
use futorder::util::*;
use futorder::*;

use rust_decimal::Decimal;
use serde_json::Value;
use std::io::{self, BufRead, Write};

type Facade = OrderFacade<BinanceFuturesSession, ConsoleDiagnostics>;

fn main() {
    // parse arguments via clap
    let cmd_args = CommandlineArgs::parse();

    if let Err(e) = init_logger(&cmd_args.log_file) {
        eprintln!("[WARN] {}", e);
    }

    let use_testnet = !cmd_args.mainnet;
    let trading_context = match load_context(use_testnet, cmd_args.timeout_secs) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("[ERROR] {}", e);
            std::process::exit(1);
        }
    };

    let session = match BinanceFuturesSession::from_context(&trading_context) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("[ERROR] Cannot create session: {}", e);
            std::process::exit(1);
        }
    };
    let facade = OrderFacade::new(session, ConsoleDiagnostics);

    match cmd_args.command {
        Some(command) => run_command(&facade, command),
        None => run_menu(&facade, use_testnet),
    }
}

/// Credentials come from environment, missing ones are asked for on stdin.
fn load_context(use_testnet: bool, timeout_secs: u64) -> Result<TradingContext, ConfigError> {
    match TradingContext::from_env(use_testnet, timeout_secs) {
        Ok(ctx) => Ok(ctx),
        Err(ConfigError::MissingCredential(_)) => {
            let api_key = match std::env::var(ENV_API_KEY) {
                Ok(key) => key,
                Err(_) => prompt("Enter API Key: ")?.ok_or(ConfigError::MissingCredential(ENV_API_KEY))?,
            };
            let api_secret = match std::env::var(ENV_API_SECRET) {
                Ok(secret) => secret,
                Err(_) => prompt("Enter API Secret: ")?.ok_or(ConfigError::MissingCredential(ENV_API_SECRET))?,
            };
            Ok(TradingContext { api_key, api_secret, use_testnet, timeout_secs })
        }
        Err(e) => Err(e),
    }
}

fn run_command(facade: &Facade, command: Command) {
    let mut start = std::time::Instant::now();
    measure_start(&mut start);

    match command {
        Command::Market { symbol, side, qty } => {
            print_order_result(facade.place_market(&symbol, &side, qty));
        }
        Command::Limit { symbol, side, qty, price, tif } => {
            print_order_result(facade.place_limit_with(&symbol, &side, qty, price, tif));
        }
        Command::StopLimit { symbol, side, qty, stop_price, limit_price, tif } => {
            print_order_result(facade.place_stop_limit_with(&symbol, &side, qty, stop_price, limit_price, tif));
        }
        Command::MarkPrice { symbol } => {
            print_mark_price(&symbol, facade.get_mark_price(&symbol));
        }
    }

    measure_end(&start, true);
}

fn run_menu(facade: &Facade, use_testnet: bool) {
    let venue = if use_testnet { "Testnet" } else { "Mainnet" };
    println!("=== Binance Futures {} Bot (USDT-M) ===", venue);

    loop {
        println!("\n--- Menu ---");
        println!("1) Place MARKET order");
        println!("2) Place LIMIT order");
        println!("3) Place STOP-LIMIT order");
        println!("4) Get mark price");
        println!("0) Exit");

        // stdin closed counts as exit
        let choice = match prompt("Select an option: ") {
            Ok(Some(choice)) => choice,
            _ => break,
        };

        let done = match choice.as_str() {
            "0" => break,
            "1" => menu_market(facade),
            "2" => menu_limit(facade),
            "3" => menu_stop_limit(facade),
            "4" => menu_mark_price(facade),
            _ => {
                println!("Invalid choice, please try again.");
                Some(())
            }
        };
        if done.is_none() {
            break;
        }
    }
    println!("Exiting. Bye!");
}

fn menu_market(facade: &Facade) -> Option<()> {
    println!("\n--- MARKET ORDER ---");
    let symbol = read_symbol()?;
    let side = read_side()?;
    let qty = read_decimal("Quantity: ")?;
    print_order_result(facade.place_market(&symbol, &side, qty));
    Some(())
}

fn menu_limit(facade: &Facade) -> Option<()> {
    println!("\n--- LIMIT ORDER ---");
    let symbol = read_symbol()?;
    let side = read_side()?;
    let qty = read_decimal("Quantity: ")?;
    let price = read_decimal("Limit price: ")?;
    print_order_result(facade.place_limit(&symbol, &side, qty, price));
    Some(())
}

fn menu_stop_limit(facade: &Facade) -> Option<()> {
    println!("\n--- STOP-LIMIT ORDER ---");
    let symbol = read_symbol()?;
    let side = read_side()?;
    let qty = read_decimal("Quantity: ")?;
    let stop_price = read_decimal("Stop price (trigger): ")?;
    let limit_price = read_decimal("Limit price (executed): ")?;
    print_order_result(facade.place_stop_limit(&symbol, &side, qty, stop_price, limit_price));
    Some(())
}

fn menu_mark_price(facade: &Facade) -> Option<()> {
    println!("\n--- MARK PRICE ---");
    let symbol = read_symbol()?;
    print_mark_price(&symbol, facade.get_mark_price(&symbol));
    Some(())
}

/// Print `message` and read one trimmed line. `None` once stdin is closed.
fn prompt(message: &str) -> Result<Option<String>, ConfigError> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn read_symbol() -> Option<String> {
    let symbol = prompt(&format!("Symbol (default {}): ", DEFAULT_SYMBOL)).ok()??.to_ascii_uppercase();
    if symbol.is_empty() {
        Some(DEFAULT_SYMBOL.to_string())
    } else {
        Some(symbol)
    }
}

fn read_side() -> Option<String> {
    loop {
        let side = prompt("Side (BUY/SELL): ").ok()??;
        match side.parse::<Side>() {
            Ok(side) => return Some(side.to_string()),
            Err(_) => println!("Invalid side. Please enter BUY or SELL."),
        }
    }
}

fn read_decimal(message: &str) -> Option<Decimal> {
    loop {
        let raw = prompt(message).ok()??;
        match raw.parse::<Decimal>() {
            Ok(value) if value > Decimal::ZERO => return Some(value),
            Ok(_) => println!("Value must be > 0."),
            Err(_) => println!("Invalid number, please try again."),
        }
    }
}

fn print_order_result(response: Option<Value>) {
    let snapshot = response.as_ref().and_then(OrderSnapshot::from_response);
    match snapshot {
        Some(snapshot) => println!("\n{}\n", snapshot),
        None => println!("No response (order failed or was not sent)."),
    }
}

fn print_mark_price(symbol: &str, response: Option<Value>) {
    match response.as_ref().and_then(mark_price_of) {
        Some(price) => println!("Mark price for {}: {}", symbol.to_ascii_uppercase(), price),
        None => println!("Failed to fetch mark price for {}.", symbol.to_ascii_uppercase()),
    }
}
