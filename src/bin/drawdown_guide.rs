use drawdown_guide::config::Config;
use drawdown_guide::services::data_service::DataService;
use drawdown_guide::util;

use anyhow::{bail, Context};
use clap::{App, Arg, SubCommand};
use log::{error, info};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();

    // 创建基本的命令行应用
    let app = App::new("DrawdownGuide")
        .version("1.0.0")
        .author("DrawdownGuide Team")
        .about("Historical drawdown and recovery analysis")
        .arg(
            Arg::with_name("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Directory holding <TICKER>.json price files")
                .takes_value(true)
                .global(true)
                .default_value("data"),
        );

    // 添加子命令
    let app = app
        .subcommand(
            SubCommand::with_name("analyze")
                .about("Analyze current and historical drawdowns")
                .arg(
                    Arg::with_name("ticker")
                        .short('t')
                        .long("ticker")
                        .value_name("TICKER")
                        .help("Ticker to analyze (defaults to all configured tickers)")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("pretty")
                        .long("pretty")
                        .help("Pretty-print the JSON report")
                        .takes_value(false),
                ),
        )
        .subcommand(
            SubCommand::with_name("refresh")
                .about("Fetch new daily bars from the market data source")
                .arg(
                    Arg::with_name("ticker")
                        .short('t')
                        .long("ticker")
                        .value_name("TICKER")
                        .help("Ticker to refresh (defaults to all configured tickers)")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("date")
                        .short('d')
                        .long("date")
                        .value_name("DATE")
                        .help("Fetch up to this date (YYYY-MM-DD)")
                        .takes_value(true)
                        .default_value(&today),
                ),
        )
        .subcommand(
            SubCommand::with_name("import")
                .about("Import an Investing.com CSV export")
                .arg(
                    Arg::with_name("ticker")
                        .short('t')
                        .long("ticker")
                        .value_name("TICKER")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("file")
                        .short('f')
                        .long("file")
                        .value_name("FILE")
                        .help("CSV file: Date,Price,Open,High,Low,Vol.,Change %")
                        .required(true)
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("explore")
                .about("Show stored daily bars")
                .arg(
                    Arg::with_name("ticker")
                        .short('t')
                        .long("ticker")
                        .value_name("TICKER")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("limit")
                        .short('l')
                        .long("limit")
                        .value_name("LIMIT")
                        .help("Number of most recent records to display")
                        .takes_value(true)
                        .default_value("10"),
                ),
        );

    let matches = app.get_matches();

    let data_dir = matches.value_of("data-dir").unwrap_or("data");
    let config = Config::new().with_data_dir(data_dir);
    let service = DataService::from_config(config)?;

    if let Some(matches) = matches.subcommand_matches("analyze") {
        let tickers = match matches.value_of("ticker") {
            Some(ticker) => vec![ticker.to_uppercase()],
            None => service.config().tickers.clone(),
        };

        let reports = service.analyze_all(&tickers).await;
        for (ticker, report) in reports {
            info!("{}: {}", ticker, report.message);
            let json = if matches.is_present("pretty") {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{}", json);
        }
    } else if let Some(matches) = matches.subcommand_matches("refresh") {
        let date_str = matches.value_of("date").unwrap_or(&today);
        let date = util::parse_iso_date(date_str).with_context(|| format!("invalid --date {}", date_str))?;

        if let Some(ticker) = matches.value_of("ticker") {
            let ticker = ticker.to_uppercase();
            let added = service.refresh_ticker(&ticker, date).await?;
            info!("Added {} records for {}", added, ticker);
        } else {
            let results = service.refresh_all(date).await;
            let failed = results.iter().filter(|(_, result)| result.is_err()).count();
            for (ticker, result) in &results {
                match result {
                    Ok(added) => info!("Added {} records for {}", added, ticker),
                    Err(e) => error!("{}: {}", ticker, e),
                }
            }
            if failed > 0 {
                bail!("{} of {} tickers failed to refresh", failed, results.len());
            }
        }
    } else if let Some(matches) = matches.subcommand_matches("import") {
        let ticker = matches.value_of("ticker").unwrap_or_default().to_uppercase();
        let file = matches.value_of("file").unwrap_or_default();

        let added = service.import_csv(&ticker, Path::new(file))?;
        info!("Imported {} new records for {}", added, ticker);
    } else if let Some(matches) = matches.subcommand_matches("explore") {
        let ticker = matches.value_of("ticker").unwrap_or_default().to_uppercase();
        let limit = matches.value_of("limit")
            .unwrap_or("10")
            .parse::<usize>()
            .unwrap_or(10);

        let series = service.load_series(&ticker)?;
        if series.is_empty() {
            info!("No daily data available for {}", ticker);
            return Ok(());
        }

        info!("Stock: {} - {} records", ticker, series.len());
        info!("{:-<60}", "");
        info!("{:<12} {:<10} {:<10} {:<10} {:<10} {:<15}",
                 "Date", "Open", "High", "Low", "Close", "Volume");
        info!("{:-<60}", "");

        for bar in series.bars().iter().rev().take(limit) {
            info!("{:<12} {:<10.2} {:<10.2} {:<10.2} {:<10.2} {:<15}",
                     bar.date.to_string(), bar.open, bar.high, bar.low, bar.close, bar.volume);
        }

        if series.len() > limit {
            info!("... and {} more records", series.len() - limit);
        }
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}
