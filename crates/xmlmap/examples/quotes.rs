use std::error::Error;

use tracing::info;
use tracing_subscriber::EnvFilter;
use xmlmap::chrono::NaiveDateTime;
use xmlmap::rust_decimal::Decimal;
use xmlmap::{Document, Mapper, XmlRecord};

const XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Feed source="demo">
  <Quote Symbol="ABC" Last="12.50" Volume="1,200" Halted="0">
    <Time>2024-03-01 09:30</Time>
    <Exchange>XNYS</Exchange>
  </Quote>
  <Quote Symbol="XYZ" Last="n/a" Volume="300" Halted="true">
    <Time>2024-03-01 09:31</Time>
  </Quote>
  <Quote Symbol="QRS" Last="101.0001" Volume="5" Halted="1">
    <Time>not today</Time>
  </Quote>
</Feed>"#;

#[derive(Debug, Default, XmlRecord)]
#[xml(rename_all = "PascalCase")]
struct Quote {
    symbol: String,
    last: Decimal,
    volume: f64,
    halted: bool,
    #[xml(element = "Time", format = "yyyy-MM-dd HH:mm")]
    time: Option<NaiveDateTime>,
    #[xml(element = "Exchange")]
    exchange: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with_target(false)
        .init();

    let doc = Document::parse(XML)?;
    let mut mapper = Mapper::<Quote>::load(&doc)?;
    info!(quotes = mapper.remaining(), "feed loaded");
    while let Some(quote) = mapper.parse_next()? {
        println!(
            "{:<4} last={:<9} volume={:<6} halted={:<5} time={} exchange={}",
            quote.symbol,
            quote.last,
            quote.volume,
            quote.halted,
            quote
                .time
                .map(|time| time.to_string())
                .unwrap_or_else(|| "-".into()),
            if quote.exchange.is_empty() { "-" } else { quote.exchange.as_str() },
        );
    }

    // The same document, reading the symbol from the child element instead.
    mapper.set_element_map("Exchange", Quote::SYMBOL, None);
    mapper.set_xml(&doc)?;
    let symbols: Vec<String> = mapper
        .parse_all()?
        .into_iter()
        .map(|quote| quote.symbol)
        .collect();
    println!("symbols from <Exchange>: {symbols:?}");
    Ok(())
}
