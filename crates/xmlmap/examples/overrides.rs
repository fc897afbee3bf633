use std::error::Error;

use tracing_subscriber::EnvFilter;
use xmlmap::{Mapper, MappingOverrides, XmlRecord};

const XML: &str = r#"<Log>
  <Entry sensor="t-01" reading="21.5" at="2024-03-01T09:30:00"/>
  <Entry sensor="t-02" reading="bad" at="01.03.2024"/>
  <Entry sensor="t-03"><Value>19.25</Value></Entry>
</Log>"#;

const OVERRIDES: &str = r#"{
  "element_name": "Entry",
  "attributes": [
    { "source": "sensor", "field": "id" },
    { "source": "at", "field": "taken", "format": "dd.MM.yyyy" }
  ],
  "elements": []
}"#;

#[derive(Debug, Default, XmlRecord)]
struct Reading {
    id: String,
    reading: f64,
    taken: Option<xmlmap::chrono::NaiveDateTime>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".into()),
        ))
        .with_target(false)
        .init();

    let overrides: MappingOverrides = serde_json::from_str(OVERRIDES)?;
    let mut mapper = Mapper::<Reading>::load_with(XML, &overrides)?;
    for reading in mapper.parse_all()? {
        println!("{reading:?}");
    }

    mapper.set_element_map("Value", Reading::READING, None);
    mapper.set_xml(XML)?;
    println!("readings from <Value>:");
    while let Some(reading) = mapper.parse_next()? {
        println!("  {} = {}", reading.id, reading.reading);
    }
    Ok(())
}
