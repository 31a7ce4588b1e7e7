// Entry point - print current conditions for every configured station
use anyhow::Context;
use tracing_subscriber::EnvFilter;
use weatherlink::infrastructure::config::{load_settings, load_settings_from};
use weatherlink::{Client, LocalClient, SensorDataCollection, UnitConverter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load configuration, optionally from a path given on the command line
    let settings = match std::env::args().nth(1) {
        Some(path) => load_settings_from(&path),
        None => load_settings(),
    }
    .context("Failed to load configuration")?;

    for host in &settings.local_hosts {
        let client = LocalClient::new(
            host.clone(),
            settings.station_units.clone(),
            settings.desired_units.clone(),
        );
        let conditions = client
            .current_conditions()
            .await
            .with_context(|| format!("Failed to read current conditions from {host}"))?;

        println!("== {host}");
        print_weather(&conditions, client.converter())?;
    }

    if settings.api_key.is_empty() && !settings.local_hosts.is_empty() {
        return Ok(());
    }

    // Credentials are checked here, before any request is made
    let client = Client::from_settings(&settings).context("Invalid cloud API configuration")?;

    for station in client.stations().await.context("Failed to list stations")? {
        let current = client
            .current(station.station_id)
            .await
            .with_context(|| format!("Failed to read station {}", station.station_id))?;

        println!("== {station}");
        print_weather(&current, client.converter())?;
    }

    Ok(())
}

fn print_weather(collection: &SensorDataCollection, converter: &UnitConverter) -> anyhow::Result<()> {
    for dataset in collection.weather().iter() {
        println!("{dataset}");
        let Some(record) = dataset.records().last() else {
            continue;
        };

        for (field, _) in record.fields().filter(|(_, r)| r.as_quantity().is_some()) {
            if let Some(reading) = record.converted(field, converter)? {
                println!("  {field}: {reading}");
            }
        }
    }
    Ok(())
}
