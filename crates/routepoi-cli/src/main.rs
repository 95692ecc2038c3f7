//! routepoi command-line tool

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use routepoi_cli::{format_coords, parse_bbox, parse_coords};
use routepoi_client::google::DEFAULT_GOOGLE_PLACES_URL;
use routepoi_client::overpass::DEFAULT_OVERPASS_URL;
use routepoi_client::{GooglePlacesProvider, MockProvider, OverpassProvider, PoiProvider};
use routepoi_core::type_map::{canonical_type_name, canonical_type_to_external_id};
use routepoi_core::{
    map_google_type, map_osm_tag, polyline, sampler, OverpassQuery, ProviderContext,
    SamplerConfig, SearchParams,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Route POI tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode "lat,lng;lat,lng;..." as a polyline
    Encode { coords: String },
    /// Decode a polyline into one "lat,lng" per line
    Decode { polyline: String },
    /// Thin a polyline the way OSM searches do
    Sample {
        polyline: String,
        #[command(flatten)]
        sampler: SamplerArgs,
    },
    /// Print the Overpass query for a route or bounding box
    OverpassQuery {
        /// Amenity value, repeatable (e.g. --amenity fuel --amenity cafe)
        #[arg(long = "amenity", required = true)]
        amenities: Vec<String>,
        #[command(flatten)]
        area: AreaArgs,
        #[command(flatten)]
        sampler: SamplerArgs,
    },
    /// Run one provider and print canonical POIs as JSON
    Search {
        #[arg(long, value_enum)]
        provider: ProviderKind,
        #[arg(long)]
        query: String,
        #[command(flatten)]
        area: AreaArgs,
        #[command(flatten)]
        sampler: SamplerArgs,
        #[command(flatten)]
        endpoints: EndpointArgs,
    },
    /// Show the canonical type and external id for a provider category
    MapType {
        #[arg(value_enum)]
        source: TypeSource,
        value: String,
    },
}

#[derive(Args, Debug)]
struct AreaArgs {
    /// Encoded route polyline
    #[arg(long)]
    polyline: Option<String>,
    /// Bounding box as S,W,N,E
    #[arg(long)]
    bbox: Option<String>,
}

#[derive(Args, Debug)]
struct SamplerArgs {
    #[arg(long, default_value_t = 100)]
    min_points: usize,
    #[arg(long, default_value_t = 0.25)]
    ratio: f64,
    #[arg(long, default_value_t = 5)]
    min_samples: usize,
}

impl SamplerArgs {
    fn config(&self) -> Result<SamplerConfig> {
        let config = SamplerConfig {
            min_points_for_sampling: self.min_points,
            sample_ratio: self.ratio,
            min_samples: self.min_samples,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug)]
struct EndpointArgs {
    #[arg(long, env = "GOOGLE_PLACES_API_KEY", hide_env_values = true)]
    google_api_key: Option<String>,
    #[arg(long, env = "GOOGLE_PLACES_URL", default_value = DEFAULT_GOOGLE_PLACES_URL)]
    google_places_url: String,
    #[arg(long, env = "GOOGLE_TIMEOUT_S", default_value_t = 15)]
    google_timeout_s: u64,
    #[arg(long, env = "OVERPASS_URL", default_value = DEFAULT_OVERPASS_URL)]
    overpass_url: String,
    #[arg(long, env = "OVERPASS_TIMEOUT_S", default_value_t = 30)]
    overpass_timeout_s: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ProviderKind {
    Google,
    Osm,
    Mock,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TypeSource {
    Google,
    Osm,
}

fn search_params(query: String, area: &AreaArgs) -> Result<SearchParams> {
    let mut params = SearchParams::new(query);
    if let Some(encoded) = &area.polyline {
        params = params.with_polyline(encoded.clone());
    }
    if let Some(bbox) = &area.bbox {
        params = params.with_bounds(parse_bbox(bbox)?);
    }
    Ok(params)
}

fn build_provider(
    kind: ProviderKind,
    endpoints: &EndpointArgs,
    sampler: SamplerConfig,
) -> Result<Arc<dyn PoiProvider>> {
    let provider: Arc<dyn PoiProvider> = match kind {
        ProviderKind::Google => Arc::new(
            GooglePlacesProvider::new(
                endpoints.google_places_url.clone(),
                endpoints.google_api_key.clone(),
                Duration::from_secs(endpoints.google_timeout_s),
            )
            .context("Failed to create Google Places client")?,
        ),
        ProviderKind::Osm => Arc::new(
            OverpassProvider::new(
                endpoints.overpass_url.clone(),
                sampler,
                Duration::from_secs(endpoints.overpass_timeout_s),
            )
            .context("Failed to create Overpass client")?,
        ),
        ProviderKind::Mock => Arc::new(MockProvider::new()),
    };
    Ok(provider)
}

async fn run_search(
    kind: ProviderKind,
    query: String,
    area: AreaArgs,
    sampler: SamplerConfig,
    endpoints: EndpointArgs,
) -> Result<()> {
    let params = search_params(query, &area)?;
    let provider = build_provider(kind, &endpoints, sampler)?;
    let context = ProviderContext {
        has_route: params.route_polyline().is_some(),
        google_api_key_configured: endpoints.google_api_key.is_some(),
    };
    if !provider.is_enabled(&context) {
        anyhow::bail!(
            "provider '{}' is not enabled (Google needs --polyline and an API key)",
            provider.id()
        );
    }

    match provider.search(&params).await {
        Ok(pois) => {
            tracing::info!("{} returned {} POIs", provider.name(), pois.len());
            println!("{}", serde_json::to_string_pretty(&pois)?);
        }
        Err(err) if err.is_no_results() => {
            eprintln!("No POIs found by {}", provider.name());
            println!("[]");
        }
        Err(err) => return Err(err).context("Search failed"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("routepoi=info".parse()?)
                .add_directive("routepoi_client=info".parse()?),
        )
        .init();

    match Cli::parse().command {
        Command::Encode { coords } => {
            let coords = parse_coords(&coords)?;
            println!("{}", polyline::try_encode(&coords)?);
        }
        Command::Decode { polyline: encoded } => {
            let coords = polyline::decode(encoded.trim())?;
            if !coords.is_empty() {
                println!("{}", format_coords(&coords));
            }
        }
        Command::Sample {
            polyline: encoded,
            sampler: args,
        } => {
            let config = args.config()?;
            let coords = polyline::decode(encoded.trim())?;
            let sampled = sampler::sample(&coords, &config);
            println!("{}", polyline::encode(&sampled));
            eprintln!("kept {} of {} points", sampled.len(), coords.len());
        }
        Command::OverpassQuery {
            amenities,
            area,
            sampler: args,
        } => {
            let params = search_params(amenities.join(","), &area)?;
            let query = OverpassQuery::from_params(&params, &args.config()?)?;
            println!("{}", query);
        }
        Command::Search {
            provider,
            query,
            area,
            sampler: args,
            endpoints,
        } => {
            run_search(provider, query, area, args.config()?, endpoints).await?;
        }
        Command::MapType { source, value } => {
            let canonical = match source {
                TypeSource::Google => map_google_type(&value),
                TypeSource::Osm => map_osm_tag(&value),
            };
            println!("canonical: {}", canonical_type_name(canonical));
            println!("external id: {}", canonical_type_to_external_id(canonical));
        }
    }
    Ok(())
}
