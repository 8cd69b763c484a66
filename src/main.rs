use argh::FromArgs;
use chrono::{Local, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nook_weather::config::{self, Config, LocationConfig};
use nook_weather::error::{ConfigError, Result};
use nook_weather::models::AppState;
use nook_weather::render::SvgRenderer;
use nook_weather::routes::create_router;
use nook_weather::services::{OpenWeatherMap, WeatherSource};

#[derive(FromArgs)]
/// Gathers weather information from OpenWeatherMap and generates an SVG image for an e-ink display
struct Args {
    /// location latitude
    #[argh(option)]
    lat: Option<f64>,

    /// location longitude
    #[argh(option)]
    lon: Option<f64>,

    /// api key (default: first token of apikey.txt in the project directory)
    #[argh(option)]
    key: Option<String>,

    /// path to a YAML configuration file
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// template svg to fill in (default: img/template.svg, or the built-in template)
    #[argh(option)]
    template: Option<PathBuf>,

    /// where to write the generated svg (default: img/generated.svg)
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// serve freshly rendered images over http instead of writing a file
    #[argh(switch)]
    serve: bool,

    /// address to listen on with --serve
    #[argh(option)]
    listen: Option<String>,
}

impl Args {
    // command line flags take precedence over the config file
    fn apply(&self, config: &mut Config) -> std::result::Result<(), ConfigError> {
        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => {
                config.location = Some(LocationConfig { latitude, longitude });
            }
            (None, None) => {}
            _ => return Err(ConfigError::MissingLocation),
        }
        if let Some(key) = &self.key {
            config.api_key = Some(key.clone());
        }
        if let Some(template) = &self.template {
            config.template = Some(template.clone());
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        if let Some(listen) = &self.listen {
            config.listen = listen.clone();
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();

    if let Err(e) = run(args).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => {
            log::debug!("No config file specified, using defaults");
            Config::default()
        }
    };
    args.apply(&mut config)?;

    let project_dir = config::project_dir();
    let location = config.location()?;
    let api_key = config.api_key(&project_dir)?;
    log::info!("Using location: ({:.4}, {:.4})", location.latitude, location.longitude);

    let renderer = match config.template_path(&project_dir) {
        Some(path) => {
            log::info!("Using template {}", path.display());
            SvgRenderer::from_file(&path, Local)?
        }
        None => SvgRenderer::local(),
    };
    let source: Arc<dyn WeatherSource> = Arc::new(OpenWeatherMap::new(location, api_key));

    if args.serve {
        serve(source, renderer, &config).await
    } else {
        let output = config.output_path(&project_dir);
        generate(source.as_ref(), &renderer, &config, &output).await
    }
}

// fetches once and writes the image, post-processing is left to the caller
async fn generate(
    source: &dyn WeatherSource,
    renderer: &SvgRenderer<Local>,
    config: &Config,
    output: &Path,
) -> Result<()> {
    let report = source.fetch_report(config.hours, config.days).await?;
    let svg = renderer.render(&report, Utc::now().timestamp());
    tokio::fs::write(output, svg).await?;
    log::info!("Wrote {}", output.display());
    Ok(())
}

async fn serve(source: Arc<dyn WeatherSource>, renderer: SvgRenderer<Local>, config: &Config) -> Result<()> {
    let state = Arc::new(AppState {
        source,
        renderer,
        hours: config.hours,
        days: config.days,
    });

    let listener = tokio::net::TcpListener::bind(config.listen.as_str()).await?;
    log::info!("Server running on http://{}", config.listen);
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
