#[macro_use]
extern crate log;

use std::{process, str::FromStr};

use argh::FromArgs;

use crumbs::{
    compliance::ComplianceMode, config::Config, handler::CookieEcho, logger, server::Server,
};

#[derive(FromArgs)]
/// Echo back the cookies of every request as JSON.
struct Args {
    /// YAML config file
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// server hostname or IP (overrides the config file)
    #[argh(option, short = 'h')]
    host: Option<String>,

    /// server port (overrides the config file)
    #[argh(option, short = 'p')]
    port: Option<u16>,

    /// cookie compliance mode: RFC6265 or LEGACY (overrides the config file)
    #[argh(option)]
    compliance: Option<String>,
}

fn load_config(args: &Args) -> Result<Config, String> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(host) = &args.host {
        config.server.listen_ip = host.clone();
    }

    if let Some(port) = args.port {
        config.server.port = port;
    }

    if let Some(mode) = &args.compliance {
        config.server.cookie_compliance =
            ComplianceMode::from_str(mode).map_err(|e| e.to_string())?;
    }

    Ok(config)
}

#[tokio::main]
async fn main() {
    let args: Args = argh::from_env();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            logger::init();
            error!("{}", e);
            process::exit(1);
        }
    };

    logger::init_with_level(config.server.log_level.as_filter());

    info!("Starting cookie-echo...");
    let mut server = Server::new(config.server.listen_ip.clone(), config.server.port)
        .with_compliance(config.server.cookie_compliance);
    server.route_default(CookieEcho);

    if let Err(e) = server.start().await {
        error!("{}", e);
        process::exit(1);
    }
}
