use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use nocturne_core::{
    parse_venue, ArtNetMode, ArtNetOutput, ConfigManager, Director, DmxOutput, Repertoire,
    Settings, State, UniverseBuffer,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

mod demo;

/// Audio-reactive DMX lighting director.
#[derive(Parser, Debug)]
#[command(name = "nocturne")]
#[command(about = "Drives a DMX rig from audio-derived control signals")]
struct Args {
    /// Venue patch to load (studio, warehouse, black_box)
    #[arg(long, default_value = "studio")]
    venue: String,

    /// Art-Net source IP address (unicast mode)
    #[arg(long, value_parser = parse_ip)]
    source_ip: Option<IpAddr>,

    /// Art-Net destination IP address; broadcast is used when omitted
    #[arg(long, value_parser = parse_ip)]
    dest_ip: Option<IpAddr>,

    /// Art-Net port
    #[arg(long, default_value = "6454")]
    artnet_port: u16,

    /// Disable DMX output entirely (dry run)
    #[arg(long)]
    no_dmx: bool,

    /// Seed for the show RNG; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run for this many seconds, then exit (demo/profiling)
    #[arg(long)]
    run_secs: Option<f64>,
}

fn parse_ip(s: &str) -> Result<IpAddr, String> {
    s.parse().map_err(|e| format!("invalid IP address: {}", e))
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();
    let args = Args::parse();

    let mut config = ConfigManager::new(args.config.clone());
    let settings = config.load()?;

    let venue = parse_venue(&args.venue)?;
    if !nocturne_fixtures::has_manual_group(venue, &nocturne_fixtures::FixtureLibrary::new()) {
        log::info!("venue {} has no manual group; the manual dimmer drives nothing", venue);
    }
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let (mut director, handle) =
        Director::new(State::new(venue), Box::new(Repertoire), settings.clone(), rng);

    let mut dmx = build_output(&args, &settings)?;
    let mut source = demo::DemoSignalSource::new();

    log::info!(
        "nocturne up: venue {}, {:.0} ticks/s, dmx {}",
        venue,
        settings.target_fps,
        if args.no_dmx { "off" } else { "on" }
    );

    // Scripted demo mutations, routed through the handle like any external
    // control surface would be.
    let mut raved = false;
    let mut hyped = false;

    let tick = Duration::from_secs_f64(1.0 / settings.target_fps.max(1.0));
    let started = Instant::now();
    loop {
        let now = started.elapsed().as_secs_f64();

        if now >= 30.0 && !raved {
            handle.set_mode("rave")?;
            raved = true;
        }
        if now >= 75.0 && !hyped {
            handle.deploy_hype();
            hyped = true;
        }

        let frame = source.frame(now);
        director.step(&frame);
        director.render(dmx.as_mut());

        if let Some(limit) = args.run_secs {
            if now >= limit {
                break;
            }
        }
        thread::sleep(tick);
    }

    log::info!("{}", director.lighting_tree("at exit"));
    Ok(())
}

fn build_output(args: &Args, settings: &Settings) -> Result<Box<dyn DmxOutput>, anyhow::Error> {
    if args.no_dmx || !settings.dmx_enabled {
        return Ok(Box::new(UniverseBuffer::new()));
    }

    let mode = match (args.source_ip, args.dest_ip) {
        (Some(source), Some(dest)) => ArtNetMode::Unicast(
            SocketAddr::new(source, args.artnet_port),
            SocketAddr::new(dest, args.artnet_port),
        ),
        _ => ArtNetMode::Broadcast,
    };
    Ok(Box::new(ArtNetOutput::new(mode, args.artnet_port)?))
}
