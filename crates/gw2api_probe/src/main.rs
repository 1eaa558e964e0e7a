//! Small command line tool to poke the live api with.
//!
//! ```text
//! gw2api_probe build
//! gw2api_probe item 30699
//! gw2api_probe items 30699 30685 24554
//! gw2api_probe items-page 3
//! gw2api_probe recipe 1275
//! gw2api_probe skin 1343
//! gw2api_probe v1-item 30699
//! gw2api_probe events [EVENT_ID]
//! gw2api_probe worlds
//! ```
use gw2_core::config::{open_config_dir, ClientConfig};
use gw2_core::trace::install_tracing;
use gw2api::{init_registries, Gw2Client};
use miette::{bail, Context, IntoDiagnostic, Result};
use tracing::{error, info, warn};

fn main() {
    let (guard, recent) = match install_tracing(std::io::stderr()) {
        Ok(installed) => installed,
        Err(e) => {
            eprintln!("failed to install tracing: {e:#?}");
            panic!("failed to install tracing: {e:#?}");
        }
    };
    if let Err(e) = rayon::ThreadPoolBuilder::default()
        .panic_handler(|panic_info| {
            error!(?panic_info, "rayon thread panicked");
        })
        .build_global()
    {
        error!(?e, "failed to build global threadpool for rayon");
    }
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = run(&args);
    // only filled when GW2API_LOG lets debug events through
    let unknown: Vec<_> = recent
        .snapshot()
        .into_iter()
        .filter(|event| event.message == "unknown discriminator")
        .collect();
    if !unknown.is_empty() {
        warn!(count = unknown.len(), "some entities had discriminators this version does not know");
        for event in unknown {
            info!(fields = ?event.fields, "unknown discriminator seen");
        }
    }
    // flush the log before miette prints
    std::mem::drop(guard);
    if let Err(e) = result {
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}

fn parse_ids(args: &[String]) -> Result<Vec<u32>> {
    args.iter()
        .map(|id| {
            id.parse()
                .into_diagnostic()
                .wrap_err_with(|| format!("invalid id {id}"))
        })
        .collect()
}

fn single_id(args: &[String]) -> Result<u32> {
    match parse_ids(args)?.as_slice() {
        [id] => Ok(*id),
        _ => bail!("expected exactly one id"),
    }
}

fn run(args: &[String]) -> Result<()> {
    init_registries()?;
    let config = match open_config_dir() {
        Ok((path, dir)) => {
            info!(?path, "reading config");
            ClientConfig::load(Some(&dir))?
        }
        Err(e) => {
            error!(?e, "no config dir, using defaults");
            ClientConfig::load(None)?
        }
    };
    let client = Gw2Client::new(config);
    let Some((command, rest)) = args.split_first() else {
        bail!("missing command. see the module docs of gw2api_probe for usage");
    };
    match command.as_str() {
        "build" => println!("{:#?}", client.build()?),
        "item" => println!("{:#?}", client.items().find(&single_id(rest)?)?),
        "items" => {
            let items = client.items().find_all_by_ids(&parse_ids(rest)?)?;
            println!("{} of {} items", items.len(), items.total_count);
            for (id, item) in &items.items {
                println!("{id}: {} ({}) {:?}", item.name, item.kind, item.details);
            }
        }
        "items-page" => {
            let page = single_id(rest)? as usize;
            let items = client.items().find_page(page)?;
            println!("page {} of {}", items.page, items.page_count);
            for item in items.iter() {
                println!("{}: {} ({})", item.id, item.name, item.kind);
            }
        }
        "recipe" => println!("{:#?}", client.recipes().find(&single_id(rest)?)?),
        "skin" => println!("{:#?}", client.skins().find(&single_id(rest)?)?),
        "v1-item" => println!("{:#?}", client.v1().item_details(single_id(rest)?)?),
        "events" => {
            let events = client.v1().event_details(rest.first().map(String::as_str))?;
            for (id, event) in &events.items {
                println!("{id}: {} on map {} {:?}", event.name, event.map_id, event.location);
            }
        }
        "worlds" => {
            let worlds = client.worlds().find_all()?;
            for world in worlds.items.values() {
                println!("{}: {} ({})", world.id, world.name, world.population);
            }
        }
        other => bail!("unknown command {other}"),
    }
    Ok(())
}
