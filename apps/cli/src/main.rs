#![deny(warnings)]

//! Headless CLI: create a player, let the autopilot live their years, and
//! print where they ended up.

use anyhow::{bail, Context, Result};
use life_core::{Gender, NewPlayer, PersonalityTrait, Player, SesClass, SimConfig};
use life_runtime::{Autopilot, LifeEngine};
use persistence::{load_player, save_player, DirStore, SaveFormat};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Args {
    seed: Option<u64>,
    years: u32,
    config: Option<String>,
    name: String,
    ses: SesClass,
    gender: Gender,
    traits: Vec<PersonalityTrait>,
    save_dir: Option<String>,
    slot: String,
    format: SaveFormat,
    resume: bool,
    json: bool,
}

fn parse_ses(s: &str) -> Result<SesClass> {
    Ok(match s.to_ascii_lowercase().as_str() {
        "lower" => SesClass::Lower,
        "middle" => SesClass::Middle,
        "upper" => SesClass::Upper,
        other => bail!("unknown SES tier {other:?}"),
    })
}

fn parse_gender(s: &str) -> Result<Gender> {
    Ok(match s.to_ascii_lowercase().as_str() {
        "male" | "m" => Gender::Male,
        "female" | "f" => Gender::Female,
        other => bail!("unknown gender {other:?}"),
    })
}

fn parse_trait(s: &str) -> Result<PersonalityTrait> {
    Ok(match s.to_ascii_lowercase().as_str() {
        "ambitious" => PersonalityTrait::Ambitious,
        "relaxed" => PersonalityTrait::Relaxed,
        "sociable" => PersonalityTrait::Sociable,
        "creative" => PersonalityTrait::Creative,
        "disciplined" => PersonalityTrait::Disciplined,
        "athletic" => PersonalityTrait::Athletic,
        other => bail!("unknown trait {other:?}"),
    })
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        seed: None,
        years: 20,
        config: None,
        name: "Alex".to_string(),
        ses: SesClass::Middle,
        gender: Gender::Female,
        traits: Vec::new(),
        save_dir: None,
        slot: "autosave".to_string(),
        format: SaveFormat::Json,
        resume: false,
        json: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = || it.next().with_context(|| format!("{arg} needs a value"));
        match arg.as_str() {
            "--seed" => args.seed = Some(value()?.parse().context("--seed")?),
            "--years" => args.years = value()?.parse().context("--years")?,
            "--config" => args.config = Some(value()?),
            "--name" => args.name = value()?,
            "--ses" => args.ses = parse_ses(&value()?)?,
            "--gender" => args.gender = parse_gender(&value()?)?,
            "--trait" => args.traits.push(parse_trait(&value()?)?),
            "--save" => args.save_dir = Some(value()?),
            "--slot" => args.slot = value()?,
            "--bincode" => args.format = SaveFormat::Bincode,
            "--resume" => args.resume = true,
            "--json" => args.json = true,
            _ => {}
        }
    }
    Ok(args)
}

fn load_config(path: Option<&str>) -> Result<SimConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
            serde_yaml::from_str(&text).with_context(|| format!("parsing config {path}"))
        }
        None => Ok(SimConfig::default()),
    }
}

#[derive(Serialize)]
struct Summary {
    name: String,
    age: u8,
    stage: String,
    wealth: Decimal,
    cpf_total: Decimal,
    net_worth: Decimal,
    monthly_income: Decimal,
    happiness: f64,
    health: f64,
    stress: f64,
    events: usize,
    achievements: Vec<&'static str>,
}

fn summary(engine: &LifeEngine, player: &Player) -> Summary {
    let money = engine.summarize(player);
    Summary {
        name: player.name.clone(),
        age: player.age,
        stage: player.grade(),
        wealth: player.stats().wealth(),
        cpf_total: player.cpf.total(),
        net_worth: money.net_worth,
        monthly_income: money.monthly_income,
        happiness: player.stats().happiness(),
        health: player.stats().health(),
        stress: player.stats().stress(),
        events: player.event_history.len(),
        achievements: player
            .achievements
            .iter()
            .filter(|a| a.unlocked)
            .map(|a| a.id.name())
            .collect(),
    }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args()?;
    info!(
        git_sha = env!("GIT_SHA"),
        build_date = env!("BUILD_DATE"),
        years = args.years,
        "starting CLI"
    );

    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    let mut engine = LifeEngine::new(config);

    let mut store = args.save_dir.as_deref().map(|dir| DirStore::open(dir)).transpose()?;
    let resumed = match (&store, args.resume) {
        (Some(store), true) => load_player(store, &args.slot)?,
        (None, true) => bail!("--resume needs --save <dir>"),
        _ => None,
    };
    let player = match resumed {
        Some(player) => {
            info!(slot = %args.slot, age = player.age, "resuming saved player");
            player
        }
        None => engine.create_player(NewPlayer {
            name: args.name.clone(),
            avatar: "default".to_string(),
            gender: args.gender,
            ses: args.ses,
            traits: args.traits.clone(),
        })?,
    };

    let player = engine.run_years(player, args.years, &Autopilot::default())?;
    let report = summary(&engine, &player);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} | age {} | {} | wealth ${} | CPF ${} | net worth ${}",
            report.name,
            report.age,
            report.stage,
            report.wealth.round_dp(2),
            report.cpf_total.round_dp(2),
            report.net_worth.round_dp(2)
        );
        println!(
            "Stats | happiness {:.1} | health {:.1} | stress {:.1} | events {}",
            report.happiness, report.health, report.stress, report.events
        );
        println!("Achievements | {}", report.achievements.join(", "));
    }

    if let Some(store) = store.as_mut() {
        save_player(store, &args.slot, &player, args.format)?;
    }
    Ok(())
}
