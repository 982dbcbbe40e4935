use clap::Args;
use colored::Colorize;

use arcanum_core::{
    AiPreferences, DecisionStyle, ReadingStyle, Skepticism, SoulProfile, UserProfile, Verbosity,
};
use arcanum_session::ProfileStore;

use crate::StoreArgs;

#[derive(Args)]
pub struct SetArgs {
    /// Name the oracle should call you
    #[arg(long)]
    name: Option<String>,

    /// Your age
    #[arg(long)]
    age: Option<u32>,

    /// What you value most
    #[arg(long)]
    values: Option<String>,

    /// Your deepest fear
    #[arg(long)]
    fear: Option<String>,

    /// What you are working towards
    #[arg(long)]
    goal: Option<String>,

    /// What you are struggling with
    #[arg(long)]
    struggle: Option<String>,

    /// How you make decisions: head, heart, intuition
    #[arg(long)]
    decision: Option<String>,

    /// Reading style: psychological, esoteric, balanced
    #[arg(long)]
    style: Option<String>,

    /// Reading length: concise, detailed
    #[arg(long)]
    verbosity: Option<String>,

    /// Tone: believer, analytical
    #[arg(long)]
    skepticism: Option<String>,

    #[command(flatten)]
    store: StoreArgs,
}

fn parse<T: std::str::FromStr<Err = arcanum_core::CoreError>>(
    value: Option<&str>,
) -> Result<Option<T>, String> {
    value.map(str::parse::<T>).transpose().map_err(|e| e.to_string())
}

pub fn set(args: SetArgs) -> Result<(), String> {
    let decision: Option<DecisionStyle> = parse(args.decision.as_deref())?;
    let style: Option<ReadingStyle> = parse(args.style.as_deref())?;
    let verbosity: Option<Verbosity> = parse(args.verbosity.as_deref())?;
    let skepticism: Option<Skepticism> = parse(args.skepticism.as_deref())?;

    let store = super::open_store(&args.store);
    let user = args.store.user.as_str();
    let existing = super::block_on(store.load_profile(user))?.map_err(|e| e.to_string())?;
    let created = existing.is_none();
    let mut profile = existing.unwrap_or_else(|| UserProfile::new(user, user));

    if let Some(name) = args.name {
        profile.name = name;
    }
    if args.age.is_some() {
        profile.age = args.age;
    }

    let soul_fields = [&args.values, &args.fear, &args.goal, &args.struggle];
    if soul_fields.iter().any(|f| f.is_some()) || decision.is_some() {
        let soul = profile.soul_profile.get_or_insert_with(SoulProfile::default);
        if let Some(values) = args.values {
            soul.core_values = values;
        }
        if let Some(fear) = args.fear {
            soul.deepest_fear = fear;
        }
        if let Some(goal) = args.goal {
            soul.current_goal = goal;
        }
        if let Some(struggle) = args.struggle {
            soul.struggle = struggle;
        }
        if let Some(decision) = decision {
            soul.decision_style = decision;
        }
    }

    if style.is_some() || verbosity.is_some() || skepticism.is_some() {
        let preferences = profile
            .preferences
            .get_or_insert_with(AiPreferences::default);
        if let Some(style) = style {
            preferences.style = style;
        }
        if let Some(verbosity) = verbosity {
            preferences.verbosity = verbosity;
        }
        if let Some(skepticism) = skepticism {
            preferences.skepticism = skepticism;
        }
    }

    super::block_on(store.save_profile(&profile))?.map_err(|e| e.to_string())?;
    let verb = if created { "Created" } else { "Updated" };
    println!("  {} profile for {}", verb.bold(), profile.name);
    Ok(())
}

pub fn show(args: &StoreArgs, json: bool) -> Result<(), String> {
    let store = super::open_store(args);
    let profile = super::block_on(store.load_profile(&args.user))?
        .map_err(|e| e.to_string())?
        .ok_or_else(|| {
            format!(
                "no profile for \"{}\" (create one with `arcanum profile set`)",
                args.user
            )
        })?;

    if json {
        let out = serde_json::to_string_pretty(&profile).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    println!("  {} [{}]", profile.name.bold(), profile.id.dimmed());
    if let Some(age) = profile.age {
        println!("  age:        {age}");
    }
    println!();

    match &profile.soul_profile {
        Some(soul) => {
            println!("  {}", "Soul profile".bold());
            println!("  values:     {}", or_dash(&soul.core_values));
            println!("  fear:       {}", or_dash(&soul.deepest_fear));
            println!("  goal:       {}", or_dash(&soul.current_goal));
            println!("  struggle:   {}", or_dash(&soul.struggle));
            println!("  decides by: {}", soul.decision_style);
            if !soul.is_complete() {
                println!("  {}", "(incomplete)".dimmed());
            }
        }
        None => println!("  {}", "No soul profile yet.".dimmed()),
    }
    println!();

    let preferences = profile.preferences.unwrap_or_default();
    println!("  {}", "Reading preferences".bold());
    println!("  style:      {}", preferences.style);
    println!("  verbosity:  {}", preferences.verbosity);
    println!("  skepticism: {}", preferences.skepticism);
    Ok(())
}

fn or_dash(text: &str) -> &str {
    if text.trim().is_empty() { "-" } else { text }
}
