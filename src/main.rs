use bloomset::set_membership::compare::{InsertReport, MemoryReport, Verdict};
use bloomset::{BloomFilter, Comparison, Config, Snapshot, Stats};
use clap::{value_parser, Arg, ArgAction, Command};
use serde::{Deserialize, Serialize};
use std::error::Error;
use tracing::{info, Level};

/// Word list in the `{"words": [...]}` layout.
#[derive(Deserialize)]
struct WordList {
    words: Vec<String>,
}

#[derive(Serialize)]
struct Report {
    stats: Stats,
    insert: InsertReport,
    verdicts: Vec<Verdict>,
    memory: MemoryReport,
    snapshot: Snapshot,
}

fn main() -> Result<(), Box<dyn Error>> {
    let matches = Command::new("bloomset")
        .about("fill a bloom filter and an exact set with words, then query both")
        .arg(
            Arg::new("config")
                .long("config")
                .help("JSON file with capacity, error_rate and sample_size"),
        )
        .arg(
            Arg::new("capacity")
                .long("capacity")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("error-rate")
                .long("error-rate")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("sample")
                .long("sample")
                .help("number of leading bits in the snapshot")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("add")
                .long("add")
                .num_args(1..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("words")
                .long("words")
                .help("word file: JSON {\"words\": [...]} or one word per line"),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .num_args(1..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    // Create logger
    let level = if matches.get_flag("verbose") {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    // Load config
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::from_json(&std::fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    if let Some(&capacity) = matches.get_one::<usize>("capacity") {
        config.capacity = capacity;
    }
    if let Some(&error_rate) = matches.get_one::<f64>("error-rate") {
        config.error_rate = error_rate;
    }
    if let Some(&sample) = matches.get_one::<usize>("sample") {
        config.sample_size = sample;
    }

    // Collect words
    let mut words: Vec<String> = matches
        .get_many::<String>("add")
        .into_iter()
        .flatten()
        .cloned()
        .collect();
    if let Some(path) = matches.get_one::<String>("words") {
        let loaded = load_words(&std::fs::read_to_string(path)?);
        info!(path, words = loaded.len(), "loaded words");
        words.extend(loaded);
    }

    let filter = BloomFilter::from_config(&config)?;
    info!(
        num_bits = filter.num_bits(),
        num_hashes = filter.num_hashes(),
        "initialized filter"
    );
    let mut comparison = Comparison::new(filter);
    let insert = comparison.insert_all(words.iter().map(String::as_str));
    let verdicts = matches
        .get_many::<String>("check")
        .into_iter()
        .flatten()
        .map(|word| comparison.check(word.trim()))
        .collect::<Result<Vec<_>, _>>()?;

    let report = Report {
        stats: comparison.filter().stats(),
        insert,
        verdicts,
        memory: comparison.memory(),
        snapshot: comparison.filter().snapshot(config.sample_size),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn load_words(contents: &str) -> Vec<String> {
    match serde_json::from_str::<WordList>(contents) {
        Ok(list) => list.words,
        Err(_) => contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect(),
    }
}
