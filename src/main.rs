use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use dotenvy::dotenv;
use log::error;

use parallel_pow::blockchain::{Block, BlockHash, Blockchain};
use parallel_pow::config::{Command, Config};
use parallel_pow::{Result, bench, mining};

fn main() -> ExitCode {
    let _ = dotenv();
    env_logger::init();

    let config = Config::parse();
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<()> {
    config.validate()?;
    let difficulty = config.difficulty;
    let workers = config.worker_count();
    let mut out = io::stdout().lock();

    match &config.command {
        Command::Mine { payload } => {
            let block = Block::now(1, BlockHash::ZERO, payload.as_str());
            let report = mining::mine_with_report(block, difficulty, workers)?;
            if config.json {
                serde_json::to_writer_pretty(&mut out, &report)?;
                writeln!(out)?;
            } else {
                writeln!(
                    out,
                    "Nonce found: {}, Hash: {}",
                    report.block.nonce(),
                    report.block.hash()
                )?;
                writeln!(
                    out,
                    "Workers: {} | Winner: {} | Time: {:.2}s",
                    workers,
                    report.winner,
                    report.elapsed.as_secs_f64()
                )?;
            }
        }
        Command::Bench { payload, counts } => {
            let samples = bench::sweep(payload, difficulty, config.bench_counts(counts))?;
            if config.json {
                serde_json::to_writer_pretty(&mut out, &samples)?;
                writeln!(out)?;
            } else {
                write!(out, "{}", bench::render_table(&samples))?;
            }
        }
        Command::Chain { blocks } => {
            let mut chain = Blockchain::new();
            for payload in blocks {
                chain.append(payload.as_str(), difficulty, workers)?;
            }
            let report = chain.validation_report();
            if config.json {
                let dump = serde_json::json!({ "chain": chain.blocks(), "validation": report });
                serde_json::to_writer_pretty(&mut out, &dump)?;
                writeln!(out)?;
            } else {
                serde_json::to_writer_pretty(&mut out, chain.blocks())?;
                writeln!(out)?;
                writeln!(out, "valid: {} (length {})", report.valid, report.length)?;
            }
        }
    }
    Ok(())
}
