use clap::Parser;

use fault_bdd::analysis::{analyze, Options};
use fault_bdd::bdd::Bdd;
use fault_bdd::forest::{Forest, Row, TreePage};
use fault_bdd::gate::Gate;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Labels of base events known to work.
    #[arg(long, value_name = "LABEL", value_delimiter = ',')]
    good: Vec<String>,

    /// Labels of base events known to have failed.
    #[arg(long, value_name = "LABEL", value_delimiter = ',')]
    bad: Vec<String>,

    /// Names of the sub-trees to report on (default: all).
    #[arg(long, value_name = "NAME", value_delimiter = ',')]
    failed_sub_trees: Option<Vec<String>>,

    /// Dump the structure of every combined sub-tree to stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Write the diagram of the top sub-tree in DOT format to this file.
    #[arg(long, value_name = "FILE")]
    dot: Option<std::path::PathBuf>,

    /// BDD size (in bits, so the actual size is `2^size` nodes).
    #[clap(long, value_name = "INT", default_value = "20")]
    size: usize,
}

fn row(id: i64, probability: f64, label: &str, description: &str, guidance: &str) -> Row {
    Row {
        id,
        probability,
        label: label.to_string(),
        description: description.to_string(),
        guidance: guidance.to_string(),
    }
}

/// A small cooling loop: it fails if the controller fails, or if both pumps fail.
fn cooling_loop() -> Vec<TreePage> {
    let mut top = TreePage::new(1, "CoolingLoss", Gate::Or).with_tree(2).with_tree(3);
    top.params.description = "Loss of cooling".to_string();

    let mut pumps = TreePage::new(2, "Pumps", Gate::And).with_tree(4).with_tree(5);
    pumps.params.description = "Both pumps unavailable".to_string();

    let mut controller = TreePage::new(3, "Controller", Gate::Or);
    controller.rows = vec![
        row(1001, 0.01, "PLC", "Controller hardware fault", "Replace PLC module"),
        row(1002, 0.02, "PSU", "Controller power supply fault", "Check 24V rail"),
    ];

    let mut pump_a = TreePage::new(4, "PumpA", Gate::Or);
    pump_a.rows = vec![
        row(1003, 0.1, "MotorA", "Pump A motor fault", "Check motor windings"),
        row(1005, 0.05, "Valve", "Shared suction valve closed", "Open suction valve"),
    ];

    let mut pump_b = TreePage::new(5, "PumpB", Gate::Or);
    pump_b.rows = vec![
        row(1004, 0.1, "MotorB", "Pump B motor fault", "Check motor windings"),
        row(1005, 0.05, "Valve", "Shared suction valve closed", "Open suction valve"),
    ];

    vec![top, pumps, controller, pump_a, pump_b]
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    println!("args = {:?}", args);

    let mut forest = Forest::load_with(Bdd::new(args.size), cooling_loop())?;
    println!("bdd = {:?}", forest.bdd());

    let options = Options {
        selected: args.failed_sub_trees,
        good: args.good,
        bad: args.bad,
        verbose: args.verbose,
    };
    let reports = analyze(&mut forest, &options)?;

    for report in &reports {
        println!();
        println!(
            "{} (ID {}, {}): PS = {:.6}",
            report.tree_name,
            report.id.id(),
            report.logical_type_desc,
            report.ps
        );
        println!(
            "  {:>6} {:<8} {:>8} {:>8} {:>8} {:>8} {:>8}  {}",
            "BaseID", "Label", "Prob", "DIF", "MIF", "PS", "PES", "Guidance"
        );
        for row in &report.rows {
            println!(
                "  {:>6} {:<8} {:>8.4} {:>8.4} {:>8.4} {:>8.4} {:>8.4}  {}",
                row.base_id.id(),
                row.label,
                row.probability,
                row.dif,
                row.mif,
                row.ps,
                row.pes,
                row.guidance
            );
        }
    }

    if let Some(top) = forest.tree_by_name("CoolingLoss").and_then(|tree| tree.root()) {
        let bdd = forest.bdd();
        println!();
        println!("failure states = {}", bdd.failure_count(top));
        println!("failure scenario = {:?}", bdd.failure_scenario(top));

        if let Some(path) = &args.dot {
            std::fs::write(path, bdd.to_dot(&[("CoolingLoss", top)])?)?;
            println!("DOT written to {}", path.display());
        }
    }

    Ok(())
}
