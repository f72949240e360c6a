use clap::Parser;
use qu::ick_use::*;
use serde::Serialize;
use std::path::PathBuf;
use survey_needs_analysis::{
    crosstab::LongRow,
    gi::{self, StepSummary},
    header,
    utilization::UtilQuestion,
    Analysis, Cf, Config, Gi, Orientation,
};

#[derive(Parser)]
struct Opt {
    /// TOML config file. Built-in defaults are used without one.
    #[clap(long, short)]
    config: Option<PathBuf>,
    /// Read this dataset instead of the one in the config.
    #[clap(long, short)]
    dataset: Option<PathBuf>,
    /// Print long-form tables as JSON instead.
    #[clap(long)]
    json: bool,
}

#[derive(Serialize)]
struct GiCount {
    gi: Gi,
    count: usize,
    percent: Option<f64>,
}

#[derive(Serialize)]
struct GiReport {
    assigned: Vec<GiCount>,
    stepwise: Vec<GiCount>,
    steps: Vec<StepSummary>,
    by_factor: Vec<(Cf, Vec<LongRow>)>,
    utilization: Vec<(Gi, UtilQuestion, Vec<LongRow>)>,
}

#[qu::ick]
pub fn main(opt: Opt) -> Result {
    let mut config = Config::load_or_default(opt.config.as_deref())?;
    if let Some(dataset) = opt.dataset {
        config.dataset = dataset;
    }
    let survey = config.load_survey()?;
    let total = config.total_for(survey.len());
    let analysis = Analysis::new(survey, Some(total));
    let factors = config.factors();

    if opt.json {
        let counts = |dist: gi::GiDistribution| -> Vec<GiCount> {
            let rows = dist
                .iter()
                .map(|(gi, count, percent)| GiCount { gi, count, percent })
                .collect();
            rows
        };
        let report = GiReport {
            assigned: counts(analysis.gi_distribution()),
            stepwise: counts(analysis.gi_stepwise_distribution()),
            steps: analysis.steps().to_vec(),
            by_factor: factors
                .iter()
                .map(|cf| (*cf, analysis.gi_cf_crosstab(*cf).to_long(Orientation::ColPct)))
                .collect(),
            utilization: Gi::ORDER
                .into_iter()
                .flat_map(|gi| UtilQuestion::ALL.into_iter().map(move |q| (gi, q)))
                .map(|(gi, q)| (gi, q, analysis.gi_util_long(gi, q).to_long(Orientation::ColPct)))
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    header("Global impressions (severity precedence)");
    println!("{}", analysis.gi_distribution().term_table());

    header("Global impressions (stepwise escalation)");
    println!("{}", gi::steps_term_table(analysis.steps()));
    println!("{}", analysis.gi_stepwise_distribution().term_table());

    for cf in &factors {
        let table = analysis.gi_cf_crosstab(*cf);
        header(table.title());
        println!("{}", table.counts_term_table());
    }

    for gi in Gi::ORDER {
        for question in UtilQuestion::ALL {
            let table = analysis.gi_util_long(gi, question);
            header(table.title());
            println!("{}", table.term_table(Orientation::ColPct));
        }
    }
    Ok(())
}
