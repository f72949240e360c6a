use clap::Parser;
use qu::ick_use::*;
use serde::Serialize;
use std::path::PathBuf;
use survey_needs_analysis::{
    crosstab::LongRow,
    header,
    utilization::{UtilLongRow, UtilMode, UtilQuestion, VisitPolicy},
    Analysis, Cf, CfColumn, Config, Orientation,
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
struct CfReport {
    factor: Cf,
    title: String,
    distribution: Vec<LongRow>,
    imputed_distribution: Option<Vec<LongRow>>,
    demographics: Vec<LongRow>,
    utilization: Vec<UtilLongRow>,
    imputed_utilization: Option<Vec<UtilLongRow>>,
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

    if opt.json {
        let reports = config
            .factors()
            .into_iter()
            .map(|cf| cf_report(&analysis, cf))
            .collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for cf in config.factors() {
        print_factor(&analysis, cf);
    }
    Ok(())
}

fn cf_report(analysis: &Analysis, cf: Cf) -> CfReport {
    let overall = analysis.overall();
    CfReport {
        factor: cf,
        title: cf.title(),
        distribution: analysis
            .cf_distribution(CfColumn::raw(cf))
            .to_long(overall),
        imputed_distribution: analysis
            .imputed_levels(cf)
            .map(|_| analysis.cf_distribution(CfColumn::imputed(cf)).to_long(overall)),
        demographics: analysis
            .demographic_matrix(cf)
            .by_group()
            .to_long(Orientation::ColPct),
        utilization: util_long(analysis, CfColumn::raw(cf)),
        imputed_utilization: analysis
            .imputed_levels(cf)
            .map(|_| util_long(analysis, CfColumn::imputed(cf))),
    }
}

fn util_long(analysis: &Analysis, column: CfColumn) -> Vec<UtilLongRow> {
    analysis.cf_util_long(column, VisitPolicy::for_column(column))
}

fn print_factor(analysis: &Analysis, cf: Cf) {
    let overall = analysis.overall();
    header(&cf.title());

    let distribution = analysis.cf_distribution(CfColumn::raw(cf));
    println!("{}", distribution.heading(overall));
    println!("{}", distribution.term_table(overall));
    if analysis.imputed_levels(cf).is_some() {
        let imputed = analysis.cf_distribution(CfColumn::imputed(cf));
        println!("{} (imputed)", imputed.heading(overall));
        println!("{}", imputed.term_table(overall));
    }

    let matrix = analysis.demographic_matrix(cf);
    println!("{}", matrix.heading());
    println!("{}", matrix.term_table());

    let mut columns = vec![CfColumn::raw(cf)];
    if analysis.imputed_levels(cf).is_some() {
        columns.push(CfColumn::imputed(cf));
    }
    for column in columns {
        for question in UtilQuestion::ALL {
            let table =
                analysis.cf_util_binned(column, question, VisitPolicy::for_column(column));
            println!("{}", table.heading());
            println!("{}", table.term_table());
        }
    }
    for mode in [UtilMode::Valid, UtilMode::AtLeastOne, UtilMode::Sum] {
        let table = analysis.cf_util_crosstab(cf, mode);
        println!("{}", table.heading());
        println!("{}", table.term_table());
    }
}
