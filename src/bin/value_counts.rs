use clap::Parser;
use qu::ick_use::*;
use serde::Serialize;
use std::path::PathBuf;
use survey_needs_analysis::{
    cf::{
        self, ADL, ADL_LABELS, CARE_SITES, FAMILY, FRIENDS, IADL, IADL_LABELS,
        NON_MEDICAL_ITEMS, NON_MEDICAL_LABELS, NURSING, NURSING_LABELS, REHAB, REHAB_LABELS,
    },
    demographics::{self, Ethnicity, Gender},
    header,
    utilization::UtilQuestion,
    value_counts::{
        descriptive_stats, mapped_value_counts, value_counts, DescriptiveStats,
        ItemResponseTable, MappedValueCounts, ResponseCodes, ResponseSummary, ValueCounts,
        LIKERT, LUBBEN, MENTIONED, PASS_FAIL, YES_NO,
    },
    Cf, Config, Survey,
};

#[derive(Parser)]
struct Opt {
    /// TOML config file. Built-in defaults are used without one.
    #[clap(long, short)]
    config: Option<PathBuf>,
    /// Read this dataset instead of the one in the config.
    #[clap(long, short)]
    dataset: Option<PathBuf>,
    /// Extra columns to show raw value counts for.
    #[clap(long)]
    column: Vec<String>,
    /// Print the tables as JSON instead.
    #[clap(long)]
    json: bool,
}

#[derive(Serialize)]
struct Utilization {
    question: UtilQuestion,
    counts: ValueCounts,
    stats: DescriptiveStats,
}

#[derive(Serialize)]
struct ItemGroup {
    title: &'static str,
    table: ItemResponseTable,
    summary: ResponseSummary,
}

#[derive(Serialize)]
struct Report {
    utilization: Vec<Utilization>,
    age: Vec<(&'static str, usize)>,
    gender: MappedValueCounts,
    ethnicity: MappedValueCounts,
    items: Vec<ItemGroup>,
    financial: Vec<MappedValueCounts>,
    extra: Vec<ValueCounts>,
}

#[qu::ick]
pub fn main(opt: Opt) -> Result {
    let mut config = Config::load_or_default(opt.config.as_deref())?;
    if let Some(dataset) = opt.dataset {
        config.dataset = dataset;
    }
    let survey = config.load_survey()?;
    let report = build_report(&survey, &opt.column);

    if opt.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn labelled<'a>(columns: &[&'a str], labels: &[&'a str]) -> Vec<(&'a str, &'a str)> {
    columns.iter().copied().zip(labels.iter().copied()).collect()
}

fn code_order(labels: &[(i64, &str)]) -> Vec<i64> {
    labels.iter().map(|(code, _)| *code).collect()
}

fn item_group(
    survey: &Survey,
    title: &'static str,
    items: &[(&str, &str)],
    codes: &ResponseCodes,
) -> ItemGroup {
    let columns: Vec<&str> = items.iter().map(|(column, _)| *column).collect();
    ItemGroup {
        title,
        table: ItemResponseTable::build(survey, items, codes),
        summary: ResponseSummary::build(survey, &columns, codes),
    }
}

fn build_report(survey: &Survey, extra: &[String]) -> Report {
    let gender_labels: Vec<(i64, &str)> = (1..=2)
        .filter_map(|code| Gender::from_code(code).map(|gender| (code, gender.label())))
        .collect();
    let ethnicity_labels: Vec<(i64, &str)> = (1..=4)
        .filter_map(|code| Ethnicity::from_code(code).map(|eth| (code, eth.label())))
        .collect();

    let activation = Cf::ActivationOwnCare.questions();
    let lubben: Vec<&str> = FAMILY.iter().chain(FRIENDS.iter()).copied().collect();
    let items = vec![
        item_group(survey, "Activities of daily living", &labelled(&ADL, &ADL_LABELS), &YES_NO),
        item_group(
            survey,
            "Instrumental activities of daily living",
            &labelled(&IADL, &IADL_LABELS),
            &YES_NO,
        ),
        item_group(survey, "Nursing tasks", &labelled(&NURSING, &NURSING_LABELS), &MENTIONED),
        item_group(survey, "Rehabilitation", &labelled(&REHAB, &REHAB_LABELS), &MENTIONED),
        item_group(survey, "Activation of own care", &labelled(activation, activation), &LIKERT),
        item_group(
            survey,
            "Cognitive screen",
            &labelled(&cf::COGNITION_ITEMS, &cf::COGNITION_ITEMS),
            &PASS_FAIL,
        ),
        item_group(survey, "Lubben social network", &labelled(&lubben, &lubben), &LUBBEN),
        item_group(
            survey,
            "Stressful life events",
            &labelled(&NON_MEDICAL_ITEMS, &NON_MEDICAL_LABELS),
            &MENTIONED,
        ),
    ];

    let financial = Cf::FinancialChallenges
        .questions()
        .iter()
        .map(|q| {
            let labels = cf::financial_value_labels(q);
            mapped_value_counts(survey, q, labels, &code_order(labels))
        })
        .collect();

    let extra = CARE_SITES
        .iter()
        .map(|site| site.to_string())
        .chain(extra.iter().cloned())
        .map(|column| value_counts(survey, &column))
        .collect();

    Report {
        utilization: UtilQuestion::ALL
            .into_iter()
            .map(|question| Utilization {
                question,
                counts: value_counts(survey, question.code()),
                stats: descriptive_stats(survey, question.code()),
            })
            .collect(),
        age: demographics::age_distribution(survey).for_display().collect(),
        gender: mapped_value_counts(
            survey,
            demographics::GENDER,
            &gender_labels,
            &code_order(&gender_labels),
        ),
        ethnicity: mapped_value_counts(
            survey,
            demographics::ETHNICITY,
            &ethnicity_labels,
            &code_order(&ethnicity_labels),
        ),
        items,
        financial,
        extra,
    }
}

fn print_report(report: &Report) {
    header("Healthcare utilization");
    for util in &report.utilization {
        println!("{}", util.question);
        println!("{}", util.counts.term_table());
        println!("{}", util.stats.term_table());
    }

    header("Demographics");
    println!("Age (Q2)");
    let mut age = term_data_table::Table::new().with_row(
        term_data_table::Row::new()
            .with_cell("Age band")
            .with_cell("Count"),
    );
    for (label, count) in &report.age {
        age.add_row(
            term_data_table::Row::new()
                .with_cell(*label)
                .with_cell(count.to_string()),
        );
    }
    println!("{}", age);
    println!("Gender (Q4)");
    println!("{}", report.gender.term_table());
    println!("Ethnicity (Q3)");
    println!("{}", report.ethnicity.term_table());

    for group in &report.items {
        header(group.title);
        println!("{}", group.table.term_table());
        println!("{}", group.summary.term_table());
    }

    header("Financial challenges");
    for counts in &report.financial {
        println!("{}", counts.column);
        println!("{}", counts.term_table());
    }

    header("Other columns");
    for counts in &report.extra {
        println!("{}", counts.column);
        println!("{}", counts.term_table());
    }
}
