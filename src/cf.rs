//! Complicating factors (CFs).
//!
//! Each factor reads a fixed set of question columns from one record and produces an ordinal level
//! (0 is least complex), or `None` when the record has no usable answers for it. Sentinel codes
//! (see [`crate::value::SENTINELS`]) never count as a valid answer unless a factor's named
//! imputation has replaced them first.
//!
//! [`Cf`] is the single dispatch point: every report selects a factor by enum variant rather
//! than by name.
mod activation;
mod disruptive;
mod financial;
mod functional;
mod hospital;
mod non_medical;
mod nursing;
mod organization;
mod polypharmacy;
mod social;
mod specialist;

pub use self::{
    disruptive::COGNITION_ITEMS,
    financial::value_labels as financial_value_labels,
    functional::{ADL, ADL_LABELS, IADL, IADL_LABELS},
    non_medical::{HIGH_SEVERITY, ITEMS as NON_MEDICAL_ITEMS, ITEM_LABELS as NON_MEDICAL_LABELS},
    nursing::{NURSING, NURSING_LABELS, REHAB, REHAB_LABELS},
    organization::{SITES as CARE_SITES, SITE_LABELS as CARE_SITE_LABELS},
    social::{lubben_count, FAMILY, FRIENDS, LUBBEN_RESPONSES},
    specialist::from_gi as specialist_from_gi,
};
use crate::{gi, impute::Imputation, Record, Survey};
use qu::ick_use::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The level a record is scored at for one factor.
pub type CfLevel = u8;

const THREE_LEVELS: [CfLevel; 3] = [0, 1, 2];
const TWO_LEVELS: [CfLevel; 2] = [0, 1];

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Cf {
    FunctionalAssessment,
    NursingNeeds,
    RehabNeeds,
    OrganizationOfCare,
    ActivationOwnCare,
    DisruptiveBehaviour,
    SocialSupport,
    Polypharmacy,
    HospitalAdmissions,
    FinancialChallenges,
    SpecialistServiceNeeds,
    NonMedicalResourceNeeds,
}

impl Cf {
    pub const ALL: [Cf; 12] = [
        Cf::FunctionalAssessment,
        Cf::NursingNeeds,
        Cf::RehabNeeds,
        Cf::OrganizationOfCare,
        Cf::ActivationOwnCare,
        Cf::DisruptiveBehaviour,
        Cf::SocialSupport,
        Cf::Polypharmacy,
        Cf::HospitalAdmissions,
        Cf::FinancialChallenges,
        Cf::SpecialistServiceNeeds,
        Cf::NonMedicalResourceNeeds,
    ];

    /// The letter the factor is known by in the assessment framework.
    pub fn letter(self) -> char {
        use Cf::*;
        match self {
            FunctionalAssessment => 'A',
            NursingNeeds => 'B',
            RehabNeeds => 'C',
            OrganizationOfCare => 'D',
            ActivationOwnCare => 'E',
            DisruptiveBehaviour => 'F',
            SocialSupport => 'G',
            Polypharmacy => 'H',
            HospitalAdmissions => 'I',
            FinancialChallenges => 'J',
            SpecialistServiceNeeds => 'K',
            NonMedicalResourceNeeds => 'L',
        }
    }

    /// A short machine-friendly name.
    pub fn key(self) -> &'static str {
        use Cf::*;
        match self {
            FunctionalAssessment => "functional_assessment",
            NursingNeeds => "nursing_needs",
            RehabNeeds => "rehab_needs",
            OrganizationOfCare => "organization_of_care",
            ActivationOwnCare => "activation_own_care",
            DisruptiveBehaviour => "disruptive_behaviour",
            SocialSupport => "social_support",
            Polypharmacy => "polypharmacy",
            HospitalAdmissions => "hospital_admissions",
            FinancialChallenges => "financial_challenges",
            SpecialistServiceNeeds => "specialist_service_needs",
            NonMedicalResourceNeeds => "non_medical_resource_needs",
        }
    }

    /// A human-readable label for the factor.
    pub fn name(self) -> &'static str {
        use Cf::*;
        match self {
            FunctionalAssessment => "Functional Assessment",
            NursingNeeds => "Nursing type skilled task needs",
            RehabNeeds => "Rehabilitation needs",
            OrganizationOfCare => "Organization of care",
            ActivationOwnCare => "Activation of own care",
            DisruptiveBehaviour => "Disruptive behavioural issues",
            SocialSupport => "Social support in case of need",
            Polypharmacy => "Polypharmacy",
            HospitalAdmissions => "Hospital admissions in last 6 months",
            FinancialChallenges => "Financial challenges",
            SpecialistServiceNeeds => "Specialist medical service needs",
            NonMedicalResourceNeeds => "Non-medical resource needs",
        }
    }

    /// e.g. "A. Functional Assessment"
    pub fn title(self) -> String {
        format!("{}. {}", self.letter(), self.name())
    }

    /// The name of the derived (non-imputed) column.
    pub fn column(self) -> &'static str {
        use Cf::*;
        match self {
            FunctionalAssessment => "Functional_Assessment",
            NursingNeeds => "Nursing_Needs",
            RehabNeeds => "Rehab_Needs",
            OrganizationOfCare => "Organization_of_Care_CF",
            ActivationOwnCare => "Activation_Care",
            DisruptiveBehaviour => "Disruptive_Behaviour",
            SocialSupport => "Social_Support_CF",
            Polypharmacy => "Polypharmacy_CF",
            HospitalAdmissions => "Hospital_Admissions_CF",
            FinancialChallenges => "Financial_Challenges_CF",
            SpecialistServiceNeeds => "Specialist_Medical_Service_Needs_CF",
            NonMedicalResourceNeeds => "Non_Medical_Resource_Needs_CF",
        }
    }

    /// The raw survey columns the factor is scored from.
    pub fn questions(self) -> &'static [&'static str] {
        use Cf::*;
        match self {
            FunctionalAssessment => &functional::QUESTIONS,
            NursingNeeds => &NURSING,
            RehabNeeds => &REHAB,
            OrganizationOfCare => &organization::SITES,
            ActivationOwnCare => &activation::QUESTIONS,
            DisruptiveBehaviour => &COGNITION_ITEMS,
            SocialSupport => &social::QUESTIONS,
            Polypharmacy => &polypharmacy::QUESTIONS,
            HospitalAdmissions => &hospital::QUESTIONS,
            FinancialChallenges => &financial::QUESTIONS,
            SpecialistServiceNeeds => gi::INPUT_COLUMNS.as_slice(),
            NonMedicalResourceNeeds => &non_medical::QUESTIONS,
        }
    }

    /// The levels this factor can take, least complex first.
    pub fn categories(self) -> &'static [CfLevel] {
        match self {
            Cf::FinancialChallenges => &TWO_LEVELS,
            _ => &THREE_LEVELS,
        }
    }

    /// What a level means for this factor.
    pub fn category_label(self, level: CfLevel) -> Option<&'static str> {
        use Cf::*;
        let labels: &[&str] = match self {
            FunctionalAssessment => &["No deficit", "IADL deficit only", "Any ADL deficit"],
            NursingNeeds | RehabNeeds => &["None", "Moderate (1 task)", "High (2 or more tasks)"],
            OrganizationOfCare => &[
                "Sees no more than 1 doctor, from 1 site of care",
                "Sees more than 1 doctor, from 1 site of care",
                "Sees more than 1 doctor, from more than 1 site of care",
            ],
            ActivationOwnCare => &[
                "Ready, understands and interested in treatment",
                "Unsure but willing to cooperate",
                "Major disconnect, unaware or no insight",
            ],
            DisruptiveBehaviour => &[
                "None",
                "1 or more not significantly affecting care",
                "1 or more significantly affecting care",
            ],
            SocialSupport => &[
                "Has support for both basic healthcare services and companionship",
                "No support for basic healthcare services but companionship",
                "Has no support",
            ],
            Polypharmacy => &[
                "Fewer than 5 prescription medications",
                "5 to 8 prescription medications",
                "9 or more prescription medications",
            ],
            HospitalAdmissions => &["None", "1 or 2", "3 or more"],
            FinancialChallenges => &["No", "Yes"],
            SpecialistServiceNeeds => &[
                "No need",
                "Single or occasional referral for advice to the primary physician",
                "Regular follow up by specialist(s) for ongoing care of a condition",
            ],
            NonMedicalResourceNeeds => &[
                "Stable and secure access to all areas of social determinants of health",
                "Some, intermittent concerns with at least one area",
                "Major ongoing problems with at least one area",
            ],
        };
        labels.get(usize::from(level)).copied()
    }

    /// Score one record.
    pub fn classify(self, record: &Record) -> Option<CfLevel> {
        use Cf::*;
        match self {
            FunctionalAssessment => functional::classify(record),
            NursingNeeds => nursing::classify_nursing(record),
            RehabNeeds => nursing::classify_rehab(record),
            OrganizationOfCare => organization::classify(record),
            ActivationOwnCare => activation::classify(record),
            DisruptiveBehaviour => disruptive::classify(record),
            SocialSupport => social::classify(record),
            Polypharmacy => polypharmacy::classify(record),
            HospitalAdmissions => hospital::classify(record),
            FinancialChallenges => financial::classify(record),
            SpecialistServiceNeeds => specialist::classify(record),
            NonMedicalResourceNeeds => non_medical::classify(record),
        }
    }

    /// The sentinel remapping applied before scoring the imputed variant, if the factor has one.
    pub fn imputation(self) -> Option<&'static Imputation> {
        use crate::impute;
        use Cf::*;
        match self {
            NursingNeeds => Some(&impute::NURSING),
            RehabNeeds => Some(&impute::REHAB),
            OrganizationOfCare => Some(&impute::ORGANIZATION_OF_CARE),
            Polypharmacy => Some(&impute::POLYPHARMACY),
            FinancialChallenges => Some(&impute::FINANCIAL),
            _ => None,
        }
    }

    /// Score every record in the survey.
    ///
    /// If none of the factor's columns exist the result is all `None`.
    pub fn classify_all(self, survey: &Survey) -> Vec<Option<CfLevel>> {
        let questions = self.questions();
        if survey.missing_columns(questions).len() == questions.len() && !survey.is_empty() {
            event!(
                Level::WARN,
                "none of the columns for {} are in the dataset, all records will be unscored",
                self.title()
            );
        }
        survey.iter_ref().map(|rec| self.classify(rec)).collect()
    }

    /// Score every record after applying the factor's imputation. `None` if it has no imputation.
    pub fn classify_imputed(self, survey: &Survey) -> Option<Vec<Option<CfLevel>>> {
        let imputation = self.imputation()?;
        Some(self.classify_all(&imputation.apply(survey)))
    }
}

impl fmt::Display for Cf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Cf {
    type Err = Error;
    /// Accepts the letter (`"B"`), the key (`"nursing_needs"`) or the column name.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        Cf::ALL
            .into_iter()
            .find(|cf| {
                input.eq_ignore_ascii_case(cf.key())
                    || input.eq_ignore_ascii_case(cf.column())
                    || (input.len() == 1 && input.eq_ignore_ascii_case(&cf.letter().to_string()))
            })
            .ok_or_else(|| format_err!("didn't recognise complicating factor \"{}\"", input))
    }
}

/// A derived column: a factor, either as scored from the raw answers or after its imputation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct CfColumn {
    pub cf: Cf,
    pub imputed: bool,
}

impl CfColumn {
    pub fn raw(cf: Cf) -> Self {
        CfColumn { cf, imputed: false }
    }

    pub fn imputed(cf: Cf) -> Self {
        CfColumn { cf, imputed: true }
    }

    pub fn title(&self) -> String {
        if self.imputed {
            format!("{} (imputed)", self.cf.title())
        } else {
            self.cf.title()
        }
    }

    pub fn name(&self) -> String {
        if self.imputed {
            format!("{}_Imputed", self.cf.column())
        } else {
            self.cf.column().to_string()
        }
    }
}

impl fmt::Display for CfColumn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A level of a particular factor, displayed with its meaning.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct CfCategory {
    pub cf: Cf,
    pub level: CfLevel,
}

impl CfCategory {
    pub fn new(cf: Cf, level: CfLevel) -> Self {
        CfCategory { cf, level }
    }

    /// All categories of a factor, in level order.
    pub fn all(cf: Cf) -> Vec<CfCategory> {
        cf.categories()
            .iter()
            .map(|level| CfCategory::new(cf, *level))
            .collect()
    }

    /// The category for a scored level, or `None` if the level isn't one the factor defines.
    pub fn from_level(cf: Cf, level: Option<CfLevel>) -> Option<CfCategory> {
        level
            .filter(|level| cf.categories().contains(level))
            .map(|level| CfCategory::new(cf, level))
    }
}

impl fmt::Display for CfCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.cf.category_label(self.level) {
            Some(label) => write!(f, "{}: {}", self.level, label),
            None => write!(f, "{}", self.level),
        }
    }
}
