//! Default formatting rules for the VHA Corporate Data Warehouse

use super::geography::find_state;
use super::{GenderColumns, MaritalStatus, RecordFormatter};
use crate::domain::{Gender, Person};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regex::Regex;
use std::sync::OnceLock;

/// Seed of the clinician roster
pub const CLINICIAN_SEED: u64 = 999;

const FOOD_PATTERN: &str = r"(?i)(nut|peanut|milk|dairy|eggs|shellfish|wheat)";

/// CVX code and the dose that completes its series
const MAX_DOSES: &[(&str, u32)] = &[
    ("03", 2),   // MMR
    ("08", 3),   // Hep B, adolescent or pediatric
    ("10", 4),   // IPV
    ("20", 5),   // DTaP
    ("21", 2),   // varicella
    ("33", 1),   // pneumococcal polysaccharide PPV23
    ("43", 3),   // Hep B, adult
    ("49", 3),   // Hib (PRP-OMP)
    ("62", 3),   // HPV, quadrivalent
    ("83", 2),   // Hep A, ped/adol, 2 dose
    ("113", 1),  // Td (adult)
    ("114", 2),  // meningococcal MCV4P
    ("115", 1),  // Tdap
    ("119", 2),  // rotavirus, monovalent
    ("121", 1),  // zoster
    ("133", 4),  // pneumococcal conjugate PCV 13
    ("140", 1),  // influenza, seasonal, injectable, preservative free
];

const GIVEN_NAMES: &[&str] = &[
    "Alex", "Beatriz", "Carlos", "Dana", "Elena", "Farid", "Grace", "Hiro", "Imani", "Jonas",
    "Keiko", "Luis", "Maya", "Noah", "Olga", "Priya", "Quinn", "Rosa", "Samuel", "Tamar",
];

const FAMILY_NAMES: &[&str] = &[
    "Abbott", "Baker", "Chen", "Diaz", "Eriksen", "Fischer", "Gupta", "Hughes", "Ito", "Jensen",
    "Kowalski", "Lopez", "Murphy", "Nguyen", "Okafor", "Patel", "Reyes", "Schmidt", "Turner",
    "Walsh",
];

fn food_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(FOOD_PATTERN).expect("food allergy pattern is valid"))
}

/// Formatting rules of the CDW extract
///
/// Only veterans are exported. Race, ethnicity and marital status are mapped
/// onto the warehouse's categories, with fixed fallbacks for anything the
/// record does not specify.
#[derive(Debug, Clone, Copy, Default)]
pub struct CdwFormatter;

impl CdwFormatter {
    /// Creates the formatter
    pub fn new() -> Self {
        Self
    }
}

impl RecordFormatter for CdwFormatter {
    fn include(&self, person: &Person) -> bool {
        person.veteran.is_some()
    }

    fn race(&self, person: &Person) -> &'static str {
        match person.race.as_str() {
            "white" => "WHITE NOT OF HISP ORIG",
            "hispanic" => "WHITE",
            "black" => "BLACK OR AFRICAN AMERICAN",
            "asian" => "ASIAN",
            "native" => {
                let hawaii = find_state(&person.address.state)
                    .map(|s| s.abbreviation == "HI")
                    .unwrap_or(false);
                if hawaii {
                    "NATIVE HAWAIIAN OR OTHER PACIFIC ISLANDER"
                } else {
                    "AMERICAN INDIAN OR ALASKA NATIVE"
                }
            }
            _ => "ASIAN",
        }
    }

    fn ethnicity(&self, person: &Person) -> &'static str {
        if person.race == "hispanic" {
            "HISPANIC OR LATINO"
        } else {
            "NOT HISPANIC OR LATINO"
        }
    }

    fn marital_status(&self, person: &Person) -> MaritalStatus {
        match person.marital_status.as_deref() {
            Some("M") => MaritalStatus {
                code: "M",
                label: "Married",
            },
            Some(_) => MaritalStatus {
                code: "N",
                label: "Never Married",
            },
            None => MaritalStatus {
                code: "U",
                label: "Unknown",
            },
        }
    }

    fn gender(&self, person: &Person) -> GenderColumns {
        match person.gender {
            Gender::Male => GenderColumns {
                code: "M",
                label: "Male",
            },
            Gender::Female => GenderColumns {
                code: "F",
                label: "Female",
            },
        }
    }

    fn timezone(&self, state: Option<&str>) -> &'static str {
        state
            .and_then(find_state)
            .map(|s| s.timezone)
            .unwrap_or_default()
    }

    fn max_doses(&self, cvx: &str) -> u32 {
        MAX_DOSES
            .iter()
            .find(|(code, _)| *code == cvx)
            .map(|(_, doses)| *doses)
            .unwrap_or(1)
    }

    fn is_food_allergy(&self, reactant: &str) -> bool {
        food_pattern().is_match(reactant)
    }

    fn clinician_names(&self, count: usize) -> Vec<String> {
        let mut rng = StdRng::seed_from_u64(CLINICIAN_SEED);
        (0..count)
            .map(|_| {
                let given = GIVEN_NAMES.choose(&mut rng).copied().unwrap_or("Jordan");
                let family = FAMILY_NAMES.choose(&mut rng).copied().unwrap_or("Smith");
                format!("Dr. {given} {family}")
            })
            .collect()
    }
}
