//! Sample catalog loaded into empty stores at start-up

use super::{CatalogStore, StoreResult};
use crate::model::{CodeType, NewCodeRecord};
use tracing::info;

pub fn sample_codes() -> Vec<NewCodeRecord> {
    vec![
        NewCodeRecord::new(CodeType::Icd10, "E11.9", "Type 2 diabetes mellitus without complications")
            .with_synonyms(["T2DM", "Diabetes Mellitus Type II", "NIDDM"])
            .with_category("Endocrine Disorders"),
        NewCodeRecord::new(CodeType::Icd10, "E11.65", "Type 2 diabetes mellitus with hyperglycemia")
            .with_synonyms(["T2DM with hyperglycemia", "Diabetic hyperglycemia"])
            .with_category("Endocrine Disorders"),
        NewCodeRecord::new(CodeType::Icd9, "250.00", "Diabetes mellitus without mention of complication")
            .with_synonyms(["DM", "Diabetes"])
            .with_category("Endocrine Disorders"),
        NewCodeRecord::new(
            CodeType::Cpt,
            "99213",
            "Office or other outpatient visit for the evaluation and management of an established patient",
        )
        .with_synonyms(["Established patient visit", "Office visit level 3"])
        .with_category("Evaluation and Management"),
        NewCodeRecord::new(CodeType::Snomed, "44054006", "Diabetes mellitus type 2")
            .with_synonyms(["Type 2 diabetes", "Non-insulin dependent diabetes"])
            .with_category("Clinical Finding"),
        NewCodeRecord::new(CodeType::Hcc, "19", "Diabetes without Complication")
            .with_synonyms(["DM without complications"])
            .with_category("Risk Factor"),
        NewCodeRecord::new(CodeType::Icd10, "I10", "Essential hypertension")
            .with_synonyms(["High blood pressure", "HTN", "Primary hypertension"])
            .with_category("Circulatory System"),
        NewCodeRecord::new(
            CodeType::Icd10,
            "J44.1",
            "Chronic obstructive pulmonary disease with acute exacerbation",
        )
        .with_synonyms(["COPD exacerbation", "Acute COPD"])
        .with_category("Respiratory System"),
    ]
}

/// Insert the sample codes when the catalog has no records; returns how many were added
pub fn seed_if_empty(store: &dyn CatalogStore) -> StoreResult<usize> {
    let existing = store.get_all_codes()?.len();
    if existing > 0 {
        info!("Catalog already contains {} codes, skipping seed", existing);
        return Ok(0);
    }

    let created = store.create_codes(sample_codes())?;
    info!("Seeded catalog with {} sample codes", created.len());
    Ok(created.len())
}
